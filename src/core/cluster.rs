// fragment grouping: single-linkage over equivalent + overlapping hits
use tracing::{debug, trace, warn};

use crate::core::error::{AnatomyError, check_threshold};
use crate::core::overlap::merge_overlap;
use crate::core::types::{Domain, Fragment, LengthConvention};

pub const DEFAULT_MERGE_THRESHOLD: f64 = 0.1;

/// Same signature, or one signature refines the other in the ontology.
pub fn equivalent(f1: &Fragment, f2: &Fragment) -> bool {
    let (Some(id1), Some(id2)) = (f1.ontology_id.as_deref(), f2.ontology_id.as_deref()) else {
        return false;
    };
    id1 == id2
        || f2.ontology_ancestors.iter().any(|a| a == id1)
        || f1.ontology_ancestors.iter().any(|a| a == id2)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentClusterer {
    threshold: f64,
    shortest: bool,
    length_convention: LengthConvention,
}

impl Default for FragmentClusterer {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MERGE_THRESHOLD,
            shortest: true,
            length_convention: LengthConvention::default(),
        }
    }
}

impl FragmentClusterer {
    pub fn new(threshold: f64) -> Result<Self, AnatomyError> {
        Ok(Self {
            threshold: check_threshold("merge_threshold", threshold)?,
            ..Self::default()
        })
    }

    //false: represent a group by its longest fragment instead
    pub fn with_shortest(mut self, shortest: bool) -> Self {
        self.shortest = shortest;
        self
    }

    pub fn with_length_convention(mut self, convention: LengthConvention) -> Self {
        if convention == LengthConvention::StartMinusEnd {
            warn!("domain lengths will be computed as start - end; nesting is disabled by negative lengths");
        }
        self.length_convention = convention;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Partition fragment indices into groups, in input order.
    ///
    /// A candidate joins the open group as soon as it is equivalent to, and
    /// overlaps by at least the threshold, any member already in it; members
    /// added during the scan are tested against later candidates too.
    pub fn group(&self, fragments: &[Fragment]) -> Vec<Vec<usize>> {
        let n = fragments.len();
        let mut visited = vec![false; n];
        let mut groups: Vec<Vec<usize>> = Vec::new();

        for i in 0..n {
            if visited[i] {
                continue;
            }
            visited[i] = true;
            let mut group = vec![i];

            for j in (i + 1)..n {
                if visited[j] {
                    continue;
                }
                let candidate = &fragments[j];
                let hit = group.iter().copied().find(|&m| {
                    equivalent(&fragments[m], candidate)
                        && merge_overlap(&fragments[m], candidate) >= self.threshold
                });
                if let Some(m) = hit {
                    trace!(
                        member = fragments[m].internal_id,
                        joined = candidate.internal_id,
                        "fragment merged into group"
                    );
                    group.push(j);
                    visited[j] = true;
                }
            }
            groups.push(group);
        }
        groups
    }

    /// Group fragments and materialize one domain per group.
    ///
    /// Every fragment must carry an ontology id.
    pub fn cluster(&self, fragments: Vec<Fragment>) -> Result<Vec<Domain>, AnatomyError> {
        if let Some(f) = fragments.iter().find(|f| f.ontology_id.is_none()) {
            return Err(AnatomyError::MissingOntologyId {
                internal_id: f.internal_id,
            });
        }

        let groups = self.group(&fragments);
        debug!(
            fragments = fragments.len(),
            domains = groups.len(),
            threshold = self.threshold,
            "clustered fragments"
        );

        let mut slots: Vec<Option<Fragment>> = fragments.into_iter().map(Some).collect();
        let domains = groups
            .into_iter()
            .map(|group| {
                let members: Vec<Fragment> = group.into_iter().filter_map(|i| slots[i].take()).collect();
                self.materialize(members)
            })
            .collect();
        Ok(domains)
    }

    /// Build a domain from one non-empty group, members in grouping order.
    fn materialize(&self, members: Vec<Fragment>) -> Domain {
        //shortest non-empty short name, first one on ties
        let short_name = members
            .iter()
            .filter_map(|m| m.short_name.as_deref().filter(|s| !s.is_empty()))
            .fold(None::<&str>, |best, s| match best {
                Some(b) if b.len() <= s.len() => Some(b),
                _ => Some(s),
            })
            .map(str::to_string);

        let short_names = distinct(members.iter().map(|m| m.short_name.as_deref()));
        let ontology_names = distinct(members.iter().map(|m| m.ontology_name.as_deref()));
        let ontology_ids = distinct(members.iter().map(|m| m.ontology_id.as_deref()));

        let rep = self.representative(&members);
        let (start, end) = (members[rep].start, members[rep].end);
        let feature_type = members[0].feature_type.clone();

        Domain {
            short_name,
            short_names,
            ontology_names,
            ontology_ids,
            start,
            end,
            length: self.length_convention.apply(start, end),
            feature_type,
            fragments: members,
            subdomains: Vec::new(),
        }
    }

    //index of the shortest (or longest) member, earliest wins ties
    fn representative(&self, members: &[Fragment]) -> usize {
        let mut best = 0;
        for (i, m) in members.iter().enumerate().skip(1) {
            let better = if self.shortest {
                m.length < members[best].length
            } else {
                m.length > members[best].length
            };
            if better {
                best = i;
            }
        }
        best
    }
}

fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values.flatten() {
        if !v.is_empty() && !out.iter().any(|o| o == v) {
            out.push(v.to_string());
        }
    }
    out
}

/// Cluster with the default representative policy (shortest member).
pub fn cluster(fragments: Vec<Fragment>, threshold: f64) -> Result<Vec<Domain>, AnatomyError> {
    FragmentClusterer::new(threshold)?.cluster(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{FeatureType, FragmentId};

    fn mk_frag(id: FragmentId, ipr: &str, parents: &[&str], start: i64, end: i64) -> Fragment {
        Fragment::new(id, format!("SIG{id}"), "Pfam", start, end, FeatureType::domain())
            .unwrap()
            .with_ontology(ipr, parents.iter().map(|p| p.to_string()).collect())
    }

    fn ids(d: &Domain) -> Vec<FragmentId> {
        d.fragments.iter().map(|f| f.internal_id).collect()
    }

    #[test]
    fn equivalence_by_id_or_ancestry() {
        let a = mk_frag(1, "IPR1", &[], 0, 10);
        let b = mk_frag(2, "IPR1", &[], 0, 10);
        let child = mk_frag(3, "IPR2", &["IPR1"], 0, 10);
        let other = mk_frag(4, "IPR9", &["IPR8"], 0, 10);

        assert!(equivalent(&a, &b));
        assert!(equivalent(&a, &child));
        assert!(equivalent(&child, &a));
        assert!(!equivalent(&a, &other));
    }

    #[test]
    fn low_overlap_keeps_fragments_apart() {
        //10 / 150 = 0.067 < 0.1, and the third hit is disjoint
        let frags = vec![
            mk_frag(1, "IPR1", &[], 0, 100),
            mk_frag(2, "IPR1", &[], 90, 150),
            mk_frag(3, "IPR2", &["IPR1"], 200, 300),
        ];
        let domains = cluster(frags.clone(), 0.1).unwrap();
        assert_eq!(domains.len(), 3);

        //lowering the bar merges the first two only
        let domains = cluster(frags, 0.05).unwrap();
        assert_eq!(domains.len(), 2);
        assert_eq!(ids(&domains[0]), vec![1, 2]);
        assert_eq!(ids(&domains[1]), vec![3]);
    }

    #[test]
    fn ancestry_alone_is_not_enough_without_overlap() {
        let frags = vec![
            mk_frag(1, "IPR1", &[], 0, 100),
            mk_frag(2, "IPR2", &["IPR1"], 100, 200),
        ];
        assert_eq!(cluster(frags, 0.1).unwrap().len(), 2);
    }

    #[test]
    fn membership_chains_through_later_members() {
        //3 does not overlap 1 but overlaps 2, which joined through 1
        let frags = vec![
            mk_frag(1, "IPR1", &[], 0, 100),
            mk_frag(2, "IPR1", &[], 50, 150),
            mk_frag(3, "IPR1", &[], 120, 220),
        ];
        let domains = cluster(frags, 0.1).unwrap();
        assert_eq!(domains.len(), 1);
        assert_eq!(ids(&domains[0]), vec![1, 2, 3]);
    }

    #[test]
    fn skipped_candidate_is_not_revisited_within_the_pass() {
        //2 is scanned before 3 joins, so it opens its own group
        let frags = vec![
            mk_frag(1, "IPR1", &[], 0, 100),
            mk_frag(2, "IPR5", &["IPR1"], 200, 300),
            mk_frag(3, "IPR1", &[], 60, 250),
        ];
        let domains = cluster(frags, 0.1).unwrap();
        assert_eq!(domains.len(), 2);
        assert_eq!(ids(&domains[0]), vec![1, 3]);
        assert_eq!(ids(&domains[1]), vec![2]);
    }

    #[test]
    fn labels_are_deduplicated_in_first_occurrence_order() {
        let frags = vec![
            mk_frag(1, "IPR2", &["IPR1"], 0, 100)
                .with_short_name("Kinase_dom")
                .with_ontology_name("Kinase domain"),
            mk_frag(2, "IPR1", &[], 5, 100).with_short_name("Kin"),
            mk_frag(3, "IPR2", &["IPR1"], 0, 90)
                .with_short_name("Kinase_dom")
                .with_ontology_name("Kinase domain"),
            mk_frag(4, "IPR1", &[], 0, 95).with_short_name("Pkn"),
        ];
        let domains = cluster(frags, 0.1).unwrap();
        assert_eq!(domains.len(), 1);
        let d = &domains[0];

        assert_eq!(d.short_names, vec!["Kinase_dom", "Kin", "Pkn"]);
        assert_eq!(d.ontology_names, vec!["Kinase domain"]);
        assert_eq!(d.ontology_ids, vec!["IPR2", "IPR1"]);
        //"Kin" and "Pkn" tie on length, the first one wins
        assert_eq!(d.short_name.as_deref(), Some("Kin"));
    }

    #[test]
    fn empty_short_names_are_ignored() {
        let frags = vec![
            mk_frag(1, "IPR1", &[], 0, 100).with_short_name(""),
            mk_frag(2, "IPR1", &[], 0, 100),
        ];
        let d = &cluster(frags, 0.1).unwrap()[0];
        assert!(d.short_name.is_none());
        assert!(d.short_names.is_empty());
    }

    #[test]
    fn representative_span_shortest_or_longest() {
        let frags = vec![
            mk_frag(1, "IPR1", &[], 0, 120),
            mk_frag(2, "IPR1", &[], 10, 110),
            mk_frag(3, "IPR1", &[], 20, 120),
            mk_frag(4, "IPR1", &[], 0, 150),
        ];

        let shortest = FragmentClusterer::new(0.1).unwrap().cluster(frags.clone()).unwrap();
        //2 and 3 both have length 100, 2 comes first
        assert_eq!((shortest[0].start, shortest[0].end, shortest[0].length), (10, 110, 100));

        let longest = FragmentClusterer::new(0.1)
            .unwrap()
            .with_shortest(false)
            .cluster(frags)
            .unwrap();
        assert_eq!((longest[0].start, longest[0].end, longest[0].length), (0, 150, 150));
    }

    #[test]
    fn legacy_length_convention_is_negative() {
        let frags = vec![mk_frag(1, "IPR1", &[], 10, 60)];
        let domains = FragmentClusterer::default()
            .with_length_convention(LengthConvention::StartMinusEnd)
            .cluster(frags)
            .unwrap();
        assert_eq!(domains[0].length, -50);
        //fragments keep the conventional length
        assert_eq!(domains[0].fragments[0].length, 50);
    }

    #[test]
    fn feature_type_comes_from_first_member() {
        let frags = vec![
            mk_frag(1, "IPR1", &[], 0, 100),
            Fragment::new(2, "SIG2", "SMART", 0, 100, FeatureType::repeat())
                .unwrap()
                .with_ontology("IPR1", vec![]),
        ];
        let d = &cluster(frags, 0.1).unwrap()[0];
        assert_eq!(d.feature_type, FeatureType::domain());
        assert_eq!(d.fragments.len(), 2);
    }

    #[test]
    fn empty_input_gives_no_domains() {
        assert!(cluster(Vec::new(), 0.1).unwrap().is_empty());
    }

    #[test]
    fn missing_ontology_id_is_rejected() {
        let bare = Fragment::new(7, "SIG7", "Pfam", 0, 10, FeatureType::domain()).unwrap();
        match cluster(vec![mk_frag(1, "IPR1", &[], 0, 10), bare], 0.1).unwrap_err() {
            AnatomyError::MissingOntologyId { internal_id } => assert_eq!(internal_id, 7),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        assert!(matches!(
            FragmentClusterer::new(1.2),
            Err(AnatomyError::InvalidThreshold { .. })
        ));
    }
}
