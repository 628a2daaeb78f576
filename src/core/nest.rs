// containment tree of domains, bounded depth
use tracing::debug;

use crate::core::error::{AnatomyError, check_threshold};
use crate::core::overlap::nest_overlap;
use crate::core::types::Domain;

pub const DEFAULT_NEST_THRESHOLD: f64 = 0.7;
pub const DEFAULT_MAX_LEVEL: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainNester {
    threshold: f64,
    max_level: usize,
}

impl Default for DomainNester {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_NEST_THRESHOLD,
            max_level: DEFAULT_MAX_LEVEL,
        }
    }
}

/// Domains addressed by index while the tree is being decided.
///
/// `children[i]` collects the indices nested under domain `i`; the owned
/// tree is only assembled once every level is done.
struct NestArena {
    slots: Vec<Option<Domain>>,
    children: Vec<Vec<usize>>,
}

impl NestArena {
    fn new(domains: Vec<Domain>) -> Self {
        let children = vec![Vec::new(); domains.len()];
        Self {
            slots: domains.into_iter().map(Some).collect(),
            children,
        }
    }

    fn length(&self, i: usize) -> i64 {
        self.slots[i].as_ref().map_or(0, |d| d.length)
    }

    fn overlap(&self, owner: usize, other: usize) -> f64 {
        match (&self.slots[owner], &self.slots[other]) {
            (Some(a), Some(b)) => nest_overlap(a, b),
            _ => 0.0,
        }
    }

    //move domain i out of the arena with its nested children attached
    fn assemble(&mut self, i: usize) -> Option<Domain> {
        let mut domain = self.slots[i].take()?;
        let kids = std::mem::take(&mut self.children[i]);
        for k in kids {
            if let Some(child) = self.assemble(k) {
                domain.subdomains.push(child);
            }
        }
        Some(domain)
    }
}

impl DomainNester {
    pub fn new(threshold: f64, max_level: usize) -> Result<Self, AnatomyError> {
        Ok(Self {
            threshold: check_threshold("nest_threshold", threshold)?,
            max_level,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Nest `domains` into a forest at most `max_level` levels deep.
    ///
    /// Nested domains are appended after any subdomains a domain already had.
    pub fn nest(&self, domains: Vec<Domain>) -> Vec<Domain> {
        let total = domains.len();
        let mut arena = NestArena::new(domains);
        let top = self.nest_level(&mut arena, (0..total).collect(), 0);

        let forest: Vec<Domain> = top.into_iter().filter_map(|i| arena.assemble(i)).collect();
        debug!(
            domains = total,
            top_level = forest.len(),
            threshold = self.threshold,
            max_level = self.max_level,
            "nested domains"
        );
        forest
    }

    fn nest_level(&self, arena: &mut NestArena, mut members: Vec<usize>, level: usize) -> Vec<usize> {
        if level >= self.max_level {
            return members;
        }

        //longest first; stable sort keeps incoming order on ties
        members.sort_by(|&a, &b| arena.length(b).cmp(&arena.length(a)));

        let groups = self.partition(arena, &members);
        let mut result = Vec::with_capacity(groups.len());
        for (owner, direct) in groups {
            let nested = self.nest_level(arena, direct, level + 1);
            arena.children[owner].extend(nested);
            result.push(owner);
        }
        result
    }

    //owners in sorted order, each with the later members it absorbs
    fn partition(&self, arena: &NestArena, sorted: &[usize]) -> Vec<(usize, Vec<usize>)> {
        let mut absorbed = vec![false; sorted.len()];
        let mut groups = Vec::new();

        for (pos, &owner) in sorted.iter().enumerate() {
            if absorbed[pos] {
                continue;
            }
            absorbed[pos] = true;
            let mut direct = Vec::new();
            for later in (pos + 1)..sorted.len() {
                if absorbed[later] {
                    continue;
                }
                //siblings are only tested against the owner
                if arena.overlap(owner, sorted[later]) >= self.threshold {
                    absorbed[later] = true;
                    direct.push(sorted[later]);
                }
            }
            groups.push((owner, direct));
        }
        groups
    }
}

pub fn nest(domains: Vec<Domain>, threshold: f64, max_level: usize) -> Result<Vec<Domain>, AnatomyError> {
    Ok(DomainNester::new(threshold, max_level)?.nest(domains))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{FeatureType, Fragment, FragmentId};

    fn mk_domain(id: FragmentId, start: i64, end: i64) -> Domain {
        let f = Fragment::new(id, format!("SIG{id}"), "Pfam", start, end, FeatureType::domain())
            .unwrap()
            .with_ontology(format!("IPR{id}"), vec![]);
        Domain::from_fragment(f)
    }

    fn first_id(d: &Domain) -> FragmentId {
        d.fragments[0].internal_id
    }

    #[test]
    fn contained_domains_nest_under_the_longest() {
        let domains = vec![
            mk_domain(1, 100, 150),
            mk_domain(2, 0, 500),
            mk_domain(3, 50, 250),
        ];
        let forest = nest(domains, 0.7, 1).unwrap();

        assert_eq!(forest.len(), 1);
        let top = &forest[0];
        assert_eq!(top.length, 500);
        let kids: Vec<FragmentId> = top.subdomains.iter().map(first_id).collect();
        //absorbed in sorted (longest first) order
        assert_eq!(kids, vec![3, 1]);
        assert!(top.subdomains.iter().all(Domain::is_leaf));
    }

    #[test]
    fn second_level_nests_when_allowed() {
        let domains = vec![
            mk_domain(1, 100, 150),
            mk_domain(2, 0, 500),
            mk_domain(3, 50, 250),
        ];
        let forest = nest(domains, 0.7, 2).unwrap();

        assert_eq!(forest.len(), 1);
        let top = &forest[0];
        assert_eq!(top.subdomains.len(), 1);
        assert_eq!(first_id(&top.subdomains[0]), 3);
        assert_eq!(first_id(&top.subdomains[0].subdomains[0]), 1);
        assert_eq!(top.depth(), 2);
    }

    #[test]
    fn partial_overlap_below_threshold_stays_top_level() {
        //only 30 of 100 residues of domain 2 fall inside domain 1
        let forest = nest(vec![mk_domain(1, 0, 300), mk_domain(2, 270, 370)], 0.7, 1).unwrap();
        assert_eq!(forest.len(), 2);
        assert!(forest.iter().all(Domain::is_leaf));
    }

    #[test]
    fn equal_lengths_never_nest_and_keep_input_order() {
        let forest = nest(vec![mk_domain(1, 0, 100), mk_domain(2, 0, 100)], 0.7, 1).unwrap();
        let order: Vec<FragmentId> = forest.iter().map(first_id).collect();
        assert_eq!(order, vec![1, 2]);
    }

    #[test]
    fn siblings_are_not_tested_against_each_other() {
        //3 sits inside 2 but 2 is absorbed by 1 at this level; with one level
        //both end up as direct children of 1
        let forest = nest(
            vec![mk_domain(1, 0, 1000), mk_domain(2, 0, 400), mk_domain(3, 10, 100)],
            0.7,
            1,
        )
        .unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].subdomains.len(), 2);
    }

    #[test]
    fn max_level_zero_returns_input_untouched() {
        let input = vec![mk_domain(1, 100, 150), mk_domain(2, 0, 500)];
        let forest = nest(input.clone(), 0.7, 0).unwrap();
        assert_eq!(forest, input);
    }

    #[test]
    fn negative_lengths_disable_nesting() {
        let mut outer = mk_domain(1, 0, 500);
        let mut inner = mk_domain(2, 100, 200);
        outer.length = -500;
        inner.length = -100;
        let forest = nest(vec![outer, inner], 0.7, 1).unwrap();
        assert_eq!(forest.len(), 2);
        //"longest" first is the least negative
        assert_eq!(first_id(&forest[0]), 2);
    }

    #[test]
    fn empty_input_nests_to_empty() {
        assert!(nest(Vec::new(), 0.7, 1).unwrap().is_empty());
    }

    #[test]
    fn existing_subdomains_are_kept() {
        let mut outer = mk_domain(1, 0, 500);
        outer.subdomains.push(mk_domain(9, 400, 450));
        let forest = nest(vec![outer, mk_domain(2, 10, 60)], 0.7, 1).unwrap();
        let kids: Vec<FragmentId> = forest[0].subdomains.iter().map(first_id).collect();
        assert_eq!(kids, vec![9, 2]);
    }
}
