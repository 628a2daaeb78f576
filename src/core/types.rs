// data model shared by clustering and nesting
use serde::{Deserialize, Serialize};

use crate::core::error::AnatomyError;

pub type FragmentId = u32;

/// Ontology category of a signature ("Domain", "Repeat", "Family", ...).
///
/// Kept open-ended: the ontology defines the categories, the anatomy only
/// cares whether a feature is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureType(pub String);

impl FeatureType {
    pub fn domain() -> Self {
        Self("Domain".to_string())
    }

    pub fn repeat() -> Self {
        Self("Repeat".to_string())
    }

    pub fn family() -> Self {
        Self("Family".to_string())
    }

    pub fn homologous_superfamily() -> Self {
        Self("Homologous_superfamily".to_string())
    }

    pub fn other(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    //only domains and repeats show up in an anatomy report
    pub fn is_structural(&self) -> bool {
        self.0 == "Domain" || self.0 == "Repeat"
    }
}

/// How a merged domain derives its `length` from the representative span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthConvention {
    /// `end - start`, same as `Fragment::length`.
    #[default]
    EndMinusStart,
    /// `start - end`, what existing anatomy consumers were fed historically.
    /// Negative lengths sort domains shortest-first and disable nesting.
    StartMinusEnd,
}

impl LengthConvention {
    pub fn apply(self, start: i64, end: i64) -> i64 {
        match self {
            LengthConvention::EndMinusStart => end - start,
            LengthConvention::StartMinusEnd => start - end,
        }
    }
}

/// Half-open residue interval `[start, end)` with a recorded length.
pub trait Span {
    fn start(&self) -> i64;
    fn end(&self) -> i64;
    fn length(&self) -> i64;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub internal_id: FragmentId,
    pub signature_name: Option<String>,
    pub signature_id: String,
    pub signature_database: String,
    pub start: i64,
    pub end: i64,
    pub length: i64,
    pub short_name: Option<String>,
    pub ontology_name: Option<String>,
    pub ontology_id: Option<String>,
    pub feature_type: FeatureType,
    pub ontology_ancestors: Vec<String>,
}

impl Fragment {
    /// Builds a fragment for a raw hit. Label fields start empty; see the
    /// `with_*` setters.
    pub fn new(
        internal_id: FragmentId,
        signature_id: impl Into<String>,
        signature_database: impl Into<String>,
        start: i64,
        end: i64,
        feature_type: FeatureType,
    ) -> Result<Self, AnatomyError> {
        let signature_id = signature_id.into();
        if start >= end {
            return Err(AnatomyError::InvalidSpan { signature_id, start, end });
        }

        Ok(Self {
            internal_id,
            signature_name: None,
            signature_id,
            signature_database: signature_database.into(),
            start,
            end,
            length: end - start,
            short_name: None,
            ontology_name: None,
            ontology_id: None,
            feature_type,
            ontology_ancestors: Vec::new(),
        })
    }

    pub fn with_signature_name(mut self, name: impl Into<String>) -> Self {
        self.signature_name = Some(name.into());
        self
    }

    pub fn with_ontology(mut self, id: impl Into<String>, ancestors: Vec<String>) -> Self {
        self.ontology_id = Some(id.into());
        self.ontology_ancestors = ancestors;
        self
    }

    pub fn with_ontology_name(mut self, name: impl Into<String>) -> Self {
        self.ontology_name = Some(name.into());
        self
    }

    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }
}

impl Span for Fragment {
    fn start(&self) -> i64 {
        self.start
    }

    fn end(&self) -> i64 {
        self.end
    }

    fn length(&self) -> i64 {
        self.length
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub short_name: Option<String>,
    pub short_names: Vec<String>,
    pub ontology_names: Vec<String>,
    pub ontology_ids: Vec<String>,
    pub start: i64,
    pub end: i64,
    pub length: i64,
    pub feature_type: FeatureType,
    pub fragments: Vec<Fragment>,
    pub subdomains: Vec<Domain>,
}

impl Domain {
    /// Single-fragment domain, used when fragments are not merged.
    pub fn from_fragment(fragment: Fragment) -> Self {
        let labels = |v: &Option<String>| -> Vec<String> {
            v.iter().filter(|s| !s.is_empty()).cloned().collect()
        };
        Self {
            short_name: fragment.short_name.clone().filter(|s| !s.is_empty()),
            short_names: labels(&fragment.short_name),
            ontology_names: labels(&fragment.ontology_name),
            ontology_ids: labels(&fragment.ontology_id),
            start: fragment.start,
            end: fragment.end,
            length: fragment.length,
            feature_type: fragment.feature_type.clone(),
            fragments: vec![fragment],
            subdomains: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.subdomains.is_empty()
    }

    //number of subdomain levels below this one, 0 for a leaf
    pub fn depth(&self) -> usize {
        self.subdomains
            .iter()
            .map(|d| d.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// This domain plus every nested subdomain.
    pub fn domain_count(&self) -> usize {
        1 + self.subdomains.iter().map(Domain::domain_count).sum::<usize>()
    }

    /// Fragments of this domain, then of each subdomain, pre-order.
    pub fn iter_fragments(&self) -> Box<dyn Iterator<Item = &Fragment> + '_> {
        Box::new(
            self.fragments
                .iter()
                .chain(self.subdomains.iter().flat_map(|d| d.iter_fragments())),
        )
    }
}

impl Span for Domain {
    fn start(&self) -> i64 {
        self.start
    }

    fn end(&self) -> i64 {
        self.end
    }

    fn length(&self) -> i64 {
        self.length
    }
}
