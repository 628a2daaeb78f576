// ontology lookups + ancestor chains
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::error::AnatomyError;
use crate::core::export;

pub const DEFAULT_MAX_ANCESTRY_DEPTH: usize = 64;

/// What the ontology store knows about one signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEntry {
    pub short_name: Option<String>,
    pub parent_id: Option<String>,
}

/// Read access to the signature ontology.
///
/// `None` means the store has no entry for the id; resolvers treat that as
/// reaching the root, not as an error.
pub trait OntologyLookup {
    fn lookup_signature(&self, ontology_id: &str) -> Option<SignatureEntry>;
}

impl<T: OntologyLookup + ?Sized> OntologyLookup for &T {
    fn lookup_signature(&self, ontology_id: &str) -> Option<SignatureEntry> {
        (**self).lookup_signature(ontology_id)
    }
}

/// One row of a serialized ontology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyRecord {
    pub id: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Map-backed ontology, for callers that load the whole table up front.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOntology {
    entries: HashMap<String, SignatureEntry>,
}

impl InMemoryOntology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signature(mut self, id: &str, short_name: Option<&str>, parent_id: Option<&str>) -> Self {
        self.insert(id, short_name, parent_id);
        self
    }

    //later records for the same id overwrite earlier ones
    pub fn insert(&mut self, id: &str, short_name: Option<&str>, parent_id: Option<&str>) -> Option<SignatureEntry> {
        self.entries.insert(
            id.to_string(),
            SignatureEntry {
                short_name: short_name.map(str::to_string),
                parent_id: parent_id.map(str::to_string),
            },
        )
    }

    pub fn from_records(records: impl IntoIterator<Item = OntologyRecord>) -> Self {
        let mut ontology = Self::new();
        for r in records {
            ontology.insert(&r.id, r.short_name.as_deref(), r.parent_id.as_deref());
        }
        ontology
    }

    pub fn from_json(text: &str) -> Result<Self, AnatomyError> {
        let records: Vec<OntologyRecord> = serde_json::from_str(text)?;
        Ok(Self::from_records(records))
    }

    pub fn from_toon(text: &str) -> Result<Self, AnatomyError> {
        let records: Vec<OntologyRecord> = export::from_toon(text)?;
        Ok(Self::from_records(records))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl OntologyLookup for InMemoryOntology {
    fn lookup_signature(&self, ontology_id: &str) -> Option<SignatureEntry> {
        self.entries.get(ontology_id).cloned()
    }
}

/// Walks an ontology upward to build ancestor chains (immediate parent first).
#[derive(Debug, Clone)]
pub struct AncestryResolver<L> {
    lookup: L,
    max_depth: usize,
}

impl<L: OntologyLookup> AncestryResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            max_depth: DEFAULT_MAX_ANCESTRY_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Ancestors of `ontology_id`, taking its declared parent from the store.
    pub fn resolve_ancestors(&self, ontology_id: &str) -> Result<Vec<String>, AnatomyError> {
        let declared = self
            .lookup
            .lookup_signature(ontology_id)
            .and_then(|e| e.parent_id);
        self.resolve_from_parent(ontology_id, declared.as_deref())
    }

    /// Ancestors of `ontology_id` starting at the parent declared by the raw
    /// record. Each further step asks the store for the parent's parent.
    ///
    /// A repeated id is an ontology cycle and aborts the resolution; so does a
    /// chain longer than the configured maximum depth.
    pub fn resolve_from_parent(
        &self,
        ontology_id: &str,
        declared_parent: Option<&str>,
    ) -> Result<Vec<String>, AnatomyError> {
        let mut chain: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(ontology_id.to_string());

        let mut parent = declared_parent.filter(|p| !p.is_empty()).map(str::to_string);
        while let Some(current) = parent {
            if !seen.insert(current.clone()) {
                return Err(AnatomyError::OntologyCycle {
                    ontology_id: ontology_id.to_string(),
                    repeated: current,
                });
            }
            if chain.len() == self.max_depth {
                return Err(AnatomyError::AncestryTooDeep {
                    ontology_id: ontology_id.to_string(),
                    max_depth: self.max_depth,
                });
            }

            //missing entry == root
            parent = self
                .lookup
                .lookup_signature(&current)
                .and_then(|e| e.parent_id)
                .filter(|p| !p.is_empty());
            chain.push(current);
        }

        trace!(ontology_id, depth = chain.len(), "resolved ancestor chain");
        Ok(chain)
    }
}
