/*
Inputs:

    feature records (raw signature hits with residue coordinates)

    ontology lookup (short names + parents)

Outputs:

    fragments, numbered from 1 in input order, with ancestor chains

Dropped on the way:

    hits from ignored signature databases

    hits not integrated in the ontology (no ontology id)
*/
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::ancestry::{AncestryResolver, DEFAULT_MAX_ANCESTRY_DEPTH, OntologyLookup};
use crate::core::config::{AnatomyConfig, DEFAULT_IGNORED_DATABASES};
use crate::core::error::AnatomyError;
use crate::core::export;
use crate::core::types::{FeatureType, Fragment, FragmentId};

/// One raw hit as delivered by the annotation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(default)]
    pub signature_name: Option<String>,
    pub signature_id: String,
    pub signature_database: String,
    #[serde(default)]
    pub ontology_id: Option<String>,
    #[serde(default)]
    pub ontology_name: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub start: i64,
    pub end: i64,
    pub feature_type: FeatureType,
}

impl FeatureRecord {
    pub fn list_from_json(text: &str) -> Result<Vec<Self>, AnatomyError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn list_from_toon(text: &str) -> Result<Vec<Self>, AnatomyError> {
        export::from_toon(text)
    }
}

pub struct FragmentGenerator<L> {
    resolver: AncestryResolver<L>,
    ignored_databases: Vec<String>,
}

impl<L: OntologyLookup> FragmentGenerator<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            resolver: AncestryResolver::new(lookup).with_max_depth(DEFAULT_MAX_ANCESTRY_DEPTH),
            ignored_databases: DEFAULT_IGNORED_DATABASES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn from_config(lookup: L, config: &AnatomyConfig) -> Self {
        Self {
            resolver: AncestryResolver::new(lookup).with_max_depth(config.max_ancestry_depth),
            ignored_databases: config.ignored_databases.clone(),
        }
    }

    pub fn with_ignored_databases(mut self, databases: Vec<String>) -> Self {
        self.ignored_databases = databases;
        self
    }

    fn keeps(&self, record: &FeatureRecord) -> bool {
        if self.ignored_databases.iter().any(|d| *d == record.signature_database) {
            trace!(signature = %record.signature_id, database = %record.signature_database, "ignored database");
            return false;
        }
        if record.ontology_id.as_deref().is_none_or(str::is_empty) {
            trace!(signature = %record.signature_id, "not integrated in the ontology");
            return false;
        }
        true
    }

    /// Turn records into fragments ready for clustering.
    ///
    /// An ontology inconsistency (cycle, runaway depth) or an invalid span in
    /// any kept record aborts the whole generation.
    pub fn generate(&self, records: &[FeatureRecord]) -> Result<Vec<Fragment>, AnatomyError> {
        let mut fragments = Vec::new();
        let mut next_id: FragmentId = 1;

        for record in records.iter().filter(|r| self.keeps(r)) {
            let Some(ontology_id) = record.ontology_id.as_deref() else {
                continue;
            };
            let ancestors = self
                .resolver
                .resolve_from_parent(ontology_id, record.parent_id.as_deref())?;

            let mut fragment = Fragment::new(
                next_id,
                record.signature_id.clone(),
                record.signature_database.clone(),
                record.start,
                record.end,
                record.feature_type.clone(),
            )?
            .with_ontology(ontology_id, ancestors);

            fragment.signature_name = record.signature_name.clone();
            fragment.ontology_name = record.ontology_name.clone();
            fragment.short_name = self
                .resolver
                .lookup()
                .lookup_signature(ontology_id)
                .and_then(|e| e.short_name);

            fragments.push(fragment);
            next_id += 1;
        }

        debug!(records = records.len(), fragments = fragments.len(), "generated fragments");
        Ok(fragments)
    }
}
