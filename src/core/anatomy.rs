// records -> fragments -> domains -> nested domains
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::ancestry::OntologyLookup;
use crate::core::config::AnatomyConfig;
use crate::core::error::AnatomyError;
use crate::core::types::{Domain, Fragment};
use crate::mapping::generator::{FeatureRecord, FragmentGenerator};

/// Structural domains found on one protein.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinAnatomy {
    pub accession: String,
    pub domains: Vec<Domain>,
}

impl ProteinAnatomy {
    pub fn fragment_count(&self) -> usize {
        self.domains.iter().map(|d| d.iter_fragments().count()).sum()
    }

    /// Top-level domains and repeats, by start position.
    pub fn structural_domains(&self) -> Vec<&Domain> {
        let mut out: Vec<&Domain> = self
            .domains
            .iter()
            .filter(|d| d.feature_type.is_structural())
            .collect();
        out.sort_by_key(|d| d.start);
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct Anatomizer {
    config: AnatomyConfig,
}

impl Anatomizer {
    pub fn new(config: AnatomyConfig) -> Result<Self, AnatomyError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnatomyConfig {
        &self.config
    }

    /// Merge fragments into domains (or one domain per fragment when merging
    /// is off), then nest them if enabled.
    pub fn anatomize(&self, fragments: Vec<Fragment>) -> Result<Vec<Domain>, AnatomyError> {
        if !self.config.merge {
            debug!(fragments = fragments.len(), "merging disabled, one domain per fragment");
            return Ok(fragments.into_iter().map(Domain::from_fragment).collect());
        }

        let domains = self.config.clusterer()?.cluster(fragments)?;
        if !self.config.nest {
            return Ok(domains);
        }
        Ok(self.config.nester()?.nest(domains))
    }

    pub fn run<L: OntologyLookup>(
        &self,
        accession: &str,
        records: &[FeatureRecord],
        lookup: L,
    ) -> Result<ProteinAnatomy, AnatomyError> {
        let fragments = FragmentGenerator::from_config(lookup, &self.config).generate(records)?;
        let domains = self.anatomize(fragments)?;

        let anatomy = ProteinAnatomy {
            accession: accession.to_string(),
            domains,
        };
        info!(
            accession,
            records = records.len(),
            fragments = anatomy.fragment_count(),
            domains = anatomy.domains.len(),
            "anatomy built"
        );
        Ok(anatomy)
    }
}
