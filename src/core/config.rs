// run parameters for an anatomy
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::ancestry::DEFAULT_MAX_ANCESTRY_DEPTH;
use crate::core::cluster::{DEFAULT_MERGE_THRESHOLD, FragmentClusterer};
use crate::core::error::{AnatomyError, check_threshold};
use crate::core::export;
use crate::core::nest::{DEFAULT_MAX_LEVEL, DEFAULT_NEST_THRESHOLD, DomainNester};
use crate::core::types::LengthConvention;

//signature databases whose hits never make it into an anatomy
pub const DEFAULT_IGNORED_DATABASES: [&str; 5] = ["PANTHER", "SignalP", "Seg", "Tmhmm", "PRINTS"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnatomyConfig {
    pub merge_threshold: f64,
    pub shortest: bool,
    pub length_convention: LengthConvention,
    pub nest_threshold: f64,
    pub max_level: usize,
    pub merge: bool,
    pub nest: bool,
    pub ignored_databases: Vec<String>,
    pub max_ancestry_depth: usize,
}

impl Default for AnatomyConfig {
    fn default() -> Self {
        Self {
            merge_threshold: DEFAULT_MERGE_THRESHOLD,
            shortest: true,
            length_convention: LengthConvention::default(),
            nest_threshold: DEFAULT_NEST_THRESHOLD,
            max_level: DEFAULT_MAX_LEVEL,
            merge: true,
            nest: true,
            ignored_databases: DEFAULT_IGNORED_DATABASES.iter().map(|s| s.to_string()).collect(),
            max_ancestry_depth: DEFAULT_MAX_ANCESTRY_DEPTH,
        }
    }
}

impl AnatomyConfig {
    pub fn validate(&self) -> Result<(), AnatomyError> {
        check_threshold("merge_threshold", self.merge_threshold)?;
        check_threshold("nest_threshold", self.nest_threshold)?;
        if self.nest && !self.merge {
            return Err(AnatomyError::NestWithoutMerge);
        }
        Ok(())
    }

    pub fn from_json_str(text: &str) -> Result<Self, AnatomyError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toon_str(text: &str) -> Result<Self, AnatomyError> {
        let config: Self = export::from_toon(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json` or `.toon` file; anything else is read as TOON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AnatomyError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_toon_str(&text),
        }
    }

    pub fn clusterer(&self) -> Result<FragmentClusterer, AnatomyError> {
        Ok(FragmentClusterer::new(self.merge_threshold)?
            .with_shortest(self.shortest)
            .with_length_convention(self.length_convention))
    }

    pub fn nester(&self) -> Result<DomainNester, AnatomyError> {
        DomainNester::new(self.nest_threshold, self.max_level)
    }

    pub fn is_ignored_database(&self, database: &str) -> bool {
        self.ignored_databases.iter().any(|d| d == database)
    }
}
