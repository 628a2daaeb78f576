use thiserror::Error;

use crate::core::types::FragmentId;

#[derive(Debug, Error)]
pub enum AnatomyError {
    #[error("invalid span for signature {signature_id}: start {start} must be lower than end {end}")]
    InvalidSpan {
        signature_id: String,
        start: i64,
        end: i64,
    },

    //contract violation: producers must drop fragments that are not integrated in the ontology
    #[error("fragment {internal_id} has no ontology id")]
    MissingOntologyId { internal_id: FragmentId },

    #[error("ontology cycle while resolving ancestors of {ontology_id}: {repeated} seen twice")]
    OntologyCycle {
        ontology_id: String,
        repeated: String,
    },

    #[error("ancestor chain of {ontology_id} exceeds {max_depth} levels")]
    AncestryTooDeep { ontology_id: String, max_depth: usize },

    #[error("{name} must be a finite value in [0, 1], got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("cannot nest domains when merging is disabled")]
    NestWithoutMerge,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toon error: {0}")]
    Toon(String),
}

/// Checks that an overlap threshold is usable as a ratio cut-off.
pub fn check_threshold(name: &'static str, value: f64) -> Result<f64, AnatomyError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(AnatomyError::InvalidThreshold { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_bounds_are_inclusive() {
        assert_eq!(check_threshold("t", 0.0).unwrap(), 0.0);
        assert_eq!(check_threshold("t", 1.0).unwrap(), 1.0);
    }

    #[test]
    fn threshold_rejects_out_of_range_and_nan() {
        for bad in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            match check_threshold("merge_threshold", bad).unwrap_err() {
                AnatomyError::InvalidThreshold { name, .. } => assert_eq!(name, "merge_threshold"),
                other => panic!("unexpected error: {}", other),
            }
        }
    }

    #[test]
    fn cycle_error_names_both_ids() {
        let err = AnatomyError::OntologyCycle {
            ontology_id: "IPR000001".to_string(),
            repeated: "IPR000002".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("IPR000001"));
        assert!(msg.contains("IPR000002"));
    }
}
