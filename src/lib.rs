//! Protein anatomy: consolidates redundant signature hits on a protein into
//! non-redundant, possibly nested structural domains.
//!
//! raw records -> [`mapping::generator`] -> fragments -> [`core::cluster`]
//! -> flat domains -> [`core::nest`] -> domain forest.

pub mod core;
pub mod mapping;

pub use crate::core::anatomy::{Anatomizer, ProteinAnatomy};
pub use crate::core::ancestry::{AncestryResolver, InMemoryOntology, OntologyLookup, SignatureEntry};
pub use crate::core::cluster::{FragmentClusterer, cluster, equivalent};
pub use crate::core::config::AnatomyConfig;
pub use crate::core::error::AnatomyError;
pub use crate::core::nest::{DomainNester, nest};
pub use crate::core::overlap::{merge_overlap, nest_overlap};
pub use crate::core::types::{Domain, FeatureType, Fragment, FragmentId, LengthConvention, Span};
pub use crate::mapping::generator::{FeatureRecord, FragmentGenerator};
