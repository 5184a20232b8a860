//! genelink-services — variant-to-gene resolution against remote annotation
//! services.
//!
//! Given a variant's synonym identifiers, this crate selects the applicable
//! services (MyVariant.info for accession lookups, Ensembl for positional
//! lookups), issues singleton or batched queries, and maps the raw payloads
//! into predicate-labeled edges onto gene nodes. A ClinGen Allele Registry
//! client produces the synonym sets in the first place.

pub mod config;
pub mod identifiers;
pub mod normalize;
pub mod services;
pub mod sources;

pub use config::ServicesConfig;
pub use normalize::{Normalization, VariantNormalizer};
pub use services::{GeneService, GeneticsServices, ServiceSelector};
