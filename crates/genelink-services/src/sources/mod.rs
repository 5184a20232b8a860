//! Remote annotation source clients.

pub mod clingen;
pub mod ensembl;
pub mod hgnc;
pub mod myvariant;

use std::collections::HashSet;

use async_trait::async_trait;
use genelink_common::Relation;

pub use clingen::{ClinGenClient, RegistryError, SynonymizationResult};
pub use ensembl::EnsemblClient;
pub use hgnc::{HgncRecord, HgncTable};
pub use myvariant::MyVariantClient;

/// Common interface for all variant-to-gene annotation sources.
#[async_trait]
pub trait VariantGeneSource: Send + Sync {
    /// Provenance tag recorded on every edge this source emits.
    fn provided_by(&self) -> &'static str;

    /// Gene relations for a single variant. A synonym set this source
    /// recognizes no identifier in yields an empty list, not an error.
    async fn variant_to_gene(
        &self,
        variant_id: &str,
        synonyms: &HashSet<String>,
    ) -> anyhow::Result<Vec<Relation>>;
}
