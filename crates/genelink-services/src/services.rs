//! Resolution orchestrator: the façade callers query variants through.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use genelink_common::error::{GenelinkError, Result};
use genelink_common::http::AllowlistClient;
use genelink_common::{Node, Relation};
use tracing::{error, info, warn};

use crate::config::ServicesConfig;
use crate::sources::{EnsemblClient, HgncTable, MyVariantClient, VariantGeneSource};

/// The variant-to-gene annotation services genelink can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneService {
    MyVariant,
    Ensembl,
}

impl GeneService {
    pub const ALL: [GeneService; 2] = [GeneService::MyVariant, GeneService::Ensembl];

    pub fn as_str(&self) -> &'static str {
        match self {
            GeneService::MyVariant => "myvariant",
            GeneService::Ensembl => "ensembl",
        }
    }

    /// True if the backing service accepts bulk multi-accession requests.
    pub fn supports_batch(&self) -> bool {
        matches!(self, GeneService::MyVariant)
    }
}

/// Which services a node-centric query fans out across.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceSelector {
    All,
    Only(GeneService),
}

impl ServiceSelector {
    pub fn services(&self) -> &[GeneService] {
        match self {
            ServiceSelector::All => &GeneService::ALL,
            ServiceSelector::Only(service) => std::slice::from_ref(service),
        }
    }
}

/// Variant-to-gene resolution against the configured annotation services.
///
/// Owns the adapters and the HGNC symbol table; the table is built exactly
/// once, at construction, and shared read-only between adapters.
pub struct GeneticsServices {
    hgnc: Arc<HgncTable>,
    myvariant: MyVariantClient,
    ensembl: EnsemblClient,
}

impl GeneticsServices {
    /// Construct with a freshly downloaded HGNC symbol table.
    pub async fn new(config: &ServicesConfig) -> Result<Self> {
        let client = AllowlistClient::new()?;
        let hgnc = Arc::new(HgncTable::from_download(&client, &config.hgnc_tsv_url).await?);
        Ok(Self::assemble(config, client, hgnc))
    }

    /// Construct around an already-built symbol table (offline use, tests,
    /// or a table shared across orchestrators).
    pub fn with_hgnc_table(config: &ServicesConfig, hgnc: Arc<HgncTable>) -> Result<Self> {
        let client = AllowlistClient::new()?;
        Ok(Self::assemble(config, client, hgnc))
    }

    fn assemble(config: &ServicesConfig, client: AllowlistClient, hgnc: Arc<HgncTable>) -> Self {
        info!(
            hgnc_records = hgnc.len(),
            "genetics services initialized"
        );
        Self {
            myvariant: MyVariantClient::new(config, client.clone(), hgnc.clone()),
            ensembl: EnsemblClient::new(config, client),
            hgnc,
        }
    }

    /// Stable gene id for a plain symbol, e.g. `BRCA1` → `HGNC:1100`.
    pub fn gene_id_from_symbol(&self, gene_symbol: &str) -> Option<&str> {
        self.hgnc.gene_id_from_symbol(gene_symbol)
    }

    /// Single-variant, single-service lookup. Data-availability gaps and
    /// per-variant transport failures yield an empty list, never an error.
    pub async fn query_variant_to_gene(
        &self,
        service: GeneService,
        variant_id: &str,
        synonyms: &HashSet<String>,
    ) -> Vec<Relation> {
        let result = match service {
            GeneService::MyVariant => self.myvariant.variant_to_gene(variant_id, synonyms).await,
            GeneService::Ensembl => self.ensembl.variant_to_gene(variant_id, synonyms).await,
        };
        match result {
            Ok(relations) => relations,
            Err(e) => {
                warn!(
                    service = service.as_str(),
                    variant_id,
                    error = %e,
                    "variant-to-gene query failed"
                );
                Vec::new()
            }
        }
    }

    /// Bulk lookup against a batchable service. Every input variant id is
    /// present in the output mapping, resolved or not; asking a service
    /// with no batch form is a caller error.
    pub async fn batch_query_variant_to_gene(
        &self,
        service: GeneService,
        variants: &HashMap<String, HashSet<String>>,
    ) -> Result<HashMap<String, Vec<Relation>>> {
        match service {
            GeneService::MyVariant => Ok(self.run_myvariant_batch(variants).await),
            other => Err(GenelinkError::UnsupportedService(format!(
                "service {} has no batch form",
                other.as_str()
            ))),
        }
    }

    /// Node-centric fan-out: query every selected service with each node's
    /// synonyms, merging relations per originating node id. Every node gets
    /// an entry, empty when no selected service recognized a synonym.
    pub async fn variant_to_gene_for_nodes(
        &self,
        selector: ServiceSelector,
        nodes: &[Node],
    ) -> HashMap<String, Vec<Relation>> {
        let mut all_results: HashMap<String, Vec<Relation>> = nodes
            .iter()
            .map(|node| (node.id.clone(), Vec::new()))
            .collect();

        for service in selector.services() {
            match service {
                GeneService::MyVariant => {
                    // batched to minimize round trips
                    let variants: HashMap<String, HashSet<String>> = nodes
                        .iter()
                        .map(|node| (node.id.clone(), node.synonyms.clone()))
                        .collect();
                    for (node_id, relations) in self.run_myvariant_batch(&variants).await {
                        all_results.entry(node_id).or_default().extend(relations);
                    }
                }
                GeneService::Ensembl => {
                    for node in nodes {
                        let relations = self
                            .query_variant_to_gene(GeneService::Ensembl, &node.id, &node.synonyms)
                            .await;
                        all_results
                            .entry(node.id.clone())
                            .or_default()
                            .extend(relations);
                    }
                }
            }
        }

        all_results
    }

    async fn run_myvariant_batch(
        &self,
        variants: &HashMap<String, HashSet<String>>,
    ) -> HashMap<String, Vec<Relation>> {
        match self.myvariant.batch_variant_to_gene(variants).await {
            Ok(results) => results,
            Err(e) => {
                error!(error = %e, "MyVariant batch failed; all entries empty");
                variants
                    .keys()
                    .map(|variant_id| (variant_id.clone(), Vec::new()))
                    .collect()
            }
        }
    }
}
