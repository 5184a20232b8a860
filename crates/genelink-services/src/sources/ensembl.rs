//! Ensembl REST API client.
//!
//! Positional annotation source: finds the genes in a window around a
//! variant's genomic coordinates via the overlap/region endpoint. Only HG38
//! positional keys are queried; the service has no batch form.
//!
//! Endpoint: https://rest.ensembl.org/overlap/region/human/{region}

use std::collections::HashSet;

use async_trait::async_trait;
use genelink_common::graph::{self, Edge, Node, Relation};
use genelink_common::http::AllowlistClient as Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::VariantGeneSource;
use crate::config::ServicesConfig;
use crate::identifiers::{positional_key, GenomeBuild};

const PROVIDED_BY: &str = "ensembl.variant_to_gene";

pub struct EnsemblClient {
    client: Client,
    base_url: String,
    region_size: u64,
}

impl EnsemblClient {
    pub fn new(config: &ServicesConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.ensembl_url.clone(),
            region_size: config.ensembl_region_size,
        }
    }

    async fn fetch_nearby_genes(
        &self,
        variant_id: &str,
        synonyms: &HashSet<String>,
    ) -> anyhow::Result<Vec<Relation>> {
        let Some(key) = positional_key(synonyms, GenomeBuild::Hg38) else {
            debug!(variant_id, "no HG38 positional synonym");
            return Ok(Vec::new());
        };
        let input_curie = key.to_curie();

        let url = format!(
            "{}/overlap/region/human/{}",
            self.base_url,
            key.windowed_region(self.region_size)
        );
        let resp = self
            .client
            .get(&url)?
            .query(&[("feature", "gene"), ("content-type", "application/json")])
            .send()
            .await?;
        if !resp.status().is_success() {
            warn!(
                variant_id,
                status = %resp.status(),
                "Ensembl returned a non-200 response"
            );
            return Ok(Vec::new());
        }

        let genes: Value = resp.json().await?;
        Ok(parse_overlap(variant_id, &input_curie, &genes))
    }
}

/// Map an overlap/region response onto gene relations. Entries without a
/// gene id are skipped.
fn parse_overlap(variant_id: &str, input_curie: &str, genes: &Value) -> Vec<Relation> {
    let mut relations = Vec::new();
    let Some(entries) = genes.as_array() else {
        warn!(variant_id, "Ensembl overlap response was not a list");
        return relations;
    };

    for entry in entries {
        let Some(gene_id) = entry["gene_id"].as_str().or_else(|| entry["id"].as_str()) else {
            continue;
        };
        let curie_id = format!("ENSEMBL:{}", gene_id);
        let name = entry["external_name"].as_str().unwrap_or(gene_id);

        let gene_node = Node::new(curie_id.clone(), name, graph::GENE);
        let edge = Edge::new(
            variant_id,
            curie_id,
            PROVIDED_BY,
            input_curie,
            "ENSEMBL:nearby_variant",
            "nearby_variant",
        );
        relations.push(Relation { edge, gene_node });
    }

    relations
}

#[async_trait]
impl VariantGeneSource for EnsemblClient {
    fn provided_by(&self) -> &'static str {
        PROVIDED_BY
    }

    #[instrument(skip(self, synonyms))]
    async fn variant_to_gene(
        &self,
        variant_id: &str,
        synonyms: &HashSet<String>,
    ) -> anyhow::Result<Vec<Relation>> {
        self.fetch_nearby_genes(variant_id, synonyms).await
    }
}
