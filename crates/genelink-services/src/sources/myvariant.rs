//! MyVariant.info REST API client.
//!
//! Accession-based annotation source: looks up snpeff consequence
//! annotations by MyVariant accession (e.g. `chr7:g.55241707G>T`) and maps
//! every transcript annotation onto a predicate-labeled edge to an HGNC
//! gene node.
//!
//! Endpoints used:
//!   single: GET  https://myvariant.info/v1/variant/{accession}
//!   bulk:   POST https://myvariant.info/v1/variant

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use genelink_common::curie;
use genelink_common::graph::{self, Edge, Node, Relation};
use genelink_common::http::AllowlistClient as Client;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use super::hgnc::HgncTable;
use super::VariantGeneSource;
use crate::config::ServicesConfig;
use crate::identifiers::{scheme_synonym, AccessionScheme};

const SNPEFF_FIELDS: &str = "snpeff.ann.effect,snpeff.ann.feature_type,snpeff.ann.genename";

/// The bulk endpoint caps requests at 1000 ids; larger inputs are chunked.
const BATCH_LIMIT: usize = 1000;

/// Effects that never correspond to a usable gene relation.
const EFFECT_IGNORE_LIST: [&str; 2] = ["intergenic_region", "sequence_feature"];

const PROVIDED_BY: &str = "myvariant.variant_to_gene";

pub struct MyVariantClient {
    client: Client,
    base_url: String,
    hgnc: Arc<HgncTable>,
    include_hg19: bool,
}

impl MyVariantClient {
    pub fn new(config: &ServicesConfig, client: Client, hgnc: Arc<HgncTable>) -> Self {
        Self {
            client,
            base_url: config.myvariant_url.clone(),
            hgnc,
            include_hg19: config.include_hg19_accessions,
        }
    }

    /// The accession scheme to query for this synonym set. HG38 accessions
    /// are preferred; HG19 is a fallback only under the configured policy.
    fn select_scheme(&self, synonyms: &HashSet<String>) -> Option<(AccessionScheme, &'static str)> {
        if scheme_synonym(synonyms, AccessionScheme::MyVariantHg38).is_some() {
            return Some((AccessionScheme::MyVariantHg38, "hg38"));
        }
        if self.include_hg19
            && scheme_synonym(synonyms, AccessionScheme::MyVariantHg19).is_some()
        {
            return Some((AccessionScheme::MyVariantHg19, "hg19"));
        }
        None
    }

    async fn fetch_variant(
        &self,
        variant_id: &str,
        synonyms: &HashSet<String>,
    ) -> anyhow::Result<Vec<Relation>> {
        let Some((scheme, assembly)) = self.select_scheme(synonyms) else {
            debug!(variant_id, "no MyVariant accession among synonyms");
            return Ok(Vec::new());
        };
        let input_curie = scheme_synonym(synonyms, scheme).unwrap_or_default();
        let accession = curie::reference(input_curie);

        let url = format!("{}/variant/{}", self.base_url, accession);
        let resp = self
            .client
            .get(&url)?
            .query(&[("assembly", assembly), ("fields", "snpeff")])
            .send()
            .await?;
        if !resp.status().is_success() {
            warn!(
                variant_id,
                status = %resp.status(),
                "MyVariant returned a non-200 response"
            );
            return Ok(Vec::new());
        }

        let annotation: Value = resp.json().await?;
        Ok(self.parse_annotation(variant_id, input_curie, &annotation))
    }

    /// Bulk variant-to-gene lookup. Returns one entry per input variant id;
    /// variants without a usable accession, and variants the service failed
    /// on, map to empty relation lists.
    #[instrument(skip(self, variants))]
    pub async fn batch_variant_to_gene(
        &self,
        variants: &HashMap<String, HashSet<String>>,
    ) -> anyhow::Result<HashMap<String, Vec<Relation>>> {
        let mut results: HashMap<String, Vec<Relation>> = variants
            .keys()
            .map(|variant_id| (variant_id.clone(), Vec::new()))
            .collect();

        // The service cannot mix assemblies in one call, so accessions are
        // grouped per assembly and posted separately.
        let mut batches: HashMap<AccessionScheme, Vec<(String, String)>> = HashMap::new();
        for (variant_id, synonyms) in variants {
            match self.select_scheme(synonyms) {
                Some((scheme, _)) => {
                    let synonym = scheme_synonym(synonyms, scheme).unwrap_or_default();
                    batches.entry(scheme).or_default().push((
                        curie::reference(synonym).to_string(),
                        variant_id.clone(),
                    ));
                }
                None => debug!(variant_id = variant_id.as_str(), "no MyVariant accession among synonyms"),
            }
        }

        if batches.is_empty() {
            warn!("batch lookup requested but no variant had a MyVariant accession");
            return Ok(results);
        }

        for (scheme, assembly) in [
            (AccessionScheme::MyVariantHg38, "hg38"),
            (AccessionScheme::MyVariantHg19, "hg19"),
        ] {
            let Some(mut batch) = batches.remove(&scheme) else {
                continue;
            };
            batch.sort();
            for chunk in batch.chunks(BATCH_LIMIT) {
                let lookup: HashMap<&str, &str> = chunk
                    .iter()
                    .map(|(accession, variant_id)| (accession.as_str(), variant_id.as_str()))
                    .collect();
                let ids = chunk
                    .iter()
                    .map(|(accession, _)| accession.as_str())
                    .collect::<Vec<_>>()
                    .join(",");

                let annotations = match self.post_batch(&ids, assembly).await {
                    Ok(annotations) => annotations,
                    Err(e) => {
                        // partial progress: the failed chunk's variants keep
                        // their empty entries
                        error!(assembly, error = %e, "MyVariant batch call failed");
                        continue;
                    }
                };

                for annotation in &annotations {
                    let Some(accession) = annotation["_id"].as_str() else {
                        // not-found entries echo the query with no `_id`
                        debug!(
                            query = annotation["query"].as_str().unwrap_or(""),
                            "no MyVariant annotation for accession"
                        );
                        continue;
                    };
                    let Some(variant_id) = lookup.get(accession) else {
                        warn!(accession, "MyVariant returned an unrequested accession");
                        continue;
                    };
                    let input_curie = format!("{}:{}", scheme.prefix(), accession);
                    let relations = self.parse_annotation(variant_id, &input_curie, annotation);
                    if let Some(entry) = results.get_mut(*variant_id) {
                        entry.extend(relations);
                    }
                }
            }
        }

        Ok(results)
    }

    async fn post_batch(&self, ids: &str, assembly: &str) -> anyhow::Result<Vec<Value>> {
        let url = format!("{}/variant", self.base_url);
        let params = [("fields", SNPEFF_FIELDS), ("ids", ids), ("assembly", assembly)];
        let resp = self.client.post(&url)?.form(&params).send().await?;
        if !resp.status().is_success() {
            anyhow::bail!("MyVariant batch non-200 response: {}", resp.status());
        }
        let json: Value = resp.json().await?;
        match json {
            Value::Array(annotations) => Ok(annotations),
            _ => anyhow::bail!("MyVariant batch response was not a list"),
        }
    }

    /// Map one annotation document onto gene relations.
    ///
    /// `snpeff.ann` is a list or a single object depending on hit count.
    /// Only transcript annotations are taken; symbols with no HGNC id are
    /// skipped; effect codes are passed through verbatim as
    /// `SNPEFF:{effect}`, mapped or not.
    fn parse_annotation(&self, variant_id: &str, input_curie: &str, annotation: &Value) -> Vec<Relation> {
        let mut relations = Vec::new();

        let ann = &annotation["snpeff"]["ann"];
        if ann.is_null() {
            debug!(variant_id, "no snpeff annotation for variant");
            return relations;
        }
        let entries: Vec<&Value> = match ann.as_array() {
            Some(list) => list.iter().collect(),
            None => vec![ann],
        };

        for entry in entries {
            if entry["feature_type"].as_str() != Some("transcript") {
                continue;
            }
            let Some(gene_symbol) = entry["genename"].as_str() else {
                continue;
            };
            let Some(gene_id) = self.hgnc.gene_id_from_symbol(gene_symbol) else {
                debug!(gene_symbol, "no HGNC id for reported gene symbol");
                continue;
            };
            let gene_node = Node::new(gene_id, gene_symbol, graph::GENE);

            for effect in entry["effect"].as_str().unwrap_or_default().split('&') {
                if effect.is_empty() || EFFECT_IGNORE_LIST.contains(&effect) {
                    continue;
                }
                let edge = Edge::new(
                    variant_id,
                    gene_node.id.clone(),
                    PROVIDED_BY,
                    input_curie,
                    format!("SNPEFF:{}", effect),
                    effect,
                );
                relations.push(Relation {
                    edge,
                    gene_node: gene_node.clone(),
                });
            }
        }

        relations
    }
}

#[async_trait]
impl VariantGeneSource for MyVariantClient {
    fn provided_by(&self) -> &'static str {
        PROVIDED_BY
    }

    #[instrument(skip(self, synonyms))]
    async fn variant_to_gene(
        &self,
        variant_id: &str,
        synonyms: &HashSet<String>,
    ) -> anyhow::Result<Vec<Relation>> {
        self.fetch_variant(variant_id, synonyms).await
    }
}
