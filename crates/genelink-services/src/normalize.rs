//! Variant identity normalization through the ClinGen Allele Registry.
//!
//! A variant node usually arrives under whichever identifier the caller
//! happened to have. Normalization expands that identifier into the full
//! synonym set and rewrites the node to the preferred identity: CAID for
//! the id when one exists, the dbSNP rsID for the display name.

use std::collections::{HashMap, HashSet};

use genelink_common::curie;
use genelink_common::http::AllowlistClient as Client;
use genelink_common::Node;
use tracing::{debug, warn};

use crate::config::ServicesConfig;
use crate::sources::clingen::ClinGenClient;

/// A resolved variant identity.
#[derive(Debug, Clone)]
pub struct Normalization {
    pub id: String,
    pub name: String,
    pub synonyms: HashSet<String>,
}

impl Normalization {
    /// The identity of an identifier the registry could not resolve: the
    /// node keeps itself as its only synonym.
    fn unresolved(node_id: &str) -> Self {
        Self {
            id: node_id.to_string(),
            name: curie::reference(node_id).to_string(),
            synonyms: HashSet::from([node_id.to_string()]),
        }
    }
}

pub struct VariantNormalizer {
    clingen: ClinGenClient,
}

impl VariantNormalizer {
    pub fn new(config: &ServicesConfig, client: Client) -> Self {
        Self {
            clingen: ClinGenClient::new(config, client),
        }
    }

    /// Rewrite one node to its preferred identity, attaching the full
    /// synonym set. An identifier the registry cannot resolve leaves the
    /// node unchanged apart from gaining itself as a synonym.
    pub async fn normalize(&self, node: &mut Node) {
        let normalization = self.variant_normalization(&node.id).await;
        apply_normalization(node, normalization);
    }

    /// Normalize a batch of nodes. Nodes carrying an HGVS synonym go
    /// through one bulk registry call; the rest fall back to single
    /// lookups.
    pub async fn batch_normalize(&self, nodes: &mut [Node]) {
        let mut batched: Vec<usize> = Vec::new();
        let mut hgvs_curies: Vec<String> = Vec::new();
        for (i, node) in nodes.iter().enumerate() {
            if let Some(hgvs) = hgvs_synonym(node) {
                batched.push(i);
                hgvs_curies.push(hgvs);
            }
        }

        let batch_normalizations = self.batch_hgvs_normalization(&hgvs_curies).await;

        for (slot, i) in batched.iter().enumerate() {
            let node = &mut nodes[*i];
            let key = &hgvs_curies[slot];
            match batch_normalizations.as_ref().ok().and_then(|map| map.get(key)) {
                Some(normalization) if normalization.synonyms.len() > 1 => {
                    apply_normalization(node, normalization.clone());
                }
                _ => {
                    // the HGVS id did not resolve in bulk; a node that has
                    // other identifiers still gets a single lookup
                    if node.synonyms.len() > 1 {
                        let normalization = self.variant_normalization(&node.id).await;
                        apply_normalization(node, normalization);
                    } else {
                        let unresolved = Normalization::unresolved(&node.id);
                        apply_normalization(node, unresolved);
                    }
                }
            }
        }

        for (i, node) in nodes.iter_mut().enumerate() {
            if !batched.contains(&i) {
                let normalization = self.variant_normalization(&node.id).await;
                apply_normalization(node, normalization);
            }
        }
    }

    /// The normalization for a single identifier: expanded synonyms plus
    /// the preferred id/name pair.
    pub async fn variant_normalization(&self, node_id: &str) -> Normalization {
        let synonyms = self.expanded_synonyms(node_id).await;
        match preferred_id_and_name(&synonyms) {
            Some((id, name)) => Normalization { id, name, synonyms },
            None => Normalization::unresolved(node_id),
        }
    }

    /// Bulk normalization for plain HGVS curies, keyed by input curie.
    /// Identifiers that fail to resolve map to an unresolved identity.
    pub async fn batch_hgvs_normalization(
        &self,
        hgvs_curies: &[String],
    ) -> genelink_common::Result<HashMap<String, Normalization>> {
        let results = self.clingen.batch_synonyms(hgvs_curies).await?;

        let mut normalizations = HashMap::with_capacity(hgvs_curies.len());
        for (hgvs_curie, result) in hgvs_curies.iter().zip(results) {
            let normalization = match result {
                Ok(mut synonyms) => {
                    synonyms.insert(hgvs_curie.clone());
                    match preferred_id_and_name(&synonyms) {
                        Some((id, name)) => Normalization { id, name, synonyms },
                        None => Normalization::unresolved(hgvs_curie),
                    }
                }
                Err(e) => {
                    debug!(hgvs_curie = hgvs_curie.as_str(), error = %e, "registry could not resolve identifier");
                    Normalization::unresolved(hgvs_curie)
                }
            };
            normalizations.insert(hgvs_curie.clone(), normalization);
        }
        Ok(normalizations)
    }

    /// The node's synonym set expanded through the registry; always
    /// contains the queried identifier itself.
    async fn expanded_synonyms(&self, node_id: &str) -> HashSet<String> {
        let mut synonyms: HashSet<String> = HashSet::from([node_id.to_string()]);

        let results = if curie::has_prefix(node_id, "CAID") {
            vec![self.clingen.synonyms_by_caid(curie::reference(node_id)).await]
        } else if curie::has_prefix(node_id, "HGVS")
            || curie::has_prefix(node_id, "MYVARIANT_HG38")
        {
            match self
                .clingen
                .batch_synonyms(std::slice::from_ref(&node_id.to_string()))
                .await
            {
                Ok(results) => results,
                Err(e) => {
                    warn!(node_id, error = %e, "registry batch lookup failed");
                    Vec::new()
                }
            }
        } else {
            self.clingen.synonyms_by_other_id(node_id).await
        };

        for result in results {
            match result {
                Ok(expanded) => synonyms.extend(expanded),
                Err(e) => debug!(node_id, error = %e, "registry lookup gave no synonyms"),
            }
        }
        synonyms
    }
}

fn apply_normalization(node: &mut Node, normalization: Normalization) {
    node.id = normalization.id;
    node.name = normalization.name;
    node.add_synonyms(normalization.synonyms);
}

/// The HGVS curie a node should be batch-normalized under, if any.
fn hgvs_synonym(node: &Node) -> Option<String> {
    if let Some(first) = node.synonyms_by_prefix("HGVS").first() {
        return Some(first.to_string());
    }
    if curie::has_prefix(&node.id, "HGVS") {
        return Some(node.id.clone());
    }
    None
}

/// The preferred (id, name) pair for a synonym set: CAID wins the id,
/// a dbSNP rsID wins the name, otherwise the lexicographically first
/// synonym stands in for both. `None` only for an empty set.
fn preferred_id_and_name(synonyms: &HashSet<String>) -> Option<(String, String)> {
    let caid = curie::filter_by_prefix("CAID", synonyms).first().map(|s| s.to_string());
    let dbsnp = curie::filter_by_prefix("DBSNP", synonyms).first().map(|s| s.to_string());

    let mut id = caid.clone();
    let mut name = caid.map(|c| curie::reference(&c).to_string());

    if let Some(rsid) = dbsnp {
        name = Some(curie::reference(&rsid).to_string());
        if id.is_none() {
            id = Some(rsid);
        }
    }

    match (id, name) {
        (Some(id), Some(name)) => Some((id, name)),
        _ => {
            let mut sorted: Vec<&String> = synonyms.iter().collect();
            sorted.sort_unstable();
            let arbitrary = sorted.first()?;
            Some((
                arbitrary.to_string(),
                curie::reference(arbitrary).to_string(),
            ))
        }
    }
}
