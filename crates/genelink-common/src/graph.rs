//! Graph components returned by variant-to-gene lookups.
//!
//! These are transient query results, not stored state: adapters materialize
//! a gene `Node` and a predicate-labeled `Edge` for every hit, and callers
//! receive them paired up as `Relation`s.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::curie;

/// Ontology type for variant nodes.
pub const SEQUENCE_VARIANT: &str = "sequence_variant";
/// Ontology type for gene nodes.
pub const GENE: &str = "gene";

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A graph node: a sequence variant or a gene.
///
/// Equality is by identifier only; two nodes with the same CURIE refer to the
/// same real-world entity regardless of name or synonym differences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// CURIE identifier, e.g. `HGNC:758`.
    pub id: String,
    /// Display name, e.g. `ASS1`.
    pub name: String,
    /// Ontology type, one of [`SEQUENCE_VARIANT`] or [`GENE`].
    pub node_type: String,
    /// Alternate identifiers for the same entity across naming schemes.
    pub synonyms: HashSet<String>,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: node_type.to_string(),
            synonyms: HashSet::new(),
        }
    }

    pub fn with_synonyms(mut self, synonyms: impl IntoIterator<Item = String>) -> Self {
        self.synonyms.extend(synonyms);
        self
    }

    pub fn add_synonyms(&mut self, synonyms: impl IntoIterator<Item = String>) {
        self.synonyms.extend(synonyms);
    }

    /// Synonyms carrying the given CURIE prefix, sorted for deterministic
    /// selection.
    pub fn synonyms_by_prefix(&self, prefix: &str) -> Vec<&str> {
        curie::filter_by_prefix(prefix, &self.synonyms)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// ---------------------------------------------------------------------------
// Edge / Relation
// ---------------------------------------------------------------------------

/// A directed variant-to-gene relation.
///
/// Edges carry no identity beyond (source, predicate, target); duplicates
/// across services are additive and never deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Queried variant CURIE.
    pub source_id: String,
    /// Gene CURIE.
    pub target_id: String,
    /// Adapter that produced this edge, e.g. `myvariant.variant_to_gene`.
    pub provided_by: String,
    /// The identifier actually sent to the remote service.
    pub input_id: String,
    /// Namespaced predicate, e.g. `SNPEFF:missense_variant`.
    pub predicate_id: String,
    /// Human-readable predicate label, e.g. `missense_variant`.
    pub predicate_label: String,
    pub ctime: DateTime<Utc>,
}

impl Edge {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        provided_by: impl Into<String>,
        input_id: impl Into<String>,
        predicate_id: impl Into<String>,
        predicate_label: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            provided_by: provided_by.into(),
            input_id: input_id.into(),
            predicate_id: predicate_id.into(),
            predicate_label: predicate_label.into(),
            ctime: Utc::now(),
        }
    }
}

/// The unit returned by every lookup: "this variant has this predicate to
/// this gene".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    pub edge: Edge,
    pub gene_node: Node,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_equality_is_by_id() {
        let a = Node::new("HGNC:1100", "BRCA1", GENE);
        let b = Node::new("HGNC:1100", "brca1 renamed", GENE);
        let c = Node::new("HGNC:758", "ASS1", GENE);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_synonyms_by_prefix() {
        let node = Node::new("CAID:CA128085", "rs671", SEQUENCE_VARIANT).with_synonyms([
            "DBSNP:rs671".to_string(),
            "HGVS:NC_000012.12:g.111803962G>A".to_string(),
            "CLINVARVARIANT:18390".to_string(),
        ]);
        assert_eq!(node.synonyms_by_prefix("DBSNP"), vec!["DBSNP:rs671"]);
        assert_eq!(node.synonyms_by_prefix("dbsnp"), vec!["DBSNP:rs671"]);
        assert!(node.synonyms_by_prefix("LOCUS").is_empty());
    }

    #[test]
    fn test_edge_new_fills_timestamp() {
        let edge = Edge::new(
            "CAID:CA128085",
            "HGNC:1100",
            "myvariant.variant_to_gene",
            "MYVARIANT_HG38:chr17:g.43009069G>C",
            "SNPEFF:missense_variant",
            "missense_variant",
        );
        assert_eq!(edge.predicate_label, "missense_variant");
        assert!(edge.ctime <= Utc::now());
    }
}
