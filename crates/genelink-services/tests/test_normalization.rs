//! Variant normalization tests against the live ClinGen Allele Registry.
//!
//! Run with:
//!   cargo test --package genelink-services --test test_normalization -- --ignored --nocapture

use genelink_common::graph::{Node, SEQUENCE_VARIANT};
use genelink_common::http::AllowlistClient;
use genelink_services::{ServicesConfig, VariantNormalizer};

fn normalizer() -> VariantNormalizer {
    VariantNormalizer::new(&ServicesConfig::default(), AllowlistClient::new().unwrap())
}

#[tokio::test]
#[ignore] // Requires network access
async fn test_normalization_by_caid() {
    let normalization = normalizer().variant_normalization("CAID:CA128085").await;

    assert_eq!(normalization.id, "CAID:CA128085");
    assert_eq!(normalization.name, "rs671");
    assert!(normalization
        .synonyms
        .contains("HGVS:NC_000012.12:g.111803962G>A"));
    assert!(normalization.synonyms.contains("CLINVARVARIANT:18390"));
    assert!(normalization.synonyms.contains("DBSNP:rs671"));
}

#[tokio::test]
#[ignore] // Requires network access
async fn test_normalization_by_clinvar_id() {
    let normalization = normalizer()
        .variant_normalization("CLINVARVARIANT:18390")
        .await;
    assert_eq!(normalization.id, "CAID:CA128085");
    assert_eq!(normalization.name, "rs671");
}

#[tokio::test]
#[ignore] // Requires network access
async fn test_normalization_of_triallelic_rsid() {
    // rs369602258 is tri-allelic; every matching registry allele contributes
    let normalization = normalizer()
        .variant_normalization("DBSNP:rs369602258")
        .await;

    assert_eq!(normalization.name, "rs369602258");
    assert!(normalization
        .synonyms
        .contains("MYVARIANT_HG38:chr11:g.68032291C>T"));
    assert!(normalization
        .synonyms
        .contains("MYVARIANT_HG38:chr11:g.68032291C>G"));
    assert!(normalization.synonyms.contains("CAID:CA6146346"));
    assert!(normalization.synonyms.contains("CAID:CA321211"));
}

#[tokio::test]
#[ignore] // Requires network access
async fn test_normalization_by_hgvs() {
    let normalization = normalizer()
        .variant_normalization("HGVS:NC_000023.11:g.32389644G>A")
        .await;

    assert_eq!(normalization.id, "CAID:CA267021");
    assert_eq!(normalization.name, "rs398123953");
    assert!(normalization
        .synonyms
        .contains("MYVARIANT_HG38:chrX:g.32389644G>A"));
    assert!(normalization.synonyms.contains("CLINVARVARIANT:94623"));
    assert!(normalization.synonyms.contains("DBSNP:rs398123953"));
    assert!(normalization
        .synonyms
        .contains("LOCUS:HG38|X|32389643|32389644|G|A"));
}

#[tokio::test]
#[ignore] // Requires network access
async fn test_normalization_by_myvariant_accessions() {
    let normalization = normalizer()
        .variant_normalization("MYVARIANT_HG19:chr11:g.67799758C>G")
        .await;
    assert_eq!(normalization.id, "CAID:CA6146346");
    assert_eq!(normalization.name, "rs369602258");
    assert!(normalization
        .synonyms
        .contains("HGVS:NC_000011.10:g.68032291C>G"));

    let normalization = normalizer()
        .variant_normalization("MYVARIANT_HG38:chr11:g.68032291C>G")
        .await;
    assert_eq!(normalization.id, "CAID:CA6146346");
    assert_eq!(normalization.name, "rs369602258");
    assert!(normalization
        .synonyms
        .contains("LOCUS:HG38|11|68032290|68032291|C|G"));
}

#[tokio::test]
#[ignore] // Requires network access
async fn test_batch_hgvs_normalization() {
    let hgvs_curies: Vec<String> = [
        "HGVS:NC_000011.10:g.68032291C>G",
        "HGVS:NC_000023.9:g.32317682G>A",
        "HGVS:NC_000017.10:g.43009069G>C",
        "HGVS:NC_000017.10:g.43009127delG",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let normalizations = normalizer()
        .batch_hgvs_normalization(&hgvs_curies)
        .await
        .unwrap();
    assert_eq!(normalizations.len(), hgvs_curies.len());

    let normalization = &normalizations["HGVS:NC_000023.9:g.32317682G>A"];
    assert!(normalization.synonyms.contains("CAID:CA267021"));
    assert_eq!(normalization.name, "rs398123953");

    let normalization = &normalizations["HGVS:NC_000011.10:g.68032291C>G"];
    assert!(normalization.synonyms.contains("DBSNP:rs369602258"));
    assert_eq!(normalization.name, "rs369602258");

    let normalization = &normalizations["HGVS:NC_000017.10:g.43009127delG"];
    assert!(normalization.synonyms.contains("DBSNP:rs775219016"));
    assert!(normalization.synonyms.contains("CAID:CA8609461"));
    assert!(normalization
        .synonyms
        .contains("MYVARIANT_HG38:chr17:g.44931759del"));
    assert_eq!(normalization.name, "rs775219016");
}

#[tokio::test]
#[ignore] // Requires network access
async fn test_batch_normalize_rewrites_nodes() {
    let mut nodes = vec![
        Node::new("HGVS:NC_000023.11:g.32389644G>A", "", SEQUENCE_VARIANT),
        Node::new("CLINVARVARIANT:18390", "", SEQUENCE_VARIANT),
    ];

    normalizer().batch_normalize(&mut nodes).await;

    assert_eq!(nodes[0].id, "CAID:CA267021");
    assert_eq!(nodes[0].name, "rs398123953");
    assert!(nodes[0]
        .synonyms
        .contains("HGVS:NC_000023.11:g.32389644G>A"));

    assert_eq!(nodes[1].id, "CAID:CA128085");
    assert_eq!(nodes[1].name, "rs671");
}
