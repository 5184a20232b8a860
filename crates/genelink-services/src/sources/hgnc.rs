//! HGNC gene symbol table.
//!
//! Builds an in-memory symbol → HGNC id table from the HGNC complete set
//! TSV (~7 MB download). The table is built once, at orchestrator
//! construction, and shared as `Arc<HgncTable>`; it is read-only afterwards.
//!
//! Lookups are case-sensitive exact matches on the approved symbol, so
//! adapters resolving service-reported symbols get an explicit miss rather
//! than a fuzzy guess.

use std::collections::HashMap;

use genelink_common::error::{GenelinkError, Result};
use genelink_common::http::AllowlistClient;
use tracing::info;

/// A canonical HGNC gene record.
#[derive(Debug, Clone)]
pub struct HgncRecord {
    /// HGNC accession, e.g. `HGNC:1100`
    pub hgnc_id: String,
    /// Approved symbol, e.g. `BRCA1`
    pub symbol: String,
    /// Full gene name
    pub name: String,
}

/// Symbol → record table over the HGNC complete set.
pub struct HgncTable {
    records: HashMap<String, HgncRecord>,
}

impl HgncTable {
    /// Build from the HGNC complete set downloaded at runtime.
    pub async fn from_download(client: &AllowlistClient, url: &str) -> Result<Self> {
        info!("Downloading HGNC complete set from {}", url);
        let resp = client.get(url)?.send().await?;
        if !resp.status().is_success() {
            return Err(GenelinkError::Table(format!(
                "HGNC download returned {}",
                resp.status()
            )));
        }
        let tsv = resp.text().await?;
        Self::from_tsv(&tsv)
    }

    /// Build from a pre-downloaded TSV string (offline / test use).
    pub fn from_tsv(tsv: &str) -> Result<Self> {
        let mut records = HashMap::new();
        for (line_no, line) in tsv.lines().enumerate() {
            // Skip header row
            if line_no == 0 {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 6 {
                continue;
            }

            // Columns in the HGNC complete set TSV:
            // 0 hgnc_id, 1 symbol, 2 name, 5 status
            let get = |i: usize| fields.get(i).copied().unwrap_or("").trim();

            let hgnc_id = get(0);
            let symbol = get(1);
            let status = get(5);

            // Skip withdrawn/non-approved entries
            if !status.contains("Approved") || hgnc_id.is_empty() || symbol.is_empty() {
                continue;
            }

            records.insert(
                symbol.to_string(),
                HgncRecord {
                    hgnc_id: hgnc_id.to_string(),
                    symbol: symbol.to_string(),
                    name: get(2).to_string(),
                },
            );
        }

        if records.is_empty() {
            return Err(GenelinkError::Table(
                "no approved records in HGNC TSV".to_string(),
            ));
        }
        info!("HGNC table built: {} records", records.len());
        Ok(Self { records })
    }

    /// Stable gene id for an approved symbol, e.g. `BRCA1` → `HGNC:1100`.
    /// Unknown symbols return `None`, never an error.
    pub fn gene_id_from_symbol(&self, symbol: &str) -> Option<&str> {
        self.records.get(symbol).map(|r| r.hgnc_id.as_str())
    }

    /// The full record for an approved symbol.
    pub fn record(&self, symbol: &str) -> Option<&HgncRecord> {
        self.records.get(symbol)
    }

    /// Number of approved gene records loaded.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal synthetic HGNC TSV for unit tests.
    fn sample_tsv() -> String {
        let header = "hgnc_id\tsymbol\tname\tlocus_group\tlocus_type\tstatus\tlocation";
        let ass1 = "HGNC:758\tASS1\targininosuccinate synthase 1\tprotein-coding gene\tgene with protein product\tApproved\t9q34.11";
        let dmd = "HGNC:2928\tDMD\tdystrophin\tprotein-coding gene\tgene with protein product\tApproved\tXp21.2-p21.1";
        let brca1 = "HGNC:1100\tBRCA1\tBRCA1 DNA repair associated\tprotein-coding gene\tgene with protein product\tApproved\t17q21.31";
        let withdrawn = "HGNC:99999\tOLDGENE\twithdrawn entry\tother\tunknown\tEntry Withdrawn\t1p1";
        format!("{header}\n{ass1}\n{dmd}\n{brca1}\n{withdrawn}\n")
    }

    #[test]
    fn test_lookup_known_symbols() {
        let table = HgncTable::from_tsv(&sample_tsv()).unwrap();
        assert_eq!(table.gene_id_from_symbol("ASS1"), Some("HGNC:758"));
        assert_eq!(table.gene_id_from_symbol("DMD"), Some("HGNC:2928"));
        assert_eq!(table.gene_id_from_symbol("BRCA1"), Some("HGNC:1100"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let table = HgncTable::from_tsv(&sample_tsv()).unwrap();
        assert!(table.gene_id_from_symbol("brca1").is_none());
        assert!(table.gene_id_from_symbol("Brca1").is_none());
    }

    #[test]
    fn test_unknown_symbol_returns_none() {
        let table = HgncTable::from_tsv(&sample_tsv()).unwrap();
        assert!(table.gene_id_from_symbol("THISISAFAKEGENE").is_none());
    }

    #[test]
    fn test_withdrawn_entries_skipped() {
        let table = HgncTable::from_tsv(&sample_tsv()).unwrap();
        assert!(table.gene_id_from_symbol("OLDGENE").is_none());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_record_carries_name() {
        let table = HgncTable::from_tsv(&sample_tsv()).unwrap();
        assert_eq!(table.record("DMD").unwrap().name, "dystrophin");
    }

    #[test]
    fn test_header_only_tsv_is_an_error() {
        assert!(HgncTable::from_tsv("hgnc_id\tsymbol\tname\n").is_err());
    }
}
