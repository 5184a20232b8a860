//! Runtime configuration for the remote annotation services.

use serde::{Deserialize, Serialize};

/// Service endpoints and query policy.
///
/// `Default` gives the production endpoints; tests and mirrors override the
/// URLs. Whether HG19 accessions are queried against MyVariant at all is an
/// explicit policy knob (`include_hg19_accessions`), off by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub myvariant_url: String,
    pub ensembl_url: String,
    pub clingen_url: String,
    pub hgnc_tsv_url: String,
    /// Fall back to `MYVARIANT_HG19` accessions when a variant has no HG38
    /// accession.
    pub include_hg19_accessions: bool,
    /// Total width in bp of the window searched for genes around a variant,
    /// half on each side.
    pub ensembl_region_size: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            myvariant_url: "https://myvariant.info/v1".to_string(),
            ensembl_url: "https://rest.ensembl.org".to_string(),
            clingen_url: "https://reg.genome.network".to_string(),
            hgnc_tsv_url:
                "https://storage.googleapis.com/public-download-files/hgnc/tsv/tsv/hgnc_complete_set.txt"
                    .to_string(),
            include_hg19_accessions: false,
            ensembl_region_size: 1_000_000,
        }
    }
}
