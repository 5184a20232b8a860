//! ClinGen Allele Registry client.
//!
//! Synonymization source: expands a variant identifier into the full set of
//! equivalent identifiers across schemes (CAID, HGVS, dbSNP, ClinVar,
//! MyVariant accessions, LOCUS positional keys). This is the layer that
//! produces the synonym sets the resolution adapters consume.
//!
//! Endpoint: https://reg.genome.network

use std::collections::HashSet;

use genelink_common::curie;
use genelink_common::error::{GenelinkError, Result};
use genelink_common::http::AllowlistClient as Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::ServicesConfig;
use crate::identifiers::{GenomeBuild, PositionalKey};

/// Registry fields needed for synonym extraction; the registry expects
/// `+`-joined field names, so this is appended to URLs verbatim rather than
/// percent-encoded through a query builder.
const SYNONYM_FIELDS: &str = "fields=none+@id\
    +externalRecords.dbSNP\
    +externalRecords.ClinVarVariations\
    +externalRecords.MyVariantInfo_hg38\
    +externalRecords.MyVariantInfo_hg19\
    +genomicAlleles-genomicAlleles.referenceSequence";

/// Bulk lookups are chunked to this many identifiers per request.
const BATCH_LIMIT: usize = 2000;

/// Prefixes the registry's bulk endpoint accepts, with the query parameter
/// each maps to.
const BATCHABLE_PREFIXES: [(&str, &str); 3] = [
    ("CAID", "id"),
    ("HGVS", "hgvs"),
    ("MYVARIANT_HG38", "MyVariantInfo_hg38.id"),
];

fn batch_param_for_prefix(prefix: &str) -> Option<&'static str> {
    BATCHABLE_PREFIXES
        .iter()
        .find(|(p, _)| prefix.eq_ignore_ascii_case(p))
        .map(|(_, param)| *param)
}

/// A per-identifier registry failure, carried as data so batch operations
/// make partial progress.
#[derive(Debug, Clone, Error)]
#[error("{error_type}: {message}")]
pub struct RegistryError {
    pub error_type: String,
    pub message: String,
}

impl RegistryError {
    fn new(error_type: &str, message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.to_string(),
            message: message.into(),
        }
    }
}

/// One synonym set per queried identifier, or the registry's error for it.
pub type SynonymizationResult = std::result::Result<HashSet<String>, RegistryError>;

pub struct ClinGenClient {
    client: Client,
    base_url: String,
}

impl ClinGenClient {
    pub fn new(config: &ServicesConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.clingen_url.clone(),
        }
    }

    /// Bulk synonym lookup for curies sharing one batchable prefix
    /// (`CAID`, `HGVS`, or `MYVARIANT_HG38`). Returns one result per input
    /// curie, in input order. Mixed or unsupported prefixes are a caller
    /// error.
    #[instrument(skip(self, variant_curies), fields(count = variant_curies.len()))]
    pub async fn batch_synonyms(&self, variant_curies: &[String]) -> Result<Vec<SynonymizationResult>> {
        if variant_curies.is_empty() {
            return Ok(Vec::new());
        }

        let prefix = curie::prefix(&variant_curies[0]).unwrap_or_default();
        let Some(batch_param) = batch_param_for_prefix(prefix) else {
            return Err(GenelinkError::UnsupportedService(format!(
                "registry batches are not supported for prefix {}",
                prefix
            )));
        };
        if let Some(stray) = variant_curies.iter().find(|c| !curie::has_prefix(c, prefix)) {
            return Err(GenelinkError::UnsupportedService(format!(
                "registry batch mixes prefixes: {} among {}",
                stray, prefix
            )));
        }

        let ids: Vec<&str> = variant_curies.iter().map(|c| curie::reference(c)).collect();
        let mut results = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(BATCH_LIMIT) {
            let url = format!(
                "{}/alleles?file={}&{}",
                self.base_url, batch_param, SYNONYM_FIELDS
            );
            match self.query(&url, Some(chunk.join("\n"))).await {
                Ok(alleles) => {
                    if alleles.len() != chunk.len() {
                        warn!(
                            requested = chunk.len(),
                            returned = alleles.len(),
                            "registry batch result count mismatch"
                        );
                    }
                    for i in 0..chunk.len() {
                        results.push(match alleles.get(i) {
                            Some(allele) => parse_allele(allele),
                            None => Err(RegistryError::new(
                                "MissingResult",
                                "registry returned fewer results than identifiers sent",
                            )),
                        });
                    }
                }
                Err(e) => {
                    // the whole chunk failed; every identifier in it carries
                    // the same error
                    for _ in chunk {
                        results.push(Err(e.clone()));
                    }
                }
            }
        }
        Ok(results)
    }

    /// Synonyms for a single canonical allele id.
    pub async fn synonyms_by_caid(&self, caid: &str) -> SynonymizationResult {
        let url = format!("{}/allele/{}?{}", self.base_url, caid, SYNONYM_FIELDS);
        match self.query(&url, None).await {
            Ok(alleles) => match alleles.first() {
                Some(allele) => parse_allele(allele),
                None => Err(RegistryError::new("NotFound", format!("no allele for {}", caid))),
            },
            Err(e) => Err(e),
        }
    }

    /// Synonyms for identifiers the registry resolves by parameter matching
    /// rather than bulk file upload: dbSNP rsIDs (optionally carrying a
    /// preferred alternate allele, `rs1234-G`), ClinVar variation ids, and
    /// MyVariant hg19 accessions. Batchable prefixes are rejected here so
    /// they go through `batch_synonyms` instead.
    pub async fn synonyms_by_other_id(&self, variant_curie: &str) -> Vec<SynonymizationResult> {
        let reference = curie::reference(variant_curie);

        if curie::has_prefix(variant_curie, "DBSNP") {
            let (rs_id, allele_preference) = match reference.split_once('-') {
                Some((rs_id, allele)) => (rs_id, Some(allele)),
                None => (reference, None),
            };
            return self
                .synonyms_by_parameter("dbSNP.rs", rs_id, allele_preference)
                .await;
        }

        if curie::has_prefix(variant_curie, "CLINVARVARIANT") {
            return self
                .synonyms_by_parameter("ClinVar.variationId", reference, None)
                .await;
        }

        if curie::has_prefix(variant_curie, "MYVARIANT_HG19") {
            return self
                .synonyms_by_parameter("MyVariantInfo_hg19.id", reference, None)
                .await;
        }

        let prefix = curie::prefix(variant_curie).unwrap_or_default();
        if batch_param_for_prefix(prefix).is_some() {
            return vec![Err(RegistryError::new(
                "InefficientUsage",
                format!("{} identifiers should be batched, not fetched alone", prefix),
            ))];
        }
        vec![Err(RegistryError::new(
            "UnsupportedPrefix",
            format!("unsupported prefix: {}", variant_curie),
        ))]
    }

    async fn synonyms_by_parameter(
        &self,
        url_param: &str,
        value: &str,
        allele_preference: Option<&str>,
    ) -> Vec<SynonymizationResult> {
        let url = format!(
            "{}/alleles?{}={}&{}",
            self.base_url, url_param, value, SYNONYM_FIELDS
        );
        let results: Vec<SynonymizationResult> = match self.query(&url, None).await {
            Ok(alleles) => alleles.iter().map(parse_allele).collect(),
            Err(e) => return vec![Err(e)],
        };

        // A multi-allelic rsID matches several registry alleles; when the
        // caller stated a preferred alternate allele, keep only the alleles
        // whose positional key carries it.
        if let Some(preferred) = allele_preference {
            let filtered: Vec<SynonymizationResult> = results
                .iter()
                .filter(|result| match result {
                    Ok(synonyms) => synonyms
                        .iter()
                        .filter_map(|s| PositionalKey::parse(s))
                        .any(|key| key.build == GenomeBuild::Hg38 && key.allele == preferred),
                    Err(_) => false,
                })
                .cloned()
                .collect();
            if !filtered.is_empty() {
                return filtered;
            }
        }
        results
    }

    async fn query(&self, url: &str, body: Option<String>) -> std::result::Result<Vec<Value>, RegistryError> {
        let request = match &body {
            Some(_) => self.client.post(url),
            None => self.client.get(url),
        };
        let request = match request {
            Ok(builder) => builder,
            Err(e) => return Err(RegistryError::new("RequestRejected", e.to_string())),
        };
        let request = match body {
            Some(b) => request.body(b),
            None => request,
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Err(RegistryError::new("RequestException", e.to_string())),
        };

        if response.status().is_success() {
            match response.json::<Value>().await {
                Ok(Value::Array(alleles)) => Ok(alleles),
                Ok(single) => Ok(vec![single]),
                Err(e) => Err(RegistryError::new("ParseError", e.to_string())),
            }
        } else {
            // registry errors carry a JSON payload with errorType/description
            match response.json::<Value>().await {
                Ok(error_json) => Err(registry_error_from_json(&error_json)),
                Err(e) => Err(RegistryError::new("UnspecifiedError", e.to_string())),
            }
        }
    }
}

fn registry_error_from_json(json: &Value) -> RegistryError {
    let error_type = json["errorType"].as_str().unwrap_or("UnspecifiedError");
    let mut message = match json["description"].as_str() {
        Some(description) => description.to_string(),
        None => json.to_string(),
    };
    if let Some(detail) = json["message"].as_str() {
        message.push_str(detail);
    }
    RegistryError::new(error_type, message)
}

/// Extract the synonym set from one registry allele document.
fn parse_allele(allele: &Value) -> SynonymizationResult {
    let Some(at_id) = allele["@id"].as_str() else {
        // error documents sit inline in batch responses
        return Err(registry_error_from_json(allele));
    };

    let mut synonyms = HashSet::new();
    let caid = at_id.rsplit('/').next().unwrap_or(at_id);
    synonyms.insert(format!("CAID:{}", caid));

    for genomic in allele["genomicAlleles"].as_array().into_iter().flatten() {
        for hgvs in genomic["hgvs"].as_array().into_iter().flatten() {
            if let Some(hgvs_id) = hgvs.as_str() {
                synonyms.insert(format!("HGVS:{}", hgvs_id));
            }
        }
        if genomic["referenceGenome"].as_str() != Some("GRCh38") {
            continue;
        }
        let Some(chromosome) = genomic["chromosome"].as_str() else {
            continue;
        };
        let coordinates = &genomic["coordinates"][0];
        match (
            coordinates["start"].as_u64(),
            coordinates["end"].as_u64(),
            coordinates["referenceAllele"].as_str(),
            coordinates["allele"].as_str(),
        ) {
            (Some(start), Some(end), Some(reference), Some(allele_seq)) => {
                let key = PositionalKey {
                    build: GenomeBuild::Hg38,
                    chromosome: chromosome.to_string(),
                    start,
                    end,
                    reference: Some(reference.to_string()),
                    allele: allele_seq.to_string(),
                };
                synonyms.insert(key.to_curie());
            }
            _ => debug!(caid, "genomic allele with unusable GRCh38 coordinates"),
        }
    }

    if let Some(records) = allele["externalRecords"].as_object() {
        for dbsnp in records.get("dbSNP").and_then(Value::as_array).into_iter().flatten() {
            if let Some(rs) = dbsnp["rs"].as_u64() {
                synonyms.insert(format!("DBSNP:rs{}", rs));
            }
        }
        for clinvar in records
            .get("ClinVarVariations")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            if let Some(variation_id) = clinvar["variationId"].as_u64() {
                synonyms.insert(format!("CLINVARVARIANT:{}", variation_id));
            }
        }
        for (record_key, scheme_prefix) in [
            ("MyVariantInfo_hg38", "MYVARIANT_HG38"),
            ("MyVariantInfo_hg19", "MYVARIANT_HG19"),
        ] {
            for record in records.get(record_key).and_then(Value::as_array).into_iter().flatten() {
                if let Some(id) = record["id"].as_str() {
                    synonyms.insert(format!("{}:{}", scheme_prefix, id));
                }
            }
        }
    }

    Ok(synonyms)
}
