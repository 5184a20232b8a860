//! Variant identifier schemes and per-scheme query key selection.
//!
//! A variant is identified redundantly under several naming schemes; each
//! remote service understands exactly one of them. The parsers here turn a
//! node's synonym set into the query key a given service needs: a structured
//! [`PositionalKey`] for coordinate lookups, or a bare accession string for
//! accession lookups.
//!
//! Selection is a fixed strategy set: one parser per scheme, matching
//! synonyms considered in lexicographic order, first well-formed match wins.
//! Malformed synonyms are skipped, never an error.

use std::collections::HashSet;
use std::fmt;

use genelink_common::curie;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// CURIE prefix of the positional key scheme.
pub const LOCUS_PREFIX: &str = "LOCUS";

lazy_static! {
    /// MyVariant accession shape, e.g. `chr7:g.55241707G>T`.
    static ref MYVARIANT_ACCESSION_RE: Regex =
        Regex::new(r"^chr([0-9]{1,2}|X|Y|MT?):g\..+$").unwrap();
    /// dbSNP reference, optionally carrying a preferred allele, e.g.
    /// `rs671` or `rs369602258-G`.
    static ref DBSNP_RE: Regex = Regex::new(r"^rs[0-9]+(-[ACGT]+)?$").unwrap();
}

// ---------------------------------------------------------------------------
// Positional keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenomeBuild {
    Hg38,
    Hg19,
}

impl GenomeBuild {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenomeBuild::Hg38 => "HG38",
            GenomeBuild::Hg19 => "HG19",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "HG38" => Some(GenomeBuild::Hg38),
            "HG19" => Some(GenomeBuild::Hg19),
            _ => None,
        }
    }
}

/// A genome-build-specific coordinate key:
/// `LOCUS:{BUILD}|{chrom}|{start}|{end}|{ref}|{alt}`.
///
/// Coordinates are 0-based half-open, as reported by the allele registry.
/// A legacy five-field form without the reference allele is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionalKey {
    pub build: GenomeBuild,
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub reference: Option<String>,
    pub allele: String,
}

impl PositionalKey {
    /// Parse a `LOCUS:` synonym. Returns `None` for anything malformed.
    pub fn parse(synonym: &str) -> Option<Self> {
        if !curie::has_prefix(synonym, LOCUS_PREFIX) {
            return None;
        }
        let fields: Vec<&str> = curie::reference(synonym).split('|').collect();
        let (build, chromosome, start, end, reference, allele) = match fields.as_slice() {
            [build, chrom, start, end, reference, allele] => {
                (build, chrom, start, end, Some(reference.to_string()), allele)
            }
            [build, chrom, start, end, allele] => (build, chrom, start, end, None, allele),
            _ => return None,
        };
        if chromosome.is_empty() || allele.is_empty() {
            return None;
        }
        Some(Self {
            build: GenomeBuild::parse(build)?,
            chromosome: chromosome.to_string(),
            start: start.parse().ok()?,
            end: end.parse().ok()?,
            reference,
            allele: allele.to_string(),
        })
    }

    /// The full CURIE form of this key.
    pub fn to_curie(&self) -> String {
        format!("{}:{}", LOCUS_PREFIX, self)
    }

    /// A 1-based inclusive region string covering this variant plus
    /// `region_size / 2` bp of flank on each side, begin clamped at 1.
    pub fn windowed_region(&self, region_size: u64) -> String {
        let flank = region_size / 2;
        let begin = (self.start + 1).saturating_sub(flank).max(1);
        let end = self.end + flank;
        format!("{}:{}-{}", self.chromosome, begin, end)
    }
}

impl fmt::Display for PositionalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reference {
            Some(reference) => write!(
                f,
                "{}|{}|{}|{}|{}|{}",
                self.build.as_str(),
                self.chromosome,
                self.start,
                self.end,
                reference,
                self.allele
            ),
            None => write!(
                f,
                "{}|{}|{}|{}|{}",
                self.build.as_str(),
                self.chromosome,
                self.start,
                self.end,
                self.allele
            ),
        }
    }
}

/// The positional query key for one genome build, or `None` if no synonym
/// parses under that build.
pub fn positional_key(synonyms: &HashSet<String>, build: GenomeBuild) -> Option<PositionalKey> {
    curie::filter_by_prefix(LOCUS_PREFIX, synonyms)
        .into_iter()
        .filter_map(PositionalKey::parse)
        .find(|key| key.build == build)
}

// ---------------------------------------------------------------------------
// Accession schemes
// ---------------------------------------------------------------------------

/// External accession schemes a synonym set may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessionScheme {
    MyVariantHg38,
    MyVariantHg19,
    Hgvs,
    Caid,
    Dbsnp,
    ClinVar,
}

impl AccessionScheme {
    pub fn prefix(&self) -> &'static str {
        match self {
            AccessionScheme::MyVariantHg38 => "MYVARIANT_HG38",
            AccessionScheme::MyVariantHg19 => "MYVARIANT_HG19",
            AccessionScheme::Hgvs => "HGVS",
            AccessionScheme::Caid => "CAID",
            AccessionScheme::Dbsnp => "DBSNP",
            AccessionScheme::ClinVar => "CLINVARVARIANT",
        }
    }

    fn is_well_formed(&self, reference: &str) -> bool {
        match self {
            AccessionScheme::MyVariantHg38 | AccessionScheme::MyVariantHg19 => {
                MYVARIANT_ACCESSION_RE.is_match(reference)
            }
            AccessionScheme::Dbsnp => DBSNP_RE.is_match(reference),
            _ => !reference.is_empty(),
        }
    }
}

/// The synonym (full CURIE) selected for a scheme, or `None` if no synonym
/// carries a well-formed identifier under it.
pub fn scheme_synonym<'a>(
    synonyms: &'a HashSet<String>,
    scheme: AccessionScheme,
) -> Option<&'a str> {
    curie::filter_by_prefix(scheme.prefix(), synonyms)
        .into_iter()
        .find(|synonym| scheme.is_well_formed(curie::reference(synonym)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synonyms(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_six_field_key() {
        let key = PositionalKey::parse("LOCUS:HG38|11|68032290|68032291|C|G").unwrap();
        assert_eq!(key.build, GenomeBuild::Hg38);
        assert_eq!(key.chromosome, "11");
        assert_eq!(key.start, 68032290);
        assert_eq!(key.end, 68032291);
        assert_eq!(key.reference.as_deref(), Some("C"));
        assert_eq!(key.allele, "G");
    }

    #[test]
    fn test_parse_legacy_five_field_key() {
        let key = PositionalKey::parse("LOCUS:HG38|X|32389643|32389644|A").unwrap();
        assert_eq!(key.chromosome, "X");
        assert!(key.reference.is_none());
        assert_eq!(key.allele, "A");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(PositionalKey::parse("LOCUS:HG38|17|notanumber|58206172|A").is_none());
        assert!(PositionalKey::parse("LOCUS:HG99|17|1|2|A").is_none());
        assert!(PositionalKey::parse("LOCUS:HG38|17|1").is_none());
        assert!(PositionalKey::parse("DBSNP:rs671").is_none());
    }

    #[test]
    fn test_curie_round_trip() {
        let curie = "LOCUS:HG38|11|68032290|68032291|C|G";
        assert_eq!(PositionalKey::parse(curie).unwrap().to_curie(), curie);
    }

    #[test]
    fn test_positional_key_selects_requested_build() {
        let set = synonyms(&[
            "LOCUS:HG19|11|67799757|67799758|G",
            "LOCUS:HG38|11|68032290|68032291|G",
        ]);
        let hg38 = positional_key(&set, GenomeBuild::Hg38).unwrap();
        assert_eq!(hg38.start, 68032290);
        let hg19 = positional_key(&set, GenomeBuild::Hg19).unwrap();
        assert_eq!(hg19.start, 67799757);
    }

    #[test]
    fn test_positional_key_skips_malformed_entries() {
        let set = synonyms(&[
            "LOCUS:HG38|garbage",
            "LOCUS:HG38|1|69092|69093|C",
        ]);
        let key = positional_key(&set, GenomeBuild::Hg38).unwrap();
        assert_eq!(key.start, 69092);
    }

    #[test]
    fn test_positional_key_absent() {
        let set = synonyms(&["MYVARIANT_HG38:chr1:g.69093G>C"]);
        assert!(positional_key(&set, GenomeBuild::Hg38).is_none());
    }

    #[test]
    fn test_windowed_region() {
        let key = PositionalKey::parse("LOCUS:HG38|17|58206171|58206172|A").unwrap();
        // point lookup with no flank
        assert_eq!(key.windowed_region(0), "17:58206172-58206172");
        assert_eq!(key.windowed_region(1_000_000), "17:57706172-58706172");
    }

    #[test]
    fn test_windowed_region_clamps_begin() {
        let key = PositionalKey::parse("LOCUS:HG38|1|69092|69093|C").unwrap();
        assert_eq!(key.windowed_region(1_000_000), "1:1-569093");
    }

    #[test]
    fn test_scheme_synonym_picks_lexicographic_first() {
        let set = synonyms(&[
            "MYVARIANT_HG38:chr9:g.130489423A>G",
            "MYVARIANT_HG38:chr11:g.68032291C>G",
        ]);
        assert_eq!(
            scheme_synonym(&set, AccessionScheme::MyVariantHg38),
            Some("MYVARIANT_HG38:chr11:g.68032291C>G")
        );
    }

    #[test]
    fn test_scheme_synonym_skips_ill_formed() {
        let set = synonyms(&[
            "MYVARIANT_HG38:12345",
            "MYVARIANT_HG38:chrX:g.32389644G>A",
        ]);
        assert_eq!(
            scheme_synonym(&set, AccessionScheme::MyVariantHg38),
            Some("MYVARIANT_HG38:chrX:g.32389644G>A")
        );
        assert!(scheme_synonym(&set, AccessionScheme::MyVariantHg19).is_none());
    }

    #[test]
    fn test_dbsnp_shapes() {
        let set = synonyms(&["DBSNP:rs369602258-G", "DBSNP:notanrsid"]);
        assert_eq!(
            scheme_synonym(&set, AccessionScheme::Dbsnp),
            Some("DBSNP:rs369602258-G")
        );
    }
}
