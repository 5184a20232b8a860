//! CURIE string helpers.
//!
//! Variant and gene identifiers throughout genelink are compact URIs of the
//! form `PREFIX:reference` (e.g. `HGNC:758`, `DBSNP:rs671`). Prefix matching
//! is case-insensitive; references are returned verbatim.

/// The prefix of a CURIE, if it has one.
pub fn prefix(curie: &str) -> Option<&str> {
    curie.split_once(':').map(|(p, _)| p)
}

/// The reference part of a CURIE (everything after the first colon).
/// A string without a colon is returned unchanged.
pub fn reference(curie: &str) -> &str {
    curie.split_once(':').map(|(_, r)| r).unwrap_or(curie)
}

/// True if the CURIE carries the given prefix (case-insensitive).
pub fn has_prefix(curie: &str, want: &str) -> bool {
    prefix(curie).is_some_and(|p| p.eq_ignore_ascii_case(want))
}

/// All curies in `curies` carrying the given prefix, sorted so that
/// selection among them is deterministic across calls.
pub fn filter_by_prefix<'a, I>(want: &str, curies: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut matched: Vec<&str> = curies
        .into_iter()
        .filter(|c| has_prefix(c, want))
        .map(String::as_str)
        .collect();
    matched.sort_unstable();
    matched
}
