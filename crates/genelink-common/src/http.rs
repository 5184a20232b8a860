use std::collections::HashSet;
use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use url::Url;

use crate::error::GenelinkError;

/// An allowlist-capped HTTP client that only permits requests to the known
/// annotation-service hosts. Adapters share clones of one instance so the
/// underlying connection pool is reused across queries.
#[derive(Debug, Clone)]
pub struct AllowlistClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl AllowlistClient {
    /// Creates a client allowing the default genelink service hosts.
    pub fn new() -> Result<Self, GenelinkError> {
        let mut allowlist = HashSet::new();
        let domains = vec![
            "myvariant.info",          // MyVariant.info annotations
            "rest.ensembl.org",        // Ensembl overlap lookups
            "reg.genome.network",      // ClinGen Allele Registry
            "storage.googleapis.com",  // HGNC complete set bulk download
            "rest.genenames.org",      // HGNC REST
            "localhost",               // test servers
            "127.0.0.1",
        ];

        for d in domains {
            allowlist.insert(d.to_string());
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GenelinkError::Security(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Validates if a URL is permitted under the current allowlist.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                // Exact match or a subdomain of an allowed host
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Builder for a GET request, rejected if the host is not allowlisted.
    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, GenelinkError> {
        if !self.is_allowed(url) {
            return Err(GenelinkError::Security(format!(
                "host not in allowlist for URL {}",
                url
            )));
        }

        Ok(self.client.get(url))
    }

    /// Builder for a POST request, rejected if the host is not allowlisted.
    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, GenelinkError> {
        if !self.is_allowed(url) {
            return Err(GenelinkError::Security(format!(
                "host not in allowlist for URL {}",
                url
            )));
        }

        Ok(self.client.post(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allowlist() {
        let client = AllowlistClient::new().unwrap();
        assert!(client.is_allowed("https://myvariant.info/v1/variant/x"));
        assert!(client.is_allowed("https://rest.ensembl.org/overlap/region/human/17:1-2"));
        assert!(client.is_allowed("https://reg.genome.network/alleles?hgvs=x"));
        assert!(!client.is_allowed("https://example.com/"));
        assert!(!client.is_allowed("not a url"));
    }

    #[test]
    fn test_allow_domain_appends() {
        let mut client = AllowlistClient::new().unwrap();
        assert!(!client.is_allowed("https://mirror.internal/variant"));
        client.allow_domain("mirror.internal");
        assert!(client.is_allowed("https://mirror.internal/variant"));
    }

    #[test]
    fn test_disallowed_get_is_rejected() {
        let client = AllowlistClient::new().unwrap();
        assert!(client.get("https://example.com/").is_err());
        assert!(client.get("https://myvariant.info/v1/").is_ok());
    }
}
