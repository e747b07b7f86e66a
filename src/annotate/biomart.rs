//! Ensembl BioMart client for gene annotation lookups

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::source::{AnnotationQuery, GeneMapSource};
use crate::data::{Cell, Table};
use crate::error::{DgeError, Result};

const SUCCESS_STAMP: &str = "[success]";

/// Connection settings for the BioMart service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomartConfig {
    /// martservice endpoint
    pub url: String,
    /// Gene ids per request
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl Default for BiomartConfig {
    fn default() -> Self {
        Self {
            url: "https://www.ensembl.org/biomart/martservice".to_string(),
            batch_size: 500,
            timeout_secs: 120,
        }
    }
}

impl BiomartConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(DgeError::InvalidConfig {
                reason: "biomart batch_size must be positive".to_string(),
            });
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(DgeError::InvalidConfig {
                reason: format!("biomart url '{}' is not an http(s) url", self.url),
            });
        }
        Ok(())
    }
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Build the XML query document for one batch of ids
pub fn build_query_xml(gene_ids: &[String], query: &AnnotationQuery) -> String {
    let values = gene_ids
        .iter()
        .map(|id| escape_xml(id))
        .collect::<Vec<_>>()
        .join(",");

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE Query>\n");
    xml.push_str(
        "<Query virtualSchemaName=\"default\" formatter=\"TSV\" header=\"0\" \
         uniqueRows=\"1\" completionStamp=\"1\" datasetConfigVersion=\"0.6\">\n",
    );
    xml.push_str(&format!(
        "  <Dataset name=\"{}\" interface=\"default\">\n",
        escape_xml(&query.dataset)
    ));
    xml.push_str(&format!(
        "    <Filter name=\"{}\" value=\"{}\"/>\n",
        escape_xml(&query.filter),
        values
    ));
    for attribute in &query.attributes {
        xml.push_str(&format!("    <Attribute name=\"{}\"/>\n", escape_xml(attribute)));
    }
    xml.push_str("  </Dataset>\n</Query>\n");
    xml
}

/// Parse a headerless TSV reply; columns are the requested attributes in order
pub fn parse_response(body: &str, attributes: &[String]) -> Result<Table> {
    let failure = |reason: String| DgeError::GeneMapSource {
        source_name: "biomart".to_string(),
        reason,
    };

    let trimmed = body.trim_end();
    if trimmed.starts_with("Query ERROR") || trimmed.contains("ERROR -> ") {
        return Err(failure(trimmed.lines().next().unwrap_or_default().to_string()));
    }

    let content = trimmed
        .strip_suffix(SUCCESS_STAMP)
        .ok_or_else(|| failure("response is missing the completion stamp".to_string()))?;

    let mut rows = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != attributes.len() {
            return Err(failure(format!(
                "line {} has {} fields, expected {}",
                i + 1,
                fields.len(),
                attributes.len()
            )));
        }
        rows.push(fields.into_iter().map(Cell::from_field).collect());
    }

    Table::new(attributes.to_vec(), rows)
}

/// Blocking BioMart client. Requests are not retried.
pub struct BiomartClient {
    config: BiomartConfig,
    client: reqwest::blocking::Client,
}

impl BiomartClient {
    pub fn new(config: BiomartConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    fn fetch_batch(&self, gene_ids: &[String], query: &AnnotationQuery) -> Result<Table> {
        let xml = build_query_xml(gene_ids, query);
        let body = self
            .client
            .post(&self.config.url)
            .form(&[("query", xml.as_str())])
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| DgeError::GeneMapSource {
                source_name: self.config.url.clone(),
                reason: e.to_string(),
            })?;
        parse_response(&body, &query.attributes)
    }
}

impl GeneMapSource for BiomartClient {
    fn name(&self) -> &str {
        "biomart"
    }

    fn fetch(&self, gene_ids: &[String], query: &AnnotationQuery) -> Result<Table> {
        let mut table = Table::new(query.attributes.clone(), Vec::new())?;
        let n_batches = gene_ids.len().div_ceil(self.config.batch_size);

        for (i, batch) in gene_ids.chunks(self.config.batch_size).enumerate() {
            log::debug!(
                "BioMart batch {}/{} ({} ids, dataset {})",
                i + 1,
                n_batches,
                batch.len(),
                query.dataset
            );
            table.append(self.fetch_batch(batch, query)?)?;
        }

        log::info!("BioMart returned {} annotation rows", table.n_rows());
        Ok(table)
    }
}
