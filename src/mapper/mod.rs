//! Batched field mapping through a text-completion collaborator.
//!
//! The field list is split into fixed-size batches so each request stays
//! well inside the model's context window. Every batch is an independent,
//! recoverable request: a transport error or an unparsable answer costs that
//! batch's entries and nothing else.

pub mod completion;
pub mod prompt;
pub mod response;

pub use completion::{CompletionClient, CompletionConfig, OpenAiClient, SYSTEM_PROMPT};
pub use prompt::mapping_prompt;
pub use response::{strip_enclosing_quotes, BatchResponse, ResponseError};

use crate::error::Result;
use crate::extractors::FormField;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;

/// Default number of fields per request.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Field mapper configuration.
#[derive(Debug, Clone)]
pub struct MapperConfig {
    /// Maximum fields per request; 0 is treated as 1
    pub batch_size: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl MapperConfig {
    /// Set the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// Combined mapping of all batches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMappingResult {
    /// field_name -> value, ready for the form writer
    pub form_fields: IndexMap<String, String>,
    /// human description -> value, for display
    pub semantic_fields: IndexMap<String, String>,
}

impl FieldMappingResult {
    /// True when neither mapping has entries.
    pub fn is_empty(&self) -> bool {
        self.form_fields.is_empty() && self.semantic_fields.is_empty()
    }

    /// Merge a batch; later entries overwrite earlier ones with the same key.
    /// `form_fields` keys outside `known_fields` are dropped.
    pub fn merge(&mut self, batch: BatchResponse, known_fields: &HashSet<&str>) {
        for (name, value) in batch.form_fields {
            if known_fields.contains(name.as_str()) {
                self.form_fields.insert(name, value);
            } else {
                log::debug!("Ignoring unknown field name '{}' in mapping response", name);
            }
        }
        self.semantic_fields.extend(batch.semantic_fields);
    }

    /// Write `semantic_fields` as a two-column `Field,Value` CSV.
    pub fn write_semantic_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["Field", "Value"])?;
        for (field, value) in &self.semantic_fields {
            csv.write_record([field.as_str(), value.as_str()])?;
        }
        csv.flush()?;
        Ok(())
    }
}

/// Outcome of the individual batches of one mapping run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Number of requests issued
    pub batches: usize,
    /// 0-based indices of batches that contributed nothing
    pub failed: Vec<usize>,
}

impl BatchReport {
    /// True when at least one batch ran and every batch failed.
    pub fn all_failed(&self) -> bool {
        self.batches > 0 && self.failed.len() == self.batches
    }

    /// Number of batches that were merged.
    pub fn succeeded(&self) -> usize {
        self.batches - self.failed.len()
    }
}

/// Maps form fields to values with one completion request per batch.
#[derive(Debug, Clone, Default)]
pub struct FieldMapper {
    config: MapperConfig,
}

impl FieldMapper {
    /// Create a mapper.
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    /// Effective batch size (never 0).
    pub fn batch_size(&self) -> usize {
        self.config.batch_size.max(1)
    }

    /// Map fields to values. Failed batches are skipped; see
    /// [`map_with_report`](Self::map_with_report) to learn which.
    pub fn map<C: CompletionClient + ?Sized>(
        &self,
        client: &C,
        fields: &[FormField],
        user_data: &str,
        form_name: &str,
    ) -> FieldMappingResult {
        self.map_with_report(client, fields, user_data, form_name).0
    }

    /// Map fields to values and report per-batch outcomes.
    pub fn map_with_report<C: CompletionClient + ?Sized>(
        &self,
        client: &C,
        fields: &[FormField],
        user_data: &str,
        form_name: &str,
    ) -> (FieldMappingResult, BatchReport) {
        let batch_size = self.batch_size();
        let total = fields.len().div_ceil(batch_size);
        let known: HashSet<&str> = fields.iter().map(|f| f.field_name.as_str()).collect();

        let mut result = FieldMappingResult::default();
        let mut report = BatchReport {
            batches: total,
            failed: Vec::new(),
        };

        for (index, batch) in fields.chunks(batch_size).enumerate() {
            log::debug!("Mapping batch {}/{} ({} fields)", index + 1, total, batch.len());
            let prompt = mapping_prompt(user_data, form_name, batch, index + 1, total);

            let raw = match client.complete(SYSTEM_PROMPT, &prompt) {
                Ok(raw) => raw,
                Err(e) => {
                    log::warn!("Batch {}/{} request failed: {}", index + 1, total, e);
                    report.failed.push(index);
                    continue;
                },
            };
            match BatchResponse::parse(&raw) {
                Ok(parsed) => result.merge(parsed, &known),
                Err(e) => {
                    log::warn!("Batch {}/{} response rejected: {}", index + 1, total, e);
                    report.failed.push(index);
                },
            }
        }

        if report.all_failed() {
            log::warn!("All {} mapping batches failed", report.batches);
        }
        (result, report)
    }
}
