//! End-to-end form filling: extract → filter → map → write.
//!
//! Each run is stateless; the blank form bytes are borrowed and the filled
//! document is returned as a new buffer.

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::extractors::{extract_form_fields, FormField};
use crate::filter::FieldFilter;
use crate::irs::FormSource;
use crate::mapper::{BatchReport, CompletionClient, FieldMapper, FieldMappingResult};
use crate::writer::FormFiller;

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Fields that survived filtering and were sent for mapping
    pub fields: Vec<FormField>,
    /// Combined mapping
    pub mapping: FieldMappingResult,
    /// Per-batch outcomes
    pub report: BatchReport,
    /// The filled document
    pub filled_pdf: Vec<u8>,
}

/// Configured fill pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    filter: FieldFilter,
    mapper: FieldMapper,
    filler: FormFiller,
}

impl Pipeline {
    /// Build a pipeline. Fails when the filter configuration is invalid.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let filter = FieldFilter::new(config.filter.clone())?;
        let mapper = FieldMapper::new(config.mapper.clone());
        let filler = FormFiller::with_options(config.fill.clone());
        Ok(Self {
            config,
            filter,
            mapper,
            filler,
        })
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extract and filter the fillable fields of a blank form.
    pub fn prepare_fields(&self, pdf: &[u8]) -> Result<Vec<FormField>> {
        let extracted = extract_form_fields(pdf)?;
        let fields = self.filter.apply(&extracted);
        log::info!(
            "Extracted {} fields, {} kept after filtering",
            extracted.len(),
            fields.len()
        );
        Ok(fields)
    }

    /// Fill `pdf` from `user_data`.
    ///
    /// A form without fillable fields is not an error: no requests are made
    /// and the document is written back unchanged apart from the AcroForm
    /// flags.
    pub fn run<C: CompletionClient + ?Sized>(
        &self,
        client: &C,
        pdf: &[u8],
        user_data: &str,
        form_name: &str,
    ) -> Result<PipelineOutput> {
        let fields = self.prepare_fields(pdf)?;

        let (mapping, report) = self.mapper.map_with_report(client, &fields, user_data, form_name);
        log::info!(
            "Mapped {} fields in {}/{} batches",
            mapping.form_fields.len(),
            report.succeeded(),
            report.batches
        );
        if report.all_failed() && self.config.fail_on_empty_mapping {
            return Err(Error::AllBatchesFailed {
                batches: report.batches,
            });
        }

        let filled_pdf = self.filler.fill(pdf, &mapping.form_fields)?;
        log::info!("Wrote filled form ({} bytes)", filled_pdf.len());

        Ok(PipelineOutput {
            fields,
            mapping,
            report,
            filled_pdf,
        })
    }

    /// Fetch the blank form `code` from `source` and fill it.
    pub fn run_for_code<C, S>(
        &self,
        client: &C,
        source: &S,
        code: &str,
        user_data: &str,
        form_name: &str,
    ) -> Result<PipelineOutput>
    where
        C: CompletionClient + ?Sized,
        S: FormSource + ?Sized,
    {
        let pdf = source
            .fetch_form(code)
            .ok_or_else(|| Error::FormNotFound(code.to_string()))?;
        log::info!("Fetched form {} ({} bytes)", code, pdf.len());
        self.run(client, &pdf, user_data, form_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterConfig;

    #[test]
    fn test_invalid_filter_rejected() {
        let config = PipelineConfig::new()
            .with_filter(FilterConfig::new().with_skip_label_pattern(Some("(unclosed")));
        assert!(matches!(Pipeline::new(config), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_form_code() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let client = |_: &str, _: &str| -> Result<String> { panic!("no request expected") };
        let source = |_: &str| -> Option<Vec<u8>> { None };
        let err = pipeline
            .run_for_code(&client, &source, "f9999", "", "Form 9999")
            .unwrap_err();
        assert!(matches!(err, Error::FormNotFound(code) if code == "f9999"));
    }

    #[test]
    fn test_garbage_pdf_is_fatal() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let client = |_: &str, _: &str| -> Result<String> { panic!("no request expected") };
        assert!(pipeline.run(&client, b"not a pdf", "", "Form 1040").is_err());
    }
}
