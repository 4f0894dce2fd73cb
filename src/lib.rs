// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::should_implement_trait)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # Taxform Oxide
//!
//! Tax form field extraction and fill-back for interactive (AcroForm) PDFs.
//!
//! ## Core Features
//!
//! - **Field Extraction**: every fillable text widget with its fully qualified
//!   name and a human label, taken from `/TU` or inferred from the page text
//!   above and to the left of the widget
//! - **Field Filtering**: drops separator, boilerplate and layout-only fields
//! - **Field Mapping**: batched text-completion requests with a strict JSON
//!   response contract; a failed batch never affects the others
//! - **Form Writing**: values written into a fresh copy of the document with
//!   regenerated black-text appearances
//! - **IRS Helpers**: blank-form download, deduction suggestions and form
//!   recommendations
//!
//! ## Quick Start
//!
//! ```no_run
//! use taxform_oxide::config::PipelineConfig;
//! use taxform_oxide::mapper::{CompletionConfig, OpenAiClient};
//! use taxform_oxide::pipeline::Pipeline;
//!
//! # fn main() -> taxform_oxide::Result<()> {
//! let client = OpenAiClient::new(CompletionConfig::from_env())?;
//! let pipeline = Pipeline::new(PipelineConfig::default())?;
//!
//! let blank = std::fs::read("fw4.pdf")?;
//! let output = pipeline.run(&client, &blank, "John Smith, SSN 123-45-6789", "Form W-4")?;
//! std::fs::write("fw4-filled.pdf", &output.filled_pdf)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// PDF object model helpers
pub mod encryption;
pub mod geometry;
pub mod object;

// Content interpretation
pub mod content;
pub mod fonts;

// Extraction
pub mod extractors;

// Field processing
pub mod filter;
pub mod mapper;

// Writing
pub mod writer;

// Collaborators and orchestration
pub mod config;
pub mod irs;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use extractors::{extract_form_fields, extract_text, read_field_values, FormField};
pub use filter::{filter_fields, FieldFilter, FilterConfig};
pub use mapper::{
    BatchReport, CompletionClient, CompletionConfig, FieldMapper, FieldMappingResult, MapperConfig,
    OpenAiClient,
};
pub use pipeline::{Pipeline, PipelineOutput};
pub use writer::{fill_form, FillOptions, FormFiller};
