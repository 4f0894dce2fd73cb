//! Configuration for the fill pipeline.

use crate::filter::FilterConfig;
use crate::mapper::{CompletionConfig, MapperConfig};
use crate::writer::FillOptions;

/// Pipeline configuration.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Field filter rules.
    pub filter: FilterConfig,

    /// Batching.
    pub mapper: MapperConfig,

    /// Form writer options.
    pub fill: FillOptions,

    /// Completion endpoint, used when the pipeline builds its own client.
    pub completion: CompletionConfig,

    /// Fail with `AllBatchesFailed` instead of writing an unchanged form
    /// when every mapping batch failed.
    pub fail_on_empty_mapping: bool,
}

impl PipelineConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with the completion settings taken from the environment.
    pub fn from_env() -> Self {
        Self::default().with_completion(CompletionConfig::from_env())
    }

    /// Set the field filter rules.
    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    /// Set the mapper configuration.
    pub fn with_mapper(mut self, mapper: MapperConfig) -> Self {
        self.mapper = mapper;
        self
    }

    /// Set the number of fields per mapping request.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.mapper.batch_size = batch_size;
        self
    }

    /// Set the form writer options.
    pub fn with_fill_options(mut self, fill: FillOptions) -> Self {
        self.fill = fill;
        self
    }

    /// Set the completion endpoint configuration.
    pub fn with_completion(mut self, completion: CompletionConfig) -> Self {
        self.completion = completion;
        self
    }

    /// Fail when every mapping batch failed.
    pub fn with_fail_on_empty_mapping(mut self, enable: bool) -> Self {
        self.fail_on_empty_mapping = enable;
        self
    }
}
