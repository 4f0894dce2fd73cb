//! Noise filtering for extracted form fields.
//!
//! Government forms carry many widgets whose synthesized labels are page
//! furniture (separator rules, page headers, OMB numbers) or table artifacts.
//! The filter drops those before the field list is sent for mapping.

use crate::error::{Error, Result};
use crate::extractors::FormField;
use regex::Regex;

/// Default separator-only label pattern (matched against the whole label).
pub const DEFAULT_SKIP_LABEL_PATTERN: &str = r"[.\s–—_-]*";

/// Default boilerplate substrings (matched case-insensitively).
pub const DEFAULT_SKIP_TERMS: [&str; 4] = ["OMB No", "Tax Return Service", "Page", "Sheet"];

/// Default layout-only field identifier fragments. The second entry spells
/// its hyphen as U+2011 (non-breaking hyphen), as it appears in IRS forms.
pub const DEFAULT_SKIP_FIELD_NAME_PATTERNS: [&str; 2] =
    ["Address_ReadOrder", "Line4a\u{2011}11_ReadOrder"];

/// Field filter configuration.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Minimum label length in characters
    pub min_label_length: usize,
    /// Regex that drops a label when it matches the whole label;
    /// `None` disables the rule
    pub skip_label_pattern: Option<String>,
    /// Boilerplate substrings that drop a label
    pub skip_terms_in_label: Vec<String>,
    /// Field identifier substrings that drop a field
    pub skip_field_name_patterns: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterConfig {
    /// Create a configuration with the default rules.
    pub fn new() -> Self {
        Self {
            min_label_length: 3,
            skip_label_pattern: Some(DEFAULT_SKIP_LABEL_PATTERN.to_string()),
            skip_terms_in_label: DEFAULT_SKIP_TERMS.iter().map(|s| s.to_string()).collect(),
            skip_field_name_patterns: DEFAULT_SKIP_FIELD_NAME_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Set the minimum label length.
    pub fn with_min_label_length(mut self, length: usize) -> Self {
        self.min_label_length = length;
        self
    }

    /// Set or disable the separator-only label pattern.
    pub fn with_skip_label_pattern(mut self, pattern: Option<&str>) -> Self {
        self.skip_label_pattern = pattern.map(str::to_string);
        self
    }

    /// Replace the boilerplate label terms.
    pub fn with_skip_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_terms_in_label = terms.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the field identifier fragments.
    pub fn with_skip_field_name_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_field_name_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }
}

/// Why a field was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Label is empty after trimming
    EmptyLabel,
    /// Label is shorter than the minimum length
    TooShort,
    /// Label consists only of separators
    SeparatorOnly,
    /// Label contains a boilerplate term
    BoilerplateTerm,
    /// Field identifier marks a layout-only field
    LayoutField,
}

/// Compiled field filter.
#[derive(Debug, Clone)]
pub struct FieldFilter {
    config: FilterConfig,
    skip_label: Option<Regex>,
    skip_terms_lower: Vec<String>,
}

impl FieldFilter {
    /// Compile a filter. Fails with [`Error::InvalidConfig`] when the label
    /// pattern is not a valid regex.
    pub fn new(config: FilterConfig) -> Result<Self> {
        let skip_label = match &config.skip_label_pattern {
            Some(pattern) => Some(Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
                Error::InvalidConfig(format!("invalid skip_label_pattern '{}': {}", pattern, e))
            })?),
            None => None,
        };
        let skip_terms_lower = config
            .skip_terms_in_label
            .iter()
            .map(|term| term.to_lowercase())
            .collect();
        Ok(Self {
            config,
            skip_label,
            skip_terms_lower,
        })
    }

    /// The configuration this filter was built from.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Decide whether a field is dropped; rules are checked in order and the
    /// first match wins. `label` must already be normalized.
    pub fn drop_reason(&self, field_name: &str, label: &str) -> Option<DropReason> {
        if label.is_empty() {
            return Some(DropReason::EmptyLabel);
        }
        if label.chars().count() < self.config.min_label_length {
            return Some(DropReason::TooShort);
        }
        if self.skip_label.as_ref().is_some_and(|re| re.is_match(label)) {
            return Some(DropReason::SeparatorOnly);
        }
        let lower = label.to_lowercase();
        if self.skip_terms_lower.iter().any(|term| lower.contains(term.as_str())) {
            return Some(DropReason::BoilerplateTerm);
        }
        if self
            .config
            .skip_field_name_patterns
            .iter()
            .any(|pattern| field_name.contains(pattern.as_str()))
        {
            return Some(DropReason::LayoutField);
        }
        None
    }

    /// Filter fields, preserving order. Kept fields carry their label with
    /// surrounding whitespace trimmed and inner runs collapsed to one space.
    pub fn apply(&self, fields: &[FormField]) -> Vec<FormField> {
        let kept: Vec<FormField> = fields
            .iter()
            .filter_map(|field| {
                let label = normalize_label(&field.label);
                match self.drop_reason(&field.field_name, &label) {
                    Some(reason) => {
                        log::trace!("Dropping '{}' ({:?})", field.field_name, reason);
                        None
                    },
                    None => Some(FormField::new(field.field_name.clone(), label)),
                }
            })
            .collect();
        log::debug!("Filter kept {} of {} fields", kept.len(), fields.len());
        kept
    }
}

lazy_static::lazy_static! {
    static ref DEFAULT_FILTER: FieldFilter =
        FieldFilter::new(FilterConfig::default()).expect("valid default skip pattern");
}

/// Filter fields with the default configuration.
pub fn filter_fields(fields: &[FormField]) -> Vec<FormField> {
    DEFAULT_FILTER.apply(fields)
}

/// Trim and collapse internal whitespace runs to single spaces.
pub fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ")
}
