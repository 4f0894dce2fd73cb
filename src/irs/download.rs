//! Blank-form retrieval.

use std::io::Read;
use std::time::Duration;

/// Base URL of the IRS current-year forms directory.
pub const IRS_PDF_BASE_URL: &str = "https://www.irs.gov/pub/irs-pdf";

/// Source of blank form PDFs addressed by form code (`f1040`, `fw4`, ...).
pub trait FormSource {
    /// Raw PDF bytes of the form, or `None` when it cannot be obtained.
    fn fetch_form(&self, code: &str) -> Option<Vec<u8>>;
}

impl<F> FormSource for F
where
    F: Fn(&str) -> Option<Vec<u8>>,
{
    fn fetch_form(&self, code: &str) -> Option<Vec<u8>> {
        self(code)
    }
}

/// Downloads forms from `{base_url}/{code}.pdf`.
pub struct IrsFormSource {
    base_url: String,
    agent: ureq::Agent,
}

impl Default for IrsFormSource {
    fn default() -> Self {
        Self::new(IRS_PDF_BASE_URL, 60)
    }
}

impl IrsFormSource {
    /// Create a source with a base URL and per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(timeout_secs))
            .build();
        Self {
            base_url: base_url.into(),
            agent,
        }
    }

    /// URL of a form, or `None` for codes with characters outside
    /// `[A-Za-z0-9_-]`.
    pub fn form_url(&self, code: &str) -> Option<String> {
        if !is_valid_code(code) {
            return None;
        }
        Some(format!("{}/{}.pdf", self.base_url.trim_end_matches('/'), code))
    }
}

impl FormSource for IrsFormSource {
    fn fetch_form(&self, code: &str) -> Option<Vec<u8>> {
        let Some(url) = self.form_url(code) else {
            log::warn!("Rejected form code '{}'", code);
            return None;
        };

        log::debug!("Downloading {}", url);
        let resp = match self.agent.get(&url).call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, _)) => {
                log::warn!("Form not found: {} (HTTP {})", code, status);
                return None;
            },
            Err(ureq::Error::Transport(t)) => {
                log::warn!("Error downloading {}: {}", code, t);
                return None;
            },
        };

        let mut bytes = Vec::new();
        if let Err(e) = resp.into_reader().read_to_end(&mut bytes) {
            log::warn!("Error reading {}: {}", code, e);
            return None;
        }
        log::debug!("Downloaded {} ({} bytes)", code, bytes.len());
        Some(bytes)
    }
}

fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_url() {
        let source = IrsFormSource::default();
        assert_eq!(
            source.form_url("f1040").as_deref(),
            Some("https://www.irs.gov/pub/irs-pdf/f1040.pdf")
        );
        assert_eq!(
            IrsFormSource::new("http://localhost/forms/", 5).form_url("f1040sa").as_deref(),
            Some("http://localhost/forms/f1040sa.pdf")
        );
    }

    #[test]
    fn test_invalid_codes_rejected() {
        let source = IrsFormSource::default();
        for code in ["", "../etc/passwd", "f1040?x=1", "f 1040"] {
            assert_eq!(source.form_url(code), None, "{:?}", code);
            assert_eq!(source.fetch_form(code), None);
        }
    }

    #[test]
    fn test_closure_source() {
        let source = |code: &str| (code == "fw4").then(|| b"%PDF-1.7".to_vec());
        assert!(source.fetch_form("fw4").is_some());
        assert!(source.fetch_form("f1040").is_none());
    }
}
