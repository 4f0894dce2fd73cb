//! Deduction suggestions and form recommendations.
//!
//! Both are single completion requests whose line-oriented answers are
//! parsed leniently: formatting the model adds despite instructions is
//! stripped, and lines that do not fit the expected shape are ignored.

use crate::error::Result;
use crate::mapper::completion::{CompletionClient, SYSTEM_PROMPT};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Characters of document text sent with the deduction prompt.
pub const DEDUCTION_CONTEXT_CHARS: usize = 3000;

lazy_static! {
    static ref NUMBERING: Regex = Regex::new(r"^\d+[.)]\s*").expect("valid numbering pattern");
    static ref BULLET: Regex = Regex::new(r"^[•\-*]\s*").expect("valid bullet pattern");
}

/// One recommended IRS form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRecommendation {
    /// Display name, e.g. `Schedule_A`
    pub form: String,
    /// Download code, e.g. `f1040sa`
    pub code: String,
    /// Short description
    pub description: String,
}

/// Ask for the deductions, credits and income types a document supports.
pub fn suggest_deductions<C: CompletionClient + ?Sized>(client: &C, document_text: &str) -> Result<Vec<String>> {
    let raw = client.complete(SYSTEM_PROMPT, &deduction_prompt(document_text))?;
    let deductions = parse_deductions(&raw);
    log::info!("Identified {} deductions/income types", deductions.len());
    Ok(deductions)
}

/// Ask which forms and schedules the given deductions require.
pub fn recommend_forms<C: CompletionClient + ?Sized>(
    client: &C,
    deductions: &[String],
) -> Result<Vec<FormRecommendation>> {
    let raw = client.complete(SYSTEM_PROMPT, &recommendation_prompt(deductions))?;
    let forms = parse_recommendations(&raw);
    log::info!("Recommended {} forms", forms.len());
    Ok(forms)
}

/// Prompt for [`suggest_deductions`]; only the first
/// [`DEDUCTION_CONTEXT_CHARS`] characters of the document are included.
pub fn deduction_prompt(document_text: &str) -> String {
    let excerpt: String = document_text.chars().take(DEDUCTION_CONTEXT_CHARS).collect();
    format!(
        r#"You are an expert tax professional with deep knowledge of IRS regulations. Analyze the following tax document and identify ALL IRS-eligible deductions, credits, and income types that are clearly supported by the document content.

Look for ALL of the following that apply:
- All income types (wages, interest, dividends, self-employment, rental, etc.)
- All deductions (itemized, business, education, medical, etc.)
- All credits (child tax, education, retirement, etc.)
- All adjustments to income
- All special circumstances supported by the data

Only include what is clearly present in the document.

CRITICAL: Return ONLY deduction/income names, one per line, NO numbers, NO bullets, NO formatting.

Document:
"""
{excerpt}
"""

Deduction/Income names:"#
    )
}

/// Prompt for [`recommend_forms`].
pub fn recommendation_prompt(deductions: &[String]) -> String {
    let deductions_text = deductions.join(" ");
    format!(
        r#"You are an expert tax professional with comprehensive knowledge of all IRS forms and schedules. Based on the following deductions and income types identified from a taxpayer's documents, recommend ALL relevant IRS forms and schedules needed to file their tax return.

Include the main tax return form (Form 1040 for individuals), every relevant schedule and additional form, and the correct IRS form code for downloading.

Deductions and income types identified:
"""
{deductions_text}
"""

Return the forms in this exact format (one form per line):
Form_1040|f1040 - U.S. Individual Income Tax Return
Schedule_A|f1040sa - Itemized Deductions
Schedule_B|f1040sb - Interest and Ordinary Dividends
Schedule_C|f1040sc - Profit or Loss From Business
Schedule_D|f1040sd - Capital Gains and Losses
[etc.]

CRITICAL: Return ONLY form names, codes, and descriptions in the format shown above, one per line, NO numbers, NO bullets, NO formatting."#
    )
}

/// One deduction per non-empty line, with list numbering and bullets
/// removed.
pub fn parse_deductions(raw: &str) -> Vec<String> {
    raw.lines()
        .filter_map(|line| {
            let line = line.trim();
            let line = NUMBERING.replace(line, "");
            let line = BULLET.replace(&line, "").trim().to_string();
            (!line.is_empty()).then_some(line)
        })
        .collect()
}

/// Parse `Form_Name|code - description` lines; other lines are skipped.
pub fn parse_recommendations(raw: &str) -> Vec<FormRecommendation> {
    raw.lines()
        .filter_map(|line| {
            let (form, rest) = line.trim().split_once('|')?;
            let (code, description) = rest.trim().split_once(" - ")?;
            Some(FormRecommendation {
                form: form.trim().to_string(),
                code: code.trim().to_string(),
                description: description.trim().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_parse_deductions() {
        let raw = "1. Wages\n2) Mortgage interest\n\n• Student loan interest\n- Charitable contributions\n* Child Tax Credit\n   \nIRA contributions";
        assert_eq!(
            parse_deductions(raw),
            vec![
                "Wages",
                "Mortgage interest",
                "Student loan interest",
                "Charitable contributions",
                "Child Tax Credit",
                "IRA contributions",
            ]
        );
    }

    #[test]
    fn test_numbering_only_stripped_at_start() {
        assert_eq!(parse_deductions("Form 1099-INT interest"), vec!["Form 1099-INT interest"]);
        assert_eq!(parse_deductions("401(k) contributions"), vec!["401(k) contributions"]);
    }

    #[test]
    fn test_parse_recommendations() {
        let raw = "Here are the forms:\nForm_1040|f1040 - U.S. Individual Income Tax Return\nSchedule_A|f1040sa - Itemized Deductions\nSchedule_B f1040sb - missing pipe\nSchedule_C|f1040sc no dash";
        let forms = parse_recommendations(raw);
        assert_eq!(forms.len(), 2);
        assert_eq!(
            forms[0],
            FormRecommendation {
                form: "Form_1040".into(),
                code: "f1040".into(),
                description: "U.S. Individual Income Tax Return".into(),
            }
        );
        assert_eq!(forms[1].code, "f1040sa");
    }

    #[test]
    fn test_description_keeps_later_dashes() {
        let forms = parse_recommendations("Form_8863|f8863 - Education Credits - AOTC and LLC");
        assert_eq!(forms[0].description, "Education Credits - AOTC and LLC");
    }

    #[test]
    fn test_deduction_prompt_truncates() {
        let text = "x".repeat(DEDUCTION_CONTEXT_CHARS + 500);
        let prompt = deduction_prompt(&text);
        assert!(prompt.contains(&"x".repeat(DEDUCTION_CONTEXT_CHARS)));
        assert!(!prompt.contains(&"x".repeat(DEDUCTION_CONTEXT_CHARS + 1)));
    }

    #[test]
    fn test_client_error_propagates() {
        let client = |_: &str, _: &str| -> Result<String> { Err(Error::completion("timeout")) };
        assert!(suggest_deductions(&client, "W-2 wages 52000").is_err());
        assert!(recommend_forms(&client, &["Wages".to_string()]).is_err());
    }

    #[test]
    fn test_suggest_deductions_sends_persona() {
        let client = |system: &str, prompt: &str| -> Result<String> {
            assert_eq!(system, SYSTEM_PROMPT);
            assert!(prompt.contains("W-2 wages 52000"));
            Ok("1. Wages".to_string())
        };
        assert_eq!(suggest_deductions(&client, "W-2 wages 52000").unwrap(), vec!["Wages"]);
    }
}
