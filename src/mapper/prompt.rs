//! Prompt construction for field mapping requests.

use crate::extractors::FormField;

/// Build the user prompt for one batch of fields.
///
/// `batch_number` is 1-based. The fields are embedded as a JSON array of
/// `{"field_name", "label"}` objects.
pub fn mapping_prompt(
    user_data: &str,
    form_name: &str,
    fields: &[FormField],
    batch_number: usize,
    total_batches: usize,
) -> String {
    let fields_json = serde_json::to_string_pretty(fields).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"You are an expert at filling IRS tax forms. Analyze the user's data and map it to the appropriate fields for the {form_name} form.

USER DATA:
"""
{user_data}
"""

PDF FIELDS WITH LABELS (Batch {batch_number}/{total_batches}):
{fields_json}

TASK:
1. Each field has a "field_name" (the identifier you must use in the response) and a "label" (what the field is for).
2. Read the labels, extract the matching data from USER DATA, and return it keyed by the EXACT field_name.
3. Split full names into first/middle/last and addresses into street, city, state and ZIP according to the label.
4. Format SSNs as XXX-XX-XXXX. Set checkboxes to "Yes" or "No".

RULES:
- Use ONLY field names from the list above; do not invent field names.
- In "semantic_fields", use short human-readable descriptions as keys.
- Every value must be a string.
- Leave out fields for which USER DATA has no information.
- Output ONLY valid JSON with double quotes: no markdown, no code blocks, no text before or after.

Output exactly this shape:
{{
  "form_fields": {{ "<field_name>": "<value>" }},
  "semantic_fields": {{ "<human readable name>": "<value>" }}
}}"#
    )
}
