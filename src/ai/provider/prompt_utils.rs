//! Prompt building utilities shared by chat providers.

use serde_json::Value;

/// System prompt for free-text completions
pub const TEXT_SYSTEM_PROMPT: &str =
    "You are an expert software engineer who explains codebases clearly and accurately.";

/// System prompt instructing the model to answer with JSON matching `schema`
pub fn schema_system_prompt(schema: &Value) -> String {
    if schema.is_null() {
        return "You are an expert software engineer. Always respond with valid JSON.".to_string();
    }

    let schema_str = serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
    format!(
        "You are an expert software engineer. Always respond with valid JSON matching this schema:\n\n```json\n{}\n```\n\nRespond ONLY with valid JSON, no explanation.",
        schema_str
    )
}

/// Append JSON schema instructions to a user prompt.
///
/// Used by providers without a separate system channel. Returns the original
/// prompt if schema is null.
pub fn build_schema_prompt(user_prompt: &str, schema: &Value) -> String {
    if schema.is_null() {
        return user_prompt.to_string();
    }

    let schema_str = serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
    format!(
        "{}\n\n---\n\nRespond with valid JSON matching this schema:\n```json\n{}\n```\n\nRespond ONLY with valid JSON, no explanation.",
        user_prompt, schema_str
    )
}
