//! JSON extraction from model output.
//!
//! Models asked for JSON still wrap it in markdown fences, prefix it with a
//! sentence, or leave a trailing comma. This module recovers the document
//! in those cases and fails otherwise.

use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{DocumateError, Result};

/// Extract and parse JSON from an LLM response
pub fn extract_json_from_response(content: &str) -> Result<Value> {
    extract_json_with_repair_status(content).map(|(value, _)| value)
}

/// Extract and parse JSON, returning whether repair was needed
pub fn extract_json_with_repair_status(content: &str) -> Result<(Value, bool)> {
    let cleaned = strip_code_fences(content.trim().trim_start_matches('\u{feff}'));

    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return Ok((value, false));
    }

    debug!("Initial JSON parse failed, attempting repair");

    let repaired = balance_brackets(&remove_trailing_commas(&cleaned));
    if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
        warn!("Model JSON repaired (trailing commas or unclosed brackets)");
        return Ok((value, true));
    }

    if let Some(extracted) = first_json_block(&cleaned)
        && let Ok(value) = serde_json::from_str::<Value>(&remove_trailing_commas(extracted))
    {
        warn!("Model JSON extracted from surrounding prose");
        return Ok((value, true));
    }

    Err(DocumateError::LlmApi(format!(
        "Model output is not valid JSON. Content preview: {}...",
        cleaned.chars().take(200).collect::<String>()
    )))
}

/// Remove a surrounding markdown code fence (```lang ... ```), if any.
pub fn strip_code_fences(s: &str) -> String {
    let trimmed = s.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    // Drop the info string (`json`, `mermaid`, ...) up to the first newline
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest.trim_start_matches(|c: char| c.is_alphanumeric()),
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
        .to_string()
}

/// Drop commas that directly precede a closing bracket, outside strings.
fn remove_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escape = false;

    for (i, &ch) in chars.iter().enumerate() {
        if escape {
            escape = false;
        } else if in_string {
            match ch {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
        } else if ch == '"' {
            in_string = true;
        } else if ch == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some(']') | Some('}')) {
                continue;
            }
        }
        out.push(ch);
    }
    out
}

/// Close an unterminated string and any unclosed brackets, innermost first.
fn balance_brackets(s: &str) -> String {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escape = false;

    for ch in s.chars() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' if !in_string => stack.push('}'),
            '[' if !in_string => stack.push(']'),
            '}' | ']' if !in_string => {
                stack.pop();
            }
            _ => {}
        }
    }

    let mut out = s.to_string();
    if in_string {
        out.push('"');
    }
    out.extend(stack.into_iter().rev());
    out
}

/// First balanced `{...}` or `[...]` block in mixed content.
fn first_json_block(s: &str) -> Option<&str> {
    let start = s.find(['{', '['])?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;

    for (offset, ch) in s[start..].char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&s[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_json() {
        let (value, repaired) = extract_json_with_repair_status(r#"{"title": "Wiki"}"#).unwrap();
        assert!(!repaired);
        assert_eq!(value["title"], "Wiki");
    }

    #[test]
    fn test_strip_code_fences() {
        let value = extract_json_from_response("```json\n{\"pages\": []}\n```").unwrap();
        assert!(value["pages"].is_array());
        assert_eq!(strip_code_fences("```mermaid\ngraph TD\n```"), "graph TD");
        assert_eq!(strip_code_fences("plain"), "plain");
    }

    #[test]
    fn test_fix_trailing_comma() {
        let (value, repaired) =
            extract_json_with_repair_status(r#"{"pages": [{"file": "a.md"},]}"#).unwrap();
        assert!(repaired);
        assert_eq!(value["pages"][0]["file"], "a.md");
    }

    #[test]
    fn test_comma_inside_string_kept() {
        let (value, _) =
            extract_json_with_repair_status(r#"{"title": "a,]", "x": [1,]}"#).unwrap();
        assert_eq!(value["title"], "a,]");
    }

    #[test]
    fn test_balance_brackets() {
        let (value, repaired) =
            extract_json_with_repair_status(r#"{"pages": [{"file": "a.md"}"#).unwrap();
        assert!(repaired);
        assert!(value["pages"].is_array());
    }

    #[test]
    fn test_extract_from_mixed() {
        let input = "Here is the plan:\n{\"title\": \"T\", \"pages\": []}\nHope this helps!";
        let (value, repaired) = extract_json_with_repair_status(input).unwrap();
        assert!(repaired);
        assert_eq!(value["title"], "T");
    }

    #[test]
    fn test_prose_only_fails() {
        assert!(extract_json_from_response("I cannot help with that.").is_err());
    }
}
