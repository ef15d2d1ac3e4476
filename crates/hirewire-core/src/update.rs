//! Free-text `key=value` update parsing.
//!
//! `update_interview 3 date=2024-03-01 time=15:30 desc="System Design"`
//! carries its edits as whitespace-separated `key=value` tokens where a
//! value may be double-quoted to include spaces. Parsing runs in two
//! passes: quoted tokens first (with backslash de-escaping), then bare
//! tokens, so a quoted value is never shredded by the whitespace split.

use thiserror::Error;

use crate::validate::{parse_date, parse_time};

/// Field subset carried by an update request. `None` means "leave as
/// is"; a populated `date` is already normalised to ISO form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterviewPatch {
    pub date: Option<String>,
    pub time: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl InterviewPatch {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.time.is_none()
            && self.category.is_none()
            && self.description.is_none()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseUpdatesError {
    /// No `date=`, `time=`, `type=` or `desc=` token was found.
    #[error("no recognized update keys")]
    NoRecognizedKeys,

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid time: {0}")]
    InvalidTime(String),
}

/// Canonical field behind a user-facing key, or `None` for keys we
/// ignore.
fn field_of<'p>(patch: &'p mut InterviewPatch, key: &str) -> Option<&'p mut Option<String>> {
    match key.to_ascii_lowercase().as_str() {
        "date" => Some(&mut patch.date),
        "time" => Some(&mut patch.time),
        "type" => Some(&mut patch.category),
        "desc" => Some(&mut patch.description),
        _ => None,
    }
}

/// Parse an update argument string into a patch.
///
/// A key set by the quoted pass wins over any bare token with the same
/// key; unrecognised keys are ignored. An invalid date or time aborts
/// the whole parse so the caller never applies a partial write.
pub fn parse_updates(input: &str) -> Result<InterviewPatch, ParseUpdatesError> {
    let mut patch = InterviewPatch::default();

    for (key, value) in quoted_tokens(input) {
        if let Some(field) = field_of(&mut patch, &key) {
            if field.is_none() {
                *field = Some(value);
            }
        }
    }

    for token in input.split_whitespace() {
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        if let Some(field) = field_of(&mut patch, key) {
            if field.is_none() {
                *field = Some(value.to_string());
            }
        }
    }

    if patch.is_empty() {
        return Err(ParseUpdatesError::NoRecognizedKeys);
    }

    if let Some(ref d) = patch.date {
        let parsed = parse_date(d).ok_or_else(|| ParseUpdatesError::InvalidDate(d.clone()))?;
        patch.date = Some(parsed.to_string());
    }
    if let Some(ref t) = patch.time {
        if !parse_time(t) {
            return Err(ParseUpdatesError::InvalidTime(t.clone()));
        }
    }

    Ok(patch)
}

/// First pass: extract every `key="..."` span, unescaping
/// backslash-escaped characters and stripping the quotes. Unterminated
/// quotes are left for the bare pass.
fn quoted_tokens(input: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if !is_key_char(c) {
            chars.next();
            continue;
        }

        let mut end = start;
        while let Some(&(i, c)) = chars.peek() {
            if !is_key_char(c) {
                break;
            }
            end = i + c.len_utf8();
            chars.next();
        }

        if !input[end..].starts_with("=\"") {
            continue;
        }
        chars.next(); // `=`
        chars.next(); // opening quote

        let mut value = String::new();
        let mut escaped = false;
        let mut closed = false;
        for (_, c) in chars.by_ref() {
            if escaped {
                value.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                closed = true;
                break;
            } else {
                value.push(c);
            }
        }

        if closed {
            out.push((input[start..end].to_string(), value));
        }
    }

    out
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_tokens_populate_fields() {
        let patch = parse_updates("date=2024-03-01 time=15:30 type=Technical desc=prep").unwrap();
        assert_eq!(patch.date.as_deref(), Some("2024-03-01"));
        assert_eq!(patch.time.as_deref(), Some("15:30"));
        assert_eq!(patch.category.as_deref(), Some("Technical"));
        assert_eq!(patch.description.as_deref(), Some("prep"));
    }

    #[test]
    fn quoted_values_keep_internal_whitespace() {
        let patch = parse_updates(r#"desc="System Design round" time=09:00"#).unwrap();
        assert_eq!(patch.description.as_deref(), Some("System Design round"));
        assert_eq!(patch.time.as_deref(), Some("09:00"));
    }

    #[test]
    fn escaped_characters_are_unescaped() {
        let patch = parse_updates(r#"desc="say \"hi\" \\ done""#).unwrap();
        assert_eq!(patch.description.as_deref(), Some(r#"say "hi" \ done"#));
    }

    #[test]
    fn quoted_pass_wins_over_bare_duplicates() {
        let patch = parse_updates(r#"desc="first choice" desc=second"#).unwrap();
        assert_eq!(patch.description.as_deref(), Some("first choice"));
    }

    #[test]
    fn first_bare_token_wins_among_duplicates() {
        let patch = parse_updates("type=Technical type=Behavioral").unwrap();
        assert_eq!(patch.category.as_deref(), Some("Technical"));
    }

    #[test]
    fn unrecognized_keys_are_ignored() {
        let patch = parse_updates(r#"when=tomorrow type=HR where="room 4""#).unwrap();
        assert_eq!(patch.category.as_deref(), Some("HR"));
        assert_eq!(patch.date, None);
        assert_eq!(patch.description, None);
    }

    #[test]
    fn keys_are_case_insensitive() {
        let patch = parse_updates("DATE=2024-03-01 Desc=prep").unwrap();
        assert_eq!(patch.date.as_deref(), Some("2024-03-01"));
        assert_eq!(patch.description.as_deref(), Some("prep"));
    }

    #[test]
    fn no_recognized_keys_is_an_error() {
        assert_eq!(
            parse_updates("hello world foo=bar"),
            Err(ParseUpdatesError::NoRecognizedKeys)
        );
        assert_eq!(
            parse_updates(""),
            Err(ParseUpdatesError::NoRecognizedKeys)
        );
    }

    #[test]
    fn invalid_date_aborts_the_whole_parse() {
        assert_eq!(
            parse_updates("date=2024-13-01 type=Technical"),
            Err(ParseUpdatesError::InvalidDate("2024-13-01".into()))
        );
    }

    #[test]
    fn invalid_time_aborts_the_whole_parse() {
        assert_eq!(
            parse_updates("time=25:00 desc=prep"),
            Err(ParseUpdatesError::InvalidTime("25:00".into()))
        );
    }

    #[test]
    fn unterminated_quote_falls_back_to_the_bare_pass() {
        // The quoted pass finds no closing quote, so the bare pass takes
        // the raw fragment as-is.
        let patch = parse_updates(r#"desc="unfinished"#).unwrap();
        assert_eq!(patch.description.as_deref(), Some("\"unfinished"));
    }
}
