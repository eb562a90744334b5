//! Status classification and default message resolution.

use serde::Serialize;

use crate::config::CodeConfig;

// ---------------------------------------------------------------------------
// Named statuses
// ---------------------------------------------------------------------------

pub const HTTP_OK: u16 = 200;
pub const HTTP_CREATED: u16 = 201;
pub const HTTP_ACCEPTED: u16 = 202;
pub const HTTP_NO_CONTENT: u16 = 204;
pub const HTTP_BAD_REQUEST: u16 = 400;
pub const HTTP_UNAUTHORIZED: u16 = 401;
pub const HTTP_FORBIDDEN: u16 = 403;
pub const HTTP_NOT_FOUND: u16 = 404;
pub const HTTP_METHOD_NOT_ALLOWED: u16 = 405;
pub const HTTP_UNPROCESSABLE_ENTITY: u16 = 422;
pub const HTTP_INTERNAL_SERVER_ERROR: u16 = 500;

/// Separator between a message and its business code in configured strings.
pub const BUSINESS_CODE_SEPARATOR: char = '|';

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Outcome category carried in the envelope's `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Success,
    Fail,
    Error,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Fail => "fail",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a numeric status: 4xx is a fail, 5xx an error, anything else a
/// success (including 1xx, 3xx and out-of-range values).
pub fn classify(status: u16) -> Category {
    match status {
        400..=499 => Category::Fail,
        500..=599 => Category::Error,
        _ => Category::Success,
    }
}

// ---------------------------------------------------------------------------
// Message resolution
// ---------------------------------------------------------------------------

/// A message split from its optional business code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMessage {
    pub message: String,
    pub business_code: Option<String>,
}

/// Split `"message|code"` at the first separator.
///
/// A string without a separator is returned as the message with no code.
pub fn split_business_code(raw: &str) -> ResolvedMessage {
    match raw.split_once(BUSINESS_CODE_SEPARATOR) {
        Some((message, code)) => ResolvedMessage {
            message: message.to_string(),
            business_code: Some(code.to_string()),
        },
        None => ResolvedMessage {
            message: raw.to_string(),
            business_code: None,
        },
    }
}

/// Resolve the message and business code for an envelope.
///
/// An empty `message` falls back to the configured default for `category`.
/// The separator split applies to caller-supplied messages as well, so a
/// caller message containing `|` always overrides the business code.
pub fn resolve_message(message: &str, category: Category, codes: &CodeConfig) -> ResolvedMessage {
    let raw = if message.is_empty() {
        codes.for_category(category)
    } else {
        message
    };
    split_business_code(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_ranges() {
        for status in [0, 100, 200, 201, 204, 301, 399, 600, 999, u16::MAX] {
            assert_eq!(classify(status), Category::Success, "status {status}");
        }
        for status in 400..=499 {
            assert_eq!(classify(status), Category::Fail, "status {status}");
        }
        for status in 500..=599 {
            assert_eq!(classify(status), Category::Error, "status {status}");
        }
    }

    #[test]
    fn category_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Category::Fail).unwrap(), "fail");
        assert_eq!(Category::Error.to_string(), "error");
    }

    #[test]
    fn split_uses_first_separator_only() {
        let resolved = split_business_code("Broken|30001|extra");
        assert_eq!(resolved.message, "Broken");
        assert_eq!(resolved.business_code.as_deref(), Some("30001|extra"));
    }

    #[test]
    fn split_without_separator_keeps_message() {
        let resolved = split_business_code("Plain message");
        assert_eq!(resolved.message, "Plain message");
        assert_eq!(resolved.business_code, None);
    }

    #[test]
    fn empty_message_uses_category_default() {
        let codes = CodeConfig::default();
        let resolved = resolve_message("", Category::Fail, &codes);
        assert_eq!(resolved.message, "Fail");
        assert_eq!(resolved.business_code.as_deref(), Some("20000"));
    }

    #[test]
    fn caller_message_with_separator_overrides_code() {
        let codes = CodeConfig::default();
        let resolved = resolve_message("Custom|777", Category::Fail, &codes);
        assert_eq!(resolved.message, "Custom");
        assert_eq!(resolved.business_code.as_deref(), Some("777"));
    }

    #[test]
    fn empty_default_resolves_to_empty_message() {
        let codes = CodeConfig {
            success: String::new(),
            ..CodeConfig::default()
        };
        let resolved = resolve_message("", Category::Success, &codes);
        assert_eq!(resolved.message, "");
        assert_eq!(resolved.business_code, None);
    }
}
