//! Response formatting configuration.
//!
//! [`ResponseConfig`] is built once at startup (from the environment via
//! [`ResponseConfig::from_env`], or deserialized from a host-provided
//! document) and shared read-only by every request afterwards.

use serde::Deserialize;

use crate::error::CoreError;
use crate::status::Category;

/// Pagination keys surfaced in the meta block when none are configured.
pub const DEFAULT_RETURN_FIELDS: [&str; 9] = [
    "total",
    "per_page",
    "current_page",
    "last_page",
    "from",
    "to",
    "path",
    "prev_page_url",
    "next_page_url",
];

/// Top-level response configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// When `false`, every transport status is pinned to 200 and the logical
    /// status only travels inside the envelope.
    pub is_restful: bool,
    /// Render unhandled failures through the envelope instead of the host's
    /// default error output.
    pub is_unified_return_json: bool,
    /// Include failure kinds and source chains in rendered failures.
    pub debug: bool,
    /// Default `"Message|BusinessCode"` strings.
    pub code: CodeConfig,
    pub format: FormatConfig,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            is_restful: false,
            is_unified_return_json: true,
            debug: false,
            code: CodeConfig::default(),
            format: FormatConfig::default(),
        }
    }
}

/// Default messages, each optionally carrying a business code after `|`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CodeConfig {
    pub success: String,
    pub fail: String,
    pub error: String,
    pub unauthorized: String,
    pub validation: String,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            success: "Success|10000".into(),
            fail: "Fail|20000".into(),
            error: "Error|30000".into(),
            unauthorized: "Unauthenticated|20001".into(),
            validation: "Unprocessable Entity|20002".into(),
        }
    }
}

impl CodeConfig {
    /// The configured default message for a category.
    pub fn for_category(&self, category: Category) -> &str {
        match category {
            Category::Success => &self.success,
            Category::Fail => &self.fail,
            Category::Error => &self.error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Key under which collection items are placed (`list` by default).
    pub collection_field: String,
    pub pagination: PaginationConfig,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            collection_field: "list".into(),
            pagination: PaginationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Key under which pagination metadata is placed (`meta` by default).
    pub meta_field: String,
    /// Allow-list of paginator descriptor keys copied into the meta block.
    pub return_fields: Vec<String>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            meta_field: "meta".into(),
            return_fields: DEFAULT_RETURN_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl ResponseConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                         |
    /// |------------------------------|---------------------------------|
    /// | `RESPONSE_IS_RESTFUL`        | `false`                         |
    /// | `RESPONSE_UNIFIED_JSON`      | `true`                          |
    /// | `APP_DEBUG`                  | `false`                         |
    /// | `RESPONSE_CODE_SUCCESS`      | `Success\|10000`                |
    /// | `RESPONSE_CODE_FAIL`         | `Fail\|20000`                   |
    /// | `RESPONSE_CODE_ERROR`        | `Error\|30000`                  |
    /// | `RESPONSE_CODE_UNAUTHORIZED` | `Unauthenticated\|20001`        |
    /// | `RESPONSE_CODE_VALIDATION`   | `Unprocessable Entity\|20002`   |
    /// | `RESPONSE_COLLECTION_FIELD`  | `list`                          |
    /// | `RESPONSE_META_FIELD`        | `meta`                          |
    /// | `RESPONSE_PAGINATION_FIELDS` | comma-separated default keys    |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// [`from_env`](Self::from_env) delegates here; tests pass a map-backed
    /// closure instead of mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let string = |key: &str, default: String| lookup(key).unwrap_or(default);

        let return_fields = match lookup("RESPONSE_PAGINATION_FIELDS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.format.pagination.return_fields,
        };

        let config = Self {
            is_restful: parse_flag(&lookup, "RESPONSE_IS_RESTFUL", defaults.is_restful)?,
            is_unified_return_json: parse_flag(
                &lookup,
                "RESPONSE_UNIFIED_JSON",
                defaults.is_unified_return_json,
            )?,
            debug: parse_flag(&lookup, "APP_DEBUG", defaults.debug)?,
            code: CodeConfig {
                success: string("RESPONSE_CODE_SUCCESS", defaults.code.success),
                fail: string("RESPONSE_CODE_FAIL", defaults.code.fail),
                error: string("RESPONSE_CODE_ERROR", defaults.code.error),
                unauthorized: string("RESPONSE_CODE_UNAUTHORIZED", defaults.code.unauthorized),
                validation: string("RESPONSE_CODE_VALIDATION", defaults.code.validation),
            },
            format: FormatConfig {
                collection_field: string(
                    "RESPONSE_COLLECTION_FIELD",
                    defaults.format.collection_field,
                ),
                pagination: PaginationConfig {
                    meta_field: string("RESPONSE_META_FIELD", defaults.format.pagination.meta_field),
                    return_fields,
                },
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would produce unaddressable envelope keys.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.format.collection_field.trim().is_empty() {
            return Err(CoreError::Config(
                "format.collection_field must not be empty".into(),
            ));
        }
        if self.format.pagination.meta_field.trim().is_empty() {
            return Err(CoreError::Config(
                "format.pagination.meta_field must not be empty".into(),
            ));
        }
        if self.format.pagination.return_fields.is_empty() {
            return Err(CoreError::Config(
                "format.pagination.return_fields must list at least one key".into(),
            ));
        }
        Ok(())
    }
}

fn parse_flag<F>(lookup: &F, key: &str, default: bool) -> Result<bool, CoreError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(CoreError::Config(format!(
            "{key} must be a boolean (true/false/1/0/yes/no/on/off), got '{other}'"
        ))),
    }
}
