use std::collections::BTreeMap;
use std::fmt;

use url::{ParseError, Url};

use crate::config::{ApiVersion, NotificationConfig};

/// Required length of a routing/service key.
pub const ROUTING_KEY_LEN: usize = 32;

/// Field-scoped validation errors, keyed by config field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error message against a field.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    /// Messages recorded for one field (empty if the field is fine).
    pub fn field_errors(&self, field: &str) -> &[String] {
        self.errors
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of messages across all fields.
    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (field, messages)) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}=[{}]", messages.join(", "))?;
        }
        f.write_str("}")
    }
}

/// Field names and messages of one plugin generation.
struct Policy {
    key_field: &'static str,
    key_empty: &'static str,
    key_length: &'static str,
    url_field: &'static str,
    url_unparseable: &'static str,
    url_scheme: &'static str,
    /// Prefix, client name and URL must be set.
    require_all: bool,
}

const STRICT: Policy = Policy {
    key_field: "routing_key",
    key_empty: "Routing Key cannot be empty.",
    key_length: "Routing Key must be 32 characters long.",
    url_field: "client_url",
    url_unparseable: "Couldn't parse Client URL correctly.",
    url_scheme: "Client URL must be a valid HTTP or HTTPS URL.",
    require_all: true,
};

const RELAXED: Policy = Policy {
    key_field: "service_key",
    key_empty: "service_key is mandatory and must be not be null or empty.",
    key_length: "service_key must be 32 characters long.",
    url_field: "client_url",
    url_unparseable: "Couldn't parse client_url correctly.",
    url_scheme: "client_url must be a valid HTTP or HTTPS URL.",
    require_all: false,
};

/// Why a client URL was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UrlProblem {
    /// Not a well-formed URI.
    Unparseable(String),
    /// Well-formed, but relative or not `http`/`https`.
    Scheme,
}

/// Parse a client URL, rejecting text a strict URI parser would refuse.
///
/// `Url::parse` silently percent-encodes spaces and stray `%` signs; those
/// are reported as unparseable here. Relative references such as
/// `graylog.example.com` parse but have no scheme.
pub(crate) fn parse_client_url(raw: &str) -> Result<Url, UrlProblem> {
    if let Some(reason) = illegal_character(raw) {
        return Err(UrlProblem::Unparseable(reason));
    }
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        Ok(_) | Err(ParseError::RelativeUrlWithoutBase) => Err(UrlProblem::Scheme),
        Err(e) => Err(UrlProblem::Unparseable(e.to_string())),
    }
}

fn illegal_character(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let escaped = bytes
                    .get(i + 1..i + 3)
                    .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
                if !escaped {
                    return Some(format!("malformed escape at index {i}"));
                }
                i += 3;
                continue;
            }
            b' ' | b'"' | b'<' | b'>' | b'\\' | b'^' | b'`' | b'{' | b'|' | b'}' => {
                return Some(format!("illegal character at index {i}"));
            }
            b if b.is_ascii_control() => {
                return Some(format!("illegal character at index {i}"));
            }
            _ => {}
        }
        i += 1;
    }
    None
}

impl NotificationConfig {
    /// Check every field and collect all problems in one pass.
    ///
    /// The v2 generation requires prefix, client name and client URL; the
    /// legacy v1 generation only requires the service key.
    pub fn validate(&self) -> ValidationResult {
        let policy = match self.api_version() {
            ApiVersion::V1 => &RELAXED,
            ApiVersion::V2 => &STRICT,
        };
        let mut result = ValidationResult::new();

        let key = self.routing_key();
        if key.is_empty() {
            result.add_error(policy.key_field, policy.key_empty);
        } else if key.chars().count() != ROUTING_KEY_LEN {
            result.add_error(policy.key_field, policy.key_length);
        }

        if policy.require_all {
            if self.key_prefix().is_empty() {
                result.add_error("key_prefix", "Incident Key Prefix cannot be empty.");
            }
            if self.client_name().is_empty() {
                result.add_error("client_name", "Client Name cannot be empty.");
            }
            if self.client_url().is_empty() {
                result.add_error(policy.url_field, "Client URL cannot be empty.");
            }
        }

        if !self.client_url().is_empty() {
            match parse_client_url(self.client_url()) {
                Ok(_) => {}
                Err(UrlProblem::Unparseable(_)) => {
                    result.add_error(policy.url_field, policy.url_unparseable);
                }
                Err(UrlProblem::Scheme) => result.add_error(policy.url_field, policy.url_scheme),
            }
        }

        result
    }
}
