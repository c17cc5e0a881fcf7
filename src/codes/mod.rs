//! Response code taxonomy and localization.
//!
//! # Data Flow
//! ```text
//! handler outcome (Reply / AppError)
//!     → Code (taxonomy identifier, distinct from HTTP status)
//!     → catalog.rs (Code → HTTP status + localized title/body)
//!     → envelope builder
//! ```
//!
//! # Design Decisions
//! - `Code` is an open newtype: business layers mint their own codes
//! - Unknown codes are not an error; they compile to the fallback entry
//! - The catalog is built once at startup and never mutated afterwards

pub mod catalog;

pub use catalog::{ErrorEntry, Localized, MessageCatalog, SuccessEntry};

use serde::{Deserialize, Serialize};

/// Numeric taxonomy identifier carried by replies and errors.
///
/// Success codes live below 1000, built-in error codes in 1000..2000.
/// Business layers are expected to use values from 2000 upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Code(u32);

impl Code {
    pub const SUCCESS: Code = Code(10);
    pub const CREATED: Code = Code(11);
    pub const ACCEPTED: Code = Code(12);
    pub const UPDATED: Code = Code(13);
    pub const DELETED: Code = Code(14);

    pub const INTERNAL_SERVER_ERROR: Code = Code(1000);
    pub const CONTEXT_DEADLINE_EXCEEDED: Code = Code(1001);
    pub const CONTEXT_CANCELED: Code = Code(1002);
    pub const SERVICE_UNAVAILABLE: Code = Code(1003);
    pub const NOT_IMPLEMENTED: Code = Code(1004);
    pub const MARSHAL_ERROR: Code = Code(1005);
    pub const BAD_REQUEST: Code = Code(1100);
    pub const VALIDATION_ERROR: Code = Code(1101);
    pub const UNAUTHORIZED: Code = Code(1102);
    pub const FORBIDDEN: Code = Code(1103);
    pub const NOT_FOUND: Code = Code(1104);
    pub const CONFLICT: Code = Code(1105);
    pub const TOO_MANY_REQUESTS: Code = Code(1106);
    pub const UNMARSHAL_ERROR: Code = Code(1107);
    pub const METHOD_NOT_ALLOWED: Code = Code(1108);

    /// Create a code from its raw value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Raw numeric value, as written to `metadata.error.code`.
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for Code {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Languages the catalog carries text for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    English,
    Indonesian,
}

impl Language {
    /// Map a primary language subtag to a supported language.
    fn from_primary_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "en" => Some(Language::English),
            // "in" is the deprecated ISO 639 tag still sent by older clients.
            "id" | "in" => Some(Language::Indonesian),
            _ => None,
        }
    }

    /// Resolve the preferred supported language from an `Accept-Language` value.
    ///
    /// Language ranges are ranked by q-value (ties keep header order).
    /// Unsupported, wildcard and malformed ranges are skipped. Falls back
    /// to English.
    pub fn from_accept_language(header: &str) -> Self {
        let mut best: Option<(f32, Language)> = None;

        for range in header.split(',') {
            let mut params = range.split(';');
            let tag = params.next().unwrap_or_default().trim();
            let primary = tag.split('-').next().unwrap_or_default();

            let Some(language) = Language::from_primary_tag(primary) else {
                continue;
            };

            let quality = params
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);

            if quality <= 0.0 {
                continue;
            }

            match best {
                Some((q, _)) if q >= quality => {}
                _ => best = Some((quality, language)),
            }
        }

        best.map(|(_, language)| language).unwrap_or_default()
    }
}
