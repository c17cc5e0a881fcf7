//! Message catalog: taxonomy code → HTTP status + localized text.
//!
//! # Responsibilities
//! - Hold the built-in success and error tables
//! - Accept business entries at startup
//! - Compile errors and success codes for a resolved language
//!
//! # Design Decisions
//! - Compilation never fails; unknown codes degrade to a fixed fallback
//! - Lookups are plain `HashMap` reads on an immutable catalog, so the
//!   catalog can be shared across requests behind an `Arc` without locking

use std::collections::HashMap;

use axum::http::StatusCode;

use super::{Code, Language};
use crate::error::{AppError, CompiledError};

/// Text available in every supported language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Localized {
    pub en: &'static str,
    pub id: &'static str,
}

impl Localized {
    pub const fn new(en: &'static str, id: &'static str) -> Self {
        Self { en, id }
    }

    /// Pick the text for a language.
    pub fn get(&self, language: Language) -> &'static str {
        match language {
            Language::English => self.en,
            Language::Indonesian => self.id,
        }
    }
}

/// Catalog entry for an error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorEntry {
    pub status: StatusCode,
    pub title: Localized,
    pub body: Localized,
}

/// Catalog entry for a success code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuccessEntry {
    pub status: StatusCode,
    pub title: Localized,
    pub body: Localized,
}

/// Success code compiled for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompiledSuccess {
    pub http_status: StatusCode,
    pub title: &'static str,
    pub body: &'static str,
    pub code: Code,
}

const FALLBACK_ERROR: ErrorEntry = ErrorEntry {
    status: StatusCode::INTERNAL_SERVER_ERROR,
    title: Localized::new("Internal Server Error", "Kesalahan Server Internal"),
    body: Localized::new(
        "Something went wrong on our side. Please try again later.",
        "Terjadi kesalahan pada sistem kami. Silakan coba beberapa saat lagi.",
    ),
};

const FALLBACK_SUCCESS: SuccessEntry = SuccessEntry {
    status: StatusCode::OK,
    title: Localized::new("Success", "Sukses"),
    body: Localized::new("Request successful", "Permintaan berhasil"),
};

const BUILTIN_SUCCESS: &[(Code, SuccessEntry)] = &[
    (Code::SUCCESS, FALLBACK_SUCCESS),
    (
        Code::CREATED,
        SuccessEntry {
            status: StatusCode::CREATED,
            title: Localized::new("Created", "Berhasil Dibuat"),
            body: Localized::new("Resource created successfully", "Data berhasil dibuat"),
        },
    ),
    (
        Code::ACCEPTED,
        SuccessEntry {
            status: StatusCode::ACCEPTED,
            title: Localized::new("Accepted", "Diterima"),
            body: Localized::new(
                "Request accepted for processing",
                "Permintaan diterima untuk diproses",
            ),
        },
    ),
    (
        Code::UPDATED,
        SuccessEntry {
            status: StatusCode::OK,
            title: Localized::new("Updated", "Berhasil Diperbarui"),
            body: Localized::new("Resource updated successfully", "Data berhasil diperbarui"),
        },
    ),
    (
        Code::DELETED,
        SuccessEntry {
            status: StatusCode::OK,
            title: Localized::new("Deleted", "Berhasil Dihapus"),
            body: Localized::new("Resource deleted successfully", "Data berhasil dihapus"),
        },
    ),
];

const BUILTIN_ERRORS: &[(Code, ErrorEntry)] = &[
    (Code::INTERNAL_SERVER_ERROR, FALLBACK_ERROR),
    (
        Code::CONTEXT_DEADLINE_EXCEEDED,
        ErrorEntry {
            status: StatusCode::REQUEST_TIMEOUT,
            title: Localized::new("Request Timeout", "Waktu Permintaan Habis"),
            body: Localized::new(
                "The request took too long to process. Please try again.",
                "Permintaan terlalu lama diproses. Silakan coba lagi.",
            ),
        },
    ),
    (
        Code::CONTEXT_CANCELED,
        ErrorEntry {
            status: StatusCode::REQUEST_TIMEOUT,
            title: Localized::new("Request Cancelled", "Permintaan Dibatalkan"),
            body: Localized::new(
                "The request was cancelled before it completed.",
                "Permintaan dibatalkan sebelum selesai.",
            ),
        },
    ),
    (
        Code::SERVICE_UNAVAILABLE,
        ErrorEntry {
            status: StatusCode::SERVICE_UNAVAILABLE,
            title: Localized::new("Service Unavailable", "Layanan Tidak Tersedia"),
            body: Localized::new(
                "The service is temporarily unavailable. Please try again later.",
                "Layanan sedang tidak tersedia. Silakan coba beberapa saat lagi.",
            ),
        },
    ),
    (
        Code::NOT_IMPLEMENTED,
        ErrorEntry {
            status: StatusCode::NOT_IMPLEMENTED,
            title: Localized::new("Not Implemented", "Belum Tersedia"),
            body: Localized::new(
                "This feature is not available yet.",
                "Fitur ini belum tersedia.",
            ),
        },
    ),
    (
        Code::MARSHAL_ERROR,
        ErrorEntry {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            title: Localized::new("Internal Server Error", "Kesalahan Server Internal"),
            body: Localized::new(
                "We could not prepare the response. Please try again later.",
                "Kami tidak dapat menyiapkan respons. Silakan coba beberapa saat lagi.",
            ),
        },
    ),
    (
        Code::BAD_REQUEST,
        ErrorEntry {
            status: StatusCode::BAD_REQUEST,
            title: Localized::new("Bad Request", "Permintaan Tidak Valid"),
            body: Localized::new(
                "The request could not be understood.",
                "Permintaan tidak dapat dipahami.",
            ),
        },
    ),
    (
        Code::VALIDATION_ERROR,
        ErrorEntry {
            status: StatusCode::BAD_REQUEST,
            title: Localized::new("Invalid Input", "Input Tidak Valid"),
            body: Localized::new(
                "Some of the submitted data is invalid. Please check and try again.",
                "Sebagian data yang dikirim tidak valid. Silakan periksa dan coba lagi.",
            ),
        },
    ),
    (
        Code::UNAUTHORIZED,
        ErrorEntry {
            status: StatusCode::UNAUTHORIZED,
            title: Localized::new("Unauthorized", "Tidak Terotorisasi"),
            body: Localized::new(
                "Valid credentials are required to access this resource.",
                "Kredensial yang valid diperlukan untuk mengakses sumber ini.",
            ),
        },
    ),
    (
        Code::FORBIDDEN,
        ErrorEntry {
            status: StatusCode::FORBIDDEN,
            title: Localized::new("Forbidden", "Akses Ditolak"),
            body: Localized::new(
                "You do not have permission to access this resource.",
                "Anda tidak memiliki izin untuk mengakses sumber ini.",
            ),
        },
    ),
    (
        Code::NOT_FOUND,
        ErrorEntry {
            status: StatusCode::NOT_FOUND,
            title: Localized::new("Not Found", "Tidak Ditemukan"),
            body: Localized::new(
                "The requested resource could not be found.",
                "Sumber yang diminta tidak ditemukan.",
            ),
        },
    ),
    (
        Code::CONFLICT,
        ErrorEntry {
            status: StatusCode::CONFLICT,
            title: Localized::new("Conflict", "Konflik Data"),
            body: Localized::new(
                "The request conflicts with the current state of the resource.",
                "Permintaan bertentangan dengan kondisi data saat ini.",
            ),
        },
    ),
    (
        Code::TOO_MANY_REQUESTS,
        ErrorEntry {
            status: StatusCode::TOO_MANY_REQUESTS,
            title: Localized::new("Too Many Requests", "Terlalu Banyak Permintaan"),
            body: Localized::new(
                "Too many requests. Please slow down and try again.",
                "Terlalu banyak permintaan. Silakan tunggu dan coba lagi.",
            ),
        },
    ),
    (
        Code::METHOD_NOT_ALLOWED,
        ErrorEntry {
            status: StatusCode::METHOD_NOT_ALLOWED,
            title: Localized::new("Method Not Allowed", "Metode Tidak Diizinkan"),
            body: Localized::new(
                "This resource does not support the requested method.",
                "Sumber ini tidak mendukung metode yang diminta.",
            ),
        },
    ),
    (
        Code::UNMARSHAL_ERROR,
        ErrorEntry {
            status: StatusCode::BAD_REQUEST,
            title: Localized::new("Bad Request", "Permintaan Tidak Valid"),
            body: Localized::new(
                "The request body could not be read.",
                "Isi permintaan tidak dapat dibaca.",
            ),
        },
    ),
];

/// Immutable lookup tables for success and error codes.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    errors: HashMap<Code, ErrorEntry>,
    successes: HashMap<Code, SuccessEntry>,
}

impl MessageCatalog {
    /// Catalog with the built-in entries only.
    pub fn builtin() -> Self {
        Self {
            errors: BUILTIN_ERRORS.iter().copied().collect(),
            successes: BUILTIN_SUCCESS.iter().copied().collect(),
        }
    }

    /// Register (or override) an error entry.
    pub fn with_error(mut self, code: Code, entry: ErrorEntry) -> Self {
        self.errors.insert(code, entry);
        self
    }

    /// Register (or override) a success entry.
    pub fn with_success(mut self, code: Code, entry: SuccessEntry) -> Self {
        self.successes.insert(code, entry);
        self
    }

    /// Compile an error for the given language.
    ///
    /// Errors without a code, or with a code the catalog does not know,
    /// compile to the internal-error entry.
    pub fn compile(&self, error: &AppError, language: Language) -> CompiledError {
        let (code, entry) = match error.code().and_then(|c| self.errors.get(&c).map(|e| (c, e))) {
            Some((code, entry)) => (code, entry),
            None => (Code::INTERNAL_SERVER_ERROR, &FALLBACK_ERROR),
        };

        CompiledError {
            http_status: entry.status,
            title: entry.title.get(language),
            body: entry.body.get(language),
            code,
        }
    }

    /// Compile a success code for the given language.
    pub fn compile_success(&self, code: Code, language: Language) -> CompiledSuccess {
        let (code, entry) = match self.successes.get(&code) {
            Some(entry) => (code, entry),
            None => (Code::SUCCESS, &FALLBACK_SUCCESS),
        };

        CompiledSuccess {
            http_status: entry.status,
            title: entry.title.get(language),
            body: entry.body.get(language),
            code,
        }
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_error_entries() {
        let catalog = MessageCatalog::builtin();
        let err = AppError::with_code(Code::CONTEXT_DEADLINE_EXCEEDED, "Context Deadline Exceeded");

        let compiled = catalog.compile(&err, Language::English);
        assert_eq!(compiled.http_status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(compiled.code, Code::CONTEXT_DEADLINE_EXCEEDED);
        assert_eq!(compiled.title, "Request Timeout");

        let compiled = catalog.compile(&err, Language::Indonesian);
        assert_eq!(compiled.title, "Waktu Permintaan Habis");
    }

    #[test]
    fn test_unknown_code_falls_back() {
        let catalog = MessageCatalog::builtin();
        let err = AppError::with_code(Code::new(4242), "exotic failure");

        let compiled = catalog.compile(&err, Language::English);
        assert_eq!(compiled.http_status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(compiled.code, Code::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_uncoded_error_falls_back() {
        let catalog = MessageCatalog::builtin();
        let compiled = catalog.compile(&AppError::new("boom"), Language::Indonesian);
        assert_eq!(compiled.http_status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(compiled.title, "Kesalahan Server Internal");
    }

    #[test]
    fn test_compile_is_deterministic() {
        let catalog = MessageCatalog::builtin();
        let codes = BUILTIN_ERRORS.iter().map(|(c, _)| *c).chain([Code::new(9999)]);

        for code in codes {
            for language in [Language::English, Language::Indonesian] {
                let err = AppError::with_code(code, "x");
                let first = catalog.compile(&err, language);
                for _ in 0..3 {
                    assert_eq!(catalog.compile(&err, language), first);
                }
            }
        }
    }

    #[test]
    fn test_business_entries() {
        const INSUFFICIENT_BALANCE: Code = Code::new(2001);
        let catalog = MessageCatalog::builtin().with_error(
            INSUFFICIENT_BALANCE,
            ErrorEntry {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                title: Localized::new("Insufficient Balance", "Saldo Tidak Cukup"),
                body: Localized::new("Top up and retry.", "Isi saldo lalu coba lagi."),
            },
        );

        let compiled = catalog.compile(
            &AppError::with_code(INSUFFICIENT_BALANCE, "balance 10 < 25"),
            Language::Indonesian,
        );
        assert_eq!(compiled.http_status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(compiled.code, INSUFFICIENT_BALANCE);
        assert_eq!(compiled.title, "Saldo Tidak Cukup");
    }

    #[test]
    fn test_success_entries() {
        let catalog = MessageCatalog::builtin();
        let created = catalog.compile_success(Code::CREATED, Language::English);
        assert_eq!(created.http_status, StatusCode::CREATED);

        let unknown = catalog.compile_success(Code::new(77), Language::English);
        assert_eq!(unknown.http_status, StatusCode::OK);
        assert_eq!(unknown.code, Code::SUCCESS);
    }
}
