//! Error types for compiling and rendering templates
//!
//! Unterminated markers are not errors, they render as text. Everything else
//! surfaces to the caller unchanged: invalid templates and malformed code from
//! `compile`, evaluation failures and include I/O from `render`.

use std::path::PathBuf;

use thiserror::Error;

/// Returns the last 32 characters of a string for error context
pub(crate) fn rcap(src: &str) -> &str {
    static CAP_AT: usize = 32;

    match src.char_indices().rev().nth(CAP_AT - 1) {
        Some((i, _)) if i > 0 => &src[i..],
        _ => src,
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("template must be valid UTF-8 text")]
    InvalidTemplate(#[from] std::str::Utf8Error),

    #[error("{message} near \"{near}\"")]
    Syntax { message: String, near: String },

    #[error("render failed: {0}")]
    Runtime(String),

    #[error("unable to read template {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Creates a syntax error with the source preceding the failure as context
    pub(crate) fn syntax(message: impl Into<String>, preceding: &str) -> Self {
        Self::Syntax {
            message: message.into(),
            near: rcap(preceding).to_string(),
        }
    }

    pub(crate) fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }
}

/// Result type for compiling and rendering
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rcap_keeps_tail() {
        assert_eq!(rcap("short"), "short");
        let long = "x".repeat(40) + "the end";
        assert_eq!(rcap(&long).len(), 32);
        assert!(rcap(&long).ends_with("the end"));
        let wide = "é".repeat(40);
        assert_eq!(rcap(&wide).chars().count(), 32);
    }

    #[test]
    fn messages() {
        let err = Error::syntax("unexpected token", "if (x ");
        assert_eq!(err.to_string(), "unexpected token near \"if (x \"");
        let err = Error::Io {
            path: PathBuf::from("partials/missing.ztpl"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(
            err.to_string(),
            "unable to read template partials/missing.ztpl: not found"
        );
    }
}
