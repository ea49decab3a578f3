use std::path::PathBuf;

use thiserror::Error;

/// Shape errors raised while loading a result tree. Loading is all-or-nothing.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("malformed node at {path}: {reason}")]
    MalformedNode { path: String, reason: String },

    #[error("unknown node type at {path}")]
    UnknownVariant { path: String },

    #[error("invalid report JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("failed to read report {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ReportError::MalformedNode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Unknown variants are a kind of malformed node.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ReportError::MalformedNode { .. } | ReportError::UnknownVariant { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_variant_counts_as_malformed() {
        let err = ReportError::UnknownVariant {
            path: "testClasses[0]".into(),
        };
        assert!(err.is_malformed());
        assert_eq!(err.to_string(), "unknown node type at testClasses[0]");
    }

    #[test]
    fn io_is_not_malformed() {
        let err = ReportError::Io {
            path: PathBuf::from("/nope.json"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(!err.is_malformed());
    }
}
