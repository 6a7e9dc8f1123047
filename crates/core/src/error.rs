use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClasscopeError {
    #[error("Unable to find {what}, please specify it explicitly via the \"{property}\" property")]
    NotFound { what: String, property: &'static str },

    #[error("Timed out after {elapsed:?} waiting for lock {path}{}", holder_suffix(.holder))]
    LockTimeout {
        path: PathBuf,
        elapsed: Duration,
        holder: Option<String>,
    },

    #[error("Failed to unpack collection {archive}: {source}")]
    Extraction {
        archive: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ClasscopeError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Override property a user can set to get past this error, if any
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { property, .. } => Some(*property),
            _ => None,
        }
    }
}

fn holder_suffix(holder: &Option<String>) -> String {
    holder
        .as_deref()
        .map(|h| format!(" (held by {})", h))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, ClasscopeError>;
