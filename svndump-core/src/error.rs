//! Error types for the dump translator.
//!
//! Every variant here is a *fatal* condition (spec §7): the translator
//! aborts the whole read. Non-fatal conditions (§7's "warning" class) never
//! materialize as a `ParseError` — they are logged via `tracing::warn!` and
//! execution continues from the caller's point of view.

use thiserror::Error;

/// Fatal errors that abort translation of the whole dump stream.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{message}")]
    Format { message: String },

    #[error("unsupported dump format version {0} (this translator supports up to 3)")]
    UnsupportedVersion(u32),

    #[error("node at {path:?} uses Text-delta, which is not supported")]
    TextDelta { path: String },

    #[error("node sets its type twice in one property block (svn:executable and svn:special both set)")]
    TypeSetTwice,

    #[error("node-action is Unknown at commit time for path {path:?}")]
    UnresolvedAction { path: String },

    #[error("delete action on {path:?} carries text, properties, or a copyfrom source")]
    DeleteWithBody { path: String },

    #[error("change action on the root path requires type Dir")]
    RootChangeNotDir,

    #[error("path {path:?} mode conflict: tree has {expected}, node claims {found}")]
    ModeConflict {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("path exceeds the maximum depth of {max} components: {path:?}")]
    PathTooDeep { path: String, max: usize },

    #[error("add action on {path:?} requires a text body unless its type is Dir")]
    AddRequiresText { path: String },

    #[error("node at {path:?} has a text body but its type is Dir")]
    TextOnDirectory { path: String },
}

impl ParseError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        ParseError::Format {
            message: message.into(),
        }
    }
}
