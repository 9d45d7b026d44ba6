//! Diagnostics collected while converting an export
//!
//! Problems that should not stop a batch (a card missing its source, a post
//! whose mobiledoc cannot be rendered) are recorded here instead of being
//! returned as errors. Every record is also emitted through `tracing`.

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// An image card without a `src`
    ImageMissingSource,
    /// An embed card without `html`
    EmbedMissingHtml,
    /// The mobiledoc walk failed; the post body was left empty
    RenderFailure,
    /// A date field could not be parsed; the timestamp was left unset
    InvalidTimestamp,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ImageMissingSource => "image card missing source",
            Self::EmbedMissingHtml => "embed card missing html",
            Self::RenderFailure => "render failure",
            Self::InvalidTimestamp => "invalid timestamp",
        };
        f.write_str(name)
    }
}

/// A single diagnostic record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Raw id of the post being converted, when known
    pub post_id: Option<String>,
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Append-only diagnostics sink, safe to share between threads
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it
    pub fn record(&self, post_id: Option<&str>, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            DiagnosticKind::RenderFailure => {
                tracing::error!("post {}: {}: {}", post_id.unwrap_or("-"), kind, message)
            }
            _ => tracing::warn!("post {}: {}: {}", post_id.unwrap_or("-"), kind, message),
        }

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.push(Diagnostic {
            post_id: post_id.map(str::to_string),
            kind,
            message,
        });
    }

    /// Snapshot of everything recorded so far, in insertion order
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of records of the given kind
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|d| d.kind == kind)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-post context handed to card renderers
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub post_id: Option<&'a str>,
    pub diagnostics: &'a Diagnostics,
}

impl<'a> RenderContext<'a> {
    pub fn new(post_id: Option<&'a str>, diagnostics: &'a Diagnostics) -> Self {
        Self {
            post_id,
            diagnostics,
        }
    }

    pub fn report(&self, kind: DiagnosticKind, message: impl Into<String>) {
        self.diagnostics.record(self.post_id, kind, message);
    }
}
