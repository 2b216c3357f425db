use thiserror::Error;

/// Error taxonomy of the sync adapter.
///
/// Network- and status-derived failures are classified but never retried or
/// transformed; each failure surfaces exactly once through the returned
/// `Result`. Individual failed property groups inside an otherwise successful
/// multi-status response are not errors at all, the affected properties are
/// simply absent from the parsed record.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No URL could be resolved for the resource. Raised synchronously,
    /// before anything reaches the transport.
    #[error("a url could not be resolved for the resource")]
    InvalidResource,

    /// Non-success status from the transport, surfaced verbatim. A failed
    /// first leg of a composite operation is reported through this variant
    /// too; the second leg is never attempted.
    #[error("request failed with status {status}")]
    Transport { status: u16, body: String },

    /// Connection-level failure from the built-in reqwest transport.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed XML in a multi-status payload.
    #[error("xml parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Structurally valid XML that is not a usable multi-status document,
    /// e.g. a single-resource read whose envelope contains no entries.
    #[error("unexpected multi-status payload: {0}")]
    Multistatus(String),

    /// Invalid adapter configuration, raised at construction time.
    #[error("invalid sync configuration: {0}")]
    Config(String),
}
