// Core error taxonomy shared by the decompression and patch-application
// components. Pack/file-level wrappers live next to their modules.

use thiserror::Error;

/// Errors surfaced by the two core operations.
///
/// Every failure is terminal for the call: no partial buffer is ever
/// returned alongside an error.
#[derive(Debug, Error)]
pub enum Error {
    /// An output buffer reservation could not be satisfied.
    #[error("failed to allocate {requested} bytes")]
    Allocation { requested: usize },

    /// The compressed stream is malformed or truncated, or the decoder
    /// itself failed (including its internal working memory, which
    /// reports no request size).
    #[error("decompression failed: {0}")]
    Decompression(String),

    /// The patch is structurally invalid, or incompatible with the
    /// supplied original in a way the format lets us detect.
    #[error("malformed patch: {0}")]
    PatchFormat(String),

    /// A grow-and-retry loop hit its configured output-size bound.
    #[error("output size limit of {limit} bytes exceeded")]
    ResourceExhausted { limit: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
