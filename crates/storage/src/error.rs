/// All errors that can be returned by a RecordStore implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store refused the credential (expired or missing session).
    #[error("unauthorized: the session credential was rejected")]
    Unauthorized,

    /// No record with the given identity exists in the store.
    #[error("record not found: {id}")]
    NotFound { id: String },

    /// The store answered with a non-success status.
    #[error("store rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The request never reached the store or the connection failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The store answered but the body could not be decoded.
    #[error("failed to decode store response: {0}")]
    Decode(String),

    /// A backend-specific error (task join failure, injected fault, etc.).
    #[error("store backend error: {0}")]
    Backend(String),
}
