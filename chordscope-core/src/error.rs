//! # Error Types
//!
//! Errors raised while talking to the analysis engine.
//!
//! - `DecodeError` - an inbound frame matched no known event shape. The frame
//!   is dropped and the stream continues; no state transition happens.
//! - `ConnectionError` - the transport could not be set up or is gone.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    /// The frame is not JSON at all.
    ///
    /// # Example
    /// ```
    /// # use chordscope_core::{decode, DecodeError};
    /// assert!(matches!(decode("{not json"), Err(DecodeError::Json(_))));
    /// ```
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The frame names a known event but its payload does not fit.
    #[error("malformed `{tag}` payload: {source}")]
    Payload {
        tag: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A tagged frame whose tag is not part of the protocol.
    #[error("unknown event tag `{0}`")]
    UnknownTag(String),

    /// Valid JSON with no recognizable structure.
    #[error("unrecognized frame shape: {0}")]
    UnrecognizedShape(String),

    /// A chord inference whose weight vector has the wrong length.
    #[error("chord inference carries {0} weights, expected 13")]
    WeightCount(usize),
}

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("invalid endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("failed to connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    #[error("failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("connection worker has stopped")]
    WorkerStopped,
}
