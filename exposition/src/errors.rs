use thiserror::Error;

/// The error types for exposition encoding.
#[derive(Debug, Error)]
pub enum Error {
    /// The metric family declares a type the encoder cannot express.
    #[error("Unsupported metric type: {0}")]
    UnsupportedMetricType(String),
    /// A histogram bucket sample lacks a numeric `le` label.
    #[error("Invalid bucket bound {bound:?} in metric {metric}")]
    InvalidBucketBound {
        /// Name of the offending sample.
        metric: String,
        /// The raw `le` value, empty when the label is missing.
        bound: String,
    },
    /// Other errors.
    #[error("Error: {0}")]
    Msg(String),
    /// An error containing a [`std::io::Error`].
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
    /// An error containing a [`prost::EncodeError`].
    #[cfg(feature = "protobuf")]
    #[error("Protobuf error: {0}")]
    Protobuf(#[from] prost::EncodeError),
    /// An error containing a [`prost::DecodeError`].
    #[cfg(feature = "protobuf")]
    #[error("Protobuf decode error: {0}")]
    ProtobufDecode(#[from] prost::DecodeError),
}

/// A specialized Result type for exposition encoding.
pub type Result<T> = std::result::Result<T, Error>;
