/// Errors produced by the `envelope-core` crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum InspectError {
    /// The payload is not valid URL-safe base64.
    #[error("invalid base64 payload: {reason}")]
    Format { reason: String },

    /// The decoded bytes are not a well-formed CBOR item.
    #[error("{}", cbor_message(.message, .offset))]
    CborParse {
        /// Message reported by the CBOR decoder.
        message: String,
        /// Byte offset the decoder stopped at, when it reports one.
        offset: Option<usize>,
    },

    /// The payload could not be read from its source.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl InspectError {
    pub(crate) fn format(reason: impl Into<String>) -> Self {
        Self::Format { reason: reason.into() }
    }
}

fn cbor_message(message: &str, offset: &Option<usize>) -> String {
    match offset {
        Some(at) => format!("CBOR parse error at offset {at}: {message}"),
        None => format!("CBOR parse error: {message}"),
    }
}
