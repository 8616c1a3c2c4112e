//! Payload input sources.

use std::io::Read;
use std::path::PathBuf;

use envelope_core::InspectError;

/// Where a payload is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Given directly on the command line.
    Literal(String),
    /// Contents of a file.
    File(PathBuf),
    /// Standard input.
    Stdin,
}

impl InputSource {
    /// Read the payload, using `stdin` for [`InputSource::Stdin`].
    ///
    /// Surrounding whitespace, including a trailing newline, is removed.
    /// File and stdin contents may be line-wrapped, so all ASCII whitespace
    /// is stripped from them.
    ///
    /// # Errors
    /// Returns [`InspectError::Io`] if the file or stdin cannot be read.
    pub fn read_payload<R: Read>(&self, mut stdin: R) -> Result<String, InspectError> {
        let payload = match self {
            Self::Literal(text) => text.trim().to_owned(),
            Self::File(path) => strip_whitespace(&std::fs::read_to_string(path)?),
            Self::Stdin => {
                let mut buf = String::new();
                stdin.read_to_string(&mut buf)?;
                strip_whitespace(&buf)
            }
        };
        tracing::debug!(source = ?self, chars = payload.len(), "read payload");
        Ok(payload)
    }
}

fn strip_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_ascii_whitespace()).collect()
}
