// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy for codec and schema-resolution failures.

use std::fmt;
use std::io;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by reading, writing, or descriptor resolution.
///
/// Every failure is returned synchronously from the failing call; nothing is
/// retried and partial writes already flushed to the stream are not rolled
/// back.
#[derive(Debug)]
pub enum Error {
    /// The stream ended before the requested byte count was available.
    EndOfStream,
    /// An underlying I/O fault other than end-of-stream.
    Io(io::Error),
    /// A negative, ambiguous, or mismatched element/character count.
    InvalidLength { field: String, reason: String },
    /// A length policy names a sibling field that does not exist.
    MissingAnchor { field: String, anchor: String },
    /// An anchor field is declared after the field that depends on it.
    AnchorOrdering { field: String, anchor: String },
    /// A field declares both a fixed length and an anchor length.
    ConflictingLengthConfig { field: String },
    /// A field or value kind the dispatcher does not recognize.
    UnsupportedType { field: String, detail: String },
    /// A value required for writing is absent from the record.
    MissingValue { field: String },
    /// A record value does not match its descriptor's declared kind.
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },
    /// Explicit layout requires every field to declare a byte offset.
    MissingOffset { field: String },
    /// A byte offset was declared on a field of a sequential-layout struct.
    UnexpectedOffset { field: String },
    /// Structurally invalid bytes for the requested value shape.
    InvalidData { reason: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfStream => write!(f, "unexpected end of stream"),
            Self::Io(e) => write!(f, "i/o error: {}", e),
            Self::InvalidLength { field, reason } => {
                write!(f, "invalid length for field '{}': {}", field, reason)
            }
            Self::MissingAnchor { field, anchor } => {
                write!(f, "field '{}' anchors to unknown field '{}'", field, anchor)
            }
            Self::AnchorOrdering { field, anchor } => {
                write!(
                    f,
                    "field '{}' anchors to '{}', which is declared after it",
                    field, anchor
                )
            }
            Self::ConflictingLengthConfig { field } => {
                write!(
                    f,
                    "field '{}' declares both a fixed length and an anchor length",
                    field
                )
            }
            Self::UnsupportedType { field, detail } => {
                write!(f, "unsupported type for field '{}': {}", field, detail)
            }
            Self::MissingValue { field } => {
                write!(f, "no value present for field '{}'", field)
            }
            Self::TypeMismatch {
                field,
                expected,
                found,
            } => {
                write!(
                    f,
                    "type mismatch for field '{}': expected {}, found {}",
                    field, expected, found
                )
            }
            Self::MissingOffset { field } => {
                write!(
                    f,
                    "explicit layout requires a byte offset for field '{}'",
                    field
                )
            }
            Self::UnexpectedOffset { field } => {
                write!(
                    f,
                    "field '{}' declares a byte offset but its struct uses sequential layout",
                    field
                )
            }
            Self::InvalidData { reason } => write!(f, "invalid data: {}", reason),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Self::EndOfStream
        } else {
            Self::Io(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_eof_maps_to_end_of_stream() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        match Error::from(io_err) {
            Error::EndOfStream => {}
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_other_io_errors_are_preserved() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        match Error::from(io_err) {
            Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_display_names_the_field() {
        let err = Error::ConflictingLengthConfig {
            field: "items".into(),
        };
        assert!(err.to_string().contains("items"));
    }
}
