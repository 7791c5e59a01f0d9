use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    NotNumeric { field: &'static str, input: String },
    InvalidReceiverNumber { input: String },
    UnknownCompressionMethod { id: u8 },
    UnknownProtocol { input: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::NotNumeric { field, input } => {
                write!(f, "{field} must be numeric: {input:?}")
            }
            Self::InvalidReceiverNumber { input } => {
                write!(f, "invalid receiver number: {input:?}")
            }
            Self::UnknownCompressionMethod { id } => {
                write!(f, "unknown compression method id: {id} (expected 0..=3)")
            }
            Self::UnknownProtocol { input } => {
                write!(f, "unknown protocol: {input:?} (expected HTTP or HTTPS)")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
