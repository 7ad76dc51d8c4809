use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Format catalog errors
    #[error("Invalid bit range [{start}, {end}): {reason}")]
    InvalidBitRange {
        start: usize,
        end: usize,
        reason: String,
    },

    #[error("Invalid format '{name}': {reason}")]
    InvalidFormat { name: String, reason: String },

    #[error("Value {value} does not fit in {width}-bit {field} field")]
    ValueOutOfRange {
        field: &'static str,
        value: u64,
        width: usize,
    },

    // Bit string parsing
    #[error("Invalid bit string: unexpected '{found}' at position {position}")]
    InvalidBitString { found: char, position: usize },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
