use thiserror::Error;

/// Errors that can occur while reading or writing wire data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// Ran out of bytes while decoding a value
    #[error("buffer underrun: needed {needed} more byte(s) at offset {offset}")]
    BufferUnderrun { needed: usize, offset: usize },

    /// A varint kept its continuation bit set for too many bytes
    #[error("packed integer longer than {max_bytes} bytes")]
    VarIntOverflow { max_bytes: usize },

    /// A length prefix exceeded the per-field ceiling
    #[error("length prefix {length} exceeds maximum of {max}")]
    LengthTooLarge { length: usize, max: usize },

    /// A decoded string was not valid UTF-8
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    /// A decoded discriminant had no matching variant
    #[error("unknown discriminant {value} for {type_name}")]
    UnknownDiscriminant { type_name: &'static str, value: u64 },
}
