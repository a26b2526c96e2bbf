//! # Entsync Serde
//! Byte-level serialization used by the entsync wire protocol.
//! Numeric ids are packed as base-128 varints, strings and blobs are
//! length-prefixed.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod error;
mod reader;
mod serde;
mod writer;

pub use error::SerdeErr;
pub use reader::ByteReader;
pub use serde::Serde;
pub use writer::ByteWriter;

/// Hard ceiling for any length-prefixed string or blob on the wire.
pub const MAX_FIELD_BYTES: usize = u16::MAX as usize;
