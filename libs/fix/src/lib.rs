//! FIX 4.2 tag-value codec
//!
//! The subset of the FIX session protocol spoken by the exchange: SOH
//! delimited `tag=value` fields framed by a BeginString/BodyLength header
//! and a CheckSum trailer. Tag order is not significant for decoding;
//! unknown tags are carried through and ignored by callers.
//!
//! # Modules
//! - `tags`: numeric tag constants
//! - `message`: frame writer, parsed message, decode errors

pub mod message;
pub mod tags;

pub use message::{msg_type, DecodeError, FixMessage, FixWriter, FIX_4_2};
