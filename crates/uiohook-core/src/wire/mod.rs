//! RECORD-extension event types and the decoder that produces them.

pub mod codec;
pub mod messages;

pub use codec::{decode_core_event, marshal_at, EventMarshaller, WireError};
pub use messages::*;
