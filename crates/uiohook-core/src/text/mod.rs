//! Text produced by key presses: UTF-16 encoding and character classes.

pub mod class;
pub mod encode;

pub use class::{classify_char, classify_units, CharClass};
pub use encode::{encode_utf16, latin1_to_utf16, utf8_to_utf16, EncodeError};
