//! Typed records produced from raw RECORD-extension data.

use serde::{Deserialize, Serialize};

// ── Wire constants ────────────────────────────────────────────────────────────

/// Size of one core protocol event (`xEvent`) in bytes.
pub const EVENT_SIZE: usize = 32;

/// Bit of the type byte set on events produced by `SendEvent`.
pub const SEND_EVENT_BIT: u8 = 0x80;

/// Core event type codes this layer decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventKind {
    KeyPress = 2,
    KeyRelease = 3,
    ButtonPress = 4,
    ButtonRelease = 5,
    MotionNotify = 6,
}

impl TryFrom<u8> for EventKind {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(EventKind::KeyPress),
            3 => Ok(EventKind::KeyRelease),
            4 => Ok(EventKind::ButtonPress),
            5 => Ok(EventKind::ButtonRelease),
            6 => Ok(EventKind::MotionNotify),
            _ => Err(()),
        }
    }
}

/// Origin of an intercepted record (`XRecordInterceptData::category`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordCategory {
    FromServer,
    FromClient,
    ClientStarted,
    ClientDied,
    StartOfData,
    EndOfData,
    Other(u8),
}

impl From<u8> for RecordCategory {
    fn from(value: u8) -> Self {
        match value {
            0 => RecordCategory::FromServer,
            1 => RecordCategory::FromClient,
            2 => RecordCategory::ClientStarted,
            3 => RecordCategory::ClientDied,
            4 => RecordCategory::StartOfData,
            5 => RecordCategory::EndOfData,
            other => RecordCategory::Other(other),
        }
    }
}

/// Where event timestamps come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampSource {
    /// The X server's millisecond clock.
    #[default]
    Server,
    /// Wall-clock milliseconds since the Unix epoch.
    Epoch,
}

// ── Records ───────────────────────────────────────────────────────────────────

/// A raw intercepted record as delivered by the RECORD extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    pub category: RecordCategory,
    pub server_time: u32,
    /// The core event bytes; at least [`EVENT_SIZE`] for device events.
    pub data: &'a [u8],
}

/// Fields shared by key, button and motion events (`keyButtonPointer`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointerFields {
    pub root: u32,
    pub window: u32,
    pub subwindow: u32,
    pub time: u32,
    pub x: i32,
    pub y: i32,
    pub x_root: i32,
    pub y_root: i32,
    pub state: u16,
    pub same_screen: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyEvent {
    pub pointer: PointerFields,
    pub keycode: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ButtonEvent {
    pub pointer: PointerFields,
    pub button: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MotionEvent {
    pub pointer: PointerFields,
    pub is_hint: u8,
}

/// The decoded event payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventBody {
    KeyPress(KeyEvent),
    KeyRelease(KeyEvent),
    ButtonPress(ButtonEvent),
    ButtonRelease(ButtonEvent),
    Motion(MotionEvent),
    /// Not server-originated, not a device event, or too short to decode.
    Unpopulated,
}

/// A decoded record with its timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarshalledEvent {
    pub timestamp: u64,
    pub send_event: bool,
    pub body: EventBody,
}

impl MarshalledEvent {
    /// The key event, if this is a key press or release.
    pub fn key(&self) -> Option<&KeyEvent> {
        match &self.body {
            EventBody::KeyPress(key) | EventBody::KeyRelease(key) => Some(key),
            _ => None,
        }
    }
}
