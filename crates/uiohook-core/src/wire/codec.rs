//! Decoder for core device events captured by the RECORD extension.
//!
//! Wire format of one `xEvent` (32 bytes, client byte order):
//! ```text
//! [type:1][detail:1][sequence:2][time:4][root:4][event:4][child:4]
//! [rootX:2][rootY:2][eventX:2][eventY:2][state:2][sameScreen:1][pad:1]
//! ```
//! Coordinates are signed 16-bit on the wire and widened to `i32`.

use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use super::messages::{
    ButtonEvent, EventBody, EventKind, KeyEvent, MarshalledEvent, MotionEvent, PointerFields,
    RawRecord, RecordCategory, TimestampSource, EVENT_SIZE, SEND_EVENT_BIT,
};

/// Errors raised while decoding a core event.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("not a device event: type {0}")]
    UnsupportedKind(u8),
}

/// Turns raw records into [`MarshalledEvent`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventMarshaller {
    source: TimestampSource,
}

impl EventMarshaller {
    pub fn new(source: TimestampSource) -> Self {
        Self { source }
    }

    pub fn timestamp_source(&self) -> TimestampSource {
        self.source
    }

    /// Decodes `record`, stamping it from the configured clock.
    ///
    /// Anything that is not a server-originated device event yields
    /// [`EventBody::Unpopulated`].
    pub fn marshal(&self, record: &RawRecord<'_>) -> MarshalledEvent {
        let timestamp = match self.source {
            TimestampSource::Server => u64::from(record.server_time),
            TimestampSource::Epoch => epoch_millis(),
        };
        marshal_at(record, timestamp)
    }
}

/// Decodes `record` with an explicit timestamp.
pub fn marshal_at(record: &RawRecord<'_>, timestamp: u64) -> MarshalledEvent {
    if record.category != RecordCategory::FromServer {
        return MarshalledEvent {
            timestamp,
            send_event: false,
            body: EventBody::Unpopulated,
        };
    }

    let send_event = record
        .data
        .first()
        .is_some_and(|&kind| kind & SEND_EVENT_BIT != 0);

    let body = match decode_core_event(record.data) {
        Ok(body) => body,
        Err(WireError::UnsupportedKind(kind)) => {
            tracing::trace!(kind, "ignoring non-device event");
            EventBody::Unpopulated
        }
        Err(err) => {
            tracing::warn!(error = %err, "malformed recorded event");
            EventBody::Unpopulated
        }
    };

    MarshalledEvent {
        timestamp,
        send_event,
        body,
    }
}

/// Decodes one 32-byte core event.
pub fn decode_core_event(data: &[u8]) -> Result<EventBody, WireError> {
    if data.len() < EVENT_SIZE {
        return Err(WireError::InsufficientData {
            needed: EVENT_SIZE,
            available: data.len(),
        });
    }

    let raw_kind = data[0] & !SEND_EVENT_BIT;
    let kind = EventKind::try_from(raw_kind).map_err(|_| WireError::UnsupportedKind(raw_kind))?;
    let detail = data[1];
    let pointer = decode_pointer_fields(data);

    Ok(match kind {
        EventKind::KeyPress => EventBody::KeyPress(KeyEvent {
            pointer,
            keycode: detail,
        }),
        EventKind::KeyRelease => EventBody::KeyRelease(KeyEvent {
            pointer,
            keycode: detail,
        }),
        EventKind::ButtonPress => EventBody::ButtonPress(ButtonEvent {
            pointer,
            button: detail,
        }),
        EventKind::ButtonRelease => EventBody::ButtonRelease(ButtonEvent {
            pointer,
            button: detail,
        }),
        EventKind::MotionNotify => EventBody::Motion(MotionEvent {
            pointer,
            is_hint: detail,
        }),
    })
}

fn decode_pointer_fields(p: &[u8]) -> PointerFields {
    PointerFields {
        time: read_u32(p, 4),
        root: read_u32(p, 8),
        window: read_u32(p, 12),
        subwindow: read_u32(p, 16),
        x_root: i32::from(read_i16(p, 20)),
        y_root: i32::from(read_i16(p, 22)),
        x: i32::from(read_i16(p, 24)),
        y: i32::from(read_i16(p, 26)),
        state: read_u16(p, 28),
        same_screen: p[30] != 0,
    }
}

// Callers have already checked `EVENT_SIZE`.

fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_ne_bytes([buf[offset], buf[offset + 1]])
}

fn read_i16(buf: &[u8], offset: usize) -> i16 {
    i16::from_ne_bytes([buf[offset], buf[offset + 1]])
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_ne_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a 32-byte core event in native byte order.
    fn core_event(
        kind: u8,
        detail: u8,
        time: u32,
        root_xy: (i16, i16),
        event_xy: (i16, i16),
        state: u16,
    ) -> [u8; 32] {
        let mut buf = [0u8; 32];
        buf[0] = kind;
        buf[1] = detail;
        buf[2..4].copy_from_slice(&7u16.to_ne_bytes());
        buf[4..8].copy_from_slice(&time.to_ne_bytes());
        buf[8..12].copy_from_slice(&0x0000_0100u32.to_ne_bytes());
        buf[12..16].copy_from_slice(&0x0040_0001u32.to_ne_bytes());
        buf[16..20].copy_from_slice(&0x0040_0002u32.to_ne_bytes());
        buf[20..22].copy_from_slice(&root_xy.0.to_ne_bytes());
        buf[22..24].copy_from_slice(&root_xy.1.to_ne_bytes());
        buf[24..26].copy_from_slice(&event_xy.0.to_ne_bytes());
        buf[26..28].copy_from_slice(&event_xy.1.to_ne_bytes());
        buf[28..30].copy_from_slice(&state.to_ne_bytes());
        buf[30] = 1;
        buf
    }

    fn from_server(data: &[u8]) -> RawRecord<'_> {
        RawRecord {
            category: RecordCategory::FromServer,
            server_time: 123_456,
            data,
        }
    }

    #[test]
    fn test_key_press_fields_are_copied() {
        // Arrange
        let data = core_event(2, 38, 99, (640, 480), (10, 20), 0x0001);

        // Act
        let event = EventMarshaller::new(TimestampSource::Server).marshal(&from_server(&data));

        // Assert
        assert_eq!(event.timestamp, 123_456);
        assert!(!event.send_event);
        let EventBody::KeyPress(key) = event.body else {
            panic!("expected KeyPress, got {:?}", event.body);
        };
        assert_eq!(key.keycode, 38);
        assert_eq!(key.pointer.time, 99);
        assert_eq!(key.pointer.root, 0x100);
        assert_eq!(key.pointer.window, 0x0040_0001);
        assert_eq!(key.pointer.subwindow, 0x0040_0002);
        assert_eq!((key.pointer.x_root, key.pointer.y_root), (640, 480));
        assert_eq!((key.pointer.x, key.pointer.y), (10, 20));
        assert_eq!(key.pointer.state, 0x0001);
        assert!(key.pointer.same_screen);
    }

    #[test]
    fn test_negative_coordinates_are_sign_extended() {
        let data = core_event(6, 0, 1, (-5, -1), (-32768, 32767), 0);
        let event = marshal_at(&from_server(&data), 0);
        let EventBody::Motion(motion) = event.body else {
            panic!("expected Motion");
        };
        assert_eq!((motion.pointer.x_root, motion.pointer.y_root), (-5, -1));
        assert_eq!((motion.pointer.x, motion.pointer.y), (-32768, 32767));
    }

    #[test]
    fn test_button_events_carry_button_number() {
        let press = marshal_at(&from_server(&core_event(4, 3, 1, (0, 0), (0, 0), 0)), 0);
        let release = marshal_at(&from_server(&core_event(5, 3, 2, (0, 0), (0, 0), 0x0400)), 0);
        assert!(matches!(press.body, EventBody::ButtonPress(ButtonEvent { button: 3, .. })));
        assert!(matches!(release.body, EventBody::ButtonRelease(ButtonEvent { button: 3, .. })));
    }

    #[test]
    fn test_send_event_bit_is_reported() {
        let data = core_event(3 | SEND_EVENT_BIT, 24, 1, (0, 0), (0, 0), 0);
        let event = marshal_at(&from_server(&data), 0);
        assert!(event.send_event);
        assert!(matches!(event.body, EventBody::KeyRelease(KeyEvent { keycode: 24, .. })));
    }

    #[test]
    fn test_client_records_are_unpopulated() {
        let data = core_event(2, 38, 1, (0, 0), (0, 0), 0);
        let record = RawRecord {
            category: RecordCategory::FromClient,
            server_time: 5,
            data: &data,
        };
        let event = marshal_at(&record, 5);
        assert_eq!(event.body, EventBody::Unpopulated);
        assert_eq!(event.timestamp, 5);
    }

    #[test]
    fn test_non_device_and_short_events_are_unpopulated() {
        let expose = core_event(12, 0, 1, (0, 0), (0, 0), 0);
        assert_eq!(marshal_at(&from_server(&expose), 0).body, EventBody::Unpopulated);
        assert_eq!(marshal_at(&from_server(&[2, 38, 0]), 0).body, EventBody::Unpopulated);
        assert_eq!(
            decode_core_event(&[2, 38, 0]),
            Err(WireError::InsufficientData {
                needed: 32,
                available: 3
            })
        );
    }

    #[test]
    fn test_epoch_timestamps_come_from_wall_clock() {
        let data = core_event(2, 38, 1, (0, 0), (0, 0), 0);
        let before = epoch_millis();
        let event = EventMarshaller::new(TimestampSource::Epoch).marshal(&from_server(&data));
        assert!(event.timestamp >= before);
        assert_ne!(event.timestamp, 123_456);
    }

    #[test]
    fn test_key_accessor() {
        let data = core_event(2, 38, 1, (0, 0), (0, 0), 0);
        let event = marshal_at(&from_server(&data), 0);
        assert_eq!(event.key().map(|k| k.keycode), Some(38));
        let motion = marshal_at(&from_server(&core_event(6, 0, 1, (0, 0), (0, 0), 0)), 0);
        assert_eq!(motion.key(), None);
    }
}
