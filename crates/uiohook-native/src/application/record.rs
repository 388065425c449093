//! Helper context for the X11 RECORD backend.
//!
//! The RECORD extension hands the hook raw 32-byte core events.
//! [`RecordHelper`] decodes them, maps X key codes to [`VirtualKeyCode`]s
//! through a table bound from the server's XKB key names, maps logical
//! pointer buttons back to physical ones, and looks up the text a key
//! press types.
//!
//! # Text lookup (for beginners)
//!
//! X11 offers two ways to turn a key event into text:
//!
//! - `Xutf8LookupString` goes through an *input method* (IM) and an *input
//!   context* (IC).  It understands the user's locale and produces UTF-8,
//!   but only for key presses.
//! - `XLookupString` needs neither and produces Latin-1.
//!
//! For a press, an IM is opened with each configured locale modifier in
//! turn (by default the user's own, then the built-in `@im=none`), and an
//! IC is created on it.  Both are owned values that close themselves when
//! dropped, so they are released on every return path.

use uiohook_core::domain::buttons::PointerButtonMapper;
use uiohook_core::domain::modifiers::InputStateProbe;
use uiohook_core::keymap::x11_xkb::{bind_key_names, KEY_NAME_LENGTH};
use uiohook_core::text::{classify_units, latin1_to_utf16, utf8_to_utf16, EncodeError};
use uiohook_core::wire::{EventBody, KeyEvent, RawRecord};
use uiohook_core::{
    CharClass, EventMarshaller, KeyCodeTable, MarshalledEvent, ModifierMask, ModifierState,
    PointerMappingSource, TimestampSource, VirtualKeyCode,
};

use super::helper::InputHelper;
use crate::infrastructure::platform::PlatformError;

/// Bytes a single lookup may produce: one UTF-8 character plus a NUL.
pub const LOOKUP_BUFFER_SIZE: usize = 5;

/// Locale modifiers tried, in order, when opening an input method.
pub const DEFAULT_LOCALE_MODIFIERS: [&str; 2] = ["", "@im=none"];

/// X server services the RECORD backend depends on.
pub trait XPlatform: InputStateProbe + PointerMappingSource {
    /// An open input method; closes itself on drop.
    type InputMethod;
    /// An input context; destroys itself on drop.  Must be dropped before
    /// the input method it was created on.
    type InputContext;

    /// `(keycode, name)` for every key code in `min_key_code..max_key_code`.
    fn key_names(&self) -> Result<Vec<(u32, [u8; KEY_NAME_LENGTH])>, PlatformError>;

    /// Asks the server for detectable auto-repeat.  Returns whether it is
    /// now supported.
    fn set_detectable_auto_repeat(&mut self, enabled: bool) -> bool;

    /// Sets `locale_modifiers` and opens an input method.
    fn open_input_method(&mut self, locale_modifiers: &str) -> Option<Self::InputMethod>;

    /// Creates a context on the root window with no pre-edit or status area.
    fn create_input_context(&mut self, method: &Self::InputMethod) -> Option<Self::InputContext>;

    /// `Xutf8LookupString`: returns the number of bytes written to `out`.
    fn lookup_utf8(
        &mut self,
        context: &Self::InputContext,
        key: &KeyEvent,
        out: &mut [u8],
    ) -> usize;

    /// `XLookupString`: returns the number of Latin-1 bytes written to `out`.
    fn lookup_latin1(&mut self, key: &KeyEvent, out: &mut [u8]) -> usize;
}

/// Knobs the RECORD helper takes from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOptions {
    pub timestamps: TimestampSource,
    pub locale_modifiers: Vec<String>,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            timestamps: TimestampSource::default(),
            locale_modifiers: DEFAULT_LOCALE_MODIFIERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

/// X11 helper context.
pub struct RecordHelper<X>
where
    X: XPlatform,
{
    platform: X,
    table: KeyCodeTable,
    modifiers: ModifierState,
    buttons: PointerButtonMapper,
    marshaller: EventMarshaller,
    locale_modifiers: Vec<String>,
}

impl<X> RecordHelper<X>
where
    X: XPlatform,
{
    /// Creates an unloaded helper.  Until [`load`](InputHelper::load) runs,
    /// no X key code maps to anything.
    pub fn new(platform: X, options: RecordOptions) -> Self {
        Self {
            platform,
            table: unbound_table(),
            modifiers: ModifierState::new(),
            buttons: PointerButtonMapper::new(),
            marshaller: EventMarshaller::new(options.timestamps),
            locale_modifiers: options.locale_modifiers,
        }
    }

    pub fn platform(&self) -> &X {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut X {
        &mut self.platform
    }

    /// Decodes one intercepted record.
    pub fn marshal_wire_event(&self, record: &RawRecord<'_>) -> MarshalledEvent {
        self.marshaller.marshal(record)
    }

    /// Maps a logical button number to the physical one, with 2 and 3 swapped.
    pub fn map_pointer_button(&mut self, logical: u32) -> u32 {
        self.buttons.map_button(&self.platform, logical)
    }

    pub fn enable_detectable_auto_repeat(&mut self) -> bool {
        let supported = self.platform.set_detectable_auto_repeat(true);
        if !supported {
            tracing::warn!("detectable auto-repeat is not supported");
        }
        supported
    }

    /// Text lookup through an input method; `None` when no IM or IC could be
    /// created.
    fn lookup_with_input_method(&mut self, key: &KeyEvent, bytes: &mut [u8]) -> Option<usize> {
        let method = self.open_input_method()?;
        let Some(context) = self.platform.create_input_context(&method) else {
            tracing::warn!("input context creation failed");
            return None;
        };
        Some(self.platform.lookup_utf8(&context, key, bytes))
    }

    fn open_input_method(&mut self) -> Option<X::InputMethod> {
        for modifiers in &self.locale_modifiers {
            if let Some(method) = self.platform.open_input_method(modifiers) {
                return Some(method);
            }
            tracing::debug!(modifiers = %modifiers, "input method unavailable");
        }
        tracing::warn!("no input method could be opened");
        None
    }
}

impl<X> InputHelper for RecordHelper<X>
where
    X: XPlatform,
{
    type Key = MarshalledEvent;

    fn keycode_to_vcode(&self, native: u32, _flags: u32) -> VirtualKeyCode {
        self.table.to_virtual(native, false)
    }

    fn vcode_to_keycode(&self, vcode: VirtualKeyCode) -> u32 {
        self.table.to_native(vcode)
    }

    fn set_modifier_mask(&mut self, mask: ModifierMask) {
        self.modifiers.set(mask);
    }

    fn unset_modifier_mask(&mut self, mask: ModifierMask) {
        self.modifiers.unset(mask);
    }

    fn modifiers(&self) -> ModifierMask {
        self.modifiers.get()
    }

    fn resolve_unicode(
        &mut self,
        event: &MarshalledEvent,
        out: &mut [u16],
        classes: &mut [CharClass],
    ) -> usize {
        let mut bytes = [0u8; LOOKUP_BUFFER_SIZE];

        let (len, utf8) = match &event.body {
            EventBody::KeyPress(key) => match self.lookup_with_input_method(key, &mut bytes) {
                Some(len) => (len, true),
                None => (self.platform.lookup_latin1(key, &mut bytes), false),
            },
            EventBody::KeyRelease(key) => (self.platform.lookup_latin1(key, &mut bytes), false),
            _ => return 0,
        };

        if len == 0 {
            return 0;
        }

        let bytes = &bytes[..len.min(LOOKUP_BUFFER_SIZE)];
        let encoded = if utf8 {
            utf8_to_utf16(bytes, out)
        } else {
            latin1_to_utf16(bytes, out)
        };

        match encoded {
            Ok(count) => {
                classify_units(&out[..count], classes);
                count
            }
            Err(EncodeError::EmptyBuffer) => 0,
            Err(e) => {
                tracing::warn!(error = %e, "key lookup produced unusable text");
                0
            }
        }
    }

    fn load(&mut self) -> usize {
        match self.platform.key_names() {
            Ok(names) => self.table = bind_key_names(names),
            Err(e) => tracing::error!(error = %e, "could not read XKB key names"),
        }
        self.buttons.load();
        self.modifiers.seed(&self.platform);

        let bound = bound_count(&self.table);
        tracing::info!(
            bound,
            modifiers = ?self.modifiers.get(),
            "record helper loaded"
        );
        bound
    }

    fn unload(&mut self) -> usize {
        let released = bound_count(&self.table);
        self.table = unbound_table();
        self.buttons.unload();
        tracing::info!(released, "record helper unloaded");
        released
    }
}

fn unbound_table() -> KeyCodeTable {
    bind_key_names(std::iter::empty())
}

fn bound_count(table: &KeyCodeTable) -> usize {
    table.entries().iter().filter(|e| e.native != 0).count()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::platform::mock::MockXPlatform;
    use uiohook_core::wire::{PointerFields, RecordCategory};

    fn key_event(body: fn(KeyEvent) -> EventBody, keycode: u8) -> MarshalledEvent {
        MarshalledEvent {
            timestamp: 0,
            send_event: false,
            body: body(KeyEvent {
                pointer: PointerFields::default(),
                keycode,
            }),
        }
    }

    fn loaded_helper(platform: MockXPlatform) -> RecordHelper<MockXPlatform> {
        let mut helper = RecordHelper::new(platform, RecordOptions::default());
        helper.load();
        helper
    }

    #[test]
    fn test_load_binds_server_key_names() {
        // Arrange
        let mut helper = RecordHelper::new(MockXPlatform::evdev(), RecordOptions::default());
        assert_eq!(helper.keycode_to_vcode(38, 0), VirtualKeyCode::Undefined);

        // Act
        let bound = helper.load();

        // Assert
        assert!(bound > 0);
        assert_eq!(helper.keycode_to_vcode(38, 0), VirtualKeyCode::KeyA);
        assert_eq!(helper.keycode_to_vcode(9, 0), VirtualKeyCode::Escape);
        assert_eq!(helper.vcode_to_keycode(VirtualKeyCode::Enter), 36);
    }

    #[test]
    fn test_load_without_key_names_leaves_table_unbound() {
        let mut helper =
            RecordHelper::new(MockXPlatform::evdev().without_xkb(), RecordOptions::default());

        assert_eq!(helper.load(), 0);
        assert_eq!(helper.keycode_to_vcode(38, 0), VirtualKeyCode::Undefined);
    }

    #[test]
    fn test_unload_clears_bindings() {
        let mut helper = loaded_helper(MockXPlatform::evdev());

        let released = helper.unload();

        assert!(released > 0);
        assert_eq!(helper.keycode_to_vcode(38, 0), VirtualKeyCode::Undefined);
        assert_eq!(helper.vcode_to_keycode(VirtualKeyCode::KeyA), 0);
    }

    #[test]
    fn test_load_seeds_buttons_and_locks_from_pointer_state() {
        // Arrange
        let platform = MockXPlatform::evdev()
            .with_pointer_buttons(ModifierMask::BUTTON1)
            .with_num_lock(true);

        // Act
        let helper = loaded_helper(platform);

        // Assert
        assert!(helper.modifiers().contains(ModifierMask::BUTTON1));
        assert!(helper.modifiers().contains(ModifierMask::NUM_LOCK));
        assert!(!helper.modifiers().contains(ModifierMask::CAPS_LOCK));
    }

    #[test]
    fn test_press_uses_input_method_and_releases_it() {
        // Arrange
        let mut helper = loaded_helper(MockXPlatform::evdev().with_text(38, "a"));
        let mut out = [0u16; 2];
        let mut classes = [CharClass::EMPTY; 2];

        // Act
        let count = helper.resolve_unicode(
            &key_event(EventBody::KeyPress, 38),
            &mut out,
            &mut classes,
        );

        // Assert
        assert_eq!(count, 1);
        assert_eq!(out[0], 0x0061);
        assert!(classes[0].contains(CharClass::LOWER));
        let counters = helper.platform().counters();
        assert_eq!(counters.methods_opened, 1);
        assert_eq!(counters.methods_closed, 1);
        assert_eq!(counters.contexts_created, 1);
        assert_eq!(counters.contexts_destroyed, 1);
        assert_eq!(counters.utf8_lookups, 1);
    }

    #[test]
    fn test_press_falls_back_to_builtin_input_method() {
        let platform = MockXPlatform::evdev()
            .with_text(38, "a")
            .rejecting_input_method("");
        let mut helper = loaded_helper(platform);
        let mut out = [0u16; 2];
        let mut classes = [CharClass::EMPTY; 2];

        helper.resolve_unicode(&key_event(EventBody::KeyPress, 38), &mut out, &mut classes);

        assert_eq!(helper.platform().opened_with(), vec!["@im=none".to_string()]);
        assert_eq!(helper.platform().counters().utf8_lookups, 1);
    }

    #[test]
    fn test_press_without_input_context_uses_latin1_lookup() {
        // Arrange
        let platform = MockXPlatform::evdev()
            .with_text(38, "é")
            .without_input_context();
        let mut helper = loaded_helper(platform);
        let mut out = [0u16; 2];
        let mut classes = [CharClass::EMPTY; 2];

        // Act
        let count = helper.resolve_unicode(
            &key_event(EventBody::KeyPress, 38),
            &mut out,
            &mut classes,
        );

        // Assert
        assert_eq!((count, out[0]), (1, 0x00E9));
        let counters = helper.platform().counters();
        assert_eq!(counters.latin1_lookups, 1);
        assert_eq!(counters.methods_opened, counters.methods_closed);
    }

    #[test]
    fn test_release_never_opens_input_method() {
        let mut helper = loaded_helper(MockXPlatform::evdev().with_text(38, "a"));
        let mut out = [0u16; 2];
        let mut classes = [CharClass::EMPTY; 2];

        let count = helper.resolve_unicode(
            &key_event(EventBody::KeyRelease, 38),
            &mut out,
            &mut classes,
        );

        assert_eq!(count, 1);
        assert_eq!(helper.platform().counters().methods_opened, 0);
    }

    #[test]
    fn test_supplementary_character_needs_two_units() {
        let mut helper = loaded_helper(MockXPlatform::evdev().with_text(38, "😀"));
        let press = key_event(EventBody::KeyPress, 38);
        let mut classes = [CharClass::EMPTY; 2];

        let mut pair = [0u16; 2];
        let fits = helper.resolve_unicode(&press, &mut pair, &mut classes);
        let mut single = [0u16; 1];
        let overflow = helper.resolve_unicode(&press, &mut single, &mut classes);

        assert_eq!(fits, 2);
        assert_eq!(pair, [0xD83D, 0xDE00]);
        assert_eq!(overflow, 0);
    }

    #[test]
    fn test_non_key_events_yield_no_text() {
        let mut helper = loaded_helper(MockXPlatform::evdev());
        let motion = MarshalledEvent {
            timestamp: 0,
            send_event: false,
            body: EventBody::Unpopulated,
        };

        let count = helper.resolve_unicode(&motion, &mut [0u16; 2], &mut [CharClass::EMPTY; 2]);

        assert_eq!(count, 0);
    }

    #[test]
    fn test_marshal_wire_event_uses_configured_clock() {
        // Arrange
        let helper = RecordHelper::new(MockXPlatform::evdev(), RecordOptions::default());
        let mut data = [0u8; 32];
        data[0] = 2;
        data[1] = 38;
        let record = RawRecord {
            category: RecordCategory::FromServer,
            server_time: 42,
            data: &data,
        };

        // Act
        let event = helper.marshal_wire_event(&record);

        // Assert
        assert_eq!(event.timestamp, 42);
        assert_eq!(event.key().map(|k| k.keycode), Some(38));
    }

    #[test]
    fn test_map_pointer_button_uses_server_mapping() {
        // Arrange: left-handed mapping
        let platform = MockXPlatform::evdev().with_pointer_mapping(&[3, 2, 1]);
        let mut helper = loaded_helper(platform);

        // Act / Assert
        assert_eq!(helper.map_pointer_button(1), 2);
        assert_eq!(helper.map_pointer_button(2), 3);
        assert_eq!(helper.map_pointer_button(3), 1);
        assert_eq!(helper.map_pointer_button(8), 8);
    }

    #[test]
    fn test_detectable_auto_repeat_reports_support() {
        let mut supported = loaded_helper(MockXPlatform::evdev());
        let mut unsupported = loaded_helper(MockXPlatform::evdev().without_auto_repeat());

        assert!(supported.enable_detectable_auto_repeat());
        assert!(!unsupported.enable_detectable_auto_repeat());
    }
}
