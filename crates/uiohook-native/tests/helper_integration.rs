//! Integration tests for the translation helpers.
//!
//! These drive the public helper API end-to-end against the in-memory
//! platforms: layout cache and classification for the
//! message-hook helper, and wire decoding + key binding + input-method
//! lookup for the RECORD helper.

use uiohook_core::domain::modifiers::ModifierKey;
use uiohook_core::wire::{RawRecord, RecordCategory, TimestampSource};
use uiohook_core::{CharClass, LayoutId, ModifierMask, VirtualKeyCode};
use uiohook_native::application::{
    InputHelper, KeyStroke, MessageHookHelper, RecordHelper, RecordOptions,
};
use uiohook_native::infrastructure::platform::mock::{MockLayoutPlatform, MockXPlatform, VK_SHIFT};
use uiohook_native::infrastructure::storage::config::{load_config_from, save_config_to, HelperConfig};

const US: u64 = 0x0409_0409;
const FR: u64 = 0x040C_040C;
const DE: u64 = 0x0407_0407;

/// A 32-byte core KeyPress for `keycode`.
fn key_press_bytes(keycode: u8) -> [u8; 32] {
    let mut data = [0u8; 32];
    data[0] = 2;
    data[1] = keycode;
    data
}

fn temp_path(tag: &str) -> std::path::PathBuf {
    std::env::temp_dir()
        .join(format!("uiohook_it_{tag}_{}", std::process::id()))
        .join("config.toml")
}

// ── Message-hook helper ───────────────────────────────────────────────────────

#[test]
fn test_typing_a_with_and_without_shift() {
    // Arrange
    let platform = MockLayoutPlatform::new()
        .with_layouts(&[US])
        .with_focus(Some(US))
        .with_key(0x41, 'a', 'A');
    let mut helper = MessageHookHelper::new(platform);
    assert_eq!(helper.load(), 1);
    let mut out = [0u16; 4];
    let mut classes = [CharClass::EMPTY; 4];

    // Act
    let plain = helper.resolve_unicode(&KeyStroke::new(0x41, 0x1E), &mut out, &mut classes);
    let plain_unit = out[0];
    let plain_class = classes[0];
    helper.platform_mut().set_key_state(VK_SHIFT, true);
    let shifted = helper.resolve_unicode(&KeyStroke::new(0x41, 0x1E), &mut out, &mut classes);

    // Assert
    assert_eq!((plain, plain_unit), (1, 0x0061));
    assert!(plain_class.contains(CharClass::LOWER));
    assert_eq!((shifted, out[0]), (1, 0x0041));
    assert!(classes[0].contains(CharClass::UPPER));
}

#[test]
fn test_focus_change_switches_cached_layout() {
    // Arrange
    let platform = MockLayoutPlatform::new()
        .with_layouts(&[US, FR])
        .with_focus(Some(US))
        .with_key(0x41, 'a', 'A');
    let mut helper = MessageHookHelper::new(platform);
    helper.load();
    let loads_after_load = helper.platform().load_counter().get();
    let mut out = [0u16; 2];
    let mut classes = [CharClass::EMPTY; 2];

    // Act
    helper.platform_mut().set_focus(Some(FR));
    let count = helper.resolve_unicode(&KeyStroke::new(0x41, 0x1E), &mut out, &mut classes);

    // Assert: the cached FR layout is used without loading anything new
    assert_eq!(count, 1);
    assert_eq!(helper.locales().current_id(), Some(LayoutId(FR)));
    assert_eq!(helper.platform().load_counter().get(), loads_after_load);
}

#[test]
fn test_newly_installed_layout_is_loaded_on_demand() {
    // Arrange
    let platform = MockLayoutPlatform::new()
        .with_layouts(&[US])
        .with_focus(Some(US))
        .with_key(0x41, 'a', 'A');
    let mut helper = MessageHookHelper::new(platform);
    helper.load();
    let mut out = [0u16; 2];
    let mut classes = [CharClass::EMPTY; 2];

    // Act: the user adds DE and focuses a window that uses it
    helper.platform_mut().set_layouts(&[US, DE]);
    helper.platform_mut().set_focus(Some(DE));
    let count = helper.resolve_unicode(&KeyStroke::new(0x41, 0x1E), &mut out, &mut classes);

    // Assert
    assert_eq!(count, 1);
    assert!(helper.locales().contains(LayoutId(DE)));
    assert_eq!(helper.locales().current_id(), Some(LayoutId(DE)));
}

#[test]
fn test_unknown_focus_resolves_through_thread_layout() {
    // Arrange: never loaded, and the foreground window's layout is unknown
    let platform = MockLayoutPlatform::new()
        .with_layouts(&[US])
        .with_thread_layout(US)
        .with_focus(None)
        .with_key(0x41, 'a', 'A');
    let mut helper = MessageHookHelper::new(platform);
    let mut out = [0u16; 2];
    let mut classes = [CharClass::EMPTY; 2];

    // Act
    let count = helper.resolve_unicode(&KeyStroke::new(0x41, 0x1E), &mut out, &mut classes);

    // Assert
    assert_eq!((count, out[0]), (1, 0x0061));
    assert_eq!(helper.locales().current_id(), Some(LayoutId(US)));
}

#[test]
fn test_removed_layout_is_released_on_refresh() {
    // Arrange
    let platform = MockLayoutPlatform::new()
        .with_layouts(&[US, FR])
        .with_focus(Some(US));
    let mut helper = MessageHookHelper::new(platform);
    helper.load();
    let released = helper.platform().release_counter();

    // Act
    helper.platform_mut().set_layouts(&[US]);
    let cached = helper.refresh_layouts();

    // Assert
    assert_eq!(cached, 1);
    assert_eq!(released.get(), 1);
    assert!(!helper.locales().contains(LayoutId(FR)));
}

#[test]
fn test_unload_releases_every_layout_module() {
    let platform = MockLayoutPlatform::new().with_layouts(&[US, FR, DE]);
    let mut helper = MessageHookHelper::new(platform);
    helper.load();
    let released = helper.platform().release_counter();

    assert_eq!(helper.unload(), 3);
    assert_eq!(released.get(), 3);
    assert!(helper.locales().is_empty());
}

#[test]
fn test_held_modifiers_are_tracked_across_hook_updates() {
    // Arrange
    let platform = MockLayoutPlatform::new()
        .with_layouts(&[US])
        .with_key_down(ModifierKey::ControlL);
    let mut helper = MessageHookHelper::new(platform);
    helper.load();

    // Act: the hook reports Shift pressed, then Ctrl released
    helper.set_modifier_mask(ModifierMask::SHIFT_L);
    helper.unset_modifier_mask(ModifierMask::CTRL_L);

    // Assert
    assert_eq!(helper.modifiers(), ModifierMask::SHIFT_L);
}

// ── RECORD helper ─────────────────────────────────────────────────────────────

#[test]
fn test_recorded_key_press_resolves_to_text() {
    // Arrange
    let mut helper = RecordHelper::new(
        MockXPlatform::evdev().with_text(38, "a"),
        RecordOptions::default(),
    );
    helper.load();
    let data = key_press_bytes(38);
    let record = RawRecord {
        category: RecordCategory::FromServer,
        server_time: 1_000,
        data: &data,
    };
    let mut out = [0u16; 2];
    let mut classes = [CharClass::EMPTY; 2];

    // Act
    let event = helper.marshal_wire_event(&record);
    let keycode = event.key().map(|k| u32::from(k.keycode)).unwrap_or_default();
    let vcode = helper.keycode_to_vcode(keycode, 0);
    let count = helper.resolve_unicode(&event, &mut out, &mut classes);

    // Assert
    assert_eq!(event.timestamp, 1_000);
    assert_eq!(vcode, VirtualKeyCode::KeyA);
    assert_eq!((count, out[0]), (1, 0x0061));
    let counters = helper.platform().counters();
    assert_eq!(counters.methods_opened, counters.methods_closed);
    assert_eq!(counters.contexts_created, counters.contexts_destroyed);
}

#[test]
fn test_client_originated_record_is_unpopulated() {
    let mut helper = RecordHelper::new(MockXPlatform::evdev().with_text(38, "a"), RecordOptions::default());
    helper.load();
    let data = key_press_bytes(38);
    let record = RawRecord {
        category: RecordCategory::FromClient,
        server_time: 7,
        data: &data,
    };

    let event = helper.marshal_wire_event(&record);

    assert!(event.key().is_none());
    assert_eq!(helper.resolve_unicode(&event, &mut [0u16; 2], &mut [CharClass::EMPTY; 2]), 0);
}

#[test]
fn test_reload_after_unload_rebinds_keys() {
    let mut helper = RecordHelper::new(MockXPlatform::evdev(), RecordOptions::default());

    let first = helper.load();
    helper.unload();
    let second = helper.load();

    assert_eq!(first, second);
    assert_eq!(helper.vcode_to_keycode(VirtualKeyCode::Escape), 9);
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[test]
fn test_config_file_drives_record_options() {
    // Arrange
    let path = temp_path("record_options");
    let mut config = HelperConfig::default();
    config.timestamps.source = TimestampSource::Epoch;
    config.input_method.locale_modifiers = vec!["@im=none".to_string()];
    save_config_to(&path, &config).expect("save must succeed");

    // Act
    let loaded = load_config_from(&path).expect("load must succeed");
    let mut helper = RecordHelper::new(
        MockXPlatform::evdev().with_text(38, "a"),
        loaded.record_options(),
    );
    helper.load();
    let data = key_press_bytes(38);
    let event = helper.marshal_wire_event(&RawRecord {
        category: RecordCategory::FromServer,
        server_time: 5,
        data: &data,
    });
    helper.resolve_unicode(&event, &mut [0u16; 2], &mut [CharClass::EMPTY; 2]);

    // Assert
    assert_eq!(loaded, config);
    assert_eq!(helper.platform().opened_with(), vec!["@im=none".to_string()]);

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}
