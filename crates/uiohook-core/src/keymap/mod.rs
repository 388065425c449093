//! Key code translation tables for cross-platform keyboard event mapping.
//!
//! The canonical representation is [`VirtualKeyCode`].  Platform-specific codes
//! are translated to/from it at the capture boundary by a [`KeyCodeTable`].
//!
//! # Table semantics
//!
//! A table is an ordered list of [`TranslationEntry`] rows.  It is *not* a
//! bijection:
//!
//! - several native codes may map to one virtual code (the generic `VK_SHIFT`
//!   and the left-specific `VK_LSHIFT` both become [`VirtualKeyCode::ShiftL`]),
//! - one virtual code may be listed with several native aliases.
//!
//! Both lookup directions scan the rows in order and stop at the first match,
//! so the first row listing a virtual code defines its *canonical* native code.

pub mod vcode;
pub mod windows_vk;
pub mod x11_xkb;

use std::borrow::Cow;

pub use vcode::VirtualKeyCode;

/// Native code returned by [`KeyCodeTable::to_native`] when no row matches.
///
/// Zero is never a valid Windows VK constant nor a valid X11 keycode, so it
/// also never matches in the forward direction.
pub const NO_NATIVE_MAPPING: u32 = 0;

/// One row of a translation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationEntry {
    pub vcode: VirtualKeyCode,
    pub native: u32,
}

impl TranslationEntry {
    pub const fn new(vcode: VirtualKeyCode, native: u32) -> Self {
        Self { vcode, native }
    }
}

/// Bidirectional first-match map between native key codes and [`VirtualKeyCode`].
#[derive(Debug, Clone)]
pub struct KeyCodeTable {
    entries: Cow<'static, [TranslationEntry]>,
}

impl KeyCodeTable {
    /// Wraps a table that is fixed at build time.
    pub const fn from_static(entries: &'static [TranslationEntry]) -> Self {
        Self {
            entries: Cow::Borrowed(entries),
        }
    }

    /// Wraps a table whose native column was resolved at runtime.
    pub fn from_entries(entries: Vec<TranslationEntry>) -> Self {
        Self {
            entries: Cow::Owned(entries),
        }
    }

    /// The Windows virtual-key table used by the message-hook backend.
    pub const fn windows() -> Self {
        Self::from_static(windows_vk::VK_TABLE)
    }

    /// Translates a native key code to a [`VirtualKeyCode`].
    ///
    /// Returns [`VirtualKeyCode::Undefined`] if no row lists `native`.  When
    /// the matched row is plain Enter and `extended` is set, the key is the
    /// numeric keypad Enter instead.
    pub fn to_virtual(&self, native: u32, extended: bool) -> VirtualKeyCode {
        if native == NO_NATIVE_MAPPING {
            return VirtualKeyCode::Undefined;
        }

        let vcode = self
            .entries
            .iter()
            .find(|entry| entry.native == native)
            .map(|entry| entry.vcode)
            .unwrap_or(VirtualKeyCode::Undefined);

        if vcode == VirtualKeyCode::Enter && extended {
            VirtualKeyCode::NumpadEnter
        } else {
            vcode
        }
    }

    /// Translates a [`VirtualKeyCode`] to its canonical native key code.
    ///
    /// Returns [`NO_NATIVE_MAPPING`] if the table has no row for `vcode`.
    pub fn to_native(&self, vcode: VirtualKeyCode) -> u32 {
        self.entries
            .iter()
            .find(|entry| entry.vcode == vcode)
            .map(|entry| entry.native)
            .unwrap_or(NO_NATIVE_MAPPING)
    }

    /// Returns the rows in lookup order.
    pub fn entries(&self) -> &[TranslationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use VirtualKeyCode::*;

    const SMALL_TABLE: &[TranslationEntry] = &[
        TranslationEntry::new(Enter, 0x0D),
        TranslationEntry::new(NumpadEnter, 0x0D),
        TranslationEntry::new(ShiftL, 0xA0),
        TranslationEntry::new(ShiftR, 0xA1),
        TranslationEntry::new(ShiftL, 0x10),
        TranslationEntry::new(KeyA, 0x41),
        TranslationEntry::new(KeyA, 0x41),
    ];

    #[test]
    fn test_to_virtual_takes_first_matching_row() {
        let table = KeyCodeTable::from_static(SMALL_TABLE);
        assert_eq!(table.to_virtual(0xA0, false), ShiftL);
        assert_eq!(table.to_virtual(0x10, false), ShiftL);
        assert_eq!(table.to_virtual(0x41, false), KeyA);
    }

    #[test]
    fn test_to_virtual_returns_undefined_for_unlisted_code() {
        let table = KeyCodeTable::from_static(SMALL_TABLE);
        assert_eq!(table.to_virtual(0x99, false), Undefined);
        assert_eq!(table.to_virtual(NO_NATIVE_MAPPING, true), Undefined);
    }

    #[test]
    fn test_extended_flag_turns_enter_into_numpad_enter() {
        let table = KeyCodeTable::from_static(SMALL_TABLE);
        assert_eq!(table.to_virtual(0x0D, false), Enter);
        assert_eq!(table.to_virtual(0x0D, true), NumpadEnter);
    }

    #[test]
    fn test_extended_flag_is_ignored_for_other_keys() {
        let table = KeyCodeTable::from_static(SMALL_TABLE);
        assert_eq!(table.to_virtual(0xA1, true), ShiftR);
    }

    #[test]
    fn test_to_native_returns_canonical_alias() {
        let table = KeyCodeTable::from_static(SMALL_TABLE);
        // VK_SHIFT (0x10) is an alias; VK_LSHIFT is listed first.
        assert_eq!(table.to_native(table.to_virtual(0x10, false)), 0xA0);
        assert_eq!(table.to_native(NumpadEnter), 0x0D);
    }

    #[test]
    fn test_to_native_returns_zero_for_unlisted_vcode() {
        let table = KeyCodeTable::from_static(SMALL_TABLE);
        assert_eq!(table.to_native(F13), NO_NATIVE_MAPPING);
    }

    #[test]
    fn test_owned_table_behaves_like_static_table() {
        let table = KeyCodeTable::from_entries(SMALL_TABLE.to_vec());
        assert_eq!(table.len(), SMALL_TABLE.len());
        assert_eq!(table.to_virtual(0x41, false), KeyA);
        assert_eq!(table.to_native(ShiftR), 0xA1);
    }
}
