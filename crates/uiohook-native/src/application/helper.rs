//! The surface a hook implementation calls on either backend.

use uiohook_core::{CharClass, ModifierMask, VirtualKeyCode};

/// Translation services offered to the hook thread.
///
/// Both backends implement the same lifecycle: [`load`](Self::load) once
/// before the hook starts, [`unload`](Self::unload) once after it stops.
/// Queries made outside that window still answer, just from empty state.
pub trait InputHelper {
    /// The native key event text is resolved from.
    type Key: ?Sized;

    /// Maps a native key code to a virtual key code.
    ///
    /// `flags` carries the backend's per-event flag word; only the Windows
    /// backend inspects it (for the extended-key bit).
    fn keycode_to_vcode(&self, native: u32, flags: u32) -> VirtualKeyCode;

    /// Maps a virtual key code back to a native key code.  `0` when unmapped.
    fn vcode_to_keycode(&self, vcode: VirtualKeyCode) -> u32;

    fn set_modifier_mask(&mut self, mask: ModifierMask);

    fn unset_modifier_mask(&mut self, mask: ModifierMask);

    fn modifiers(&self) -> ModifierMask;

    /// Resolves the text `key` produces into UTF-16 units plus one class
    /// per unit.  Returns the number of units written; `0` means "no text".
    fn resolve_unicode(
        &mut self,
        key: &Self::Key,
        out: &mut [u16],
        classes: &mut [CharClass],
    ) -> usize;

    /// Seeds modifier state and loads backend resources.
    ///
    /// Returns the number of layouts (Windows) or bound key codes (X11)
    /// available after loading.
    fn load(&mut self) -> usize;

    /// Releases everything [`load`](Self::load) acquired.  Returns how many
    /// layouts or key bindings were released.
    fn unload(&mut self) -> usize;
}
