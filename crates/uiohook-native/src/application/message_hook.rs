//! Helper context for the Windows message-hook backend.
//!
//! A low-level keyboard hook sees a virtual-key code, a scan code and a flag
//! word.  [`MessageHookHelper`] turns those into a [`VirtualKeyCode`] and, on
//! request, into the text the key types in the layout of the window that
//! currently has focus.
//!
//! Text resolution is the expensive path.  Per call it:
//!
//! 1. Asks the [`LocaleCache`] for the focused window's layout, loading it on
//!    a miss.
//! 2. Snapshots the 256-byte keyboard state.
//! 3. Translates with the layout without mutating the OS dead-key buffer.
//! 4. Folds the result through dead-key composition.
//! 5. Classifies the resulting units.

use uiohook_core::domain::modifiers::InputStateProbe;
use uiohook_core::keymap::windows_vk;
use uiohook_core::{
    CharClass, KeyCodeTable, LayoutPlatform, LocaleCache, ModifierMask, ModifierState,
    VirtualKeyCode,
};

use super::helper::InputHelper;

/// One keyboard hook event as the Windows backend sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyStroke {
    /// Virtual-key code (`KBDLLHOOKSTRUCT::vkCode`).
    pub vk: u32,
    /// Hardware scan code (`KBDLLHOOKSTRUCT::scanCode`).
    pub scan: u32,
}

impl KeyStroke {
    pub const fn new(vk: u32, scan: u32) -> Self {
        Self { vk, scan }
    }
}

/// Windows helper context: key table, modifier mask and layout cache.
pub struct MessageHookHelper<P>
where
    P: LayoutPlatform,
{
    platform: P,
    table: KeyCodeTable,
    modifiers: ModifierState,
    locales: LocaleCache<P::Module>,
}

impl<P> MessageHookHelper<P>
where
    P: LayoutPlatform + InputStateProbe,
{
    /// Creates an unloaded helper.  The layout cache is sized for the
    /// platform's pointer width and WOW64 status.
    pub fn new(platform: P) -> Self {
        let locales = LocaleCache::for_platform(&platform);
        Self {
            platform,
            table: KeyCodeTable::windows(),
            modifiers: ModifierState::new(),
            locales,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn locales(&self) -> &LocaleCache<P::Module> {
        &self.locales
    }

    /// Re-synchronises the layout cache with the OS, e.g. after an
    /// input-language change notification.
    pub fn refresh_layouts(&mut self) -> usize {
        self.locales.refresh(&mut self.platform)
    }
}

impl<P> InputHelper for MessageHookHelper<P>
where
    P: LayoutPlatform + InputStateProbe,
{
    type Key = KeyStroke;

    fn keycode_to_vcode(&self, native: u32, flags: u32) -> VirtualKeyCode {
        self.table.to_virtual(native, windows_vk::is_extended(flags))
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
        key: &KeyStroke,
        out: &mut [u16],
        classes: &mut [CharClass],
    ) -> usize {
        if out.is_empty() {
            return 0;
        }

        let Some(active) = self.locales.activate_focused(&mut self.platform) else {
            tracing::debug!(vk = key.vk, "no layout available; skipping text lookup");
            return 0;
        };

        let state = match self.platform.keyboard_state() {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(error = %e, "keyboard state snapshot failed");
                return 0;
            }
        };

        let raw = self
            .platform
            .to_unicode(key.vk, key.scan, &state, out, active.id);
        let count = self.locales.dead_key_mut().apply(
            self.platform.memory(),
            active.tables.dead_keys,
            raw,
            out,
        );
        if count == 0 {
            return 0;
        }

        let classified = classes.len().min(count);
        if let Err(e) = self
            .platform
            .classify(&out[..count], &mut classes[..classified])
        {
            tracing::error!(error = %e, "character classification failed");
            return 0;
        }

        count
    }

    fn load(&mut self) -> usize {
        self.modifiers.seed(&self.platform);
        let count = self.locales.refresh(&mut self.platform);
        tracing::info!(
            layouts = count,
            modifiers = ?self.modifiers.get(),
            "message hook helper loaded"
        );
        count
    }

    fn unload(&mut self) -> usize {
        let released = self.locales.unload();
        tracing::info!(released, "message hook helper unloaded");
        released
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
