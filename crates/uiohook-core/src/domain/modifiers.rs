//! Modifier, lock-key and mouse-button state.
//!
//! # What is tracked here? (for beginners)
//!
//! Every event the hook reports carries a 16-bit `mask` describing which
//! modifier keys are held, which lock keys are on and which mouse buttons are
//! pressed at that instant.  The hook collaborator updates the mask with
//! [`ModifierState::set`] and [`ModifierState::unset`] as key and button events
//! arrive; nothing here listens to the OS on its own.
//!
//! Because the hook only sees *transitions*, a key that was already held when
//! the hook started would never be reported.  [`ModifierState::seed`] closes
//! that gap once at start-up by asking the OS what is down right now, through
//! the [`InputStateProbe`] port.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

// ── Mask ──────────────────────────────────────────────────────────────────────

/// A set of modifier, button and lock bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModifierMask(pub u16);

impl ModifierMask {
    pub const EMPTY: Self = Self(0);

    pub const SHIFT_L: Self = Self(1 << 0);
    pub const CTRL_L: Self = Self(1 << 1);
    pub const META_L: Self = Self(1 << 2);
    pub const ALT_L: Self = Self(1 << 3);
    pub const SHIFT_R: Self = Self(1 << 4);
    pub const CTRL_R: Self = Self(1 << 5);
    pub const META_R: Self = Self(1 << 6);
    pub const ALT_R: Self = Self(1 << 7);

    pub const SHIFT: Self = Self(Self::SHIFT_L.0 | Self::SHIFT_R.0);
    pub const CTRL: Self = Self(Self::CTRL_L.0 | Self::CTRL_R.0);
    pub const META: Self = Self(Self::META_L.0 | Self::META_R.0);
    pub const ALT: Self = Self(Self::ALT_L.0 | Self::ALT_R.0);

    pub const BUTTON1: Self = Self(1 << 8);
    pub const BUTTON2: Self = Self(1 << 9);
    pub const BUTTON3: Self = Self(1 << 10);
    pub const BUTTON4: Self = Self(1 << 11);
    pub const BUTTON5: Self = Self(1 << 12);

    pub const NUM_LOCK: Self = Self(1 << 13);
    pub const CAPS_LOCK: Self = Self(1 << 14);
    pub const SCROLL_LOCK: Self = Self(1 << 15);

    /// Button bits in button order, `BUTTONS[0]` is button 1.
    pub const BUTTONS: [Self; 5] = [
        Self::BUTTON1,
        Self::BUTTON2,
        Self::BUTTON3,
        Self::BUTTON4,
        Self::BUTTON5,
    ];

    /// Returns the bit for a 1-based mouse button, or `None` above button 5.
    pub fn button(number: u8) -> Option<Self> {
        match number {
            1..=5 => Some(Self::BUTTONS[usize::from(number - 1)]),
            _ => None,
        }
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if any bit of `other` is set in `self`.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for ModifierMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModifierMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ModifierMask {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for ModifierMask {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Debug for ModifierMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModifierMask({:#06X})", self.0)
    }
}

impl From<ModifierMask> for u16 {
    fn from(mask: ModifierMask) -> u16 {
        mask.0
    }
}

// ── Probe port ────────────────────────────────────────────────────────────────

/// The coarse modifier groups a pointer query reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierGroup {
    Shift,
    Control,
    Alt,
    Meta,
}

/// A left- or right-hand modifier key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKey {
    ShiftL,
    ShiftR,
    ControlL,
    ControlR,
    AltL,
    AltR,
    MetaL,
    MetaR,
}

impl ModifierKey {
    pub const ALL: [ModifierKey; 8] = [
        ModifierKey::ShiftL,
        ModifierKey::ShiftR,
        ModifierKey::ControlL,
        ModifierKey::ControlR,
        ModifierKey::AltL,
        ModifierKey::AltR,
        ModifierKey::MetaL,
        ModifierKey::MetaR,
    ];

    pub const fn mask(self) -> ModifierMask {
        match self {
            ModifierKey::ShiftL => ModifierMask::SHIFT_L,
            ModifierKey::ShiftR => ModifierMask::SHIFT_R,
            ModifierKey::ControlL => ModifierMask::CTRL_L,
            ModifierKey::ControlR => ModifierMask::CTRL_R,
            ModifierKey::AltL => ModifierMask::ALT_L,
            ModifierKey::AltR => ModifierMask::ALT_R,
            ModifierKey::MetaL => ModifierMask::META_L,
            ModifierKey::MetaR => ModifierMask::META_R,
        }
    }

    pub const fn group(self) -> ModifierGroup {
        match self {
            ModifierKey::ShiftL | ModifierKey::ShiftR => ModifierGroup::Shift,
            ModifierKey::ControlL | ModifierKey::ControlR => ModifierGroup::Control,
            ModifierKey::AltL | ModifierKey::AltR => ModifierGroup::Alt,
            ModifierKey::MetaL | ModifierKey::MetaR => ModifierGroup::Meta,
        }
    }
}

/// Lock-key indicator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockIndicators {
    pub caps_lock: bool,
    pub num_lock: bool,
    pub scroll_lock: bool,
}

impl LockIndicators {
    /// Decodes an XKB-style LED bit field (bit 0 caps, bit 1 num, bit 2 scroll).
    pub const fn from_led_bits(leds: u32) -> Self {
        Self {
            caps_lock: leds & 0x01 != 0,
            num_lock: leds & 0x02 != 0,
            scroll_lock: leds & 0x04 != 0,
        }
    }
}

/// Result of a pointer query: coarse modifier groups and pressed buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerState {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub meta: bool,
    /// Only the `BUTTON1..=BUTTON5` bits are meaningful.
    pub buttons: ModifierMask,
}

impl PointerState {
    pub const fn allows(&self, group: ModifierGroup) -> bool {
        match group {
            ModifierGroup::Shift => self.shift,
            ModifierGroup::Control => self.control,
            ModifierGroup::Alt => self.alt,
            ModifierGroup::Meta => self.meta,
        }
    }
}

/// Read-only view of the live keyboard and pointer state.
///
/// Implemented by each native backend and by test mocks.
#[cfg_attr(test, mockall::automock)]
pub trait InputStateProbe {
    /// Current lock indicators, or `None` if the query failed.
    fn lock_indicators(&self) -> Option<LockIndicators>;

    /// Current pointer state, or `None` if the query failed.
    fn pointer_state(&self) -> Option<PointerState>;

    /// Whether `key` is physically down right now.
    fn is_key_down(&self, key: ModifierKey) -> bool;
}

// ── State ─────────────────────────────────────────────────────────────────────

/// The modifier mask owned by a translation context.
#[derive(Debug, Clone, Default)]
pub struct ModifierState {
    mask: ModifierMask,
}

impl ModifierState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, mask: ModifierMask) {
        self.mask |= mask;
    }

    pub fn unset(&mut self, mask: ModifierMask) {
        self.mask = self.mask & !mask;
    }

    pub fn get(&self) -> ModifierMask {
        self.mask
    }

    /// Replaces the mask with what the OS currently reports.
    ///
    /// Modifier keys are tested individually, but only inside groups the
    /// pointer query reports as active.  Without a pointer query every key is
    /// tested.  A failed lock query leaves the lock bits clear.
    pub fn seed<P>(&mut self, probe: &P)
    where
        P: InputStateProbe + ?Sized,
    {
        self.mask = ModifierMask::EMPTY;

        match probe.pointer_state() {
            Some(pointer) => {
                for key in ModifierKey::ALL {
                    if pointer.allows(key.group()) && probe.is_key_down(key) {
                        self.set(key.mask());
                    }
                }
                self.set(pointer.buttons & button_bits());
            }
            None => {
                tracing::warn!("pointer query failed; testing every modifier key");
                for key in ModifierKey::ALL {
                    if probe.is_key_down(key) {
                        self.set(key.mask());
                    }
                }
            }
        }

        match probe.lock_indicators() {
            Some(locks) => self.apply_locks(locks),
            None => tracing::warn!("lock indicator query failed"),
        }

        tracing::debug!(mask = ?self.mask, "seeded modifier state");
    }

    fn apply_locks(&mut self, locks: LockIndicators) {
        for (on, bit) in [
            (locks.caps_lock, ModifierMask::CAPS_LOCK),
            (locks.num_lock, ModifierMask::NUM_LOCK),
            (locks.scroll_lock, ModifierMask::SCROLL_LOCK),
        ] {
            if on {
                self.set(bit);
            } else {
                self.unset(bit);
            }
        }
    }
}

fn button_bits() -> ModifierMask {
    ModifierMask::BUTTONS
        .iter()
        .fold(ModifierMask::EMPTY, |acc, &bit| acc | bit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_unset_restores_previous_mask() {
        // Arrange
        let mut state = ModifierState::new();
        state.set(ModifierMask::CTRL_L);

        // Act
        state.set(ModifierMask::SHIFT_L);
        state.unset(ModifierMask::SHIFT_L);

        // Assert
        assert_eq!(state.get(), ModifierMask::CTRL_L);
    }

    #[test]
    fn test_set_is_idempotent() {
        let mut state = ModifierState::new();
        state.set(ModifierMask::ALT_R);
        state.set(ModifierMask::ALT_R);
        assert_eq!(state.get(), ModifierMask::ALT_R);
    }

    #[test]
    fn test_unset_of_clear_bit_is_noop() {
        let mut state = ModifierState::new();
        state.set(ModifierMask::META_L);
        state.unset(ModifierMask::BUTTON3);
        assert_eq!(state.get(), ModifierMask::META_L);
    }

    #[test]
    fn test_mask_bit_values() {
        assert_eq!(ModifierMask::SHIFT_L.bits(), 0x0001);
        assert_eq!(ModifierMask::ALT_R.bits(), 0x0080);
        assert_eq!(ModifierMask::BUTTON1.bits(), 0x0100);
        assert_eq!(ModifierMask::BUTTON5.bits(), 0x1000);
        assert_eq!(ModifierMask::NUM_LOCK.bits(), 0x2000);
        assert_eq!(ModifierMask::CAPS_LOCK.bits(), 0x4000);
        assert_eq!(ModifierMask::SCROLL_LOCK.bits(), 0x8000);
        assert_eq!(ModifierMask::button(3), Some(ModifierMask::BUTTON3));
        assert_eq!(ModifierMask::button(6), None);
    }

    #[test]
    fn test_seed_gates_keys_by_pointer_group() {
        // Arrange: Shift group active, Control group inactive, both keys down.
        let mut probe = MockInputStateProbe::new();
        probe.expect_pointer_state().returning(|| {
            Some(PointerState {
                shift: true,
                buttons: ModifierMask::BUTTON1,
                ..PointerState::default()
            })
        });
        probe.expect_is_key_down().returning(|key| {
            matches!(key, ModifierKey::ShiftL | ModifierKey::ControlL)
        });
        probe
            .expect_lock_indicators()
            .returning(|| Some(LockIndicators::from_led_bits(0x01)));
        let mut state = ModifierState::new();

        // Act
        state.seed(&probe);

        // Assert
        assert_eq!(
            state.get(),
            ModifierMask::SHIFT_L | ModifierMask::BUTTON1 | ModifierMask::CAPS_LOCK
        );
    }

    #[test]
    fn test_seed_without_pointer_query_tests_every_key() {
        // Arrange
        let mut probe = MockInputStateProbe::new();
        probe.expect_pointer_state().returning(|| None);
        probe
            .expect_is_key_down()
            .times(8)
            .returning(|key| matches!(key, ModifierKey::ControlR | ModifierKey::MetaL));
        probe.expect_lock_indicators().returning(|| None);
        let mut state = ModifierState::new();
        state.set(ModifierMask::BUTTON2);

        // Act
        state.seed(&probe);

        // Assert: previous bits are discarded, lock failure leaves locks clear.
        assert_eq!(state.get(), ModifierMask::CTRL_R | ModifierMask::META_L);
    }

    #[test]
    fn test_led_bits_decode() {
        let locks = LockIndicators::from_led_bits(0x06);
        assert!(!locks.caps_lock);
        assert!(locks.num_lock);
        assert!(locks.scroll_lock);
    }
}
