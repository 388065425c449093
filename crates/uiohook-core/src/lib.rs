//! # uiohook-core
//!
//! Platform-independent half of the uiohook native translation layer: the
//! virtual key vocabulary and its translation tables, modifier state, the
//! keyboard layout cache, text encoding and the RECORD event decoder.
//!
//! This crate has zero dependencies on OS APIs.  Everything that touches the
//! operating system is reached through small traits (ports) that the
//! `uiohook-native` crate implements for Windows and X11, and that tests
//! implement with in-memory fakes.
//!
//! # Architecture overview (for beginners)
//!
//! A global input hook receives events in whatever shape the OS uses: a
//! Windows virtual-key code plus a scan code, or 32 raw bytes captured by the
//! X11 RECORD extension.  Client code wants one stable vocabulary instead.
//! This crate provides the pieces that do the converting:
//!
//! - **`keymap`** – [`VirtualKeyCode`] and the ordered [`KeyCodeTable`]s that
//!   map native key codes to it and back.
//!
//! - **`domain`** – stateful pieces: the [`ModifierState`] bit mask, the
//!   [`LocaleCache`] of loaded keyboard layouts (Windows), dead-key
//!   composition and the [`PointerButtonMapper`] (X11).
//!
//! - **`text`** – UTF-8 → UTF-16 conversion and per-unit character classes.
//!
//! - **`wire`** – the [`EventMarshaller`] that turns raw RECORD data into typed
//!   key, button and motion events.

pub mod domain;
pub mod keymap;
pub mod text;
pub mod wire;

// Re-export the most-used types at the crate root so callers can write
// `uiohook_core::ModifierMask` instead of `uiohook_core::domain::modifiers::ModifierMask`.
pub use domain::buttons::{PointerButtonMapper, PointerMappingSource};
pub use domain::locale::{LayoutId, LayoutPlatform, LocaleCache, LocaleError, SnapshotError};
pub use domain::modifiers::{InputStateProbe, ModifierMask, ModifierState};
pub use keymap::{KeyCodeTable, TranslationEntry, VirtualKeyCode};
pub use text::{CharClass, EncodeError};
pub use wire::{EventMarshaller, MarshalledEvent, TimestampSource};
