//! Infrastructure layer for the translation helpers.
//!
//! Contains OS-facing adapters: the Win32 and Xlib platforms behind the
//! helper ports, their in-memory mocks, and file-system configuration.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `uiohook_core`, but MUST NOT be imported by the domain layer.

pub mod platform;
pub mod storage;
