//! Platform adapters: the OS side of the helper ports.
//!
//! Each backend implements the ports the application layer depends on:
//!
//! | Port                                   | Windows          | X11             | Tests                |
//! |----------------------------------------|------------------|-----------------|----------------------|
//! | [`uiohook_core::LayoutPlatform`]       | `WindowsPlatform`| –               | `MockLayoutPlatform` |
//! | [`crate::application::XPlatform`]      | –                | `X11Platform`   | `MockXPlatform`      |
//! | [`uiohook_core::InputStateProbe`]      | `WindowsPlatform`| `X11Platform`   | both mocks           |
//!
//! # Platform support
//!
//! - **Windows**: `windows.rs`, compiled on `target_os = "windows"`.
//! - **Linux/X11**: `x11.rs`, compiled with the `x11-backend` feature.
//! - **All targets**: `mock.rs`, used by unit and integration tests and by
//!   the probe binary's `--mock` mode.

use thiserror::Error;

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(all(target_os = "linux", feature = "x11-backend"))]
pub mod x11;

/// Errors raised while opening or querying a platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The X display could not be opened.
    #[error("could not open X display {0:?}")]
    DisplayUnavailable(String),

    /// The server returned no keyboard description.
    #[error("keyboard description unavailable")]
    KeyboardDescription,

    /// The mock was told to fail this query.
    #[error("simulated failure: {0}")]
    Simulated(&'static str),
}
