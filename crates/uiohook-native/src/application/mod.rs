//! Application layer: the per-backend helper contexts.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure translation rules in `uiohook-core`) and the infrastructure (Win32,
//! Xlib).  The helpers in this layer:
//!
//! - **Orchestrate** core objects (key tables, the modifier mask, the layout
//!   cache, the button mapper) to answer one question from the hook, e.g.
//!   "what text does this key stroke produce?".
//! - **Depend on abstractions** ([`uiohook_core::LayoutPlatform`],
//!   [`record::XPlatform`]) rather than concrete OS bindings, so every code
//!   path runs against in-memory fakes in tests.
//! - **Contain no OS calls**.
//!
//! # Sub-modules
//!
//! - **`helper`**       – The [`InputHelper`] trait both backends implement.
//!
//! - **`message_hook`** – [`MessageHookHelper`]: Windows virtual-key
//!   translation, the keyboard layout cache and dead-key composition.
//!
//! - **`record`**       – [`RecordHelper`]: X11 key-name binding, RECORD event
//!   marshalling, pointer button mapping and input-method text lookup.
//!
//! Each helper is a context object owned by the hook thread.  `load` seeds
//! its state, `unload` releases it, and every query in between runs
//! synchronously on that same thread.

pub mod helper;
pub mod message_hook;
pub mod record;

pub use helper::InputHelper;
pub use message_hook::{KeyStroke, MessageHookHelper};
pub use record::{RecordHelper, RecordOptions, XPlatform};
