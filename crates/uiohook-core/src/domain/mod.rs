//! Stateful translation entities.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain**.  Domain code:
//!
//! - Contains the core rules of the system.
//! - Has **no** imports from OS APIs or native libraries.
//! - Can be compiled and tested on any platform without any external setup.
//!
//! Here that means the modifier mask, the keyboard layout cache and its
//! descriptor reader, dead-key composition and pointer button mapping.  The
//! OS is only ever reached through the traits these modules declare.

/// Pointer button remapping (extension-based backend).
pub mod buttons;

/// Keyboard layout cache (message-hook backend).
pub mod locale;

/// Modifier, lock-key and mouse-button mask.
pub mod modifiers;
