//! Xlib implementation of the RECORD backend's platform port.
//!
//! Owns a private display connection, separate from the one the RECORD
//! context reads from, so queries made here never interleave with the
//! recorded data stream.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Xlib FFI calls.  All
//! `unsafe` blocks are annotated with `// SAFETY:` comments.  Every Xlib
//! resource acquired here is wrapped in an owner type that releases it on
//! drop.

#![cfg(all(target_os = "linux", feature = "x11-backend"))]

use std::ffi::CString;
use std::os::raw::{c_char, c_int, c_uint, c_ulong};
use std::ptr;

use x11::xlib;

use uiohook_core::domain::modifiers::{LockIndicators, ModifierKey, PointerState};
use uiohook_core::keymap::x11_xkb::KEY_NAME_LENGTH;
use uiohook_core::wire::KeyEvent;
use uiohook_core::{InputStateProbe, ModifierMask, PointerMappingSource};

use super::PlatformError;
use crate::application::XPlatform;

const XKB_USE_CORE_KBD: c_uint = 0x0100;
const XKB_ALL_COMPONENTS_MASK: c_uint = 0x7F;
const SUCCESS: c_int = 0;

const XIM_PREEDIT_NOTHING: c_ulong = 0x0008;
const XIM_STATUS_NOTHING: c_ulong = 0x0400;
const XN_INPUT_STYLE: &[u8] = b"inputStyle\0";
const XN_CLIENT_WINDOW: &[u8] = b"clientWindow\0";
const XN_FOCUS_WINDOW: &[u8] = b"focusWindow\0";

// Core pointer-query mask bits.
const SHIFT_MASK: c_uint = 1 << 0;
const CONTROL_MASK: c_uint = 1 << 2;
const MOD1_MASK: c_uint = 1 << 3;
const MOD4_MASK: c_uint = 1 << 6;
const BUTTON_MASKS: [(c_uint, ModifierMask); 5] = [
    (1 << 8, ModifierMask::BUTTON1),
    (1 << 9, ModifierMask::BUTTON2),
    (1 << 10, ModifierMask::BUTTON3),
    (1 << 11, ModifierMask::BUTTON4),
    (1 << 12, ModifierMask::BUTTON5),
];

/// The keysym whose key code stands for each modifier key.
const fn keysym(key: ModifierKey) -> xlib::KeySym {
    match key {
        ModifierKey::ShiftL => 0xFFE1,
        ModifierKey::ShiftR => 0xFFE2,
        ModifierKey::ControlL => 0xFFE3,
        ModifierKey::ControlR => 0xFFE4,
        ModifierKey::AltL => 0xFFE9,
        ModifierKey::AltR => 0xFFEA,
        ModifierKey::MetaL => 0xFFEB,
        ModifierKey::MetaR => 0xFFEC,
    }
}

// ── Owned Xlib resources ──────────────────────────────────────────────────────

/// An open input method.  Closed on drop.
#[derive(Debug)]
pub struct InputMethod(xlib::XIM);

impl Drop for InputMethod {
    fn drop(&mut self) {
        // SAFETY: the XIM came from a successful XOpenIM and is closed once.
        unsafe { xlib::XCloseIM(self.0) };
    }
}

/// An input context.  Destroyed on drop.
#[derive(Debug)]
pub struct InputContext(xlib::XIC);

impl Drop for InputContext {
    fn drop(&mut self) {
        // SAFETY: the XIC came from a successful XCreateIC and is destroyed
        // once, before its input method (see `XPlatform::InputContext`).
        unsafe { xlib::XDestroyIC(self.0) };
    }
}

/// A server keyboard description.  Freed on drop.
struct KeyboardDesc(xlib::XkbDescPtr);

impl Drop for KeyboardDesc {
    fn drop(&mut self) {
        // SAFETY: the pointer came from XkbGetKeyboard and is freed once.
        unsafe { xlib::XkbFreeKeyboard(self.0, 0, xlib::True) };
    }
}

// ── Platform ──────────────────────────────────────────────────────────────────

/// A private Xlib display connection.
#[derive(Debug)]
pub struct X11Platform {
    display: *mut xlib::Display,
}

impl X11Platform {
    /// Opens `name`, or `$DISPLAY` when `None`.
    pub fn open(name: Option<&str>) -> Result<Self, PlatformError> {
        let label = name.unwrap_or("$DISPLAY").to_string();
        let c_name = name
            .map(CString::new)
            .transpose()
            .map_err(|_| PlatformError::DisplayUnavailable(label.clone()))?;

        // SAFETY: a null name selects $DISPLAY; otherwise the CString outlives the call.
        let display = unsafe {
            xlib::XOpenDisplay(c_name.as_ref().map_or(ptr::null(), |n| n.as_ptr()))
        };
        if display.is_null() {
            return Err(PlatformError::DisplayUnavailable(label));
        }
        tracing::debug!(display = %label, "opened helper display");
        Ok(Self { display })
    }

    fn root(&self) -> xlib::Window {
        // SAFETY: `display` is open for the lifetime of `self`.
        unsafe { xlib::XDefaultRootWindow(self.display) }
    }

    fn x_key_event(&self, key: &KeyEvent) -> xlib::XKeyEvent {
        let p = &key.pointer;
        xlib::XKeyEvent {
            type_: xlib::KeyPress,
            serial: 0,
            send_event: xlib::False,
            display: self.display,
            window: xlib::Window::from(p.window),
            root: xlib::Window::from(p.root),
            subwindow: xlib::Window::from(p.subwindow),
            time: xlib::Time::from(p.time),
            x: p.x,
            y: p.y,
            x_root: p.x_root,
            y_root: p.y_root,
            state: c_uint::from(p.state),
            keycode: c_uint::from(key.keycode),
            same_screen: if p.same_screen { xlib::True } else { xlib::False },
        }
    }
}

impl Drop for X11Platform {
    fn drop(&mut self) {
        // SAFETY: `display` came from XOpenDisplay and is closed once.
        unsafe { xlib::XCloseDisplay(self.display) };
    }
}

impl InputStateProbe for X11Platform {
    fn lock_indicators(&self) -> Option<LockIndicators> {
        let mut leds: c_uint = 0;
        // SAFETY: `leds` is a valid out-pointer.
        let status = unsafe { xlib::XkbGetIndicatorState(self.display, XKB_USE_CORE_KBD, &mut leds) };
        (status == SUCCESS).then(|| LockIndicators::from_led_bits(leds))
    }

    fn pointer_state(&self) -> Option<PointerState> {
        let (mut root, mut child) = (0, 0);
        let (mut root_x, mut root_y, mut win_x, mut win_y) = (0, 0, 0, 0);
        let mut mask: c_uint = 0;
        // SAFETY: every out-pointer is a valid local.
        let ok = unsafe {
            xlib::XQueryPointer(
                self.display,
                self.root(),
                &mut root,
                &mut child,
                &mut root_x,
                &mut root_y,
                &mut win_x,
                &mut win_y,
                &mut mask,
            )
        };
        if ok == xlib::False {
            return None;
        }

        let buttons = BUTTON_MASKS
            .iter()
            .filter(|(bit, _)| mask & bit != 0)
            .fold(ModifierMask::EMPTY, |acc, &(_, b)| acc | b);
        Some(PointerState {
            shift: mask & SHIFT_MASK != 0,
            control: mask & CONTROL_MASK != 0,
            alt: mask & MOD1_MASK != 0,
            meta: mask & MOD4_MASK != 0,
            buttons,
        })
    }

    fn is_key_down(&self, key: ModifierKey) -> bool {
        let mut keymap = [0 as c_char; 32];
        // SAFETY: XQueryKeymap writes exactly 32 bytes.
        unsafe { xlib::XQueryKeymap(self.display, keymap.as_mut_ptr()) };
        // SAFETY: `display` is open.
        let code = usize::from(unsafe { xlib::XKeysymToKeycode(self.display, keysym(key)) });
        code != 0 && (keymap[code / 8] as u8) & (1 << (code % 8)) != 0
    }
}

impl PointerMappingSource for X11Platform {
    fn pointer_mapping(&self, out: &mut [u8]) -> Option<usize> {
        let capacity = c_int::try_from(out.len()).unwrap_or(c_int::MAX);
        // SAFETY: the server writes at most `capacity` entries.
        let len = unsafe { xlib::XGetPointerMapping(self.display, out.as_mut_ptr(), capacity) };
        usize::try_from(len).ok()
    }
}

impl XPlatform for X11Platform {
    type InputMethod = InputMethod;
    type InputContext = InputContext;

    fn key_names(&self) -> Result<Vec<(u32, [u8; KEY_NAME_LENGTH])>, PlatformError> {
        // SAFETY: `display` is open; a null result is checked below.
        let desc = unsafe {
            xlib::XkbGetKeyboard(self.display, XKB_ALL_COMPONENTS_MASK, XKB_USE_CORE_KBD)
        };
        if desc.is_null() {
            return Err(PlatformError::KeyboardDescription);
        }
        let desc = KeyboardDesc(desc);

        // SAFETY: `desc` is non-null and owned until the end of this scope;
        // `names` and `keys` are checked before use and `keys` holds an entry
        // for every code up to `max_key_code`.
        unsafe {
            let desc = &*desc.0;
            if desc.names.is_null() || (*desc.names).keys.is_null() {
                return Err(PlatformError::KeyboardDescription);
            }
            let keys = (*desc.names).keys;

            let names = (desc.min_key_code..desc.max_key_code)
                .map(|code| {
                    let raw = (*keys.add(usize::from(code))).name;
                    (u32::from(code), raw.map(|c| c as u8))
                })
                .collect();
            Ok(names)
        }
    }

    fn set_detectable_auto_repeat(&mut self, enabled: bool) -> bool {
        let mut supported = xlib::False;
        let detectable = if enabled { xlib::True } else { xlib::False };
        // SAFETY: `supported` is a valid out-pointer.
        unsafe { xlib::XkbSetDetectableAutoRepeat(self.display, detectable, &mut supported) };
        supported != xlib::False
    }

    fn open_input_method(&mut self, locale_modifiers: &str) -> Option<InputMethod> {
        let Ok(modifiers) = CString::new(locale_modifiers) else {
            tracing::warn!(modifiers = %locale_modifiers, "locale modifiers contain NUL");
            return None;
        };
        // SAFETY: `modifiers` outlives both calls; null database and resource
        // names are permitted.
        let im = unsafe {
            xlib::XSetLocaleModifiers(modifiers.as_ptr());
            xlib::XOpenIM(self.display, ptr::null_mut(), ptr::null_mut(), ptr::null_mut())
        };
        (!im.is_null()).then_some(InputMethod(im))
    }

    fn create_input_context(&mut self, method: &InputMethod) -> Option<InputContext> {
        let root = self.root();
        // SAFETY: `method` is open; the variadic list is name/value pairs
        // terminated by a null name, as XCreateIC requires.
        let ic = unsafe {
            xlib::XCreateIC(
                method.0,
                XN_INPUT_STYLE.as_ptr() as *const c_char,
                XIM_PREEDIT_NOTHING | XIM_STATUS_NOTHING,
                XN_CLIENT_WINDOW.as_ptr() as *const c_char,
                root,
                XN_FOCUS_WINDOW.as_ptr() as *const c_char,
                root,
                ptr::null::<c_char>(),
            )
        };
        (!ic.is_null()).then_some(InputContext(ic))
    }

    fn lookup_utf8(&mut self, context: &InputContext, key: &KeyEvent, out: &mut [u8]) -> usize {
        let mut event = self.x_key_event(key);
        let mut keysym: xlib::KeySym = 0;
        let mut status: c_int = 0;
        let capacity = c_int::try_from(out.len()).unwrap_or(c_int::MAX);
        // SAFETY: `out` holds `capacity` bytes; `event` is a complete key event.
        let len = unsafe {
            xlib::Xutf8LookupString(
                context.0,
                &mut event,
                out.as_mut_ptr().cast(),
                capacity,
                &mut keysym,
                &mut status,
            )
        };
        usize::try_from(len).unwrap_or(0).min(out.len())
    }

    fn lookup_latin1(&mut self, key: &KeyEvent, out: &mut [u8]) -> usize {
        let mut event = self.x_key_event(key);
        let mut keysym: xlib::KeySym = 0;
        let capacity = c_int::try_from(out.len()).unwrap_or(c_int::MAX);
        // SAFETY: `out` holds `capacity` bytes; a null compose status is allowed.
        let len = unsafe {
            xlib::XLookupString(
                &mut event,
                out.as_mut_ptr().cast(),
                capacity,
                &mut keysym,
                ptr::null_mut(),
            )
        };
        usize::try_from(len).unwrap_or(0).min(out.len())
    }
}
