//! Windows virtual-key translation table for the message-hook backend.
//!
//! Reference: Windows Virtual-Key Codes (winuser.h).
//!
//! # How this table works
//!
//! Unlike a dense 256-entry array indexed by VK code, this is an *ordered
//! list* of `(VirtualKeyCode, VK)` rows scanned first-match.  Ordering matters
//! in two places:
//!
//! - `VK_RETURN` is listed for both `Enter` and `NumpadEnter`.  The forward
//!   scan always lands on `Enter`; [`super::KeyCodeTable::to_virtual`] upgrades
//!   it to `NumpadEnter` when the hook reports the extended-key flag.
//! - The generic modifier constants (`VK_SHIFT`, `VK_CONTROL`, `VK_MENU`) are
//!   listed *after* their left-specific twins, so the reverse scan always
//!   prefers `VK_LSHIFT`, `VK_LCONTROL` and `VK_LMENU`.
//!
//! `VK_KANA`/`VK_HANGUL` (0x15) and `VK_HANJA`/`VK_KANJI` (0x19) share a value;
//! the first-listed virtual code wins the forward scan.

use super::vcode::VirtualKeyCode::*;
use super::{TranslationEntry, VirtualKeyCode};

const fn row(vcode: VirtualKeyCode, vk: u32) -> TranslationEntry {
    TranslationEntry::new(vcode, vk)
}

/// `(VirtualKeyCode, VK)` rows in lookup order.
pub const VK_TABLE: &[TranslationEntry] = &[
    row(Cancel, 0x03), // VK_CANCEL
    row(Backspace, 0x08), // VK_BACK
    row(Tab, 0x09), // VK_TAB
    row(NumpadClear, 0x0C), // VK_CLEAR
    row(NumpadClear, 0xFE), // VK_OEM_CLEAR
    row(Enter, 0x0D), // VK_RETURN
    row(NumpadEnter, 0x0D), // VK_RETURN
    row(ShiftL, 0xA0), // VK_LSHIFT
    row(ShiftR, 0xA1), // VK_RSHIFT
    row(ShiftL, 0x10), // VK_SHIFT
    row(ControlL, 0xA2), // VK_LCONTROL
    row(ControlR, 0xA3), // VK_RCONTROL
    row(ControlL, 0x11), // VK_CONTROL
    row(AltL, 0xA4), // VK_LMENU
    row(AltR, 0xA5), // VK_RMENU
    row(AltL, 0x12), // VK_MENU
    row(Pause, 0x13), // VK_PAUSE
    row(CapsLock, 0x14), // VK_CAPITAL
    row(Kana, 0x15), // VK_KANA
    row(Hangul, 0x15), // VK_HANGUL
    row(ImeOn, 0x16), // VK_IME_ON
    row(Junja, 0x17), // VK_JUNJA
    row(Final, 0x18), // VK_FINAL
    row(Hanja, 0x19), // VK_HANJA
    row(Kanji, 0x19), // VK_KANJI
    row(ImeOff, 0x1A), // VK_IME_OFF
    row(Escape, 0x1B), // VK_ESCAPE
    row(Convert, 0x1C), // VK_CONVERT
    row(Nonconvert, 0x1D), // VK_NONCONVERT
    row(Accept, 0x1E), // VK_ACCEPT
    row(ModeChange, 0x1F), // VK_MODECHANGE
    row(Space, 0x20), // VK_SPACE
    row(PageUp, 0x21), // VK_PRIOR
    row(PageDown, 0x22), // VK_NEXT
    row(End, 0x23), // VK_END
    row(Home, 0x24), // VK_HOME
    row(Left, 0x25), // VK_LEFT
    row(Up, 0x26), // VK_UP
    row(Right, 0x27), // VK_RIGHT
    row(Down, 0x28), // VK_DOWN
    row(Select, 0x29), // VK_SELECT
    row(Print, 0x2A), // VK_PRINT
    row(Execute, 0x2B), // VK_EXECUTE
    row(PrintScreen, 0x2C), // VK_SNAPSHOT
    row(Insert, 0x2D), // VK_INSERT
    row(Delete, 0x2E), // VK_DELETE
    row(Help, 0x2F), // VK_HELP
    row(Digit0, 0x30), // '0'
    row(Digit1, 0x31), // '1'
    row(Digit2, 0x32), // '2'
    row(Digit3, 0x33), // '3'
    row(Digit4, 0x34), // '4'
    row(Digit5, 0x35), // '5'
    row(Digit6, 0x36), // '6'
    row(Digit7, 0x37), // '7'
    row(Digit8, 0x38), // '8'
    row(Digit9, 0x39), // '9'
    row(KeyA, 0x41), // 'A'
    row(KeyB, 0x42), // 'B'
    row(KeyC, 0x43), // 'C'
    row(KeyD, 0x44), // 'D'
    row(KeyE, 0x45), // 'E'
    row(KeyF, 0x46), // 'F'
    row(KeyG, 0x47), // 'G'
    row(KeyH, 0x48), // 'H'
    row(KeyI, 0x49), // 'I'
    row(KeyJ, 0x4A), // 'J'
    row(KeyK, 0x4B), // 'K'
    row(KeyL, 0x4C), // 'L'
    row(KeyM, 0x4D), // 'M'
    row(KeyN, 0x4E), // 'N'
    row(KeyO, 0x4F), // 'O'
    row(KeyP, 0x50), // 'P'
    row(KeyQ, 0x51), // 'Q'
    row(KeyR, 0x52), // 'R'
    row(KeyS, 0x53), // 'S'
    row(KeyT, 0x54), // 'T'
    row(KeyU, 0x55), // 'U'
    row(KeyV, 0x56), // 'V'
    row(KeyW, 0x57), // 'W'
    row(KeyX, 0x58), // 'X'
    row(KeyY, 0x59), // 'Y'
    row(KeyZ, 0x5A), // 'Z'
    row(MetaL, 0x5B), // VK_LWIN
    row(MetaR, 0x5C), // VK_RWIN
    row(ContextMenu, 0x5D), // VK_APPS
    row(Sleep, 0x5F), // VK_SLEEP
    row(Numpad0, 0x60), // VK_NUMPAD0
    row(Numpad1, 0x61), // VK_NUMPAD1
    row(Numpad2, 0x62), // VK_NUMPAD2
    row(Numpad3, 0x63), // VK_NUMPAD3
    row(Numpad4, 0x64), // VK_NUMPAD4
    row(Numpad5, 0x65), // VK_NUMPAD5
    row(Numpad6, 0x66), // VK_NUMPAD6
    row(Numpad7, 0x67), // VK_NUMPAD7
    row(Numpad8, 0x68), // VK_NUMPAD8
    row(Numpad9, 0x69), // VK_NUMPAD9
    row(Numpad9, 0x69), // VK_NUMPAD9 (repeated row, never reached)
    row(NumpadMultiply, 0x6A), // VK_MULTIPLY
    row(NumpadAdd, 0x6B), // VK_ADD
    row(NumpadSeparator, 0x6C), // VK_SEPARATOR
    row(NumpadSubtract, 0x6D), // VK_SUBTRACT
    row(NumpadDecimal, 0x6E), // VK_DECIMAL
    row(NumpadDivide, 0x6F), // VK_DIVIDE
    row(F1, 0x70), // VK_F1
    row(F2, 0x71), // VK_F2
    row(F3, 0x72), // VK_F3
    row(F4, 0x73), // VK_F4
    row(F5, 0x74), // VK_F5
    row(F6, 0x75), // VK_F6
    row(F7, 0x76), // VK_F7
    row(F8, 0x77), // VK_F8
    row(F9, 0x78), // VK_F9
    row(F10, 0x79), // VK_F10
    row(F11, 0x7A), // VK_F11
    row(F12, 0x7B), // VK_F12
    row(F13, 0x7C), // VK_F13
    row(F14, 0x7D), // VK_F14
    row(F15, 0x7E), // VK_F15
    row(F16, 0x7F), // VK_F16
    row(F17, 0x80), // VK_F17
    row(F18, 0x81), // VK_F18
    row(F19, 0x82), // VK_F19
    row(F20, 0x83), // VK_F20
    row(F21, 0x84), // VK_F21
    row(F22, 0x85), // VK_F22
    row(F23, 0x86), // VK_F23
    row(F24, 0x87), // VK_F24
    row(NumLock, 0x90), // VK_NUMLOCK
    row(ScrollLock, 0x91), // VK_SCROLL
    row(NumpadEquals, 0x92), // Numpad =
    row(BrowserBack, 0xA6), // VK_BROWSER_BACK
    row(BrowserForward, 0xA7), // VK_BROWSER_FORWARD
    row(BrowserRefresh, 0xA8), // VK_BROWSER_REFRESH
    row(BrowserStop, 0xA9), // VK_BROWSER_STOP
    row(BrowserSearch, 0xAA), // VK_BROWSER_SEARCH
    row(BrowserFavorites, 0xAB), // VK_BROWSER_FAVORITES
    row(BrowserHome, 0xAC), // VK_BROWSER_HOME
    row(VolumeMute, 0xAD), // VK_VOLUME_MUTE
    row(VolumeDown, 0xAE), // VK_VOLUME_DOWN
    row(VolumeUp, 0xAF), // VK_VOLUME_UP
    row(MediaNext, 0xB0), // VK_MEDIA_NEXT_TRACK
    row(MediaPrevious, 0xB1), // VK_MEDIA_PREV_TRACK
    row(MediaStop, 0xB2), // VK_MEDIA_STOP
    row(MediaPlay, 0xB3), // VK_MEDIA_PLAY_PAUSE
    row(AppMail, 0xB4), // VK_LAUNCH_MAIL
    row(MediaSelect, 0xB5), // VK_LAUNCH_MEDIA_SELECT
    row(App1, 0xB6), // VK_LAUNCH_APP1
    row(App2, 0xB7), // VK_LAUNCH_APP2
    row(Semicolon, 0xBA), // VK_OEM_1
    row(Equals, 0xBB), // VK_OEM_PLUS
    row(Comma, 0xBC), // VK_OEM_COMMA
    row(Minus, 0xBD), // VK_OEM_MINUS
    row(Period, 0xBE), // VK_OEM_PERIOD
    row(Slash, 0xBF), // VK_OEM_2
    row(BackQuote, 0xC0), // VK_OEM_3
    row(OpenBracket, 0xDB), // VK_OEM_4
    row(BackSlash, 0xDC), // VK_OEM_5
    row(CloseBracket, 0xDD), // VK_OEM_6
    row(Quote, 0xDE), // VK_OEM_7
    row(Misc, 0xDF), // VK_OEM_8
    row(Oem102, 0xE2), // VK_OEM_102
    row(Process, 0xE5), // VK_PROCESSKEY
    row(Attn, 0xF6), // VK_ATTN
    row(CrSel, 0xF7), // VK_CRSEL
    row(ExSel, 0xF8), // VK_EXSEL
    row(EraseEof, 0xF9), // VK_EREOF
    row(Play, 0xFA), // VK_PLAY
    row(Zoom, 0xFB), // VK_ZOOM
    row(NoName, 0xFC), // VK_NONAME
    row(Pa1, 0xFD), // VK_PA1
];

/// Extended-key bit of `KBDLLHOOKSTRUCT::flags` (`LLKHF_EXTENDED`).
pub const LLKHF_EXTENDED: u32 = 0x01;

/// Returns `true` when the hook flags mark an extended key.
pub const fn is_extended(flags: u32) -> bool {
    flags & LLKHF_EXTENDED != 0
}
