//! X11 key-name translation table for the extension-based backend.
//!
//! X11 keycodes are assigned by the server's keyboard description and differ
//! between evdev, kbd and vendor drivers.  What *is* stable is the XKB key name:
//! the 4-character label of a physical position (`"AC01"` is the key left of
//! `"AC02"`, i.e. `A` on a US board; `"RTRN"` is Return; `"KPEN"` keypad Enter).
//!
//! This module therefore ships a table of `(VirtualKeyCode, name)` rows and
//! binds the native column at load time with [`bind_key_names`], from the
//! `(keycode, name)` pairs the server reports.  Rows whose name the server does
//! not report keep native code 0, which never matches a lookup.

use super::vcode::VirtualKeyCode::*;
use super::{KeyCodeTable, TranslationEntry, VirtualKeyCode, NO_NATIVE_MAPPING};

/// Length of an XKB key name (`XkbKeyNameLength`).
pub const KEY_NAME_LENGTH: usize = 4;

/// A NUL-padded XKB key name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyName(pub [u8; KEY_NAME_LENGTH]);

impl KeyName {
    /// Builds a key name from up to four ASCII bytes; the rest are NUL.
    pub const fn new(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut out = [0u8; KEY_NAME_LENGTH];
        let mut i = 0;
        while i < bytes.len() && i < KEY_NAME_LENGTH {
            out[i] = bytes[i];
            i += 1;
        }
        Self(out)
    }

    /// Compares like `strncmp(a, b, 4) == 0`: bytes after the first NUL are ignored.
    pub fn matches(&self, raw: &[u8; KEY_NAME_LENGTH]) -> bool {
        for (a, b) in self.0.iter().zip(raw.iter()) {
            if a != b {
                return false;
            }
            if *a == 0 {
                return true;
            }
        }
        true
    }

    /// The name without trailing NULs, for logging.
    pub fn as_str(&self) -> &str {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(KEY_NAME_LENGTH);
        std::str::from_utf8(&self.0[..end]).unwrap_or("")
    }
}

/// One row of the name table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedKey {
    pub vcode: VirtualKeyCode,
    pub name: KeyName,
}

const fn key(vcode: VirtualKeyCode, name: &str) -> NamedKey {
    NamedKey {
        vcode,
        name: KeyName::new(name),
    }
}

/// `(VirtualKeyCode, XKB name)` rows in lookup order.
pub const XKB_NAME_TABLE: &[NamedKey] = &[
    key(Escape, "ESC"),
    key(F1, "FK01"),
    key(F2, "FK02"),
    key(F3, "FK03"),
    key(F4, "FK04"),
    key(F5, "FK05"),
    key(F6, "FK06"),
    key(F7, "FK07"),
    key(F8, "FK08"),
    key(F9, "FK09"),
    key(F10, "FK10"),
    key(F11, "FK11"),
    key(F12, "FK12"),
    key(F13, "FK13"),
    key(F14, "FK14"),
    key(F15, "FK15"),
    key(F16, "FK16"),
    key(F17, "FK17"),
    key(F18, "FK18"),
    key(F19, "FK19"),
    key(F20, "FK20"),
    key(F21, "FK21"),
    key(F22, "FK22"),
    key(F23, "FK23"),
    key(F24, "FK24"),
    key(BackQuote, "TLDE"),
    key(Digit1, "AE01"),
    key(Digit2, "AE02"),
    key(Digit3, "AE03"),
    key(Digit4, "AE04"),
    key(Digit5, "AE05"),
    key(Digit6, "AE06"),
    key(Digit7, "AE07"),
    key(Digit8, "AE08"),
    key(Digit9, "AE09"),
    key(Digit0, "AE10"),
    key(Minus, "AE11"),
    key(Equals, "AE12"),
    key(Backspace, "BKSP"),
    key(Tab, "TAB"),
    key(KeyQ, "AD01"),
    key(KeyW, "AD02"),
    key(KeyE, "AD03"),
    key(KeyR, "AD04"),
    key(KeyT, "AD05"),
    key(KeyY, "AD06"),
    key(KeyU, "AD07"),
    key(KeyI, "AD08"),
    key(KeyO, "AD09"),
    key(KeyP, "AD10"),
    key(OpenBracket, "AD11"),
    key(CloseBracket, "AD12"),
    key(Enter, "RTRN"),
    key(CapsLock, "CAPS"),
    key(KeyA, "AC01"),
    key(KeyS, "AC02"),
    key(KeyD, "AC03"),
    key(KeyF, "AC04"),
    key(KeyG, "AC05"),
    key(KeyH, "AC06"),
    key(KeyJ, "AC07"),
    key(KeyK, "AC08"),
    key(KeyL, "AC09"),
    key(Semicolon, "AC10"),
    key(Quote, "AC11"),
    key(BackSlash, "AC12"),
    key(BackSlash, "BKSL"),
    key(ShiftL, "LFSH"),
    key(KeyZ, "AB01"),
    key(KeyX, "AB02"),
    key(KeyC, "AB03"),
    key(KeyV, "AB04"),
    key(KeyB, "AB05"),
    key(KeyN, "AB06"),
    key(KeyM, "AB07"),
    key(Comma, "AB08"),
    key(Period, "AB09"),
    key(Slash, "AB10"),
    key(ShiftR, "RTSH"),
    key(Oem102, "LSGT"),
    key(AltL, "LALT"),
    key(ControlL, "LCTL"),
    key(MetaL, "LWIN"),
    key(MetaL, "LMTA"),
    key(Space, "SPCE"),
    key(MetaR, "RWIN"),
    key(MetaR, "RMTA"),
    key(ControlR, "RCTL"),
    key(AltR, "RALT"),
    key(ContextMenu, "COMP"),
    key(ContextMenu, "MENU"),
    key(PrintScreen, "PRSC"),
    key(ScrollLock, "SCLK"),
    key(Pause, "PAUS"),
    key(Insert, "INS"),
    key(Home, "HOME"),
    key(PageUp, "PGUP"),
    key(Delete, "DELE"),
    key(End, "END"),
    key(PageDown, "PGDN"),
    key(Up, "UP"),
    key(Left, "LEFT"),
    key(Down, "DOWN"),
    key(Right, "RGHT"),
    key(NumLock, "NMLK"),
    key(NumpadDivide, "KPDV"),
    key(NumpadMultiply, "KPMU"),
    key(NumpadSubtract, "KPSU"),
    key(NumpadSubtract, "KPSU"), // repeated row, never reached
    key(Numpad7, "KP7"),
    key(Numpad8, "KP8"),
    key(Numpad9, "KP9"),
    key(NumpadAdd, "KPAD"),
    key(Numpad4, "KP4"),
    key(Numpad5, "KP5"),
    key(Numpad6, "KP6"),
    key(Numpad1, "KP1"),
    key(Numpad2, "KP2"),
    key(Numpad3, "KP3"),
    key(NumpadEnter, "KPEN"),
    key(Numpad0, "KP0"),
    key(NumpadDecimal, "KPDL"),
    key(NumpadEquals, "KPEQ"),
    key(KatakanaHiragana, "HKTG"),
    key(Underscore, "AB11"),
    key(Convert, "HENK"),
    key(Nonconvert, "MUHE"),
    key(Yen, "AE13"),
    key(Katakana, "KATA"),
    key(Hiragana, "HIRA"),
    key(JpComma, "JPCM"),
    key(Hangul, "HNGL"),
    key(Hanja, "HJCV"),
    key(VolumeMute, "MUTE"),
    key(VolumeDown, "VOL-"),
    key(VolumeUp, "VOL+"),
    key(Power, "POWR"),
    key(Stop, "STOP"),
    key(Again, "AGAI"),
    key(Props, "PROP"),
    key(Undo, "UNDO"),
    key(Front, "FRNT"),
    key(Copy, "COPY"),
    key(Open, "OPEN"),
    key(Paste, "PAST"),
    key(Find, "FIND"),
    key(Cut, "CUT"),
    key(Help, "HELP"),
    key(SwitchVideoMode, "OUTP"),
    key(KeyboardLightToggle, "KITG"),
    key(KeyboardLightDown, "KIDN"),
    key(KeyboardLightUp, "KIUP"),
    key(LineFeed, "LNFD"),
    key(Macro, "I120"),
    key(VolumeMute, "I121"),
    key(VolumeDown, "I122"),
    key(VolumeUp, "I123"),
    key(Power, "I124"),
    key(NumpadEquals, "I125"),
    key(NumpadPlusMinus, "I126"),
    key(Pause, "I127"),
    key(Scale, "I128"),
    key(NumpadSeparator, "I129"),
    key(Hangul, "I130"),
    key(Hanja, "I131"),
    key(Yen, "I132"),
    key(MetaL, "I133"),
    key(MetaR, "I134"),
    key(ContextMenu, "I135"),
    key(Stop, "I136"),
    key(Again, "I137"),
    key(Props, "I138"),
    key(Undo, "I139"),
    key(Front, "I140"),
    key(Copy, "I141"),
    key(Open, "I142"),
    key(Paste, "I143"),
    key(Find, "I144"),
    key(Cut, "I145"),
    key(Help, "I146"),
    key(ContextMenu, "I147"),
    key(AppCalculator, "I148"),
    key(Setup, "I149"),
    key(Sleep, "I150"),
    key(Wake, "I151"),
    key(File, "I152"),
    key(SendFile, "I153"),
    key(DeleteFile, "I154"),
    key(ModeChange, "I155"),
    key(App1, "I156"),
    key(App2, "I157"),
    key(AppBrowser, "I158"),
    key(MsDos, "I159"),
    key(Lock, "I160"),
    key(RotateDisplay, "I161"),
    key(CycleWindows, "I162"),
    key(AppMail, "I163"),
    key(BrowserFavorites, "I164"),
    key(Computer, "I165"),
    key(BrowserBack, "I166"),
    key(BrowserForward, "I167"),
    key(MediaClose, "I168"),
    key(MediaEject, "I169"),
    key(MediaEjectClose, "I170"),
    key(MediaNext, "I171"),
    key(MediaPlay, "I172"),
    key(MediaPrevious, "I173"),
    key(MediaStop, "I174"),
    key(MediaRecord, "I175"),
    key(MediaRewind, "I176"),
    key(Phone, "I177"),
    key(Iso, "I178"),
    key(Config, "I179"),
    key(BrowserHome, "I180"),
    key(BrowserRefresh, "I181"),
    key(Exit, "I182"),
    key(Move, "I183"),
    key(Edit, "I184"),
    key(ScrollUp, "I185"),
    key(ScrollDown, "I186"),
    key(NumpadOpenParenthesis, "I187"),
    key(NumpadCloseParenthesis, "I188"),
    key(New, "I189"),
    key(Redo, "I190"),
    key(F13, "I191"),
    key(F14, "I192"),
    key(F15, "I193"),
    key(F16, "I194"),
    key(F17, "I195"),
    key(F18, "I196"),
    key(F19, "I197"),
    key(F20, "I198"),
    key(F21, "I199"),
    key(F22, "I200"),
    key(F23, "I201"),
    key(F24, "I202"),
    key(PlayCd, "I208"),
    key(PauseCd, "I209"),
    key(App3, "I210"),
    key(App4, "I211"),
    key(Dashboard, "I212"),
    key(Suspend, "I213"),
    key(Close, "I214"),
    key(Play, "I215"),
    key(FastForward, "I216"),
    key(BassBoost, "I217"),
    key(Print, "I218"),
    key(Hp, "I219"),
    key(Camera, "I220"),
    key(Sound, "I221"),
    key(Question, "I222"),
    key(Email, "I223"),
    key(Chat, "I224"),
    key(BrowserSearch, "I225"),
    key(Connect, "I226"),
    key(Finance, "I227"),
    key(Sport, "I228"),
    key(Shop, "I229"),
    key(AltErase, "I230"),
    key(Cancel, "I231"),
    key(BrightnessDown, "I232"),
    key(BrightnessUp, "I233"),
    key(Media, "I234"),
    key(SwitchVideoMode, "I235"),
    key(KeyboardLightToggle, "I236"),
    key(KeyboardLightDown, "I237"),
    key(KeyboardLightUp, "I238"),
    key(Send, "I239"),
    key(Reply, "I240"),
    key(ForwardMail, "I241"),
    key(Save, "I242"),
    key(Documents, "I243"),
    key(Battery, "I244"),
    key(Bluetooth, "I245"),
    key(Wlan, "I246"),
    key(Uwb, "I247"),
    key(X11Unknown, "I248"),
    key(VideoNext, "I249"),
    key(VideoPrevious, "I250"),
    key(BrightnessCycle, "I251"),
    key(BrightnessAuto, "I252"),
    key(DisplayOff, "I253"),
    key(Wwan, "I254"),
    key(RfKill, "I255"),
];

/// Binds [`XKB_NAME_TABLE`] to the keycodes of a concrete server.
///
/// `names` yields `(keycode, raw name)` pairs in ascending keycode order.  Every
/// row whose name matches is bound, and a later keycode with the same name
/// overwrites an earlier one.
pub fn bind_key_names<I>(names: I) -> KeyCodeTable
where
    I: IntoIterator<Item = (u32, [u8; KEY_NAME_LENGTH])>,
{
    let mut entries: Vec<TranslationEntry> = XKB_NAME_TABLE
        .iter()
        .map(|row| TranslationEntry::new(row.vcode, NO_NATIVE_MAPPING))
        .collect();

    for (keycode, raw) in names {
        for (entry, row) in entries.iter_mut().zip(XKB_NAME_TABLE) {
            if row.name.matches(&raw) {
                entry.native = keycode;
            }
        }
    }

    let bound = entries.iter().filter(|e| e.native != NO_NATIVE_MAPPING).count();
    tracing::debug!(bound, total = entries.len(), "bound XKB key names");

    KeyCodeTable::from_entries(entries)
}
