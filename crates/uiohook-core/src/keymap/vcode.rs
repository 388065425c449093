//! The platform-independent virtual key vocabulary.
//!
//! Every native key identifier (a Windows virtual-key constant or an X11
//! keycode) is translated into a [`VirtualKeyCode`] at the capture boundary.
//! The numeric values are stable and shared with the event dispatch layer, so
//! a client callback sees the same code for "letter A" on every platform.
//!
//! # Why not reuse the Windows VK numbers?
//!
//! Many values *do* coincide with Windows VK constants (`KeyA = 0x41`,
//! `F1 = 0x70`) because that range is convenient and familiar.  Keys that
//! Windows cannot tell apart without extra context get their own values
//! instead: left and right modifiers are split (`ShiftL = 0xA010`,
//! `ShiftR = 0xB010`) and the numeric keypad Enter key is distinct from the
//! main Enter key.
//!
//! # The `Undefined` sentinel
//!
//! [`VirtualKeyCode::Undefined`] (0x0000) is returned whenever a native code
//! has no row in the translation table.  It is a value, not an error.

use serde::{Deserialize, Serialize};

/// Platform-independent identifier for a physical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u16)]
pub enum VirtualKeyCode {
    /// No mapping exists for the native key.
    Undefined = 0x0000,

    Escape = 0x001B,

    // Function Keys
    F1 = 0x0070,
    F2 = 0x0071,
    F3 = 0x0072,
    F4 = 0x0073,
    F5 = 0x0074,
    F6 = 0x0075,
    F7 = 0x0076,
    F8 = 0x0077,
    F9 = 0x0078,
    F10 = 0x0079,
    F11 = 0x007A,
    F12 = 0x007B,
    F13 = 0xF000,
    F14 = 0xF001,
    F15 = 0xF002,
    F16 = 0xF003,
    F17 = 0xF004,
    F18 = 0xF005,
    F19 = 0xF006,
    F20 = 0xF007,
    F21 = 0xF008,
    F22 = 0xF009,
    F23 = 0xF00A,
    F24 = 0xF00B,

    // Alphanumeric Zone
    BackQuote = 0x00C0,
    Digit0 = 0x0030,
    Digit1 = 0x0031,
    Digit2 = 0x0032,
    Digit3 = 0x0033,
    Digit4 = 0x0034,
    Digit5 = 0x0035,
    Digit6 = 0x0036,
    Digit7 = 0x0037,
    Digit8 = 0x0038,
    Digit9 = 0x0039,
    Minus = 0x002D,
    Equals = 0x003D,
    Backspace = 0x0008,
    Tab = 0x0009,
    CapsLock = 0x0014,
    KeyA = 0x0041,
    KeyB = 0x0042,
    KeyC = 0x0043,
    KeyD = 0x0044,
    KeyE = 0x0045,
    KeyF = 0x0046,
    KeyG = 0x0047,
    KeyH = 0x0048,
    KeyI = 0x0049,
    KeyJ = 0x004A,
    KeyK = 0x004B,
    KeyL = 0x004C,
    KeyM = 0x004D,
    KeyN = 0x004E,
    KeyO = 0x004F,
    KeyP = 0x0050,
    KeyQ = 0x0051,
    KeyR = 0x0052,
    KeyS = 0x0053,
    KeyT = 0x0054,
    KeyU = 0x0055,
    KeyV = 0x0056,
    KeyW = 0x0057,
    KeyX = 0x0058,
    KeyY = 0x0059,
    KeyZ = 0x005A,
    OpenBracket = 0x005B,
    CloseBracket = 0x005C,
    BackSlash = 0x005D,
    Semicolon = 0x003B,
    Quote = 0x00DE,
    Enter = 0x000A,
    Comma = 0x002C,
    Period = 0x002E,
    Slash = 0x002F,
    Space = 0x0020,
    Oem102 = 0x0099,
    Misc = 0x0E01,

    // Edit Key Zone
    PrintScreen = 0x009A,  // SYSRQ
    Print = 0x009C,
    Select = 0x009D,
    Execute = 0x009E,
    ScrollLock = 0x0091,
    Pause = 0x0013,
    Cancel = 0x00D3,  // BREAK
    Help = 0x009F,
    Insert = 0x009B,
    Delete = 0x007F,
    Home = 0x0024,
    End = 0x0023,
    PageUp = 0x0021,
    PageDown = 0x0022,

    // Cursor Key Zone
    Up = 0x0026,
    Left = 0x0025,
    Right = 0x0027,
    Down = 0x0028,

    // Numeric Zone
    NumLock = 0x0090,
    NumpadClear = 0x000C,
    NumpadDivide = 0x006F,
    NumpadMultiply = 0x006A,
    NumpadSubtract = 0x006D,
    NumpadEquals = 0x007C,
    NumpadAdd = 0x006B,
    NumpadEnter = 0x007D,
    NumpadDecimal = 0x006E,
    NumpadSeparator = 0x006C,
    NumpadPlusMinus = 0x007E,
    Numpad0 = 0x0060,
    Numpad1 = 0x0061,
    Numpad2 = 0x0062,
    Numpad3 = 0x0063,
    Numpad4 = 0x0064,
    Numpad5 = 0x0065,
    Numpad6 = 0x0066,
    Numpad7 = 0x0067,
    Numpad8 = 0x0068,
    Numpad9 = 0x0069,
    NumpadOpenParenthesis = 0xEE01,
    NumpadCloseParenthesis = 0xEE02,

    // Modifier and Control Keys
    ShiftL = 0xA010,
    ShiftR = 0xB010,
    ControlL = 0xA011,
    ControlR = 0xB011,
    AltL = 0xA012,  // Option or Alt Key
    AltR = 0xB012,  // Option or Alt Key
    MetaL = 0xA09D,  // Windows or Command Key
    MetaR = 0xB09D,  // Windows or Command Key
    ContextMenu = 0x020D,
    Function = 0x020E,  // macOS only
    ChangeInputSource = 0x020F,  // macOS only

    // Shortcut Keys
    Power = 0xE05E,
    Sleep = 0xE05F,
    Wake = 0xE063,
    Media = 0xE023,
    MediaPlay = 0xE022,
    MediaStop = 0xE024,
    MediaPrevious = 0xE010,
    MediaNext = 0xE019,
    MediaSelect = 0xE06D,
    MediaEject = 0xE02C,
    MediaClose = 0xE02D,
    MediaEjectClose = 0xE02F,
    MediaRecord = 0xE031,
    MediaRewind = 0xE033,
    VolumeMute = 0xE020,
    VolumeDown = 0xE030,
    VolumeUp = 0xE02E,
    Attn = 0xE090,
    CrSel = 0xE091,
    ExSel = 0xE092,
    EraseEof = 0xE093,
    Play = 0xE094,
    Zoom = 0xE095,
    NoName = 0xE096,
    Pa1 = 0xE097,
    App1 = 0xE026,
    App2 = 0xE027,
    App3 = 0xE028,
    App4 = 0xE029,
    AppBrowser = 0xE025,
    AppCalculator = 0xE021,
    AppMail = 0xE06C,
    BrowserSearch = 0xE065,
    BrowserHome = 0xE032,
    BrowserBack = 0xE06A,
    BrowserForward = 0xE069,
    BrowserStop = 0xE068,
    BrowserRefresh = 0xE067,
    BrowserFavorites = 0xE066,

    // Asian Language Keys
    KatakanaHiragana = 0x0106,
    Katakana = 0x00F1,
    Hiragana = 0x00F2,
    Kana = 0x0015,
    Kanji = 0x0019,
    Hangul = 0x00E9,
    Junja = 0x00E8,
    Final = 0x00E7,
    Hanja = 0x00E6,
    Accept = 0x001E,
    Convert = 0x001C,
    Nonconvert = 0x001D,
    ImeOn = 0x0109,
    ImeOff = 0x0108,
    ModeChange = 0x0107,
    Process = 0x0105,
    Alphanumeric = 0x00F0,
    Underscore = 0x020B,
    Yen = 0x020C,
    JpComma = 0x0210,

    // Other Linux Keys
    Stop = 0xFF78,
    Props = 0xFF76,
    Front = 0xFF77,
    Open = 0xFF74,
    Find = 0xFF70,
    Again = 0xFF79,
    Undo = 0xFF7A,
    Redo = 0xFF7F,
    Copy = 0xFF7C,
    Paste = 0xFF7D,
    Cut = 0xFF7B,
    LineFeed = 0xC001,
    Macro = 0xC002,
    Scale = 0xC003,
    Setup = 0xC004,
    File = 0xC005,
    SendFile = 0xC006,
    DeleteFile = 0xC007,
    MsDos = 0xC008,
    Lock = 0xC009,
    RotateDisplay = 0xC00A,
    CycleWindows = 0xC00B,
    Computer = 0xC00C,
    Phone = 0xC00D,
    Iso = 0xC00E,
    Config = 0xC00F,
    Exit = 0xC010,
    Move = 0xC011,
    Edit = 0xC012,
    ScrollUp = 0xC013,
    ScrollDown = 0xC014,
    New = 0xC015,
    PlayCd = 0xC016,
    PauseCd = 0xC017,
    Dashboard = 0xC018,
    Suspend = 0xC019,
    Close = 0xC01A,
    FastForward = 0xC01C,
    BassBoost = 0xC01D,
    Hp = 0xC01E,
    Camera = 0xC01F,
    Sound = 0xC020,
    Question = 0xC021,
    Email = 0xC022,
    Chat = 0xC023,
    Connect = 0xC024,
    Finance = 0xC025,
    Sport = 0xC026,
    Shop = 0xC027,
    AltErase = 0xC028,
    BrightnessDown = 0xC029,
    BrightnessUp = 0xC02A,
    BrightnessCycle = 0xC02B,
    BrightnessAuto = 0xC02C,
    SwitchVideoMode = 0xC02D,
    KeyboardLightToggle = 0xC02E,
    KeyboardLightDown = 0xC02F,
    KeyboardLightUp = 0xC030,
    Send = 0xC031,
    Reply = 0xC032,
    ForwardMail = 0xC033,
    Save = 0xC034,
    Documents = 0xC035,
    Battery = 0xC036,
    Bluetooth = 0xC037,
    Wlan = 0xC038,
    Uwb = 0xC039,
    X11Unknown = 0xC03A,
    VideoNext = 0xC03B,
    VideoPrevious = 0xC03C,
    DisplayOff = 0xC03D,
    Wwan = 0xC03E,
    RfKill = 0xC03F,
}

impl VirtualKeyCode {
    /// Returns the raw 16-bit value shared with the dispatch layer.
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns `true` for [`VirtualKeyCode::Undefined`].
    pub const fn is_undefined(self) -> bool {
        matches!(self, VirtualKeyCode::Undefined)
    }

    /// Returns `true` for the eight left/right modifier keys.
    pub const fn is_modifier(self) -> bool {
        matches!(
            self,
            VirtualKeyCode::ShiftL
                | VirtualKeyCode::ShiftR
                | VirtualKeyCode::ControlL
                | VirtualKeyCode::ControlR
                | VirtualKeyCode::AltL
                | VirtualKeyCode::AltR
                | VirtualKeyCode::MetaL
                | VirtualKeyCode::MetaR
        )
    }
}

impl Default for VirtualKeyCode {
    fn default() -> Self {
        VirtualKeyCode::Undefined
    }
}

impl From<VirtualKeyCode> for u16 {
    fn from(vcode: VirtualKeyCode) -> Self {
        vcode.as_u16()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_is_zero_and_default() {
        assert_eq!(VirtualKeyCode::Undefined.as_u16(), 0x0000);
        assert_eq!(VirtualKeyCode::default(), VirtualKeyCode::Undefined);
        assert!(VirtualKeyCode::Undefined.is_undefined());
    }

    #[test]
    fn test_values_match_shared_vocabulary() {
        assert_eq!(u16::from(VirtualKeyCode::KeyA), 0x0041);
        assert_eq!(u16::from(VirtualKeyCode::Enter), 0x000A);
        assert_eq!(u16::from(VirtualKeyCode::NumpadEnter), 0x007D);
        assert_eq!(u16::from(VirtualKeyCode::ShiftL), 0xA010);
        assert_eq!(u16::from(VirtualKeyCode::MetaR), 0xB09D);
        assert_eq!(u16::from(VirtualKeyCode::F24), 0xF00B);
    }

    #[test]
    fn test_left_and_right_modifiers_are_distinct() {
        assert_ne!(VirtualKeyCode::ShiftL, VirtualKeyCode::ShiftR);
        assert!(VirtualKeyCode::ControlR.is_modifier());
        assert!(!VirtualKeyCode::CapsLock.is_modifier());
    }
}
