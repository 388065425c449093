//! In-memory platforms for tests and the probe binary's `--mock` mode.
//!
//! [`MockLayoutPlatform`] stands in for Win32: a list of layouts, a
//! per-key character table and a simulated provider descriptor image that
//! dead-key compositions are written into.  [`MockXPlatform`] stands in for
//! an X server: key names, per-key text, pointer mapping and input-method
//! behaviour, with counters for every IM/IC opened and closed.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use uiohook_core::domain::locale::descriptor::{ByteImage, DeadKeyRecord};
use uiohook_core::domain::locale::LoadedModule;
use uiohook_core::domain::modifiers::{LockIndicators, ModifierKey, PointerState};
use uiohook_core::keymap::x11_xkb::{KeyName, KEY_NAME_LENGTH};
use uiohook_core::text::classify_units;
use uiohook_core::wire::KeyEvent;
use uiohook_core::{
    CharClass, InputStateProbe, LayoutId, LayoutPlatform, LocaleError, ModifierMask,
    PointerMappingSource, SnapshotError,
};

use super::PlatformError;
use crate::application::XPlatform;

/// `VK_SHIFT`: its high bit in the keyboard state selects upper case.
pub const VK_SHIFT: u32 = 0x10;

const KEY_DOWN: u8 = 0x80;

// Simulated provider image.  Every mock layout shares one descriptor.
const IMAGE_BASE: usize = 0x0010_0000;
const IMAGE_SIZE: usize = 0x1000;
const CHAR_MODIFIERS: usize = IMAGE_BASE + 0x100;
const VK_TO_WCHAR: usize = IMAGE_BASE + 0x200;
const VK_TO_BIT: usize = IMAGE_BASE + 0x300;
const DEAD_KEYS: usize = IMAGE_BASE + 0x400;

fn unit(c: char) -> u16 {
    c as u32 as u16
}

fn all_groups(buttons: ModifierMask) -> PointerState {
    PointerState {
        shift: true,
        control: true,
        alt: true,
        meta: true,
        buttons,
    }
}

// ── Layout platform ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum MockKey {
    Char { lower: u16, upper: u16 },
    Dead(u16),
}

/// A loaded mock provider; counts its own release.
#[derive(Debug)]
pub struct MockModule {
    released: Rc<Cell<usize>>,
}

impl Drop for MockModule {
    fn drop(&mut self) {
        self.released.set(self.released.get() + 1);
    }
}

/// A scriptable stand-in for the Win32 layout and keyboard APIs.
///
/// Characters are BMP-only.  Shift is the only state the translator honours.
#[derive(Debug)]
pub struct MockLayoutPlatform {
    layouts: Vec<LayoutId>,
    enumeration_fails: bool,
    broken: Vec<LayoutId>,
    focus: Option<LayoutId>,
    thread: LayoutId,
    activations: RefCell<Vec<LayoutId>>,
    image: ByteImage,
    compositions: usize,
    keys: BTreeMap<u32, MockKey>,
    key_state: [u8; 256],
    keyboard_state_fails: bool,
    classification_fails: bool,
    keys_down: Vec<ModifierKey>,
    locks: Option<LockIndicators>,
    buttons: ModifierMask,
    loaded: Rc<Cell<usize>>,
    released: Rc<Cell<usize>>,
}

impl MockLayoutPlatform {
    /// No layouts, no keys, thread layout US English.
    pub fn new() -> Self {
        let width = std::mem::size_of::<usize>();
        let mut image = ByteImage::new(IMAGE_BASE, IMAGE_SIZE);
        image.write_ptr(IMAGE_BASE, CHAR_MODIFIERS, width);
        image.write_ptr(CHAR_MODIFIERS, VK_TO_BIT, width);
        image.write_ptr(IMAGE_BASE + width, VK_TO_WCHAR, width);
        image.write_ptr(IMAGE_BASE + 2 * width, DEAD_KEYS, width);

        Self {
            layouts: Vec::new(),
            enumeration_fails: false,
            broken: Vec::new(),
            focus: None,
            thread: LayoutId(0x0409_0409),
            activations: RefCell::new(Vec::new()),
            image,
            compositions: 0,
            keys: BTreeMap::new(),
            key_state: [0; 256],
            keyboard_state_fails: false,
            classification_fails: false,
            keys_down: Vec::new(),
            locks: Some(LockIndicators::default()),
            buttons: ModifierMask::EMPTY,
            loaded: Rc::new(Cell::new(0)),
            released: Rc::new(Cell::new(0)),
        }
    }

    pub fn with_layouts(mut self, ids: &[u64]) -> Self {
        self.set_layouts(ids);
        self
    }

    pub fn with_focus(mut self, id: Option<u64>) -> Self {
        self.set_focus(id);
        self
    }

    pub fn with_thread_layout(mut self, id: u64) -> Self {
        self.thread = LayoutId(id);
        self
    }

    /// Layout whose provider module has no descriptor export.
    pub fn with_broken_layout(mut self, id: u64) -> Self {
        self.broken.push(LayoutId(id));
        self
    }

    pub fn with_enumeration_failure(mut self) -> Self {
        self.enumeration_fails = true;
        self
    }

    /// A key typing `lower`, or `upper` while shift is down.
    pub fn with_key(mut self, vk: u32, lower: char, upper: char) -> Self {
        self.keys.insert(
            vk,
            MockKey::Char {
                lower: unit(lower),
                upper: unit(upper),
            },
        );
        self
    }

    /// A dead key whose spacing form is `spacing`.
    pub fn with_dead_key(mut self, vk: u32, spacing: char) -> Self {
        self.keys.insert(vk, MockKey::Dead(unit(spacing)));
        self
    }

    /// Adds a `dead` + `typed` -> `composed` record to the dead-key table.
    pub fn with_composition(mut self, dead: char, typed: char, composed: char) -> Self {
        let record = DeadKeyRecord {
            both: u32::from(unit(typed)) | (u32::from(unit(dead)) << 16),
            composed: unit(composed),
            flags: 0,
        };
        self.image.write_dead_key(DEAD_KEYS, self.compositions, record);
        self.compositions += 1;
        self
    }

    pub fn with_key_down(mut self, key: ModifierKey) -> Self {
        self.keys_down.push(key);
        self
    }

    pub fn with_caps_lock(mut self, on: bool) -> Self {
        let locks = self.locks.get_or_insert_with(LockIndicators::default);
        locks.caps_lock = on;
        self
    }

    pub fn with_buttons(mut self, buttons: ModifierMask) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_keyboard_state_failure(mut self) -> Self {
        self.keyboard_state_fails = true;
        self
    }

    pub fn with_classification_failure(mut self) -> Self {
        self.classification_fails = true;
        self
    }

    pub fn set_layouts(&mut self, ids: &[u64]) {
        self.layouts = ids.iter().map(|&id| LayoutId(id)).collect();
    }

    pub fn set_focus(&mut self, id: Option<u64>) {
        self.focus = id.map(LayoutId);
    }

    /// Presses or releases `vk` in the keyboard state snapshot.
    pub fn set_key_state(&mut self, vk: u32, down: bool) {
        if let Some(slot) = self.key_state.get_mut(vk as usize) {
            *slot = if down { KEY_DOWN } else { 0 };
        }
    }

    /// Every layout activation requested so far, restores included.
    pub fn activations(&self) -> Vec<LayoutId> {
        self.activations.borrow().clone()
    }

    pub fn load_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.loaded)
    }

    pub fn release_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.released)
    }
}

impl Default for MockLayoutPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl InputStateProbe for MockLayoutPlatform {
    fn lock_indicators(&self) -> Option<LockIndicators> {
        self.locks
    }

    fn pointer_state(&self) -> Option<PointerState> {
        Some(all_groups(self.buttons))
    }

    fn is_key_down(&self, key: ModifierKey) -> bool {
        self.keys_down.contains(&key)
    }
}

impl LayoutPlatform for MockLayoutPlatform {
    type Module = MockModule;
    type Memory = ByteImage;

    fn active_layouts(&mut self) -> Result<Vec<LayoutId>, LocaleError> {
        if self.enumeration_fails {
            return Err(LocaleError::Enumeration("simulated failure".into()));
        }
        Ok(self.layouts.clone())
    }

    fn focused_layout(&self) -> Option<LayoutId> {
        self.focus
    }

    fn thread_layout(&self) -> LayoutId {
        self.thread
    }

    fn activate_layout(&mut self, id: LayoutId) {
        self.activations.borrow_mut().push(id);
    }

    fn load_active_module(&mut self, id: LayoutId) -> Result<LoadedModule<MockModule>, LocaleError> {
        if self.broken.contains(&id) {
            return Err(LocaleError::MissingDescriptor(format!("mock{id}.dll")));
        }
        self.loaded.set(self.loaded.get() + 1);
        Ok(LoadedModule {
            module: MockModule {
                released: Rc::clone(&self.released),
            },
            descriptor: IMAGE_BASE,
        })
    }

    fn memory(&self) -> &ByteImage {
        &self.image
    }

    fn is_wow64(&self) -> bool {
        false
    }

    fn keyboard_state(&self) -> Result<[u8; 256], SnapshotError> {
        if self.keyboard_state_fails {
            return Err(SnapshotError::KeyboardState(5));
        }
        Ok(self.key_state)
    }

    fn to_unicode(
        &self,
        vk: u32,
        _scan: u32,
        state: &[u8; 256],
        out: &mut [u16],
        _layout: LayoutId,
    ) -> i32 {
        let Some(slot) = out.first_mut() else {
            return 0;
        };
        match self.keys.get(&vk) {
            Some(MockKey::Char { lower, upper }) => {
                let shifted = state[VK_SHIFT as usize] & KEY_DOWN != 0;
                *slot = if shifted { *upper } else { *lower };
                1
            }
            Some(MockKey::Dead(spacing)) => {
                *slot = *spacing;
                -1
            }
            None => 0,
        }
    }

    fn classify(&self, units: &[u16], classes: &mut [CharClass]) -> Result<(), SnapshotError> {
        if self.classification_fails {
            return Err(SnapshotError::Classification(87));
        }
        classify_units(units, classes);
        Ok(())
    }
}

// ── X platform ────────────────────────────────────────────────────────────────

/// Lifecycle and lookup counts recorded by [`MockXPlatform`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XCounters {
    pub methods_opened: usize,
    pub methods_closed: usize,
    pub contexts_created: usize,
    pub contexts_destroyed: usize,
    pub utf8_lookups: usize,
    pub latin1_lookups: usize,
}

type SharedCounters = Rc<RefCell<XCounters>>;

/// An open mock input method.
#[derive(Debug)]
pub struct MockInputMethod {
    counters: SharedCounters,
}

impl Drop for MockInputMethod {
    fn drop(&mut self) {
        self.counters.borrow_mut().methods_closed += 1;
    }
}

/// A mock input context.
#[derive(Debug)]
pub struct MockInputContext {
    counters: SharedCounters,
}

impl Drop for MockInputContext {
    fn drop(&mut self) {
        self.counters.borrow_mut().contexts_destroyed += 1;
    }
}

/// Key names a typical evdev server reports, with their key codes.
const EVDEV_NAMES: &[(u32, &str)] = &[
    (9, "ESC"),
    (10, "AE01"),
    (11, "AE02"),
    (19, "AE10"),
    (22, "BKSP"),
    (23, "TAB"),
    (24, "AD01"),
    (25, "AD02"),
    (26, "AD03"),
    (36, "RTRN"),
    (37, "LCTL"),
    (38, "AC01"),
    (39, "AC02"),
    (50, "LFSH"),
    (52, "AB01"),
    (62, "RTSH"),
    (64, "LALT"),
    (65, "SPCE"),
    (66, "CAPS"),
    (67, "FK01"),
    (77, "NMLK"),
    (104, "KPEN"),
    (105, "RCTL"),
    (108, "RALT"),
    (133, "LWIN"),
];

/// A scriptable stand-in for an X server connection.
#[derive(Debug)]
pub struct MockXPlatform {
    names: Option<Vec<(u32, [u8; KEY_NAME_LENGTH])>>,
    text: BTreeMap<u8, String>,
    rejected_methods: Vec<String>,
    opened_with: Vec<String>,
    contexts_fail: bool,
    auto_repeat: bool,
    pointer_map: Option<Vec<u8>>,
    pointer: Option<PointerState>,
    keys_down: Vec<ModifierKey>,
    locks: Option<LockIndicators>,
    counters: SharedCounters,
}

impl MockXPlatform {
    /// A server with no key names and a default three-button mapping.
    pub fn new() -> Self {
        Self {
            names: Some(Vec::new()),
            text: BTreeMap::new(),
            rejected_methods: Vec::new(),
            opened_with: Vec::new(),
            contexts_fail: false,
            auto_repeat: true,
            pointer_map: Some(vec![1, 2, 3]),
            pointer: Some(all_groups(ModifierMask::EMPTY)),
            keys_down: Vec::new(),
            locks: Some(LockIndicators::default()),
            counters: SharedCounters::default(),
        }
    }

    /// A server reporting the usual evdev key names.
    pub fn evdev() -> Self {
        let names = EVDEV_NAMES
            .iter()
            .map(|&(code, name)| (code, KeyName::new(name).0))
            .collect();
        Self::new().with_key_names(names)
    }

    pub fn with_key_names(mut self, names: Vec<(u32, [u8; KEY_NAME_LENGTH])>) -> Self {
        self.names = Some(names);
        self
    }

    /// The XKB keyboard description cannot be fetched.
    pub fn without_xkb(mut self) -> Self {
        self.names = None;
        self
    }

    /// Text every lookup on `keycode` produces.
    pub fn with_text(mut self, keycode: u8, text: &str) -> Self {
        self.text.insert(keycode, text.to_string());
        self
    }

    /// Opening an input method with `modifiers` fails.
    pub fn rejecting_input_method(mut self, modifiers: &str) -> Self {
        self.rejected_methods.push(modifiers.to_string());
        self
    }

    pub fn without_input_context(mut self) -> Self {
        self.contexts_fail = true;
        self
    }

    pub fn without_auto_repeat(mut self) -> Self {
        self.auto_repeat = false;
        self
    }

    pub fn with_pointer_mapping(mut self, map: &[u8]) -> Self {
        self.pointer_map = Some(map.to_vec());
        self
    }

    /// The display connection is gone; pointer queries fail.
    pub fn without_display(mut self) -> Self {
        self.pointer_map = None;
        self.pointer = None;
        self.locks = None;
        self
    }

    pub fn with_pointer_buttons(mut self, buttons: ModifierMask) -> Self {
        let pointer = self.pointer.get_or_insert_with(|| all_groups(ModifierMask::EMPTY));
        pointer.buttons = buttons;
        self
    }

    /// Pointer state reporting only the given groups as active.
    pub fn with_pointer_state(mut self, pointer: Option<PointerState>) -> Self {
        self.pointer = pointer;
        self
    }

    pub fn with_key_down(mut self, key: ModifierKey) -> Self {
        self.keys_down.push(key);
        self
    }

    pub fn with_num_lock(mut self, on: bool) -> Self {
        let locks = self.locks.get_or_insert_with(LockIndicators::default);
        locks.num_lock = on;
        self
    }

    pub fn counters(&self) -> XCounters {
        *self.counters.borrow()
    }

    /// Locale modifiers of every input method successfully opened.
    pub fn opened_with(&self) -> Vec<String> {
        self.opened_with.clone()
    }

    fn text_for(&self, key: &KeyEvent) -> Option<&str> {
        self.text.get(&key.keycode).map(String::as_str)
    }
}

impl Default for MockXPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl InputStateProbe for MockXPlatform {
    fn lock_indicators(&self) -> Option<LockIndicators> {
        self.locks
    }

    fn pointer_state(&self) -> Option<PointerState> {
        self.pointer
    }

    fn is_key_down(&self, key: ModifierKey) -> bool {
        self.keys_down.contains(&key)
    }
}

impl PointerMappingSource for MockXPlatform {
    fn pointer_mapping(&self, out: &mut [u8]) -> Option<usize> {
        let map = self.pointer_map.as_ref()?;
        let len = map.len().min(out.len());
        out[..len].copy_from_slice(&map[..len]);
        Some(len)
    }
}

impl XPlatform for MockXPlatform {
    type InputMethod = MockInputMethod;
    type InputContext = MockInputContext;

    fn key_names(&self) -> Result<Vec<(u32, [u8; KEY_NAME_LENGTH])>, PlatformError> {
        self.names
            .clone()
            .ok_or(PlatformError::Simulated("XkbGetKeyboard"))
    }

    fn set_detectable_auto_repeat(&mut self, _enabled: bool) -> bool {
        self.auto_repeat
    }

    fn open_input_method(&mut self, locale_modifiers: &str) -> Option<MockInputMethod> {
        if self.rejected_methods.iter().any(|m| m == locale_modifiers) {
            return None;
        }
        self.opened_with.push(locale_modifiers.to_string());
        self.counters.borrow_mut().methods_opened += 1;
        Some(MockInputMethod {
            counters: Rc::clone(&self.counters),
        })
    }

    fn create_input_context(&mut self, _method: &MockInputMethod) -> Option<MockInputContext> {
        if self.contexts_fail {
            return None;
        }
        self.counters.borrow_mut().contexts_created += 1;
        Some(MockInputContext {
            counters: Rc::clone(&self.counters),
        })
    }

    fn lookup_utf8(&mut self, _context: &MockInputContext, key: &KeyEvent, out: &mut [u8]) -> usize {
        self.counters.borrow_mut().utf8_lookups += 1;
        let Some(text) = self.text_for(key) else {
            return 0;
        };
        let bytes = text.as_bytes();
        let len = bytes.len().min(out.len());
        out[..len].copy_from_slice(&bytes[..len]);
        len
    }

    fn lookup_latin1(&mut self, key: &KeyEvent, out: &mut [u8]) -> usize {
        self.counters.borrow_mut().latin1_lookups += 1;
        let Some(text) = self.text_for(key) else {
            return 0;
        };
        let latin1 = text
            .chars()
            .filter_map(|c| u8::try_from(u32::from(c)).ok());
        let mut len = 0;
        for (slot, byte) in out.iter_mut().zip(latin1) {
            *slot = byte;
            len += 1;
        }
        len
    }
}
