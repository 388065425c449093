//! Win32 implementation of the message-hook backend's platform ports.
//!
//! Keyboard layouts are identified by their `HKL`.  To read a layout's
//! character tables the helper makes the layout active on its own thread,
//! finds the provider DLL named under
//! `HKLM\SYSTEM\CurrentControlSet\Control\Keyboard Layouts\<KLID>`, loads it
//! from the system directory and calls its `KbdLayerDescriptor` export.
//! The descriptor then lives in this process's address space, which is why
//! [`ProcessMemory`] reads it with plain pointer copies.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls and
//! for reading provider descriptor memory.  All `unsafe` blocks are
//! annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::ffi::c_void;
use std::path::PathBuf;

use windows::core::{s, PCWSTR};
use windows::Win32::Foundation::{FreeLibrary, GetLastError, BOOL, HMODULE};
use windows::Win32::Globalization::GetStringTypeW;
use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryW};
use windows::Win32::System::Registry::{RegGetValueW, HKEY_LOCAL_MACHINE, RRF_RT_REG_SZ};
use windows::Win32::System::SystemInformation::GetSystemDirectoryW;
use windows::Win32::System::Threading::{GetCurrentProcess, IsWow64Process};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    ActivateKeyboardLayout, GetKeyState, GetKeyboardLayout, GetKeyboardLayoutList,
    GetKeyboardLayoutNameW, GetKeyboardState, ToUnicodeEx, ACTIVATE_KEYBOARD_LAYOUT_FLAGS, HKL,
    VIRTUAL_KEY, VK_CAPITAL, VK_LBUTTON, VK_LCONTROL, VK_LMENU, VK_LSHIFT, VK_LWIN, VK_MBUTTON,
    VK_NUMLOCK, VK_RBUTTON, VK_RCONTROL, VK_RMENU, VK_RSHIFT, VK_RWIN, VK_SCROLL, VK_XBUTTON1,
    VK_XBUTTON2,
};
use windows::Win32::UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowThreadProcessId};

use uiohook_core::domain::locale::descriptor::{DescriptorError, DescriptorMemory};
use uiohook_core::domain::locale::LoadedModule;
use uiohook_core::domain::modifiers::{LockIndicators, ModifierKey, PointerState};
use uiohook_core::{
    CharClass, InputStateProbe, LayoutId, LayoutPlatform, LocaleError, ModifierMask, SnapshotError,
};

/// `GetStringTypeW` info type for the C1 character classes.
const CT_CTYPE1: u32 = 0x0001;

/// `ToUnicodeEx` flag: do not change the kernel-mode keyboard state.
const TOUNICODE_NO_STATE_CHANGE: u32 = 1 << 2;

/// Length of a KLID string, terminator included.
const KL_NAMELENGTH: usize = 9;

const MAX_PATH: usize = 260;

const LAYOUTS_KEY: &str = r"SYSTEM\CurrentControlSet\Control\Keyboard Layouts\";

type KbdLayerDescriptor = unsafe extern "system" fn() -> *mut c_void;

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn from_wide(buf: &[u16]) -> String {
    let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..end])
}

fn to_hkl(id: LayoutId) -> HKL {
    HKL(id.0 as usize as _)
}

fn to_layout_id(hkl: HKL) -> Option<LayoutId> {
    let raw = hkl.0 as usize;
    (raw != 0).then_some(LayoutId(raw as u64))
}

fn last_error() -> u32 {
    // SAFETY: GetLastError only reads thread-local state.
    unsafe { GetLastError() }.0
}

fn key_down(vk: VIRTUAL_KEY) -> bool {
    // SAFETY: GetKeyState has no preconditions.  The high bit means "down".
    unsafe { GetKeyState(i32::from(vk.0)) } < 0
}

fn key_toggled(vk: VIRTUAL_KEY) -> bool {
    // SAFETY: GetKeyState has no preconditions.  The low bit means "toggled".
    unsafe { GetKeyState(i32::from(vk.0)) } & 0x0001 != 0
}

// ── Provider module ───────────────────────────────────────────────────────────

/// A loaded keyboard layout DLL.  Freed on drop.
#[derive(Debug)]
pub struct LayoutModule {
    handle: HMODULE,
    path: PathBuf,
}

impl Drop for LayoutModule {
    fn drop(&mut self) {
        // SAFETY: `handle` came from a successful LoadLibraryW and is freed once.
        if let Err(e) = unsafe { FreeLibrary(self.handle) } {
            tracing::warn!(path = %self.path.display(), error = %e, "FreeLibrary failed");
        }
    }
}

/// Reads descriptor memory of provider modules loaded into this process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessMemory;

impl DescriptorMemory for ProcessMemory {
    fn read_bytes(&self, address: usize, out: &mut [u8]) -> Result<(), DescriptorError> {
        if address == 0 {
            return Err(DescriptorError::Unreadable {
                address,
                len: out.len(),
            });
        }
        // SAFETY: addresses reach this point only by following the pointer
        // chain of a `KBDTABLES` whose module is still loaded (the locale
        // cache owns the module for as long as it hands out its tables).
        unsafe {
            std::ptr::copy_nonoverlapping(address as *const u8, out.as_mut_ptr(), out.len());
        }
        Ok(())
    }
}

// ── Platform ──────────────────────────────────────────────────────────────────

/// The Win32 layout, keyboard-state and character-class APIs.
///
/// Must be used from the hook thread: layout activation is per thread.
#[derive(Debug, Default)]
pub struct WindowsPlatform {
    memory: ProcessMemory,
}

impl WindowsPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// File name of the provider DLL of the calling thread's active layout.
    fn layout_file(&self, id: LayoutId) -> Result<String, LocaleError> {
        let mut klid = [0u16; KL_NAMELENGTH];
        // SAFETY: `klid` is exactly KL_NAMELENGTH units, as the API requires.
        unsafe { GetKeyboardLayoutNameW(&mut klid) }.map_err(|e| LocaleError::LayoutFile {
            id,
            reason: format!("GetKeyboardLayoutNameW: {e}"),
        })?;
        let klid = from_wide(&klid);
        tracing::debug!(klid = %klid, "found keyboard layout");

        let subkey = wide(&format!("{LAYOUTS_KEY}{klid}"));
        let value = wide("Layout File");
        let mut data = [0u16; MAX_PATH];
        let mut size = (data.len() * std::mem::size_of::<u16>()) as u32;

        // SAFETY: `subkey` and `value` are NUL-terminated and outlive the call;
        // `data` holds `size` bytes.
        let status = unsafe {
            RegGetValueW(
                HKEY_LOCAL_MACHINE,
                PCWSTR(subkey.as_ptr()),
                PCWSTR(value.as_ptr()),
                RRF_RT_REG_SZ,
                None,
                Some(data.as_mut_ptr().cast()),
                Some(&mut size),
            )
        };
        if status.is_err() {
            return Err(LocaleError::LayoutFile {
                id,
                reason: format!("registry query for {klid} failed ({:#X})", status.0),
            });
        }

        Ok(from_wide(&data))
    }

    fn system_directory(&self) -> Result<PathBuf, LocaleError> {
        let mut buf = [0u16; MAX_PATH];
        // SAFETY: the slice length bounds the write.
        let len = unsafe { GetSystemDirectoryW(Some(&mut buf)) } as usize;
        if len == 0 || len > buf.len() {
            return Err(LocaleError::ModuleLoad {
                path: String::new(),
                reason: format!("GetSystemDirectoryW failed ({:#X})", last_error()),
            });
        }
        Ok(PathBuf::from(String::from_utf16_lossy(&buf[..len])))
    }
}

impl InputStateProbe for WindowsPlatform {
    fn lock_indicators(&self) -> Option<LockIndicators> {
        Some(LockIndicators {
            caps_lock: key_toggled(VK_CAPITAL),
            num_lock: key_toggled(VK_NUMLOCK),
            scroll_lock: key_toggled(VK_SCROLL),
        })
    }

    /// Windows has no coarse pointer query; every group is reported active
    /// so each key is tested individually.
    fn pointer_state(&self) -> Option<PointerState> {
        let mut buttons = ModifierMask::EMPTY;
        for (vk, bit) in [
            (VK_LBUTTON, ModifierMask::BUTTON1),
            (VK_RBUTTON, ModifierMask::BUTTON2),
            (VK_MBUTTON, ModifierMask::BUTTON3),
            (VK_XBUTTON1, ModifierMask::BUTTON4),
            (VK_XBUTTON2, ModifierMask::BUTTON5),
        ] {
            if key_down(vk) {
                buttons |= bit;
            }
        }
        Some(PointerState {
            shift: true,
            control: true,
            alt: true,
            meta: true,
            buttons,
        })
    }

    fn is_key_down(&self, key: ModifierKey) -> bool {
        let vk = match key {
            ModifierKey::ShiftL => VK_LSHIFT,
            ModifierKey::ShiftR => VK_RSHIFT,
            ModifierKey::ControlL => VK_LCONTROL,
            ModifierKey::ControlR => VK_RCONTROL,
            ModifierKey::AltL => VK_LMENU,
            ModifierKey::AltR => VK_RMENU,
            ModifierKey::MetaL => VK_LWIN,
            ModifierKey::MetaR => VK_RWIN,
        };
        key_down(vk)
    }
}

impl LayoutPlatform for WindowsPlatform {
    type Module = LayoutModule;
    type Memory = ProcessMemory;

    fn active_layouts(&mut self) -> Result<Vec<LayoutId>, LocaleError> {
        // SAFETY: a `None` buffer only queries the count.
        let count = unsafe { GetKeyboardLayoutList(None) };
        if count <= 0 {
            return Err(LocaleError::Enumeration(format!(
                "GetKeyboardLayoutList returned {count} ({:#X})",
                last_error()
            )));
        }

        let mut list = vec![HKL::default(); count as usize];
        // SAFETY: the slice length bounds the write.
        let written = unsafe { GetKeyboardLayoutList(Some(&mut list)) };
        if written <= 0 {
            return Err(LocaleError::Enumeration(format!(
                "GetKeyboardLayoutList failed ({:#X})",
                last_error()
            )));
        }
        list.truncate(written as usize);
        tracing::debug!(count = list.len(), "enumerated keyboard layouts");

        Ok(list.into_iter().filter_map(to_layout_id).collect())
    }

    fn focused_layout(&self) -> Option<LayoutId> {
        // SAFETY: both calls accept any window handle, including null.
        let thread = unsafe { GetWindowThreadProcessId(GetForegroundWindow(), None) };
        if thread == 0 {
            return None;
        }
        // SAFETY: GetKeyboardLayout accepts any thread id.
        to_layout_id(unsafe { GetKeyboardLayout(thread) })
    }

    fn thread_layout(&self) -> LayoutId {
        // SAFETY: 0 selects the calling thread.
        to_layout_id(unsafe { GetKeyboardLayout(0) }).unwrap_or(LayoutId(0))
    }

    fn activate_layout(&mut self, id: LayoutId) {
        // SAFETY: an unknown HKL makes the call fail, which is logged.
        if let Err(e) = unsafe { ActivateKeyboardLayout(to_hkl(id), ACTIVATE_KEYBOARD_LAYOUT_FLAGS(0)) }
        {
            tracing::warn!(id = %id, error = %e, "ActivateKeyboardLayout failed");
        }
    }

    fn load_active_module(&mut self, id: LayoutId) -> Result<LoadedModule<LayoutModule>, LocaleError> {
        let file = self.layout_file(id)?;
        let path = self.system_directory()?.join(&file);
        let display = path.display().to_string();
        let wide_path = wide(&display);

        // SAFETY: `wide_path` is NUL-terminated and outlives the call.
        let handle = unsafe { LoadLibraryW(PCWSTR(wide_path.as_ptr())) }.map_err(|e| {
            LocaleError::ModuleLoad {
                path: display.clone(),
                reason: e.to_string(),
            }
        })?;
        let module = LayoutModule { handle, path };

        // SAFETY: `handle` is a live module and the name is NUL-terminated.
        let Some(export) = (unsafe { GetProcAddress(module.handle, s!("KbdLayerDescriptor")) }) else {
            return Err(LocaleError::MissingDescriptor(display));
        };

        // SAFETY: `KbdLayerDescriptor` takes no arguments and returns a
        // pointer to the module's static KBDTABLES.
        let descriptor = unsafe {
            let export: KbdLayerDescriptor = std::mem::transmute(export);
            export()
        } as usize;
        tracing::debug!(id = %id, path = %display, "loaded layout provider");

        Ok(LoadedModule { module, descriptor })
    }

    fn memory(&self) -> &ProcessMemory {
        &self.memory
    }

    fn is_wow64(&self) -> bool {
        let mut wow64 = BOOL(0);
        // SAFETY: the pseudo handle from GetCurrentProcess is always valid.
        match unsafe { IsWow64Process(GetCurrentProcess(), &mut wow64) } {
            Ok(()) => wow64.as_bool(),
            Err(e) => {
                tracing::debug!(error = %e, "IsWow64Process failed; assuming native");
                false
            }
        }
    }

    fn keyboard_state(&self) -> Result<[u8; 256], SnapshotError> {
        let mut state = [0u8; 256];
        // SAFETY: GetKeyState(0) refreshes this thread's view of the keyboard
        // before the snapshot; `state` is the 256 bytes the API requires.
        unsafe {
            GetKeyState(0);
            GetKeyboardState(&mut state)
        }
        .map_err(|_| SnapshotError::KeyboardState(last_error()))?;
        Ok(state)
    }

    fn to_unicode(
        &self,
        vk: u32,
        scan: u32,
        state: &[u8; 256],
        out: &mut [u16],
        layout: LayoutId,
    ) -> i32 {
        // SAFETY: `out` bounds the write; the no-state-change flag leaves the
        // kernel dead-key buffer alone.
        unsafe { ToUnicodeEx(vk, scan, state, out, TOUNICODE_NO_STATE_CHANGE, to_hkl(layout)) }
    }

    fn classify(&self, units: &[u16], classes: &mut [CharClass]) -> Result<(), SnapshotError> {
        if units.is_empty() {
            return Ok(());
        }
        let mut types = vec![0u16; units.len()];
        // SAFETY: `types` has one slot per unit of `units`.
        let ok = unsafe { GetStringTypeW(CT_CTYPE1, units, types.as_mut_ptr()) };
        if !ok.as_bool() {
            return Err(SnapshotError::Classification(last_error()));
        }
        for (slot, bits) in classes.iter_mut().zip(types) {
            *slot = CharClass(bits);
        }
        Ok(())
    }
}
