//! Keyboard layout cache for the message-hook backend.
//!
//! # Why a cache? (for beginners)
//!
//! Turning a key press into text on Windows needs the character tables of the
//! keyboard layout the *focused window* is using.  Those tables live inside a
//! small provider DLL per layout (`KBDUS.DLL`, `KBDFR.DLL`, ...).  Loading a
//! DLL on every key press would be far too slow, so every layout the user has
//! enabled is loaded once and kept in a [`LocaleCache`], keyed by its layout
//! id.  One entry is marked *current*: the layout of the window that last had
//! focus.
//!
//! When the user adds or removes a layout, [`LocaleCache::refresh`]
//! reconciles the cache with the live list: stale entries are dropped (which
//! unloads their DLL) and new ones are loaded.
//!
//! All OS access goes through the [`LayoutPlatform`] port, so the cache logic
//! runs unchanged against the Win32 adapter and against test mocks.

pub mod dead_key;
pub mod descriptor;

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

use thiserror::Error;

use crate::text::CharClass;
use dead_key::DeadKeyState;
use descriptor::{DescriptorError, DescriptorMemory, KbdTablesLayout, LayoutTables};

// ── Identifiers and errors ────────────────────────────────────────────────────

/// Opaque keyboard layout identifier (an `HKL` on Windows).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayoutId(pub u64);

impl fmt::Debug for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayoutId({:#010X})", self.0)
    }
}

impl fmt::Display for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010X}", self.0)
    }
}

/// Errors raised while enumerating or loading layouts.
#[derive(Debug, Error)]
pub enum LocaleError {
    /// The OS refused to list the active layouts.
    #[error("failed to enumerate keyboard layouts: {0}")]
    Enumeration(String),

    /// The registry has no layout file for the layout.
    #[error("no layout file registered for layout {id}: {reason}")]
    LayoutFile { id: LayoutId, reason: String },

    /// The provider module could not be loaded.
    #[error("failed to load layout module {path}: {reason}")]
    ModuleLoad { path: String, reason: String },

    /// The module does not export `KbdLayerDescriptor`.
    #[error("layout module {0} has no KbdLayerDescriptor entry point")]
    MissingDescriptor(String),

    /// The descriptor's tables could not be read.
    #[error("layout descriptor unreadable: {0}")]
    Descriptor(#[from] DescriptorError),
}

/// Errors raised while sampling input state for translation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("keyboard state snapshot failed (os error {0:#X})")]
    KeyboardState(u32),

    #[error("character classification failed (os error {0:#X})")]
    Classification(u32),
}

// ── Port ──────────────────────────────────────────────────────────────────────

/// A provider module together with the address of its root descriptor.
#[derive(Debug)]
pub struct LoadedModule<M> {
    pub module: M,
    pub descriptor: usize,
}

/// Operating-system services the message-hook backend depends on.
pub trait LayoutPlatform {
    /// Owned handle to a loaded provider module; dropping it unloads the module.
    type Module;
    /// Memory the provider descriptors are read from.
    type Memory: DescriptorMemory;

    /// Layouts the user has enabled, in OS order.
    fn active_layouts(&mut self) -> Result<Vec<LayoutId>, LocaleError>;

    /// Layout of the foreground window's thread, if it can be determined.
    fn focused_layout(&self) -> Option<LayoutId>;

    /// Layout of the calling thread.
    fn thread_layout(&self) -> LayoutId;

    /// Makes `id` the calling thread's active layout.
    fn activate_layout(&mut self, id: LayoutId);

    /// Loads the provider module of the layout currently active on the calling thread.
    fn load_active_module(&mut self, id: LayoutId) -> Result<LoadedModule<Self::Module>, LocaleError>;

    fn memory(&self) -> &Self::Memory;

    /// Whether this is a 32-bit process on a 64-bit OS.
    fn is_wow64(&self) -> bool;

    fn pointer_width(&self) -> usize {
        std::mem::size_of::<usize>()
    }

    /// A 256-byte snapshot of the keyboard state.
    fn keyboard_state(&self) -> Result<[u8; 256], SnapshotError>;

    /// Translates without changing the keyboard state.
    ///
    /// Negative for a dead key, otherwise the number of units written.
    fn to_unicode(
        &self,
        vk: u32,
        scan: u32,
        state: &[u8; 256],
        out: &mut [u16],
        layout: LayoutId,
    ) -> i32;

    /// Classifies each unit of `units` into `classes`.
    fn classify(&self, units: &[u16], classes: &mut [CharClass]) -> Result<(), SnapshotError>;
}

/// Restores the default layout on the calling thread when dropped.
struct RestoreLayout<'a, P: LayoutPlatform + ?Sized> {
    platform: &'a mut P,
    default: LayoutId,
}

impl<P: LayoutPlatform + ?Sized> Deref for RestoreLayout<'_, P> {
    type Target = P;
    fn deref(&self) -> &P {
        &*self.platform
    }
}

impl<P: LayoutPlatform + ?Sized> DerefMut for RestoreLayout<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        &mut *self.platform
    }
}

impl<P: LayoutPlatform + ?Sized> Drop for RestoreLayout<'_, P> {
    fn drop(&mut self) {
        self.platform.activate_layout(self.default);
    }
}

// ── Cache ─────────────────────────────────────────────────────────────────────

/// One loaded layout.
#[derive(Debug)]
pub struct KeyboardLocale<M> {
    id: LayoutId,
    tables: LayoutTables,
    // Dropped last; releases the provider module.
    _module: M,
}

impl<M> KeyboardLocale<M> {
    pub fn id(&self) -> LayoutId {
        self.id
    }

    pub fn tables(&self) -> LayoutTables {
        self.tables
    }
}

/// The layout a translation should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveLayout {
    pub id: LayoutId,
    pub tables: LayoutTables,
}

/// Loaded layouts keyed by id, plus the current one.
#[derive(Debug)]
pub struct LocaleCache<M> {
    locales: BTreeMap<LayoutId, KeyboardLocale<M>>,
    current: Option<LayoutId>,
    dead_key: DeadKeyState,
    layout: KbdTablesLayout,
}

impl<M> LocaleCache<M> {
    pub fn new(layout: KbdTablesLayout) -> Self {
        Self {
            locales: BTreeMap::new(),
            current: None,
            dead_key: DeadKeyState::new(),
            layout,
        }
    }

    /// Builds an empty cache whose descriptor layout matches `platform`.
    pub fn for_platform<P>(platform: &P) -> Self
    where
        P: LayoutPlatform<Module = M> + ?Sized,
    {
        let wow64 = platform.is_wow64();
        if wow64 {
            tracing::debug!("running under WOW64; padding descriptor pointers");
        }
        Self::new(KbdTablesLayout::new(platform.pointer_width(), wow64))
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    pub fn contains(&self, id: LayoutId) -> bool {
        self.locales.contains_key(&id)
    }

    /// Cached layout ids in ascending order.
    pub fn ids(&self) -> Vec<LayoutId> {
        self.locales.keys().copied().collect()
    }

    pub fn current_id(&self) -> Option<LayoutId> {
        self.current
    }

    pub fn current(&self) -> Option<&KeyboardLocale<M>> {
        self.current.and_then(|id| self.locales.get(&id))
    }

    pub fn dead_key(&self) -> &DeadKeyState {
        &self.dead_key
    }

    pub fn dead_key_mut(&mut self) -> &mut DeadKeyState {
        &mut self.dead_key
    }

    pub fn descriptor_layout(&self) -> KbdTablesLayout {
        self.layout
    }

    fn set_current(&mut self, id: Option<LayoutId>) {
        if self.current != id {
            self.dead_key.reset();
        }
        self.current = id;
    }

    /// Reconciles the cache with the OS list of active layouts.
    ///
    /// Returns the number of cached layouts afterwards.  On enumeration
    /// failure the cache is left untouched and 0 is returned.  The calling
    /// thread's default layout is re-activated on every exit path.
    pub fn refresh<P>(&mut self, platform: &mut P) -> usize
    where
        P: LayoutPlatform<Module = M> + ?Sized,
    {
        let focus = platform.focused_layout();
        let default = platform.thread_layout();
        let mut platform = RestoreLayout { platform, default };

        let live = match platform.active_layouts() {
            Ok(live) => live,
            Err(err) => {
                tracing::error!(error = %err, "layout enumeration failed; cache unchanged");
                return 0;
            }
        };
        tracing::debug!(count = live.len(), "received active layouts");

        let stale: Vec<LayoutId> = self
            .locales
            .keys()
            .filter(|id| !live.contains(id))
            .copied()
            .collect();
        for id in stale {
            tracing::debug!(%id, "removing layout from cache");
            self.locales.remove(&id);
            if self.current == Some(id) {
                self.set_current(None);
            }
        }

        if let Some(focus) = focus.filter(|id| self.locales.contains_key(id)) {
            self.set_current(Some(focus));
        }

        for &id in &live {
            if self.locales.contains_key(&id) {
                continue;
            }

            platform.activate_layout(id);
            match self.load_locale(&mut *platform, id) {
                Ok(locale) => {
                    tracing::debug!(%id, "loaded layout");
                    self.locales.insert(id, locale);
                    if focus == Some(id) {
                        self.set_current(Some(id));
                    }
                }
                Err(err) => {
                    tracing::error!(%id, error = %err, "skipping layout");
                }
            }
        }

        self.locales.len()
    }

    fn load_locale<P>(&self, platform: &mut P, id: LayoutId) -> Result<KeyboardLocale<M>, LocaleError>
    where
        P: LayoutPlatform<Module = M> + ?Sized,
    {
        let loaded = platform.load_active_module(id)?;
        let tables = self.layout.read_tables(platform.memory(), loaded.descriptor)?;
        Ok(KeyboardLocale {
            id,
            tables,
            _module: loaded.module,
        })
    }

    /// Makes the focused window's layout current and returns it.
    ///
    /// Falls back to the calling thread's layout when the focus query fails.
    /// A layout missing from the cache triggers one refresh.
    pub fn activate_focused<P>(&mut self, platform: &mut P) -> Option<ActiveLayout>
    where
        P: LayoutPlatform<Module = M> + ?Sized,
    {
        let wanted = platform
            .focused_layout()
            .unwrap_or_else(|| platform.thread_layout());

        if self.current != Some(wanted) {
            if self.locales.contains_key(&wanted) {
                tracing::debug!(id = %wanted, "activating cached layout");
                self.set_current(Some(wanted));
            } else {
                self.set_current(None);
                tracing::debug!(id = %wanted, "layout not cached; refreshing");
                self.refresh(platform);
                if self.locales.contains_key(&wanted) {
                    self.set_current(Some(wanted));
                }
            }
        }

        self.current().map(|locale| ActiveLayout {
            id: locale.id,
            tables: locale.tables,
        })
    }

    /// Releases every cached layout.  Returns how many were released.
    pub fn unload(&mut self) -> usize {
        let released = self.locales.len();
        self.locales.clear();
        self.set_current(None);
        released
    }
}
