//! Pointer button remapping for the extension-based backend.
//!
//! X11 lets the user remap logical buttons to physical ones (left-handed
//! mice, for example).  The mapping is re-read from the server on every
//! lookup because it can change at any time.  X11 also numbers the middle and
//! right buttons the other way round from every other platform, so the
//! result is always normalized by swapping buttons 2 and 3.

/// Largest pointer mapping the server can report.
pub const BUTTON_TABLE_MAX: usize = 256;

/// Source of the live logical-to-physical pointer mapping.
pub trait PointerMappingSource {
    /// Fills `out` with the mapping and returns its length, or `None` if the
    /// display connection is unavailable.
    fn pointer_mapping(&self, out: &mut [u8]) -> Option<usize>;
}

/// Resolves logical buttons through the OS mapping.
#[derive(Debug, Default)]
pub struct PointerButtonMapper {
    table: Option<Vec<u8>>,
}

impl PointerButtonMapper {
    /// A mapper without a mapping buffer; lookups only normalize.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the mapping buffer.
    pub fn load(&mut self) {
        self.table = Some(vec![0; BUTTON_TABLE_MAX]);
    }

    /// Releases the mapping buffer.
    pub fn unload(&mut self) {
        self.table = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }

    /// Maps a logical button to its normalized physical number.
    pub fn map_button<S>(&mut self, source: &S, logical: u32) -> u32
    where
        S: PointerMappingSource + ?Sized,
    {
        let mut button = logical;

        match self.table.as_deref_mut() {
            Some(table) => match source.pointer_mapping(table) {
                Some(len) => {
                    let len = len.min(table.len());
                    if (1..=len as u32).contains(&logical) {
                        button = u32::from(table[logical as usize - 1]);
                    }
                }
                None => tracing::warn!("display unavailable; pointer mapping skipped"),
            },
            None => tracing::warn!("pointer mapping buffer unavailable"),
        }

        normalize(button)
    }
}

/// Swaps buttons 2 and 3.
pub const fn normalize(button: u32) -> u32 {
    match button {
        2 => 3,
        3 => 2,
        other => other,
    }
}
