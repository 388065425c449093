//! Byte layout of a keyboard layout provider's root descriptor (`KBDTABLES`).
//!
//! Layout:
//! ```text
//! offset 0 * (W + P)   pCharModifiers   -> MODIFIERS { pVkToBit, ... }
//! offset 1 * (W + P)   pVkToWcharTable  -> VK_TO_WCHAR_TABLE[]
//! offset 2 * (W + P)   pDeadKey         -> DEADKEY[]
//! ```
//! `W` is the native pointer width of the process.  `P` is the WOW64 padding:
//! a 32-bit process on a 64-bit OS still sees the provider's 64-bit pointer
//! fields, so every field after the first is shifted by one extra pointer width
//! per preceding field.  `P` is zero everywhere else.
//!
//! All reads go through [`DescriptorMemory`], so this module is the only
//! place that knows the ABI.

use thiserror::Error;

/// Size in bytes of one `DEADKEY` record: `u32 both`, `u16 composed`, `u16 flags`.
pub const DEAD_KEY_RECORD_SIZE: usize = 8;

/// Errors raised while reading descriptor memory.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DescriptorError {
    /// The address is null or outside readable memory.
    #[error("unreadable descriptor address {address:#X} ({len} bytes)")]
    Unreadable { address: usize, len: usize },

    /// Only 4- and 8-byte pointers are supported.
    #[error("unsupported pointer width: {0}")]
    UnsupportedPointerWidth(usize),
}

/// Raw read access to the memory a provider module exposes.
pub trait DescriptorMemory {
    /// Copies `out.len()` bytes starting at `address`.
    fn read_bytes(&self, address: usize, out: &mut [u8]) -> Result<(), DescriptorError>;

    fn read_u16(&self, address: usize) -> Result<u16, DescriptorError> {
        let mut buf = [0u8; 2];
        self.read_bytes(address, &mut buf)?;
        Ok(u16::from_ne_bytes(buf))
    }

    fn read_u32(&self, address: usize) -> Result<u32, DescriptorError> {
        let mut buf = [0u8; 4];
        self.read_bytes(address, &mut buf)?;
        Ok(u32::from_ne_bytes(buf))
    }

    /// Reads a pointer of `width` bytes and widens it to `usize`.
    fn read_ptr(&self, address: usize, width: usize) -> Result<usize, DescriptorError> {
        match width {
            4 => Ok(self.read_u32(address)? as usize),
            8 => {
                let mut buf = [0u8; 8];
                self.read_bytes(address, &mut buf)?;
                Ok(u64::from_ne_bytes(buf) as usize)
            }
            other => Err(DescriptorError::UnsupportedPointerWidth(other)),
        }
    }
}

/// Field offsets of `KBDTABLES` for one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KbdTablesLayout {
    pointer_width: usize,
    padding: usize,
}

impl KbdTablesLayout {
    const CHAR_MODIFIERS: usize = 0;
    const VK_TO_WCHAR: usize = 1;
    const DEAD_KEY: usize = 2;

    /// Builds the layout for a process with the given pointer width.
    ///
    /// Under WOW64 the padding equals the pointer width.
    pub const fn new(pointer_width: usize, wow64: bool) -> Self {
        Self {
            pointer_width,
            padding: if wow64 { pointer_width } else { 0 },
        }
    }

    /// The layout of the running process.
    pub const fn native(wow64: bool) -> Self {
        Self::new(std::mem::size_of::<usize>(), wow64)
    }

    pub const fn pointer_width(&self) -> usize {
        self.pointer_width
    }

    pub const fn padding(&self) -> usize {
        self.padding
    }

    /// Byte offset of the `index`-th pointer field.
    pub const fn field_offset(&self, index: usize) -> usize {
        index * self.pointer_width + index * self.padding
    }

    /// Reads the three table addresses from the descriptor at `base`.
    pub fn read_tables<M>(&self, memory: &M, base: usize) -> Result<LayoutTables, DescriptorError>
    where
        M: DescriptorMemory + ?Sized,
    {
        if base == 0 {
            return Err(DescriptorError::Unreadable {
                address: base,
                len: self.pointer_width,
            });
        }

        let char_modifiers =
            memory.read_ptr(base + self.field_offset(Self::CHAR_MODIFIERS), self.pointer_width)?;
        // `pVkToBit` is the first member of MODIFIERS.
        let vk_to_bit = memory.read_ptr(char_modifiers, self.pointer_width)?;
        let vk_to_wchar =
            memory.read_ptr(base + self.field_offset(Self::VK_TO_WCHAR), self.pointer_width)?;
        let dead_keys =
            memory.read_ptr(base + self.field_offset(Self::DEAD_KEY), self.pointer_width)?;

        Ok(LayoutTables {
            vk_to_bit,
            vk_to_wchar,
            dead_keys,
        })
    }
}

/// Addresses of the character tables of one loaded layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutTables {
    pub vk_to_bit: usize,
    pub vk_to_wchar: usize,
    /// May be 0 for layouts without dead keys.
    pub dead_keys: usize,
}

/// One `DEADKEY` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadKeyRecord {
    /// `typed | dead << 16`.
    pub both: u32,
    pub composed: u16,
    pub flags: u16,
}

impl DeadKeyRecord {
    pub const fn dead(&self) -> u16 {
        (self.both >> 16) as u16
    }

    pub const fn typed(&self) -> u16 {
        (self.both & 0xFFFF) as u16
    }

    /// Reads the `index`-th record of the table at `table`.
    pub fn read<M>(memory: &M, table: usize, index: usize) -> Result<Self, DescriptorError>
    where
        M: DescriptorMemory + ?Sized,
    {
        let at = table + index * DEAD_KEY_RECORD_SIZE;
        Ok(Self {
            both: memory.read_u32(at)?,
            composed: memory.read_u16(at + 4)?,
            flags: memory.read_u16(at + 6)?,
        })
    }
}

/// Simulated provider memory: a flat byte image mapped at a base address.
///
/// Used by tests and the in-process mock platform.
#[derive(Debug, Clone, Default)]
pub struct ByteImage {
    base: usize,
    bytes: Vec<u8>,
}

impl ByteImage {
    pub fn new(base: usize, size: usize) -> Self {
        Self {
            base,
            bytes: vec![0; size],
        }
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn write(&mut self, address: usize, data: &[u8]) {
        let start = address - self.base;
        self.bytes[start..start + data.len()].copy_from_slice(data);
    }

    /// Writes a pointer of `width` bytes in native byte order.
    pub fn write_ptr(&mut self, address: usize, value: usize, width: usize) {
        match width {
            4 => self.write(address, &(value as u32).to_ne_bytes()),
            _ => self.write(address, &(value as u64).to_ne_bytes()),
        }
    }

    pub fn write_dead_key(&mut self, table: usize, index: usize, record: DeadKeyRecord) {
        let at = table + index * DEAD_KEY_RECORD_SIZE;
        self.write(at, &record.both.to_ne_bytes());
        self.write(at + 4, &record.composed.to_ne_bytes());
        self.write(at + 6, &record.flags.to_ne_bytes());
    }
}

impl DescriptorMemory for ByteImage {
    fn read_bytes(&self, address: usize, out: &mut [u8]) -> Result<(), DescriptorError> {
        let unreadable = DescriptorError::Unreadable {
            address,
            len: out.len(),
        };
        let start = address.checked_sub(self.base).ok_or(unreadable.clone())?;
        let end = start.checked_add(out.len()).ok_or(unreadable.clone())?;
        let src = self.bytes.get(start..end).ok_or(unreadable)?;
        out.copy_from_slice(src);
        Ok(())
    }
}
