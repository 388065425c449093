//! Dead-key composition for non-destructive translation.
//!
//! The message-hook resolver asks the OS to translate *without* touching the
//! keyboard state, so the OS never remembers that a dead key (`^`, `´`, `¨`)
//! was pressed.  [`DeadKeyState`] keeps that one pending character instead and
//! combines it with the next producing key through the layout's `DEADKEY`
//! table.

use super::descriptor::{DeadKeyRecord, DescriptorError, DescriptorMemory};

/// Placeholder character for "no dead key" in layout tables (`WCH_NONE`).
pub const WCH_NONE: u16 = 0xF000;

/// Upper bound on records scanned in one `DEADKEY` table.
const MAX_DEAD_KEY_RECORDS: usize = 4096;

/// Searches a `DEADKEY` table for the composition of `dead` and `typed`.
///
/// Returns `Ok(None)` when the table is absent or has no matching record.
pub fn lookup_composition<M>(
    memory: &M,
    table: usize,
    dead: u16,
    typed: u16,
) -> Result<Option<u16>, DescriptorError>
where
    M: DescriptorMemory + ?Sized,
{
    if table == 0 {
        return Ok(None);
    }

    let wanted = u32::from(typed) | (u32::from(dead) << 16);
    for index in 0..MAX_DEAD_KEY_RECORDS {
        let record = DeadKeyRecord::read(memory, table, index)?;
        if record.both == 0 {
            break;
        }
        if record.both == wanted {
            return Ok(Some(record.composed));
        }
    }
    Ok(None)
}

/// The pending dead character of the active layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeadKeyState {
    pending: Option<u16>,
}

impl DeadKeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<u16> {
        self.pending
    }

    pub fn reset(&mut self) {
        self.pending = None;
    }

    /// Folds one raw translation result into the output buffer.
    ///
    /// `result` is the translator's return value: negative for a dead key
    /// (whose spacing character sits in `out[0]`), otherwise the number of
    /// units written to `out`.  Returns the number of units the caller should
    /// report.
    pub fn apply<M>(&mut self, memory: &M, table: usize, result: i32, out: &mut [u16]) -> usize
    where
        M: DescriptorMemory + ?Sized,
    {
        if result < 0 {
            if let Some(&dead) = out.first() {
                tracing::debug!(dead, "stored pending dead key");
                self.pending = (dead != WCH_NONE).then_some(dead);
            }
            return 0;
        }

        let count = (result as usize).min(out.len());
        if count == 0 {
            return 0;
        }

        let Some(dead) = self.pending.take() else {
            return count;
        };

        match lookup_composition(memory, table, dead, out[0]) {
            Ok(Some(composed)) => {
                out[0] = composed;
                1
            }
            Ok(None) => prepend(dead, out, count),
            Err(err) => {
                tracing::warn!(error = %err, "dead key table unreadable");
                prepend(dead, out, count)
            }
        }
    }
}

/// Writes `dead` before the first `count` units of `out`, truncating to fit.
fn prepend(dead: u16, out: &mut [u16], count: usize) -> usize {
    let total = (count + 1).min(out.len());
    out.copy_within(0..total - 1, 1);
    out[0] = dead;
    total
}
