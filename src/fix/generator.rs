// Mon Oct 19 2026 - Alex

use crate::fix::x86::{InstructionEncoder, JMP_REL8, NOP};
use crate::fix::FixError;
use crate::pattern::{Captures, Pattern};

pub const THEN_START: &str = "then_start";
pub const THEN_END: &str = "then_end";
pub const ELSE_START: &str = "else_start";
pub const ELSE_END: &str = "else_end";
pub const TAIL: &str = "tail";
pub const SIGNAL: &str = "signal";
pub const END: &str = "end";

/// Offsets of a timer call sequence, relative to the start of the match.
///
/// ```text
/// [0, then_start)          preamble ending in a short jcc over the "then" arm
/// [then_start, then_end)   arm A: argument setup
/// [then_end, else_start)   call task_vtimer_set; jmp over the "else" branch
/// [else_start, else_end)   arm B: same bytes as arm A
/// [else_end, tail)         call task_vtimer_clear
/// [tail, end)              argument setup for psignal_internal, rewritten
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteLayout {
    pub then_start: usize,
    pub then_end: usize,
    pub else_start: usize,
    pub else_end: usize,
    pub tail: usize,
    pub signal: usize,
    pub end: usize,
}

impl SiteLayout {
    /// Checks that a target pattern carries every mark the rewrite reads and
    /// that the marks describe a well-formed sequence.
    pub fn from_pattern(pattern: &Pattern) -> Result<Self, FixError> {
        let layout = Self::resolve(|label| pattern.mark_by_label(label).map(|m| m.index))?;

        let ordered = layout.then_start >= 2
            && layout.then_start <= layout.then_end
            && layout.then_end + 2 <= layout.else_start
            && layout.else_start <= layout.else_end
            && layout.else_end + 4 <= layout.tail
            && layout.tail <= layout.end
            && layout.signal < pattern.len()
            && layout.end <= pattern.len();
        if !ordered {
            return Err(FixError::InvalidLayout(pattern.to_hex_string()));
        }

        Ok(layout)
    }

    pub fn from_captures(captures: &Captures) -> Result<Self, FixError> {
        let start = captures.start();
        Self::resolve(|label| captures.offset(label).map(|offset| offset - start))
    }

    fn resolve(lookup: impl Fn(&'static str) -> Option<usize>) -> Result<Self, FixError> {
        let get = |label| lookup(label).ok_or(FixError::MissingCapture(label));
        Ok(Self {
            then_start: get(THEN_START)?,
            then_end: get(THEN_END)?,
            else_start: get(ELSE_START)?,
            else_end: get(ELSE_END)?,
            tail: get(TAIL)?,
            signal: get(SIGNAL)?,
            end: get(END)?,
        })
    }

    pub fn arm_len(&self) -> usize {
        self.then_end - self.then_start
    }
}

/// One matched timer call sequence: a read-only view into the target region.
pub struct CallSite<'a> {
    offset: usize,
    code: &'a [u8],
    layout: SiteLayout,
}

impl<'a> CallSite<'a> {
    pub fn new(offset: usize, code: &'a [u8], layout: SiteLayout) -> Self {
        Self { offset, code, layout }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn budget(&self) -> usize {
        self.layout.end
    }

    pub fn then_arm(&self) -> &'a [u8] {
        &self.code[self.layout.then_start..self.layout.then_end]
    }

    pub fn else_arm(&self) -> &'a [u8] {
        &self.code[self.layout.else_start..self.layout.else_end]
    }

    pub fn signal(&self) -> u8 {
        self.code[self.layout.signal]
    }

    pub fn validate(&self) -> Result<(), FixError> {
        if self.then_arm() != self.else_arm() {
            return Err(FixError::MirroredArmsMismatch { offset: self.offset });
        }

        let jcc_at = self.layout.then_start - 2;
        let opcode = self.code[jcc_at];
        if !InstructionEncoder::is_short_conditional_jump(opcode) {
            return Err(FixError::MissingConditionalBranch {
                offset: self.offset + jcc_at,
                opcode,
            });
        }

        let jmp_at = self.layout.else_start - 2;
        let opcode = self.code[jmp_at];
        if opcode != JMP_REL8 {
            return Err(FixError::MissingUnconditionalBranch {
                offset: self.offset + jmp_at,
                opcode,
            });
        }

        Ok(())
    }

    /// Builds the replacement for `[0, end)`.
    ///
    /// The shared arm is hoisted in front of the branch so it runs on both
    /// paths. Every branch that crosses the old arm position shrinks by the
    /// arm length, and the "else" call moves backwards by the same amount.
    /// The freed tail then sets up `psignal_internal(NULL, 0, current_thread(),
    /// 4, signal)` using the thread pointer at `%gs:tls_offset`.
    pub fn rewrite(&self, tls_offset: u32) -> Result<Vec<u8>, FixError> {
        self.validate()?;

        let l = &self.layout;
        let old = self.code;
        let shift = l.arm_len();
        let mut new = Vec::with_capacity(l.end);

        new.extend_from_slice(self.then_arm());

        new.extend_from_slice(&old[..l.then_start]);
        shorten_last_rel8(&mut new, shift);

        new.extend_from_slice(&old[l.then_end..l.else_start]);
        shorten_last_rel8(&mut new, shift);

        new.extend_from_slice(&old[l.else_end..l.tail]);
        let call_end = new.len();
        let rel_at = call_end - 4;
        let rel = u32::from_le_bytes([new[rel_at], new[rel_at + 1], new[rel_at + 2], new[rel_at + 3]]);
        let rel = rel.wrapping_add(l.tail as u32).wrapping_sub(call_end as u32);
        new[rel_at..call_end].copy_from_slice(&rel.to_le_bytes());

        new.extend_from_slice(&InstructionEncoder::encode_signal_arguments(tls_offset, self.signal()));

        let used = new.len();
        if used > l.end {
            return Err(FixError::PatchTooLarge {
                offset: self.offset,
                len: used,
                budget: l.end,
            });
        }
        new.resize(l.end, NOP);

        log::debug!(
            "rewrote timer call at {:#x}: {} of {} bytes used, signal {:#x}",
            self.offset,
            used,
            l.end,
            self.signal()
        );

        Ok(new)
    }
}

fn shorten_last_rel8(code: &mut [u8], by: usize) {
    if let Some(last) = code.last_mut() {
        *last = last.wrapping_sub(by as u8);
    }
}
