//! Half-word realignment for the double-rate datapath.
//!
//! Capturing two bus clocks per controller cycle leaves the sampling phase ambiguous: a
//! word can arrive split across two cycles, with its first half-word in the low half of
//! one sample and its second half-word in the high half of the next. A strobe that is set
//! in the low half while clear in the high half can only come from such a split, so the
//! realigner latches a one-half-word shift on that pattern and keeps it until chip select
//! rises.

const HALF: u32 = 16;
const RWDS_HALF: u32 = 2;

/// Combines the low half of `prev` with the high half of `cur`.
pub(crate) const fn splice(prev: (u32, u8), cur: (u32, u8)) -> (u32, u8) {
    let dq = (prev.0 << HALF) | (cur.0 >> HALF);
    let rwds = ((prev.1 << RWDS_HALF) | (cur.1 >> RWDS_HALF)) & 0b1111;
    (dq, rwds)
}

/// Sticky half-word shifter on the receive path.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalfWordAligner {
    prev: (u32, u8),
    shifted: bool,
}

impl HalfWordAligner {
    /// Creates an aligner with no shift latched.
    pub const fn new() -> Self {
        Self {
            prev: (0, 0),
            shifted: false,
        }
    }

    /// Returns `true` once a shift has been latched for the current transaction.
    pub const fn is_shifted(&self) -> bool {
        self.shifted
    }

    /// Realigns one sampled word.
    ///
    /// # Arguments
    ///
    /// * `cs_n` - Chip select as currently driven; a deselected bus clears the shift.
    /// * `dq` - Sampled data lanes.
    /// * `rwds` - Sampled RWDS lanes.
    ///
    /// # Returns
    ///
    /// The data and strobe lanes with both half-words taken from the same bus word.
    pub fn align(&mut self, cs_n: bool, dq: u32, rwds: u8) -> (u32, u8) {
        if cs_n {
            self.shifted = false;
        } else if rwds & 0b0011 != 0 && rwds & 0b1100 == 0 {
            self.shifted = true;
        }
        let cur = (dq, rwds);
        let out = if self.shifted { splice(self.prev, cur) } else { cur };
        self.prev = cur;
        out
    }
}
