/// Bead positions for one rod
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeadState {
    /// the heaven bead (worth 5) is pushed to the beam
    pub five: bool,
    /// number of earth beads (worth 1 each) pushed to the beam, 0..=4
    pub ones: u8,
}

impl BeadState {
    pub fn from_digit(digit: u8) -> Self {
        Self {
            five: digit >= 5,
            ones: digit % 5,
        }
    }

    pub fn value(&self) -> u8 {
        if self.five {
            5 + self.ones
        } else {
            self.ones
        }
    }
}

/// Decimal digits of `value`, most significant first, zero padded to `columns`.
///
/// Values wider than `columns` keep all of their digits.
pub fn digits_of(value: i64, columns: usize) -> Vec<u8> {
    let text = format!("{:0>width$}", value.unsigned_abs(), width = columns);
    text.bytes().map(|b| b - b'0').collect()
}

pub fn beads_for(value: i64, columns: usize) -> Vec<BeadState> {
    digits_of(value, columns)
        .into_iter()
        .map(BeadState::from_digit)
        .collect()
}
