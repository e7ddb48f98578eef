//! Payline shapes and activation
//!
//! Seven shapes exist on a 3x3 window. They switch on in a fixed priority
//! order as the player raises the payline count: the three rows one by one,
//! then both diagonals at 5, then both V shapes at 9. Counts above 9 add no
//! further shapes.

use serde::{Deserialize, Serialize};

use super::grid::{Grid, SymbolId};
use crate::consts::REEL_COUNT;

/// Geometric family of a payline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaylineShape {
    Horizontal,
    Diagonal,
    V,
}

/// One path across the grid, one cell per reel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Payline {
    /// Stable line number (0-based, in activation order)
    pub index: u8,
    pub shape: PaylineShape,
    /// Row visited on each reel
    pub rows: [u8; REEL_COUNT],
    /// Payline count at which this line becomes active
    pub min_paylines: u32,
}

impl Payline {
    const fn new(index: u8, shape: PaylineShape, rows: [u8; REEL_COUNT], min_paylines: u32) -> Self {
        Self {
            index,
            shape,
            rows,
            min_paylines,
        }
    }

    #[inline]
    pub fn is_active(&self, payline_count: u32) -> bool {
        payline_count >= self.min_paylines
    }

    /// (reel, row) coordinates in reel order
    pub fn cells(&self) -> [(usize, usize); REEL_COUNT] {
        std::array::from_fn(|reel| (reel, self.rows[reel] as usize))
    }

    /// Symbols under this line, in reel order
    pub fn symbols(&self, grid: &Grid) -> [SymbolId; REEL_COUNT] {
        std::array::from_fn(|reel| grid.get(reel, self.rows[reel] as usize))
    }
}

/// Every payline, in activation order
pub const PAYLINES: [Payline; 7] = [
    Payline::new(0, PaylineShape::Horizontal, [0, 0, 0], 1),
    Payline::new(1, PaylineShape::Horizontal, [1, 1, 1], 2),
    Payline::new(2, PaylineShape::Horizontal, [2, 2, 2], 3),
    // Top-left to bottom-right, then bottom-left to top-right
    Payline::new(3, PaylineShape::Diagonal, [0, 1, 2], 5),
    Payline::new(4, PaylineShape::Diagonal, [2, 1, 0], 5),
    Payline::new(5, PaylineShape::V, [0, 1, 0], 9),
    Payline::new(6, PaylineShape::V, [2, 1, 2], 9),
];

/// Lines evaluated for a given payline count, in priority order
pub fn active_paylines(payline_count: u32) -> impl Iterator<Item = &'static Payline> {
    PAYLINES.iter().filter(move |p| p.is_active(payline_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_thresholds() {
        let counts: Vec<usize> = (0..=12).map(|n| active_paylines(n).count()).collect();
        assert_eq!(counts, vec![0, 1, 2, 3, 3, 5, 5, 5, 5, 7, 7, 7, 7]);
        assert_eq!(active_paylines(25).count(), PAYLINES.len());
    }

    #[test]
    fn test_three_lines_are_the_rows() {
        let lines: Vec<_> = active_paylines(3).collect();
        assert!(lines.iter().all(|p| p.shape == PaylineShape::Horizontal));
        assert_eq!(lines[2].rows, [2, 2, 2]);
    }

    #[test]
    fn test_indices_follow_priority() {
        for (i, line) in PAYLINES.iter().enumerate() {
            assert_eq!(line.index as usize, i);
        }
        assert!(PAYLINES.windows(2).all(|w| w[0].min_paylines <= w[1].min_paylines));
    }

    #[test]
    fn test_cells_and_symbols() {
        let s = SymbolId;
        let grid = Grid::from_rows([[s(0), s(1), s(2)], [s(3), s(4), s(5)], [s(6), s(7), s(8)]]);
        assert_eq!(PAYLINES[3].cells(), [(0, 0), (1, 1), (2, 2)]);
        assert_eq!(PAYLINES[3].symbols(&grid), [s(0), s(4), s(8)]);
        assert_eq!(PAYLINES[4].symbols(&grid), [s(6), s(4), s(2)]);
        assert_eq!(PAYLINES[5].symbols(&grid), [s(0), s(4), s(2)]);
        assert_eq!(PAYLINES[6].symbols(&grid), [s(6), s(4), s(8)]);
    }
}
