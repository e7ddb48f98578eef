//! Symbols, reels and the outcome generator

use serde::{Deserialize, Serialize};

use super::rng::RandomSource;
use crate::consts::{REEL_COUNT, ROW_COUNT};
use crate::theme::Theme;

/// Index into a theme's symbol set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u8);

impl SymbolId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Visible symbols of one reel, top to bottom
pub type Reel = [SymbolId; ROW_COUNT];

/// The 3x3 window, stored reel-major
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    reels: [Reel; REEL_COUNT],
}

impl Grid {
    pub fn from_reels(reels: [Reel; REEL_COUNT]) -> Self {
        Self { reels }
    }

    /// Build from rows as they appear on screen (row 0 on top)
    pub fn from_rows(rows: [[SymbolId; REEL_COUNT]; ROW_COUNT]) -> Self {
        Self {
            reels: std::array::from_fn(|reel| std::array::from_fn(|row| rows[row][reel])),
        }
    }

    /// Every cell holds the same symbol
    pub fn filled(symbol: SymbolId) -> Self {
        Self {
            reels: [[symbol; ROW_COUNT]; REEL_COUNT],
        }
    }

    pub fn reels(&self) -> &[Reel; REEL_COUNT] {
        &self.reels
    }

    pub fn reel(&self, reel: usize) -> &Reel {
        &self.reels[reel]
    }

    #[inline]
    pub fn get(&self, reel: usize, row: usize) -> SymbolId {
        self.reels[reel][row]
    }

    pub fn row(&self, row: usize) -> [SymbolId; REEL_COUNT] {
        std::array::from_fn(|reel| self.reels[reel][row])
    }

    /// All nine cells, reel by reel
    pub fn cells(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.reels.iter().flatten().copied()
    }

}

/// Draw a fresh grid
///
/// Each cell is an independent uniform draw (with replacement) from the
/// theme's symbol set, reel by reel, top to bottom. Symbols are not weighted
/// by payout.
pub fn generate_grid<R: RandomSource + ?Sized>(theme: &Theme, rng: &mut R) -> Grid {
    let n = theme.symbol_count();
    assert!(n > 0, "symbol set must not be empty");

    Grid {
        reels: std::array::from_fn(|_| {
            std::array::from_fn(|_| SymbolId(rng.next_index(n) as u8))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::{RngState, SequenceSource};
    use proptest::prelude::*;

    #[test]
    fn test_from_rows_transposes() {
        let s = |i| SymbolId(i);
        let grid = Grid::from_rows([[s(0), s(1), s(2)], [s(3), s(4), s(5)], [s(6), s(7), s(8)]]);
        assert_eq!(grid.reel(0), &[s(0), s(3), s(6)]);
        assert_eq!(grid.get(2, 1), s(5));
        assert_eq!(grid.row(2), [s(6), s(7), s(8)]);
    }

    #[test]
    fn test_generate_draws_reel_major() {
        let theme = Theme::classic();
        let mut seq = SequenceSource::indices((0..9).collect());
        let grid = generate_grid(&theme, &mut seq);
        assert_eq!(grid.reel(0), &[SymbolId(0), SymbolId(1), SymbolId(2)]);
        assert_eq!(grid.reel(2), &[SymbolId(6), SymbolId(7), SymbolId(8)]);
    }

    #[test]
    fn test_every_symbol_reachable() {
        let theme = Theme::octocat();
        let mut rng = RngState::new(3).to_rng();
        let mut seen = [false; 9];
        for _ in 0..200 {
            for s in generate_grid(&theme, &mut rng).cells() {
                seen[s.index()] = true;
            }
        }
        assert!(seen.iter().all(|&b| b));
    }

    proptest! {
        #[test]
        fn prop_grid_is_full_and_in_set(seed in any::<u64>(), kind in 0usize..3) {
            let theme = crate::theme::ThemeKind::ALL[kind].theme();
            let mut rng = RngState::new(seed).to_rng();
            let grid = generate_grid(&theme, &mut rng);
            prop_assert_eq!(grid.reels().len(), REEL_COUNT);
            prop_assert_eq!(grid.cells().count(), REEL_COUNT * ROW_COUNT);
            prop_assert!(grid.cells().all(|s| s.index() < theme.symbol_count()));
        }
    }
}
