//! Payline evaluation
//!
//! Pure scoring of a committed grid. Nothing here touches session state; the
//! spin controller applies the result (credits, bonus trigger) afterwards.

use serde::{Deserialize, Serialize};

use super::grid::{Grid, SymbolId};
use super::payline::{Payline, active_paylines};
use crate::consts::REEL_COUNT;
use crate::theme::Theme;

/// How a line won
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineMatch {
    /// Three equal symbols after wild substitution
    ThreeOfAKind(SymbolId),
    /// Two equal non-wild symbols alongside a wild
    WildPair(SymbolId),
}

impl LineMatch {
    pub fn symbol(&self) -> SymbolId {
        match *self {
            LineMatch::ThreeOfAKind(s) | LineMatch::WildPair(s) => s,
        }
    }
}

/// A paying line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinningLine {
    pub payline: Payline,
    /// Raw symbols under the line, before substitution
    pub symbols: [SymbolId; REEL_COUNT],
    pub matched: LineMatch,
    /// Line payout before the bonus multiplier
    pub amount: u64,
}

/// Celebration level for a spin's total win
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WinTier {
    Small,
    Medium,
    Big,
    Jackpot,
}

impl WinTier {
    /// Tier for `amount` won on `bet`, `None` for no win
    pub fn classify(amount: u64, bet: u64) -> Option<Self> {
        if amount == 0 {
            None
        } else if amount >= bet.saturating_mul(100) {
            Some(WinTier::Jackpot)
        } else if amount >= bet.saturating_mul(50) {
            Some(WinTier::Big)
        } else if amount >= bet.saturating_mul(20) {
            Some(WinTier::Medium)
        } else {
            Some(WinTier::Small)
        }
    }
}

/// Outcome of one evaluated spin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinResult {
    pub grid: Grid,
    /// Paying lines in payline order
    pub winning_lines: Vec<WinningLine>,
    /// Sum of line payouts before the multiplier
    pub line_total: u64,
    /// Bonus multiplier in effect for this spin
    pub multiplier: u32,
    /// Credited amount (`line_total * multiplier`)
    pub total_winnings: u64,
    /// Scatter symbols anywhere on the grid
    pub scatter_count: usize,
    /// Scatter count reached the theme's threshold
    pub bonus_triggered: bool,
}

impl SpinResult {
    pub fn is_win(&self) -> bool {
        self.total_winnings > 0
    }
}

/// Replace every wild with the first non-wild symbol on the line
///
/// An all-wild line is left as is.
pub fn substitute_wilds(theme: &Theme, symbols: [SymbolId; REEL_COUNT]) -> [SymbolId; REEL_COUNT] {
    let Some(stand_in) = symbols.iter().copied().find(|&s| !theme.is_wild(s)) else {
        return symbols;
    };
    symbols.map(|s| if theme.is_wild(s) { stand_in } else { s })
}

/// Score a single line, `None` if it pays nothing
pub fn evaluate_line(
    theme: &Theme,
    symbols: [SymbolId; REEL_COUNT],
    bet: u64,
) -> Option<(LineMatch, u64)> {
    let [a, b, c] = substitute_wilds(theme, symbols);
    if a == b && b == c {
        // A zero-paying triple (scatter) settles the line; it does not fall
        // through to the wild pair rule.
        let amount = bet.saturating_mul(theme.payouts.three_of_a_kind(a) as u64);
        return (amount > 0).then_some((LineMatch::ThreeOfAKind(a), amount));
    }

    // Unreached with first-non-wild substitution: a wild plus two equal
    // symbols is already a triple and settled above.
    if symbols.iter().any(|&s| theme.is_wild(s)) {
        let mut non_wild = symbols.iter().copied().filter(|&s| !theme.is_wild(s));
        if let (Some(x), Some(y), None) = (non_wild.next(), non_wild.next(), non_wild.next()) {
            if x == y {
                let amount = bet.saturating_mul(theme.payouts.wild_pair_multiplier as u64);
                return (amount > 0).then_some((LineMatch::WildPair(x), amount));
            }
        }
    }

    None
}

/// Score a grid against the active paylines
///
/// Each line is scored independently; a cell shared by two winning lines
/// counts for both. The summed line payouts are scaled by `multiplier`. The
/// scatter check covers all nine cells regardless of paylines.
pub fn evaluate(
    theme: &Theme,
    grid: &Grid,
    payline_count: u32,
    bet: u64,
    multiplier: u32,
) -> SpinResult {
    let winning_lines: Vec<WinningLine> = active_paylines(payline_count)
        .filter_map(|payline| {
            let symbols = payline.symbols(grid);
            evaluate_line(theme, symbols, bet).map(|(matched, amount)| WinningLine {
                payline: *payline,
                symbols,
                matched,
                amount,
            })
        })
        .collect();

    let line_total = winning_lines
        .iter()
        .fold(0u64, |acc, line| acc.saturating_add(line.amount));
    let multiplier = multiplier.max(1);
    let total_winnings = line_total.saturating_mul(multiplier as u64);

    let scatter_count = grid.cells().filter(|&s| theme.is_scatter(s)).count();
    let bonus_triggered = theme.scatter.is_some() && scatter_count >= theme.bonus.scatter_threshold;

    SpinResult {
        grid: *grid,
        winning_lines,
        line_total,
        multiplier,
        total_winnings,
        scatter_count,
        bonus_triggered,
    }
}
