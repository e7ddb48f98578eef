//! Theme configuration
//!
//! A theme is everything that distinguishes one reskin of the machine from
//! another: its symbol set, which symbol is wild (and which, if any, is
//! scatter), the payout table, bonus rules and reel timing. The engine itself
//! is theme-agnostic.

use serde::{Deserialize, Serialize};

use crate::sim::SymbolId;

/// Built-in theme presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ThemeKind {
    #[default]
    Classic,
    Nfl,
    Octocat,
}

impl ThemeKind {
    pub const ALL: [ThemeKind; 3] = [ThemeKind::Classic, ThemeKind::Nfl, ThemeKind::Octocat];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeKind::Classic => "Classic",
            ThemeKind::Nfl => "NFL",
            ThemeKind::Octocat => "Octocat",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" | "generic" => Some(ThemeKind::Classic),
            "nfl" => Some(ThemeKind::Nfl),
            "octocat" | "octocats" => Some(ThemeKind::Octocat),
            _ => None,
        }
    }

    /// Build the preset theme
    pub fn theme(&self) -> Theme {
        match self {
            ThemeKind::Classic => Theme::classic(),
            ThemeKind::Nfl => Theme::nfl(),
            ThemeKind::Octocat => Theme::octocat(),
        }
    }

    /// Paylines active when a session starts
    pub fn initial_paylines(&self) -> u32 {
        match self {
            ThemeKind::Classic => 3,
            ThemeKind::Nfl | ThemeKind::Octocat => 5,
        }
    }
}

/// Three-of-a-kind payout for one symbol, as a multiple of the bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutEntry {
    pub symbol: SymbolId,
    pub multiplier: u32,
}

/// Payout table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutTable {
    /// Explicit three-of-a-kind multipliers
    pub entries: Vec<PayoutEntry>,
    /// Three-of-a-kind multiplier for symbols without an entry
    pub default_multiplier: u32,
    /// Two matching symbols plus at least one wild
    pub wild_pair_multiplier: u32,
}

impl PayoutTable {
    /// Multiplier for three of `symbol` on a line
    pub fn three_of_a_kind(&self, symbol: SymbolId) -> u32 {
        self.entries
            .iter()
            .find(|e| e.symbol == symbol)
            .map(|e| e.multiplier)
            .unwrap_or(self.default_multiplier)
    }
}

/// Free-spin bonus rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusRules {
    /// Scatter symbols needed anywhere on the grid to trigger
    pub scatter_threshold: usize,
    /// Free spins granted per trigger
    pub free_spins: u32,
    /// Win multiplier while free spins remain
    pub multiplier: u32,
}

impl Default for BonusRules {
    fn default() -> Self {
        Self {
            scatter_threshold: 3,
            free_spins: 10,
            multiplier: 2,
        }
    }
}

/// Reel stop animation timing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReelTiming {
    /// Delay between successive reels starting (ms)
    pub stagger_ms: f32,
    /// Minimum spin duration per reel (ms)
    pub base_duration_ms: f32,
    /// Random extra duration, uniform in [0, jitter) (ms)
    pub duration_jitter_ms: f32,
    /// Scroll speed at full spin (px per reference frame)
    pub base_speed: f32,
    /// Height of one symbol cell (px); offsets wrap at this value
    pub reel_height: f32,
}

impl Default for ReelTiming {
    fn default() -> Self {
        Self {
            stagger_ms: 300.0,
            base_duration_ms: 1000.0,
            duration_jitter_ms: 500.0,
            base_speed: 20.0,
            reel_height: 100.0,
        }
    }
}

/// A complete theme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    /// Ordered symbol identifiers; `SymbolId(i)` names `symbols[i]`
    pub symbols: Vec<String>,
    pub wild: SymbolId,
    #[serde(default)]
    pub scatter: Option<SymbolId>,
    pub payouts: PayoutTable,
    #[serde(default)]
    pub bonus: BonusRules,
    #[serde(default)]
    pub timing: ReelTiming,
}

impl Theme {
    /// Number of symbols in the set
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Display name for a symbol
    pub fn symbol_name(&self, symbol: SymbolId) -> &str {
        self.symbols
            .get(symbol.index())
            .map(String::as_str)
            .unwrap_or("?")
    }

    /// Look up a symbol by name
    pub fn symbol_id(&self, name: &str) -> Option<SymbolId> {
        self.symbols
            .iter()
            .position(|s| s == name)
            .map(|i| SymbolId(i as u8))
    }

    pub fn is_wild(&self, symbol: SymbolId) -> bool {
        symbol == self.wild
    }

    pub fn is_scatter(&self, symbol: SymbolId) -> bool {
        self.scatter == Some(symbol)
    }

    /// Assemble a theme from symbol names
    ///
    /// Payout entries naming symbols outside the set are skipped.
    fn from_names(
        name: &str,
        symbols: &[&str],
        wild: usize,
        scatter: Option<usize>,
        payouts: &[(&str, u32)],
        timing: ReelTiming,
    ) -> Self {
        let symbols: Vec<String> = symbols.iter().map(|s| s.to_string()).collect();
        let entries = payouts
            .iter()
            .filter_map(|(sym, multiplier)| {
                symbols.iter().position(|s| s == sym).map(|i| PayoutEntry {
                    symbol: SymbolId(i as u8),
                    multiplier: *multiplier,
                })
            })
            .collect();

        Self {
            name: name.to_string(),
            symbols,
            wild: SymbolId(wild as u8),
            scatter: scatter.map(|i| SymbolId(i as u8)),
            payouts: PayoutTable {
                entries,
                default_multiplier: 10,
                wild_pair_multiplier: 5,
            },
            bonus: BonusRules::default(),
            timing,
        }
    }

    /// Fruit-machine theme; no scatter symbol
    pub fn classic() -> Self {
        Self::from_names(
            "Classic",
            &[
                "bell", "cherry", "clover", "diamond", "jackpot", "lemon", "seven", "star", "wild",
            ],
            8,
            None,
            &[
                ("jackpot", 100),
                ("seven", 50),
                ("diamond", 25),
                ("star", 20),
                ("wild", 30),
            ],
            ReelTiming::default(),
        )
    }

    /// Football theme; packers is wild, no scatter
    pub fn nfl() -> Self {
        Self::from_names(
            "NFL",
            &[
                "chiefs", "eagles", "cowboys", "49ers", "bills", "dolphins", "ravens", "lions",
                "packers",
            ],
            8,
            None,
            &[
                ("chiefs", 100),
                ("eagles", 75),
                ("cowboys", 50),
                ("49ers", 50),
                ("bills", 25),
                ("dolphins", 25),
                ("ravens", 20),
                ("lions", 20),
                ("packers", 30),
            ],
            ReelTiming {
                base_speed: 8.0,
                ..ReelTiming::default()
            },
        )
    }

    /// Octocat theme; class-act is wild, spocktocat is scatter
    pub fn octocat() -> Self {
        Self::from_names(
            "Octocat",
            &[
                "original",
                "Robotocat",
                "dinotocat",
                "spidertocat",
                "droidtocat",
                "jetpacktocat",
                "adventure-cat",
                "class-act",
                "spocktocat",
            ],
            7,
            Some(8),
            &[
                ("original", 100),
                ("Robotocat", 75),
                ("dinotocat", 50),
                ("spidertocat", 30),
                ("droidtocat", 25),
                ("jetpacktocat", 25),
                ("adventure-cat", 20),
                ("class-act", 40),
                // Scatter pays through the bonus, never on a line
                ("spocktocat", 0),
            ],
            ReelTiming {
                stagger_ms: 350.0,
                base_duration_ms: 1200.0,
                duration_jitter_ms: 400.0,
                base_speed: 7.0,
                reel_height: 95.0,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_kind_from_str() {
        assert_eq!(ThemeKind::from_str("NFL"), Some(ThemeKind::Nfl));
        assert_eq!(ThemeKind::from_str("octocats"), Some(ThemeKind::Octocat));
        assert_eq!(ThemeKind::from_str("Generic"), Some(ThemeKind::Classic));
        assert_eq!(ThemeKind::from_str("poker"), None);
        for kind in ThemeKind::ALL {
            assert_eq!(ThemeKind::from_str(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_presets_have_nine_symbols_and_named_wild() {
        assert_eq!(Theme::classic().symbol_name(Theme::classic().wild), "wild");
        assert_eq!(Theme::nfl().symbol_name(Theme::nfl().wild), "packers");

        let octo = Theme::octocat();
        assert_eq!(octo.symbol_name(octo.wild), "class-act");
        assert_eq!(octo.scatter.map(|s| octo.symbol_name(s)), Some("spocktocat"));

        for kind in ThemeKind::ALL {
            let theme = kind.theme();
            assert_eq!(theme.symbol_count(), 9);
            // Every configured payout made it into the table
            assert!(theme.payouts.entries.len() >= 5);
        }
    }

    #[test]
    fn test_payout_lookup_falls_back_to_default() {
        let theme = Theme::classic();
        let seven = theme.symbol_id("seven").unwrap();
        let lemon = theme.symbol_id("lemon").unwrap();
        assert_eq!(theme.payouts.three_of_a_kind(seven), 50);
        assert_eq!(theme.payouts.three_of_a_kind(lemon), 10);
        assert_eq!(theme.payouts.three_of_a_kind(theme.wild), 30);
    }

    #[test]
    fn test_unknown_symbol_name() {
        let theme = Theme::classic();
        assert_eq!(theme.symbol_id("packers"), None);
        assert_eq!(theme.symbol_name(SymbolId(200)), "?");
    }
}
