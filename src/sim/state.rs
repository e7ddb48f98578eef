//! Spin controller and session state
//!
//! `SlotMachine` exclusively owns the grid, credits, bonus state and the
//! spinning flag. A spin deducts the stake, fixes the outcome, then runs the
//! three reel animations; only once all three report stopped is the grid
//! committed, evaluated and paid.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::animation::{ReelAnimation, ReelFrame};
use super::bonus::BonusState;
use super::evaluate::{SpinResult, WinTier, WinningLine, evaluate};
use super::grid::{Grid, generate_grid};
use super::rng::{RandomSource, RngState};
use crate::config::GameConfig;
use crate::consts::{PAYLINE_STEP, REEL_COUNT};
use crate::theme::Theme;

/// Notifications for presentation (effects, audio, HUD)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpinEvent {
    SpinStarted {
        free_spin: bool,
    },
    ReelStopped {
        reel: usize,
    },
    Win {
        amount: u64,
        lines: Vec<WinningLine>,
        tier: WinTier,
    },
    BonusTriggered {
        free_spins: u32,
        multiplier: u32,
    },
    /// Last free spin taken; multiplier back to 1
    BonusEnded,
}

/// Resolves to the committed result of one spin
///
/// Yields `None` if the machine is dropped before the reels stop.
#[derive(Debug)]
pub struct SpinTicket {
    receiver: oneshot::Receiver<SpinResult>,
}

impl Future for SpinTicket {
    type Output = Option<SpinResult>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx).map(Result::ok)
    }
}

/// Outcome fixed at spin start, waiting on the reels
#[derive(Debug)]
struct PendingSpin {
    grid: Grid,
    free_spin: bool,
    ticket: oneshot::Sender<SpinResult>,
}

/// A slot machine session
#[derive(Debug)]
pub struct SlotMachine<R: RandomSource = Pcg32> {
    config: GameConfig,
    rng: R,
    grid: Grid,
    credits: u64,
    bet: u64,
    paylines: u32,
    bonus: BonusState,
    reels: [ReelAnimation; REEL_COUNT],
    pending: Option<PendingSpin>,
    last_result: Option<SpinResult>,
    events: Vec<SpinEvent>,
    spins_played: u64,
}

impl SlotMachine<Pcg32> {
    /// Session with a seeded PCG stream
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, RngState::new(seed).to_rng())
    }
}

impl<R: RandomSource> SlotMachine<R> {
    /// Session drawing from `rng`
    ///
    /// # Panics
    /// If `config` fails validation; configurations from untrusted sources
    /// should go through `GameConfig::from_json` first.
    pub fn with_rng(config: GameConfig, mut rng: R) -> Self {
        if let Err(e) = config.validate() {
            panic!("invalid game config: {e}");
        }

        let grid = generate_grid(&config.theme, &mut rng);
        log::info!(
            "{} machine ready: {} credits, bet {}, {} paylines",
            config.theme.name,
            config.initial_credits,
            config.bet,
            config.paylines
        );

        Self {
            credits: config.initial_credits,
            bet: config.bet,
            paylines: config.paylines,
            config,
            rng,
            grid,
            bonus: BonusState::default(),
            reels: [ReelAnimation::stopped(); REEL_COUNT],
            pending: None,
            last_result: None,
            events: Vec::new(),
            spins_played: 0,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.config.theme
    }

    /// Last committed grid (the outcome of an in-flight spin stays hidden)
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn credits(&self) -> u64 {
        self.credits
    }

    pub fn bet(&self) -> u64 {
        self.bet
    }

    pub fn paylines(&self) -> u32 {
        self.paylines
    }

    pub fn max_paylines(&self) -> u32 {
        self.config.max_paylines
    }

    pub fn bonus(&self) -> &BonusState {
        &self.bonus
    }

    #[inline]
    pub fn is_spinning(&self) -> bool {
        self.pending.is_some()
    }

    pub fn spins_played(&self) -> u64 {
        self.spins_played
    }

    pub fn last_result(&self) -> Option<&SpinResult> {
        self.last_result.as_ref()
    }

    /// Offset and speed of each reel for the current frame
    pub fn reel_frames(&self) -> [ReelFrame; REEL_COUNT] {
        self.reels.map(|r| r.frame())
    }

    pub fn reels(&self) -> &[ReelAnimation; REEL_COUNT] {
        &self.reels
    }

    /// A spin would start right now
    pub fn can_spin(&self) -> bool {
        !self.is_spinning() && (self.bonus.is_active() || self.credits >= self.bet)
    }

    /// Take pending notifications
    pub fn drain_events(&mut self) -> Vec<SpinEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start a spin
    ///
    /// Returns `None` without touching any state if a spin is already in
    /// flight, or if no free spin is pending and credits are below the bet.
    pub fn spin(&mut self) -> Option<SpinTicket> {
        if self.is_spinning() {
            log::debug!("Spin ignored: reels still turning");
            return None;
        }

        let free_spin = self.bonus.is_active();
        if free_spin {
            if self.bonus.consume_spin() {
                log::info!("Last free spin");
                self.events.push(SpinEvent::BonusEnded);
            }
        } else if self.credits < self.bet {
            log::debug!("Spin rejected: {} credits, bet {}", self.credits, self.bet);
            return None;
        } else {
            self.credits -= self.bet;
        }

        let grid = generate_grid(&self.config.theme, &mut self.rng);
        let timing = self.config.theme.timing;
        let rng = &mut self.rng;
        self.reels = std::array::from_fn(|reel| ReelAnimation::start(reel, &timing, rng.next_unit()));

        let (sender, receiver) = oneshot::channel();
        self.pending = Some(PendingSpin {
            grid,
            free_spin,
            ticket: sender,
        });
        self.events.push(SpinEvent::SpinStarted { free_spin });
        log::debug!(
            "Spin {} started (free: {}, credits: {})",
            self.spins_played + 1,
            free_spin,
            self.credits
        );

        Some(SpinTicket { receiver })
    }

    /// Advance reel animations by `dt_ms`
    ///
    /// Returns the result on the frame the last reel stops.
    pub fn advance(&mut self, dt_ms: f32) -> Option<SpinResult> {
        if self.pending.is_none() {
            return None;
        }

        let timing = self.config.theme.timing;
        for (reel, animation) in self.reels.iter_mut().enumerate() {
            if animation.advance(dt_ms, &timing) {
                log::debug!("Reel {} stopped", reel);
                self.events.push(SpinEvent::ReelStopped { reel });
            }
        }

        if !self.reels.iter().all(ReelAnimation::is_stopped) {
            return None;
        }

        let pending = self.pending.take()?;
        Some(self.commit(pending))
    }

    /// Run the current spin to completion without frame pacing
    pub fn finish_spin(&mut self) -> Option<SpinResult> {
        let remaining = self
            .reels
            .iter()
            .map(ReelAnimation::stop_time_ms)
            .fold(0.0f32, f32::max);
        self.advance(remaining + 1.0)
    }

    fn commit(&mut self, pending: PendingSpin) -> SpinResult {
        self.grid = pending.grid;
        let theme = &self.config.theme;
        let result = evaluate(theme, &self.grid, self.paylines, self.bet, self.bonus.multiplier());
        for line in &result.winning_lines {
            log::debug!(
                "Line {} pays {} ({})",
                line.payline.index,
                line.amount,
                theme.symbol_name(line.matched.symbol())
            );
        }

        if result.bonus_triggered {
            self.bonus.trigger(&theme.bonus);
            log::info!(
                "Bonus round! {} scatters: {} free spins at {}x",
                result.scatter_count,
                self.bonus.free_spins_remaining(),
                self.bonus.multiplier()
            );
            self.events.push(SpinEvent::BonusTriggered {
                free_spins: theme.bonus.free_spins,
                multiplier: self.bonus.multiplier(),
            });
        }

        self.credits = self.credits.saturating_add(result.total_winnings);
        if let Some(tier) = WinTier::classify(result.total_winnings, self.bet) {
            if tier >= WinTier::Big {
                log::info!("{:?} win: {} credits", tier, result.total_winnings);
            } else {
                log::debug!("Win: {} credits", result.total_winnings);
            }
            self.events.push(SpinEvent::Win {
                amount: result.total_winnings,
                lines: result.winning_lines.clone(),
                tier,
            });
        }

        self.spins_played += 1;
        log::debug!(
            "Spin {} committed (free: {}): won {}, credits {}",
            self.spins_played,
            pending.free_spin,
            result.total_winnings,
            self.credits
        );

        // The ticket may have been dropped; that is fine
        let _ = pending.ticket.send(result.clone());
        self.last_result = Some(result.clone());
        result
    }

    /// Raise the payline count by one step, capped at the maximum
    ///
    /// Ignored while spinning. Returns the count in effect.
    pub fn increase_paylines(&mut self) -> u32 {
        if !self.is_spinning() {
            self.paylines = self.paylines.saturating_add(PAYLINE_STEP).min(self.config.max_paylines);
        }
        self.paylines
    }

    /// Lower the payline count by one step, floored at 1
    ///
    /// Ignored while spinning. Returns the count in effect.
    pub fn decrease_paylines(&mut self) -> u32 {
        if !self.is_spinning() {
            self.paylines = self.paylines.saturating_sub(PAYLINE_STEP).max(1);
        }
        self.paylines
    }

    /// Change the stake; rejected while spinning or for a zero bet
    pub fn set_bet(&mut self, bet: u64) -> bool {
        if bet == 0 || self.is_spinning() {
            return false;
        }
        self.bet = bet;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MS;
    use crate::sim::grid::SymbolId;
    use crate::sim::rng::SequenceSource;
    use crate::theme::ThemeKind;
    use futures::FutureExt;
    use proptest::prelude::*;

    /// Reel-major draw order for a grid given as screen rows
    fn draws(rows: [[u8; 3]; 3]) -> Vec<usize> {
        let mut out = Vec::with_capacity(9);
        for reel in 0..3 {
            for row in rows {
                out.push(row[reel] as usize);
            }
        }
        out
    }

    /// Initial grid then the listed spins, all scripted
    fn scripted(kind: ThemeKind, spins: &[[[u8; 3]; 3]]) -> SlotMachine<SequenceSource> {
        // Initial grid: bell/cherry/clover style pattern with no wins
        let mut indices = draws([[0, 1, 2], [3, 4, 5], [6, 0, 1]]);
        for spin in spins {
            indices.extend(draws(*spin));
        }
        SlotMachine::with_rng(GameConfig::from_preset(kind), SequenceSource::new(indices, vec![0.5]))
    }

    fn run_frames<R: RandomSource>(machine: &mut SlotMachine<R>) -> SpinResult {
        for _ in 0..1000 {
            if let Some(result) = machine.advance(FRAME_MS) {
                return result;
            }
        }
        panic!("spin never finished");
    }

    // Classic: 0 bell, 1 cherry, 2 clover, 3 diamond, 4 jackpot, 5 lemon, 6 seven, 7 star, 8 wild
    const CLASSIC_SEVENS_TOP: [[u8; 3]; 3] = [[6, 6, 6], [5, 7, 3], [6, 0, 4]];
    const CLASSIC_BLANK: [[u8; 3]; 3] = [[0, 1, 2], [5, 7, 3], [6, 0, 4]];

    #[test]
    fn test_new_machine_state() {
        let machine = SlotMachine::new(GameConfig::default(), 1);
        assert_eq!(machine.credits(), 1000);
        assert_eq!(machine.bet(), 10);
        assert_eq!(machine.paylines(), 3);
        assert!(!machine.is_spinning());
        assert!(machine.can_spin());
        assert!(machine.grid().cells().all(|s| s.index() < 9));
    }

    #[test]
    #[should_panic(expected = "invalid game config")]
    fn test_invalid_config_panics() {
        let mut config = GameConfig::default();
        config.theme.symbols.clear();
        let _ = SlotMachine::new(config, 1);
    }

    #[test]
    fn test_spin_commits_only_after_all_reels_stop() {
        let mut machine = scripted(ThemeKind::Classic, &[CLASSIC_SEVENS_TOP]);
        let before = *machine.grid();
        let ticket = machine.spin().unwrap();
        assert!(machine.is_spinning());
        assert_eq!(machine.credits(), 990);

        // First reel alone stopping must not commit
        let first_stop = machine.reels()[0].stop_time_ms();
        assert!(machine.advance(first_stop + 1.0).is_none());
        assert!(machine.reels()[0].is_stopped());
        assert!(!machine.reels()[2].is_stopped());
        assert_eq!(*machine.grid(), before);

        let result = run_frames(&mut machine);
        assert!(!machine.is_spinning());
        assert_eq!(result.winning_lines.len(), 1);
        assert_eq!(result.winning_lines[0].payline.index, 0);
        assert_eq!(result.total_winnings, 500);
        assert_eq!(machine.credits(), 990 + 500);
        assert_eq!(machine.grid().row(0), [SymbolId(6); 3]);

        let resolved = ticket.now_or_never().flatten();
        assert_eq!(resolved, Some(result));
    }

    #[test]
    fn test_spin_while_spinning_is_noop() {
        let mut machine = scripted(ThemeKind::Classic, &[CLASSIC_BLANK, CLASSIC_SEVENS_TOP]);
        machine.spin().unwrap();
        machine.drain_events();
        let credits = machine.credits();
        let grid = *machine.grid();
        let bonus = *machine.bonus();
        let reels = *machine.reels();

        assert!(machine.spin().is_none());
        assert_eq!(machine.credits(), credits);
        assert_eq!(*machine.grid(), grid);
        assert_eq!(*machine.bonus(), bonus);
        assert_eq!(*machine.reels(), reels);
        assert!(machine.drain_events().is_empty());

        // The in-flight outcome is the first scripted spin, not the second
        let result = machine.finish_spin().unwrap();
        assert_eq!(result.total_winnings, 0);
    }

    #[test]
    fn test_insufficient_credits_rejected() {
        let mut config = GameConfig::default();
        config.initial_credits = 9;
        let mut machine = SlotMachine::new(config, 5);
        let grid = *machine.grid();
        assert!(!machine.can_spin());
        assert!(machine.spin().is_none());
        assert_eq!(machine.credits(), 9);
        assert_eq!(*machine.grid(), grid);
        assert!(!machine.is_spinning());
        assert!(machine.drain_events().is_empty());
    }

    #[test]
    fn test_exact_credits_allowed() {
        let mut config = GameConfig::default();
        config.initial_credits = 10;
        let mut machine = SlotMachine::new(config, 5);
        assert!(machine.spin().is_some());
        assert_eq!(machine.credits(), 0);
    }

    #[test]
    fn test_scatter_bonus_round() {
        // Octocat: 7 class-act (wild), 8 spocktocat (scatter)
        let scatter_spin = [[8, 0, 1], [2, 3, 8], [4, 8, 5]];
        // Jetpacktocat (5) across the top: 25x
        let jetpack_top = [[5, 5, 5], [0, 1, 2], [3, 4, 6]];
        let mut machine = scripted(ThemeKind::Octocat, &[scatter_spin, jetpack_top]);

        machine.spin().unwrap();
        let result = machine.finish_spin().unwrap();
        assert_eq!(result.total_winnings, 0);
        assert!(result.bonus_triggered);
        assert_eq!(machine.bonus().free_spins_remaining(), 10);
        assert_eq!(machine.bonus().multiplier(), 2);
        assert_eq!(machine.credits(), 990);

        let events = machine.drain_events();
        assert!(events.contains(&SpinEvent::BonusTriggered {
            free_spins: 10,
            multiplier: 2
        }));

        // Free spin: no deduction, winnings doubled
        machine.spin().unwrap();
        assert_eq!(machine.credits(), 990);
        assert_eq!(machine.bonus().free_spins_remaining(), 9);
        let result = machine.finish_spin().unwrap();
        assert_eq!(result.line_total, 250);
        assert_eq!(result.multiplier, 2);
        assert_eq!(machine.credits(), 990 + 500);
    }

    #[test]
    fn test_last_free_spin_returns_to_idle() {
        let mut machine = SlotMachine::new(GameConfig::from_preset(ThemeKind::Octocat), 11);
        machine.bonus.trigger(&crate::theme::BonusRules {
            free_spins: 1,
            ..Default::default()
        });
        let credits = machine.credits();

        machine.spin().unwrap();
        assert!(!machine.bonus().is_active());
        assert_eq!(machine.bonus().multiplier(), 1);
        assert_eq!(machine.credits(), credits);
        assert!(machine.drain_events().contains(&SpinEvent::BonusEnded));

        let result = machine.finish_spin().unwrap();
        assert_eq!(result.multiplier, 1);
    }

    #[test]
    fn test_free_spin_ignores_credit_gate() {
        let mut config = GameConfig::from_preset(ThemeKind::Octocat);
        config.initial_credits = 0;
        let mut machine = SlotMachine::new(config, 2);
        assert!(machine.spin().is_none());
        let rules = machine.config.theme.bonus;
        machine.bonus.trigger(&rules);
        assert!(machine.spin().is_some());
        assert_eq!(machine.credits(), 0);
        let result = machine.finish_spin().unwrap();
        assert_eq!(machine.credits(), result.total_winnings);
    }

    #[test]
    fn test_events_in_order() {
        let mut machine = scripted(ThemeKind::Classic, &[CLASSIC_SEVENS_TOP]);
        machine.spin().unwrap();
        run_frames(&mut machine);
        let events = machine.drain_events();
        assert_eq!(events[0], SpinEvent::SpinStarted { free_spin: false });
        let stops: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                SpinEvent::ReelStopped { reel } => Some(*reel),
                _ => None,
            })
            .collect();
        assert_eq!(stops.len(), 3);
        match events.last() {
            Some(SpinEvent::Win { amount, tier, lines }) => {
                assert_eq!(*amount, 500);
                assert_eq!(*tier, WinTier::Big);
                assert_eq!(lines.len(), 1);
            }
            other => panic!("expected win event, got {:?}", other),
        }
    }

    #[test]
    fn test_payline_adjustment() {
        let mut machine = SlotMachine::new(GameConfig::default(), 3);
        assert_eq!(machine.increase_paylines(), 5);
        for _ in 0..20 {
            machine.increase_paylines();
        }
        assert_eq!(machine.paylines(), 25);
        for _ in 0..20 {
            machine.decrease_paylines();
        }
        assert_eq!(machine.paylines(), 1);

        machine.spin().unwrap();
        assert_eq!(machine.increase_paylines(), 1);
        assert!(!machine.set_bet(20));
        machine.finish_spin().unwrap();
        assert!(machine.set_bet(20));
        assert!(!machine.set_bet(0));
        assert_eq!(machine.bet(), 20);
    }

    #[test]
    fn test_payline_cap_at_u32_max() {
        let mut config = GameConfig::default();
        config.max_paylines = u32::MAX;
        config.paylines = u32::MAX - 1;
        let json = config.to_json().unwrap();
        let mut machine = SlotMachine::new(GameConfig::from_json(&json).unwrap(), 6);
        assert_eq!(machine.increase_paylines(), u32::MAX);
        assert_eq!(machine.increase_paylines(), u32::MAX);
        assert_eq!(machine.decrease_paylines(), u32::MAX - 2);
    }

    #[test]
    fn test_same_seed_same_session() {
        let mut a = SlotMachine::new(GameConfig::from_preset(ThemeKind::Nfl), 99);
        let mut b = SlotMachine::new(GameConfig::from_preset(ThemeKind::Nfl), 99);
        for _ in 0..20 {
            a.spin();
            b.spin();
            assert_eq!(a.finish_spin(), b.finish_spin());
            assert_eq!(a.credits(), b.credits());
        }
    }

    #[test]
    fn test_dropped_machine_cancels_ticket() {
        let mut machine = SlotMachine::new(GameConfig::default(), 4);
        let ticket = machine.spin().unwrap();
        drop(machine);
        assert_eq!(futures::executor::block_on(ticket), None);
    }

    #[test]
    fn test_ticket_resolves_through_executor() {
        let mut machine = SlotMachine::new(GameConfig::default(), 8);
        let ticket = machine.spin().unwrap();
        let committed = machine.finish_spin();
        assert_eq!(futures::executor::block_on(ticket), committed);
    }

    proptest! {
        #[test]
        fn prop_credit_conservation(seed in any::<u64>(), kind in 0usize..3, lines in 1u32..=25) {
            let mut config = GameConfig::from_preset(ThemeKind::ALL[kind]);
            config.paylines = lines;
            let mut machine = SlotMachine::new(config, seed);
            for _ in 0..30 {
                let before = machine.credits();
                let free = machine.bonus().is_active();
                if machine.spin().is_none() {
                    prop_assert!(!free && before < machine.bet());
                    break;
                }
                let result = machine.finish_spin().unwrap();
                let stake = if free { 0 } else { machine.bet() };
                prop_assert_eq!(machine.credits(), before - stake + result.total_winnings);
                prop_assert_eq!(result.grid.cells().count(), 9);
            }
        }
    }
}
