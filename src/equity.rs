//! Monte Carlo equity estimation.
//!
//! Each trial completes the board and deals every opponent two cards from
//! the unknown pool, then compares hand categories at showdown:
//!
//! ```text
//! pool ──partial shuffle──▶ [ board fill | opp 1 | opp 2 | ... ]
//!                                │           │       │
//!                 hero + board ──┴── classify ┴───────┘
//! ```
//!
//! Hero wins a trial only when every opponent's category is strictly lower.
//! Equal categories count as a loss; there is no pot splitting.
//!
//! Randomness is always supplied by the caller (or derived from an explicit
//! seed), so any run can be replayed bit-for-bit.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::Serialize;

use crate::card::{format_cards, Card};
use crate::deck::{build_deck, unknown_pool};
use crate::error::{EquityError, Result};
use crate::evaluator::{classify, HandCategory};

pub const MAX_OPPONENTS: usize = 9;
pub const BOARD_SIZE: usize = 5;

/// Trials per independent RNG stream in [`Simulation::run_parallel`].
const CHUNK_TRIALS: usize = 250;

// ── Tallies ─────────────────────────────────────────────────────────

/// Per-category trial counts, indexed by category rank.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTally {
    counts: [u64; 10],
}

impl CategoryTally {
    #[inline]
    pub fn record(&mut self, category: HandCategory) {
        self.counts[category.rank() as usize] += 1;
    }

    pub fn count(&self, category: HandCategory) -> u64 {
        self.counts[category.rank() as usize]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn merge(&mut self, other: &CategoryTally) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            *mine += theirs;
        }
    }

    /// Most frequent category. Ties go to the earliest category in
    /// strength order, so an empty tally reports High Card.
    pub fn modal(&self) -> HandCategory {
        let mut best = HandCategory::HighCard;
        for category in HandCategory::ALL {
            if self.count(category) > self.count(best) {
                best = category;
            }
        }
        best
    }

    /// `(category, count)` pairs in strength order.
    pub fn iter(&self) -> impl Iterator<Item = (HandCategory, u64)> + '_ {
        HandCategory::ALL.into_iter().map(move |c| (c, self.count(c)))
    }
}

#[derive(Clone, Debug, Default)]
struct Outcome {
    wins: u64,
    tally: CategoryTally,
}

impl Outcome {
    fn merge(mut self, other: Outcome) -> Outcome {
        self.wins += other.wins;
        self.tally.merge(&other.tally);
        self
    }
}

/// Aggregated result of a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Estimate {
    /// Share of trials won, 0.0 to 100.0.
    pub win_percentage: f64,
    pub modal_category: HandCategory,
    pub wins: u64,
    pub trials: u64,
    pub tally: CategoryTally,
}

impl Estimate {
    fn from_outcome(outcome: Outcome, trials: usize) -> Self {
        let trials = trials as u64;
        Estimate {
            win_percentage: 100.0 * outcome.wins as f64 / trials as f64,
            modal_category: outcome.tally.modal(),
            wins: outcome.wins,
            trials,
            tally: outcome.tally,
        }
    }
}

// ── Simulation ──────────────────────────────────────────────────────

/// A validated hand/board/opponent triple with its unknown pool.
///
/// Building one checks every input once; running it any number of times
/// afterwards cannot fail on input shape.
#[derive(Clone, Debug)]
pub struct Simulation {
    hole: [Card; 2],
    board: Vec<Card>,
    opponents: usize,
    pool: Vec<Card>,
}

impl Simulation {
    pub fn new(hole: &[Card], board: &[Card], opponents: usize) -> Result<Self> {
        let hole: [Card; 2] = hole
            .try_into()
            .map_err(|_| EquityError::HoleCardCount(hole.len()))?;
        if board.len() > BOARD_SIZE {
            return Err(EquityError::CommunityCardCount(board.len()));
        }
        if !(1..=MAX_OPPONENTS).contains(&opponents) {
            return Err(EquityError::OpponentCount(opponents));
        }

        let known: Vec<Card> = hole.iter().chain(board).copied().collect();
        let mut seen = 0u64;
        for card in &known {
            let bit = 1u64 << card.id();
            if seen & bit != 0 {
                return Err(EquityError::DuplicateCard(*card));
            }
            seen |= bit;
        }

        let pool = unknown_pool(&build_deck(), &known)?;
        let simulation = Simulation {
            hole,
            board: board.to_vec(),
            opponents,
            pool,
        };

        let needed = simulation.cards_needed();
        if simulation.pool.len() < needed {
            return Err(EquityError::PoolExhausted {
                available: simulation.pool.len(),
                needed,
            });
        }

        log::debug!(
            "simulation: hole [{}] board [{}] vs {} opponents, {} unknown cards",
            format_cards(&simulation.hole),
            format_cards(&simulation.board),
            opponents,
            simulation.pool.len()
        );
        Ok(simulation)
    }

    pub fn hole(&self) -> &[Card; 2] {
        &self.hole
    }

    pub fn board(&self) -> &[Card] {
        &self.board
    }

    pub fn opponents(&self) -> usize {
        self.opponents
    }

    /// Cards not yet known to be in play.
    pub fn pool(&self) -> &[Card] {
        &self.pool
    }

    /// Cards dealt per trial: the board fill plus two per opponent.
    pub fn cards_needed(&self) -> usize {
        (BOARD_SIZE - self.board.len()) + 2 * self.opponents
    }

    /// Run `trials` sequential trials driven by `rng`.
    pub fn run<R: Rng + ?Sized>(&self, trials: usize, rng: &mut R) -> Result<Estimate> {
        self.finish(trials, self.run_trials(trials, rng, None))
    }

    /// Like [`Simulation::run`], but stops between trials once `cancel`
    /// is set.
    pub fn run_cancellable<R: Rng + ?Sized>(
        &self,
        trials: usize,
        rng: &mut R,
        cancel: &AtomicBool,
    ) -> Result<Estimate> {
        self.finish(trials, self.run_trials(trials, rng, Some(cancel)))
    }

    /// Run trials across the rayon pool.
    ///
    /// Trials are split into fixed-size chunks; chunk `i` draws from the
    /// seeded stream advanced by `i` jumps. The partition does not depend on
    /// the number of threads, so a seed always yields the same estimate.
    pub fn run_parallel(&self, trials: usize, seed: u64) -> Result<Estimate> {
        if trials == 0 {
            return Err(EquityError::ZeroTrials);
        }
        let chunks = trials.div_ceil(CHUNK_TRIALS);
        let mut stream = Xoshiro256PlusPlus::seed_from_u64(seed);
        let streams: Vec<Xoshiro256PlusPlus> = (0..chunks)
            .map(|_| {
                let current = stream.clone();
                stream.jump();
                current
            })
            .collect();

        let outcome = streams
            .into_par_iter()
            .enumerate()
            .map(|(i, mut rng)| {
                let n = CHUNK_TRIALS.min(trials - i * CHUNK_TRIALS);
                self.run_trials(n, &mut rng, None)
            })
            .try_reduce(Outcome::default, |a, b| Ok(a.merge(b)));

        self.finish(trials, outcome)
    }

    fn finish(&self, trials: usize, outcome: Result<Outcome>) -> Result<Estimate> {
        let estimate = Estimate::from_outcome(outcome?, trials);
        log::info!(
            "estimated [{}] vs {} opponents: {:.2}% over {} trials, mostly {}",
            format_cards(&self.hole),
            self.opponents,
            estimate.win_percentage,
            estimate.trials,
            estimate.modal_category
        );
        Ok(estimate)
    }

    fn run_trials<R: Rng + ?Sized>(
        &self,
        trials: usize,
        rng: &mut R,
        cancel: Option<&AtomicBool>,
    ) -> Result<Outcome> {
        if trials == 0 {
            return Err(EquityError::ZeroTrials);
        }
        let mut scratch = self.pool.clone();
        let mut outcome = Outcome::default();

        for completed in 0..trials {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Err(EquityError::Cancelled { completed });
            }
            let (won, category) = self.trial(&mut scratch, rng);
            outcome.wins += won as u64;
            outcome.tally.record(category);
        }
        Ok(outcome)
    }

    /// One showdown. Returns whether hero won and hero's category.
    fn trial<R: Rng + ?Sized>(&self, scratch: &mut [Card], rng: &mut R) -> (bool, HandCategory) {
        // A uniform shuffle of any arrangement is uniform, so the scratch
        // deck carries over between trials without being reset.
        let (dealt, _) = scratch.partial_shuffle(rng, self.cards_needed());
        let (fill, villains) = dealt.split_at(BOARD_SIZE - self.board.len());

        let mut hand = [self.hole[0]; 7];
        hand[..2].copy_from_slice(&self.hole);
        hand[2..2 + self.board.len()].copy_from_slice(&self.board);
        hand[2 + self.board.len()..].copy_from_slice(fill);
        let hero = classify(&hand);

        // Short hands at the end of the deal sit the trial out.
        let won = villains.chunks_exact(2).all(|villain| {
            hand[..2].copy_from_slice(villain);
            classify(&hand) < hero
        });

        (won, hero)
    }
}

/// Estimate hero's win percentage and most likely final category.
pub fn estimate<R: Rng + ?Sized>(
    hole: &[Card],
    board: &[Card],
    opponents: usize,
    trials: usize,
    rng: &mut R,
) -> Result<Estimate> {
    Simulation::new(hole, board, opponents)?.run(trials, rng)
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::parse_cards;

    fn cards(s: &str) -> Vec<Card> {
        parse_cards(s).unwrap()
    }

    fn rng(seed: u64) -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(seed)
    }

    #[test]
    fn test_same_seed_same_estimate() {
        let hole = cards("Ah Kd");
        let board = cards("7c 8d 2s");
        let a = estimate(&hole, &board, 3, 1000, &mut rng(42)).unwrap();
        let b = estimate(&hole, &board, 3, 1000, &mut rng(42)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.win_percentage.to_bits(), b.win_percentage.to_bits());
    }

    #[test]
    fn test_win_percentage_in_bounds() {
        let cases = [
            ("2c 7d", "", 9),
            ("Ah Ad", "", 1),
            ("Ts 9s", "8s 7s 2d", 4),
            ("Qc Qd", "Qh 2c 5d 9s", 2),
            ("3h 4h", "Ac Kc Qd Js 9h", 6),
        ];
        for (seed, (hole, board, opponents)) in cases.into_iter().enumerate() {
            let est = estimate(&cards(hole), &cards(board), opponents, 300, &mut rng(seed as u64))
                .unwrap();
            assert!(
                (0.0..=100.0).contains(&est.win_percentage),
                "{hole} on [{board}] gave {}",
                est.win_percentage
            );
            assert_eq!(est.tally.total(), 300);
            assert!(est.wins <= est.trials);
        }
    }

    #[test]
    fn test_premium_hand_beats_weak_hand() {
        let board = cards("");
        for seed in [1, 2, 3] {
            let aces = estimate(&cards("Ah Ad"), &board, 9, 2000, &mut rng(seed)).unwrap();
            let junk = estimate(&cards("2c 7d"), &board, 9, 2000, &mut rng(seed)).unwrap();
            assert!(
                aces.win_percentage > junk.win_percentage,
                "AA {:.1}% should beat 72o {:.1}%",
                aces.win_percentage,
                junk.win_percentage
            );
        }
    }

    #[test]
    fn test_locked_royal_always_wins() {
        let est = estimate(&cards("Ah Kh"), &cards("Qh Jh Th 2c 3d"), 5, 200, &mut rng(9)).unwrap();
        assert_eq!(est.win_percentage, 100.0);
        assert_eq!(est.modal_category, HandCategory::RoyalFlush);
        assert_eq!(est.tally.count(HandCategory::RoyalFlush), 200);
    }

    #[test]
    fn test_equal_category_counts_as_loss() {
        // Quads on board: every hand plays Four of a Kind.
        let est = estimate(&cards("2c 3d"), &cards("Ah Ad As Ac Kh"), 1, 100, &mut rng(5)).unwrap();
        assert_eq!(est.wins, 0);
        assert_eq!(est.win_percentage, 0.0);
        assert_eq!(est.modal_category, HandCategory::FourOfAKind);
    }

    #[test]
    fn test_invalid_inputs_fail_fast() {
        let mut r = rng(0);
        assert_eq!(
            estimate(&cards("Ah"), &[], 1, 10, &mut r),
            Err(EquityError::HoleCardCount(1))
        );
        assert_eq!(
            estimate(&cards("Ah Kh Qh"), &[], 1, 10, &mut r),
            Err(EquityError::HoleCardCount(3))
        );
        assert_eq!(
            estimate(&cards("Ah Kh"), &cards("2c 3c 4c 5c 6c 7c"), 1, 10, &mut r),
            Err(EquityError::CommunityCardCount(6))
        );
        assert_eq!(
            estimate(&cards("Ah Kh"), &[], 0, 10, &mut r),
            Err(EquityError::OpponentCount(0))
        );
        assert_eq!(
            estimate(&cards("Ah Kh"), &[], 10, 10, &mut r),
            Err(EquityError::OpponentCount(10))
        );
        let dup = cards("Kh");
        assert_eq!(
            estimate(&cards("Ah Kh"), &cards("2c Kh 5d"), 1, 10, &mut r),
            Err(EquityError::DuplicateCard(dup[0]))
        );
        assert_eq!(
            estimate(&cards("Ah Kh"), &[], 1, 0, &mut r),
            Err(EquityError::ZeroTrials)
        );
    }

    #[test]
    fn test_pool_excludes_known_cards() {
        let hole = cards("Ah Kh");
        for board in ["", "2c 3c 4c", "2c 3c 4c 5c", "2c 3c 4c 5c 6c"] {
            let board = cards(board);
            let sim = Simulation::new(&hole, &board, 9).unwrap();
            assert_eq!(sim.pool().len(), 52 - 2 - board.len());
            assert!(hole.iter().chain(&board).all(|c| !sim.pool().contains(c)));
            assert!(sim.pool().len() >= sim.cards_needed());
        }
    }

    #[test]
    fn test_cancelled_run_stops() {
        let sim = Simulation::new(&cards("Ah Kh"), &[], 2).unwrap();
        let cancel = AtomicBool::new(true);
        assert_eq!(
            sim.run_cancellable(100, &mut rng(1), &cancel),
            Err(EquityError::Cancelled { completed: 0 })
        );
        let idle = AtomicBool::new(false);
        let est = sim.run_cancellable(100, &mut rng(1), &idle).unwrap();
        assert_eq!(est, sim.run(100, &mut rng(1)).unwrap());
    }

    #[test]
    fn test_parallel_is_independent_of_thread_count() {
        let sim = Simulation::new(&cards("Jc Jd"), &cards("9h"), 3).unwrap();
        let run_with = |threads: usize| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .unwrap()
                .install(|| sim.run_parallel(1111, 77).unwrap())
        };
        let single = run_with(1);
        let many = run_with(4);
        assert_eq!(single, many);
        assert_eq!(single.trials, 1111);
        assert_eq!(single.tally.total(), 1111);
        assert_eq!(sim.run_parallel(0, 77), Err(EquityError::ZeroTrials));
    }

    #[test]
    fn test_modal_ties_go_to_weaker_category() {
        let mut tally = CategoryTally::default();
        assert_eq!(tally.modal(), HandCategory::HighCard);
        tally.record(HandCategory::Flush);
        tally.record(HandCategory::Pair);
        assert_eq!(tally.modal(), HandCategory::Pair);
        tally.record(HandCategory::Flush);
        assert_eq!(tally.modal(), HandCategory::Flush);
    }

    #[test]
    fn test_tally_merge() {
        let mut a = CategoryTally::default();
        a.record(HandCategory::TwoPair);
        let mut b = CategoryTally::default();
        b.record(HandCategory::TwoPair);
        b.record(HandCategory::Straight);
        a.merge(&b);
        assert_eq!(a.count(HandCategory::TwoPair), 2);
        assert_eq!(a.total(), 3);
        let listed: Vec<_> = a.iter().filter(|(_, n)| *n > 0).collect();
        assert_eq!(
            listed,
            vec![(HandCategory::TwoPair, 2), (HandCategory::Straight, 1)]
        );
    }
}
