//! Hold'em Odds: hand evaluation and Monte Carlo win probability.
//!
//! Given two hole cards, zero to five known community cards and an opponent
//! count, estimate how often the hand wins at showdown and which hand
//! category it most often ends up as.
//!
//! ## Architecture
//!
//! ```text
//! caller (odds binary, UI, bindings)
//!     │
//!     ▼
//! lib.rs  ──────────────────────────  This file (entry point)
//!     ├── card.rs                    Card model, "Ah"/"Tc" wire codec
//!     ├── deck.rs                    52-card deck, unknown pool
//!     ├── evaluator.rs               Category classifier (rank masks)
//!     ├── equity.rs                  Monte Carlo trials, tallies
//!     ├── analysis.rs                Params → report, passes, outlook
//!     └── error.rs                   EquityError
//! ```
//!
//! Every call is self-contained: no state survives between calls and all
//! randomness comes from a caller-provided generator or seed.
//!
//! ```
//! use holdem_odds::{estimate, parse_cards};
//! use rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256PlusPlus;
//!
//! let hole = parse_cards("Ah Ad").unwrap();
//! let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
//! let est = estimate(&hole, &[], 3, 1000, &mut rng).unwrap();
//! assert!(est.win_percentage > 0.0);
//! ```

mod analysis;
mod card;
mod deck;
mod equity;
mod error;
mod evaluator;

pub use analysis::{analyze, CategoryShare, EstimateParams, EstimateReport, Outlook, Pass};
pub use card::{format_cards, parse_cards, Card, Rank, Suit};
pub use deck::{build_deck, unknown_pool};
pub use equity::{estimate, CategoryTally, Estimate, Simulation, BOARD_SIZE, MAX_OPPONENTS};
pub use error::{EquityError, Result};
pub use evaluator::{evaluate, straight_high, Evaluation, HandCategory, RankMask};

/// Install the `env_logger` backend. Safe to call more than once.
pub fn init() {
    env_logger::try_init().ok();
    log::info!("holdem-odds v{} ready", env!("CARGO_PKG_VERSION"));
}

/// Return the engine version string.
pub fn version() -> String {
    format!("holdem-odds v{}", env!("CARGO_PKG_VERSION"))
}
