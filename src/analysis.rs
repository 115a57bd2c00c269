//! Request/report layer on top of the equity engine.
//!
//! ## Pipeline
//!
//! 1. **Trials**: explicit count, or the default for the requested pass
//! 2. **Seed**: explicit, or drawn from OS entropy and echoed back
//! 3. **Equity**: sequential or rayon-parallel Monte Carlo
//! 4. **Outlook**: coarse verdict from the win percentage
//!
//! Two passes exist: a cheap preliminary pass for instant feedback while
//! only the hole cards are chosen, and a full pass for a definitive number.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::equity::{Estimate, Simulation};
use crate::error::Result;
use crate::evaluator::HandCategory;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    Preliminary,
    #[default]
    Full,
}

impl Pass {
    pub const fn trials(self) -> usize {
        match self {
            Pass::Preliminary => 100,
            Pass::Full => 1000,
        }
    }
}

/// Verdict tier for a win percentage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outlook {
    VeryWeak,
    Weak,
    Decent,
    Good,
    Excellent,
}

impl Outlook {
    /// The preliminary pass sees only hole cards and never reports
    /// Excellent.
    pub fn assess(win_percentage: f64, pass: Pass) -> Outlook {
        match win_percentage {
            p if p > 80.0 && pass == Pass::Full => Outlook::Excellent,
            p if p > 60.0 => Outlook::Good,
            p if p > 40.0 => Outlook::Decent,
            p if p > 25.0 => Outlook::Weak,
            _ => Outlook::VeryWeak,
        }
    }

    pub const fn advice(self) -> &'static str {
        match self {
            Outlook::Excellent => "Excellent hand. Bet strong or raise.",
            Outlook::Good => "Good hand. Bet with confidence, consider raising.",
            Outlook::Decent => "Decent hand. Continue carefully and weigh the pot.",
            Outlook::Weak => "Weak hand. Check, or call only if it is cheap.",
            Outlook::VeryWeak => "Very weak hand. Fold unless a bluff is viable.",
        }
    }
}

/// Input for one analysis, typically read from JSON.
///
/// Field aliases accept the names used by table front ends:
///   - `hand` for `hole_cards`
///   - `community_cards` / `table_cards` for `board`
///   - `num_opponents` for `opponents`
#[derive(Clone, Debug, Deserialize)]
pub struct EstimateParams {
    /// Hero's two cards, e.g. `["Ah", "Kd"]`
    #[serde(alias = "hand")]
    pub hole_cards: Vec<Card>,
    /// Known community cards (0-5)
    #[serde(default, alias = "community_cards", alias = "table_cards")]
    pub board: Vec<Card>,
    /// Opponents still in the hand (1-9)
    #[serde(alias = "num_opponents")]
    pub opponents: usize,
    /// Which pass to run; sets the trial count when `trials` is absent
    #[serde(default)]
    pub pass: Pass,
    /// Explicit trial count, overriding the pass default
    #[serde(default)]
    pub trials: Option<usize>,
    /// Fixed seed for a reproducible run
    #[serde(default)]
    pub seed: Option<u64>,
    /// Spread trials over the rayon pool
    #[serde(default)]
    pub parallel: bool,
}

impl EstimateParams {
    pub fn new(hole_cards: Vec<Card>, board: Vec<Card>, opponents: usize) -> Self {
        EstimateParams {
            hole_cards,
            board,
            opponents,
            pass: Pass::default(),
            trials: None,
            seed: None,
            parallel: false,
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn trial_count(&self) -> usize {
        self.trials.unwrap_or_else(|| self.pass.trials())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: HandCategory,
    /// Percentage of trials ending in this category
    pub percentage: f64,
}

/// Output of one analysis.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EstimateReport {
    /// Hero win percentage [0.0, 100.0]
    pub win_percentage: f64,
    /// Most frequent final category for hero
    pub modal_category: HandCategory,
    /// 0 (High Card) to 9 (Royal Flush)
    pub category_rank: u8,
    pub outlook: Outlook,
    pub advice: String,
    pub pass: Pass,
    pub opponents: usize,
    pub trials: u64,
    /// Seed that reproduces this report
    pub seed: u64,
    /// Non-zero categories, weakest first
    pub categories: Vec<CategoryShare>,
}

impl EstimateReport {
    fn new(estimate: &Estimate, params: &EstimateParams, seed: u64) -> Self {
        let outlook = Outlook::assess(estimate.win_percentage, params.pass);
        let categories = estimate
            .tally
            .iter()
            .filter(|&(_, n)| n > 0)
            .map(|(category, n)| CategoryShare {
                category,
                percentage: 100.0 * n as f64 / estimate.trials as f64,
            })
            .collect();

        EstimateReport {
            win_percentage: estimate.win_percentage,
            modal_category: estimate.modal_category,
            category_rank: estimate.modal_category.rank(),
            outlook,
            advice: outlook.advice().to_string(),
            pass: params.pass,
            opponents: params.opponents,
            trials: estimate.trials,
            seed,
            categories,
        }
    }
}

/// Run one analysis end to end.
pub fn analyze(params: &EstimateParams) -> Result<EstimateReport> {
    let simulation = Simulation::new(&params.hole_cards, &params.board, params.opponents)?;
    let trials = params.trial_count();
    let seed = params.seed.unwrap_or_else(rand::random);

    log::debug!(
        "{:?} pass: {} trials, seed {}, parallel={}",
        params.pass,
        trials,
        seed,
        params.parallel
    );

    let estimate = if params.parallel {
        simulation.run_parallel(trials, seed)?
    } else {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        simulation.run(trials, &mut rng)?
    };

    Ok(EstimateReport::new(&estimate, params, seed))
}
