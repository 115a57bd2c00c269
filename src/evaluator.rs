//! Hand category evaluator.
//!
//! Classifies any 5-7 card set by the best poker category it contains.
//! Rank presence is tracked as a 13-bit mask per suit and overall, so a
//! straight check is a handful of mask comparisons.
//!
//! ## Category Ranking (higher = better)
//!
//! | Rank | Hand Type        |
//! |------|------------------|
//! | 9    | Royal Flush      |
//! | 8    | Straight Flush   |
//! | 7    | Four of a Kind   |
//! | 6    | Full House       |
//! | 5    | Flush            |
//! | 4    | Straight         |
//! | 3    | Three of a Kind  |
//! | 2    | Two Pair         |
//! | 1    | Pair             |
//! | 0    | High Card        |
//!
//! Hands of the same category compare equal; there is no kicker breakdown.
//!
//! Categories are checked strongest-first over the whole card multiset.
//! Full House, Flush and Straight are detected independently of each other
//! and of which five cards would actually be played, which is exact for the
//! 7-card Hold'em case.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::card::{Card, Rank};
use crate::error::{EquityError, Result};

// ── Categories ──────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HandCategory {
    #[serde(rename = "High Card")]
    HighCard,
    #[serde(rename = "Pair")]
    Pair,
    #[serde(rename = "Two Pair")]
    TwoPair,
    #[serde(rename = "Three of a Kind")]
    ThreeOfAKind,
    #[serde(rename = "Straight")]
    Straight,
    #[serde(rename = "Flush")]
    Flush,
    #[serde(rename = "Full House")]
    FullHouse,
    #[serde(rename = "Four of a Kind")]
    FourOfAKind,
    #[serde(rename = "Straight Flush")]
    StraightFlush,
    #[serde(rename = "Royal Flush")]
    RoyalFlush,
}

impl HandCategory {
    /// Weakest to strongest. Also the canonical tally order.
    pub const ALL: [HandCategory; 10] = [
        HandCategory::HighCard,
        HandCategory::Pair,
        HandCategory::TwoPair,
        HandCategory::ThreeOfAKind,
        HandCategory::Straight,
        HandCategory::Flush,
        HandCategory::FullHouse,
        HandCategory::FourOfAKind,
        HandCategory::StraightFlush,
        HandCategory::RoyalFlush,
    ];

    /// 0 (High Card) through 9 (Royal Flush).
    #[inline]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    pub fn from_rank(rank: u8) -> Option<HandCategory> {
        HandCategory::ALL.get(rank as usize).copied()
    }

    pub const fn label(self) -> &'static str {
        match self {
            HandCategory::HighCard => "High Card",
            HandCategory::Pair => "Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
            HandCategory::RoyalFlush => "Royal Flush",
        }
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of evaluating one card set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Evaluation {
    pub category: HandCategory,
}

impl Evaluation {
    pub const fn rank(&self) -> u8 {
        self.category.rank()
    }

    pub const fn label(&self) -> &'static str {
        self.category.label()
    }
}

// ── Rank Masks ──────────────────────────────────────────────────────

bitflags! {
    /// One bit per rank present, bit 0 = Two ... bit 12 = Ace.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct RankMask: u16 {
        const TWO   = 1 << 0;
        const THREE = 1 << 1;
        const FOUR  = 1 << 2;
        const FIVE  = 1 << 3;
        const SIX   = 1 << 4;
        const SEVEN = 1 << 5;
        const EIGHT = 1 << 6;
        const NINE  = 1 << 7;
        const TEN   = 1 << 8;
        const JACK  = 1 << 9;
        const QUEEN = 1 << 10;
        const KING  = 1 << 11;
        const ACE   = 1 << 12;

        const WHEEL = Self::ACE.bits()
            | Self::TWO.bits()
            | Self::THREE.bits()
            | Self::FOUR.bits()
            | Self::FIVE.bits();
    }
}

impl RankMask {
    #[inline]
    pub fn of(rank: Rank) -> RankMask {
        RankMask::from_bits_retain(1 << rank.index())
    }
}

// Every straight, highest first. The wheel uses the Ace as its low card;
// nothing wraps past it (K-A-2-3-4 is not here).
const STRAIGHTS: [(RankMask, Rank); 10] = [
    (RankMask::from_bits_retain(0b1111100000000), Rank::Ace),
    (RankMask::from_bits_retain(0b0111110000000), Rank::King),
    (RankMask::from_bits_retain(0b0011111000000), Rank::Queen),
    (RankMask::from_bits_retain(0b0001111100000), Rank::Jack),
    (RankMask::from_bits_retain(0b0000111110000), Rank::Ten),
    (RankMask::from_bits_retain(0b0000011111000), Rank::Nine),
    (RankMask::from_bits_retain(0b0000001111100), Rank::Eight),
    (RankMask::from_bits_retain(0b0000000111110), Rank::Seven),
    (RankMask::from_bits_retain(0b0000000011111), Rank::Six),
    (RankMask::WHEEL, Rank::Five),
];

/// High card of the best straight contained in `mask`, if any.
pub fn straight_high(mask: RankMask) -> Option<Rank> {
    STRAIGHTS
        .iter()
        .find(|(window, _)| mask.contains(*window))
        .map(|&(_, high)| high)
}

// ── Core Evaluator ──────────────────────────────────────────────────

/// Rank and suit histogram of a card set.
struct Profile {
    rank_counts: [u8; 13],
    suit_counts: [u8; 4],
    suit_masks: [RankMask; 4],
    ranks: RankMask,
}

impl Profile {
    fn of(cards: &[Card]) -> Self {
        let mut profile = Profile {
            rank_counts: [0; 13],
            suit_counts: [0; 4],
            suit_masks: [RankMask::empty(); 4],
            ranks: RankMask::empty(),
        };
        for card in cards {
            let bit = RankMask::of(card.rank);
            profile.rank_counts[card.rank.index()] += 1;
            profile.suit_counts[card.suit.index()] += 1;
            profile.suit_masks[card.suit.index()] |= bit;
            profile.ranks |= bit;
        }
        profile
    }

    /// Best straight flush high card among suits holding five or more cards.
    fn straight_flush_high(&self) -> Option<Rank> {
        (0..4)
            .filter(|&s| self.suit_counts[s] >= 5)
            .filter_map(|s| straight_high(self.suit_masks[s]))
            .max()
    }

    fn has_flush(&self) -> bool {
        self.suit_counts.iter().any(|&n| n >= 5)
    }

    fn groups_of(&self, size: u8) -> usize {
        self.rank_counts.iter().filter(|&&n| n >= size).count()
    }

    fn has_full_house(&self) -> bool {
        // A second trips counts as the pair.
        let trips = self.groups_of(3);
        trips >= 2 || (trips == 1 && self.groups_of(2) >= 2)
    }
}

/// Classify a card set without validating it. Used on the hot path where
/// the caller already guarantees 5-7 distinct cards.
pub(crate) fn classify(cards: &[Card]) -> HandCategory {
    let profile = Profile::of(cards);

    if let Some(high) = profile.straight_flush_high() {
        return if high == Rank::Ace {
            HandCategory::RoyalFlush
        } else {
            HandCategory::StraightFlush
        };
    }
    if profile.groups_of(4) >= 1 {
        return HandCategory::FourOfAKind;
    }
    if profile.has_full_house() {
        return HandCategory::FullHouse;
    }
    if profile.has_flush() {
        return HandCategory::Flush;
    }
    if straight_high(profile.ranks).is_some() {
        return HandCategory::Straight;
    }
    if profile.groups_of(3) >= 1 {
        return HandCategory::ThreeOfAKind;
    }
    match profile.groups_of(2) {
        0 => HandCategory::HighCard,
        1 => HandCategory::Pair,
        _ => HandCategory::TwoPair,
    }
}

/// Evaluate 5 to 7 distinct cards.
pub fn evaluate(cards: &[Card]) -> Result<Evaluation> {
    if !(5..=7).contains(&cards.len()) {
        return Err(EquityError::EvaluationSize(cards.len()));
    }
    let mut seen = 0u64;
    for card in cards {
        let bit = 1u64 << card.id();
        if seen & bit != 0 {
            return Err(EquityError::DuplicateCard(*card));
        }
        seen |= bit;
    }
    Ok(Evaluation {
        category: classify(cards),
    })
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::parse_cards;

    fn category_of(hand: &str) -> HandCategory {
        evaluate(&parse_cards(hand).unwrap()).unwrap().category
    }

    #[test]
    fn test_royal_flush() {
        let eval = evaluate(&parse_cards("Ah Kh Qh Jh Th 2c 3d").unwrap()).unwrap();
        assert_eq!(eval.category, HandCategory::RoyalFlush);
        assert_eq!(eval.rank(), 9);
        assert_eq!(eval.label(), "Royal Flush");
    }

    #[test]
    fn test_steel_wheel_is_not_royal() {
        assert_eq!(category_of("Ah 2h 3h 4h 5h Kc Qd"), HandCategory::StraightFlush);
    }

    #[test]
    fn test_straight_flush_over_trips() {
        assert_eq!(category_of("9s Ts Js Qs Ks 9c 9d"), HandCategory::StraightFlush);
    }

    #[test]
    fn test_straight_and_flush_in_different_cards_is_flush() {
        // 5-9 straight uses the 9c; the hearts hold 2 5 6 7 8.
        assert_eq!(category_of("2h 5h 6h 7h 8h 9c Kd"), HandCategory::Flush);
    }

    #[test]
    fn test_quads_over_full_house() {
        let eval = evaluate(&parse_cards("2c 2d 2h 2s 5c 5d 5h").unwrap()).unwrap();
        assert_eq!(eval.category, HandCategory::FourOfAKind);
        assert_eq!(eval.rank(), 7);
    }

    #[test]
    fn test_full_house_variants() {
        assert_eq!(category_of("Ac Ad Ah Kc Kd"), HandCategory::FullHouse);
        assert_eq!(category_of("Ac Ad Ah Kc Kd Ks 2c"), HandCategory::FullHouse);
        assert_eq!(category_of("Ac Ad Ah Kc Kd Qs Qc"), HandCategory::FullHouse);
    }

    #[test]
    fn test_flush_beats_straight() {
        assert_eq!(category_of("2d 4d 6d 8d Td 9c 7s"), HandCategory::Flush);
    }

    #[test]
    fn test_wheel_straight() {
        assert_eq!(category_of("Ah 2c 3d 4h 5s 9c Kd"), HandCategory::Straight);
    }

    #[test]
    fn test_no_wraparound_straight() {
        assert_eq!(category_of("Kd Ah 2c 3d 4h 9s Tc"), HandCategory::HighCard);
    }

    #[test]
    fn test_straight_below_top_five_ranks() {
        // Top five distinct ranks are A K 8 7 6; the straight is 4-8.
        assert_eq!(category_of("Ah Kd 8c 7s 6h 5d 4c"), HandCategory::Straight);
    }

    #[test]
    fn test_pairs_and_trips() {
        assert_eq!(category_of("7c 7d 7h Kc 2d 9s 4h"), HandCategory::ThreeOfAKind);
        assert_eq!(category_of("7c 7d Kh Kc 2d 2s 4h"), HandCategory::TwoPair);
        assert_eq!(category_of("7c 7d Kh Qc 2d 9s 4h"), HandCategory::Pair);
        assert_eq!(category_of("7c 8d Kh Qc 2d 9s 4h"), HandCategory::HighCard);
    }

    #[test]
    fn test_order_invariance() {
        let mut cards = parse_cards("Qs 9h 9c Qd 3h 9s 2c").unwrap();
        let expected = evaluate(&cards).unwrap();
        assert_eq!(expected.category, HandCategory::FullHouse);
        for _ in 0..cards.len() {
            cards.rotate_left(1);
            assert_eq!(evaluate(&cards).unwrap(), expected);
            cards.reverse();
            assert_eq!(evaluate(&cards).unwrap(), expected);
        }
    }

    #[test]
    fn test_completing_trips_never_lowers_category() {
        let base = parse_cards("Jc Jd 4h 8s Kc 2d").unwrap();
        let before = evaluate(&base).unwrap();
        let mut more = base.clone();
        more.push("Jh".parse().unwrap());
        let after = evaluate(&more).unwrap();
        assert_eq!(before.category, HandCategory::Pair);
        assert_eq!(after.category, HandCategory::ThreeOfAKind);
        assert!(after.rank() > before.rank());
    }

    #[test]
    fn test_rejects_bad_sizes_and_duplicates() {
        let four = parse_cards("Ah Kh Qh Jh").unwrap();
        assert_eq!(evaluate(&four), Err(EquityError::EvaluationSize(4)));
        let eight = parse_cards("Ah Kh Qh Jh Th 9h 8h 7h").unwrap();
        assert_eq!(evaluate(&eight), Err(EquityError::EvaluationSize(8)));
        let dup = parse_cards("Ah Kh Qh Jh Ah").unwrap();
        assert_eq!(evaluate(&dup), Err(EquityError::DuplicateCard(dup[0])));
    }

    #[test]
    fn test_category_rank_round_trip() {
        for (i, category) in HandCategory::ALL.iter().enumerate() {
            assert_eq!(category.rank() as usize, i);
            assert_eq!(HandCategory::from_rank(i as u8), Some(*category));
        }
        assert!(HandCategory::RoyalFlush > HandCategory::StraightFlush);
        assert_eq!(HandCategory::from_rank(10), None);
    }

    #[test]
    fn test_straight_high_windows() {
        let mask = [Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six, Rank::Ace]
            .into_iter()
            .fold(RankMask::empty(), |m, r| m | RankMask::of(r));
        assert_eq!(straight_high(mask), Some(Rank::Six));
        assert_eq!(straight_high(RankMask::WHEEL), Some(Rank::Five));
        assert_eq!(straight_high(RankMask::ACE | RankMask::KING), None);
    }
}
