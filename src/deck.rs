//! The standard 52-card deck and the pool of cards still unseen.

use crate::card::{Card, Rank, Suit};
use crate::error::{EquityError, Result};

/// All 52 cards in card-ID order (rank-major: 2♣ 2♦ 2♥ 2♠ 3♣ ...).
pub fn build_deck() -> Vec<Card> {
    Rank::ALL
        .iter()
        .flat_map(|&rank| Suit::ALL.iter().map(move |&suit| Card::new(rank, suit)))
        .collect()
}

/// Deck minus every known card, in deck order.
///
/// Each known card must be present in `deck`. A card listed twice fails on
/// its second occurrence because the first one already removed it.
pub fn unknown_pool(deck: &[Card], known: &[Card]) -> Result<Vec<Card>> {
    let mut pool = deck.to_vec();
    for &card in known {
        let pos = pool
            .iter()
            .position(|&c| c == card)
            .ok_or(EquityError::MissingCard(card))?;
        pool.remove(pos);
    }
    Ok(pool)
}
