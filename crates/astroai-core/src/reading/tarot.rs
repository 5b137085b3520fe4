use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::normalizer::Normalize;
use crate::error::{AstroError, Result};

/// Number of cards in a past/present/future spread.
pub const SPREAD_SIZE: usize = 3;

/// Question area the spread is drawn for.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TarotCategory {
    Love,
    Career,
    Money,
    #[default]
    Personal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardMeaning {
    pub upright: String,
    pub reversed: String,
}

/// A card of the deck. The deck itself is supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TarotCard {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub number: Option<u8>,
    #[serde(default)]
    pub arcana: String,
    #[serde(default)]
    pub suit: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub meaning: CardMeaning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum SpreadPosition {
    Past,
    Present,
    Future,
}

impl SpreadPosition {
    const ORDER: [SpreadPosition; SPREAD_SIZE] =
        [SpreadPosition::Past, SpreadPosition::Present, SpreadPosition::Future];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawnCard {
    pub position: SpreadPosition,
    pub card: TarotCard,
    pub revealed: bool,
}

/// Three cards drawn face down and turned over one at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TarotSpread {
    pub category: TarotCategory,
    pub cards: Vec<DrawnCard>,
}

impl TarotSpread {
    /// Draws three distinct cards from `deck`.
    pub fn draw<R: Rng + ?Sized>(deck: &[TarotCard], category: TarotCategory, rng: &mut R) -> Result<Self> {
        if deck.len() < SPREAD_SIZE {
            return Err(AstroError::validation(
                "deck",
                format!("need at least {SPREAD_SIZE} cards, got {}", deck.len()),
            ));
        }

        let cards = deck
            .choose_multiple(rng, SPREAD_SIZE)
            .zip(SpreadPosition::ORDER)
            .map(|(card, position)| DrawnCard {
                position,
                card: card.clone(),
                revealed: false,
            })
            .collect();

        Ok(Self { category, cards })
    }

    /// Turns card `index` face up. Returns `false` if it already was.
    pub fn reveal(&mut self, index: usize) -> Result<bool> {
        let drawn = self
            .cards
            .get_mut(index)
            .ok_or_else(|| AstroError::not_found("tarot card", index.to_string()))?;
        let newly = !drawn.revealed;
        drawn.revealed = true;
        Ok(newly)
    }

    pub fn revealed_count(&self) -> usize {
        self.cards.iter().filter(|c| c.revealed).count()
    }

    pub fn all_revealed(&self) -> bool {
        self.revealed_count() == self.cards.len()
    }
}

/// The model's reading of a spread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TarotInterpretation {
    pub reading: String,
    pub affirmation: String,
}

const DEFAULT_READING: &str = "The cards speak of a path still unfolding. What has passed shaped you, what is present asks for patience, and what lies ahead rewards an open heart.";
const DEFAULT_AFFIRMATION: &str = "I trust the journey the cards reveal.";

impl Normalize for TarotInterpretation {
    type Context = ();

    fn template(_: &()) -> Self {
        Self {
            reading: DEFAULT_READING.to_string(),
            affirmation: DEFAULT_AFFIRMATION.to_string(),
        }
    }

    fn fallback(raw: &str, ctx: &()) -> Self {
        let raw = raw.trim();
        let mut interpretation = Self::template(ctx);
        if !raw.is_empty() {
            interpretation.reading = raw.to_string();
        }
        interpretation
    }
}

/// A finished reading, as shown on the result screen and kept in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TarotReading {
    pub category: TarotCategory,
    pub cards: Vec<DrawnCard>,
    pub interpretation: TarotInterpretation,
}
