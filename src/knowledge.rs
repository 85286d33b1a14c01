use fnv::FnvHashMap;
use std::fmt;

use crate::cards::*;
use crate::game::BoardState;

// Can represent information of the form:
// this card is/isn't possible
// also, maintains integer weights for the cards
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardPossibilityTable {
    possible: FnvHashMap<Card, u32>,
}
impl CardPossibilityTable {
    pub fn new(game_type: GameType) -> CardPossibilityTable {
        Self::from(&CardCounts::new(game_type))
    }

    // whether the card is possible
    pub fn is_possible(&self, card: &Card) -> bool {
        self.possible.contains_key(card)
    }

    // keep only the cards that would have answered the hint the way the card did
    pub fn mark_hint(&mut self, hinted: &Hinted, matched: bool) {
        self.possible.retain(|card, _| card.matches(hinted) == matched);
    }

    pub fn decrement_weight_if_possible(&mut self, card: &Card) {
        let remove = match self.possible.get_mut(card) {
            Some(weight) => {
                *weight = weight.saturating_sub(1);
                *weight == 0
            }
            None => false,
        };
        if remove {
            self.possible.remove(card);
        }
    }

    pub fn get_card(&self) -> Option<Card> {
        if self.possible.len() == 1 {
            self.possible.keys().next().copied()
        } else {
            None
        }
    }

    fn get_weight(&self, card: &Card) -> f32 {
        *self.possible.get(card).unwrap_or(&0) as f32
    }

    pub fn weighted_score(&self, score_fn: &dyn Fn(&Card) -> f32) -> f32 {
        let mut total_score = 0.;
        let mut total_weight = 0.;
        for card in self.possible.keys() {
            let weight = self.get_weight(card);
            total_weight += weight;
            total_score += weight * score_fn(card);
        }
        if total_weight == 0. {
            return 0.;
        }
        total_score / total_weight
    }

    pub fn average_rank(&self) -> f32 {
        self.weighted_score(&|card| card.rank as f32)
    }

    pub fn probability_of_predicate(&self, predicate: &dyn Fn(&Card) -> bool) -> f32 {
        let f = |card: &Card| if predicate(card) { 1.0 } else { 0.0 };
        self.weighted_score(&f)
    }

    pub fn probability_is_dead(&self, board: &BoardState) -> f32 {
        self.probability_of_predicate(&|card| board.is_dead(card))
    }

    // every remaining possibility satisfies the predicate
    pub fn surely(&self, predicate: &dyn Fn(&Card) -> bool) -> bool {
        !self.possible.is_empty() && self.possible.keys().all(predicate)
    }
}
impl<'a> From<&'a CardCounts> for CardPossibilityTable {
    fn from(counts: &'a CardCounts) -> CardPossibilityTable {
        let mut possible = FnvHashMap::default();
        for card in counts.game_type().all_cards() {
            let count = counts.remaining(&card);
            if count > 0 {
                possible.insert(card, count);
            }
        }
        CardPossibilityTable { possible }
    }
}
impl fmt::Display for CardPossibilityTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(card) = self.get_card() {
            return write!(f, "{}", card);
        }
        let mut string = String::new();
        let mut suits = self.possible.keys().map(|card| card.suit).collect::<Vec<_>>();
        suits.sort();
        suits.dedup();
        for suit in suits {
            string.push(suit.letter);
        }
        string.push(' ');
        let mut ranks = self.possible.keys().map(|card| card.rank).collect::<Vec<_>>();
        ranks.sort();
        ranks.dedup();
        for rank in ranks {
            string.push_str(&rank.to_string());
        }
        f.pad(&string)
    }
}

/// Common knowledge about one hand position, accumulated from hints to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardKnowledge {
    pub possibilities: CardPossibilityTable,
    // touched by at least one hint since it was drawn
    pub clued: bool,
}
impl CardKnowledge {
    pub fn new(game_type: GameType) -> CardKnowledge {
        CardKnowledge {
            possibilities: CardPossibilityTable::new(game_type),
            clued: false,
        }
    }

    pub fn mark(&mut self, hinted: &Hinted, matched: bool) {
        self.possibilities.mark_hint(hinted, matched);
        self.clued |= matched;
    }
}
impl fmt::Display for CardKnowledge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let marker = if self.clued { "*" } else { "" };
        write!(f, "{}{}", marker, self.possibilities)
    }
}
