use fnv::FnvHashMap;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaChaRng;
use std::fmt;
use std::str::FromStr;
use tracing::trace;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Suit {
    pub name: &'static str,
    pub letter: char,
    // cards of this suit answer yes to every hint, and the suit itself can't be named
    pub matches_any_hint: bool,
}

impl Suit {
    const fn new(name: &'static str, letter: char) -> Suit {
        Suit {
            name,
            letter,
            matches_any_hint: false,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

pub const RED: Suit = Suit::new("red", 'r');
pub const YELLOW: Suit = Suit::new("yellow", 'y');
pub const GREEN: Suit = Suit::new("green", 'g');
pub const BLUE: Suit = Suit::new("blue", 'b');
pub const WHITE: Suit = Suit::new("white", 'w');
pub const PURPLE: Suit = Suit::new("purple", 'p');
pub const RAINBOW: Suit = Suit {
    name: "rainbow",
    letter: 'm',
    matches_any_hint: true,
};

const VANILLA_SUITS: [Suit; 5] = [RED, YELLOW, GREEN, BLUE, WHITE];
const PURPLE_SUITS: [Suit; 6] = [RED, YELLOW, GREEN, BLUE, WHITE, PURPLE];
const RAINBOW_SUITS: [Suit; 6] = [RED, YELLOW, GREEN, BLUE, WHITE, RAINBOW];
const ALL_SUITS: [Suit; 7] = [RED, YELLOW, GREEN, BLUE, WHITE, PURPLE, RAINBOW];

pub type Rank = u32;
// list of ranks, assumed to be small to large
pub const RANKS: [Rank; 5] = [1, 2, 3, 4, 5];
pub const FINAL_RANK: Rank = 5;

pub fn get_count_for_rank(rank: Rank) -> u32 {
    match rank {
        1 => 3,
        2 | 3 | 4 => 2,
        5 => 1,
        _ => 0,
    }
}

pub type Score = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameType {
    Vanilla,
    Purple,
    Rainbow,
}

impl GameType {
    pub fn suits(self) -> &'static [Suit] {
        match self {
            GameType::Vanilla => &VANILLA_SUITS,
            GameType::Purple => &PURPLE_SUITS,
            GameType::Rainbow => &RAINBOW_SUITS,
        }
    }

    pub fn has_suit(self, suit: Suit) -> bool {
        self.suits().contains(&suit)
    }

    pub fn perfect_score(self) -> Score {
        FINAL_RANK * self.suits().len() as Score
    }

    /// Every distinct card identity in this game type.
    pub fn all_cards(self) -> impl Iterator<Item = Card> {
        self.suits()
            .iter()
            .flat_map(|&suit| RANKS.iter().map(move |&rank| Card::new(suit, rank)))
    }
}

impl FromStr for GameType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<GameType, ConfigError> {
        match s {
            "vanilla" => Ok(GameType::Vanilla),
            "purple" => Ok(GameType::Purple),
            "rainbow" => Ok(GameType::Rainbow),
            _ => Err(ConfigError::UnknownGameType(s.to_string())),
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            GameType::Vanilla => "vanilla",
            GameType::Purple => "purple",
            GameType::Rainbow => "rainbow",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hinted {
    Suit(Suit),
    Rank(Rank),
}
impl fmt::Display for Hinted {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Hinted::Suit(suit) => write!(f, "{}", suit),
            Hinted::Rank(rank) => write!(f, "{}", rank),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}
impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Card {
        Card { suit, rank }
    }

    // whether this card is touched by the given hint
    pub fn matches(&self, hinted: &Hinted) -> bool {
        if self.suit.matches_any_hint {
            return true;
        }
        match *hinted {
            Hinted::Suit(suit) => self.suit == suit,
            Hinted::Rank(rank) => self.rank == rank,
        }
    }
}
impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.suit.letter, self.rank)
    }
}
impl FromStr for Card {
    type Err = ConfigError;

    // cards are written as a suit letter followed by the rank, e.g. "r1"
    fn from_str(s: &str) -> Result<Card, ConfigError> {
        let malformed = || ConfigError::MalformedCard(s.to_string());
        let mut chars = s.chars();
        let letter = chars.next().ok_or_else(malformed)?;
        let suit = ALL_SUITS
            .iter()
            .find(|suit| suit.letter == letter)
            .ok_or_else(malformed)?;
        let rank: Rank = chars.as_str().parse().map_err(|_| malformed())?;
        if !RANKS.contains(&rank) {
            return Err(malformed());
        }
        Ok(Card::new(*suit, rank))
    }
}

pub type Cards = Vec<Card>;

pub fn format_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|card| card.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_cards(s: &str) -> Result<Cards, ConfigError> {
    s.split_whitespace().map(Card::from_str).collect()
}

#[derive(Debug, Clone)]
pub struct CardCounts {
    game_type: GameType,
    counts: FnvHashMap<Card, u32>,
}
impl CardCounts {
    pub fn new(game_type: GameType) -> CardCounts {
        let counts = game_type.all_cards().map(|card| (card, 0)).collect();
        CardCounts { game_type, counts }
    }

    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    pub fn get_count(&self, card: &Card) -> u32 {
        self.counts.get(card).copied().unwrap_or(0)
    }

    pub fn remaining(&self, card: &Card) -> u32 {
        get_count_for_rank(card.rank).saturating_sub(self.get_count(card))
    }

    pub fn increment(&mut self, card: &Card) {
        *self.counts.entry(*card).or_insert(0) += 1;
    }
}
impl fmt::Display for CardCounts {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &suit in self.game_type.suits() {
            write!(f, "{}: ", suit.letter)?;
            for &rank in RANKS.iter() {
                let count = self.get_count(&Card::new(suit, rank));
                let total = get_count_for_rank(rank);
                write!(f, "{}/{} {}s", count, total, rank)?;
                if rank != FINAL_RANK {
                    f.write_str(", ")?;
                }
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Discard {
    pub cards: Cards,
    counts: CardCounts,
}
impl Discard {
    pub fn new(game_type: GameType) -> Discard {
        Discard {
            cards: Cards::new(),
            counts: CardCounts::new(game_type),
        }
    }

    pub fn has_all(&self, card: &Card) -> bool {
        self.counts.remaining(card) == 0
    }

    pub fn remaining(&self, card: &Card) -> u32 {
        self.counts.remaining(card)
    }

    pub fn place(&mut self, card: Card) {
        self.counts.increment(&card);
        self.cards.push(card);
    }
}
impl fmt::Display for Discard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.counts)
    }
}

#[derive(Debug, Clone)]
pub struct Firework {
    pub suit: Suit,
    pub top: Rank,
}
impl Firework {
    pub fn new(suit: Suit) -> Firework {
        Firework { suit, top: 0 }
    }

    pub fn needed_rank(&self) -> Option<Rank> {
        if self.complete() {
            None
        } else {
            Some(self.top + 1)
        }
    }

    pub fn score(&self) -> Score {
        self.top
    }

    pub fn complete(&self) -> bool {
        self.top == FINAL_RANK
    }

    pub fn place(&mut self, card: &Card) {
        assert!(
            card.suit == self.suit,
            "Attempted to place card on firework of wrong suit!"
        );
        assert!(
            Some(card.rank) == self.needed_rank(),
            "Attempted to place card of wrong rank on firework!"
        );
        self.top = card.rank;
    }
}
impl fmt::Display for Firework {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.complete() {
            write!(f, "{} firework complete!", self.suit)
        } else {
            write!(f, "{} firework at {}", self.suit, self.top)
        }
    }
}

/// The full deck for a game type, shuffled with the given seed (or a fresh
/// random one).
pub fn new_deck(game_type: GameType, seed: Option<u64>) -> Cards {
    let mut deck: Cards = Cards::new();

    for &suit in game_type.suits() {
        for &rank in RANKS.iter() {
            for _ in 0..get_count_for_rank(rank) {
                deck.push(Card::new(suit, rank));
            }
        }
    }

    let seed = seed.unwrap_or_else(|| rand::thread_rng().next_u64());
    deck.shuffle(&mut ChaChaRng::seed_from_u64(seed));
    trace!("Deck: {}", format_cards(&deck));
    deck
}

/// Checks a pre-specified deck against the game type's card universe.
/// The deck may be shorter than a full one, but must cover the opening deal.
pub fn validate_deck(game_type: GameType, deck: &[Card], cards_dealt: u32) -> Result<(), ConfigError> {
    if (deck.len() as u32) < cards_dealt {
        return Err(ConfigError::MalformedDeck(format!(
            "{} cards cannot cover a deal of {}",
            deck.len(),
            cards_dealt
        )));
    }
    let mut counts = CardCounts::new(game_type);
    for card in deck {
        if !game_type.has_suit(card.suit) {
            return Err(ConfigError::MalformedDeck(format!(
                "{} is not part of a {} game",
                card, game_type
            )));
        }
        if counts.remaining(card) == 0 {
            return Err(ConfigError::MalformedDeck(format!(
                "too many copies of {}",
                card
            )));
        }
        counts.increment(card);
    }
    Ok(())
}
