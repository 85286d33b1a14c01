use crate::game::*;

// Traits to implement for any valid Hanabi strategy

// Represents the strategy of a given player
pub trait PlayerStrategy {
    // A function returning the name of a strategy.
    // Incorporates any configuration specific to this player instance.
    fn name(&self) -> String;
    // A function to decide what to do on the player's turn.
    // Called exactly once per turn; an illegal choice aborts the round.
    fn decide(&mut self, view: &PlayerView<'_>) -> TurnChoice;
    // A function to update internal state after every turn (including our own).
    // Given what happened last turn, and the new state.
    fn update(&mut self, _turn_record: &TurnRecord, _view: &PlayerView<'_>) {}
}

// A full-information baseline, for benchmarking only.
// Receives its own cards, so it never goes through the normal projector.
pub trait CheatingStrategy {
    fn name(&self) -> String;
    fn decide(&mut self, view: &OmniscientView<'_>) -> TurnChoice;
}

// The decision procedure seated at one position of the round
pub enum Seat {
    Fair(Box<dyn PlayerStrategy>),
    Cheating(Box<dyn CheatingStrategy>),
}

impl Seat {
    pub fn name(&self) -> String {
        match self {
            Seat::Fair(strategy) => strategy.name(),
            Seat::Cheating(strategy) => strategy.name(),
        }
    }

    pub fn is_cheating(&self) -> bool {
        matches!(self, Seat::Cheating(_))
    }
}

// Builds a fresh seat for a round; the seed is private to that seat.
pub type StrategyConstructor = fn(&GameOptions, u64) -> Seat;
