use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

use crate::game::*;
use crate::strategy::{PlayerStrategy, Seat};

pub fn seat(_: &GameOptions, seed: u64) -> Seat {
    Seat::Fair(Box::new(RandomStrategyPlayer::new(0.4, 0.2, seed)))
}

// dummy, terrible strategy, as an example
// only ever proposes legal moves
pub struct RandomStrategyPlayer {
    hint_probability: f64,
    play_probability: f64,
    rng: ChaChaRng,
}

impl RandomStrategyPlayer {
    pub fn new(hint_probability: f64, play_probability: f64, seed: u64) -> RandomStrategyPlayer {
        RandomStrategyPlayer {
            hint_probability,
            play_probability,
            rng: ChaChaRng::seed_from_u64(seed),
        }
    }

    fn random_hint(&mut self, view: &PlayerView<'_>) -> Hint {
        let players = view.other_players().collect::<Vec<_>>();
        let hint_player = *players
            .choose(&mut self.rng)
            .expect("there is always another player");
        let hint_card = *view
            .hand(hint_player)
            .choose(&mut self.rng)
            .expect("other hands are never empty");
        let hinted = if !hint_card.suit.matches_any_hint && self.rng.gen() {
            // hint a suit
            Hinted::Suit(hint_card.suit)
        } else {
            Hinted::Rank(hint_card.rank)
        };
        Hint {
            player: hint_player,
            hinted,
        }
    }
}

impl PlayerStrategy for RandomStrategyPlayer {
    fn name(&self) -> String {
        format!(
            "random(hint={}, play={})",
            self.hint_probability, self.play_probability
        )
    }

    fn decide(&mut self, view: &PlayerView<'_>) -> TurnChoice {
        let board = view.board;
        let p = self.rng.gen::<f64>();
        let random_index = self.rng.gen_range(0..view.my_hand_size());
        let can_hint = board.hints_remaining() > 0;
        let can_discard = !board.tokens.hints_capped();

        if p < self.play_probability || !(can_hint || can_discard) {
            TurnChoice::Play(random_index)
        } else if can_hint && (!can_discard || p < self.play_probability + self.hint_probability) {
            TurnChoice::Hint(self.random_hint(view))
        } else {
            TurnChoice::Discard(random_index)
        }
    }
}
