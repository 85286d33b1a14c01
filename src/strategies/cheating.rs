use crate::game::*;
use crate::strategy::{CheatingStrategy, Seat};

pub fn seat(_: &GameOptions, _: u64) -> Seat {
    Seat::Cheating(Box::new(CheatingPlayer))
}

// strategy that cheats by looking at its own cards
// Plays according to the following rules:
//  - if any card is playable,
//      play the card with the lowest rank
//  - if discarding is allowed,
//      discard a dead card, then a duplicate, then the highest dispensable card
//  - otherwise hint the next player about the rank of their first card
pub struct CheatingPlayer;

impl CheatingPlayer {
    fn discard_index(&self, view: &OmniscientView<'_>) -> usize {
        let board = view.view.board;
        let cards = &view.my_cards;

        if let Some(index) = cards.iter().position(|card| board.is_dead(card)) {
            return index;
        }

        // a copy we can see elsewhere, or hold twice
        let duplicated = cards.iter().enumerate().position(|(i, card)| {
            view.view.can_see(card) || cards[i + 1..].contains(card)
        });
        if let Some(index) = duplicated {
            return index;
        }

        // the highest card we can afford to lose, or failing that the highest card
        let dispensable = cards
            .iter()
            .enumerate()
            .filter(|(_, card)| board.is_dispensable(card))
            .max_by_key(|(i, card)| (card.rank, std::cmp::Reverse(*i)))
            .map(|(i, _)| i);
        dispensable.unwrap_or_else(|| {
            cards
                .iter()
                .enumerate()
                .max_by_key(|(i, card)| (card.rank, std::cmp::Reverse(*i)))
                .map_or(0, |(i, _)| i)
        })
    }
}

impl CheatingStrategy for CheatingPlayer {
    fn name(&self) -> String {
        String::from("cheater")
    }

    fn decide(&mut self, view: &OmniscientView<'_>) -> TurnChoice {
        let board = view.view.board;

        let playable = view
            .my_cards
            .iter()
            .enumerate()
            .filter(|(_, card)| board.is_playable(card))
            .min_by_key(|(i, card)| (card.rank, *i));
        if let Some((index, _)) = playable {
            return TurnChoice::Play(index);
        }

        if !board.tokens.hints_capped() {
            return TurnChoice::Discard(self.discard_index(view));
        }
        if board.hints_remaining() == 0 {
            // a zero hint cap leaves nothing else to do
            return TurnChoice::Play(0);
        }

        let next = board.player_to_left(view.view.player);
        let rank = view.view.hand(next)[0].rank;
        TurnChoice::Hint(Hint {
            player: next,
            hinted: Hinted::Rank(rank),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decide(deck: &str, setup: impl FnOnce(&mut GameState)) -> TurnChoice {
        let opts = GameOptions::standard(GameType::Vanilla, 2).unwrap();
        let mut game = GameState::new(&opts, parse_cards(deck).unwrap());
        setup(&mut game);
        CheatingPlayer.decide(&game.get_omniscient_view(game.board.player))
    }

    #[test]
    fn plays_lowest_playable() {
        let choice = decide("r3 g1 b1 y2 w4 y1 y3 y4 y5 b2 g2", |_| {});
        assert_eq!(choice, TurnChoice::Play(1));
    }

    #[test]
    fn hints_when_discard_is_forbidden() {
        let choice = decide("r3 g2 b2 y2 w4 y1 y3 y4 y5 b3 g3", |_| {});
        assert_eq!(
            choice,
            TurnChoice::Hint(Hint {
                player: 1,
                hinted: Hinted::Rank(1),
            })
        );
    }

    #[test]
    fn discards_duplicates_before_needed_cards() {
        let choice = decide("r3 g2 b2 y3 w4 y1 y2 r3 y5 b3 g3", |game| {
            game.board.tokens.hints_remaining = 4;
        });
        // r3 is also in the partner's hand
        assert_eq!(choice, TurnChoice::Discard(0));
    }

    #[test]
    fn discards_dead_cards_first() {
        let choice = decide("r3 g2 b1 y3 w4 y1 y2 r4 y5 b3 g3", |game| {
            game.board.tokens.hints_remaining = 4;
            game.board.fireworks.get_mut(&BLUE).unwrap().top = 1;
        });
        assert_eq!(choice, TurnChoice::Discard(2));
    }
}
