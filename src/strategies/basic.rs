use float_ord::FloatOrd;
use tracing::trace;

use crate::game::*;
use crate::knowledge::CardPossibilityTable;
use crate::strategy::{PlayerStrategy, Seat};

pub fn basic_seat(_: &GameOptions, _: u64) -> Seat {
    Seat::Fair(Box::new(BasicPlayer::new(false)))
}

pub fn brainbow_seat(_: &GameOptions, _: u64) -> Seat {
    Seat::Fair(Box::new(BasicPlayer::new(true)))
}

// Hint weights
const REVEALS_PLAYABLE: f32 = 1.0;
const TOUCHES_PLAYABLE: f32 = 0.3;
const TOUCHES_UNPLAYABLE: f32 = -0.1;
const DISTANCE_PENALTY: f32 = 0.02;
const MIN_HINT_SCORE: f32 = 0.2;

// Plays only what hints prove playable, hints playable cards to others,
// and otherwise discards its oldest unclued card.
// With `count_cards`, also rules out identities it can see elsewhere.
pub struct BasicPlayer {
    count_cards: bool,
    // turn on which each of our hand positions was filled
    drawn_on: Vec<u32>,
}

impl BasicPlayer {
    pub fn new(count_cards: bool) -> BasicPlayer {
        BasicPlayer {
            count_cards,
            drawn_on: Vec::new(),
        }
    }

    // what we know about our own cards, given everything we can see
    fn get_private_info(&self, view: &PlayerView<'_>) -> Vec<CardPossibilityTable> {
        let mut info = view
            .my_knowledge()
            .iter()
            .map(|knowledge| knowledge.possibilities.clone())
            .collect::<Vec<_>>();
        if !self.count_cards {
            return info;
        }

        let board = view.board;
        let mut seen = board.discard.cards.clone();
        for suit in board.opts.game_type.suits() {
            let top = board.get_firework(*suit).top;
            seen.extend((1..=top).map(|rank| Card::new(*suit, rank)));
        }
        for player in view.other_players() {
            seen.extend_from_slice(view.hand(player));
        }
        for card_table in info.iter_mut() {
            for card in &seen {
                card_table.decrement_weight_if_possible(card);
            }
        }
        info
    }

    // how good is it to give this hint to this player?
    fn hint_goodness(&self, hint: &Hint, distance: u32, view: &PlayerView<'_>) -> f32 {
        let board = view.board;
        let hand = view.hand(hint.player);
        let knowledge = view.knowledge(hint.player);

        let mut goodness = 0.0;
        for (card, card_knowledge) in hand.iter().zip(knowledge) {
            if !card.matches(&hint.hinted) {
                continue;
            }
            let mut card_table = card_knowledge.possibilities.clone();
            let already_known = card_table.surely(&|c| board.is_playable(c));
            card_table.mark_hint(&hint.hinted, true);

            if board.is_playable(card) {
                if already_known {
                    continue;
                }
                if card_table.surely(&|c| board.is_playable(c)) {
                    goodness += REVEALS_PLAYABLE;
                } else if !card_knowledge.clued {
                    goodness += TOUCHES_PLAYABLE;
                }
            } else if !card_knowledge.clued {
                goodness += TOUCHES_UNPLAYABLE;
            }
        }
        goodness - DISTANCE_PENALTY * distance as f32
    }

    fn get_hint(&self, view: &PlayerView<'_>) -> Option<Hint> {
        let mut hint_options = Vec::new();
        for (distance, player) in view.other_players().enumerate() {
            for card in view.hand(player) {
                if !view.board.is_playable(card) {
                    continue;
                }
                if !card.suit.matches_any_hint {
                    hint_options.push((distance, Hint {
                        player,
                        hinted: Hinted::Suit(card.suit),
                    }));
                }
                hint_options.push((distance, Hint {
                    player,
                    hinted: Hinted::Rank(card.rank),
                }));
            }
        }

        let (score, hint) = hint_options
            .into_iter()
            .map(|(distance, hint)| (self.hint_goodness(&hint, distance as u32, view), hint))
            .max_by_key(|&(score, _)| FloatOrd(score))?;
        trace!("Best hint {:?} scores {}", hint, score);
        if score >= MIN_HINT_SCORE {
            Some(hint)
        } else {
            None
        }
    }

    fn discard_index(&self, view: &PlayerView<'_>, private_info: &[CardPossibilityTable]) -> usize {
        let board = view.board;
        if let Some(index) = private_info
            .iter()
            .position(|card_table| card_table.surely(&|card| board.is_dead(card)))
        {
            return index;
        }

        let knowledge = view.my_knowledge();
        let oldest_unclued = (0..knowledge.len())
            .filter(|&i| !knowledge[i].clued)
            .min_by_key(|&i| (self.drawn_on.get(i).copied().unwrap_or(0), i));
        if let Some(index) = oldest_unclued {
            return index;
        }

        // everything is clued; give up the card most likely to be useless
        private_info
            .iter()
            .enumerate()
            .max_by_key(|(_, card_table)| {
                (
                    FloatOrd(card_table.probability_is_dead(board)),
                    FloatOrd(card_table.average_rank()),
                )
            })
            .map_or(0, |(i, _)| i)
    }

    // any legal hint: the rank of the first card of the player to our left
    fn fallback_hint(&self, view: &PlayerView<'_>) -> Hint {
        let next = view.board.player_to_left(view.player);
        Hint {
            player: next,
            hinted: Hinted::Rank(view.hand(next)[0].rank),
        }
    }

    fn sync_hand_ages(&mut self, view: &PlayerView<'_>) {
        if self.drawn_on.len() != view.my_hand_size() {
            self.drawn_on = vec![view.board.turn; view.my_hand_size()];
        }
    }
}

impl PlayerStrategy for BasicPlayer {
    fn name(&self) -> String {
        if self.count_cards {
            String::from("brainbow")
        } else {
            String::from("basic")
        }
    }

    fn decide(&mut self, view: &PlayerView<'_>) -> TurnChoice {
        self.sync_hand_ages(view);
        let board = view.board;
        let private_info = self.get_private_info(view);

        // play the lowest card we know to be playable
        let playable = private_info
            .iter()
            .enumerate()
            .filter(|(_, card_table)| card_table.surely(&|card| board.is_playable(card)))
            .min_by_key(|(i, card_table)| (FloatOrd(card_table.average_rank()), *i));
        if let Some((index, _)) = playable {
            return TurnChoice::Play(index);
        }

        if board.hints_remaining() > 0 {
            if let Some(hint) = self.get_hint(view) {
                return TurnChoice::Hint(hint);
            }
        }

        if !board.tokens.hints_capped() {
            return TurnChoice::Discard(self.discard_index(view, &private_info));
        }

        if board.hints_remaining() == 0 {
            return TurnChoice::Play(0);
        }
        TurnChoice::Hint(self.fallback_hint(view))
    }

    fn update(&mut self, turn_record: &TurnRecord, view: &PlayerView<'_>) {
        if turn_record.player != view.player {
            return;
        }
        let index = match turn_record.choice {
            TurnChoice::Play(index) | TurnChoice::Discard(index) => index,
            TurnChoice::Hint(_) => return,
        };
        if self.drawn_on.len() == view.my_hand_size() {
            // replaced in place; the turn has already advanced
            self.drawn_on[index] = view.board.turn;
        } else if index < self.drawn_on.len() {
            self.drawn_on.remove(index);
        }
        self.sync_hand_ages(view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(deck: &str) -> GameState {
        let opts = GameOptions::standard(GameType::Vanilla, 2).unwrap();
        GameState::new(&opts, parse_cards(deck).unwrap())
    }

    fn rank_hint(player: Player, rank: Rank) -> TurnChoice {
        TurnChoice::Hint(Hint {
            player,
            hinted: Hinted::Rank(rank),
        })
    }

    #[test]
    fn hints_a_playable_one() {
        let game = game("r2 r3 r4 y2 y3 g1 b4 b5 w3 w4 g2 g3");
        let choice = BasicPlayer::new(false).decide(&game.get_view(0));
        // a one is fully revealed as playable by a rank hint
        assert_eq!(choice, rank_hint(1, 1));
    }

    #[test]
    fn plays_a_hinted_one() {
        let mut game = game("r2 r3 r4 y2 y3 g1 b4 b5 w3 w4 g2 g3");
        game.process_choice(rank_hint(1, 1)).unwrap();
        let choice = BasicPlayer::new(false).decide(&game.get_view(1));
        assert_eq!(choice, TurnChoice::Play(0));
    }

    #[test]
    fn discards_oldest_unclued_without_useful_hints() {
        let mut game = game("r2 r3 r4 y2 y3 g3 b4 b5 w3 w4 g2 g3");
        game.board.tokens.hints_remaining = 3;
        let mut player = BasicPlayer::new(false);
        assert_eq!(player.decide(&game.get_view(0)), TurnChoice::Discard(0));
    }

    #[test]
    fn hint_when_discarding_is_forbidden() {
        let game = game("r2 r3 r4 y2 y3 g3 b4 b5 w3 w4 g2 g3");
        let choice = BasicPlayer::new(false).decide(&game.get_view(0));
        assert_eq!(choice, rank_hint(1, 3));
    }

    #[test]
    fn ages_follow_replaced_slots() {
        let mut game = game("r2 r3 r4 y2 y3 g3 b4 b5 w3 w4 g2 g3 g4");
        game.board.tokens.hints_remaining = 3;
        let mut player = BasicPlayer::new(false);
        let choice = player.decide(&game.get_view(0));
        assert_eq!(choice, TurnChoice::Discard(0));
        let record = game.process_choice(choice).unwrap();
        player.update(&record, &game.get_view(0));
        // slot 0 is now the newest card, so slot 1 is the oldest
        assert_eq!(player.drawn_on, vec![1, 0, 0, 0, 0]);
        game.process_choice(TurnChoice::Discard(0)).unwrap();
        assert_eq!(player.decide(&game.get_view(0)), TurnChoice::Discard(1));
    }

    #[test]
    fn card_counting_rules_out_seen_copies() {
        // partner holds both yellow twos and both red twos are discarded
        let mut game = game("r1 r3 r4 y3 w2 y2 y2 b5 w3 w4 g2 g3");
        game.board.discard.place(Card::new(RED, 2));
        game.board.discard.place(Card::new(RED, 2));
        let hint = Hint {
            player: 0,
            hinted: Hinted::Rank(2),
        };
        game.board.player = 1;
        game.process_choice(TurnChoice::Hint(hint)).unwrap();

        let counting = BasicPlayer::new(true);
        let info = counting.get_private_info(&game.get_view(0));
        assert!(!info[4].is_possible(&Card::new(YELLOW, 2)));
        assert!(!info[4].is_possible(&Card::new(RED, 2)));
        assert!(info[4].is_possible(&Card::new(WHITE, 2)));

        let plain = BasicPlayer::new(false);
        let info = plain.get_private_info(&game.get_view(0));
        assert!(info[4].is_possible(&Card::new(YELLOW, 2)));
    }
}
