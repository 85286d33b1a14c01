use std::fmt;
use tracing::{debug, info};

use crate::error::{ConfigError, Result, RoundError};
use crate::game::*;
use crate::helpers::PerPlayer;
use crate::strategy::Seat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundState {
    NotStarted,
    InProgress,
    WonPerfect,
    LossByFuse,
    EndedByTimer,
    Aborted,
}
impl RoundState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RoundState::WonPerfect
                | RoundState::LossByFuse
                | RoundState::EndedByTimer
                | RoundState::Aborted
        )
    }
}
impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            RoundState::NotStarted => "not started",
            RoundState::InProgress => "in progress",
            RoundState::WonPerfect => "won perfect",
            RoundState::LossByFuse => "loss by fuse",
            RoundState::EndedByTimer => "ended by timer",
            RoundState::Aborted => "aborted",
        })
    }
}

// one entry of the roster: which strategy sits where, under what name
pub struct Participant {
    pub kind: String,
    pub name: String,
    pub seat: Seat,
}

#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub score: Score,
    pub state: RoundState,
    pub fuses_remaining: u32,
    pub turns: u32,
    pub history: Vec<TurnRecord>,
}

/// One game of Hanabi, from deal to final score.
pub struct Round {
    opts: GameOptions,
    kinds: PerPlayer<String>,
    names: PerPlayer<String>,
    seats: PerPlayer<Seat>,
    fixed_deck: Option<Cards>,
    seed: Option<u64>,
    deck: Cards,
    game: Option<GameState>,
    state: RoundState,
}

impl Round {
    /// `deck`, if given, is dealt from the front in order; otherwise a deck
    /// is shuffled from `seed` (or fresh randomness) when the round starts.
    pub fn new(
        opts: GameOptions,
        roster: Vec<Participant>,
        deck: Option<Cards>,
        seed: Option<u64>,
    ) -> std::result::Result<Round, ConfigError> {
        let num_players = roster.len() as u32;
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&num_players) {
            return Err(ConfigError::InvalidPlayerCount(num_players));
        }
        if num_players != opts.num_players {
            return Err(ConfigError::InvalidPlayerCount(num_players));
        }
        if let Some(ref deck) = deck {
            validate_deck(opts.game_type, deck, opts.cards_dealt())?;
        }

        let mut kinds = Vec::new();
        let mut names = Vec::new();
        let mut seats = Vec::new();
        for (i, participant) in roster.into_iter().enumerate() {
            debug!(
                "Seat {}: {} plays {}{}",
                i,
                participant.name,
                participant.seat.name(),
                if participant.seat.is_cheating() { " (cheating)" } else { "" }
            );
            kinds.push(participant.kind);
            names.push(participant.name);
            seats.push(participant.seat);
        }

        Ok(Round {
            opts,
            kinds: PerPlayer::from_vec(kinds),
            names: PerPlayer::from_vec(names),
            seats: PerPlayer::from_vec(seats),
            fixed_deck: deck,
            seed,
            deck: Cards::new(),
            game: None,
            state: RoundState::NotStarted,
        })
    }

    pub fn start(&mut self) {
        if self.state != RoundState::NotStarted {
            return;
        }
        self.deck = match self.fixed_deck {
            Some(ref deck) => deck.clone(),
            None => new_deck(self.opts.game_type, self.seed),
        };
        debug!("Dealing from deck: {}", format_cards(&self.deck));
        self.game = Some(GameState::new(&self.opts, self.deck.clone()));
        self.state = RoundState::InProgress;
    }

    /// Plays one turn. Starts the round if needed; does nothing once the
    /// round has ended. An illegal move aborts the round for good.
    pub fn step(&mut self) -> Result<()> {
        self.start();
        if self.state == RoundState::Aborted {
            return Err(RoundError::Aborted(self.turn_number()));
        }
        if self.state.is_terminal() {
            return Ok(());
        }
        let game = match self.game.as_mut() {
            Some(game) => game,
            None => return Ok(()),
        };
        if game.board.is_perfect() {
            self.state = RoundState::WonPerfect;
            return Ok(());
        }

        let player = game.board.player;
        debug!("");
        debug!("=======================================================");
        debug!(
            "Turn {}, Player {} ({}) to go",
            game.board.turn, player, self.names[player]
        );
        debug!("=======================================================");
        debug!("{}", game);

        let choice = match self.seats[player] {
            Seat::Fair(ref mut strategy) => strategy.decide(&game.get_view(player)),
            Seat::Cheating(ref mut strategy) => {
                strategy.decide(&game.get_omniscient_view(player))
            }
        };

        let turn_record = match game.process_choice(choice) {
            Ok(turn_record) => turn_record,
            Err(reason) => {
                self.state = RoundState::Aborted;
                return Err(RoundError::IllegalMove {
                    player,
                    turn: game.board.turn,
                    choice,
                    reason,
                    snapshot: game.to_string(),
                })
            }
        };

        for other in game.get_players() {
            if let Seat::Fair(ref mut strategy) = self.seats[other] {
                strategy.update(&turn_record, &game.get_view(other));
            }
        }

        self.state = Self::check_terminal(game);
        if self.state.is_terminal() {
            info!(
                "Round ended ({}) after {} turns, score {}",
                self.state,
                self.turn_number(),
                self.score()
            );
        }
        Ok(())
    }

    fn check_terminal(game: &GameState) -> RoundState {
        if game.board.tokens.fuses_exhausted() {
            RoundState::LossByFuse
        } else if game.board.is_perfect() {
            RoundState::WonPerfect
        } else if game.board.game_over_timer == Some(0) {
            RoundState::EndedByTimer
        } else {
            RoundState::InProgress
        }
    }

    /// Plays the round to completion.
    pub fn play(&mut self) -> Result<RoundOutcome> {
        self.start();
        loop {
            self.step()?;
            if self.is_over() {
                break;
            }
        }
        debug!("");
        debug!("=======================================================");
        if let Some(ref game) = self.game {
            debug!("Final state:\n{}", game);
        }
        debug!("SCORE: {:?}", self.score());
        Ok(self.outcome())
    }

    pub fn outcome(&self) -> RoundOutcome {
        RoundOutcome {
            score: self.score(),
            state: self.state,
            fuses_remaining: self.board().map_or(self.opts.num_lives, BoardState::fuses_remaining),
            turns: self.turn_number(),
            history: self.history().to_vec(),
        }
    }

    pub fn is_over(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn score(&self) -> Score {
        match self.state {
            RoundState::Aborted => return 0,
            RoundState::LossByFuse if self.opts.fuse_policy == FusePolicy::ZeroScore => return 0,
            _ => {}
        }
        self.progress()
    }

    pub fn progress(&self) -> Score {
        self.board().map_or(0, BoardState::progress)
    }

    pub fn opts(&self) -> &GameOptions {
        &self.opts
    }

    pub fn board(&self) -> Option<&BoardState> {
        self.game.as_ref().map(|game| &game.board)
    }

    pub fn turn_number(&self) -> u32 {
        self.board().map_or(0, |board| board.turn)
    }

    pub fn history(&self) -> &[TurnRecord] {
        match self.game {
            Some(ref game) => game.history(),
            None => &[],
        }
    }

    // the deck as dealt; empty before the round starts
    pub fn deck(&self) -> &[Card] {
        &self.deck
    }

    pub fn player_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.values().map(String::as_str)
    }

    pub fn player_kinds(&self) -> impl Iterator<Item = &str> + '_ {
        self.kinds.values().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IllegalMove;
    use crate::strategy::PlayerStrategy;
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    struct Scripted {
        choices: VecDeque<TurnChoice>,
    }
    impl PlayerStrategy for Scripted {
        fn name(&self) -> String {
            "scripted".to_string()
        }
        fn decide(&mut self, _: &PlayerView<'_>) -> TurnChoice {
            self.choices.pop_front().expect("script ran out of moves")
        }
    }

    fn scripted_round(game_type: GameType, deck: &str, scripts: Vec<Vec<TurnChoice>>) -> Round {
        let opts = GameOptions::standard(game_type, scripts.len() as u32).unwrap();
        let roster = scripts
            .into_iter()
            .enumerate()
            .map(|(i, choices)| Participant {
                kind: "scripted".to_string(),
                name: format!("Scripted{}", i + 1),
                seat: Seat::Fair(Box::new(Scripted {
                    choices: choices.into(),
                })),
            })
            .collect();
        Round::new(opts, roster, Some(parse_cards(deck).unwrap()), None).unwrap()
    }

    fn hint(player: Player, rank: Rank) -> TurnChoice {
        TurnChoice::Hint(Hint {
            player,
            hinted: Hinted::Rank(rank),
        })
    }

    #[test]
    fn four_opening_plays_of_ones() {
        let mut round = scripted_round(
            GameType::Vanilla,
            "r1 y1 r2 r3 r4 g1 b1 y2 y3 y4 w1 w2 w3 w4 g2 g3 g4 b2 b3 b4",
            vec![
                vec![TurnChoice::Play(0), TurnChoice::Play(1)],
                vec![TurnChoice::Play(0), TurnChoice::Play(1)],
            ],
        );
        for _ in 0..4 {
            round.step().unwrap();
        }
        let board = round.board().unwrap();
        for suit in [RED, YELLOW, GREEN, BLUE] {
            assert_eq!(board.get_firework(suit).top, 1);
        }
        assert_eq!(board.get_firework(WHITE).top, 0);
        assert_eq!(board.hints_remaining(), 8);
        assert_eq!(board.fuses_remaining(), 3);
        assert_eq!(round.turn_number(), 4);
        assert_eq!(round.state(), RoundState::InProgress);
        assert_eq!(round.score(), 4);
    }

    #[test]
    fn discard_at_hint_cap_is_fatal() {
        let mut round = scripted_round(
            GameType::Vanilla,
            "r1 y1 r2 r3 r4 g1 b1 y2 y3 y4 w1 w2",
            vec![vec![TurnChoice::Discard(0)], vec![]],
        );
        match round.step() {
            Err(RoundError::IllegalMove {
                player,
                turn,
                choice,
                reason,
                ..
            }) => {
                assert_eq!(player, 0);
                assert_eq!(turn, 0);
                assert_eq!(choice, TurnChoice::Discard(0));
                assert_eq!(reason, IllegalMove::DiscardAtHintCap(8));
            }
            other => panic!("expected an illegal move, got {:?}", other),
        }
        // nothing was applied
        assert_eq!(round.turn_number(), 0);
        assert!(round.history().is_empty());
    }

    struct Counted {
        calls: Rc<Cell<u32>>,
        choices: VecDeque<TurnChoice>,
    }
    impl PlayerStrategy for Counted {
        fn name(&self) -> String {
            "counted".to_string()
        }
        fn decide(&mut self, _: &PlayerView<'_>) -> TurnChoice {
            self.calls.set(self.calls.get() + 1);
            self.choices.pop_front().expect("script ran out of moves")
        }
    }

    #[test]
    fn illegal_move_ends_the_round_without_retry() {
        let calls = Rc::new(Cell::new(0));
        let opts = GameOptions::standard(GameType::Vanilla, 2).unwrap();
        let seat = |choices: Vec<TurnChoice>| Participant {
            kind: "counted".to_string(),
            name: "Counted".to_string(),
            seat: Seat::Fair(Box::new(Counted {
                calls: calls.clone(),
                choices: choices.into(),
            })),
        };
        let roster = vec![
            seat(vec![TurnChoice::Discard(0), TurnChoice::Play(0)]),
            seat(vec![]),
        ];
        let deck = parse_cards("r1 y1 r2 r3 r4 g1 b1 y2 y3 y4 w1 w2").unwrap();
        let mut round = Round::new(opts, roster, Some(deck), None).unwrap();

        assert!(matches!(round.step(), Err(RoundError::IllegalMove { .. })));
        assert_eq!(round.state(), RoundState::Aborted);
        assert!(round.is_over());

        assert!(matches!(round.step(), Err(RoundError::Aborted(0))));
        assert!(matches!(round.play(), Err(RoundError::Aborted(0))));
        assert_eq!(calls.get(), 1);
        assert_eq!(round.turn_number(), 0);
        assert_eq!(round.progress(), 0);
        assert_eq!(round.score(), 0);
        assert!(round.history().is_empty());
    }

    #[test]
    fn self_hint_is_fatal() {
        let mut round = scripted_round(
            GameType::Vanilla,
            "r1 y1 r2 r3 r4 g1 b1 y2 y3 y4 w1 w2",
            vec![vec![hint(0, 1)], vec![]],
        );
        assert!(matches!(
            round.step(),
            Err(RoundError::IllegalMove {
                reason: IllegalMove::HintToSelf,
                ..
            })
        ));
    }

    #[test]
    fn timer_ends_round_three_turns_after_deck_runs_out() {
        let mut round = scripted_round(
            GameType::Vanilla,
            "r1 r2 r3 r4 r5 y1 y2 y3 y4 y5 g1 g2 g3 g4 g5 b1 b2",
            vec![
                vec![TurnChoice::Play(0), hint(1, 3)],
                vec![TurnChoice::Play(0), hint(2, 4)],
                vec![hint(0, 2)],
            ],
        );
        round.step().unwrap();
        assert_eq!(round.board().unwrap().game_over_timer, None);
        round.step().unwrap();
        // deck exhausted on turn 2
        assert_eq!(round.board().unwrap().deck_size, 0);
        assert_eq!(round.board().unwrap().game_over_timer, Some(3));
        round.step().unwrap();
        round.step().unwrap();
        assert!(!round.is_over());
        round.step().unwrap();
        assert_eq!(round.state(), RoundState::EndedByTimer);
        assert_eq!(round.turn_number(), 5);

        // further steps are no-ops
        round.step().unwrap();
        assert_eq!(round.turn_number(), 5);
        assert_eq!(round.score(), 2);
    }

    #[test]
    fn fuse_exhaustion_scores_zero() {
        let deck = "r1 r3 r4 r5 r2 y3 y4 y5 y1 y2 g1 g2 g3 g4";
        let scripts = vec![
            vec![TurnChoice::Play(0), TurnChoice::Play(1)],
            vec![TurnChoice::Play(0), TurnChoice::Play(1)],
        ];
        let mut round = scripted_round(GameType::Vanilla, deck, scripts.clone());
        let outcome = round.play().unwrap();
        assert_eq!(outcome.state, RoundState::LossByFuse);
        assert_eq!(outcome.fuses_remaining, 0);
        assert_eq!(outcome.turns, 4);
        assert_eq!(round.progress(), 1);
        assert_eq!(outcome.score, 0);

        let mut keep = scripted_round(GameType::Vanilla, deck, scripts);
        keep.opts.fuse_policy = FusePolicy::KeepProgress;
        assert_eq!(keep.play().unwrap().score, 1);
    }

    #[test]
    fn completing_the_last_firework_wins() {
        let mut round = scripted_round(
            GameType::Vanilla,
            "w5 r1 r2 r3 r4 y1 y2 y3 y4 g1 g2 g3",
            vec![vec![TurnChoice::Play(0)], vec![]],
        );
        round.start();
        {
            let board = &mut round.game.as_mut().unwrap().board;
            for firework in board.fireworks.values_mut() {
                firework.top = FINAL_RANK;
            }
            board.fireworks.get_mut(&WHITE).unwrap().top = 4;
            board.tokens.hints_remaining = 5;
        }
        round.step().unwrap();
        assert_eq!(round.state(), RoundState::WonPerfect);
        assert_eq!(round.score(), GameType::Vanilla.perfect_score());
        // finishing a firework earns a hint back
        assert_eq!(round.board().unwrap().hints_remaining(), 6);
        round.step().unwrap();
        assert_eq!(round.turn_number(), 1);
    }

    #[test]
    fn completing_a_firework_at_cap_does_not_overflow() {
        let mut round = scripted_round(
            GameType::Vanilla,
            "r5 r1 r2 r3 r4 y1 y2 y3 y4 g1 g2 g3",
            vec![vec![TurnChoice::Play(0)], vec![]],
        );
        round.start();
        round.game.as_mut().unwrap().board.fireworks.get_mut(&RED).unwrap().top = 4;
        round.step().unwrap();
        assert_eq!(round.board().unwrap().hints_remaining(), 8);
    }

    #[test]
    fn rejects_bad_configuration() {
        let opts = GameOptions::standard(GameType::Vanilla, 2).unwrap();
        assert!(matches!(
            Round::new(opts.clone(), Vec::new(), None, None),
            Err(ConfigError::InvalidPlayerCount(0))
        ));
        assert!(GameOptions::standard(GameType::Vanilla, 6).is_err());

        let roster = (0..2)
            .map(|_| Participant {
                kind: "scripted".to_string(),
                name: "Scripted".to_string(),
                seat: Seat::Fair(Box::new(Scripted {
                    choices: VecDeque::new(),
                })),
            })
            .collect();
        let short_deck = parse_cards("r1 r2 r3").unwrap();
        assert!(matches!(
            Round::new(opts, roster, Some(short_deck), None),
            Err(ConfigError::MalformedDeck(_))
        ));
    }

    #[test]
    fn history_records_outcomes_in_order() {
        let mut round = scripted_round(
            GameType::Vanilla,
            "r1 r3 r2 r4 r5 y1 y2 y3 y4 y5 g1 g2",
            vec![vec![TurnChoice::Play(1)], vec![hint(0, 2)]],
        );
        round.step().unwrap();
        round.step().unwrap();
        let history = round.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].player, 0);
        assert_eq!(history[0].result, TurnResult::Play(Card::new(RED, 3), false));
        assert_eq!(history[1].player, 1);
        assert_eq!(
            history[1].result,
            TurnResult::Hint(vec![false, false, true, false, false])
        );
    }
}
