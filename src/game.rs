use fnv::FnvHashMap;
use std::fmt;
use tracing::debug;

pub use crate::cards::*;
use crate::error::{ConfigError, IllegalMove};
use crate::helpers::PerPlayer;
use crate::knowledge::CardKnowledge;
use crate::tokens::Tokens;

pub type Player = u32;
// index of a card in the round's deck arena
pub type CardId = u32;

pub const MIN_PLAYERS: u32 = 2;
pub const MAX_PLAYERS: u32 = 5;

/// What the score is when the last fuse burns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FusePolicy {
    ZeroScore,
    KeepProgress,
}

// represents possible settings for the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOptions {
    pub game_type: GameType,
    pub num_players: u32,
    pub hand_size: u32,
    // when hits 0, you cannot hint
    pub num_hints: u32,
    // when hits 0, you lose
    pub num_lives: u32,
    pub fuse_policy: FusePolicy,
}
impl GameOptions {
    pub fn standard(game_type: GameType, num_players: u32) -> Result<GameOptions, ConfigError> {
        let hand_size = match num_players {
            2 | 3 => 5,
            4 | 5 => 4,
            _ => return Err(ConfigError::InvalidPlayerCount(num_players)),
        };
        Ok(GameOptions {
            game_type,
            num_players,
            hand_size,
            num_hints: 8,
            num_lives: 3,
            fuse_policy: FusePolicy::ZeroScore,
        })
    }

    pub fn cards_dealt(&self) -> u32 {
        self.num_players * self.hand_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hint {
    pub player: Player,
    pub hinted: Hinted,
}

// represents the choice a player made in a given turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnChoice {
    Hint(Hint),
    Discard(usize), // index of card to discard
    Play(usize),    // index of card to play
}

// represents what happened in a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnResult {
    Hint(Vec<bool>),  // vector of whether each card was in the hint
    Discard(Card),    // card discarded
    Play(Card, bool), // card played, whether it succeeded
}

// represents a turn taken in the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRecord {
    pub player: Player,
    pub choice: TurnChoice,
    pub result: TurnResult,
}

pub type Hand = Vec<CardId>;

// State of everything except the player's hands
// Is all completely common knowledge
#[derive(Debug, Clone)]
pub struct BoardState {
    pub opts: GameOptions,
    pub discard: Discard,
    pub fireworks: FnvHashMap<Suit, Firework>,
    pub tokens: Tokens,

    // how many turns have been taken
    pub turn: u32,
    // whose turn is it?
    pub player: Player,

    pub deck_size: u32,
    // set once the deck runs out; the round ends when it reaches 0
    pub game_over_timer: Option<u32>,
}
impl BoardState {
    fn new(opts: &GameOptions, deck_size: u32) -> BoardState {
        let fireworks = opts
            .game_type
            .suits()
            .iter()
            .map(|&suit| (suit, Firework::new(suit)))
            .collect();
        BoardState {
            opts: opts.clone(),
            discard: Discard::new(opts.game_type),
            fireworks,
            tokens: Tokens::new(opts.num_hints, opts.num_lives),
            turn: 0,
            player: 0,
            deck_size,
            game_over_timer: None,
        }
    }

    pub fn get_firework(&self, suit: Suit) -> &Firework {
        &self.fireworks[&suit]
    }

    fn get_firework_mut(&mut self, suit: Suit) -> &mut Firework {
        self.fireworks
            .get_mut(&suit)
            .expect("every card suit has a firework")
    }

    pub fn hints_remaining(&self) -> u32 {
        self.tokens.hints_remaining
    }

    pub fn fuses_remaining(&self) -> u32 {
        self.tokens.fuses_remaining
    }

    // returns whether a card would place on a firework
    pub fn is_playable(&self, card: &Card) -> bool {
        self.fireworks
            .get(&card.suit)
            .map_or(false, |firework| Some(card.rank) == firework.needed_rank())
    }

    // best possible value we can get for firework of that suit,
    // based on looking at discard + fireworks
    pub fn highest_attainable(&self, suit: Suit) -> Rank {
        let firework = self.get_firework(suit);
        match firework.needed_rank() {
            None => FINAL_RANK,
            Some(needed) => {
                for &rank in RANKS.iter().filter(|&&rank| rank >= needed) {
                    if self.discard.has_all(&Card::new(suit, rank)) {
                        return rank - 1;
                    }
                }
                FINAL_RANK
            }
        }
    }

    // is never going to play, based on discard + fireworks
    pub fn is_dead(&self, card: &Card) -> bool {
        match self.get_firework(card.suit).needed_rank() {
            None => true,
            Some(needed) => card.rank < needed || card.rank > self.highest_attainable(card.suit),
        }
    }

    // can be discarded without necessarily sacrificing score
    pub fn is_dispensable(&self, card: &Card) -> bool {
        self.is_dead(card) || self.discard.remaining(card) != 1
    }

    pub fn get_players(&self) -> impl Iterator<Item = Player> {
        0..self.opts.num_players
    }

    // sum of firework heights, regardless of how the round ended
    pub fn progress(&self) -> Score {
        self.fireworks.values().map(Firework::score).sum()
    }

    pub fn is_perfect(&self) -> bool {
        self.fireworks.values().all(Firework::complete)
    }

    pub fn player_to_left(&self, player: Player) -> Player {
        (player + 1) % self.opts.num_players
    }
}
impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Turn {} (Player {}'s turn):", self.turn, self.player)?;
        writeln!(f, "{} cards remaining in deck", self.deck_size)?;
        if let Some(timer) = self.game_over_timer {
            writeln!(f, "Deck is empty.  {} turns remaining in game", timer)?;
        }
        write!(f, "{}", self.tokens)?;
        f.write_str("Fireworks:\n")?;
        for suit in self.opts.game_type.suits() {
            writeln!(f, "  {}", self.get_firework(*suit))?;
        }
        f.write_str("Discard:\n")?;
        writeln!(f, "{}", self.discard)
    }
}

// complete game state (known to nobody!)
#[derive(Debug, Clone)]
pub struct GameState {
    pub board: BoardState,
    // arena of every card in the round, in draw order
    deck: Cards,
    next_draw: usize,
    hands: PerPlayer<Hand>,
    // what is common knowledge about each hand position
    knowledge: PerPlayer<Vec<CardKnowledge>>,
    history: Vec<TurnRecord>,
}
impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("\n")?;
        f.write_str("======\n")?;
        f.write_str("Hands:\n")?;
        f.write_str("======\n")?;
        for (player, hand) in self.hands.iter() {
            write!(f, "player {}:", player)?;
            for (card_id, knowledge) in hand.iter().zip(&self.knowledge[player]) {
                write!(f, " {} =? {: <10}", self.card(*card_id), knowledge)?;
            }
            f.write_str("\n")?;
        }
        f.write_str("======\n")?;
        f.write_str("Board:\n")?;
        f.write_str("======\n")?;
        write!(f, "{}", self.board)
    }
}

impl GameState {
    /// Deals from the front of `deck`, which must already be validated for
    /// the options' game type.
    pub fn new(opts: &GameOptions, deck: Cards) -> GameState {
        let mut board = BoardState::new(opts, deck.len() as u32);
        let mut next_draw = 0;
        let hands = PerPlayer::new(opts.num_players, |_| {
            (0..opts.hand_size)
                .map(|_| {
                    next_draw += 1;
                    (next_draw - 1) as CardId
                })
                .collect::<Hand>()
        });
        let knowledge = PerPlayer::new(opts.num_players, |_| {
            (0..opts.hand_size)
                .map(|_| CardKnowledge::new(opts.game_type))
                .collect()
        });
        board.deck_size = (deck.len() - next_draw) as u32;
        if board.deck_size == 0 {
            // dealing emptied the deck: everyone still gets one turn
            board.game_over_timer = Some(opts.num_players);
        }

        GameState {
            board,
            deck,
            next_draw,
            hands,
            knowledge,
            history: Vec::new(),
        }
    }

    pub fn get_players(&self) -> impl Iterator<Item = Player> {
        self.board.get_players()
    }

    pub fn history(&self) -> &[TurnRecord] {
        &self.history
    }

    fn card(&self, card_id: CardId) -> Card {
        self.deck[card_id as usize]
    }

    fn hand_cards(&self, player: Player) -> Cards {
        self.hands[player].iter().map(|&id| self.card(id)).collect()
    }

    /// The view handed to `player`'s decision procedure: everything except
    /// the identities of their own cards.
    pub fn get_view(&self, player: Player) -> PlayerView<'_> {
        let other_hands = PerPlayer::new(self.board.opts.num_players, |other| {
            if other == player {
                None
            } else {
                Some(self.hand_cards(other))
            }
        });
        PlayerView {
            player,
            board: &self.board,
            history: &self.history,
            knowledge: &self.knowledge,
            other_hands,
        }
    }

    /// CHEATING: the same view as `get_view`, plus the player's own cards.
    /// Only for the full-information benchmarking baseline.
    pub fn get_omniscient_view(&self, player: Player) -> OmniscientView<'_> {
        OmniscientView {
            my_cards: self.hand_cards(player),
            view: self.get_view(player),
        }
    }

    pub fn validate(&self, choice: &TurnChoice) -> Result<(), IllegalMove> {
        let me = self.board.player;
        match *choice {
            TurnChoice::Hint(ref hint) => {
                if self.board.tokens.hints_remaining == 0 {
                    return Err(IllegalMove::NoHintsRemaining);
                }
                if hint.player == me {
                    return Err(IllegalMove::HintToSelf);
                }
                if hint.player >= self.board.opts.num_players {
                    return Err(IllegalMove::NoSuchPlayer(hint.player));
                }
                match hint.hinted {
                    Hinted::Suit(suit) => {
                        if suit.matches_any_hint || !self.board.opts.game_type.has_suit(suit) {
                            return Err(IllegalMove::UnhintableSuit(suit.name));
                        }
                    }
                    Hinted::Rank(rank) => {
                        if !RANKS.contains(&rank) {
                            return Err(IllegalMove::InvalidRank(rank));
                        }
                    }
                }
                let touches_any = self.hands[hint.player]
                    .iter()
                    .any(|&id| self.card(id).matches(&hint.hinted));
                if !touches_any {
                    return Err(IllegalMove::EmptyHint);
                }
            }
            TurnChoice::Discard(index) => {
                self.check_index(me, index)?;
                if self.board.tokens.hints_capped() {
                    return Err(IllegalMove::DiscardAtHintCap(self.board.tokens.hints_total));
                }
            }
            TurnChoice::Play(index) => {
                self.check_index(me, index)?;
            }
        }
        Ok(())
    }

    fn check_index(&self, player: Player, index: usize) -> Result<(), IllegalMove> {
        let hand_size = self.hands[player].len();
        if index >= hand_size {
            return Err(IllegalMove::NoSuchCard { index, hand_size });
        }
        Ok(())
    }

    // takes a card from the player's hand, and replaces it in the same slot if possible
    fn take_from_hand(&mut self, index: usize) -> Card {
        let player = self.board.player;
        let card = self.card(self.hands[player][index]);
        if self.next_draw < self.deck.len() {
            let new_id = self.next_draw as CardId;
            self.next_draw += 1;
            self.board.deck_size -= 1;
            debug!("Drew new card, {}", self.card(new_id));
            self.hands[player][index] = new_id;
            self.knowledge[player][index] = CardKnowledge::new(self.board.opts.game_type);
        } else {
            self.hands[player].remove(index);
            self.knowledge[player].remove(index);
        }
        card
    }

    /// Validates and applies the current player's choice, then advances the turn.
    pub fn process_choice(&mut self, choice: TurnChoice) -> Result<TurnRecord, IllegalMove> {
        self.validate(&choice)?;
        let player = self.board.player;
        let deck_had_cards = self.board.deck_size > 0;
        debug!("Player {}'s move", player);

        let turn_result = match choice {
            TurnChoice::Hint(ref hint) => {
                self.board.tokens.spend_hint()?;
                debug!(
                    "Hint to player {}, about {}",
                    hint.player, hint.hinted
                );

                let matches = self.hands[hint.player]
                    .iter()
                    .map(|&id| self.card(id).matches(&hint.hinted))
                    .collect::<Vec<bool>>();
                for (knowledge, &matched) in self.knowledge[hint.player].iter_mut().zip(&matches) {
                    knowledge.mark(&hint.hinted, matched);
                }
                TurnResult::Hint(matches)
            }
            TurnChoice::Discard(index) => {
                let card = self.take_from_hand(index);
                debug!("Discard card in position {}, which is {}", index, card);
                self.board.discard.place(card);
                self.board.tokens.award_hint();
                TurnResult::Discard(card)
            }
            TurnChoice::Play(index) => {
                let card = self.take_from_hand(index);
                debug!("Playing card at position {}, which is {}", index, card);

                let playable = self.board.is_playable(&card);
                if playable {
                    let firework = self.board.get_firework_mut(card.suit);
                    firework.place(&card);
                    debug!("Successfully played {}!", card);
                    if firework.complete() {
                        debug!("Firework complete for {}!", card.suit);
                        self.board.tokens.award_hint();
                    }
                } else {
                    self.board.discard.place(card);
                    self.board.tokens.lose_fuse();
                    debug!(
                        "Removing a fuse! Fuses remaining: {}",
                        self.board.tokens.fuses_remaining
                    );
                }
                TurnResult::Play(card, playable)
            }
        };

        let turn_record = TurnRecord {
            player,
            choice,
            result: turn_result,
        };
        self.history.push(turn_record.clone());

        self.board.turn += 1;
        self.board.player = self.board.player_to_left(player);

        if deck_had_cards && self.board.deck_size == 0 {
            debug!("Deck is empty, {} turns remain", self.board.opts.num_players);
            self.board.game_over_timer = Some(self.board.opts.num_players);
        } else if let Some(timer) = self.board.game_over_timer.as_mut() {
            *timer = timer.saturating_sub(1);
        }

        Ok(turn_record)
    }
}

// complete game view of a given player
// structurally cannot reveal the identities of the player's own cards
#[derive(Debug)]
pub struct PlayerView<'game> {
    // the player whose view it is
    pub player: Player,
    pub board: &'game BoardState,
    pub history: &'game [TurnRecord],
    // public knowledge about every hand position, including our own
    knowledge: &'game PerPlayer<Vec<CardKnowledge>>,
    // the cards of the other players
    other_hands: PerPlayer<Option<Cards>>,
}
impl<'game> PlayerView<'game> {
    pub fn hand(&self, player: Player) -> &[Card] {
        assert_ne!(self.player, player, "Cannot query about your own cards!");
        self.other_hands[player]
            .as_deref()
            .expect("other players' hands are always visible")
    }

    pub fn hand_size(&self, player: Player) -> usize {
        self.knowledge[player].len()
    }

    pub fn my_hand_size(&self) -> usize {
        self.hand_size(self.player)
    }

    pub fn knowledge(&self, player: Player) -> &'game [CardKnowledge] {
        let knowledge: &'game PerPlayer<Vec<CardKnowledge>> = self.knowledge;
        &knowledge[player]
    }

    pub fn my_knowledge(&self) -> &'game [CardKnowledge] {
        self.knowledge(self.player)
    }

    pub fn other_players(&self) -> impl Iterator<Item = Player> + '_ {
        // nearest to our left first
        let me = self.player;
        let n = self.board.opts.num_players;
        (1..n).map(move |offset| (me + offset) % n)
    }

    pub fn has_card(&self, player: Player, card: &Card) -> bool {
        self.hand(player).iter().any(|c| c == card)
    }

    pub fn can_see(&self, card: &Card) -> bool {
        self.other_players()
            .any(|player| self.has_card(player, card))
    }
}

/// A view that includes the acting player's own cards. Built only by
/// `GameState::get_omniscient_view`.
#[derive(Debug)]
pub struct OmniscientView<'game> {
    pub view: PlayerView<'game>,
    pub my_cards: Cards,
}
