use thiserror::Error;

use crate::game::{Player, TurnChoice};

/// Problems with how a round was set up. Never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unrecognized game type: {0} (expected vanilla, purple or rainbow)")]
    UnknownGameType(String),

    #[error("Unrecognized strategy: {0}")]
    UnknownStrategy(String),

    #[error("Malformed card: {0:?}")]
    MalformedCard(String),

    #[error("Malformed deck: {0}")]
    MalformedDeck(String),

    #[error("Malformed replay: {0}")]
    MalformedReplay(String),

    #[error("Invalid player count {0}: must be between 2 and 5")]
    InvalidPlayerCount(u32),
}

/// Why a proposed action was rejected by the rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IllegalMove {
    #[error("no hint tokens remaining")]
    NoHintsRemaining,

    #[error("player gave a hint to themselves")]
    HintToSelf,

    #[error("hint target {0} is not in the game")]
    NoSuchPlayer(Player),

    #[error("hint matches no card in the target's hand")]
    EmptyHint,

    #[error("suit {0} cannot be named in a hint")]
    UnhintableSuit(&'static str),

    #[error("rank {0} does not exist")]
    InvalidRank(u32),

    #[error("cannot discard while hint tokens are at the cap of {0}")]
    DiscardAtHintCap(u32),

    #[error("no card at position {index} (hand holds {hand_size})")]
    NoSuchCard { index: usize, hand_size: usize },
}

#[derive(Error, Debug)]
pub enum RoundError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A strategy broke the decision contract. Carries everything needed to
    /// reproduce the failure.
    #[error("player {player} proposed {choice:?} on turn {turn}: {reason}\n{snapshot}")]
    IllegalMove {
        player: Player,
        turn: u32,
        choice: TurnChoice,
        reason: IllegalMove,
        snapshot: String,
    },

    #[error("round was aborted by an illegal move on turn {0}")]
    Aborted(u32),

    #[error("Failed to write round log: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RoundError>;
