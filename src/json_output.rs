use serde_json::*;

use crate::game::*;
use crate::round::{Round, RoundState};

fn suit_index(game_type: GameType, suit: Suit) -> Option<usize> {
    game_type
        .suits()
        .iter()
        .position(|&game_suit| game_suit == suit)
}

fn card_to_json(game_type: GameType, card: &Card) -> serde_json::Value {
    json!({
        "rank": card.rank,
        "suit": card.suit.name,
        "suitIndex": suit_index(game_type, card.suit),
    })
}

fn hinted_to_json(hinted: &Hinted) -> serde_json::Value {
    match *hinted {
        Hinted::Suit(suit) => json!({ "kind": "suit", "value": suit.name }),
        Hinted::Rank(rank) => json!({ "kind": "rank", "value": rank }),
    }
}

pub fn turn_to_json(game_type: GameType, turn: &TurnRecord) -> serde_json::Value {
    let mut value = match turn.result {
        TurnResult::Play(ref card, success) => json!({
            "type": "play",
            "card": card_to_json(game_type, card),
            "success": success,
        }),
        TurnResult::Discard(ref card) => json!({
            "type": "discard",
            "card": card_to_json(game_type, card),
        }),
        TurnResult::Hint(ref matches) => json!({
            "type": "hint",
            "touched": matches
                .iter()
                .enumerate()
                .filter(|(_, matched)| **matched)
                .map(|(i, _)| i)
                .collect::<Vec<_>>(),
        }),
    };
    value["player"] = json!(turn.player);
    match turn.choice {
        TurnChoice::Play(index) | TurnChoice::Discard(index) => value["target"] = json!(index),
        TurnChoice::Hint(ref hint) => {
            value["target"] = json!(hint.player);
            value["hint"] = hinted_to_json(&hint.hinted);
        }
    }
    value
}

fn state_name(state: RoundState) -> &'static str {
    match state {
        RoundState::NotStarted => "not_started",
        RoundState::InProgress => "in_progress",
        RoundState::WonPerfect => "won_perfect",
        RoundState::LossByFuse => "loss_by_fuse",
        RoundState::EndedByTimer => "ended_by_timer",
        RoundState::Aborted => "aborted",
    }
}

pub fn json_format(round: &Round) -> serde_json::Value {
    let game_type = round.opts().game_type;
    json!({
        "options": {
            "variant": game_type.to_string(),
            "hints": round.opts().num_hints,
            "fuses": round.opts().num_lives,
        },
        "players": round.player_names().collect::<Vec<_>>(),
        "strategies": round.player_kinds().collect::<Vec<_>>(),
        "first_player": 0,
        // in draw order
        "deck": round
            .deck()
            .iter()
            .map(|card| card_to_json(game_type, card))
            .collect::<Vec<serde_json::Value>>(),
        "actions": round
            .history()
            .iter()
            .map(|turn| turn_to_json(game_type, turn))
            .collect::<Vec<serde_json::Value>>(),
        "result": state_name(round.state()),
        "score": round.score(),
    })
}
