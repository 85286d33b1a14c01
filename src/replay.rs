//! Plain-text round logs: a block of `[Tag "value"]` headers followed by one
//! line per action.

use std::io::{self, Write};

use crate::error::ConfigError;
use crate::game::*;
use crate::round::Round;

fn write_tag<W: Write>(writer: &mut W, name: &str, value: &str) -> io::Result<()> {
    writeln!(writer, "[{} \"{}\"]", name, value)
}

fn hinted_label(hinted: &Hinted) -> String {
    match *hinted {
        Hinted::Suit(suit) => suit.letter.to_string(),
        Hinted::Rank(rank) => rank.to_string(),
    }
}

pub fn write_replay<W: Write>(writer: &mut W, round: &Round) -> io::Result<()> {
    write_tag(writer, "GameType", &round.opts().game_type.to_string())?;
    for (i, kind) in round.player_kinds().enumerate() {
        write_tag(writer, &format!("Player{}Type", i), kind)?;
    }
    for (i, name) in round.player_names().enumerate() {
        write_tag(writer, &format!("Player{}Name", i), name)?;
    }
    if !round.deck().is_empty() {
        write_tag(writer, "Deck", &format_cards(round.deck()))?;
    }
    writeln!(writer)?;

    for turn in round.history() {
        match turn.result {
            TurnResult::Play(card, _) => writeln!(writer, "play {}", card)?,
            TurnResult::Discard(card) => writeln!(writer, "discard {}", card)?,
            TurnResult::Hint(_) => {
                if let TurnChoice::Hint(hint) = turn.choice {
                    writeln!(writer, "hint {} {}", hinted_label(&hint.hinted), hint.player + 1)?;
                }
            }
        }
    }
    Ok(())
}

/// The setup recorded at the top of a replay file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayHeader {
    pub game_type: GameType,
    pub player_types: Vec<String>,
    pub player_names: Vec<String>,
    pub deck: Option<Cards>,
}

fn parse_tag(line: &str) -> Option<(&str, &str)> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    let (name, value) = inner.split_once(' ')?;
    let value = value.strip_prefix('"')?.strip_suffix('"')?;
    Some((name, value))
}

fn indexed_tag(name: &str, suffix: &str) -> Option<usize> {
    name.strip_prefix("Player")?.strip_suffix(suffix)?.parse().ok()
}

pub fn parse_replay_header(text: &str) -> Result<ReplayHeader, ConfigError> {
    let mut game_type = None;
    let mut player_types: Vec<(usize, String)> = Vec::new();
    let mut player_names: Vec<(usize, String)> = Vec::new();
    let mut deck = None;

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            // headers end at the first blank line
            break;
        }
        let (name, value) = parse_tag(line)
            .ok_or_else(|| ConfigError::MalformedReplay(format!("bad header line: {}", line)))?;
        match name {
            "GameType" => game_type = Some(value.parse::<GameType>()?),
            "Deck" => deck = Some(parse_cards(value)?),
            _ => {
                if let Some(i) = indexed_tag(name, "Type") {
                    player_types.push((i, value.to_string()));
                } else if let Some(i) = indexed_tag(name, "Name") {
                    player_names.push((i, value.to_string()));
                }
            }
        }
    }

    player_types.sort();
    player_names.sort();
    Ok(ReplayHeader {
        game_type: game_type
            .ok_or_else(|| ConfigError::MalformedReplay(String::from("no GameType tag")))?,
        player_types: player_types.into_iter().map(|(_, kind)| kind).collect(),
        player_names: player_names.into_iter().map(|(_, name)| name).collect(),
        deck,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_back_the_header() {
        let text = "[GameType \"rainbow\"]\n\
                    [Player1Type \"cheater\"]\n\
                    [Player0Type \"basic\"]\n\
                    [Player0Name \"Basic\"]\n\
                    [Player1Name \"Cheater\"]\n\
                    [Deck \"r1 m2 y3\"]\n\
                    \n\
                    play r1\n";
        let header = parse_replay_header(text).unwrap();
        assert_eq!(header.game_type, GameType::Rainbow);
        assert_eq!(header.player_types, vec!["basic", "cheater"]);
        assert_eq!(header.player_names, vec!["Basic", "Cheater"]);
        assert_eq!(header.deck, Some(parse_cards("r1 m2 y3").unwrap()));
    }

    #[test]
    fn written_log_replays_identically() {
        let registry = crate::strategies::Registry::with_builtins();
        let tags = vec!["basic".to_string(), "cheater".to_string(), "brainbow".to_string()];
        let opts = GameOptions::standard(GameType::Purple, 3).unwrap();
        let roster = registry.roster(&opts, &tags, 9).unwrap();
        let mut round = Round::new(opts.clone(), roster, None, Some(9)).unwrap();
        round.play().unwrap();

        let mut log = Vec::new();
        write_replay(&mut log, &round).unwrap();
        let text = String::from_utf8(log).unwrap();
        let action_lines = text.lines().skip_while(|line| !line.is_empty()).skip(1);
        assert_eq!(action_lines.count(), round.history().len());

        let header = parse_replay_header(&text).unwrap();
        assert_eq!(header.game_type, GameType::Purple);
        assert_eq!(header.player_types, tags);
        assert_eq!(header.player_names, vec!["Basic", "Cheater", "Brainbow"]);
        assert_eq!(header.deck.as_deref(), Some(round.deck()));

        let roster = registry.roster(&opts, &header.player_types, 9).unwrap();
        let mut replayed = Round::new(opts, roster, header.deck, None).unwrap();
        replayed.play().unwrap();
        assert_eq!(replayed.history(), round.history());
        assert_eq!(replayed.score(), round.score());
    }

    #[test]
    fn reports_malformed_headers() {
        assert_eq!(
            parse_replay_header("[GameType \"vanilla\"]\nGameType vanilla\n"),
            Err(ConfigError::MalformedReplay(
                "bad header line: GameType vanilla".to_string()
            ))
        );
        assert_eq!(
            parse_replay_header("[Player0Type \"basic\"]\n\nplay r1\n"),
            Err(ConfigError::MalformedReplay("no GameType tag".to_string()))
        );
    }

    #[test]
    fn rejects_unknown_game_type() {
        assert_eq!(
            parse_replay_header("[GameType \"chess\"]\n"),
            Err(ConfigError::UnknownGameType("chess".to_string()))
        );
    }
}
