mod cards;
mod error;
mod game;
mod helpers;
mod json_output;
mod knowledge;
mod replay;
mod round;
mod simulator;
mod strategies;
mod strategy;
mod tokens;

use getopts::Options;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::error::{ConfigError, Result, RoundError};
use crate::game::*;
use crate::simulator::OutputPatterns;
use crate::strategies::Registry;

fn print_usage(program: &str, opts: Options, registry: &Registry) {
    print!("{}", opts.usage(&format!("Usage: {} [options]", program)));
    println!();
    println!("Strategies: {}", registry.tags().join(", "));
    println!("Game types: vanilla, purple, rainbow");
}

fn log_directive(verbosity: &str) -> Option<&'static str> {
    match verbosity {
        "silent" => Some("warn"),
        "scores" => Some("info"),
        "verbose" => Some("debug"),
        _ => None,
    }
}

fn parse_number<T: std::str::FromStr>(value: Option<String>, default: T, flag: &str) -> T {
    match value {
        None => default,
        Some(text) => text.parse().unwrap_or_else(|_| {
            eprintln!("Invalid value for -{}: {}", flag, text);
            process::exit(2);
        }),
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let program = args[0].clone();
    let registry = Registry::with_builtins();

    let mut opts = Options::new();
    opts.optopt("g", "game-type", "Which deck to play with (default vanilla)", "TYPE");
    opts.optopt(
        "p",
        "players",
        "Comma-separated strategy tags, one per seat (default cheater,cheater,cheater)",
        "TAGS",
    );
    opts.optopt("n", "ntrials", "Number of rounds to simulate (default 1)", "N");
    opts.optopt("s", "seed", "Seed of the first round (default random)", "SEED");
    opts.optopt("t", "nthreads", "Number of threads (default 1)", "THREADS");
    opts.optopt(
        "v",
        "verbosity",
        "silent, scores or verbose (default: scores for many rounds, verbose for one)",
        "LEVEL",
    );
    opts.optopt("d", "deck", "Fixed deck to deal from, e.g. \"r1 g3 m5 ...\"", "CARDS");
    opts.optopt("f", "from-replay", "Take game type, players and deck from a replay file", "FILE");
    opts.optopt("o", "json-output", "Write each round as JSON; %s is replaced by the seed", "PATTERN");
    opts.optopt("r", "replay-output", "Write each round as a text replay; %s is replaced by the seed", "PATTERN");
    opts.optflag("", "losses-only", "Only write logs for rounds that were not perfect");
    opts.optflag("", "keep-progress", "Keep fireworks progress when the fuses run out");
    opts.optflag("h", "help", "Print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => {
            eprintln!("{}", f);
            print_usage(&program, opts, &registry);
            process::exit(2);
        }
    };
    if matches.opt_present("h") {
        print_usage(&program, opts, &registry);
        return;
    }
    if !matches.free.is_empty() {
        print_usage(&program, opts, &registry);
        process::exit(2);
    }

    let n_trials = parse_number(matches.opt_str("n"), 1u32, "n");
    let verbosity = matches
        .opt_str("v")
        .unwrap_or_else(|| String::from(if n_trials == 1 { "verbose" } else { "scores" }));
    let directive = log_directive(&verbosity).unwrap_or_else(|| {
        eprintln!("Unknown verbosity: {}", verbosity);
        process::exit(2);
    });
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    if let Err(err) = run(&matches, &registry, n_trials) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

fn run(matches: &getopts::Matches, registry: &Registry, n_trials: u32) -> Result<()> {
    let mut game_type = GameType::Vanilla;
    let mut tags: Vec<String> = vec![String::from("cheater"); 3];
    let mut deck: Option<Cards> = None;

    if let Some(path) = matches.opt_str("f") {
        let text = fs::read_to_string(&path)?;
        let header = replay::parse_replay_header(&text)?;
        game_type = header.game_type;
        tags = header.player_types;
        deck = header.deck;
    }
    if let Some(text) = matches.opt_str("g") {
        game_type = text.parse()?;
    }
    if let Some(text) = matches.opt_str("p") {
        tags = text.split(',').map(|tag| tag.trim().to_string()).collect();
    }
    if let Some(text) = matches.opt_str("d") {
        deck = Some(parse_cards(&text)?);
    }
    if let Some(unknown) = tags.iter().find(|tag| !registry.contains(tag)) {
        return Err(RoundError::from(ConfigError::UnknownStrategy(unknown.clone())));
    }

    let mut opts = GameOptions::standard(game_type, tags.len() as u32)?;
    if matches.opt_present("keep-progress") {
        opts.fuse_policy = FusePolicy::KeepProgress;
    }
    let seed = matches.opt_str("s").map(|text| parse_number(Some(text), 0u64, "s"));
    let n_threads = parse_number(matches.opt_str("t"), 1u32, "t");
    let outputs = OutputPatterns {
        json: matches.opt_str("o"),
        replay: matches.opt_str("r"),
        losses_only: matches.opt_present("losses-only"),
    };

    let result = simulator::simulate(
        &opts,
        registry,
        &tags,
        deck.as_ref(),
        seed,
        n_trials,
        n_threads,
        &outputs,
    )?;
    result.info();

    if n_trials > 1 {
        println!(
            "AVERAGE SCORE (+/- 1 std. err.): {:.3} +/- {:.3}",
            result.average_score(),
            result.score_stderr()
        );
        println!("PERCENT PERFECT: {:.2}%", result.percent_perfect());
    } else {
        println!("SCORE: {}", result.scores.sum);
    }
    Ok(())
}
