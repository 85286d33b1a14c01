use fnv::FnvHashMap;
use rand::RngCore;
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::ops::Range;
use tracing::info;

use crate::error::Result;
use crate::game::*;
use crate::json_output::json_format;
use crate::replay::write_replay;
use crate::round::{Round, RoundState};
use crate::strategies::Registry;

/// Where to write per-round logs. `%s` in a pattern is replaced by the seed.
#[derive(Debug, Clone, Default)]
pub struct OutputPatterns {
    pub json: Option<String>,
    pub replay: Option<String>,
    pub losses_only: bool,
}

fn output_path(pattern: &str, seed: u64) -> String {
    pattern.replace("%s", &seed.to_string())
}

pub fn simulate_once(
    opts: &GameOptions,
    registry: &Registry,
    tags: &[String],
    deck: Option<Cards>,
    seed: u64,
) -> Result<Round> {
    let roster = registry.roster(opts, tags, seed)?;
    let mut round = Round::new(opts.clone(), roster, deck, Some(seed))?;
    round.play()?;
    Ok(round)
}

fn write_outputs(round: &Round, seed: u64, outputs: &OutputPatterns) -> Result<()> {
    if outputs.losses_only && round.state() == RoundState::WonPerfect {
        return Ok(());
    }
    if let Some(ref pattern) = outputs.json {
        let file = File::create(output_path(pattern, seed))?;
        serde_json::to_writer(BufWriter::new(file), &json_format(round))
            .map_err(std::io::Error::from)?;
    }
    if let Some(ref pattern) = outputs.replay {
        let file = File::create(output_path(pattern, seed))?;
        write_replay(&mut BufWriter::new(file), round)?;
    }
    Ok(())
}

#[derive(Debug)]
pub struct Histogram {
    pub hist: FnvHashMap<Score, u32>,
    pub sum: Score,
    pub total_count: u32,
}
impl Histogram {
    pub fn new() -> Histogram {
        Histogram {
            hist: FnvHashMap::default(),
            sum: 0,
            total_count: 0,
        }
    }
    fn insert_many(&mut self, val: Score, count: u32) {
        let new_count = self.get_count(&val) + count;
        self.hist.insert(val, new_count);
        self.sum += val * count;
        self.total_count += count;
    }
    pub fn insert(&mut self, val: Score) {
        self.insert_many(val, 1);
    }
    pub fn get_count(&self, val: &Score) -> u32 {
        *self.hist.get(val).unwrap_or(&0)
    }
    pub fn percentage_with(&self, val: &Score) -> f32 {
        if self.total_count == 0 {
            return 0.0;
        }
        self.get_count(val) as f32 / self.total_count as f32
    }
    pub fn average(&self) -> f32 {
        if self.total_count == 0 {
            return 0.0;
        }
        (self.sum as f32) / (self.total_count as f32)
    }
    pub fn stdev_of_average(&self) -> f32 {
        if self.total_count < 2 {
            return 0.0;
        }
        let average = self.average();
        let mut var_sum = 0.0;
        for (&val, &count) in self.hist.iter() {
            var_sum += (val as f32 - average).powi(2) * count as f32;
        }
        // Divide by (self.total_count - 1) estimate the variance of the distribution,
        // then divide by self.total_count estimate the variance of the sample average,
        // then take the sqrt to get the stdev.
        (var_sum / (((self.total_count - 1) * self.total_count) as f32)).sqrt()
    }
    pub fn merge(&mut self, other: Histogram) {
        for (val, count) in other.hist.into_iter() {
            self.insert_many(val, count);
        }
    }
}
impl Default for Histogram {
    fn default() -> Histogram {
        Histogram::new()
    }
}
impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut keys = self.hist.keys().collect::<Vec<_>>();
        keys.sort();
        for val in keys {
            write!(f, "\n{}: {}", val, self.get_count(val))?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ThreadResult {
    non_perfect_seeds: Vec<u64>,
    scores: Histogram,
    fuses: Histogram,
    states: FnvHashMap<RoundState, u32>,
}

// offsets from the first seed handled by thread `i`; seeds wrap past u64::MAX
fn thread_offsets(n_trials: u32, n_threads: u32, i: u32) -> Range<u64> {
    let n_trials = u64::from(n_trials);
    let n_threads = u64::from(n_threads);
    let i = u64::from(i);
    (n_trials * i / n_threads)..(n_trials * (i + 1) / n_threads)
}

#[allow(clippy::too_many_arguments)]
pub fn simulate(
    opts: &GameOptions,
    registry: &Registry,
    tags: &[String],
    deck: Option<&Cards>,
    first_seed_opt: Option<u64>,
    n_trials: u32,
    n_threads: u32,
    outputs: &OutputPatterns,
) -> Result<SimResult> {
    let first_seed = first_seed_opt.unwrap_or_else(|| rand::thread_rng().next_u64());
    let n_threads = n_threads.max(1);
    let perfect_score = opts.game_type.perfect_score();

    crossbeam::scope(|scope| {
        let mut join_handles = Vec::new();
        for i in 0..n_threads {
            let offsets = thread_offsets(n_trials, n_threads, i);
            join_handles.push(scope.spawn(move || -> Result<ThreadResult> {
                info!("Thread {} spawned: {} rounds", i, offsets.end - offsets.start);
                let mut result = ThreadResult::default();

                for offset in offsets {
                    let seed = first_seed.wrapping_add(offset);
                    let round = simulate_once(opts, registry, tags, deck.cloned(), seed)?;
                    let outcome = round.outcome();
                    info!(
                        "Seed {}: {} with score {} after {} turns ({} actions)",
                        seed,
                        outcome.state,
                        outcome.score,
                        outcome.turns,
                        outcome.history.len()
                    );
                    result.scores.insert(outcome.score);
                    result.fuses.insert(outcome.fuses_remaining);
                    *result.states.entry(outcome.state).or_insert(0) += 1;
                    if outcome.score != perfect_score {
                        result.non_perfect_seeds.push(seed);
                    }
                    write_outputs(&round, seed, outputs)?;
                }
                info!("Thread {} done", i);
                Ok(result)
            }));
        }

        let mut non_perfect_seeds: Vec<u64> = Vec::new();
        let mut score_histogram = Histogram::new();
        let mut fuses_histogram = Histogram::new();
        let mut states: FnvHashMap<RoundState, u32> = FnvHashMap::default();
        for join_handle in join_handles {
            let thread_result = join_handle.join()?;
            non_perfect_seeds.extend(thread_result.non_perfect_seeds.iter());
            score_histogram.merge(thread_result.scores);
            fuses_histogram.merge(thread_result.fuses);
            for (state, count) in thread_result.states {
                *states.entry(state).or_insert(0) += count;
            }
        }

        non_perfect_seeds.sort_unstable();
        Ok(SimResult {
            perfect_score,
            scores: score_histogram,
            fuses: fuses_histogram,
            states,
            non_perfect_seed: non_perfect_seeds.first().cloned(),
        })
    })
}

pub struct SimResult {
    pub perfect_score: Score,
    pub scores: Histogram,
    pub fuses: Histogram,
    pub states: FnvHashMap<RoundState, u32>,
    pub non_perfect_seed: Option<u64>,
}

impl SimResult {
    pub fn percent_perfect(&self) -> f32 {
        self.scores.percentage_with(&self.perfect_score) * 100.0
    }

    pub fn average_score(&self) -> f32 {
        self.scores.average()
    }

    pub fn score_stderr(&self) -> f32 {
        self.scores.stdev_of_average()
    }

    pub fn average_fuses(&self) -> f32 {
        self.fuses.average()
    }

    pub fn rounds_ending(&self, state: RoundState) -> u32 {
        self.states.get(&state).copied().unwrap_or(0)
    }

    pub fn info(&self) {
        info!("Score histogram:\n{}", self.scores);

        if let Some(seed) = self.non_perfect_seed {
            info!("Example seed with non-perfect score: {}", seed);
        }

        for state in [
            RoundState::WonPerfect,
            RoundState::LossByFuse,
            RoundState::EndedByTimer,
        ] {
            info!("Rounds {}: {}", state, self.rounds_ending(state));
        }
        info!("Percentage perfect: {:?}%", self.percent_perfect());
        info!("Average score: {:?}", self.average_score());
        info!("Average fuses: {:?}", self.average_fuses());
    }
}
