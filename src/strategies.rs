use fnv::FnvHashMap;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaChaRng;

use crate::error::ConfigError;
use crate::game::GameOptions;
use crate::round::Participant;
use crate::strategy::{Seat, StrategyConstructor};

pub mod basic;
pub mod cheating;
pub mod examples;

/// Maps a strategy tag (as given on the command line) to the constructor
/// for a fresh seat.
#[derive(Clone)]
pub struct Registry {
    constructors: FnvHashMap<&'static str, StrategyConstructor>,
}

impl Registry {
    pub fn empty() -> Registry {
        Registry {
            constructors: FnvHashMap::default(),
        }
    }

    pub fn with_builtins() -> Registry {
        let mut registry = Registry::empty();
        registry.register("cheater", cheating::seat);
        registry.register("basic", basic::basic_seat);
        registry.register("brainbow", basic::brainbow_seat);
        registry.register("random", examples::seat);
        registry
    }

    pub fn register(&mut self, tag: &'static str, constructor: StrategyConstructor) {
        self.constructors.insert(tag, constructor);
    }

    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags = self.constructors.keys().copied().collect::<Vec<_>>();
        tags.sort_unstable();
        tags
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    pub fn build(&self, tag: &str, opts: &GameOptions, seed: u64) -> Result<Seat, ConfigError> {
        let constructor = self
            .constructors
            .get(tag)
            .ok_or_else(|| ConfigError::UnknownStrategy(tag.to_string()))?;
        Ok(constructor(opts, seed))
    }

    /// Seats a fresh instance of each tagged strategy, in order. Each seat
    /// gets its own seed derived from `seed`.
    pub fn roster(
        &self,
        opts: &GameOptions,
        tags: &[String],
        seed: u64,
    ) -> Result<Vec<Participant>, ConfigError> {
        let mut rng = ChaChaRng::seed_from_u64(seed);
        display_names(tags)
            .into_iter()
            .zip(tags)
            .map(|(name, tag)| -> Result<Participant, ConfigError> {
                Ok(Participant {
                    kind: tag.clone(),
                    name,
                    seat: self.build(tag, opts, rng.next_u64())?,
                })
            })
            .collect()
    }
}

// "basic" becomes "Basic"; repeated tags are numbered "Basic1", "Basic2"
pub fn display_names(tags: &[String]) -> Vec<String> {
    let capitalized = tags
        .iter()
        .map(|tag| {
            let mut chars = tag.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>();

    let mut seen: FnvHashMap<&str, u32> = FnvHashMap::default();
    capitalized
        .iter()
        .map(|name| {
            let total = capitalized.iter().filter(|other| *other == name).count();
            if total > 1 {
                let counter = seen.entry(name.as_str()).or_insert(0);
                *counter += 1;
                format!("{}{}", name, counter)
            } else {
                name.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameType;

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn duplicate_names_are_numbered() {
        assert_eq!(
            display_names(&tags(&["basic", "cheater", "basic"])),
            vec!["Basic1", "Cheater", "Basic2"]
        );
    }

    #[test]
    fn builtins_are_registered() {
        let registry = Registry::with_builtins();
        assert_eq!(registry.tags(), vec!["basic", "brainbow", "cheater", "random"]);
        let opts = GameOptions::standard(GameType::Vanilla, 2).unwrap();
        assert!(registry.build("cheater", &opts, 0).unwrap().is_cheating());
        assert!(!registry.build("basic", &opts, 0).unwrap().is_cheating());
        assert!(matches!(
            registry.build("yourDumbName", &opts, 0),
            Err(ConfigError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn roster_keeps_order_and_tags() {
        let registry = Registry::with_builtins();
        let opts = GameOptions::standard(GameType::Rainbow, 3).unwrap();
        let roster = registry
            .roster(&opts, &tags(&["brainbow", "random", "brainbow"]), 7)
            .unwrap();
        let kinds = roster.iter().map(|p| p.kind.as_str()).collect::<Vec<_>>();
        let names = roster.iter().map(|p| p.name.as_str()).collect::<Vec<_>>();
        assert_eq!(kinds, vec!["brainbow", "random", "brainbow"]);
        assert_eq!(names, vec!["Brainbow1", "Random", "Brainbow2"]);
    }
}
