use std::fmt;

use crate::error::IllegalMove;

/// Hint and fuse counters. Hints are clamped to the cap; fuses only go down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens {
    pub hints_total: u32,
    pub hints_remaining: u32,
    pub fuses_total: u32,
    pub fuses_remaining: u32,
}

impl Tokens {
    pub fn new(num_hints: u32, num_fuses: u32) -> Tokens {
        Tokens {
            hints_total: num_hints,
            hints_remaining: num_hints,
            fuses_total: num_fuses,
            fuses_remaining: num_fuses,
        }
    }

    pub fn hints_capped(&self) -> bool {
        self.hints_remaining >= self.hints_total
    }

    pub fn award_hint(&mut self) {
        self.hints_remaining = self.hints_total.min(self.hints_remaining + 1);
    }

    pub fn spend_hint(&mut self) -> Result<(), IllegalMove> {
        if self.hints_remaining == 0 {
            return Err(IllegalMove::NoHintsRemaining);
        }
        self.hints_remaining -= 1;
        Ok(())
    }

    // returns whether the fuses are now exhausted
    pub fn lose_fuse(&mut self) -> bool {
        self.fuses_remaining = self.fuses_remaining.saturating_sub(1);
        self.fuses_exhausted()
    }

    pub fn fuses_exhausted(&self) -> bool {
        self.fuses_remaining == 0
    }
}

impl fmt::Display for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}/{} hints remaining", self.hints_remaining, self.hints_total)?;
        writeln!(f, "{}/{} fuses remaining", self.fuses_remaining, self.fuses_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn award_is_clamped_at_cap() {
        let mut tokens = Tokens::new(8, 3);
        tokens.award_hint();
        assert_eq!(tokens.hints_remaining, 8);
        tokens.spend_hint().unwrap();
        tokens.award_hint();
        tokens.award_hint();
        assert_eq!(tokens.hints_remaining, 8);
        assert!(tokens.hints_capped());
    }

    #[test]
    fn spending_without_hints_is_illegal() {
        let mut tokens = Tokens::new(1, 3);
        assert_eq!(tokens.spend_hint(), Ok(()));
        assert_eq!(tokens.spend_hint(), Err(IllegalMove::NoHintsRemaining));
        assert_eq!(tokens.hints_remaining, 0);
    }

    #[test]
    fn losing_the_last_fuse_reports_exhaustion() {
        let mut tokens = Tokens::new(8, 2);
        assert!(!tokens.lose_fuse());
        assert!(tokens.lose_fuse());
        assert!(tokens.lose_fuse());
        assert_eq!(tokens.fuses_remaining, 0);
    }
}
