//! Utility scoring for combat decisions.
//!
//! Every option is scored the same way: a feasibility gate, a situational
//! fit, a disposition fit (how well the option matches the fighter's
//! configuration), and a contextual modifier. Integer math keeps the
//! evaluation deterministic.

use crate::world::RngOracle;

/// Scored desirability of one option.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Score {
    possible: bool,
    /// Situational favorability, 0-100.
    situation: u32,
    /// Disposition alignment, 0-100.
    disposition: u32,
    /// Contextual modifier, 0-200 (100 is neutral).
    modifier: u32,
}

impl Score {
    pub fn new(possible: bool, situation: u32, disposition: u32, modifier: u32) -> Self {
        Self {
            possible,
            situation: situation.min(100),
            disposition: disposition.min(100),
            modifier: modifier.min(200),
        }
    }

    /// An option that cannot be taken at all.
    pub fn impossible() -> Self {
        Self {
            possible: false,
            situation: 0,
            disposition: 0,
            modifier: 0,
        }
    }

    /// Combined value; 0 for impossible options.
    pub fn value(&self) -> u32 {
        if !self.possible {
            return 0;
        }
        (self.situation * self.disposition * self.modifier) / 10_000
    }
}

/// Pick the highest-valued option, breaking exact ties deterministically
/// through the rng oracle (first-wins when no oracle is supplied).
pub(crate) fn pick_best<T: Copy>(
    options: &[(T, Score)],
    rng: Option<&dyn RngOracle>,
    seed: u64,
) -> Option<T> {
    let best = options
        .iter()
        .map(|(_, score)| score.value())
        .max()
        .filter(|value| *value > 0)?;

    let tied: Vec<T> = options
        .iter()
        .filter(|(_, score)| score.value() == best)
        .map(|(option, _)| *option)
        .collect();

    match (tied.len(), rng) {
        (1, _) | (_, None) => tied.first().copied(),
        (count, Some(rng)) => {
            let index = rng.range(seed, 0, count as u32 - 1) as usize;
            tied.get(index).copied()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::PcgRng;

    #[test]
    fn impossible_options_never_win() {
        let options = [
            ('a', Score::impossible()),
            ('b', Score::new(true, 50, 50, 100)),
        ];
        assert_eq!(pick_best(&options, None, 0), Some('b'));
    }

    #[test]
    fn all_impossible_yields_none() {
        let options = [('a', Score::impossible()), ('b', Score::impossible())];
        assert_eq!(pick_best(&options, None, 0), None);
    }

    #[test]
    fn tie_break_is_deterministic_per_seed() {
        let rng = PcgRng;
        let options = [
            ('a', Score::new(true, 50, 50, 100)),
            ('b', Score::new(true, 50, 50, 100)),
        ];
        let first = pick_best(&options, Some(&rng), 7);
        assert_eq!(pick_best(&options, Some(&rng), 7), first);
    }

    #[test]
    fn value_scales_with_all_three_factors() {
        let base = Score::new(true, 100, 100, 100).value();
        assert_eq!(base, 100);
        assert!(Score::new(true, 50, 100, 100).value() < base);
        assert!(Score::new(true, 100, 100, 150).value() > base);
    }
}
