use std::{fmt, str::FromStr};
use regex::Regex;
use rand::{Rng, RngCore};
use crate::FlowError;

/// The delay source of a timed transition.
///
/// A rate is never cached by its owner: every scheduling decision
/// calls [`sample()`] again, so that a random rate yields a fresh
/// delay for each generated token and each processing episode.
///
/// [`sample()`]: Rate::sample
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Rate {
    Fixed(f64),
    Exponential { mean: f64 },
    Uniform { low: f64, high: f64 },
}

impl Rate {
    pub fn fixed(delay: f64) -> Result<Self, FlowError> {
        Rate::Fixed(delay).validated()
    }

    pub fn exponential(mean: f64) -> Result<Self, FlowError> {
        Rate::Exponential { mean }.validated()
    }

    pub fn uniform(low: f64, high: f64) -> Result<Self, FlowError> {
        Rate::Uniform { low, high }.validated()
    }

    pub(crate) fn validated(self) -> Result<Self, FlowError> {
        let is_valid = match self {
            Rate::Fixed(delay) => delay.is_finite() && delay > 0.0,
            Rate::Exponential { mean } => mean.is_finite() && mean > 0.0,
            Rate::Uniform { low, high } => {
                low.is_finite() && high.is_finite() && low >= 0.0 && low < high
            }
        };

        if is_valid {
            Ok(self)
        } else {
            Err(FlowError::RateInvalid(self.to_string()))
        }
    }

    /// Draws the next delay.
    pub fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        match *self {
            Rate::Fixed(delay) => delay,
            Rate::Exponential { mean } => {
                let u: f64 = rng.gen();
                -mean * (1.0 - u).ln()
            }
            Rate::Uniform { low, high } => rng.gen_range(low..high),
        }
    }

    /// Expected value of [`sample()`](Rate::sample).
    pub fn mean(&self) -> f64 {
        match *self {
            Rate::Fixed(delay) => delay,
            Rate::Exponential { mean } => mean,
            Rate::Uniform { low, high } => (low + high) / 2.0,
        }
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rate::Fixed(delay) => write!(f, "{}", delay),
            Rate::Exponential { mean } => write!(f, "EXP({})", mean),
            Rate::Uniform { low, high } => write!(f, "UNI({}, {})", low, high),
        }
    }
}

/// Parses timing in TimeNet notation: a plain delay (`"2.5"`), an
/// exponential distribution given by its mean (`"EXP(1.5)"`), or a
/// uniform one given by its bounds (`"UNI(1, 3)"`).
impl FromStr for Rate {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lazy_static! {
            static ref EXP_RE: Regex = Regex::new(r"^EXP\(\s*([^,()\s]+)\s*\)$").unwrap();
            static ref UNI_RE: Regex =
                Regex::new(r"^UNI\(\s*([^,()\s]+)\s*,\s*([^,()\s]+)\s*\)$").unwrap();
        }

        let s = s.trim();
        let unknown = || FlowError::TimingUnknown(s.to_owned());
        let number = |v: &str| v.parse::<f64>().map_err(|_| unknown());

        if let Some(cap) = EXP_RE.captures(s) {
            Rate::exponential(number(&cap[1])?)
        } else if let Some(cap) = UNI_RE.captures(s) {
            Rate::uniform(number(&cap[1])?, number(&cap[2])?)
        } else if s.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            Rate::fixed(number(s)?)
        } else {
            Err(unknown())
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("2.5".parse::<Rate>(), Ok(Rate::Fixed(2.5)));
        assert_eq!("EXP(1.5)".parse::<Rate>(), Ok(Rate::Exponential { mean: 1.5 }));
        assert_eq!(" UNI(1, 3) ".parse::<Rate>(), Ok(Rate::Uniform { low: 1.0, high: 3.0 }));
    }

    #[test]
    fn test_parse_unknown() {
        assert!(matches!("NORM(1, 2)".parse::<Rate>(), Err(FlowError::TimingUnknown(_))));
        assert!(matches!("EXP(x)".parse::<Rate>(), Err(FlowError::TimingUnknown(_))));
        assert!(matches!("".parse::<Rate>(), Err(FlowError::TimingUnknown(_))));
    }

    #[test]
    fn test_invalid() {
        assert!(matches!("0".parse::<Rate>(), Err(FlowError::RateInvalid(_))));
        assert!(matches!(Rate::exponential(-1.0), Err(FlowError::RateInvalid(_))));
        assert!(matches!(Rate::uniform(3.0, 1.0), Err(FlowError::RateInvalid(_))));
    }

    #[test]
    fn test_display_round_trip() {
        let rate = Rate::uniform(0.5, 2.0).unwrap();
        assert_eq!(rate.to_string().parse::<Rate>(), Ok(rate));
    }

    #[test]
    fn test_sample_is_fresh() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let rate = Rate::exponential(2.0).unwrap();
        let first = rate.sample(&mut rng);
        let second = rate.sample(&mut rng);
        assert!(first > 0.0 && second > 0.0);
        assert_ne!(first, second);
    }

    #[test]
    fn test_sample_means() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let num_draws = 20_000;

        for rate in &[Rate::Exponential { mean: 2.0 }, Rate::Uniform { low: 1.0, high: 3.0 }] {
            let total: f64 = (0..num_draws).map(|_| rate.sample(&mut rng)).sum();
            let mean = total / num_draws as f64;
            assert!((mean - rate.mean()).abs() < 0.1, "{}: mean {}", rate, mean);
        }

        assert_eq!(Rate::Fixed(4.0).sample(&mut rng), 4.0);
    }
}
