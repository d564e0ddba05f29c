use rand::Rng;
use crate::{Context, Token, FlowError, WeightedSelector, node};

/// A router: forwards every arriving token, unmodified, on one output
/// chosen at random.
///
/// A place without outputs is a terminal sink.  Places keep no state
/// between arrivals.
#[derive(Clone, Debug)]
pub struct Place {
    selector: Option<WeightedSelector>,
}

impl Place {
    /// Creates a place with `num_outputs` outbound arcs, selected with
    /// the given `probabilities`.
    ///
    /// The vector must be empty if there are no outputs.  Otherwise its
    /// length has to match `num_outputs` and it has to sum up to 1.
    pub fn new(probabilities: Vec<f64>, num_outputs: usize) -> Result<Self, FlowError> {
        if probabilities.len() != num_outputs {
            return Err(FlowError::ProbabilitiesLength {
                expected: num_outputs,
                found:    probabilities.len(),
            })
        }

        if num_outputs == 0 {
            Ok(Place { selector: None })
        } else {
            Ok(Place { selector: Some(WeightedSelector::new(probabilities)?) })
        }
    }

    /// Creates a place from a prepared selector.
    pub fn with_selector(selector: WeightedSelector) -> Self {
        Place { selector: Some(selector) }
    }

    /// Creates a terminal sink.
    pub fn sink() -> Self {
        Place { selector: None }
    }

    pub fn num_outputs(&self) -> usize {
        self.selector.as_ref().map_or(0, |sel| sel.len())
    }

    pub fn get_selector(&self) -> Option<&WeightedSelector> {
        self.selector.as_ref()
    }

    pub fn on_arrival<C: Context + ?Sized>(&self, ctx: &mut C, token: Token) -> Result<(), FlowError> {
        node::record_arrival(ctx, &token);

        if let Some(ref selector) = self.selector {
            let r: f64 = ctx.rng().gen();
            let output = selector.select(r);

            trace!("Sending token {} on output {}", token.get_identifier(), output);
            ctx.forward(output, token);
        } else {
            trace!("Token {} consumed", token.get_identifier());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{VirtualTime, testing::MockContext};
    use super::*;

    fn token(name: &str, size: f64, born: f64) -> Token {
        Token::new(name, size, MockContext::at(born))
    }

    #[test]
    fn test_length_mismatch() {
        assert_eq!(
            Place::new(vec![0.5, 0.5], 3).unwrap_err(),
            FlowError::ProbabilitiesLength { expected: 3, found: 2 }
        );
        assert!(Place::new(vec![1.0], 0).is_err());
        assert!(matches!(Place::new(vec![0.2, 0.2], 2), Err(FlowError::ProbabilitiesSum(_))));
    }

    #[test]
    fn test_forward_unmodified() {
        let place = Place::new(vec![0.3, 0.7], 2).unwrap();
        let mut ctx = MockContext::new();
        ctx.now = MockContext::at(4.0);

        for i in 0..100 {
            let name = format!("{}", i);
            place.on_arrival(&mut ctx, token(&name, 2.5, 1.0)).unwrap();

            let (output, out) = ctx.forwarded.pop().unwrap();
            assert!(output < 2);
            assert_eq!(out.get_identifier(), name);
            assert_eq!(out.get_size(), 2.5);
            assert_eq!(out.get_creation_time(), MockContext::at(1.0));
        }

        assert!(ctx.pending.is_empty());
        assert_eq!(ctx.values("token_in_size").len(), 100);
        assert!(ctx.values("token_in_delay").iter().all(|&d| d == 3.0));
    }

    #[test]
    fn test_both_outputs_used() {
        let place = Place::new(vec![0.5, 0.5], 2).unwrap();
        let mut ctx = MockContext::new();

        for _ in 0..200 {
            place.on_arrival(&mut ctx, token("x", 1.0, 0.0)).unwrap();
        }

        let zeros = ctx.forwarded.iter().filter(|(o, _)| *o == 0).count();
        assert!(zeros > 50 && zeros < 150, "{} of 200 on output 0", zeros);
    }

    #[test]
    fn test_sink() {
        let place = Place::new(vec![], 0).unwrap();
        let mut ctx = MockContext::new();
        ctx.now = VirtualTime::ZERO + 2.0;

        place.on_arrival(&mut ctx, token("a", 3.0, 0.5)).unwrap();
        place.on_arrival(&mut ctx, token("b", 4.0, 1.0)).unwrap();

        assert!(ctx.forwarded.is_empty());
        assert_eq!(ctx.values("token_in_size"), vec![3.0, 4.0]);
        assert_eq!(ctx.values("token_in_delay"), vec![1.5, 1.0]);
    }
}
