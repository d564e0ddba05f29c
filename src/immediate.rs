use crate::{Context, Token, FlowError};

/// An immediate transition: rescales every arriving token and passes
/// it on, at the same instant, to its single output.
///
/// Only the first configured coefficient is used.  Arity of arcs isn't
/// checked here; that is the business of whoever wires the network.
#[derive(Clone, Debug)]
pub struct ImmediateTransform {
    coefficient: f64,
}

impl ImmediateTransform {
    pub fn new(coefficients: &[f64]) -> Result<Self, FlowError> {
        let coefficient = *coefficients.first().ok_or(FlowError::CoefficientsEmpty)?;

        Ok(ImmediateTransform { coefficient })
    }

    #[inline]
    pub fn get_coefficient(&self) -> f64 {
        self.coefficient
    }

    pub fn on_arrival<C: Context + ?Sized>(&self, ctx: &mut C, mut token: Token) -> Result<(), FlowError> {
        token.rescale(self.coefficient);

        trace!("Sending token {}", token);
        ctx.forward(0, token);

        Ok(())
    }
}
