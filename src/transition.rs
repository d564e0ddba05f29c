use std::collections::VecDeque;
use crate::{Context, Token, Timer, TimerId, VirtualTime, Rate, FlowError, node};

/// Time between two consecutive measurements of queue lengths.
pub const SAMPLING_PERIOD: f64 = 1.0;

/// A timed transition synchronizing all of its inputs.
///
/// # Processing
///
/// Every input arc has its own FIFO queue.  As soon as all queues are
/// non-empty and no episode is in progress, the transition starts a
/// processing episode of duration `rate()`.  When the episode
/// completes, the front token of every queue is popped and the popped
/// tokens are merged: sizes are added, identifiers concatenated in
/// input order, and the earliest creation time is kept.  The merged
/// token is then split into one token per output, each scaled by that
/// output's coefficient.
///
/// # Generation
///
/// A transition with no inputs and at least one output is a source.
/// It emits a new token of size `coefficient[0]` every `rate()` time
/// units, always on output 0, even if more outputs are attached.
///
/// # Sampling
///
/// Independently of the above, lengths of all input queues are
/// recorded every [`SAMPLING_PERIOD`] time units, starting at
/// initialization.
#[derive(Debug)]
pub struct Transition {
    coefficients:     Vec<f64>,
    rate:             Rate,
    queues:           Vec<VecDeque<Token>>,
    processing:       bool,
    counter:          u64,
    generation_timer: Option<TimerId>,
    completion_timer: Option<TimerId>,
    sampling_timer:   Option<TimerId>,
}

impl Transition {
    /// Creates a transition with `num_inputs` inbound arcs and one
    /// coefficient per outbound arc.
    pub fn new(
        coefficients: Vec<f64>,
        num_inputs: usize,
        num_outputs: usize,
        rate: Rate,
    ) -> Result<Self, FlowError> {
        if coefficients.len() != num_outputs {
            return Err(FlowError::CoefficientsLength {
                expected: num_outputs,
                found:    coefficients.len(),
            })
        }

        // Variants of `Rate` are public, hence may bypass validation.
        let rate = rate.validated()?;

        if num_inputs == 0 && num_outputs > 1 {
            warn!(
                "Source transition with {} outputs will generate tokens on output 0 only",
                num_outputs
            );
        }

        Ok(Transition {
            coefficients,
            rate,
            queues: (0..num_inputs).map(|_| VecDeque::new()).collect(),
            processing: false,
            counter: 0,
            generation_timer: None,
            completion_timer: None,
            sampling_timer: None,
        })
    }

    #[inline]
    pub fn num_inputs(&self) -> usize {
        self.queues.len()
    }

    #[inline]
    pub fn num_outputs(&self) -> usize {
        self.coefficients.len()
    }

    #[inline]
    pub fn is_source(&self) -> bool {
        self.queues.is_empty() && !self.coefficients.is_empty()
    }

    #[inline]
    pub fn is_processing(&self) -> bool {
        self.processing
    }

    #[inline]
    pub fn get_rate(&self) -> Rate {
        self.rate
    }

    pub fn queue_length(&self, input: usize) -> Option<usize> {
        self.queues.get(input).map(|q| q.len())
    }

    pub fn on_init<C: Context + ?Sized>(&mut self, ctx: &mut C) -> Result<(), FlowError> {
        if self.is_source() {
            self.schedule_generation(ctx);
        }

        let now = ctx.now();
        self.sampling_timer = Some(ctx.schedule(now, Timer::Sampling));

        Ok(())
    }

    pub fn on_arrival<C: Context + ?Sized>(
        &mut self,
        ctx: &mut C,
        input: usize,
        token: Token,
    ) -> Result<(), FlowError> {
        let num_inputs = self.num_inputs();
        let queue = self
            .queues
            .get_mut(input)
            .ok_or(FlowError::InputOutOfRange { input, inputs: num_inputs })?;

        node::record_arrival(ctx, &token);

        trace!("Queuing token {} on input {}", token.get_identifier(), input);
        queue.push_back(token);

        self.try_start(ctx)
    }

    pub fn on_timer<C: Context + ?Sized>(
        &mut self,
        ctx: &mut C,
        timer: Timer,
        timer_id: TimerId,
    ) -> Result<(), FlowError> {
        let slot = match timer {
            Timer::Generation => &mut self.generation_timer,
            Timer::Completion => &mut self.completion_timer,
            Timer::Sampling => &mut self.sampling_timer,
        };

        if *slot != Some(timer_id) {
            return Err(FlowError::UnexpectedTimer)
        }
        *slot = None;

        match timer {
            Timer::Generation => self.generate(ctx),
            Timer::Completion => self.complete(ctx),
            Timer::Sampling => {
                self.sample_queues(ctx);
                Ok(())
            }
        }
    }

    /// Cancels every timer owned by this transition.
    pub fn on_teardown<C: Context + ?Sized>(&mut self, ctx: &mut C) {
        let mut slots = [&mut self.generation_timer, &mut self.completion_timer, &mut self.sampling_timer];

        for slot in slots.iter_mut() {
            if let Some(timer_id) = slot.take() {
                ctx.cancel(timer_id);
            }
        }
    }

    fn schedule_generation<C: Context + ?Sized>(&mut self, ctx: &mut C) {
        let delay = self.rate.sample(ctx.rng());
        let at = ctx.now() + delay;

        ctx.record(node::PROCESSING_DELAY, delay);
        self.generation_timer = Some(ctx.schedule(at, Timer::Generation));
    }

    fn generate<C: Context + ?Sized>(&mut self, ctx: &mut C) -> Result<(), FlowError> {
        let token = Token::new(self.counter.to_string(), self.coefficients[0], ctx.now());

        self.counter += 1;

        debug!("Sending out new token {}", token);
        ctx.forward(0, token);

        self.schedule_generation(ctx);

        Ok(())
    }

    /// Starts a processing episode if idle and every input queue holds
    /// a token.
    fn try_start<C: Context + ?Sized>(&mut self, ctx: &mut C) -> Result<(), FlowError> {
        if self.processing || self.queues.iter().any(|q| q.is_empty()) {
            return Ok(())
        }

        if self.completion_timer.is_some() {
            return Err(FlowError::CompletionPending)
        }

        let delay = self.rate.sample(ctx.rng());
        let at = ctx.now() + delay;

        debug!("Processing synchronized tokens for {}", delay);
        ctx.record(node::PROCESSING_DELAY, delay);

        self.processing = true;
        self.completion_timer = Some(ctx.schedule(at, Timer::Completion));

        Ok(())
    }

    fn complete<C: Context + ?Sized>(&mut self, ctx: &mut C) -> Result<(), FlowError> {
        if !self.processing {
            return Err(FlowError::UnexpectedTimer)
        }

        if let Some(input) = self.queues.iter().position(|q| q.is_empty()) {
            return Err(FlowError::QueueEmpty(input))
        }

        self.processing = false;

        let mut sum_size = 0.0;
        let mut merged_identifier = String::new();
        let mut min_creation_time: VirtualTime = ctx.now();

        for (input, queue) in self.queues.iter_mut().enumerate() {
            let (identifier, size, creation_time) =
                queue.pop_front().ok_or(FlowError::QueueEmpty(input))?.into_parts();

            sum_size += size;
            merged_identifier.push_str(&identifier);
            min_creation_time = min_creation_time.min(creation_time);
        }

        let num_outputs = self.coefficients.len();

        for (output, coefficient) in self.coefficients.iter().enumerate() {
            let identifier = if num_outputs > 1 {
                format!("{}.{}", merged_identifier, output)
            } else {
                merged_identifier.clone()
            };
            let token = Token::new(identifier, sum_size * coefficient, min_creation_time);

            debug!("Processing done, sending out token {} on output {}", token, output);
            ctx.forward(output, token);
        }

        self.try_start(ctx)
    }

    fn sample_queues<C: Context + ?Sized>(&mut self, ctx: &mut C) {
        for (input, queue) in self.queues.iter().enumerate() {
            ctx.record(&node::queue_length_series(input), queue.len() as f64);
        }

        let at = ctx.now() + SAMPLING_PERIOD;
        self.sampling_timer = Some(ctx.schedule(at, Timer::Sampling));
    }
}
