use std::fmt;
use rand::RngCore;
use crate::{Token, VirtualTime, FlowError, Place, Transition, ImmediateTransform};

/// Kinds of self-timers a node may own.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Timer {
    /// Next token synthesized by a source transition.
    Generation,
    /// End of the current processing episode of a transition.
    Completion,
    /// Next periodic measurement of input queue lengths.
    Sampling,
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Timer::Generation => write!(f, "generation"),
            Timer::Completion => write!(f, "completion"),
            Timer::Sampling => write!(f, "sampling"),
        }
    }
}

/// Side of a node an arc is attached to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Face {
    /// Output side (the arc leaves the node).
    Tx,
    /// Input side (the arc enters the node).
    Rx,
}

/// A handle of a scheduled timer, unique within one scheduler.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct TimerId(pub(crate) u64);

impl TimerId {
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Everything a node may ask of its surroundings while it handles an
/// event.
///
/// Handlers never block.  A delay is expressed by scheduling a timer
/// and returning; the collaborator invokes the node again, with the
/// same [`Timer`] kind and the returned [`TimerId`], once virtual time
/// reaches the requested instant.
pub trait Context {
    fn now(&self) -> VirtualTime;

    /// Hands `token` over to the arc attached to `output`.  Delivery
    /// happens at the current instant.
    fn forward(&mut self, output: usize, token: Token);

    fn schedule(&mut self, at: VirtualTime, timer: Timer) -> TimerId;

    fn cancel(&mut self, timer_id: TimerId);

    fn record(&mut self, series: &str, value: f64);

    /// The injectable random source shared by routing draws and rate
    /// sampling.
    fn rng(&mut self) -> &mut dyn RngCore;
}

pub(crate) const TOKEN_IN_SIZE: &str = "token_in_size";
pub(crate) const TOKEN_IN_DELAY: &str = "token_in_delay";
pub(crate) const PROCESSING_DELAY: &str = "processing_delay";

pub(crate) fn queue_length_series(input: usize) -> String {
    format!("queue_length{}", input)
}

/// Records size and age of an arriving token.
pub(crate) fn record_arrival<C: Context + ?Sized>(ctx: &mut C, token: &Token) {
    let delay = ctx.now().duration_since(token.get_creation_time());

    ctx.record(TOKEN_IN_SIZE, token.get_size());
    ctx.record(TOKEN_IN_DELAY, delay);
}

/// A node of a token-flow network.
///
/// The set of node kinds is closed; every kind handles arrivals and
/// its own timers under the same contract.
#[derive(Debug)]
pub enum Node {
    Place(Place),
    Transition(Transition),
    Immediate(ImmediateTransform),
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Place(_) => "place",
            Node::Transition(_) => "transition",
            Node::Immediate(_) => "immediate",
        }
    }

    pub fn num_inputs(&self) -> Option<usize> {
        match self {
            Node::Transition(t) => Some(t.num_inputs()),
            _ => None,
        }
    }

    pub fn num_outputs(&self) -> usize {
        match self {
            Node::Place(p) => p.num_outputs(),
            Node::Transition(t) => t.num_outputs(),
            Node::Immediate(_) => 1,
        }
    }

    pub fn on_init<C: Context + ?Sized>(&mut self, ctx: &mut C) -> Result<(), FlowError> {
        match self {
            Node::Transition(t) => t.on_init(ctx),
            _ => Ok(()),
        }
    }

    pub fn on_arrival<C: Context + ?Sized>(
        &mut self,
        ctx: &mut C,
        input: usize,
        token: Token,
    ) -> Result<(), FlowError> {
        match self {
            Node::Place(p) => p.on_arrival(ctx, token),
            Node::Transition(t) => t.on_arrival(ctx, input, token),
            Node::Immediate(i) => i.on_arrival(ctx, token),
        }
    }

    pub fn on_timer<C: Context + ?Sized>(
        &mut self,
        ctx: &mut C,
        timer: Timer,
        timer_id: TimerId,
    ) -> Result<(), FlowError> {
        match self {
            Node::Transition(t) => t.on_timer(ctx, timer, timer_id),
            _ => Err(FlowError::UnexpectedTimer),
        }
    }

    pub fn on_teardown<C: Context + ?Sized>(&mut self, ctx: &mut C) {
        if let Node::Transition(t) = self {
            t.on_teardown(ctx)
        }
    }
}

impl From<Place> for Node {
    fn from(place: Place) -> Self {
        Node::Place(place)
    }
}

impl From<Transition> for Node {
    fn from(transition: Transition) -> Self {
        Node::Transition(transition)
    }
}

impl From<ImmediateTransform> for Node {
    fn from(immediate: ImmediateTransform) -> Self {
        Node::Immediate(immediate)
    }
}
