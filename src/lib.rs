//! Stochastic timed token-flow networks.
//!
//! A network is a directed graph of nodes of three kinds, through
//! which _tokens_ (units of work carrying a size and a creation time)
//! flow.
//!
//! # Place
//!
//! A _place_ routes every arriving token to exactly one of its
//! outputs, drawing the output at random according to a fixed
//! probability vector.  A place without outputs is a _sink_: tokens
//! arriving there are recorded and dropped.
//!
//! # Transition
//!
//! A _transition_ keeps a FIFO queue per input.  Whenever it is idle
//! and every queue is non-empty, it starts a processing _episode_ of
//! a duration drawn from its [`Rate`].  At the end of an episode the
//! heads of all queues are merged into one token, whose size is the
//! sum of merged sizes, and the merged token is split among outputs
//! in proportion to the transition's coefficients.
//!
//! A transition without inputs is a _source_: it synthesizes a new
//! token after each delay drawn from its rate.
//!
//! # Immediate transform
//!
//! An _immediate transform_ rescales every arriving token by a
//! constant coefficient and forwards it at once.
//!
//! # Execution
//!
//! Nodes never block and never keep time themselves.  Every handler
//! is given a [`Context`], through which it forwards tokens, owns
//! timers, records measurements, and draws random numbers.  The
//! [`Runner`] is a reference discrete-event implementation of that
//! collaborator, driving a whole [`Network`] in virtual time and
//! collecting measurements in a [`Recorder`].

#[macro_use]
extern crate log;
#[macro_use]
extern crate lazy_static;

mod error;
mod time;
mod token;
mod selector;
mod rate;
mod telemetry;
mod node;
mod place;
mod transition;
mod immediate;
mod scheduler;
mod network;
mod runner;
mod yaml_script;
mod logging;
pub mod cli;

#[cfg(test)]
mod testing;

pub use error::FlowError;
pub use time::VirtualTime;
pub use token::Token;
pub use selector::{WeightedSelector, PROBABILITY_TOLERANCE};
pub use rate::Rate;
pub use telemetry::{Telemetry, Recorder, Summary};
pub use node::{Context, Timer, TimerId, Face, Node};
pub use place::Place;
pub use transition::{Transition, SAMPLING_PERIOD};
pub use immediate::ImmediateTransform;
pub use scheduler::{Scheduler, Event, EventKey, NodeIndex};
pub use network::{Network, Port};
pub use runner::Runner;
pub use logging::Logger;
