use log::Level::Debug;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use crate::{
    Context, Event, FlowError, Network, NodeIndex, Port, Recorder, Scheduler, Telemetry, Timer,
    TimerId, Token, VirtualTime,
};

/// The [`Context`] handed to a single node for a single event.
struct Dispatch<'a> {
    now:       VirtualTime,
    node:      NodeIndex,
    name:      &'a str,
    outputs:   &'a [Port],
    scheduler: &'a mut Scheduler,
    recorder:  &'a mut Recorder,
    rng:       &'a mut ChaCha8Rng,
    error:     Option<FlowError>,
}

impl Context for Dispatch<'_> {
    fn now(&self) -> VirtualTime {
        self.now
    }

    fn forward(&mut self, output: usize, token: Token) {
        if let Some(port) = self.outputs.get(output) {
            self.scheduler.schedule_arrival(self.now, port.node, port.input, token);
        } else if self.error.is_none() {
            self.error = Some(FlowError::OutputOutOfRange { output, outputs: self.outputs.len() });
        }
    }

    fn schedule(&mut self, at: VirtualTime, timer: Timer) -> TimerId {
        self.scheduler.schedule_timer(at, self.node, timer)
    }

    fn cancel(&mut self, timer_id: TimerId) {
        self.scheduler.cancel(timer_id);
    }

    fn record(&mut self, series: &str, value: f64) {
        self.recorder.record(&format!("{}.{}", self.name, series), self.now, value);
    }

    fn rng(&mut self) -> &mut dyn RngCore {
        &mut *self.rng
    }
}

/// A reference discrete-event driver of a [`Network`].
///
/// Nodes are initialized at time zero, in declaration order.  Tokens
/// forwarded by a node are delivered as arrivals at the same instant,
/// after all events already due at that instant.
pub struct Runner {
    network:     Network,
    scheduler:   Scheduler,
    recorder:    Recorder,
    rng:         ChaCha8Rng,
    now:         VirtualTime,
    num_events:  u64,
    initialized: bool,
}

impl Runner {
    pub fn new(network: Network, seed: u64) -> Self {
        Runner {
            network,
            scheduler: Scheduler::new(),
            recorder: Recorder::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            now: VirtualTime::ZERO,
            num_events: 0,
            initialized: false,
        }
    }

    fn dispatch<F>(&mut self, index: NodeIndex, handler: F) -> Result<(), FlowError>
    where
        F: FnOnce(&mut crate::Node, &mut Dispatch) -> Result<(), FlowError>,
    {
        let entry = match self.network.entries_mut().get_mut(index) {
            Some(entry) => entry,
            None => unreachable!("Event for a node outside of the network"),
        };

        let mut ctx = Dispatch {
            now:       self.now,
            node:      index,
            name:      entry.name.as_str(),
            outputs:   entry.outputs.as_slice(),
            scheduler: &mut self.scheduler,
            recorder:  &mut self.recorder,
            rng:       &mut self.rng,
            error:     None,
        };

        let result = handler(&mut entry.node, &mut ctx).and_then(|_| match ctx.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        });

        result.map_err(|err| FlowError::InNode(entry.name.clone(), Box::new(err)))
    }

    fn initialize(&mut self) -> Result<(), FlowError> {
        if self.initialized {
            return Ok(())
        }
        self.initialized = true;

        info!(
            "Starting {} with {} node(s)",
            self.network.get_name().unwrap_or("network"),
            self.network.len()
        );

        for (index, input, token) in self.network.take_initial() {
            self.scheduler.schedule_arrival(self.now, index, input, token);
        }

        for index in 0..self.network.len() {
            self.dispatch(index, |node, ctx| node.on_init(ctx))?;
        }

        Ok(())
    }

    /// Delivers every event due at or before `horizon`.
    ///
    /// The first error raised by a node stops the run; the event that
    /// caused it is lost.
    pub fn go(&mut self, horizon: VirtualTime) -> Result<(), FlowError> {
        self.initialize()?;

        while let Some(time) = self.scheduler.peek_time() {
            if time > horizon {
                break
            }

            let (time, event) = match self.scheduler.pop_next() {
                Some(next) => next,
                None => break,
            };

            self.now = time;
            self.num_events += 1;

            match event {
                Event::Arrival { node, input, token } => {
                    if log_enabled!(Debug) {
                        debug!(
                            "{}: token {} arrives at {}[{}]",
                            self.now,
                            token.get_identifier(),
                            self.network.get_node_name(node).unwrap_or("?"),
                            input
                        );
                    }
                    self.dispatch(node, |n, ctx| n.on_arrival(ctx, input, token))?;
                }
                Event::Timer { node, timer, timer_id } => {
                    trace!("{}: {} timer of node {}", self.now, timer, node);
                    self.dispatch(node, |n, ctx| n.on_timer(ctx, timer, timer_id))?;
                }
            }
        }

        if self.now < horizon {
            self.now = horizon;
        }

        info!("Stop at {} after {} event(s)", self.now, self.num_events);

        Ok(())
    }

    /// Releases every timer owned by the nodes.
    pub fn teardown(&mut self) {
        for index in 0..self.network.len() {
            let result = self.dispatch(index, |node, ctx| {
                node.on_teardown(ctx);
                Ok(())
            });

            if let Err(err) = result {
                warn!("Teardown: {}", err);
            }
        }

        debug!("Teardown left {} pending event(s)", self.scheduler.len());
    }

    #[inline]
    pub fn now(&self) -> VirtualTime {
        self.now
    }

    #[inline]
    pub fn get_num_events(&self) -> u64 {
        self.num_events
    }

    #[inline]
    pub fn get_network(&self) -> &Network {
        &self.network
    }

    #[inline]
    pub fn get_recorder(&self) -> &Recorder {
        &self.recorder
    }

    #[inline]
    pub fn num_pending(&self) -> usize {
        self.scheduler.len()
    }
}
