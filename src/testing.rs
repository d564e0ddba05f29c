use std::collections::BTreeMap;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use crate::{Context, Timer, TimerId, Token, VirtualTime};

/// A [`Context`] recording every request of the node under test.
///
/// Time only moves when a test sets [`MockContext::now`] or fires the
/// earliest pending timer through [`MockContext::advance`].
pub(crate) struct MockContext {
    pub(crate) now:       VirtualTime,
    pub(crate) forwarded: Vec<(usize, Token)>,
    pub(crate) pending:   BTreeMap<TimerId, (VirtualTime, Timer)>,
    pub(crate) cancelled: Vec<TimerId>,
    pub(crate) records:   Vec<(String, VirtualTime, f64)>,
    rng:                  ChaCha8Rng,
    next_id:              u64,
}

impl MockContext {
    pub(crate) fn new() -> Self {
        MockContext {
            now:       VirtualTime::ZERO,
            forwarded: Vec::new(),
            pending:   BTreeMap::new(),
            cancelled: Vec::new(),
            records:   Vec::new(),
            rng:       ChaCha8Rng::seed_from_u64(17),
            next_id:   0,
        }
    }

    pub(crate) fn at(value: f64) -> VirtualTime {
        VirtualTime::new(value).unwrap()
    }

    pub(crate) fn values(&self, series: &str) -> Vec<f64> {
        self.records.iter().filter(|(s, ..)| s == series).map(|&(_, _, v)| v).collect()
    }

    pub(crate) fn pending_of(&self, timer: Timer) -> Vec<(TimerId, VirtualTime)> {
        self.pending
            .iter()
            .filter(|(_, entry)| entry.1 == timer)
            .map(|(&id, &(at, _))| (id, at))
            .collect()
    }

    /// Removes the earliest pending timer (by time, then by id), moves
    /// the clock to it and returns it.
    pub(crate) fn advance(&mut self) -> Option<(Timer, TimerId)> {
        let (&id, &(at, timer)) = self.pending.iter().min_by_key(|entry| (entry.1 .0, *entry.0))?;

        self.pending.remove(&id);
        self.now = at;

        Some((timer, id))
    }

    pub(crate) fn take_forwarded(&mut self) -> Vec<(usize, Token)> {
        std::mem::take(&mut self.forwarded)
    }
}

impl Context for MockContext {
    fn now(&self) -> VirtualTime {
        self.now
    }

    fn forward(&mut self, output: usize, token: Token) {
        self.forwarded.push((output, token));
    }

    fn schedule(&mut self, at: VirtualTime, timer: Timer) -> TimerId {
        let id = TimerId(self.next_id);

        self.next_id += 1;
        self.pending.insert(id, (at, timer));

        id
    }

    fn cancel(&mut self, timer_id: TimerId) {
        self.pending.remove(&timer_id);
        self.cancelled.push(timer_id);
    }

    fn record(&mut self, series: &str, value: f64) {
        self.records.push((series.to_owned(), self.now, value));
    }

    fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }
}
