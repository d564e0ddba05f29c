use std::collections::BTreeMap;
use crate::{Token, Timer, TimerId, VirtualTime};

/// Position of a node in its [`Network`](crate::Network).
pub type NodeIndex = usize;

/// Key ordering pending events: earlier time first, then insertion
/// order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct EventKey {
    time:     VirtualTime,
    sequence: u64,
}

impl EventKey {
    #[inline]
    pub fn get_time(&self) -> VirtualTime {
        self.time
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Event {
    Arrival { node: NodeIndex, input: usize, token: Token },
    Timer { node: NodeIndex, timer: Timer, timer_id: TimerId },
}

impl Event {
    pub fn get_node(&self) -> NodeIndex {
        match *self {
            Event::Arrival { node, .. } | Event::Timer { node, .. } => node,
        }
    }
}

/// A deterministic discrete-event queue.
///
/// Events due at the same instant are popped in the order they were
/// scheduled.  Timer events may be cancelled through the [`TimerId`]
/// returned by [`schedule_timer()`](Scheduler::schedule_timer).
#[derive(Default, Debug)]
pub struct Scheduler {
    queue:    BTreeMap<EventKey, Event>,
    timers:   BTreeMap<TimerId, EventKey>,
    sequence: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Default::default()
    }

    fn insert(&mut self, time: VirtualTime, event: Event) -> EventKey {
        let key = EventKey { time, sequence: self.sequence };

        self.sequence += 1;
        self.queue.insert(key, event);

        key
    }

    pub fn schedule_arrival(&mut self, time: VirtualTime, node: NodeIndex, input: usize, token: Token) {
        self.insert(time, Event::Arrival { node, input, token });
    }

    pub fn schedule_timer(&mut self, time: VirtualTime, node: NodeIndex, timer: Timer) -> TimerId {
        let timer_id = TimerId(self.sequence);
        let key = self.insert(time, Event::Timer { node, timer, timer_id });

        self.timers.insert(timer_id, key);

        timer_id
    }

    /// Removes a pending timer.  Returns `false` if it has already
    /// fired or been cancelled.
    pub fn cancel(&mut self, timer_id: TimerId) -> bool {
        if let Some(key) = self.timers.remove(&timer_id) {
            self.queue.remove(&key).is_some()
        } else {
            false
        }
    }

    pub fn peek_time(&self) -> Option<VirtualTime> {
        self.queue.keys().next().map(|key| key.time)
    }

    pub fn pop_next(&mut self) -> Option<(VirtualTime, Event)> {
        let (key, event) = self.queue.pop_first()?;

        if let Event::Timer { timer_id, .. } = event {
            self.timers.remove(&timer_id);
        }

        Some((key.time, event))
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(value: f64) -> VirtualTime {
        VirtualTime::new(value).unwrap()
    }

    #[test]
    fn test_time_order() {
        let mut sched = Scheduler::new();

        sched.schedule_timer(at(3.0), 0, Timer::Sampling);
        sched.schedule_timer(at(1.0), 1, Timer::Completion);
        sched.schedule_arrival(at(2.0), 2, 0, Token::new("a", 1.0, at(0.0)));

        let times: Vec<_> = std::iter::from_fn(|| sched.pop_next()).map(|(t, _)| t).collect();
        assert_eq!(times, vec![at(1.0), at(2.0), at(3.0)]);
    }

    #[test]
    fn test_fifo_at_same_time() {
        let mut sched = Scheduler::new();

        for node in 0..5 {
            sched.schedule_timer(at(1.0), node, Timer::Sampling);
        }

        let nodes: Vec<_> = std::iter::from_fn(|| sched.pop_next()).map(|(_, e)| e.get_node()).collect();
        assert_eq!(nodes, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_cancel() {
        let mut sched = Scheduler::new();

        let first = sched.schedule_timer(at(1.0), 0, Timer::Generation);
        let second = sched.schedule_timer(at(2.0), 0, Timer::Sampling);

        assert!(sched.cancel(first));
        assert!(!sched.cancel(first));
        assert_eq!(sched.len(), 1);
        assert_eq!(sched.peek_time(), Some(at(2.0)));

        let (_, event) = sched.pop_next().unwrap();
        assert_eq!(event, Event::Timer { node: 0, timer: Timer::Sampling, timer_id: second });
        assert!(!sched.cancel(second));
        assert!(sched.is_empty());
    }
}
