use std::{fmt, cmp::Ordering, ops::Add};

/// A point on the simulation's logical clock.
///
/// Virtual time is real-valued, because delays of timed transitions
/// are drawn from continuous distributions.  It advances only when
/// the scheduler delivers an event, never by observing a wall clock.
///
/// The order is total: values are compared with [`f64::total_cmp`],
/// so `VirtualTime` may key ordered collections.  Constructors reject
/// NaN, hence the order agrees with the usual numeric one.
#[derive(Clone, Copy, Debug, Default)]
#[repr(transparent)]
pub struct VirtualTime(f64);

impl VirtualTime {
    pub const ZERO: VirtualTime = VirtualTime(0.0);

    /// Creates a timestamp, or returns `None` if `value` is NaN.
    pub fn new(value: f64) -> Option<Self> {
        if value.is_nan() {
            None
        } else {
            Some(VirtualTime(value))
        }
    }

    #[inline]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// Elapsed time from `earlier` to `self` (negative if `earlier` is
    /// actually later).
    #[inline]
    pub fn duration_since(self, earlier: VirtualTime) -> f64 {
        self.0 - earlier.0
    }

    #[inline]
    pub fn min(self, other: VirtualTime) -> VirtualTime {
        if other < self {
            other
        } else {
            self
        }
    }
}

impl Add<f64> for VirtualTime {
    type Output = VirtualTime;

    fn add(self, delay: f64) -> Self::Output {
        VirtualTime(self.0 + delay)
    }
}

impl From<VirtualTime> for f64 {
    fn from(time: VirtualTime) -> Self {
        time.0
    }
}

impl PartialEq for VirtualTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VirtualTime {}

impl PartialOrd for VirtualTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VirtualTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for VirtualTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}
