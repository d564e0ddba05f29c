use std::fmt;
use crate::VirtualTime;

/// The unit of flow.
///
/// A token is never shared: it is owned by an input queue, or by the
/// handler currently processing it, until it is moved into
/// [`Context::forward`] or dropped.
///
/// [`Context::forward`]: crate::Context::forward
#[derive(Clone, PartialEq, Debug)]
pub struct Token {
    identifier:    String,
    size:          f64,
    creation_time: VirtualTime,
}

impl Token {
    pub fn new<S: Into<String>>(identifier: S, size: f64, creation_time: VirtualTime) -> Self {
        Token { identifier: identifier.into(), size, creation_time }
    }

    #[inline]
    pub fn get_identifier(&self) -> &str {
        self.identifier.as_str()
    }

    #[inline]
    pub fn get_size(&self) -> f64 {
        self.size
    }

    #[inline]
    pub fn get_creation_time(&self) -> VirtualTime {
        self.creation_time
    }

    /// Multiplies the size by `coefficient`, keeping identifier and
    /// creation time.
    pub fn rescale(&mut self, coefficient: f64) {
        self.size *= coefficient;
    }

    pub(crate) fn into_parts(self) -> (String, f64, VirtualTime) {
        (self.identifier, self.size, self.creation_time)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (size: {}, born {})", self.identifier, self.size, self.creation_time)
    }
}
