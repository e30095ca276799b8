//! Tagged client results.

use crate::MarketError;

/// Result of a client call, tagged with the path that produced it.
///
/// A value from the real backend is [`Outcome::Live`]. Anything produced by
/// the in-memory simulation is [`Outcome::Demo`]; when the simulation ran
/// because this very call just failed against the backend, `failure` holds
/// that backend error.
///
/// # Example
///
/// ```
/// use gpuflow_lib::{MarketError, Outcome};
///
/// let live: Outcome<u64> = Outcome::Live(3);
/// assert!(live.is_live());
///
/// let fell_back = Outcome::Demo {
///     value: 2u64,
///     failure: Some(MarketError::Transport("connection refused".into())),
/// };
/// assert!(fell_back.is_demo());
/// assert!(fell_back.failure().is_some());
/// assert_eq!(fell_back.into_value(), 2);
/// ```
#[derive(Debug)]
pub enum Outcome<T> {
    /// Produced by the real backend.
    Live(T),
    /// Produced by the demo simulation.
    Demo {
        /// The simulated result.
        value: T,
        /// The backend error that triggered the switch, if it happened on this call.
        failure: Option<MarketError>,
    },
}

impl<T> Outcome<T> {
    /// Demo result without a fresh backend failure.
    pub fn demo(value: T) -> Self {
        Self::Demo {
            value,
            failure: None,
        }
    }

    /// Borrow the value regardless of the path.
    pub fn value(&self) -> &T {
        match self {
            Self::Live(value) | Self::Demo { value, .. } => value,
        }
    }

    /// Take the value regardless of the path.
    pub fn into_value(self) -> T {
        match self {
            Self::Live(value) | Self::Demo { value, .. } => value,
        }
    }

    /// True when the real backend produced the value.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    /// True when the demo simulation produced the value.
    pub fn is_demo(&self) -> bool {
        matches!(self, Self::Demo { .. })
    }

    /// The backend error that caused this call to fall back, if any.
    pub fn failure(&self) -> Option<&MarketError> {
        match self {
            Self::Live(_) => None,
            Self::Demo { failure, .. } => failure.as_ref(),
        }
    }

    /// Map the value, keeping the tag.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Live(value) => Outcome::Live(f(value)),
            Self::Demo { value, failure } => Outcome::Demo {
                value: f(value),
                failure,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_keeps_the_tag() {
        let out = Outcome::Demo {
            value: 2u64,
            failure: Some(MarketError::Internal("boom".into())),
        }
        .map(|n| n * 10);
        assert!(out.is_demo());
        assert!(out.failure().is_some());
        assert_eq!(*out.value(), 20);

        let live = Outcome::Live("hash").map(str::len);
        assert!(live.is_live());
        assert!(live.failure().is_none());
    }

    #[test]
    fn plain_demo_has_no_failure() {
        let out = Outcome::demo(());
        assert!(out.is_demo());
        assert!(out.failure().is_none());
    }
}
