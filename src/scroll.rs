use crate::util::lerp;
use crate::ConfigError;
use itertools::Itertools;

/// One interpolated output channel: ordered `(breakpoint, value)` stops over
/// the normalized scroll domain. Pure configuration; sampling holds no state.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    stops: Vec<(f64, f64)>,
}

impl Channel {
    /// Stops must be strictly increasing in their breakpoints and lie within
    /// [0, 1]. At least two stops are required to interpolate.
    pub fn new(stops: Vec<(f64, f64)>) -> Result<Self, ConfigError> {
        if stops.len() < 2 {
            return Err(ConfigError::BadChannelStops("need at least two stops"));
        }
        if stops
            .iter()
            .any(|(t, _)| !t.is_finite() || !(0.0..=1.0).contains(t))
        {
            return Err(ConfigError::BadChannelStops("breakpoints must lie in [0, 1]"));
        }
        if stops.iter().tuple_windows().any(|(a, b)| a.0 >= b.0) {
            return Err(ConfigError::BadChannelStops(
                "breakpoints must be strictly increasing",
            ));
        }
        Ok(Self { stops })
    }

    /// A progress channel active within `[start, end]`: 0 before, 1 after.
    pub fn segment(start: f64, end: f64) -> Result<Self, ConfigError> {
        Self::new(vec![(start, 0.0), (end, 1.0)])
    }

    /// Linearly interpolate at scroll progress `t`, clamped to the boundary
    /// values outside the configured domain. No extrapolation.
    pub fn sample(&self, t: f64) -> f64 {
        let (first, last) = (self.stops[0], self.stops[self.stops.len() - 1]);
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }
        for ((t0, v0), (t1, v1)) in self.stops.iter().copied().tuple_windows() {
            if t <= t1 {
                return lerp(v0, v1, (t - t0) / (t1 - t0));
            }
        }
        last.1
    }

    pub fn stops(&self) -> &[(f64, f64)] {
        &self.stops
    }
}

/// Independent channels over a shared scroll-progress domain.
///
/// The mapper does no smoothing; easing belongs to a downstream stage.
#[derive(Debug, Clone)]
pub struct ScrollMapper {
    channels: Vec<Channel>,
}

impl ScrollMapper {
    pub fn new(channels: Vec<Channel>) -> Self {
        Self { channels }
    }

    pub fn map(&self, t: f64) -> Vec<f64> {
        self.channels.iter().map(|c| c.sample(t)).collect()
    }

    pub fn channel(&self, idx: usize) -> &Channel {
        &self.channels[idx]
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
