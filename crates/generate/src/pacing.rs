use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default gap between successive chunks.
pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_millis(50);

/// Delay policy applied before each chunk, keyed by the chunk's position in
/// the stream (0-based).
#[derive(Clone)]
pub struct Pacing {
    policy: Arc<dyn Fn(usize) -> Duration + Send + Sync>,
}

impl Pacing {
    /// `delay` between successive chunks; the first chunk goes out immediately.
    pub fn fixed(delay: Duration) -> Self {
        Self::from_fn(move |index| if index == 0 { Duration::ZERO } else { delay })
    }

    /// No artificial delay at all.
    pub fn none() -> Self {
        Self::from_fn(|_| Duration::ZERO)
    }

    pub fn from_fn(policy: impl Fn(usize) -> Duration + Send + Sync + 'static) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    pub fn delay(&self, chunk_index: usize) -> Duration {
        (self.policy)(chunk_index)
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::fixed(DEFAULT_CHUNK_DELAY)
    }
}

impl fmt::Debug for Pacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pacing")
            .field("second_chunk_delay", &self.delay(1))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_skips_first_chunk() {
        let pacing = Pacing::default();
        assert_eq!(pacing.delay(0), Duration::ZERO);
        assert_eq!(pacing.delay(1), Duration::from_millis(50));
        assert_eq!(pacing.delay(40), Duration::from_millis(50));
    }

    #[test]
    fn none_never_waits() {
        assert_eq!(Pacing::none().delay(7), Duration::ZERO);
    }

    #[test]
    fn custom_policy() {
        let pacing = Pacing::from_fn(|i| Duration::from_millis(i as u64 * 10));
        assert_eq!(pacing.delay(3), Duration::from_millis(30));
    }
}
