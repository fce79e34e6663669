use rand::Rng;

/// Uniform integer source used to pick one result out of many.
pub trait RandomIndex: Send + Sync {
    /// A uniformly distributed integer in `min..=max`.
    fn random_int(&self, min: usize, max: usize) -> usize;
}

/// [`RandomIndex`] backed by the thread-local `rand` generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomIndex for ThreadRandom {
    fn random_int(&self, min: usize, max: usize) -> usize {
        if min >= max {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }
}
