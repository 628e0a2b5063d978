//! Descriptor probability resolution

use super::cache::{CacheKey, ProbabilityCache};
use super::table::ProbabilityTable;
use crate::pxml::condition::ConditionParser;
use crate::pxml::error::ConditionError;

/// Multiplies per-condition probabilities, caching every lookup
///
/// One resolver represents one evaluation session. Call `reset` before
/// reusing it for an unrelated document so stale probabilities are not
/// served across contexts.
#[derive(Debug, Default)]
pub struct ProbabilityResolver {
    cache: ProbabilityCache,
}

impl ProbabilityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Product of the probabilities of every condition in `descriptor`
    ///
    /// The empty descriptor has probability 1.0. The descriptor is not
    /// checked for consistency: `x=0 x=1` yields `P(x=0) * P(x=1)`.
    pub fn probability<T: ProbabilityTable + ?Sized>(
        &mut self,
        table: &T,
        context: &str,
        descriptor: &str,
    ) -> Result<f64, ConditionError> {
        let mut probability = 1.0;

        for condition in ConditionParser::new(descriptor) {
            let key = CacheKey::new(context, condition?);
            let p = match self.cache.get(&key) {
                Some(p) => {
                    log::trace!("cache hit for {} in '{}'", key.condition(), context);
                    p
                }
                None => {
                    let p = table.lookup(key.condition().name(), key.condition().value());
                    log::trace!(
                        "cache miss for {} in '{}', resolved {}",
                        key.condition(),
                        context,
                        p
                    );
                    self.cache.insert(key, p);
                    p
                }
            };
            probability *= p;
        }

        Ok(probability)
    }

    /// Start a new evaluation session
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &ProbabilityCache {
        &self.cache
    }
}
