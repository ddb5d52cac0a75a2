//! Per-endpoint item processors and their HTTP bindings.
//!
//! Every exercise is a zero-sized type implementing [`Exercise`]: it names the route it is
//! served on, the per-item result type, the processor producing it, and the aggregate
//! reported as `RESULT` once the whole batch has been processed.

pub mod binary;
pub mod password;
pub mod perfect_square;
pub mod run_length;
pub mod vowels;

use serde::Serialize;

pub use binary::BinaryDecode;
pub use password::PasswordStrength;
pub use perfect_square::PerfectSquare;
pub use run_length::RunLengthExpand;
pub use vowels::EvenVowels;

/// Per-item resource limits handed to processors whose output can outgrow their input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemLimits {
    /// Largest result a single item may expand into, in bytes.
    pub max_output_bytes: usize,
}

impl Default for ItemLimits {
    fn default() -> Self {
        Self {
            max_output_bytes: 32 * 1024 * 1024,
        }
    }
}

/// Binding between a route, a per-item processor, and a batch aggregate.
pub trait Exercise: Send + Sync + 'static {
    /// Route the exercise is served on.
    const PATH: &'static str;

    /// Result produced for a single input item.
    type Output: Serialize + Default + Send + 'static;

    /// Value reported under `RESULT` for the whole batch.
    type Aggregate: Serialize + Send;

    /// Process one item. Must be total: validation failures map to a sentinel value.
    fn process(item: &str) -> Self::Output;

    /// Process one item under `limits`. Exercises with bounded output keep the default.
    fn process_limited(item: &str, _limits: ItemLimits) -> Self::Output {
        Self::process(item)
    }

    /// Derive the batch aggregate from the original items and their index-aligned results.
    fn aggregate(original: &[String], processed: &[Self::Output]) -> Self::Aggregate;
}

/// Number of items whose predicate held.
pub(crate) fn count_true(processed: &[bool]) -> usize {
    processed.iter().filter(|accepted| **accepted).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_are_distinct() {
        let mut paths = vec![
            PerfectSquare::PATH,
            BinaryDecode::PATH,
            RunLengthExpand::PATH,
            EvenVowels::PATH,
            PasswordStrength::PATH,
        ];
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths, vec!["/ex14", "/ex2", "/ex5", "/ex7", "/ex9"]);
    }

    #[test]
    fn count_true_ignores_false_entries() {
        assert_eq!(count_true(&[true, false, true, true]), 3);
        assert_eq!(count_true(&[]), 0);
    }
}
