//! `/ex7`: expand run-length encoded strings such as `3a2b`.

use super::{Exercise, ItemLimits};

/// Fixed `RESULT` for this exercise; there is no meaningful batch aggregate.
pub const NO_RESULT: &str = "No result value given by the exercise";

/// Expands `<count><char>` runs in each item.
pub struct RunLengthExpand;

impl Exercise for RunLengthExpand {
    const PATH: &'static str = "/ex7";
    type Output = String;
    type Aggregate = &'static str;

    fn process(item: &str) -> String {
        Self::process_limited(item, ItemLimits::default())
    }

    fn process_limited(item: &str, limits: ItemLimits) -> String {
        expand(item, limits.max_output_bytes).unwrap_or_else(|| {
            tracing::warn!(
                input_bytes = item.len(),
                max_output_bytes = limits.max_output_bytes,
                "Run-length expansion exceeds the per-item output budget"
            );
            String::new()
        })
    }

    fn aggregate(_original: &[String], _processed: &[String]) -> &'static str {
        NO_RESULT
    }
}

/// Expand every run of decimal digits followed by a character into that many copies.
///
/// A character with no count in front of it is dropped: before the first digit the count
/// is unset, and after each run it resets to zero. Returns `None` without allocating when
/// the full expansion would exceed `max_output_bytes`.
pub fn expand(item: &str, max_output_bytes: usize) -> Option<String> {
    let size = runs(item).fold(0usize, |total, (times, ch)| {
        total.saturating_add(times.saturating_mul(ch.len_utf8()))
    });
    if size > max_output_bytes {
        return None;
    }

    let mut expanded = String::with_capacity(size);
    for (times, ch) in runs(item) {
        expanded.extend(std::iter::repeat_n(ch, times));
    }
    Some(expanded)
}

/// `(count, char)` pairs in input order, skipping characters without a count.
fn runs(item: &str) -> impl Iterator<Item = (usize, char)> + '_ {
    let mut count: Option<usize> = None;
    item.chars().filter_map(move |ch| {
        if let Some(digit) = ch.to_digit(10) {
            let current = count.unwrap_or(0);
            count = Some(current.saturating_mul(10).saturating_add(digit as usize));
            return None;
        }
        let run = count.map(|times| (times, ch));
        count = Some(0);
        run
    })
}
