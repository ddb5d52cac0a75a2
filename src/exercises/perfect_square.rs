//! `/ex2`: is the number formed by a string's digits a perfect square?

use super::{Exercise, count_true};

/// Extracts the decimal digits of each item and tests whether they form a perfect square.
pub struct PerfectSquare;

impl Exercise for PerfectSquare {
    const PATH: &'static str = "/ex2";
    type Output = bool;
    type Aggregate = usize;

    fn process(item: &str) -> bool {
        digits_value(item).is_some_and(is_perfect_square)
    }

    fn aggregate(_original: &[String], processed: &[bool]) -> usize {
        count_true(processed)
    }
}

/// Parse the ASCII digits of `item`, in order, as an unsigned integer.
///
/// Non-digit characters are skipped. Returns `None` when there are no digits or the value
/// does not fit in a `u64`.
pub fn digits_value(item: &str) -> Option<u64> {
    let mut digits = item.bytes().filter(u8::is_ascii_digit).peekable();
    digits.peek()?;
    digits.try_fold(0u64, |value, digit| {
        value
            .checked_mul(10)?
            .checked_add(u64::from(digit - b'0'))
    })
}

/// Floor of the square root of `n`, found by binary search over integers.
pub fn integer_sqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    // The root of any u64 fits in 32 bits.
    let (mut lo, mut hi) = (1u64, n.min(u64::from(u32::MAX)));
    let mut root = 1;
    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        if mid <= n / mid {
            root = mid;
            lo = mid + 1;
        } else {
            hi = mid - 1;
        }
    }
    root
}

fn is_perfect_square(n: u64) -> bool {
    let root = integer_sqrt(n);
    root * root == n
}
