//! `/ex5`: decode binary numerals.

use super::Exercise;

/// Result reported for items that are not valid binary numerals or overflow `i64`.
pub const INVALID: i64 = -1;

/// Decodes each item as a big-endian binary numeral.
pub struct BinaryDecode;

impl Exercise for BinaryDecode {
    const PATH: &'static str = "/ex5";
    type Output = i64;
    type Aggregate = Vec<i64>;

    fn process(item: &str) -> i64 {
        decode_binary(item).unwrap_or(INVALID)
    }

    fn aggregate(_original: &[String], processed: &[i64]) -> Vec<i64> {
        processed
            .iter()
            .copied()
            .filter(|value| *value != INVALID)
            .collect()
    }
}

/// Value of a string made only of `0` and `1`, or `None` for any other character or overflow.
///
/// The empty string decodes to zero.
pub fn decode_binary(item: &str) -> Option<i64> {
    item.chars().try_fold(0i64, |value, bit| {
        let bit = match bit {
            '0' => 0,
            '1' => 1,
            _ => return None,
        };
        value.checked_mul(2)?.checked_add(bit)
    })
}
