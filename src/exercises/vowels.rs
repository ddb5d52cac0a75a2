//! `/ex9`: vowels only at even positions, and an even number of them.

use super::{Exercise, count_true};

/// Accepts items whose ASCII vowels all sit at even byte offsets, in even number.
pub struct EvenVowels;

impl Exercise for EvenVowels {
    const PATH: &'static str = "/ex9";
    type Output = bool;
    type Aggregate = usize;

    fn process(item: &str) -> bool {
        has_even_vowel_layout(item)
    }

    fn aggregate(_original: &[String], processed: &[bool]) -> usize {
        count_true(processed)
    }
}

fn is_vowel(ch: char) -> bool {
    matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u' | 'A' | 'E' | 'I' | 'O' | 'U')
}

/// Positions are UTF-8 byte offsets, so a multi-byte character shifts every later position.
pub fn has_even_vowel_layout(item: &str) -> bool {
    let mut even_vowels = 0usize;
    for (offset, ch) in item.char_indices().filter(|(_, ch)| is_vowel(*ch)) {
        if offset % 2 != 0 {
            return false;
        }
        even_vowels += 1;
    }
    even_vowels % 2 == 0
}
