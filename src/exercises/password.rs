//! `/ex14`: password strength by character class.

use super::Exercise;

/// Accepts items mixing lowercase, uppercase, digits, and at least one symbol.
pub struct PasswordStrength;

impl Exercise for PasswordStrength {
    const PATH: &'static str = "/ex14";
    type Output = bool;
    type Aggregate = Vec<String>;

    fn process(item: &str) -> bool {
        CharClasses::of(item).is_complete()
    }

    /// Originals whose predicate held, in input order.
    fn aggregate(original: &[String], processed: &[bool]) -> Vec<String> {
        original
            .iter()
            .zip(processed)
            .filter(|(_, accepted)| **accepted)
            .map(|(item, _)| item.clone())
            .collect()
    }
}

/// Character classes present in a string. Anything outside ASCII letters and digits,
/// including non-ASCII letters, counts as a symbol.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CharClasses {
    /// At least one `a-z`.
    pub lower: bool,
    /// At least one `A-Z`.
    pub upper: bool,
    /// At least one `0-9`.
    pub digit: bool,
    /// At least one other character.
    pub symbol: bool,
}

impl CharClasses {
    /// Scan `item` once and record which classes occur.
    pub fn of(item: &str) -> Self {
        item.chars().fold(Self::default(), |mut classes, ch| {
            match ch {
                'a'..='z' => classes.lower = true,
                'A'..='Z' => classes.upper = true,
                '0'..='9' => classes.digit = true,
                _ => classes.symbol = true,
            }
            classes
        })
    }

    /// Whether all four classes occur.
    pub fn is_complete(&self) -> bool {
        self.lower && self.upper && self.digit && self.symbol
    }
}
