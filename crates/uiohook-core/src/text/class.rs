//! Per-unit character classification.
//!
//! Bits follow the Win32 `CT_CTYPE1` vocabulary so both backends report the
//! same classes.  The message-hook backend asks the OS; the extension backend
//! computes the bits with [`classify_units`].

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A `CT_CTYPE1` bit set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CharClass(pub u16);

impl CharClass {
    pub const EMPTY: Self = Self(0);
    pub const UPPER: Self = Self(0x0001);
    pub const LOWER: Self = Self(0x0002);
    pub const DIGIT: Self = Self(0x0004);
    pub const SPACE: Self = Self(0x0008);
    pub const PUNCT: Self = Self(0x0010);
    pub const CNTRL: Self = Self(0x0020);
    pub const BLANK: Self = Self(0x0040);
    pub const XDIGIT: Self = Self(0x0080);
    pub const ALPHA: Self = Self(0x0100);
    pub const DEFINED: Self = Self(0x0200);

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for CharClass {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CharClass {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CharClass({:#06X})", self.0)
    }
}

/// Classifies one character.
pub fn classify_char(c: char) -> CharClass {
    let mut class = CharClass::DEFINED;
    if c.is_uppercase() {
        class |= CharClass::UPPER;
    }
    if c.is_lowercase() {
        class |= CharClass::LOWER;
    }
    if c.is_numeric() {
        class |= CharClass::DIGIT;
    }
    if c.is_whitespace() {
        class |= CharClass::SPACE;
    }
    if c == ' ' || c == '\t' {
        class |= CharClass::BLANK;
    }
    if c.is_control() {
        class |= CharClass::CNTRL;
    }
    if c.is_ascii_hexdigit() {
        class |= CharClass::XDIGIT;
    }
    if c.is_alphabetic() {
        class |= CharClass::ALPHA;
    }
    if !c.is_alphanumeric() && !c.is_whitespace() && !c.is_control() {
        class |= CharClass::PUNCT;
    }
    class
}

/// Classifies `units` into `classes`, unit by unit.
///
/// Both halves of a surrogate pair get the class of the pair's character; a
/// lone surrogate gets [`CharClass::EMPTY`].  Extra entries of `classes` are
/// left untouched.
pub fn classify_units(units: &[u16], classes: &mut [CharClass]) {
    let mut index = 0;
    for decoded in char::decode_utf16(units.iter().copied()) {
        let (class, width) = match decoded {
            Ok(c) => (classify_char(c), c.len_utf16()),
            Err(_) => (CharClass::EMPTY, 1),
        };
        for slot in classes.iter_mut().skip(index).take(width) {
            *slot = class;
        }
        index += width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters() {
        let upper = classify_char('A');
        assert!(upper.contains(CharClass::UPPER | CharClass::ALPHA | CharClass::XDIGIT));
        assert!(!upper.contains(CharClass::LOWER));

        let lower = classify_char('z');
        assert!(lower.contains(CharClass::LOWER | CharClass::ALPHA));
        assert!(!lower.contains(CharClass::XDIGIT));
    }

    #[test]
    fn test_digits_space_and_punctuation() {
        assert!(classify_char('7').contains(CharClass::DIGIT | CharClass::XDIGIT));
        assert!(classify_char(' ').contains(CharClass::SPACE | CharClass::BLANK));
        assert!(classify_char('\n').contains(CharClass::SPACE | CharClass::CNTRL));
        assert!(!classify_char('\n').contains(CharClass::BLANK));
        assert!(classify_char('!').contains(CharClass::PUNCT));
        assert!(!classify_char('!').contains(CharClass::ALPHA));
    }

    #[test]
    fn test_surrogate_pair_units_share_class() {
        // Arrange: U+1D400 MATHEMATICAL BOLD CAPITAL A
        let units = [0xD835, 0xDC00];
        let mut classes = [CharClass::EMPTY; 2];

        // Act
        classify_units(&units, &mut classes);

        // Assert
        assert_eq!(classes[0], classes[1]);
        assert!(classes[0].contains(CharClass::UPPER | CharClass::ALPHA));
    }

    #[test]
    fn test_lone_surrogate_is_empty() {
        let mut classes = [CharClass::DEFINED; 1];
        classify_units(&[0xD800], &mut classes);
        assert_eq!(classes[0], CharClass::EMPTY);
    }
}
