use core::fmt;

/// Color of a single cell.
///
/// Cells introduced by a cascade have no color until the game assigns one.
/// Such cells are `Unknown` and never match anything, not even another
/// `Unknown` cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Unknown,
    Known(u8),
}

impl Color {
    pub const UNKNOWN_CODE: i32 = -1;

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            Self::UNKNOWN_CODE => Some(Color::Unknown),
            0..=255 => Some(Color::Known(code as u8)),
            _ => None,
        }
    }

    pub const fn code(self) -> i32 {
        match self {
            Color::Unknown => Self::UNKNOWN_CODE,
            Color::Known(id) => id as i32,
        }
    }

    pub const fn is_known(self) -> bool {
        matches!(self, Color::Known(_))
    }

    pub const fn matches(self, other: Color) -> bool {
        match (self, other) {
            (Color::Known(a), Color::Known(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Unknown => f.write_str("?"),
            Color::Known(id) => write!(f, "{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn unknown_never_matches() {
        assert!(!Color::Unknown.matches(Color::Unknown));
        assert!(!Color::Unknown.matches(Color::Known(3)));
        assert!(!Color::Known(3).matches(Color::Unknown));
    }

    #[test]
    fn known_colors_match_by_id() {
        assert!(Color::Known(4).matches(Color::Known(4)));
        assert!(!Color::Known(4).matches(Color::Known(5)));
    }

    #[test]
    fn codes_convert_both_ways() {
        assert_eq!(Color::from_code(-1), Some(Color::Unknown));
        assert_eq!(Color::from_code(6), Some(Color::Known(6)));
        assert_eq!(Color::from_code(-2), None);
        assert_eq!(Color::from_code(256), None);
        assert_eq!(Color::Known(2).code(), 2);
        assert_eq!(Color::Unknown.code(), -1);
    }
}
