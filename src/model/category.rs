use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The category of an expense.
///
/// The five known categories have their own variants. Any other value coming from the remote
/// service is kept verbatim in `Other` so that it round-trips unchanged; it is displayed with a
/// fallback label and color.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Food,
    Housing,
    Entertainment,
    Transportation,
    Utilities,
    Other(String),
}

impl Default for Category {
    /// A missing category is represented as an empty `Other`.
    fn default() -> Self {
        Category::Other(String::new())
    }
}

impl Category {
    /// The known categories in the order they are offered to the user.
    pub const KNOWN: [Category; 5] = [
        Category::Food,
        Category::Housing,
        Category::Entertainment,
        Category::Transportation,
        Category::Utilities,
    ];

    /// Maps a wire value to a `Category`. Only exact matches become known variants.
    pub fn from_literal(s: impl Into<String>) -> Self {
        let s = s.into();
        match s.as_str() {
            FOOD_STR => Category::Food,
            HOUSING_STR => Category::Housing,
            ENTERTAINMENT_STR => Category::Entertainment,
            TRANSPORTATION_STR => Category::Transportation,
            UTILITIES_STR => Category::Utilities,
            _ => Category::Other(s),
        }
    }

    /// The literal value that is sent to, and was received from, the remote service.
    pub fn as_str(&self) -> &str {
        match self {
            Category::Food => FOOD_STR,
            Category::Housing => HOUSING_STR,
            Category::Entertainment => ENTERTAINMENT_STR,
            Category::Transportation => TRANSPORTATION_STR,
            Category::Utilities => UTILITIES_STR,
            Category::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Category::Other(_))
    }

    /// The human-facing label. Unknown values show as themselves, and a missing value shows as
    /// "Uncategorized".
    pub fn label(&self) -> &str {
        match self {
            Category::Other(s) if s.trim().is_empty() => UNCATEGORIZED_STR,
            other => other.as_str(),
        }
    }

    /// The chart color for this category as a `#RRGGBB` string.
    pub fn color(&self) -> &'static str {
        match self {
            Category::Food => "#FF6384",
            Category::Housing => "#36A2EB",
            Category::Entertainment => "#FFCE56",
            Category::Transportation => "#4BC0C0",
            Category::Utilities => "#9966FF",
            Category::Other(_) => FALLBACK_COLOR,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

/// Parses user input. Known categories match case-insensitively, anything else is kept as typed.
impl FromStr for Category {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(Category::KNOWN
            .iter()
            .find(|known| known.as_str().eq_ignore_ascii_case(trimmed))
            .cloned()
            .unwrap_or_else(|| Category::Other(trimmed.to_string())))
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: Option<String> = Option::deserialize(deserializer)?;
        Ok(s.map(Category::from_literal).unwrap_or_default())
    }
}

pub(super) const FOOD_STR: &str = "Food";
pub(super) const HOUSING_STR: &str = "Housing";
pub(super) const ENTERTAINMENT_STR: &str = "Entertainment";
pub(super) const TRANSPORTATION_STR: &str = "Transportation";
pub(super) const UTILITIES_STR: &str = "Utilities";
pub(super) const UNCATEGORIZED_STR: &str = "Uncategorized";
pub(super) const FALLBACK_COLOR: &str = "#C9CBCF";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_honors_width() {
        assert_eq!(format!("{:<6}|", Category::Food), "Food  |");
        assert_eq!(format!("{:>6}|", Category::Other("Pets".to_string())), "  Pets|");
    }

    #[test]
    fn test_known_round_trip() {
        for category in Category::KNOWN {
            let json = serde_json::to_string(&category).unwrap();
            let back: Category = serde_json::from_str(&json).unwrap();
            assert_eq!(category, back);
            assert!(back.is_known());
        }
    }

    #[test]
    fn test_unknown_round_trips_verbatim() {
        let category: Category = serde_json::from_str("\"Pets\"").unwrap();
        assert_eq!(category, Category::Other("Pets".to_string()));
        assert_eq!(serde_json::to_string(&category).unwrap(), "\"Pets\"");
        assert_eq!(category.color(), FALLBACK_COLOR);
        assert_eq!(category.label(), "Pets");
    }

    #[test]
    fn test_wire_match_is_exact() {
        let category: Category = serde_json::from_str("\"food\"").unwrap();
        assert_eq!(category, Category::Other("food".to_string()));
    }

    #[test]
    fn test_null_is_uncategorized() {
        let category: Category = serde_json::from_str("null").unwrap();
        assert_eq!(category, Category::default());
        assert_eq!(category.label(), "Uncategorized");
        assert!(!category.is_known());
    }

    #[test]
    fn test_user_input_is_case_insensitive() {
        assert_eq!(Category::from_str("food").unwrap(), Category::Food);
        assert_eq!(
            Category::from_str(" TRANSPORTATION ").unwrap(),
            Category::Transportation
        );
        assert_eq!(
            Category::from_str("Travel").unwrap(),
            Category::Other("Travel".to_string())
        );
    }

    #[test]
    fn test_every_known_category_has_its_own_color() {
        let mut colors: Vec<&str> = Category::KNOWN.iter().map(|c| c.color()).collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), Category::KNOWN.len());
        assert!(!colors.contains(&FALLBACK_COLOR));
    }
}
