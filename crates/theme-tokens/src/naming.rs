//! Naming transform for generated variable names.

use serde::{Deserialize, Serialize};

/// Case convention applied to a token path to build its variable name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameCase {
    /// `color-red-900`
    #[default]
    Kebab,
    /// `COLOR_RED_900`
    Constant,
    /// `color_red_900`
    Snake,
}

impl NameCase {
    /// Build the variable name for a token path.
    pub fn apply<I, S>(&self, path: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = path
            .into_iter()
            .flat_map(|s| split_words(s.as_ref()))
            .collect();

        match self {
            NameCase::Kebab => join_lower(&words, "-"),
            NameCase::Snake => join_lower(&words, "_"),
            NameCase::Constant => words
                .iter()
                .map(|w| w.to_uppercase())
                .collect::<Vec<_>>()
                .join("_"),
        }
    }
}

impl std::str::FromStr for NameCase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kebab" => Ok(NameCase::Kebab),
            "constant" => Ok(NameCase::Constant),
            "snake" => Ok(NameCase::Snake),
            other => Err(format!("unknown name case '{}'", other)),
        }
    }
}

fn join_lower(words: &[String], sep: &str) -> String {
    words
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Split one path segment into words.
///
/// Non-alphanumeric characters separate words, and so does a lower-to-upper
/// case boundary (`lightGray` yields `light`, `Gray`).
fn split_words(segment: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in segment.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }

        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }

        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab() {
        assert_eq!(NameCase::Kebab.apply(&["color", "red", "900"]), "color-red-900");
        assert_eq!(NameCase::Kebab.apply(&["color", "red", "DEFAULT"]), "color-red-default");
    }

    #[test]
    fn test_camel_segments_split() {
        assert_eq!(NameCase::Kebab.apply(&["colors", "lightGray"]), "colors-light-gray");
        assert_eq!(NameCase::Snake.apply(&["fontSize", "xl"]), "font_size_xl");
    }

    #[test]
    fn test_constant() {
        assert_eq!(NameCase::Constant.apply(&["color", "gray", "light"]), "COLOR_GRAY_LIGHT");
    }

    #[test]
    fn test_punctuation_separates() {
        assert_eq!(NameCase::Kebab.apply(&["space", "1.5"]), "space-1-5");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("snake".parse::<NameCase>().unwrap(), NameCase::Snake);
        assert!("pascal".parse::<NameCase>().is_err());
    }
}
