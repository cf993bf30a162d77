//! Quiz keyword table
//!
//! Maps an answer token (one quiz choice, e.g. `"spicy"`) to the category it
//! belongs to and the natural-language phrases used to build a search string.
//!
//! The table is immutable once built. Services construct it once at startup,
//! either from the built-in Korean table or from a TOML file, and share it by
//! reference.
//!
//! # TOML format
//!
//! ```toml
//! [[keyword]]
//! token = "dessert"
//! category = "cuisine"
//! phrases = ["디저트", "베이커리"]
//! cafe = true
//!
//! [[keyword]]
//! token = "near"
//! category = "distance"
//! reach = "near"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::{Error, Result};

/// Keyword category
///
/// Composition buckets matched answers by category before building the phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cuisine,
    Ingredient,
    Flavor,
    Style,
    Distance,
}

impl Category {
    /// All categories in bucket order
    pub const ALL: [Category; 5] = [
        Category::Cuisine,
        Category::Ingredient,
        Category::Flavor,
        Category::Style,
        Category::Distance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cuisine => "cuisine",
            Category::Ingredient => "ingredient",
            Category::Flavor => "flavor",
            Category::Style => "style",
            Category::Distance => "distance",
        }
    }

    /// Position in [`Category::ALL`]
    pub(crate) fn index(&self) -> usize {
        match self {
            Category::Cuisine => 0,
            Category::Ingredient => 1,
            Category::Flavor => 2,
            Category::Style => 3,
            Category::Distance => 4,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How far the user is willing to travel (distance answers only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reach {
    Near,
    Far,
}

/// One row of the keyword table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEntry {
    /// Answer token sent by the quiz UI
    pub token: String,
    /// Bucket this answer contributes to
    pub category: Category,
    /// Search phrases, most specific first. Only the first is used in queries.
    #[serde(default)]
    pub phrases: Vec<String>,
    /// Cuisine entries only: the answer selects a dessert/café venue
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cafe: bool,
    /// Distance entries only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reach: Option<Reach>,
}

impl KeywordEntry {
    fn new(token: &str, category: Category, phrases: &[&str]) -> Self {
        Self {
            token: token.to_string(),
            category,
            phrases: phrases.iter().map(|p| p.to_string()).collect(),
            cafe: false,
            reach: None,
        }
    }

    fn cafe(mut self) -> Self {
        self.cafe = true;
        self
    }

    fn reach(mut self, reach: Reach) -> Self {
        self.reach = Some(reach);
        self
    }

    /// First non-blank phrase, used when the entry fills a query slot
    pub fn primary_phrase(&self) -> Option<&str> {
        self.phrases
            .iter()
            .map(|p| p.trim())
            .find(|p| !p.is_empty())
    }

    fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(Error::InvalidKeywords("token must not be empty".to_string()));
        }

        match self.category {
            Category::Distance => {
                if self.reach.is_none() {
                    return Err(Error::InvalidKeywords(format!(
                        "distance token '{}' has no reach",
                        self.token
                    )));
                }
            }
            _ => {
                if self.primary_phrase().is_none() {
                    return Err(Error::InvalidKeywords(format!(
                        "token '{}' has no phrases",
                        self.token
                    )));
                }
                if self.reach.is_some() {
                    return Err(Error::InvalidKeywords(format!(
                        "token '{}' sets reach but is not a distance token",
                        self.token
                    )));
                }
            }
        }

        if self.cafe && self.category != Category::Cuisine {
            return Err(Error::InvalidKeywords(format!(
                "token '{}' sets cafe but is not a cuisine token",
                self.token
            )));
        }

        Ok(())
    }
}

/// On-disk layout of a keyword file
#[derive(Debug, Deserialize)]
struct KeywordFile {
    #[serde(rename = "keyword", default)]
    keywords: Vec<KeywordEntry>,
}

/// Immutable answer-token lookup table
#[derive(Debug, Clone)]
pub struct KeywordTable {
    entries: Vec<KeywordEntry>,
    index: HashMap<String, usize>,
}

impl KeywordTable {
    /// Build a table, rejecting blank or duplicate tokens and malformed rows
    pub fn new(entries: Vec<KeywordEntry>) -> Result<Self> {
        let mut index = HashMap::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            entry.validate()?;
            if index.insert(entry.token.clone(), i).is_some() {
                return Err(Error::InvalidKeywords(format!(
                    "duplicate token '{}'",
                    entry.token
                )));
            }
        }

        Ok(Self { entries, index })
    }

    /// Parse a table from TOML text (see module docs for the format)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: KeywordFile = toml::from_str(content)?;
        if file.keywords.is_empty() {
            return Err(Error::InvalidKeywords(
                "keyword file contains no [[keyword]] entries".to_string(),
            ));
        }
        Self::new(file.keywords)
    }

    /// Load a table from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let table = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            entries = table.len(),
            "Loaded keyword table"
        );
        Ok(table)
    }

    /// Built-in Korean quiz table
    pub fn builtin() -> Self {
        use Category::*;

        let entries = vec![
            // Cuisine
            KeywordEntry::new("korean", Cuisine, &["한식"]),
            KeywordEntry::new("chinese", Cuisine, &["중식", "중국집"]),
            KeywordEntry::new("japanese", Cuisine, &["일식", "초밥"]),
            KeywordEntry::new("western", Cuisine, &["양식", "파스타"]),
            KeywordEntry::new("asian", Cuisine, &["아시안 음식", "쌀국수"]),
            KeywordEntry::new("snack", Cuisine, &["분식"]),
            KeywordEntry::new("dessert", Cuisine, &["디저트", "베이커리"]).cafe(),
            KeywordEntry::new("cafe", Cuisine, &["카페"]).cafe(),
            // Ingredient
            KeywordEntry::new("meat", Ingredient, &["고기", "육류"]),
            KeywordEntry::new("seafood", Ingredient, &["해산물", "회"]),
            KeywordEntry::new("noodle", Ingredient, &["면 요리", "국수"]),
            KeywordEntry::new("rice", Ingredient, &["밥", "덮밥"]),
            KeywordEntry::new("chicken", Ingredient, &["치킨", "닭 요리"]),
            KeywordEntry::new("vegetable", Ingredient, &["채식", "샐러드"]),
            // Flavor
            KeywordEntry::new("spicy", Flavor, &["매운"]),
            KeywordEntry::new("mild", Flavor, &["순한"]),
            KeywordEntry::new("sweet", Flavor, &["달콤한"]),
            KeywordEntry::new("savory", Flavor, &["담백한"]),
            KeywordEntry::new("salty", Flavor, &["짭짤한"]),
            // Style
            KeywordEntry::new("cozy", Style, &["아늑한"]),
            KeywordEntry::new("trendy", Style, &["감성"]),
            KeywordEntry::new("quiet", Style, &["조용한"]),
            KeywordEntry::new("view", Style, &["뷰 좋은"]),
            KeywordEntry::new("group", Style, &["단체"]),
            // Distance
            KeywordEntry::new("near", Distance, &["가까운"]).reach(Reach::Near),
            KeywordEntry::new("far", Distance, &["멀리"]).reach(Reach::Far),
        ];

        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.token.clone(), i))
            .collect();

        Self { entries, index }
    }

    /// Look up an answer token
    pub fn get(&self, token: &str) -> Option<&KeywordEntry> {
        self.index.get(token).map(|&i| &self.entries[i])
    }

    /// All entries in table order
    pub fn entries(&self) -> &[KeywordEntry] {
        &self.entries
    }

    /// Entries of one category in table order
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &KeywordEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_passes_validation() {
        let builtin = KeywordTable::builtin();
        let rebuilt = KeywordTable::new(builtin.entries().to_vec());
        assert!(rebuilt.is_ok(), "built-in table invalid: {:?}", rebuilt.err());
    }

    #[test]
    fn test_builtin_covers_every_category() {
        let table = KeywordTable::builtin();
        for category in Category::ALL {
            assert!(
                table.by_category(category).next().is_some(),
                "no built-in tokens for {}",
                category
            );
        }
    }

    #[test]
    fn test_lookup() {
        let table = KeywordTable::builtin();
        let entry = table.get("spicy").unwrap();
        assert_eq!(entry.category, Category::Flavor);
        assert_eq!(entry.primary_phrase(), Some("매운"));
        assert!(table.get("pineapple-pizza").is_none());
    }

    #[test]
    fn test_duplicate_token_rejected() {
        let entries = vec![
            KeywordEntry::new("spicy", Category::Flavor, &["매운"]),
            KeywordEntry::new("spicy", Category::Flavor, &["얼큰한"]),
        ];
        let err = KeywordTable::new(entries).unwrap_err();
        assert!(err.to_string().contains("duplicate token 'spicy'"));
    }

    #[test]
    fn test_entry_without_phrases_rejected() {
        let entries = vec![KeywordEntry::new("korean", Category::Cuisine, &["  "])];
        assert!(KeywordTable::new(entries).is_err());
    }

    #[test]
    fn test_distance_requires_reach() {
        let entries = vec![KeywordEntry::new("near", Category::Distance, &[])];
        assert!(KeywordTable::new(entries).is_err());

        let entries = vec![KeywordEntry::new("near", Category::Distance, &[]).reach(Reach::Near)];
        assert!(KeywordTable::new(entries).is_ok());
    }

    #[test]
    fn test_cafe_flag_only_on_cuisine() {
        let entries = vec![KeywordEntry::new("cozy", Category::Style, &["아늑한"]).cafe()];
        assert!(KeywordTable::new(entries).is_err());
    }

    #[test]
    fn test_from_toml_str() {
        let toml = r#"
            [[keyword]]
            token = "bakery"
            category = "cuisine"
            phrases = ["빵집"]
            cafe = true

            [[keyword]]
            token = "walk"
            category = "distance"
            reach = "near"
        "#;

        let table = KeywordTable::from_toml_str(toml).unwrap();
        assert_eq!(table.len(), 2);

        let bakery = table.get("bakery").unwrap();
        assert!(bakery.cafe);
        assert_eq!(bakery.primary_phrase(), Some("빵집"));

        let walk = table.get("walk").unwrap();
        assert_eq!(walk.reach, Some(Reach::Near));
        assert!(walk.phrases.is_empty());
    }

    #[test]
    fn test_from_toml_str_rejects_unknown_category() {
        let toml = r#"
            [[keyword]]
            token = "halal"
            category = "religion"
            phrases = ["할랄"]
        "#;
        assert!(matches!(
            KeywordTable::from_toml_str(toml),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn test_from_toml_str_rejects_empty_file() {
        assert!(matches!(
            KeywordTable::from_toml_str(""),
            Err(Error::InvalidKeywords(_))
        ));
    }
}
