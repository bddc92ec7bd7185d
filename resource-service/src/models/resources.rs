//! The education resource bundle and its four categories.
//!
//! Provider output is relayed untouched by default. The typed
//! [`ResourceBundle`] is only built when schema validation is switched on,
//! in which case key spelling drift ("Scholarships & Grants",
//! `skillDevelopment`, ...) is normalised before checking the shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// One resource entry. Fields are kept as the provider produced them.
pub type ResourceItem = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceCategory {
    ScholarshipsGrants,
    CareerOpportunities,
    MentorshipPrograms,
    SkillDevelopment,
}

impl ResourceCategory {
    pub const ALL: [ResourceCategory; 4] = [
        ResourceCategory::ScholarshipsGrants,
        ResourceCategory::CareerOpportunities,
        ResourceCategory::MentorshipPrograms,
        ResourceCategory::SkillDevelopment,
    ];

    /// Top-level key in the response body.
    pub fn key(self) -> &'static str {
        match self {
            ResourceCategory::ScholarshipsGrants => "scholarships_grants",
            ResourceCategory::CareerOpportunities => "career_opportunities",
            ResourceCategory::MentorshipPrograms => "mentorship_programs",
            ResourceCategory::SkillDevelopment => "skill_development",
        }
    }

    /// Fields each entry is expected to carry.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            ResourceCategory::ScholarshipsGrants => &[
                "title",
                "description",
                "deadline",
                "amount",
                "eligibility",
                "website",
            ],
            ResourceCategory::CareerOpportunities => &[
                "title",
                "description",
                "location",
                "type",
                "duration",
                "format",
                "level",
                "website",
            ],
            ResourceCategory::MentorshipPrograms => &[
                "title",
                "description",
                "mentors_available",
                "duration",
                "website",
            ],
            ResourceCategory::SkillDevelopment => &[
                "title",
                "description",
                "number_of_courses",
                "level",
                "format",
                "website",
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceBundle {
    pub scholarships_grants: Vec<ResourceItem>,
    pub career_opportunities: Vec<ResourceItem>,
    pub mentorship_programs: Vec<ResourceItem>,
    pub skill_development: Vec<ResourceItem>,
}

impl ResourceBundle {
    pub fn category(&self, category: ResourceCategory) -> &[ResourceItem] {
        match category {
            ResourceCategory::ScholarshipsGrants => &self.scholarships_grants,
            ResourceCategory::CareerOpportunities => &self.career_opportunities,
            ResourceCategory::MentorshipPrograms => &self.mentorship_programs,
            ResourceCategory::SkillDevelopment => &self.skill_development,
        }
    }

    /// Number of entries lacking at least one of their category's fields.
    pub fn incomplete_entries(&self) -> usize {
        ResourceCategory::ALL
            .iter()
            .map(|&category| {
                self.category(category)
                    .iter()
                    .filter(|item| category.fields().iter().any(|f| !item.contains_key(*f)))
                    .count()
            })
            .sum()
    }

    /// Normalise and check a parsed provider payload.
    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        let Value::Object(root) = value else {
            return Err(SchemaError::NotAnObject);
        };

        let mut root = rename_keys(unwrap_envelope(root), category_key);

        let mut take = |category: ResourceCategory| -> Result<Vec<ResourceItem>, SchemaError> {
            let key = category.key();
            match root.remove(key) {
                None => Err(SchemaError::MissingCategory(key)),
                Some(Value::Array(items)) => items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| match item {
                        Value::Object(fields) => Ok(rename_keys(fields, normalize_key)),
                        _ => Err(SchemaError::ItemNotAnObject { category: key, index }),
                    })
                    .collect(),
                Some(_) => Err(SchemaError::CategoryNotAList(key)),
            }
        };

        Ok(ResourceBundle {
            scholarships_grants: take(ResourceCategory::ScholarshipsGrants)?,
            career_opportunities: take(ResourceCategory::CareerOpportunities)?,
            mentorship_programs: take(ResourceCategory::MentorshipPrograms)?,
            skill_development: take(ResourceCategory::SkillDevelopment)?,
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("expected a JSON object at the top level")]
    NotAnObject,

    #[error("missing category '{0}'")]
    MissingCategory(&'static str),

    #[error("category '{0}' is not a list")]
    CategoryNotAList(&'static str),

    #[error("entry {index} of '{category}' is not an object")]
    ItemNotAnObject {
        category: &'static str,
        index: usize,
    },
}

/// `{"education_resources": {...}}` -> `{...}`, when the single key is not
/// itself a category.
fn unwrap_envelope(root: Map<String, Value>) -> Map<String, Value> {
    if root.len() != 1 {
        return root;
    }

    let is_category = root
        .keys()
        .any(|k| ResourceCategory::ALL.iter().any(|c| c.key() == category_key(k)));
    if is_category {
        return root;
    }

    match root.into_iter().next() {
        Some((_, Value::Object(inner))) => inner,
        Some((key, other)) => Map::from_iter([(key, other)]),
        None => Map::new(),
    }
}

/// Rename every key with `rename`. `Map` iterates in sorted order, so on a
/// collision the key that sorts first wins.
fn rename_keys(map: Map<String, Value>, rename: fn(&str) -> String) -> Map<String, Value> {
    let mut renamed = Map::with_capacity(map.len());
    for (key, value) in map {
        renamed.entry(rename(&key)).or_insert(value);
    }
    renamed
}

/// `"Mentors Available"` -> `mentors_available`,
/// `"numberOfCourses"` -> `number_of_courses`.
pub fn normalize_key(key: &str) -> String {
    snake_words(key).join("_")
}

/// Category spelling drift on top of [`normalize_key`]: list numbering and
/// the `and` in "Scholarships and Grants" are dropped.
///
/// `"1. Scholarships & Grants"` -> `scholarships_grants`.
pub fn category_key(key: &str) -> String {
    let words = snake_words(key);
    let leading_numbers = words
        .iter()
        .take_while(|w| w.chars().all(|c| c.is_ascii_digit()))
        .count();

    words
        .into_iter()
        .skip(leading_numbers)
        .filter(|w| w != "and")
        .collect::<Vec<_>>()
        .join("_")
}

/// Lowercase words split on non-alphanumerics and camelCase boundaries.
fn snake_words(key: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in key.chars() {
        if ch.is_alphanumeric() {
            if ch.is_uppercase() && prev_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
            current.extend(ch.to_lowercase());
        } else {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
}
