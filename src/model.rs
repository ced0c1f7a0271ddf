use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::parser::ParsedRecipeFields;

/// Recipe category offered by the add-recipe form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Simple,
    Baking,
    Traditional,
    Dessert,
    Appetizer,
    #[serde(rename = "main course")]
    MainCourse,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Simple,
        Category::Baking,
        Category::Traditional,
        Category::Dessert,
        Category::Appetizer,
        Category::MainCourse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Simple => "simple",
            Category::Baking => "baking",
            Category::Traditional => "traditional",
            Category::Dessert => "dessert",
            Category::Appetizer => "appetizer",
            Category::MainCourse => "main course",
        }
    }
}

/// Cuisine of origin offered by the add-recipe form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    Korean,
    Thai,
    Malaysian,
    Italian,
    Chinese,
    Indian,
    Mexican,
    Japanese,
    American,
    French,
}

impl Country {
    pub const ALL: [Country; 10] = [
        Country::Korean,
        Country::Thai,
        Country::Malaysian,
        Country::Italian,
        Country::Chinese,
        Country::Indian,
        Country::Mexican,
        Country::Japanese,
        Country::American,
        Country::French,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Country::Korean => "Korean",
            Country::Thai => "Thai",
            Country::Malaysian => "Malaysian",
            Country::Italian => "Italian",
            Country::Chinese => "Chinese",
            Country::Indian => "Indian",
            Country::Mexican => "Mexican",
            Country::Japanese => "Japanese",
            Country::American => "American",
            Country::French => "French",
        }
    }
}

/// Returned when a string names no known category or country
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown option: {0}")]
pub struct UnknownOption(pub String);

impl FromStr for Category {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownOption(s.to_string()))
    }
}

impl FromStr for Country {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Country::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownOption(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a draft cannot be turned into a stored recipe
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("Please fill in all required fields")]
    MissingFields,

    #[error("Please add at least one ingredient and one step")]
    MissingRows,
}

/// In-progress recipe form state.
///
/// Every edit consumes the draft and returns the next one, so a caller
/// always holds a complete value. `ingredients` and `steps` never become
/// empty: the form keeps one input row rendered at all times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub title: String,
    pub category: Option<Category>,
    pub country: Option<Country>,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub video_url: Option<String>,
}

impl Default for RecipeDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            category: None,
            country: None,
            ingredients: vec![String::new()],
            steps: vec![String::new()],
            video_url: None,
        }
    }
}

impl RecipeDraft {
    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self
        }
    }

    pub fn with_category(self, category: Option<Category>) -> Self {
        Self { category, ..self }
    }

    pub fn with_country(self, country: Option<Country>) -> Self {
        Self { country, ..self }
    }

    /// Stores the URL field value; an empty string clears it
    pub fn with_video_url(self, url: &str) -> Self {
        Self {
            video_url: (!url.is_empty()).then(|| url.to_string()),
            ..self
        }
    }

    pub fn add_ingredient(self) -> Self {
        Self {
            ingredients: push_row(self.ingredients),
            ..self
        }
    }

    pub fn remove_ingredient(self, index: usize) -> Self {
        Self {
            ingredients: remove_row(self.ingredients, index),
            ..self
        }
    }

    pub fn update_ingredient(self, index: usize, value: impl Into<String>) -> Self {
        Self {
            ingredients: update_row(self.ingredients, index, value.into()),
            ..self
        }
    }

    pub fn add_step(self) -> Self {
        Self {
            steps: push_row(self.steps),
            ..self
        }
    }

    pub fn remove_step(self, index: usize) -> Self {
        Self {
            steps: remove_row(self.steps, index),
            ..self
        }
    }

    pub fn update_step(self, index: usize, value: impl Into<String>) -> Self {
        Self {
            steps: update_row(self.steps, index, value.into()),
            ..self
        }
    }

    /// Applies extracted fields. Present values overwrite unconditionally;
    /// a category or country that names no known option is ignored.
    pub fn merge(self, fields: &ParsedRecipeFields) -> Self {
        Self {
            title: fields.title.clone().unwrap_or(self.title),
            category: fields
                .category
                .as_deref()
                .and_then(|c| c.parse().ok())
                .or(self.category),
            country: fields
                .country
                .as_deref()
                .and_then(|c| c.parse().ok())
                .or(self.country),
            ingredients: fields.ingredients.clone().unwrap_or(self.ingredients),
            steps: fields.steps.clone().unwrap_or(self.steps),
            video_url: self.video_url,
        }
    }

    /// Blanks what extraction fills in, as happens when the URL field is cleared.
    /// Category and country are user choices and survive.
    pub fn cleared(self) -> Self {
        let blank = Self::default();
        Self {
            title: blank.title,
            ingredients: blank.ingredients,
            steps: blank.steps,
            video_url: None,
            ..self
        }
    }

    pub fn valid_ingredients(&self) -> Vec<String> {
        non_blank(&self.ingredients)
    }

    pub fn valid_steps(&self) -> Vec<String> {
        non_blank(&self.steps)
    }

    /// Validates the draft and builds the row persisted for `user_id`
    pub fn to_record(&self, user_id: &str) -> Result<RecipeRecord, DraftError> {
        let (Some(category), Some(country)) = (self.category, self.country) else {
            return Err(DraftError::MissingFields);
        };
        if self.title.trim().is_empty() {
            return Err(DraftError::MissingFields);
        }

        let ingredients = self.valid_ingredients();
        let steps = self.valid_steps();
        if ingredients.is_empty() || steps.is_empty() {
            return Err(DraftError::MissingRows);
        }

        Ok(RecipeRecord {
            title: self.title.clone(),
            ingredients,
            steps,
            category,
            country,
            video_url: self.video_url.clone(),
            created_by: user_id.to_string(),
        })
    }
}

fn push_row(mut rows: Vec<String>) -> Vec<String> {
    rows.push(String::new());
    rows
}

fn remove_row(mut rows: Vec<String>, index: usize) -> Vec<String> {
    if rows.len() > 1 && index < rows.len() {
        rows.remove(index);
    }
    rows
}

fn update_row(mut rows: Vec<String>, index: usize, value: String) -> Vec<String> {
    if let Some(row) = rows.get_mut(index) {
        *row = value;
    }
    rows
}

fn non_blank(rows: &[String]) -> Vec<String> {
    rows.iter()
        .filter(|row| !row.trim().is_empty())
        .cloned()
        .collect()
}

/// Recipe row as written to the hosted `recipes` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeRecord {
    pub title: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub category: Category,
    pub country: Country,
    pub video_url: Option<String>,
    pub created_by: String,
}

/// What the relay hands back to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Upstream reply: decoded JSON, or the raw text when it was not JSON
    #[serde(default)]
    pub response: Value,
    pub original_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}
