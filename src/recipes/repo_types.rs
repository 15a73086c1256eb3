use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Nutrition {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Recipe record as stored in `recipes.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub image: String,
    #[serde(default, deserialize_with = "int_or_zero")]
    pub time: i64, // minutes
    #[serde(default, deserialize_with = "int_or_zero")]
    pub calories: i64,
    #[serde(default)]
    pub nutrition: Nutrition,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default = "unknown_creation", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

/// Records written before `createdAt` was tracked.
fn unknown_creation() -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH
}

/// HTML forms post numbers as strings, so both `30` and `"30"` are accepted.
/// `null` and `""` mean "not given".
pub(crate) fn lenient_int<'de, D>(d: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| de::Error::custom("expected an integer")),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected an integer, got {s:?}"))),
        Some(other) => Err(de::Error::custom(format!("expected an integer, got {other}"))),
    }
}

fn int_or_zero<'de, D>(d: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_int(d).map(Option::unwrap_or_default)
}

/// Top-level shape of `recipes.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipesDocument {
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

/// Client-supplied fields of a recipe about to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub title: String,
    pub description: String,
    pub image: String,
    pub time: i64,
    pub calories: i64,
    pub nutrition: Nutrition,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
}

/// Fields to overwrite on an existing recipe. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub time: Option<i64>,
    pub calories: Option<i64>,
    pub nutrition: Option<Nutrition>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

impl RecipePatch {
    pub fn apply(self, recipe: &mut Recipe) {
        if let Some(v) = self.title {
            recipe.title = v;
        }
        if let Some(v) = self.description {
            recipe.description = v;
        }
        if let Some(v) = self.image {
            recipe.image = v;
        }
        if let Some(v) = self.time {
            recipe.time = v;
        }
        if let Some(v) = self.calories {
            recipe.calories = v;
        }
        if let Some(v) = self.nutrition {
            recipe.nutrition = v;
        }
        if let Some(v) = self.tags {
            recipe.tags = v;
        }
        if let Some(v) = self.ingredients {
            recipe.ingredients = v;
        }
    }
}
