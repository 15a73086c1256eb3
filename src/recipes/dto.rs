use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, Result},
    recipes::repo_types::{lenient_int, NewRecipe, Nutrition, Recipe, RecipePatch},
};

pub const MISSING_FIELDS: &str = "Missing required recipe fields";

/// Body of `POST /recipes` and `PUT /recipes/:id`. Everything is optional
/// here; which fields are required depends on the operation. An `id` in the
/// body is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub time: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub calories: Option<i64>,
    pub nutrition: Option<Nutrition>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

fn required(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.trim().is_empty())
}

/// A supplied text field must not be blank; an absent one is fine.
fn not_blank(field: Option<String>) -> Result<Option<String>> {
    match field {
        Some(v) if v.trim().is_empty() => Err(AppError::Validation(MISSING_FIELDS.into())),
        other => Ok(other),
    }
}

impl RecipeRequest {
    pub fn into_new(self) -> Result<NewRecipe> {
        let (Some(title), Some(description), Some(image)) = (
            required(self.title),
            required(self.description),
            required(self.image),
        ) else {
            return Err(AppError::Validation(MISSING_FIELDS.into()));
        };

        Ok(NewRecipe {
            title,
            description,
            image,
            time: self.time.unwrap_or(0),
            calories: self.calories.unwrap_or(0),
            nutrition: self.nutrition.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            ingredients: self.ingredients.unwrap_or_default(),
        })
    }

    pub fn into_patch(self) -> Result<RecipePatch> {
        Ok(RecipePatch {
            title: not_blank(self.title)?,
            description: not_blank(self.description)?,
            image: not_blank(self.image)?,
            time: self.time,
            calories: self.calories,
            nutrition: self.nutrition,
            tags: self.tags,
            ingredients: self.ingredients,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeList {
    pub recipes: Vec<Recipe>,
}

#[derive(Debug, Serialize)]
pub struct RecipeDetails {
    pub recipe: Recipe,
}

#[derive(Debug, Serialize)]
pub struct RecipeChanged {
    pub message: &'static str,
    pub recipe: Recipe,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}
