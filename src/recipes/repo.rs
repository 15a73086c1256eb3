use time::OffsetDateTime;

use crate::{
    error::{AppError, Result},
    recipes::repo_types::{NewRecipe, Recipe, RecipePatch, RecipesDocument},
    storage::Collection,
};

pub type Recipes = Collection<RecipesDocument>;

fn not_found() -> AppError {
    AppError::NotFound("Recipe not found".into())
}

impl Recipe {
    /// All recipes in insertion order.
    pub async fn list_all(recipes: &Recipes) -> Vec<Recipe> {
        recipes.read().await.recipes
    }

    pub async fn find_by_id(recipes: &Recipes, id: u64) -> Option<Recipe> {
        recipes.read().await.recipes.into_iter().find(|r| r.id == id)
    }

    pub async fn create(recipes: &Recipes, new: NewRecipe) -> Result<Recipe> {
        recipes
            .mutate(move |doc| {
                let recipe = Recipe {
                    id: doc.recipes.iter().map(|r| r.id).max().unwrap_or(0) + 1,
                    title: new.title,
                    description: new.description,
                    image: new.image,
                    time: new.time,
                    calories: new.calories,
                    nutrition: new.nutrition,
                    tags: new.tags,
                    ingredients: new.ingredients,
                    created_at: OffsetDateTime::now_utc(),
                    updated_at: None,
                };
                doc.recipes.push(recipe.clone());
                Ok(recipe)
            })
            .await
    }

    /// Merges `patch` onto the stored recipe. `id` and `createdAt` never change.
    pub async fn update(recipes: &Recipes, id: u64, patch: RecipePatch) -> Result<Option<Recipe>> {
        let res = recipes
            .mutate(move |doc| {
                let recipe = doc
                    .recipes
                    .iter_mut()
                    .find(|r| r.id == id)
                    .ok_or_else(not_found)?;
                patch.apply(recipe);
                recipe.updated_at = Some(OffsetDateTime::now_utc());
                Ok(recipe.clone())
            })
            .await;

        match res {
            Ok(recipe) => Ok(Some(recipe)),
            Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Returns `false`, without writing, when no recipe has this id.
    pub async fn delete(recipes: &Recipes, id: u64) -> Result<bool> {
        let res = recipes
            .mutate(move |doc| {
                let idx = doc
                    .recipes
                    .iter()
                    .position(|r| r.id == id)
                    .ok_or_else(not_found)?;
                doc.recipes.remove(idx);
                Ok(())
            })
            .await;

        match res {
            Ok(()) => Ok(true),
            Err(AppError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
