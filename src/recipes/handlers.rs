use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    error::{AppError, Result},
    recipes::{
        dto::{Message, RecipeChanged, RecipeDetails, RecipeList, RecipeRequest},
        repo_types::Recipe,
    },
    state::AppState,
};

type RecipeId = std::result::Result<Path<u64>, PathRejection>;
type Body = std::result::Result<Json<RecipeRequest>, JsonRejection>;

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/:id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
}

fn not_found() -> AppError {
    AppError::NotFound("Recipe not found".into())
}

/// An id that is not a number cannot name a stored recipe.
fn recipe_id(id: RecipeId) -> Result<u64> {
    id.map(|Path(id)| id).map_err(|_| not_found())
}

#[instrument(skip(state))]
pub async fn list_recipes(State(state): State<AppState>) -> Json<RecipeList> {
    Json(RecipeList {
        recipes: Recipe::list_all(&state.recipes).await,
    })
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    id: RecipeId,
) -> Result<Json<RecipeDetails>> {
    let id = recipe_id(id)?;
    let recipe = Recipe::find_by_id(&state.recipes, id)
        .await
        .ok_or_else(not_found)?;
    Ok(Json(RecipeDetails { recipe }))
}

#[instrument(skip(state, body))]
pub async fn create_recipe(
    State(state): State<AppState>,
    body: Body,
) -> Result<(StatusCode, Json<RecipeChanged>)> {
    let Json(body) = body?;
    let recipe = Recipe::create(&state.recipes, body.into_new()?).await?;
    info!(recipe_id = recipe.id, "recipe created");
    Ok((
        StatusCode::CREATED,
        Json(RecipeChanged {
            message: "Recipe created successfully",
            recipe,
        }),
    ))
}

#[instrument(skip(state, body))]
pub async fn update_recipe(
    State(state): State<AppState>,
    id: RecipeId,
    body: Body,
) -> Result<Json<RecipeChanged>> {
    let id = recipe_id(id)?;
    let Json(body) = body?;
    let recipe = Recipe::update(&state.recipes, id, body.into_patch()?)
        .await?
        .ok_or_else(not_found)?;
    info!(recipe_id = recipe.id, "recipe updated");
    Ok(Json(RecipeChanged {
        message: "Recipe updated successfully",
        recipe,
    }))
}

#[instrument(skip(state))]
pub async fn delete_recipe(State(state): State<AppState>, id: RecipeId) -> Result<Json<Message>> {
    let id = recipe_id(id)?;
    if !Recipe::delete(&state.recipes, id).await? {
        return Err(not_found());
    }
    info!(recipe_id = id, "recipe deleted");
    Ok(Json(Message {
        message: "Recipe deleted successfully",
    }))
}
