//! Menu handlers.
//!
//! Reads are public and served from the Redis menu cache when one is
//! available. Writes are admin only and invalidate that cache.

use axum::{
    extract::{Extension, Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use domain::{CreateMenuItem, MenuItem, UpdateMenuItem};

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::errors::AppResult;
use crate::types::{Created, NoContent};
use crate::utils::{validate_amount, validate_not_blank};

/// New menu item
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMenuItemRequest {
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Chicken Karahi")]
    pub name: String,
    #[schema(example = "Wok-cooked chicken in tomato and ginger")]
    pub description: String,
    #[validate(custom(function = "validate_amount"))]
    #[schema(example = "24.99")]
    pub price: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    #[schema(example = 780)]
    pub calories: i32,
    /// Protein in grams
    #[validate(range(min = 0, message = "must not be negative"))]
    #[schema(example = 52)]
    pub protein: i32,
    #[validate(url(message = "must be a URL"))]
    pub image: String,
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Curries")]
    pub category: String,
}

impl From<CreateMenuItemRequest> for CreateMenuItem {
    fn from(req: CreateMenuItemRequest) -> Self {
        CreateMenuItem {
            name: req.name.trim().to_string(),
            description: req.description,
            price: req.price,
            calories: req.calories,
            protein: req.protein,
            image: req.image,
            category: req.category.trim().to_string(),
        }
    }
}

/// Partial menu item update
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMenuItemRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_amount"))]
    pub price: Option<String>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub calories: Option<i32>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub protein: Option<i32>,
    #[validate(url(message = "must be a URL"))]
    pub image: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub category: Option<String>,
}

impl From<UpdateMenuItemRequest> for UpdateMenuItem {
    fn from(req: UpdateMenuItemRequest) -> Self {
        UpdateMenuItem {
            name: req.name.map(|n| n.trim().to_string()),
            description: req.description,
            price: req.price,
            calories: req.calories,
            protein: req.protein,
            image: req.image,
            category: req.category.map(|c| c.trim().to_string()),
        }
    }
}

/// Public menu routes
pub fn menu_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_menu_items))
        .route("/:id", get(get_menu_item))
}

/// Admin menu routes (require a resolved caller)
pub fn menu_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_menu_item))
        .route(
            "/:id",
            axum::routing::put(update_menu_item).delete(delete_menu_item),
        )
}

async fn invalidate_menu_cache(state: &AppState) {
    if let Some(cache) = &state.cache {
        if let Err(e) = cache.invalidate_menu().await {
            tracing::warn!(error = %e, "Failed to invalidate menu cache");
        }
    }
}

/// List the whole menu
#[utoipa::path(
    get,
    path = "/menu",
    tag = "Menu",
    responses(
        (status = 200, description = "All menu items", body = Vec<MenuItem>)
    )
)]
pub async fn list_menu_items(State(state): State<AppState>) -> AppResult<Json<Vec<MenuItem>>> {
    if let Some(cache) = &state.cache {
        match cache.get_menu().await {
            Ok(Some(items)) => return Ok(Json(items)),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Menu cache read failed, using database"),
        }
    }

    let items = state.services.menu().list_items().await?;

    if let Some(cache) = &state.cache {
        if let Err(e) = cache.set_menu(&items).await {
            tracing::warn!(error = %e, "Failed to cache menu");
        }
    }

    Ok(Json(items))
}

/// Get one menu item
#[utoipa::path(
    get,
    path = "/menu/{id}",
    tag = "Menu",
    params(
        ("id" = Uuid, Path, description = "Menu item ID")
    ),
    responses(
        (status = 200, description = "Menu item", body = MenuItem),
        (status = 404, description = "Menu item not found")
    )
)]
pub async fn get_menu_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MenuItem>> {
    let item = state.services.menu().get_item(id).await?;
    Ok(Json(item))
}

/// Add a menu item (admin only)
#[utoipa::path(
    post,
    path = "/menu",
    tag = "Menu",
    security(("user_id" = [])),
    request_body = CreateMenuItemRequest,
    responses(
        (status = 201, description = "Menu item created", body = MenuItem),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unknown caller"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn create_menu_item(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateMenuItemRequest>,
) -> AppResult<Created<MenuItem>> {
    require_admin(&current_user)?;

    let item = state.services.menu().create_item(payload.into()).await?;
    invalidate_menu_cache(&state).await;

    Ok(Created(item))
}

/// Update a menu item (admin only)
#[utoipa::path(
    put,
    path = "/menu/{id}",
    tag = "Menu",
    security(("user_id" = [])),
    params(
        ("id" = Uuid, Path, description = "Menu item ID")
    ),
    request_body = UpdateMenuItemRequest,
    responses(
        (status = 200, description = "Menu item updated", body = MenuItem),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unknown caller"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Menu item not found")
    )
)]
pub async fn update_menu_item(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateMenuItemRequest>,
) -> AppResult<Json<MenuItem>> {
    require_admin(&current_user)?;

    let item = state
        .services
        .menu()
        .update_item(id, payload.into())
        .await?;
    invalidate_menu_cache(&state).await;

    Ok(Json(item))
}

/// Delete a menu item (admin only)
#[utoipa::path(
    delete,
    path = "/menu/{id}",
    tag = "Menu",
    security(("user_id" = [])),
    params(
        ("id" = Uuid, Path, description = "Menu item ID")
    ),
    responses(
        (status = 204, description = "Menu item deleted"),
        (status = 401, description = "Unknown caller"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Menu item not found")
    )
)]
pub async fn delete_menu_item(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&current_user)?;

    state.services.menu().delete_item(id).await?;
    invalidate_menu_cache(&state).await;

    Ok(NoContent)
}
