//! Sell and buy endpoints for device listings.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{
    item, serialize_images, BuyQuery, CreateItemRequest, Item, ItemListResponse, ItemResponse,
    ItemStatus, MessageResponse, PurchaseRequest, UpdateItemRequest,
};
use crate::pricing;
use crate::AppState;

use super::auth::AuthUser;
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_label, validate_price_range, validate_weight};

fn validate_create_request(req: &CreateItemRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_label(&req.brand, "Brand") {
        errors.add("brand", &e);
    }
    if let Err(e) = validate_label(&req.model, "Model") {
        errors.add("model", &e);
    }
    if let Err(e) = validate_weight(req.weight) {
        errors.add("weight", &e);
    }

    errors.finish()
}

fn validate_update_request(req: &UpdateItemRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Some(ref brand) = req.brand {
        if let Err(e) = validate_label(brand, "Brand") {
            errors.add("brand", &e);
        }
    }
    if let Some(ref model) = req.model {
        if let Err(e) = validate_label(model, "Model") {
            errors.add("model", &e);
        }
    }
    if let Some(weight) = req.weight {
        if let Err(e) = validate_weight(weight) {
            errors.add("weight", &e);
        }
    }

    errors.finish()
}

fn illegal_transition(current: ItemStatus, next: ItemStatus) -> ApiError {
    ApiError::validation_field(
        "status",
        format!("Cannot move a {} item to {}", current, next),
    )
}

// ---------------------------------------------------------------------------
// Sell surface (owner-scoped)
// ---------------------------------------------------------------------------

/// List all items owned by the caller, any status, newest first
pub async fn list_owned(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let items = item::list_owned(&state.db, &user.id).await?;
    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

/// Create a listing. The price is always derived, never client-supplied.
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    validate_create_request(&request)?;

    let estimated_price = pricing::estimate(request.device_type.as_str(), request.condition.as_str());
    let now = chrono::Utc::now().to_rfc3339();

    let new_item = Item {
        id: Uuid::new_v4().to_string(),
        user_id: user.id,
        device_type: request.device_type.as_str().to_string(),
        brand: request.brand,
        model: request.model,
        condition: request.condition.as_str().to_string(),
        estimated_price,
        weight: request.weight,
        images: serialize_images(&request.images.unwrap_or_default()),
        status: ItemStatus::Pending.as_str().to_string(),
        buyer_id: None,
        created_at: now.clone(),
        updated_at: now,
    };

    item::insert(&state.db, &new_item).await?;

    Ok((StatusCode::CREATED, Json(new_item.into())))
}

/// Fetch one of the caller's listings
pub async fn get_owned(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse>, ApiError> {
    let found = item::find_owned(&state.db, &id, &user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Item not found"))?;
    Ok(Json(found.into()))
}

/// Update one of the caller's listings. The ownership check is the query
/// filter itself; a miss is indistinguishable from a foreign item.
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    validate_update_request(&request)?;

    let mut existing = item::find_owned(&state.db, &id, &user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Item not found"))?;

    let reprice = request.device_type.is_some();

    if let Some(device_type) = request.device_type {
        existing.device_type = device_type.as_str().to_string();
    }
    if let Some(brand) = request.brand {
        existing.brand = brand;
    }
    if let Some(model) = request.model {
        existing.model = model;
    }
    if let Some(condition) = request.condition {
        existing.condition = condition.as_str().to_string();
    }
    if let Some(weight) = request.weight {
        existing.weight = weight;
    }
    if let Some(images) = request.images {
        existing.images = serialize_images(&images);
    }
    if let Some(next) = request.status {
        let current = ItemStatus::parse(&existing.status).unwrap_or(ItemStatus::Pending);
        if !current.can_transition(next) {
            return Err(illegal_transition(current, next));
        }
        existing.status = next.as_str().to_string();
    }

    if reprice {
        existing.estimated_price = pricing::estimate(&existing.device_type, &existing.condition);
    }
    existing.updated_at = chrono::Utc::now().to_rfc3339();

    if !item::update_owned(&state.db, &existing).await? {
        return Err(ApiError::not_found("Item not found"));
    }

    Ok(Json(existing.into()))
}

/// Delete one of the caller's listings
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !item::delete_owned(&state.db, &id, &user.id).await? {
        return Err(ApiError::not_found("Item not found"));
    }
    Ok(Json(MessageResponse::ok("Item deleted")))
}

// ---------------------------------------------------------------------------
// Buy surface (public)
// ---------------------------------------------------------------------------

/// Browse pending listings with filtering and pagination
pub async fn list_buyable(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BuyQuery>,
) -> Result<Json<ItemListResponse>, ApiError> {
    if let Err(e) = validate_price_range(query.min_price, query.max_price) {
        return Err(ApiError::validation_field("minPrice", e));
    }

    let result = item::list_buyable(&state.db, &query).await?;
    Ok(Json(result))
}

/// Fetch a single listing
pub async fn get_buyable(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse>, ApiError> {
    let found = item::find_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Item not found"))?;
    Ok(Json(found.into()))
}

/// Reserve or buy a listing: status transition plus buyer reference
pub async fn purchase_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<PurchaseRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let mut existing = item::find_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Item not found"))?;

    if let Some(next) = request.status {
        let current = ItemStatus::parse(&existing.status).unwrap_or(ItemStatus::Pending);
        if !current.can_transition(next) {
            return Err(illegal_transition(current, next));
        }
        existing.status = next.as_str().to_string();
    }
    if let Some(buyer_id) = request.buyer_id {
        existing.buyer_id = Some(buyer_id);
    }
    existing.updated_at = chrono::Utc::now().to_rfc3339();

    if !item::update_purchase(&state.db, &existing).await? {
        return Err(ApiError::not_found("Item not found"));
    }

    Ok(Json(existing.into()))
}
