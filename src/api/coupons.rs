//! Admin coupon management endpoints.
//!
//! Update and delete take the coupon id in the request body rather than the
//! path. The derived status is recomputed immediately before every write.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{
    coupon, Coupon, CouponEnvelope, CouponListResponse, CouponResponse, CouponStatus,
    CreateCouponRequest, DeleteCouponRequest, MessageResponse, UpdateCouponRequest,
};
use crate::AppState;

use super::auth::AuthUser;
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{
    validate_amount, validate_coupon_code, validate_date, validate_discount, validate_usage_limit,
    validate_uuid,
};

fn validate_create_request(req: &CreateCouponRequest, code: &str) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_coupon_code(code) {
        errors.add("code", &e);
    }
    if let Err(e) = validate_discount(req.discount_type, req.discount_value) {
        errors.add("discountValue", &e);
    }
    if let Some(min) = req.min_purchase_amount {
        if let Err(e) = validate_amount(min, "minPurchaseAmount") {
            errors.add("minPurchaseAmount", &e);
        }
    }
    if let Some(max) = req.max_discount_amount {
        if let Err(e) = validate_amount(max, "maxDiscountAmount") {
            errors.add("maxDiscountAmount", &e);
        }
    }
    if let Some(ref start) = req.start_date {
        if let Err(e) = validate_date(start, "startDate") {
            errors.add("startDate", &e);
        }
    }
    if let Err(e) = validate_date(&req.expiration_date, "expirationDate") {
        errors.add("expirationDate", &e);
    }
    if let Some(limit) = req.usage_limit {
        if let Err(e) = validate_usage_limit(limit) {
            errors.add("usageLimit", &e);
        }
    }

    errors.finish()
}

/// Create a coupon. The creator is the authenticated admin.
pub async fn create_coupon(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<CreateCouponRequest>,
) -> Result<(StatusCode, Json<CouponEnvelope>), ApiError> {
    let code = coupon::normalize_code(&request.code);
    validate_create_request(&request, &code)?;

    if coupon::find_by_code(&state.db, &code).await?.is_some() {
        return Err(ApiError::conflict("Coupon code already exists"));
    }

    let now = chrono::Utc::now();
    let usage_limit = request.usage_limit.unwrap_or(100);
    let requested = request.status.unwrap_or(CouponStatus::Active);
    let status = coupon::effective_status(requested, &request.expiration_date, 0, usage_limit, now);

    let new_coupon = Coupon {
        id: Uuid::new_v4().to_string(),
        code,
        discount_type: request.discount_type.as_str().to_string(),
        discount_value: request.discount_value,
        min_purchase_amount: request.min_purchase_amount.unwrap_or(0.0),
        max_discount_amount: request.max_discount_amount,
        start_date: request.start_date.unwrap_or_else(|| now.to_rfc3339()),
        expiration_date: request.expiration_date,
        usage_limit,
        current_usage_count: 0,
        status: status.as_str().to_string(),
        created_by: user.id,
        created_at: now.to_rfc3339(),
        updated_at: now.to_rfc3339(),
    };

    coupon::insert(&state.db, &new_coupon).await.map_err(|e| {
        tracing::error!("Failed to create coupon: {}", e);
        match e {
            sqlx::Error::Database(ref db_err)
                if db_err.message().contains("UNIQUE constraint failed") =>
            {
                ApiError::conflict("Coupon code already exists")
            }
            _ => ApiError::database("Failed to create coupon"),
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(CouponEnvelope {
            success: true,
            coupon: new_coupon.into(),
        }),
    ))
}

/// List all coupons with creator identity resolved
pub async fn list_coupons(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CouponListResponse>, ApiError> {
    let rows = coupon::list_with_creator(&state.db).await?;
    Ok(Json(CouponListResponse {
        success: true,
        coupons: rows.into_iter().map(CouponResponse::from).collect(),
    }))
}

fn validate_update_request(req: &UpdateCouponRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Some(min) = req.min_purchase_amount {
        if let Err(e) = validate_amount(min, "minPurchaseAmount") {
            errors.add("minPurchaseAmount", &e);
        }
    }
    if let Some(max) = req.max_discount_amount {
        if let Err(e) = validate_amount(max, "maxDiscountAmount") {
            errors.add("maxDiscountAmount", &e);
        }
    }
    if let Some(ref start) = req.start_date {
        if let Err(e) = validate_date(start, "startDate") {
            errors.add("startDate", &e);
        }
    }
    if let Some(ref expiration) = req.expiration_date {
        if let Err(e) = validate_date(expiration, "expirationDate") {
            errors.add("expirationDate", &e);
        }
    }
    if let Some(limit) = req.usage_limit {
        if let Err(e) = validate_usage_limit(limit) {
            errors.add("usageLimit", &e);
        }
    }
    if let Some(count) = req.current_usage_count {
        if count < 0 {
            errors.add("currentUsageCount", "Usage count must be non-negative");
        }
    }

    errors.finish()
}

/// Update a coupon; the id travels in the body
pub async fn update_coupon(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateCouponRequest>,
) -> Result<Json<CouponEnvelope>, ApiError> {
    if let Err(e) = validate_uuid(&request.id, "id") {
        return Err(ApiError::validation_field("id", e));
    }
    validate_update_request(&request)?;

    let mut existing = coupon::find_by_id(&state.db, &request.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Coupon not found"))?;

    if let Some(ref raw_code) = request.code {
        let code = coupon::normalize_code(raw_code);
        if let Err(e) = validate_coupon_code(&code) {
            return Err(ApiError::validation_field("code", e));
        }
        if code != existing.code && coupon::find_by_code(&state.db, &code).await?.is_some() {
            return Err(ApiError::conflict("Coupon code already exists"));
        }
        existing.code = code;
    }
    if let Some(discount_type) = request.discount_type {
        existing.discount_type = discount_type.as_str().to_string();
    }
    if let Some(value) = request.discount_value {
        existing.discount_value = value;
    }
    if let Some(min) = request.min_purchase_amount {
        existing.min_purchase_amount = min;
    }
    if let Some(max) = request.max_discount_amount {
        existing.max_discount_amount = Some(max);
    }
    if let Some(start) = request.start_date {
        existing.start_date = start;
    }
    if let Some(expiration) = request.expiration_date {
        existing.expiration_date = expiration;
    }
    if let Some(limit) = request.usage_limit {
        existing.usage_limit = limit;
    }
    if let Some(count) = request.current_usage_count {
        existing.current_usage_count = count;
    }

    // Validate the merged discount combination
    let is_percentage = existing.discount_type == crate::db::DiscountType::Percentage.as_str();
    if is_percentage && existing.discount_value > 100.0 {
        return Err(ApiError::validation_field(
            "discountValue",
            "Percentage discount cannot exceed 100",
        ));
    }
    if existing.discount_value < 0.0 {
        return Err(ApiError::validation_field(
            "discountValue",
            "Discount value must be non-negative",
        ));
    }

    // Derived-status recomputation runs on every write
    let requested = request
        .status
        .or_else(|| CouponStatus::parse(&existing.status))
        .unwrap_or(CouponStatus::Active);
    let now = chrono::Utc::now();
    existing.status = coupon::effective_status(
        requested,
        &existing.expiration_date,
        existing.current_usage_count,
        existing.usage_limit,
        now,
    )
    .as_str()
    .to_string();
    existing.updated_at = now.to_rfc3339();

    if !coupon::update(&state.db, &existing).await? {
        return Err(ApiError::not_found("Coupon not found"));
    }

    Ok(Json(CouponEnvelope {
        success: true,
        coupon: existing.into(),
    }))
}

/// Delete a coupon; the id travels in the body
pub async fn delete_coupon(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DeleteCouponRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if let Err(e) = validate_uuid(&request.id, "id") {
        return Err(ApiError::validation_field("id", e));
    }
    if !coupon::delete(&state.db, &request.id).await? {
        return Err(ApiError::not_found("Coupon not found"));
    }
    Ok(Json(MessageResponse::ok("Coupon deleted successfully")))
}
