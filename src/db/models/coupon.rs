//! Coupon models, derived-status recomputation and store queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::common::{CouponStatus, DiscountType};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Coupon {
    pub id: String,
    pub code: String,
    pub discount_type: String,
    pub discount_value: f64,
    pub min_purchase_amount: f64,
    pub max_discount_amount: Option<f64>,
    pub start_date: String,
    pub expiration_date: String,
    pub usage_limit: i64,
    pub current_usage_count: i64,
    pub status: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Coupon row joined with its creator's identity
#[derive(Debug, Clone, FromRow)]
pub struct CouponWithCreator {
    pub id: String,
    pub code: String,
    pub discount_type: String,
    pub discount_value: f64,
    pub min_purchase_amount: f64,
    pub max_discount_amount: Option<f64>,
    pub start_date: String,
    pub expiration_date: String,
    pub usage_limit: i64,
    pub current_usage_count: i64,
    pub status: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
    pub creator_name: Option<String>,
    pub creator_email: Option<String>,
}

/// Creator identity resolved into coupon listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponCreator {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Wire representation of a coupon (camelCase)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponResponse {
    pub id: String,
    pub code: String,
    pub discount_type: String,
    pub discount_value: f64,
    pub min_purchase_amount: f64,
    pub max_discount_amount: Option<f64>,
    pub start_date: String,
    pub expiration_date: String,
    pub usage_limit: i64,
    pub current_usage_count: i64,
    pub status: String,
    pub created_by: Option<CouponCreator>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Coupon> for CouponResponse {
    fn from(coupon: Coupon) -> Self {
        Self {
            id: coupon.id,
            code: coupon.code,
            discount_type: coupon.discount_type,
            discount_value: coupon.discount_value,
            min_purchase_amount: coupon.min_purchase_amount,
            max_discount_amount: coupon.max_discount_amount,
            start_date: coupon.start_date,
            expiration_date: coupon.expiration_date,
            usage_limit: coupon.usage_limit,
            current_usage_count: coupon.current_usage_count,
            status: coupon.status,
            created_by: None,
            created_at: coupon.created_at,
            updated_at: coupon.updated_at,
        }
    }
}

impl From<CouponWithCreator> for CouponResponse {
    fn from(row: CouponWithCreator) -> Self {
        let created_by = match (row.creator_name, row.creator_email) {
            (Some(name), Some(email)) => Some(CouponCreator {
                id: row.created_by.clone(),
                name,
                email,
            }),
            _ => None,
        };
        Self {
            id: row.id,
            code: row.code,
            discount_type: row.discount_type,
            discount_value: row.discount_value,
            min_purchase_amount: row.min_purchase_amount,
            max_discount_amount: row.max_discount_amount,
            start_date: row.start_date,
            expiration_date: row.expiration_date,
            usage_limit: row.usage_limit,
            current_usage_count: row.current_usage_count,
            status: row.status,
            created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateCouponRequest {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub min_purchase_amount: Option<f64>,
    pub max_discount_amount: Option<f64>,
    pub start_date: Option<String>,
    pub expiration_date: String,
    pub usage_limit: Option<i64>,
    /// active (default) or disabled; expired is always derived
    pub status: Option<CouponStatus>,
}

/// Update takes the id in the body, not the path
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateCouponRequest {
    pub id: String,
    pub code: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<f64>,
    pub min_purchase_amount: Option<f64>,
    pub max_discount_amount: Option<f64>,
    pub start_date: Option<String>,
    pub expiration_date: Option<String>,
    pub usage_limit: Option<i64>,
    pub current_usage_count: Option<i64>,
    pub status: Option<CouponStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteCouponRequest {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct CouponListResponse {
    pub success: bool,
    pub coupons: Vec<CouponResponse>,
}

#[derive(Debug, Serialize)]
pub struct CouponEnvelope {
    pub success: bool,
    pub coupon: CouponResponse,
}

/// Case-normalize a coupon code for storage and duplicate checks
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn parse_expiration(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Recompute the derived status ahead of any write. Expiry wins over
/// everything: a past expiration date or an exhausted usage limit forces
/// "expired" no matter what was stored or requested.
pub fn effective_status(
    requested: CouponStatus,
    expiration_date: &str,
    current_usage_count: i64,
    usage_limit: i64,
    now: DateTime<Utc>,
) -> CouponStatus {
    let expired_by_date = parse_expiration(expiration_date)
        .map(|exp| now > exp)
        .unwrap_or(false);
    if expired_by_date || current_usage_count >= usage_limit {
        return CouponStatus::Expired;
    }
    requested
}

pub async fn insert(db: &SqlitePool, coupon: &Coupon) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO coupons (
            id, code, discount_type, discount_value, min_purchase_amount,
            max_discount_amount, start_date, expiration_date, usage_limit,
            current_usage_count, status, created_by, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&coupon.id)
    .bind(&coupon.code)
    .bind(&coupon.discount_type)
    .bind(coupon.discount_value)
    .bind(coupon.min_purchase_amount)
    .bind(coupon.max_discount_amount)
    .bind(&coupon.start_date)
    .bind(&coupon.expiration_date)
    .bind(coupon.usage_limit)
    .bind(coupon.current_usage_count)
    .bind(&coupon.status)
    .bind(&coupon.created_by)
    .bind(&coupon.created_at)
    .bind(&coupon.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn update(db: &SqlitePool, coupon: &Coupon) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE coupons SET
            code = ?, discount_type = ?, discount_value = ?,
            min_purchase_amount = ?, max_discount_amount = ?, start_date = ?,
            expiration_date = ?, usage_limit = ?, current_usage_count = ?,
            status = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&coupon.code)
    .bind(&coupon.discount_type)
    .bind(coupon.discount_value)
    .bind(coupon.min_purchase_amount)
    .bind(coupon.max_discount_amount)
    .bind(&coupon.start_date)
    .bind(&coupon.expiration_date)
    .bind(coupon.usage_limit)
    .bind(coupon.current_usage_count)
    .bind(&coupon.status)
    .bind(&coupon.updated_at)
    .bind(&coupon.id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn find_by_id(db: &SqlitePool, id: &str) -> Result<Option<Coupon>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM coupons WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Duplicate check against the normalized code
pub async fn find_by_code(db: &SqlitePool, code: &str) -> Result<Option<Coupon>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM coupons WHERE code = ?")
        .bind(code)
        .fetch_optional(db)
        .await
}

pub async fn delete(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM coupons WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// All coupons, newest first, with creator identity resolved
pub async fn list_with_creator(db: &SqlitePool) -> Result<Vec<CouponWithCreator>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT c.*, u.name AS creator_name, u.email AS creator_email
        FROM coupons c
        LEFT JOIN users u ON u.id = c.created_by
        ORDER BY c.created_at DESC
        "#,
    )
    .fetch_all(db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_past_expiration_forces_expired() {
        let status = effective_status(
            CouponStatus::Active,
            "2026-01-01T00:00:00+00:00",
            0,
            100,
            at(2026, 6, 1),
        );
        assert_eq!(status, CouponStatus::Expired);
    }

    #[test]
    fn test_exhausted_usage_forces_expired() {
        let status = effective_status(
            CouponStatus::Active,
            "2027-01-01T00:00:00+00:00",
            100,
            100,
            at(2026, 6, 1),
        );
        assert_eq!(status, CouponStatus::Expired);
    }

    #[test]
    fn test_valid_coupon_keeps_requested_status() {
        let now = at(2026, 6, 1);
        let exp = "2027-01-01T00:00:00+00:00";
        assert_eq!(
            effective_status(CouponStatus::Active, exp, 5, 100, now),
            CouponStatus::Active
        );
        assert_eq!(
            effective_status(CouponStatus::Disabled, exp, 5, 100, now),
            CouponStatus::Disabled
        );
    }

    #[test]
    fn test_disabled_coupon_still_expires() {
        let status = effective_status(
            CouponStatus::Disabled,
            "2026-01-01T00:00:00+00:00",
            0,
            100,
            at(2026, 6, 1),
        );
        assert_eq!(status, CouponStatus::Expired);
    }

    #[test]
    fn test_code_normalization() {
        assert_eq!(normalize_code("  summer25 "), "SUMMER25");
        assert_eq!(normalize_code("EARTH-DAY"), "EARTH-DAY");
    }
}
