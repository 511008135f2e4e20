//! Listing models and store queries for sell/buy items.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::common::{parse_images, Condition, DeviceType, ItemStatus};

/// A device listing as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: String,
    pub user_id: String,
    pub device_type: String,
    pub brand: String,
    pub model: String,
    pub condition: String,
    pub estimated_price: i64,
    pub weight: f64,
    /// JSON array of image references
    pub images: String,
    pub status: String,
    pub buyer_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Wire representation of a listing (camelCase, images as an array)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: String,
    pub user_id: String,
    pub device_type: String,
    pub brand: String,
    pub model: String,
    pub condition: String,
    pub estimated_price: i64,
    pub weight: f64,
    pub images: Vec<String>,
    pub status: String,
    pub buyer_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            user_id: item.user_id,
            device_type: item.device_type,
            brand: item.brand,
            model: item.model,
            condition: item.condition,
            estimated_price: item.estimated_price,
            weight: item.weight,
            images: parse_images(&item.images),
            status: item.status,
            buyer_id: item.buyer_id,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateItemRequest {
    pub device_type: DeviceType,
    pub brand: String,
    pub model: String,
    pub condition: Condition,
    pub weight: f64,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateItemRequest {
    pub device_type: Option<DeviceType>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub condition: Option<Condition>,
    pub weight: Option<f64>,
    pub images: Option<Vec<String>>,
    pub status: Option<ItemStatus>,
}

/// Buy-side update: reserve/purchase a listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PurchaseRequest {
    pub status: Option<ItemStatus>,
    pub buyer_id: Option<String>,
}

/// Query parameters for browsing buyable listings
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BuyQuery {
    pub device_type: Option<DeviceType>,
    pub condition: Option<Condition>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<i64>,
    /// Items per page (defaults to 12, max 100)
    pub limit: Option<i64>,
}

/// Response for browsing buyable listings with pagination
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemListResponse {
    pub items: Vec<ItemResponse>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

const DEFAULT_MAX_PRICE: f64 = 1_000_000.0;

pub async fn insert(db: &SqlitePool, item: &Item) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO items (
            id, user_id, device_type, brand, model, condition,
            estimated_price, weight, images, status, buyer_id,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item.id)
    .bind(&item.user_id)
    .bind(&item.device_type)
    .bind(&item.brand)
    .bind(&item.model)
    .bind(&item.condition)
    .bind(item.estimated_price)
    .bind(item.weight)
    .bind(&item.images)
    .bind(&item.status)
    .bind(&item.buyer_id)
    .bind(&item.created_at)
    .bind(&item.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

/// All listings owned by a user, any status, newest first
pub async fn list_owned(db: &SqlitePool, user_id: &str) -> Result<Vec<Item>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM items WHERE user_id = ? ORDER BY created_at DESC")
        .bind(user_id)
        .fetch_all(db)
        .await
}

/// Fetch a listing through the ownership-scoped filter. A miss does not
/// distinguish "not owned" from "does not exist".
pub async fn find_owned(
    db: &SqlitePool,
    id: &str,
    user_id: &str,
) -> Result<Option<Item>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM items WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
}

pub async fn find_by_id(db: &SqlitePool, id: &str) -> Result<Option<Item>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM items WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Persist updated fields, still scoped by owner. Returns false on a miss.
pub async fn update_owned(db: &SqlitePool, item: &Item) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE items SET
            device_type = ?, brand = ?, model = ?, condition = ?,
            estimated_price = ?, weight = ?, images = ?, status = ?,
            updated_at = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(&item.device_type)
    .bind(&item.brand)
    .bind(&item.model)
    .bind(&item.condition)
    .bind(item.estimated_price)
    .bind(item.weight)
    .bind(&item.images)
    .bind(&item.status)
    .bind(&item.updated_at)
    .bind(&item.id)
    .bind(&item.user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Buy-side status/buyer update, not owner-scoped
pub async fn update_purchase(db: &SqlitePool, item: &Item) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE items SET status = ?, buyer_id = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&item.status)
    .bind(&item.buyer_id)
    .bind(&item.updated_at)
    .bind(&item.id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Ownership-scoped hard delete. Returns false on a miss.
pub async fn delete_owned(db: &SqlitePool, id: &str, user_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM items WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Browse pending listings with filtering and pagination
pub async fn list_buyable(
    db: &SqlitePool,
    query: &BuyQuery,
) -> Result<ItemListResponse, sqlx::Error> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(12).clamp(1, 100);
    let offset = (page - 1) * limit;

    let min_price = query.min_price.unwrap_or(0.0);
    let max_price = query.max_price.unwrap_or(DEFAULT_MAX_PRICE);

    // Price bound is inclusive; only pending listings are buyable
    let mut conditions = vec![
        "status = ?".to_string(),
        "estimated_price >= ?".to_string(),
        "estimated_price <= ?".to_string(),
    ];

    if query.device_type.is_some() {
        conditions.push("device_type = ?".to_string());
    }
    if query.condition.is_some() {
        conditions.push("condition = ?".to_string());
    }

    let search_pattern = query
        .search
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s));
    if search_pattern.is_some() {
        conditions.push(
            "(brand LIKE ? OR model LIKE ? OR device_type LIKE ? OR condition LIKE ?)"
                .to_string(),
        );
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));

    let count_sql = format!("SELECT COUNT(*) FROM items {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql)
        .bind(ItemStatus::Pending.as_str())
        .bind(min_price)
        .bind(max_price);
    if let Some(device_type) = query.device_type {
        count_query = count_query.bind(device_type.as_str());
    }
    if let Some(condition) = query.condition {
        count_query = count_query.bind(condition.as_str());
    }
    if let Some(pattern) = &search_pattern {
        count_query = count_query
            .bind(pattern)
            .bind(pattern)
            .bind(pattern)
            .bind(pattern);
    }
    let total = count_query.fetch_one(db).await?;

    let sql = format!(
        "SELECT * FROM items {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        where_clause
    );
    let mut select_query = sqlx::query_as::<_, Item>(&sql)
        .bind(ItemStatus::Pending.as_str())
        .bind(min_price)
        .bind(max_price);
    if let Some(device_type) = query.device_type {
        select_query = select_query.bind(device_type.as_str());
    }
    if let Some(condition) = query.condition {
        select_query = select_query.bind(condition.as_str());
    }
    if let Some(pattern) = &search_pattern {
        select_query = select_query
            .bind(pattern)
            .bind(pattern)
            .bind(pattern)
            .bind(pattern);
    }
    select_query = select_query.bind(limit).bind(offset);

    let items = select_query.fetch_all(db).await?;

    let total_pages = (total as f64 / limit as f64).ceil() as i64;

    Ok(ItemListResponse {
        items: items.into_iter().map(ItemResponse::from).collect(),
        total,
        page,
        total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_memory;

    async fn seed_user(db: &SqlitePool, id: &str) {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
             VALUES (?, ?, ?, 'x', 'user', '2026-01-01T00:00:00+00:00', '2026-01-01T00:00:00+00:00')",
        )
        .bind(id)
        .bind(format!("user-{id}"))
        .bind(format!("{id}@example.com"))
        .execute(db)
        .await
        .unwrap();
    }

    fn item(id: &str, user_id: &str, price: i64, status: &str, day: u8) -> Item {
        Item {
            id: id.to_string(),
            user_id: user_id.to_string(),
            device_type: "smartphone".to_string(),
            brand: "Nokia".to_string(),
            model: "3310".to_string(),
            condition: "good".to_string(),
            estimated_price: price,
            weight: 0.2,
            images: "[]".to_string(),
            status: status.to_string(),
            buyer_id: None,
            created_at: format!("2026-01-{day:02}T00:00:00+00:00"),
            updated_at: format!("2026-01-{day:02}T00:00:00+00:00"),
        }
    }

    #[tokio::test]
    async fn test_list_buyable_price_range_and_pagination() {
        let db = connect_memory().await;
        seed_user(&db, "u1").await;

        insert(&db, &item("i1", "u1", 40, "pending", 1)).await.unwrap();
        insert(&db, &item("i2", "u1", 50, "pending", 2)).await.unwrap();
        insert(&db, &item("i3", "u1", 75, "pending", 3)).await.unwrap();
        insert(&db, &item("i4", "u1", 100, "pending", 4)).await.unwrap();
        insert(&db, &item("i5", "u1", 120, "pending", 5)).await.unwrap();
        // In range but not pending, must never appear
        insert(&db, &item("i6", "u1", 60, "sold", 6)).await.unwrap();

        let query = BuyQuery {
            min_price: Some(50.0),
            max_price: Some(100.0),
            page: Some(1),
            limit: Some(2),
            ..Default::default()
        };
        let result = list_buyable(&db, &query).await.unwrap();

        assert_eq!(result.total, 3);
        assert_eq!(result.total_pages, 2);
        assert_eq!(result.page, 1);
        assert_eq!(result.items.len(), 2);
        for item in &result.items {
            assert_eq!(item.status, "pending");
            assert!(item.estimated_price >= 50 && item.estimated_price <= 100);
        }
        // Newest first
        assert_eq!(result.items[0].id, "i4");
        assert_eq!(result.items[1].id, "i3");

        let page2 = list_buyable(
            &db,
            &BuyQuery {
                page: Some(2),
                ..query
            },
        )
        .await
        .unwrap();
        assert_eq!(page2.items.len(), 1);
        assert_eq!(page2.items[0].id, "i2");
    }

    #[tokio::test]
    async fn test_list_buyable_search_is_case_insensitive() {
        let db = connect_memory().await;
        seed_user(&db, "u1").await;

        let mut laptop = item("i1", "u1", 200, "pending", 1);
        laptop.device_type = "laptop".to_string();
        laptop.brand = "ThinkPad".to_string();
        laptop.model = "X220".to_string();
        insert(&db, &laptop).await.unwrap();
        insert(&db, &item("i2", "u1", 80, "pending", 2)).await.unwrap();

        let result = list_buyable(
            &db,
            &BuyQuery {
                search: Some("thinkpad".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].id, "i1");

        // Search also covers the device type column
        let by_type = list_buyable(
            &db,
            &BuyQuery {
                search: Some("LAPTOP".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(by_type.total, 1);
    }

    #[tokio::test]
    async fn test_ownership_scoped_lookup_and_update() {
        let db = connect_memory().await;
        seed_user(&db, "alice").await;
        seed_user(&db, "bob").await;

        insert(&db, &item("i1", "alice", 80, "pending", 1)).await.unwrap();

        // Bob cannot see Alice's listing through the scoped filter
        assert!(find_owned(&db, "i1", "bob").await.unwrap().is_none());
        assert!(find_owned(&db, "i1", "alice").await.unwrap().is_some());

        // A scoped update by the wrong owner touches nothing
        let mut hijack = item("i1", "bob", 1, "pending", 1);
        hijack.brand = "Evil".to_string();
        assert!(!update_owned(&db, &hijack).await.unwrap());

        let unchanged = find_by_id(&db, "i1").await.unwrap().unwrap();
        assert_eq!(unchanged.brand, "Nokia");
        assert_eq!(unchanged.estimated_price, 80);

        // Delete is scoped the same way
        assert!(!delete_owned(&db, "i1", "bob").await.unwrap());
        assert!(delete_owned(&db, "i1", "alice").await.unwrap());
        assert!(find_by_id(&db, "i1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_owned_returns_all_statuses() {
        let db = connect_memory().await;
        seed_user(&db, "alice").await;

        insert(&db, &item("i1", "alice", 80, "pending", 1)).await.unwrap();
        insert(&db, &item("i2", "alice", 90, "sold", 2)).await.unwrap();
        insert(&db, &item("i3", "alice", 70, "removed", 3)).await.unwrap();

        let items = list_owned(&db, "alice").await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].id, "i3");
        assert_eq!(items[2].id, "i1");
    }
}
