//! Common types shared across models.

use serde::{Deserialize, Serialize};

/// Account role carried in identity tokens
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Parse a stored/claimed role string; anything unrecognized is None
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device categories accepted for listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceType {
    Smartphone,
    Laptop,
    Tablet,
    Desktop,
    Other,
    ElectricalWire,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Smartphone => "smartphone",
            DeviceType::Laptop => "laptop",
            DeviceType::Tablet => "tablet",
            DeviceType::Desktop => "desktop",
            DeviceType::Other => "other",
            DeviceType::ElectricalWire => "electrical-wire",
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical condition grades for listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Good,
    Fair,
    Poor,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::Good => "good",
            Condition::Fair => "fair",
            Condition::Poor => "poor",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing lifecycle: pending -> listed -> sold, or removed (terminal)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Listed,
    Sold,
    Removed,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Listed => "listed",
            ItemStatus::Sold => "sold",
            ItemStatus::Removed => "removed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ItemStatus::Pending),
            "listed" => Some(ItemStatus::Listed),
            "sold" => Some(ItemStatus::Sold),
            "removed" => Some(ItemStatus::Removed),
            _ => None,
        }
    }

    /// Whether a stored status may move to `next`. Sold and removed are terminal.
    pub fn can_transition(&self, next: ItemStatus) -> bool {
        if *self == next {
            return true;
        }
        match self {
            ItemStatus::Pending => matches!(
                next,
                ItemStatus::Listed | ItemStatus::Sold | ItemStatus::Removed
            ),
            ItemStatus::Listed => matches!(next, ItemStatus::Sold | ItemStatus::Removed),
            ItemStatus::Sold | ItemStatus::Removed => false,
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coupon discount kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }
}

impl std::fmt::Display for DiscountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coupon lifecycle states
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CouponStatus {
    Active,
    Expired,
    Disabled,
}

impl CouponStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouponStatus::Active => "active",
            CouponStatus::Expired => "expired",
            CouponStatus::Disabled => "disabled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(CouponStatus::Active),
            "expired" => Some(CouponStatus::Expired),
            "disabled" => Some(CouponStatus::Disabled),
            _ => None,
        }
    }
}

impl std::fmt::Display for CouponStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Helper to parse an images JSON array from the database
pub fn parse_images(json: &str) -> Vec<String> {
    serde_json::from_str(json).unwrap_or_default()
}

/// Helper to serialize image references to JSON for the database
pub fn serialize_images(images: &[String]) -> String {
    serde_json::to_string(images).unwrap_or_else(|_| "[]".to_string())
}

/// Generic success envelope for delete/logout style responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_exact() {
        assert_eq!(Role::parse("user"), Some(Role::User));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        // Substrings of valid roles must not parse
        assert_eq!(Role::parse("use"), None);
        assert_eq!(Role::parse("user,admin"), None);
        assert_eq!(Role::parse("Admin"), None);
    }

    #[test]
    fn test_device_type_wire_names() {
        let dt: DeviceType = serde_json::from_str("\"electrical-wire\"").unwrap();
        assert_eq!(dt, DeviceType::ElectricalWire);
        assert_eq!(serde_json::to_string(&DeviceType::Smartphone).unwrap(), "\"smartphone\"");
        assert!(serde_json::from_str::<DeviceType>("\"toaster\"").is_err());
    }

    #[test]
    fn test_item_status_transitions() {
        assert!(ItemStatus::Pending.can_transition(ItemStatus::Listed));
        assert!(ItemStatus::Pending.can_transition(ItemStatus::Sold));
        assert!(ItemStatus::Pending.can_transition(ItemStatus::Removed));
        assert!(ItemStatus::Listed.can_transition(ItemStatus::Sold));
        assert!(!ItemStatus::Listed.can_transition(ItemStatus::Pending));
        assert!(!ItemStatus::Sold.can_transition(ItemStatus::Listed));
        assert!(!ItemStatus::Removed.can_transition(ItemStatus::Pending));
        // No-op transitions are fine
        assert!(ItemStatus::Sold.can_transition(ItemStatus::Sold));
    }

    #[test]
    fn test_images_round_trip() {
        let images = vec!["a.jpg".to_string(), "b.jpg".to_string()];
        let json = serialize_images(&images);
        assert_eq!(parse_images(&json), images);
        assert!(parse_images("not json").is_empty());
        assert!(parse_images("[]").is_empty());
    }
}
