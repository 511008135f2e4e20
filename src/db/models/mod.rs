pub mod common;
pub mod coupon;
pub mod item;
pub mod user;

pub use common::*;
pub use coupon::{
    Coupon, CouponCreator, CouponEnvelope, CouponListResponse, CouponResponse, CouponWithCreator,
    CreateCouponRequest, DeleteCouponRequest, UpdateCouponRequest,
};
pub use item::{
    BuyQuery, CreateItemRequest, Item, ItemListResponse, ItemResponse, PurchaseRequest,
    UpdateItemRequest,
};
pub use user::{AuthResponse, AuthUserBody, LoginRequest, RegisterRequest, User};
