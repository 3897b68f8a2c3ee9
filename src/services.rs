pub mod audit_log_service;
pub mod auth;
pub mod business_service;
pub mod catalog_service;
pub mod invite_service;
pub mod membership_guard;
pub mod membership_service;
pub mod owner_invariant;
pub mod permissions;
pub mod subscription_service;
