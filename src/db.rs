pub mod profile_repo;
pub use profile_repo::ProfileRepository;
pub mod business_repo;
pub use business_repo::{BusinessRepository, PgBusinessRepository};
pub mod membership_repo;
pub use membership_repo::{MembershipRepository, PgMembershipRepository};
pub mod invite_repo;
pub use invite_repo::{InviteRepository, PgInviteRepository};
pub mod subscription_repo;
pub use subscription_repo::{PgSubscriptionRepository, SubscriptionRepository};
pub mod catalog_repo;
pub use catalog_repo::{CatalogRepository, PgCatalogRepository};
pub mod audit_repo;
pub use audit_repo::{AuditRepository, PgAuditRepository};

#[cfg(test)]
pub mod memory;
