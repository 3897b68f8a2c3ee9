pub mod context;
pub use context::AuditContext;
pub mod dispatcher;
pub use dispatcher::AuditDispatcher;
pub mod routes;
