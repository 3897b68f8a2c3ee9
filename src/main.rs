//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod audit;
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::{audit::audit_trail, auth::auth_guard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = router(app_state);

    let listener = TcpListener::bind(&config.server_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(app_state: AppState) -> Router {
    // Rotas públicas
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let public_routes = Router::new()
        .route("/plans", get(handlers::subscriptions::list_plans))
        .route(
            "/public/catalogs/{catalog_id}",
            get(handlers::catalogs::get_public_catalog),
        );

    // Rotas protegidas pelo token
    let protected_routes = Router::new()
        .route("/users/me", get(handlers::auth::get_me))
        .route(
            "/businesses",
            post(handlers::businesses::create_business)
                .get(handlers::businesses::list_my_businesses),
        )
        .route(
            "/businesses/{business_id}",
            get(handlers::businesses::get_business)
                .put(handlers::businesses::update_business)
                .delete(handlers::businesses::delete_business),
        )
        .route(
            "/businesses/{business_id}/members",
            get(handlers::members::list_members).post(handlers::members::add_member),
        )
        .route(
            "/businesses/{business_id}/members/{profile_id}",
            delete(handlers::members::remove_member),
        )
        .route(
            "/businesses/{business_id}/members/{profile_id}/role",
            put(handlers::members::update_member_role),
        )
        .route(
            "/businesses/{business_id}/invites",
            post(handlers::invites::create_invite),
        )
        .route("/invites/accept", post(handlers::invites::accept_invite))
        .route(
            "/businesses/{business_id}/subscription",
            get(handlers::subscriptions::get_current_subscription),
        )
        .route(
            "/subscriptions/activate",
            post(handlers::subscriptions::activate_subscription),
        )
        .route(
            "/businesses/{business_id}/catalogs",
            post(handlers::catalogs::create_catalog),
        )
        .route(
            "/catalogs/{catalog_id}",
            put(handlers::catalogs::update_catalog).delete(handlers::catalogs::delete_catalog),
        )
        .route(
            "/businesses/{business_id}/audit-logs",
            get(handlers::audit_logs::list_audit_logs),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let api_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/auth", auth_routes)
        .merge(public_routes)
        .merge(protected_routes);

    // A auditoria envolve tudo: precisa ver o status final da resposta
    let audit = app_state.audit.clone();

    Router::new()
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(axum_middleware::from_fn_with_state(audit, audit_trail))
        .with_state(app_state)
}
