// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Businesses ---
        handlers::businesses::create_business,
        handlers::businesses::list_my_businesses,
        handlers::businesses::get_business,
        handlers::businesses::update_business,
        handlers::businesses::delete_business,

        // --- Members ---
        handlers::members::list_members,
        handlers::members::add_member,
        handlers::members::update_member_role,
        handlers::members::remove_member,

        // --- Invites ---
        handlers::invites::create_invite,
        handlers::invites::accept_invite,

        // --- Subscriptions ---
        handlers::subscriptions::list_plans,
        handlers::subscriptions::get_current_subscription,
        handlers::subscriptions::activate_subscription,

        // --- Catalogs ---
        handlers::catalogs::create_catalog,
        handlers::catalogs::update_catalog,
        handlers::catalogs::delete_catalog,
        handlers::catalogs::get_public_catalog,

        // --- Audit ---
        handlers::audit_logs::list_audit_logs,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Profile,
            models::auth::RegisterPayload,
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- Businesses ---
            models::business::Business,
            models::business::CreateBusinessPayload,
            models::business::UpdateBusinessPayload,

            // --- Members ---
            models::membership::Role,
            models::membership::Membership,
            models::membership::AddMemberPayload,
            models::membership::UpdateRolePayload,

            // --- Invites ---
            models::invite::InviteStatus,
            models::invite::Invite,
            models::invite::CreateInvitePayload,
            models::invite::AcceptInvitePayload,

            // --- Subscriptions ---
            models::subscription::SubscriptionStatus,
            models::subscription::Plan,
            models::subscription::Subscription,
            models::subscription::SubscriptionWithPlan,
            models::subscription::ActivateSubscriptionPayload,

            // --- Catalogs ---
            models::catalog::Catalog,
            models::catalog::CreateCatalogPayload,
            models::catalog::UpdateCatalogPayload,

            // --- Audit ---
            models::audit::AuditLog,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Perfil"),
        (name = "Businesses", description = "Gestão de Negócios"),
        (name = "Members", description = "Membros, Cargos e Dono"),
        (name = "Invites", description = "Convites para o Negócio"),
        (name = "Subscriptions", description = "Planos e Assinaturas"),
        (name = "Catalogs", description = "Catálogos do Negócio"),
        (name = "Audit", description = "Trilha de Auditoria")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
