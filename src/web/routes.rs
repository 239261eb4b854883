// src/web/routes.rs
use crate::{
    state::AppState,
    web::{admin_handlers, auth_handlers, conta_handlers, mw_admin, mw_auth, relatorio_handlers},
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {
    // --- Rotas públicas ---
    let public_routes = Router::new()
        .route("/login", get(auth_handlers::show_login_form).post(auth_handlers::handle_login))
        .route("/logout", get(auth_handlers::handle_logout))
        .route("/", get(|| async { axum::response::Redirect::permanent("/login") }));

    // --- Rotas de admin ---
    // Exigem login E flag de admin
    let admin_routes = Router::new()
        .route("/users", get(admin_handlers::show_admin_users_page))
        .route("/users/create", post(admin_handlers::handle_create_user))
        .route("/users/change_password", post(admin_handlers::handle_change_password))
        .route(
            "/users/edit/{id}",
            get(admin_handlers::show_edit_user_form).post(admin_handlers::handle_edit_user),
        )
        .route("/users/delete/{id}", post(admin_handlers::handle_delete_user))
        // Apenas mw_admin aqui (mw_auth é aplicado no router pai)
        .route_layer(middleware::from_fn(mw_admin::require_admin));

    // --- Rotas autenticadas ---
    let authenticated_routes = Router::new()
        .route("/dashboard", get(relatorio_handlers::dashboard))
        .route(
            "/relatorios/novo",
            get(relatorio_handlers::show_novo_form).post(relatorio_handlers::handle_criar),
        )
        .route(
            "/relatorios/editar/{id}",
            get(relatorio_handlers::show_editar_form).post(relatorio_handlers::handle_editar),
        )
        .route("/relatorios/excluir/{id}", post(relatorio_handlers::handle_excluir))
        .route("/relatorios/abrir/{id}", get(relatorio_handlers::handle_abrir))
        .route("/conta", get(conta_handlers::show_conta_page))
        .route("/conta/senha", post(conta_handlers::handle_alterar_senha))
        // Aninha as rotas de admin sob /admin
        .nest("/admin", admin_routes)
        // require_auth cobre TODAS as rotas acima (incluindo /admin/*)
        .route_layer(middleware::from_fn(mw_auth::require_auth));

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .with_state(app_state)
}
