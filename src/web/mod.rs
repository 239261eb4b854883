// src/web/mod.rs
pub mod admin_handlers;
pub mod auth_handlers;
pub mod conta_handlers;
pub mod mw_admin;
pub mod mw_auth;
pub mod relatorio_handlers;
pub mod routes;

use crate::error::{AppError, AppResult};
use askama::Template;
use axum::response::{Html, IntoResponse, Redirect, Response};

/// Renderiza um template Askama, convertendo falha de render em erro interno.
pub fn renderizar<T: Template>(template: T) -> AppResult<Response> {
    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Falha ao renderizar template: {}", e);
            Err(AppError::Internal)
        }
    }
}

// Redirecionamentos com feedback via query string (padrão Post/Redirect/Get).

pub fn redirect_sucesso(base: &str, msg: &str) -> Redirect {
    Redirect::to(&format!("{}?success={}", base, urlencoding::encode(msg)))
}

pub fn redirect_erro(base: &str, msg: &str) -> Redirect {
    Redirect::to(&format!("{}?error={}", base, urlencoding::encode(msg)))
}
