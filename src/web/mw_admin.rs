// src/web/mw_admin.rs
use crate::{error::AppError, models::usuario::UsuarioSessao};
use axum::{extract::Extension, extract::Request, middleware::Next, response::Response};

/// Middleware que exige a flag de admin do snapshot de sessão.
/// Deve correr *depois* de `require_auth`.
pub async fn require_admin(
    Extension(usuario): Extension<UsuarioSessao>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if usuario.is_admin {
        tracing::debug!("Admin MW: acesso concedido para '{}'", usuario.username);
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Admin MW: acesso negado para '{}' (não é admin).", usuario.username);
        Err(AppError::AccessDenied)
    }
}
