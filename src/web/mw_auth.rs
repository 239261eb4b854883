// src/web/mw_auth.rs
use crate::{error::AppError, models::usuario::UsuarioSessao};
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

/// Chave única sob a qual o snapshot do utilizador vive na sessão.
pub const CHAVE_SESSAO_USUARIO: &str = "usuario";

/// Middleware que verifica se o utilizador está logado.
/// Sem snapshot na sessão: redireciona para /login e mais nada corre.
pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match session.get::<UsuarioSessao>(CHAVE_SESSAO_USUARIO).await {
        Ok(Some(usuario)) => {
            tracing::debug!("Autenticação MW: '{}' autenticado. Prosseguindo...", usuario.username);
            // Disponibiliza o snapshot aos handlers via extensões da requisição
            request.extensions_mut().insert(usuario);
            Ok(next.run(request).await)
        }
        Ok(None) => {
            tracing::debug!("Autenticação MW: não autenticado. Redirecionando para /login");
            Ok(Redirect::to("/login").into_response())
        }
        Err(e) => {
            tracing::error!("Autenticação MW: erro ao ler sessão: {:?}", e);
            Err(AppError::Session(format!("Erro ao verificar sessão: {}", e)))
        }
    }
}
