// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::usuario::{LoginForm, UsuarioSessao},
    services::auth_service,
    state::AppState,
    templates::LoginPage,
    web::{self, mw_auth::CHAVE_SESSAO_USUARIO},
};
use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect},
};
use tower_sessions::Session;

// GET /login
pub async fn show_login_form(session: Session) -> AppResult<impl IntoResponse> {
    // Já logado? Vai direto para o dashboard.
    if session
        .get::<UsuarioSessao>(CHAVE_SESSAO_USUARIO)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        tracing::debug!("GET /login: utilizador já logado, redirecionando para /dashboard");
        return Ok(Redirect::to("/dashboard").into_response());
    }

    web::renderizar(LoginPage { error: None })
}

// POST /login
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<impl IntoResponse> {
    tracing::info!("Tentativa de login para: {}", form.username);

    if form.username.trim().is_empty() || form.password.is_empty() {
        return web::renderizar(LoginPage {
            error: Some("Preencha todos os campos.".to_string()),
        });
    }

    match auth_service::autenticar(&state.db_pool, &form.username, &form.password).await? {
        Some(usuario) => {
            // Novo ID de sessão antes de guardar o snapshot (fixação de sessão)
            session
                .cycle_id()
                .await
                .map_err(|e| AppError::Session(format!("Falha ao rodar ID: {}", e)))?;
            session
                .insert(CHAVE_SESSAO_USUARIO, &usuario)
                .await
                .map_err(|e| AppError::Session(format!("Falha ao inserir na sessão: {}", e)))?;

            tracing::info!("✅ Login bem-sucedido para: {}", usuario.username);
            Ok(Redirect::to("/dashboard").into_response())
        }
        None => {
            // Mensagem única para username inexistente e senha errada
            tracing::warn!("Login falhou para: {}", form.username);
            web::renderizar(LoginPage {
                error: Some(AppError::InvalidCredentials.to_string()),
            })
        }
    }
}

// GET /logout
pub async fn handle_logout(session: Session) -> AppResult<Redirect> {
    let usuario: Option<UsuarioSessao> =
        session.get(CHAVE_SESSAO_USUARIO).await.ok().flatten();

    // Apaga a sessão inteira (snapshot + quaisquer marcadores de fluxo)
    session
        .delete()
        .await
        .map_err(|e| AppError::Session(format!("Falha ao apagar sessão: {}", e)))?;

    if let Some(u) = usuario {
        tracing::info!("🚪 Utilizador '{}' desligado.", u.username);
    } else {
        tracing::info!("🚪 Sessão anónima desligada.");
    }

    Ok(Redirect::to("/login"))
}
