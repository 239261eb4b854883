// src/web/conta_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::usuario::UsuarioSessao,
    services::{auth_service, user_service},
    state::AppState,
    templates::ContaPage,
    web::{self, redirect_erro, redirect_sucesso},
};
use axum::{
    extract::{Extension, Form, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct FeedbackParams {
    pub success: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct AlterarSenhaForm {
    pub senha_atual: String,
    pub nova_senha: String,
    pub confirmar_senha: String,
}

/// GET /conta - perfil do utilizador logado.
pub async fn show_conta_page(
    Extension(usuario): Extension<UsuarioSessao>,
    Query(params): Query<FeedbackParams>,
) -> AppResult<impl IntoResponse> {
    web::renderizar(ContaPage {
        usuario,
        success_message: params.success,
        error_message: params.error,
    })
}

/// POST /conta/senha - alteração da própria senha (exige a senha atual).
pub async fn handle_alterar_senha(
    State(state): State<AppState>,
    Extension(usuario): Extension<UsuarioSessao>,
    Form(form): Form<AlterarSenhaForm>,
) -> AppResult<Redirect> {
    if form.senha_atual.is_empty() || form.nova_senha.is_empty() || form.confirmar_senha.is_empty()
    {
        return Ok(redirect_erro("/conta", "Preencha todos os campos."));
    }

    if form.nova_senha != form.confirmar_senha {
        return Ok(redirect_erro("/conta", &AppError::PasswordMismatch.to_string()));
    }

    // Confirma a identidade com a senha atual antes de trocar
    if auth_service::autenticar(&state.db_pool, &usuario.username, &form.senha_atual)
        .await?
        .is_none()
    {
        tracing::warn!("'{}' errou a senha atual ao tentar alterá-la.", usuario.username);
        return Ok(redirect_erro("/conta", "Senha atual incorreta."));
    }

    match user_service::atualizar_senha(&state.db_pool, usuario.id, &form.nova_senha).await {
        Ok(()) => Ok(redirect_sucesso("/conta", "Senha alterada com sucesso.")),
        Err(e @ AppError::WeakPassword) => Ok(redirect_erro("/conta", &e.to_string())),
        Err(e) => Err(e),
    }
}
