// src/web/admin_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::usuario::UsuarioSessao,
    services::{acesso, user_service},
    state::AppState,
    templates::{AdminEditUserPage, AdminUsersPage, UsuarioComCategorias},
    web::{self, redirect_erro, redirect_sucesso},
};
// Form do axum-extra: suporta múltiplos valores com a mesma chave
// (checkboxes de categorias)
use axum::{
    extract::{Extension, Path, Query, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::Form;
use serde::Deserialize;

const PAGINA_USERS: &str = "/admin/users";

// --- Structs para os formulários ---

#[derive(Deserialize, Debug)]
pub struct CreateUserForm {
    username: String,
    password: String,
    confirm_password: String,
    #[serde(default)]
    is_admin: bool,
    #[serde(default)]
    categorias: Vec<String>,
}

#[derive(Deserialize, Debug)]
pub struct EditUserForm {
    username: String,
    #[serde(default)]
    is_admin: bool,
    #[serde(default)]
    categorias: Vec<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChangePasswordForm {
    user_id: i64,
    new_password: String,
    confirm_password: String,
}

#[derive(Deserialize, Debug)]
pub struct FeedbackParams {
    success: Option<String>,
    error: Option<String>,
}

// --- Handlers ---

/// GET /admin/users - página de gestão de utilizadores.
pub async fn show_admin_users_page(
    State(state): State<AppState>,
    Extension(usuario): Extension<UsuarioSessao>,
    Query(params): Query<FeedbackParams>,
) -> AppResult<impl IntoResponse> {
    tracing::debug!("GET /admin/users: carregando página de gestão...");

    let usuarios = user_service::listar_usuarios(&state.db_pool).await?;

    // Anexa o conjunto de categorias de cada utilizador
    let mut usuarios_com_categorias = Vec::with_capacity(usuarios.len());
    for u in usuarios {
        let categorias = user_service::obter_categorias(&state.db_pool, u.id).await?;
        usuarios_com_categorias.push(UsuarioComCategorias {
            id: u.id,
            username: u.username,
            is_admin: u.is_admin,
            criado_em: u.criado_em,
            categorias,
        });
    }

    web::renderizar(AdminUsersPage {
        usuario,
        usuarios: usuarios_com_categorias,
        todas_categorias: acesso::CATEGORIAS_PADRAO,
        success_message: params.success,
        error_message: params.error,
    })
}

/// POST /admin/users/create
pub async fn handle_create_user(
    State(state): State<AppState>,
    Form(form): Form<CreateUserForm>,
) -> AppResult<Redirect> {
    tracing::info!("POST /admin/users/create: tentando criar '{}'", form.username);

    if form.password != form.confirm_password {
        return Ok(redirect_erro(PAGINA_USERS, &AppError::PasswordMismatch.to_string()));
    }

    let categorias = if form.is_admin {
        None
    } else {
        Some(form.categorias.as_slice())
    };

    match user_service::criar_usuario(
        &state.db_pool,
        &form.username,
        &form.password,
        form.is_admin,
        categorias,
    )
    .await
    {
        Ok(_) => Ok(redirect_sucesso(
            PAGINA_USERS,
            &format!("Usuário '{}' criado com sucesso.", form.username.trim()),
        )),
        Err(
            e @ (AppError::DuplicateUsername | AppError::WeakPassword | AppError::MissingField(_)),
        ) => Ok(redirect_erro(PAGINA_USERS, &e.to_string())),
        Err(e) => Err(e),
    }
}

/// GET /admin/users/edit/{id} - formulário de edição.
pub async fn show_edit_user_form(
    State(state): State<AppState>,
    Extension(usuario): Extension<UsuarioSessao>,
    Path(user_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let alvo = user_service::buscar_usuario_por_id(&state.db_pool, user_id).await?;

    let Some(alvo) = alvo else {
        tracing::warn!("Tentativa de editar utilizador inexistente: {}", user_id);
        return web::renderizar(AdminEditUserPage {
            usuario,
            alvo: None,
            categorias_atuais: &[],
            todas_categorias: acesso::CATEGORIAS_PADRAO,
            error_message: Some(format!("Usuário {} não encontrado.", user_id)),
        });
    };

    let categorias_atuais = user_service::obter_categorias(&state.db_pool, user_id).await?;

    web::renderizar(AdminEditUserPage {
        usuario,
        alvo: Some(&alvo),
        categorias_atuais: &categorias_atuais,
        todas_categorias: acesso::CATEGORIAS_PADRAO,
        error_message: None,
    })
}

/// POST /admin/users/edit/{id}
pub async fn handle_edit_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Form(form): Form<EditUserForm>,
) -> AppResult<Redirect> {
    tracing::info!("POST /admin/users/edit/{}: atualizando utilizador", user_id);

    match user_service::atualizar_usuario(
        &state.db_pool,
        user_id,
        &form.username,
        form.is_admin,
        &form.categorias,
    )
    .await
    {
        Ok(()) => Ok(redirect_sucesso(
            PAGINA_USERS,
            &format!("Usuário '{}' atualizado com sucesso.", form.username.trim()),
        )),
        Err(
            e @ (AppError::DuplicateUsername | AppError::NotFound | AppError::MissingField(_)),
        ) => Ok(redirect_erro(PAGINA_USERS, &e.to_string())),
        Err(e) => Err(e),
    }
}

/// POST /admin/users/change_password - troca de senha por um admin.
pub async fn handle_change_password(
    State(state): State<AppState>,
    Form(form): Form<ChangePasswordForm>,
) -> AppResult<Redirect> {
    tracing::info!("POST /admin/users/change_password: user id {}", form.user_id);

    if form.new_password != form.confirm_password {
        return Ok(redirect_erro(PAGINA_USERS, &AppError::PasswordMismatch.to_string()));
    }

    match user_service::atualizar_senha(&state.db_pool, form.user_id, &form.new_password).await {
        Ok(()) => Ok(redirect_sucesso(PAGINA_USERS, "Senha alterada com sucesso.")),
        Err(e @ (AppError::WeakPassword | AppError::NotFound)) => {
            Ok(redirect_erro(PAGINA_USERS, &e.to_string()))
        }
        Err(e) => Err(e),
    }
}

/// POST /admin/users/delete/{id} - exclusão soft; o admin semente é intocável.
pub async fn handle_delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Redirect> {
    match user_service::excluir_usuario(&state.db_pool, user_id).await {
        Ok(()) => Ok(redirect_sucesso(PAGINA_USERS, "Usuário excluído.")),
        Err(e @ (AppError::Forbidden | AppError::NotFound)) => {
            Ok(redirect_erro(PAGINA_USERS, &e.to_string()))
        }
        Err(e) => Err(e),
    }
}
