// src/services/auth_service.rs
use crate::{
    error::{AppError, AppResult},
    models::usuario::{Usuario, UsuarioSessao},
    services::{acesso, user_service},
};
use sqlx::SqlitePool;

/// Verifica se a senha fornecida corresponde ao hash guardado.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Verificando hash bcrypt...");
        bcrypt::verify(&password, &stored_hash)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (verify_password): {:?}", e);
        AppError::Internal
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao verificar senha: {:?}", e);
        AppError::PasswordHash
    })
}

/// Gera um hash bcrypt para uma senha.
pub async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Gerando hash bcrypt...");
        bcrypt::hash(&password, bcrypt::DEFAULT_COST)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (hash_password): {:?}", e);
        AppError::Internal
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao gerar hash: {:?}", e);
        AppError::PasswordHash
    })
}

/// Autentica um utilizador ativo por username + senha.
/// Retorna None tanto para username inexistente como para senha errada:
/// o chamador nunca consegue distinguir os dois casos.
pub async fn autenticar(
    db_pool: &SqlitePool,
    username: &str,
    password: &str,
) -> AppResult<Option<UsuarioSessao>> {
    let usuario: Option<Usuario> = sqlx::query_as(
        r#"
        SELECT id, username, password_hash, is_admin, criado_em
        FROM usuarios
        WHERE username = ?1 AND ativo = 1
        "#,
    )
    .bind(username)
    .fetch_optional(db_pool)
    .await?;

    let Some(usuario) = usuario else {
        tracing::debug!("Autenticação falhou: utilizador desconhecido ou inativo.");
        return Ok(None);
    };

    if !verify_password(password, &usuario.password_hash).await? {
        tracing::debug!("Autenticação falhou: senha incorreta para '{}'.", username);
        return Ok(None);
    }

    // Monta o snapshot de sessão. Admins veem todas as categorias,
    // independentemente do que estiver guardado.
    let categorias = if usuario.is_admin {
        acesso::CATEGORIAS_PADRAO.iter().map(|c| c.to_string()).collect()
    } else {
        user_service::obter_categorias(db_pool, usuario.id).await?
    };

    Ok(Some(UsuarioSessao {
        id: usuario.id,
        username: usuario.username,
        is_admin: usuario.is_admin,
        categorias,
    }))
}
