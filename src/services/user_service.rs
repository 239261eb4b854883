// src/services/user_service.rs
use crate::{
    error::{AppError, AppResult},
    models::usuario::Usuario,
    services::{acesso, auth_service},
};
use sqlx::SqlitePool;

/// Conta de administrador semente, protegida contra exclusão.
pub const ADMIN_USERNAME: &str = "admin";

/// Comprimento mínimo de senha.
pub const SENHA_MIN_CHARS: usize = 6;

fn validar_senha(senha: &str) -> AppResult<()> {
    if senha.chars().count() < SENHA_MIN_CHARS {
        return Err(AppError::WeakPassword);
    }
    Ok(())
}

/// Cria um utilizador. A senha só existe em claro até ser hasheada aqui.
/// Categorias omitidas: admins recebem a lista completa, não-admins 'Geral'.
pub async fn criar_usuario(
    db_pool: &SqlitePool,
    username: &str,
    raw_password: &str,
    is_admin: bool,
    categorias: Option<&[String]>,
) -> AppResult<i64> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::MissingField("username"));
    }
    validar_senha(raw_password)?;

    tracing::info!("Tentando criar utilizador: {}", username);
    let password_hash = auth_service::hash_password(raw_password).await?;

    // Transação: o utilizador e o seu conjunto de categorias entram
    // juntos ou não entram.
    let mut tx = db_pool.begin().await?;

    let insert_result = sqlx::query(
        r#"
        INSERT INTO usuarios (username, password_hash, is_admin)
        VALUES (?1, ?2, ?3)
        "#,
    )
    .bind(username)
    .bind(&password_hash)
    .bind(is_admin)
    .execute(&mut *tx)
    .await;

    let user_id = match insert_result {
        Ok(result) => result.last_insert_rowid(),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            tracing::warn!("Falha ao criar user: username '{}' já existe.", username);
            tx.rollback().await?;
            return Err(AppError::DuplicateUsername);
        }
        Err(e) => {
            tx.rollback().await?;
            return Err(e.into());
        }
    };

    for categoria in acesso::normalizar_categorias(is_admin, categorias) {
        sqlx::query("INSERT INTO usuario_categorias (user_id, categoria) VALUES (?1, ?2)")
            .bind(user_id)
            .bind(&categoria)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    tracing::info!("✅ Utilizador '{}' criado com sucesso (id {}).", username, user_id);
    Ok(user_id)
}

/// Busca um utilizador ativo pelo seu ID.
pub async fn buscar_usuario_por_id(db_pool: &SqlitePool, user_id: i64) -> AppResult<Option<Usuario>> {
    let usuario = sqlx::query_as(
        r#"
        SELECT id, username, password_hash, is_admin, criado_em
        FROM usuarios
        WHERE id = ?1 AND ativo = 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?;
    Ok(usuario)
}

/// Busca todos os utilizadores ativos, mais recentes primeiro.
pub async fn listar_usuarios(db_pool: &SqlitePool) -> AppResult<Vec<Usuario>> {
    tracing::debug!("Buscando todos os utilizadores...");
    let usuarios = sqlx::query_as(
        r#"
        SELECT id, username, password_hash, is_admin, criado_em
        FROM usuarios
        WHERE ativo = 1
        ORDER BY criado_em DESC, id DESC
        "#,
    )
    .fetch_all(db_pool)
    .await?;
    Ok(usuarios)
}

/// Conjunto de categorias permitidas de um utilizador.
pub async fn obter_categorias(db_pool: &SqlitePool, user_id: i64) -> AppResult<Vec<String>> {
    let categorias = sqlx::query_scalar(
        "SELECT categoria FROM usuario_categorias WHERE user_id = ?1 ORDER BY categoria ASC",
    )
    .bind(user_id)
    .fetch_all(db_pool)
    .await?;
    Ok(categorias)
}

/// Atualiza username, flag de admin e conjunto de categorias.
/// Renomear para um username existente falha com DuplicateUsername e
/// deixa o registo intacto.
pub async fn atualizar_usuario(
    db_pool: &SqlitePool,
    user_id: i64,
    username: &str,
    is_admin: bool,
    categorias: &[String],
) -> AppResult<()> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::MissingField("username"));
    }

    tracing::info!("Atualizando dados para user id {}", user_id);
    let mut tx = db_pool.begin().await?;

    let update_result = sqlx::query(
        r#"
        UPDATE usuarios SET username = ?1, is_admin = ?2
        WHERE id = ?3 AND ativo = 1
        "#,
    )
    .bind(username)
    .bind(is_admin)
    .bind(user_id)
    .execute(&mut *tx)
    .await;

    match update_result {
        Ok(result) if result.rows_affected() == 0 => {
            tx.rollback().await?;
            tracing::warn!("Falha ao atualizar: utilizador id {} não encontrado.", user_id);
            return Err(AppError::NotFound);
        }
        Ok(_) => {}
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            tx.rollback().await?;
            tracing::warn!("Falha ao renomear para '{}': username já existe.", username);
            return Err(AppError::DuplicateUsername);
        }
        Err(e) => {
            tx.rollback().await?;
            return Err(e.into());
        }
    }

    // Substitui o conjunto de categorias por inteiro.
    sqlx::query("DELETE FROM usuario_categorias WHERE user_id = ?1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    for categoria in acesso::normalizar_categorias(is_admin, Some(categorias)) {
        sqlx::query("INSERT INTO usuario_categorias (user_id, categoria) VALUES (?1, ?2)")
            .bind(user_id)
            .bind(&categoria)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    tracing::info!("✅ Utilizador id {} atualizado.", user_id);
    Ok(())
}

/// Substitui a senha por um novo hash. Senhas curtas falham com
/// WeakPassword sem tocar no hash guardado.
pub async fn atualizar_senha(
    db_pool: &SqlitePool,
    user_id: i64,
    new_raw_password: &str,
) -> AppResult<()> {
    validar_senha(new_raw_password)?;

    tracing::info!("Alterando senha para user id {}", user_id);
    let new_password_hash = auth_service::hash_password(new_raw_password).await?;

    let rows_affected = sqlx::query(
        "UPDATE usuarios SET password_hash = ?1 WHERE id = ?2 AND ativo = 1",
    )
    .bind(&new_password_hash)
    .bind(user_id)
    .execute(db_pool)
    .await?
    .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Falha ao alterar senha: utilizador id {} não encontrado.", user_id);
        Err(AppError::NotFound)
    } else {
        tracing::info!("✅ Senha alterada com sucesso para user id {}", user_id);
        Ok(())
    }
}

/// Exclusão soft (ativo = 0). O administrador semente nunca pode ser
/// excluído, independentemente de quem pede.
pub async fn excluir_usuario(db_pool: &SqlitePool, user_id: i64) -> AppResult<()> {
    let Some(usuario) = buscar_usuario_por_id(db_pool, user_id).await? else {
        return Err(AppError::NotFound);
    };

    if usuario.username == ADMIN_USERNAME {
        tracing::warn!("Tentativa de excluir o administrador semente bloqueada.");
        return Err(AppError::Forbidden);
    }

    sqlx::query("UPDATE usuarios SET ativo = 0 WHERE id = ?1")
        .bind(user_id)
        .execute(db_pool)
        .await?;

    tracing::info!("✅ Utilizador '{}' desativado.", usuario.username);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool_em_memoria;

    #[tokio::test]
    async fn username_duplicado_falha_sem_afetar_o_primeiro() {
        let pool = pool_em_memoria().await;
        let id = criar_usuario(&pool, "admin2", "segredo1", false, None).await.unwrap();

        let erro = criar_usuario(&pool, "admin2", "outra123", true, None).await;
        assert!(matches!(erro, Err(AppError::DuplicateUsername)));

        let original = buscar_usuario_por_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(original.username, "admin2");
        assert!(!original.is_admin);
    }

    #[tokio::test]
    async fn usernames_sao_case_sensitive() {
        let pool = pool_em_memoria().await;
        criar_usuario(&pool, "Maria", "segredo1", false, None).await.unwrap();
        // 'maria' é outro utilizador
        criar_usuario(&pool, "maria", "segredo1", false, None).await.unwrap();
    }

    #[tokio::test]
    async fn senha_curta_falha_com_weak_password() {
        let pool = pool_em_memoria().await;
        let erro = criar_usuario(&pool, "ze", "12345", false, None).await;
        assert!(matches!(erro, Err(AppError::WeakPassword)));
    }

    #[tokio::test]
    async fn nao_admin_sem_categorias_recebe_geral() {
        let pool = pool_em_memoria().await;
        let id = criar_usuario(&pool, "ana", "segredo1", false, None).await.unwrap();
        assert_eq!(obter_categorias(&pool, id).await.unwrap(), vec!["Geral"]);
    }

    #[tokio::test]
    async fn renomear_para_username_existente_falha() {
        let pool = pool_em_memoria().await;
        criar_usuario(&pool, "um", "segredo1", false, None).await.unwrap();
        let id2 = criar_usuario(&pool, "dois", "segredo1", false, None).await.unwrap();

        let erro = atualizar_usuario(&pool, id2, "um", false, &["Geral".to_string()]).await;
        assert!(matches!(erro, Err(AppError::DuplicateUsername)));

        // registo intacto
        let dois = buscar_usuario_por_id(&pool, id2).await.unwrap().unwrap();
        assert_eq!(dois.username, "dois");
    }

    #[tokio::test]
    async fn atualizar_substitui_o_conjunto_de_categorias() {
        let pool = pool_em_memoria().await;
        let id = criar_usuario(&pool, "rui", "segredo1", false, Some(&["RH".to_string()]))
            .await
            .unwrap();

        atualizar_usuario(&pool, id, "rui", false, &["Vendas".to_string(), "Geral".to_string()])
            .await
            .unwrap();
        assert_eq!(obter_categorias(&pool, id).await.unwrap(), vec!["Geral", "Vendas"]);
    }

    #[tokio::test]
    async fn senha_nova_curta_nao_altera_o_hash() {
        let pool = pool_em_memoria().await;
        let id = criar_usuario(&pool, "bia", "segredo1", false, None).await.unwrap();
        let hash_antes = buscar_usuario_por_id(&pool, id).await.unwrap().unwrap().password_hash;

        let erro = atualizar_senha(&pool, id, "curta").await;
        assert!(matches!(erro, Err(AppError::WeakPassword)));

        let hash_depois = buscar_usuario_por_id(&pool, id).await.unwrap().unwrap().password_hash;
        assert_eq!(hash_antes, hash_depois);
    }

    #[tokio::test]
    async fn excluir_admin_semente_falha_sempre() {
        let pool = pool_em_memoria().await;
        let id_admin = criar_usuario(&pool, ADMIN_USERNAME, "admin123", true, None)
            .await
            .unwrap();

        let erro = excluir_usuario(&pool, id_admin).await;
        assert!(matches!(erro, Err(AppError::Forbidden)));
        assert!(buscar_usuario_por_id(&pool, id_admin).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn excluir_remove_das_listagens() {
        let pool = pool_em_memoria().await;
        let id = criar_usuario(&pool, "tmp", "segredo1", false, None).await.unwrap();
        excluir_usuario(&pool, id).await.unwrap();

        assert!(buscar_usuario_por_id(&pool, id).await.unwrap().is_none());
        assert!(listar_usuarios(&pool).await.unwrap().is_empty());

        // segundo excluir já não encontra o registo
        assert!(matches!(excluir_usuario(&pool, id).await, Err(AppError::NotFound)));
    }
}
