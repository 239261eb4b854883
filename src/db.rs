// src/db.rs
use crate::error::AppResult;
use crate::services::user_service;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

pub async fn create_db_pool() -> AppResult<SqlitePool> {
    dotenvy::dotenv().ok(); // Carrega .env
    let database_url = std::env::var("DATABASE_URL")?;

    tracing::info!("Ligando à base de dados: {}", database_url);

    // Opções de conexão (criar se não existir, timeout)
    let options = SqliteConnectOptions::from_str(&database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::info!("Executando migrações da base de dados...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrações concluídas.");

    Ok(pool)
}

/// Garante que o utilizador administrador inicial existe.
/// A senha vem de ADMIN_INITIAL_PASSWORD; o fallback 'admin123' é a
/// credencial padrão documentada, comunicada aos operadores fora do app.
pub async fn seed_admin(pool: &SqlitePool) -> AppResult<()> {
    let existe: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM usuarios WHERE username = ?1")
            .bind(user_service::ADMIN_USERNAME)
            .fetch_one(pool)
            .await?;

    if existe > 0 {
        tracing::debug!("Utilizador '{}' já existe, seed ignorado.", user_service::ADMIN_USERNAME);
        return Ok(());
    }

    let senha = std::env::var("ADMIN_INITIAL_PASSWORD").unwrap_or_else(|_| {
        tracing::warn!(
            "⚠️ ADMIN_INITIAL_PASSWORD não definida, usando a senha padrão documentada. \
             Altere-a no primeiro acesso!"
        );
        "admin123".to_string()
    });

    user_service::criar_usuario(pool, user_service::ADMIN_USERNAME, &senha, true, None).await?;
    tracing::info!("✅ Utilizador administrador inicial criado.");
    Ok(())
}

#[cfg(test)]
pub async fn pool_em_memoria() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .create_if_missing(true);

    // Uma única conexão: cada conexão em memória teria a sua própria DB.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}
