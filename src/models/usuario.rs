// src/models/usuario.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Representa um utilizador lido da tabela 'usuarios'.
#[derive(Debug, Clone, FromRow)]
pub struct Usuario {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub criado_em: NaiveDateTime,
}

/// Snapshot do utilizador autenticado, guardado por valor na sessão.
/// Admins carregam sempre a lista completa de categorias.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsuarioSessao {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
    pub categorias: Vec<String>,
}

// Struct para dados do formulário de login
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}
