// src/error.rs
use axum::{http::StatusCode, response::Html, response::IntoResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // Falha na camada de persistência: aborta a operação corrente sem
    // efeito parcial, nunca há retry automático.
    #[error("Base de dados indisponível")]
    StorageUnavailable(#[from] sqlx::Error),

    #[error("Erro de migração da base de dados: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Variável de ambiente em falta: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Usuário ou senha incorretos")]
    InvalidCredentials,

    #[error("Acesso restrito a administradores")]
    AccessDenied,

    #[error("Este nome de usuário já existe")]
    DuplicateUsername,

    #[error("Link inválido. Use um link do Power BI")]
    InvalidLink,

    #[error("Preencha o campo obrigatório: {0}")]
    MissingField(&'static str),

    #[error("Registro não encontrado")]
    NotFound,

    #[error("A senha deve ter pelo menos 6 caracteres")]
    WeakPassword,

    #[error("As senhas não coincidem")]
    PasswordMismatch,

    #[error("O usuário administrador inicial não pode ser excluído")]
    Forbidden,

    #[error("Erro ao processar senha")]
    PasswordHash,

    #[error("Erro na sessão: {0}")]
    Session(String),

    #[error("Erro interno inesperado")]
    Internal,
}

// Como converter AppError numa resposta HTTP
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Loga o erro detalhado no servidor
        tracing::error!("Erro processado: {:?}", self);

        let status = match &self {
            AppError::StorageUnavailable(_)
            | AppError::Migration(_)
            | AppError::EnvVar(_)
            | AppError::PasswordHash
            | AppError::Session(_)
            | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::AccessDenied | AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::DuplicateUsername
            | AppError::InvalidLink
            | AppError::MissingField(_)
            | AppError::WeakPassword
            | AppError::PasswordMismatch => StatusCode::UNPROCESSABLE_ENTITY,
        };

        // Mensagem genérica para falhas internas, mensagem do próprio erro
        // para os casos recuperáveis pelo utilizador.
        let user_message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Ocorreu um erro inesperado.".to_string()
        } else {
            self.to_string()
        };

        (status, Html(format!(r#"
            <!DOCTYPE html><html><head><title>Erro</title><style>body{{font-family:sans-serif;}}</style></head>
            <body><h1>Erro {status_code}</h1><p>{message}</p><a href="javascript:history.back()">Voltar</a></body></html>
         "#, status_code = status.as_u16(), message = user_message))).into_response()
    }
}

// Tipo Result padrão para a aplicação
pub type AppResult<T = ()> = Result<T, AppError>;
