// src/models/relatorio.rs
use crate::services::link_powerbi;
use chrono::NaiveDateTime;
use sqlx::FromRow;

// Representa um relatório lido da tabela 'relatorios'.
#[derive(Debug, Clone, FromRow)]
pub struct Relatorio {
    pub id: i64,
    pub titulo: String,
    pub link_powerbi: String,
    pub descricao: Option<String>,
    pub categoria: String,
    pub criado_por: Option<i64>,
    pub criado_em: NaiveDateTime,
    pub atualizado_em: NaiveDateTime,
}

/// Relatório anotado com o username do criador ('Sistema' quando o
/// criador já não existe ou foi desativado).
#[derive(Debug, Clone, FromRow)]
pub struct RelatorioComCriador {
    pub id: i64,
    pub titulo: String,
    pub link_powerbi: String,
    pub descricao: Option<String>,
    pub categoria: String,
    pub criado_por: Option<i64>,
    pub criador: String,
    pub criado_em: NaiveDateTime,
    pub atualizado_em: NaiveDateTime,
}

impl RelatorioComCriador {
    /// Link apresentado ao utilizador (reescrita embed -> view).
    /// O valor guardado na base de dados nunca é alterado.
    pub fn link_para_abrir(&self) -> String {
        link_powerbi::link_para_abrir(&self.link_powerbi)
    }
}
