// src/templates.rs
use askama::Template;
use crate::{
    models::{
        relatorio::{Relatorio, RelatorioComCriador},
        usuario::{Usuario, UsuarioSessao},
    },
    services::acesso,
};
use chrono::NaiveDateTime;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub usuario: UsuarioSessao,
    pub relatorios: Vec<RelatorioComCriador>,
    pub categorias_disponiveis: Vec<String>,
    pub filtro_categoria: String,
    pub busca: String,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

impl DashboardPage {
    /// Editar/excluir aparecem só para admin ou criador.
    pub fn pode_gerir(&self, relatorio: &RelatorioComCriador) -> bool {
        acesso::pode_gerir_relatorio(&self.usuario, relatorio.criado_por)
    }
}

// Formulário de criação/edição de relatório (relatorio = None cria).
#[derive(Template)]
#[template(path = "relatorio_form.html")]
pub struct RelatorioFormPage {
    pub usuario: UsuarioSessao,
    pub relatorio: Option<Relatorio>,
    pub categorias: &'static [&'static str],
    pub error_message: Option<String>,
}

impl RelatorioFormPage {
    pub fn categoria_selecionada(&self, categoria: &str) -> bool {
        match &self.relatorio {
            Some(r) => r.categoria == categoria,
            None => categoria == acesso::CATEGORIA_GERAL,
        }
    }
}

// Utilizador + conjunto de categorias para a listagem de admin.
#[derive(Clone, Debug)]
pub struct UsuarioComCategorias {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
    pub criado_em: NaiveDateTime,
    pub categorias: Vec<String>,
}

#[derive(Template)]
#[template(path = "admin_users.html")]
pub struct AdminUsersPage {
    pub usuario: UsuarioSessao,
    pub usuarios: Vec<UsuarioComCategorias>,
    pub todas_categorias: &'static [&'static str],
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Template)]
#[template(path = "admin_edit_user.html")]
pub struct AdminEditUserPage<'a> {
    pub usuario: UsuarioSessao,
    pub alvo: Option<&'a Usuario>,
    pub categorias_atuais: &'a [String],
    pub todas_categorias: &'static [&'static str],
    pub error_message: Option<String>,
}

impl<'a> AdminEditUserPage<'a> {
    pub fn tem_categoria(&self, categoria: &str) -> bool {
        self.categorias_atuais.iter().any(|c| c == categoria)
    }
}

#[derive(Template)]
#[template(path = "conta.html")]
pub struct ContaPage {
    pub usuario: UsuarioSessao,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}
