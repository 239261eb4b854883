// src/web/relatorio_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::usuario::UsuarioSessao,
    services::{acesso, link_powerbi, relatorio_service},
    state::AppState,
    templates::{DashboardPage, RelatorioFormPage},
    web::{self, redirect_erro, redirect_sucesso},
};
use axum::{
    extract::{Extension, Form, Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct DashboardParams {
    pub categoria: Option<String>,
    pub busca: Option<String>,
    pub success: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct RelatorioForm {
    pub titulo: String,
    pub link_powerbi: String,
    #[serde(default)]
    pub descricao: String,
    pub categoria: String,
}

#[derive(Deserialize, Debug)]
pub struct FeedbackParams {
    pub error: Option<String>,
}

/// GET /dashboard - listagem filtrada dos relatórios visíveis.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(usuario): Extension<UsuarioSessao>,
    Query(params): Query<DashboardParams>,
) -> AppResult<impl IntoResponse> {
    let relatorios = relatorio_service::listar_relatorios(&state.db_pool, &usuario).await?;

    // Categorias presentes no conjunto visível, para o filtro
    let mut categorias_disponiveis: Vec<String> =
        relatorios.iter().map(|r| r.categoria.clone()).collect();
    categorias_disponiveis.sort();
    categorias_disponiveis.dedup();

    let filtro_categoria = params
        .categoria
        .unwrap_or_else(|| relatorio_service::FILTRO_TODAS.to_string());
    let busca = params.busca.unwrap_or_default();

    let visiveis = relatorio_service::filtrar(relatorios, &filtro_categoria, &busca);
    tracing::debug!(
        "Dashboard de '{}': {} relatórios após filtro.",
        usuario.username,
        visiveis.len()
    );

    web::renderizar(DashboardPage {
        usuario,
        relatorios: visiveis,
        categorias_disponiveis,
        filtro_categoria,
        busca,
        success_message: params.success,
        error_message: params.error,
    })
}

/// GET /relatorios/novo
pub async fn show_novo_form(
    Extension(usuario): Extension<UsuarioSessao>,
    Query(params): Query<FeedbackParams>,
) -> AppResult<impl IntoResponse> {
    web::renderizar(RelatorioFormPage {
        usuario,
        relatorio: None,
        categorias: acesso::CATEGORIAS_PADRAO,
        error_message: params.error,
    })
}

/// POST /relatorios/novo
pub async fn handle_criar(
    State(state): State<AppState>,
    Extension(usuario): Extension<UsuarioSessao>,
    Form(form): Form<RelatorioForm>,
) -> AppResult<Redirect> {
    match relatorio_service::criar_relatorio(
        &state.db_pool,
        &form.titulo,
        &form.link_powerbi,
        &form.descricao,
        &form.categoria,
        usuario.id,
    )
    .await
    {
        Ok(_) => Ok(redirect_sucesso("/dashboard", "Relatório adicionado com sucesso.")),
        Err(e @ (AppError::InvalidLink | AppError::MissingField(_))) => {
            Ok(redirect_erro("/relatorios/novo", &e.to_string()))
        }
        Err(e) => Err(e),
    }
}

/// GET /relatorios/editar/{id}
pub async fn show_editar_form(
    State(state): State<AppState>,
    Extension(usuario): Extension<UsuarioSessao>,
    Path(id): Path<i64>,
    Query(params): Query<FeedbackParams>,
) -> AppResult<impl IntoResponse> {
    let Some(relatorio) = relatorio_service::obter_relatorio(&state.db_pool, id).await? else {
        return Ok(redirect_erro("/dashboard", "Relatório não encontrado.").into_response());
    };

    if !acesso::pode_gerir_relatorio(&usuario, relatorio.criado_por) {
        tracing::warn!("'{}' tentou editar relatório {} sem permissão.", usuario.username, id);
        return Err(AppError::AccessDenied);
    }

    web::renderizar(RelatorioFormPage {
        usuario,
        relatorio: Some(relatorio),
        categorias: acesso::CATEGORIAS_PADRAO,
        error_message: params.error,
    })
}

/// POST /relatorios/editar/{id}
pub async fn handle_editar(
    State(state): State<AppState>,
    Extension(usuario): Extension<UsuarioSessao>,
    Path(id): Path<i64>,
    Form(form): Form<RelatorioForm>,
) -> AppResult<Redirect> {
    let Some(relatorio) = relatorio_service::obter_relatorio(&state.db_pool, id).await? else {
        return Ok(redirect_erro("/dashboard", "Relatório não encontrado."));
    };

    if !acesso::pode_gerir_relatorio(&usuario, relatorio.criado_por) {
        tracing::warn!("'{}' tentou alterar relatório {} sem permissão.", usuario.username, id);
        return Err(AppError::AccessDenied);
    }

    match relatorio_service::atualizar_relatorio(
        &state.db_pool,
        id,
        &form.titulo,
        &form.link_powerbi,
        &form.descricao,
        &form.categoria,
    )
    .await
    {
        Ok(()) => Ok(redirect_sucesso("/dashboard", "Relatório atualizado com sucesso.")),
        Err(e @ (AppError::InvalidLink | AppError::MissingField(_) | AppError::NotFound)) => {
            Ok(redirect_erro(&format!("/relatorios/editar/{}", id), &e.to_string()))
        }
        Err(e) => Err(e),
    }
}

/// POST /relatorios/excluir/{id}
pub async fn handle_excluir(
    State(state): State<AppState>,
    Extension(usuario): Extension<UsuarioSessao>,
    Path(id): Path<i64>,
) -> AppResult<Redirect> {
    let Some(relatorio) = relatorio_service::obter_relatorio(&state.db_pool, id).await? else {
        return Ok(redirect_erro("/dashboard", "Relatório não encontrado."));
    };

    if !acesso::pode_gerir_relatorio(&usuario, relatorio.criado_por) {
        tracing::warn!("'{}' tentou excluir relatório {} sem permissão.", usuario.username, id);
        return Err(AppError::AccessDenied);
    }

    relatorio_service::excluir_relatorio(&state.db_pool, id).await?;
    Ok(redirect_sucesso("/dashboard", "Relatório excluído."))
}

/// GET /relatorios/abrir/{id} - regista o acesso e abre o link na forma
/// 'view' (o valor guardado permanece intacto).
pub async fn handle_abrir(
    State(state): State<AppState>,
    Extension(usuario): Extension<UsuarioSessao>,
    Path(id): Path<i64>,
) -> AppResult<Redirect> {
    let Some(relatorio) = relatorio_service::obter_relatorio(&state.db_pool, id).await? else {
        return Err(AppError::NotFound);
    };

    if !acesso::pode_ver(&usuario, &relatorio.categoria) {
        tracing::warn!("'{}' tentou abrir relatório {} fora das suas categorias.", usuario.username, id);
        return Err(AppError::AccessDenied);
    }

    relatorio_service::registrar_acesso(&state.db_pool, usuario.id, id).await?;
    Ok(Redirect::to(&link_powerbi::link_para_abrir(&relatorio.link_powerbi)))
}
