// src/services/relatorio_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        relatorio::{Relatorio, RelatorioComCriador},
        usuario::UsuarioSessao,
    },
    services::{acesso, link_powerbi},
};
use sqlx::SqlitePool;

/// Valor do filtro de categoria que não filtra nada.
pub const FILTRO_TODAS: &str = "Todas";

fn validar_campos(titulo: &str, link: &str) -> AppResult<()> {
    if titulo.trim().is_empty() {
        return Err(AppError::MissingField("título"));
    }
    if link.trim().is_empty() {
        return Err(AppError::MissingField("link"));
    }
    if !link_powerbi::validar_link_powerbi(link) {
        return Err(AppError::InvalidLink);
    }
    Ok(())
}

pub async fn criar_relatorio(
    db_pool: &SqlitePool,
    titulo: &str,
    link: &str,
    descricao: &str,
    categoria: &str,
    criado_por: i64,
) -> AppResult<i64> {
    validar_campos(titulo, link)?;

    tracing::info!("Criando relatório '{}' (categoria {})", titulo.trim(), categoria);
    let descricao = match descricao.trim() {
        "" => None,
        d => Some(d),
    };

    let result = sqlx::query(
        r#"
        INSERT INTO relatorios (titulo, link_powerbi, descricao, categoria, criado_por)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(titulo.trim())
    .bind(link.trim())
    .bind(descricao)
    .bind(categoria)
    .bind(criado_por)
    .execute(db_pool)
    .await?;

    let id = result.last_insert_rowid();
    tracing::info!("✅ Relatório {} criado.", id);
    Ok(id)
}

/// Busca um relatório ativo pelo ID.
pub async fn obter_relatorio(db_pool: &SqlitePool, id: i64) -> AppResult<Option<Relatorio>> {
    let relatorio = sqlx::query_as(
        r#"
        SELECT id, titulo, link_powerbi, descricao, categoria, criado_por,
               criado_em, atualizado_em
        FROM relatorios
        WHERE id = ?1 AND ativo = 1
        "#,
    )
    .bind(id)
    .fetch_optional(db_pool)
    .await?;
    Ok(relatorio)
}

/// Lista os relatórios visíveis para o utilizador (admin vê tudo,
/// não-admin vê as suas categorias), mais recentes primeiro, anotados
/// com o username do criador.
pub async fn listar_relatorios(
    db_pool: &SqlitePool,
    usuario: &UsuarioSessao,
) -> AppResult<Vec<RelatorioComCriador>> {
    let relatorios: Vec<RelatorioComCriador> = sqlx::query_as(
        r#"
        SELECT r.id, r.titulo, r.link_powerbi, r.descricao, r.categoria,
               r.criado_por, COALESCE(u.username, 'Sistema') AS criador,
               r.criado_em, r.atualizado_em
        FROM relatorios r
        LEFT JOIN usuarios u ON u.id = r.criado_por AND u.ativo = 1
        WHERE r.ativo = 1
        ORDER BY r.criado_em DESC, r.id DESC
        "#,
    )
    .fetch_all(db_pool)
    .await?;

    Ok(relatorios
        .into_iter()
        .filter(|r| acesso::pode_ver(usuario, &r.categoria))
        .collect())
}

pub async fn atualizar_relatorio(
    db_pool: &SqlitePool,
    id: i64,
    titulo: &str,
    link: &str,
    descricao: &str,
    categoria: &str,
) -> AppResult<()> {
    validar_campos(titulo, link)?;

    let descricao = match descricao.trim() {
        "" => None,
        d => Some(d),
    };

    let rows_affected = sqlx::query(
        r#"
        UPDATE relatorios
        SET titulo = ?1, link_powerbi = ?2, descricao = ?3, categoria = ?4,
            atualizado_em = datetime('now')
        WHERE id = ?5 AND ativo = 1
        "#,
    )
    .bind(titulo.trim())
    .bind(link.trim())
    .bind(descricao)
    .bind(categoria)
    .bind(id)
    .execute(db_pool)
    .await?
    .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Falha ao atualizar: relatório {} não encontrado.", id);
        Err(AppError::NotFound)
    } else {
        tracing::info!("✅ Relatório {} atualizado.", id);
        Ok(())
    }
}

/// Exclusão soft (ativo = 0).
pub async fn excluir_relatorio(db_pool: &SqlitePool, id: i64) -> AppResult<()> {
    let rows_affected = sqlx::query("UPDATE relatorios SET ativo = 0 WHERE id = ?1 AND ativo = 1")
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        Err(AppError::NotFound)
    } else {
        tracing::info!("✅ Relatório {} excluído.", id);
        Ok(())
    }
}

/// Regista a abertura de um relatório no log de acessos.
pub async fn registrar_acesso(
    db_pool: &SqlitePool,
    usuario_id: i64,
    relatorio_id: i64,
) -> AppResult<()> {
    sqlx::query("INSERT INTO logs_acesso (usuario_id, relatorio_id) VALUES (?1, ?2)")
        .bind(usuario_id)
        .bind(relatorio_id)
        .execute(db_pool)
        .await?;
    Ok(())
}

/// Filtro de apresentação, calculado por pedido: primeiro igualdade de
/// categoria ('Todas' não filtra), depois busca por substring
/// case-insensitive no título OU na descrição.
pub fn filtrar(
    relatorios: Vec<RelatorioComCriador>,
    filtro_categoria: &str,
    busca: &str,
) -> Vec<RelatorioComCriador> {
    let termo = busca.trim().to_lowercase();
    relatorios
        .into_iter()
        .filter(|r| filtro_categoria == FILTRO_TODAS || r.categoria == filtro_categoria)
        .filter(|r| {
            termo.is_empty()
                || r.titulo.to_lowercase().contains(&termo)
                || r.descricao
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&termo))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool_em_memoria;
    use crate::services::user_service;

    const LINK_VALIDO: &str = "https://app.powerbi.com/view?r=abc";

    async fn usuario_de_teste(pool: &SqlitePool, username: &str, is_admin: bool, cats: &[&str]) -> UsuarioSessao {
        let cats_owned: Vec<String> = cats.iter().map(|c| c.to_string()).collect();
        let categorias = if cats_owned.is_empty() { None } else { Some(cats_owned.as_slice()) };
        let id = user_service::criar_usuario(pool, username, "segredo1", is_admin, categorias)
            .await
            .unwrap();
        crate::services::auth_service::autenticar(pool, username, "segredo1")
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("utilizador {} (id {}) deveria autenticar", username, id))
    }

    #[tokio::test]
    async fn criar_e_obter_roundtrip() {
        let pool = pool_em_memoria().await;
        let dono = usuario_de_teste(&pool, "dono", false, &["Vendas"]).await;

        let id = criar_relatorio(&pool, "Vendas Q1", LINK_VALIDO, "Resumo", "Vendas", dono.id)
            .await
            .unwrap();

        let r = obter_relatorio(&pool, id).await.unwrap().unwrap();
        assert_eq!(r.titulo, "Vendas Q1");
        assert_eq!(r.link_powerbi, LINK_VALIDO);
        assert_eq!(r.descricao.as_deref(), Some("Resumo"));
        assert_eq!(r.categoria, "Vendas");
        assert_eq!(r.criado_por, Some(dono.id));
        assert_eq!(r.criado_em, r.atualizado_em);
    }

    #[tokio::test]
    async fn titulo_ou_link_vazios_falham() {
        let pool = pool_em_memoria().await;
        let dono = usuario_de_teste(&pool, "dono", false, &[]).await;

        let sem_titulo = criar_relatorio(&pool, "  ", LINK_VALIDO, "", "Geral", dono.id).await;
        assert!(matches!(sem_titulo, Err(AppError::MissingField(_))));

        let sem_link = criar_relatorio(&pool, "Titulo", "", "", "Geral", dono.id).await;
        assert!(matches!(sem_link, Err(AppError::MissingField(_))));
    }

    #[tokio::test]
    async fn link_invalido_e_rejeitado() {
        let pool = pool_em_memoria().await;
        let dono = usuario_de_teste(&pool, "dono", false, &[]).await;

        let erro = criar_relatorio(&pool, "Titulo", "https://example.com/page", "", "Geral", dono.id).await;
        assert!(matches!(erro, Err(AppError::InvalidLink)));
    }

    #[tokio::test]
    async fn visibilidade_segue_categorias_do_usuario() {
        let pool = pool_em_memoria().await;
        let admin = usuario_de_teste(&pool, "admin2", true, &[]).await;
        let comum = usuario_de_teste(&pool, "comum", false, &["RH"]).await;

        criar_relatorio(&pool, "Pessoal", LINK_VALIDO, "", "RH", admin.id).await.unwrap();
        criar_relatorio(&pool, "Caixa", LINK_VALIDO, "", "Financeiro", admin.id).await.unwrap();

        let para_admin = listar_relatorios(&pool, &admin).await.unwrap();
        assert_eq!(para_admin.len(), 2);

        let para_comum = listar_relatorios(&pool, &comum).await.unwrap();
        assert_eq!(para_comum.len(), 1);
        assert_eq!(para_comum[0].categoria, "RH");
    }

    #[tokio::test]
    async fn criador_excluido_aparece_como_sistema() {
        let pool = pool_em_memoria().await;
        let admin = usuario_de_teste(&pool, "admin2", true, &[]).await;
        let autor = usuario_de_teste(&pool, "autor", false, &["Geral"]).await;

        criar_relatorio(&pool, "Orfao", LINK_VALIDO, "", "Geral", autor.id).await.unwrap();
        user_service::excluir_usuario(&pool, autor.id).await.unwrap();

        let lista = listar_relatorios(&pool, &admin).await.unwrap();
        assert_eq!(lista.len(), 1);
        assert_eq!(lista[0].criador, "Sistema");
    }

    #[tokio::test]
    async fn atualizar_reflete_novos_valores_e_refresca_timestamp() {
        let pool = pool_em_memoria().await;
        let dono = usuario_de_teste(&pool, "dono", false, &["Geral"]).await;
        let id = criar_relatorio(&pool, "Antes", LINK_VALIDO, "", "Geral", dono.id).await.unwrap();
        let antes = obter_relatorio(&pool, id).await.unwrap().unwrap();

        atualizar_relatorio(&pool, id, "Depois", LINK_VALIDO, "Nova descricao", "Vendas")
            .await
            .unwrap();

        let depois = obter_relatorio(&pool, id).await.unwrap().unwrap();
        assert_eq!(depois.titulo, "Depois");
        assert_eq!(depois.descricao.as_deref(), Some("Nova descricao"));
        assert_eq!(depois.categoria, "Vendas");
        // resolução de segundos: igual é aceitável, anterior não
        assert!(depois.atualizado_em >= antes.atualizado_em);
    }

    #[tokio::test]
    async fn atualizar_inexistente_retorna_not_found() {
        let pool = pool_em_memoria().await;
        let erro = atualizar_relatorio(&pool, 999, "T", LINK_VALIDO, "", "Geral").await;
        assert!(matches!(erro, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn excluir_esconde_das_listagens() {
        let pool = pool_em_memoria().await;
        let admin = usuario_de_teste(&pool, "admin2", true, &[]).await;
        let id = criar_relatorio(&pool, "Tmp", LINK_VALIDO, "", "Geral", admin.id).await.unwrap();

        excluir_relatorio(&pool, id).await.unwrap();
        assert!(obter_relatorio(&pool, id).await.unwrap().is_none());
        assert!(listar_relatorios(&pool, &admin).await.unwrap().is_empty());
        assert!(matches!(excluir_relatorio(&pool, id).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn ordenacao_mais_recentes_primeiro() {
        let pool = pool_em_memoria().await;
        let admin = usuario_de_teste(&pool, "admin2", true, &[]).await;
        criar_relatorio(&pool, "Primeiro", LINK_VALIDO, "", "Geral", admin.id).await.unwrap();
        criar_relatorio(&pool, "Segundo", LINK_VALIDO, "", "Geral", admin.id).await.unwrap();

        let lista = listar_relatorios(&pool, &admin).await.unwrap();
        assert_eq!(lista[0].titulo, "Segundo");
        assert_eq!(lista[1].titulo, "Primeiro");
    }

    fn rel(titulo: &str, descricao: Option<&str>, categoria: &str) -> RelatorioComCriador {
        RelatorioComCriador {
            id: 1,
            titulo: titulo.to_string(),
            link_powerbi: LINK_VALIDO.to_string(),
            descricao: descricao.map(|d| d.to_string()),
            categoria: categoria.to_string(),
            criado_por: None,
            criador: "Sistema".to_string(),
            criado_em: chrono::DateTime::UNIX_EPOCH.naive_utc(),
            atualizado_em: chrono::DateTime::UNIX_EPOCH.naive_utc(),
        }
    }

    #[test]
    fn filtrar_por_categoria_e_busca() {
        let lista = vec![
            rel("Dashboard de Vendas", Some("mensal"), "Vendas"),
            rel("Folha de RH", None, "RH"),
            rel("Outro", Some("relatorio MENSAL"), "Vendas"),
        ];

        let so_vendas = filtrar(lista.clone(), "Vendas", "");
        assert_eq!(so_vendas.len(), 2);

        let mensal = filtrar(lista.clone(), FILTRO_TODAS, "Mensal");
        assert_eq!(mensal.len(), 2);

        let combinado = filtrar(lista.clone(), "Vendas", "dashboard");
        assert_eq!(combinado.len(), 1);
        assert_eq!(combinado[0].titulo, "Dashboard de Vendas");

        // busca vazia não filtra
        assert_eq!(filtrar(lista, FILTRO_TODAS, "   ").len(), 3);
    }
}
