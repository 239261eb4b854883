// src/services/acesso.rs
//
// Controlo de acesso: funções puras sobre o snapshot do utilizador
// autenticado. Comparações de categoria são exatas e case-sensitive.

use crate::models::usuario::UsuarioSessao;
use std::collections::BTreeSet;

/// Lista padrão de categorias (v1). Novos utilizadores não-admin sem
/// categorias explícitas recebem apenas 'Geral'.
pub const CATEGORIAS_PADRAO: &[&str] = &[
    "Geral",
    "Vendas",
    "Marketing",
    "Financeiro",
    "RH",
    "Operacoes",
    "Logistica",
    "Suprimentos",
    "Operacional",
];

pub const CATEGORIA_GERAL: &str = "Geral";

/// Um relatório é visível sse o utilizador for admin OU a sua categoria
/// estiver no conjunto permitido.
pub fn pode_ver(usuario: &UsuarioSessao, categoria: &str) -> bool {
    usuario.is_admin || usuario.categorias.iter().any(|c| c == categoria)
}

/// Editar/excluir um relatório exige admin ou ser o criador.
pub fn pode_gerir_relatorio(usuario: &UsuarioSessao, criado_por: Option<i64>) -> bool {
    usuario.is_admin || criado_por == Some(usuario.id)
}

/// Normaliza o conjunto de categorias a guardar para um utilizador:
/// admins recebem a lista completa; não-admins ficam com o conjunto
/// fornecido (sem duplicados nem entradas vazias), nunca vazio.
pub fn normalizar_categorias(is_admin: bool, categorias: Option<&[String]>) -> Vec<String> {
    if is_admin {
        return CATEGORIAS_PADRAO.iter().map(|c| c.to_string()).collect();
    }

    let mut conjunto: BTreeSet<String> = categorias
        .unwrap_or(&[])
        .iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    if conjunto.is_empty() {
        conjunto.insert(CATEGORIA_GERAL.to_string());
    }
    conjunto.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usuario(is_admin: bool, categorias: &[&str]) -> UsuarioSessao {
        UsuarioSessao {
            id: 7,
            username: "teste".to_string(),
            is_admin,
            categorias: categorias.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn admin_ve_todas_as_categorias() {
        let admin = usuario(true, &[]);
        assert!(pode_ver(&admin, "Vendas"));
        assert!(pode_ver(&admin, "CategoriaInventada"));
    }

    #[test]
    fn nao_admin_ve_apenas_categorias_permitidas() {
        let comum = usuario(false, &["Geral", "RH"]);
        assert!(pode_ver(&comum, "RH"));
        assert!(!pode_ver(&comum, "Vendas"));
        // comparação exata, case-sensitive
        assert!(!pode_ver(&comum, "rh"));
    }

    #[test]
    fn gerir_relatorio_exige_admin_ou_criador() {
        let comum = usuario(false, &["Geral"]);
        assert!(pode_gerir_relatorio(&comum, Some(7)));
        assert!(!pode_gerir_relatorio(&comum, Some(8)));
        assert!(!pode_gerir_relatorio(&comum, None));
        assert!(pode_gerir_relatorio(&usuario(true, &[]), None));
    }

    #[test]
    fn conjunto_vazio_recebe_geral() {
        assert_eq!(normalizar_categorias(false, None), vec!["Geral"]);
        assert_eq!(normalizar_categorias(false, Some(&[])), vec!["Geral"]);
        assert_eq!(
            normalizar_categorias(false, Some(&["  ".to_string()])),
            vec!["Geral"]
        );
    }

    #[test]
    fn admin_recebe_lista_completa() {
        let cats = normalizar_categorias(true, Some(&["RH".to_string()]));
        assert_eq!(cats.len(), CATEGORIAS_PADRAO.len());
        assert!(cats.iter().any(|c| c == "Vendas"));
    }

    #[test]
    fn duplicados_sao_removidos() {
        let cats = normalizar_categorias(
            false,
            Some(&["RH".to_string(), "RH".to_string(), "Vendas".to_string()]),
        );
        assert_eq!(cats, vec!["RH", "Vendas"]);
    }
}
