// src/services/link_powerbi.rs
//
// Validação heurística de links do Power BI. É deliberadamente permissiva
// (qualquer URL contendo um dos padrões passa): apertar a verificação
// rejeitaria links já aceites em produção.

const PADROES_POWERBI: &[&str] = &["app.powerbi.com", "powerbi.com", "view?r=", "embed?"];

/// Aceita o URL se contiver pelo menos um dos padrões conhecidos do
/// domínio de partilha do Power BI (case-insensitive).
pub fn validar_link_powerbi(link: &str) -> bool {
    let link = link.to_lowercase();
    PADROES_POWERBI.iter().any(|padrao| link.contains(padrao))
}

/// Reescreve links 'embed' para a forma 'view' ao apresentar ao
/// utilizador. Links embed destinam-se a iframes e não abrem corretamente
/// num separador novo. Apenas apresentação: o valor guardado não muda.
pub fn link_para_abrir(link: &str) -> String {
    if link.contains("embed") {
        link.replace("embed", "view")
    } else {
        link.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aceita_links_powerbi() {
        assert!(validar_link_powerbi("https://app.powerbi.com/view?r=abc"));
        assert!(validar_link_powerbi("https://APP.POWERBI.COM/View?R=abc"));
        assert!(validar_link_powerbi("https://app.powerbi.com/reportEmbed?reportId=1"));
        assert!(validar_link_powerbi("https://outro.site/pagina?view?r=xyz"));
    }

    #[test]
    fn rejeita_links_fora_do_dominio() {
        assert!(!validar_link_powerbi("https://example.com/page"));
        assert!(!validar_link_powerbi(""));
        assert!(!validar_link_powerbi("https://docs.google.com/spreadsheets"));
    }

    #[test]
    fn reescreve_embed_para_view() {
        assert_eq!(
            link_para_abrir("https://app.powerbi.com/embed?r=abc"),
            "https://app.powerbi.com/view?r=abc"
        );
    }

    #[test]
    fn link_view_fica_inalterado() {
        let link = "https://app.powerbi.com/view?r=abc";
        assert_eq!(link_para_abrir(link), link);
    }
}
