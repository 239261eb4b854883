pub mod acesso;
pub mod auth_service;
pub mod link_powerbi;
pub mod relatorio_service;
pub mod user_service;
