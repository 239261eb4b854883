pub mod relatorio;
pub mod usuario;
