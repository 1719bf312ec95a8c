pub mod monitor;
pub mod redirect;
