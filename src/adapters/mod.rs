pub mod domain_provider;
pub mod http;
pub mod persistence;
