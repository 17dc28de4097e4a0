use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    pub database_url: String,
    /// Base URL of the external domain registration/verification API.
    pub domain_provider_url: Url,
    pub domain_provider_api_key: SecretString,
    /// IP the apex A record of a custom domain should point to.
    pub ingress_ip: String,
    /// Hostname the `www` CNAME of a custom domain should point to
    /// (e.g., "storefronts.shopkit.dev").
    pub ingress_domain: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");
        let database_url: String = get_env("DATABASE_URL");
        let domain_provider_url: Url = get_env("DOMAIN_PROVIDER_URL");
        let domain_provider_api_key: SecretString =
            SecretString::new(get_env::<String>("DOMAIN_PROVIDER_API_KEY").into());
        let ingress_ip: String = get_env_default("INGRESS_IP", "203.0.113.10".to_string());
        let ingress_domain: String =
            get_env_default("INGRESS_DOMAIN", "storefronts.shopkit.dev".to_string());

        Self {
            bind_addr,
            cors_origin,
            database_url,
            domain_provider_url,
            domain_provider_api_key,
            ingress_ip,
            ingress_domain,
        }
    }
}
