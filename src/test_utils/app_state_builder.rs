//! Test app state builder for HTTP-level integration testing.

use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;

use crate::{
    adapters::http::app_state::AppState,
    infra::{config::AppConfig, domain_watcher::DomainWatchers},
    test_utils::{InMemorySettingsStore, ScriptedDomainProvider},
    use_cases::domain_settings::DomainSettingsUseCases,
};

fn test_config() -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        database_url: "postgres://unused".to_string(),
        domain_provider_url: "https://domains.invalid".parse().unwrap(),
        domain_provider_api_key: SecretString::new("test-key".into()),
        ingress_ip: "203.0.113.10".to_string(),
        ingress_domain: "storefronts.shopkit.dev".to_string(),
    }
}

/// Build an `AppState` backed by in-memory mocks. Returns the store and
/// provider so tests can seed records and script provider responses.
pub fn test_app_state() -> (
    AppState,
    Arc<InMemorySettingsStore>,
    Arc<ScriptedDomainProvider>,
) {
    let store = Arc::new(InMemorySettingsStore::new());
    let provider = Arc::new(ScriptedDomainProvider::new());

    let use_cases = DomainSettingsUseCases::new(
        store.clone(),
        provider.clone(),
        "203.0.113.10".to_string(),
        "storefronts.shopkit.dev".to_string(),
    );

    let app_state = AppState {
        config: Arc::new(test_config()),
        domain_settings_use_cases: Arc::new(use_cases),
        domain_watchers: Arc::new(DomainWatchers::new()),
    };

    (app_state, store, provider)
}
