use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{domain_provider::HttpDomainProvider, http::app_state::AppState},
    infra::{config::AppConfig, domain_watcher::DomainWatchers, postgres_persistence},
    use_cases::domain_settings::{DomainProvider, DomainSettingsUseCases, SettingsStore},
};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    init_tracing();

    let config = AppConfig::from_env();

    let postgres_arc = Arc::new(postgres_persistence(&config.database_url).await?);
    let store_arc = postgres_arc as Arc<dyn SettingsStore>;

    let provider_arc = Arc::new(HttpDomainProvider::new(
        config.domain_provider_url.to_string(),
        config.domain_provider_api_key.clone(),
    )) as Arc<dyn DomainProvider>;

    let domain_settings_use_cases = DomainSettingsUseCases::new(
        store_arc,
        provider_arc,
        config.ingress_ip.clone(),
        config.ingress_domain.clone(),
    );

    Ok(AppState {
        config: Arc::new(config),
        domain_settings_use_cases: Arc::new(domain_settings_use_cases),
        domain_watchers: Arc::new(DomainWatchers::new()),
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "storefront_api=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don’t show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
