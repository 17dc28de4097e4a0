use std::sync::Arc;

use crate::{
    infra::config::AppConfig, infra::domain_watcher::DomainWatchers,
    use_cases::domain_settings::DomainSettingsUseCases,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub domain_settings_use_cases: Arc<DomainSettingsUseCases>,
    pub domain_watchers: Arc<DomainWatchers>,
}
