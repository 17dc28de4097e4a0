//! In-memory mock implementations of the domain settings ports.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::domain_settings::{
        DomainProvider, ProviderDomainStatus, ProviderRegistration, SettingsStore,
    },
    domain::entities::domain_settings::{DnsRecord, DnsStatus, DomainSettings, SslStatus},
};

/// In-memory implementation of `SettingsStore` for testing. Mirrors the
/// partial-write and monotonicity semantics of the Postgres adapter.
#[derive(Default)]
pub struct InMemorySettingsStore {
    pub settings: Mutex<HashMap<Uuid, DomainSettings>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with initial records for testing.
    pub fn with_settings(settings: Vec<DomainSettings>) -> Self {
        let map = settings.into_iter().map(|s| (s.tenant_id, s)).collect();
        Self {
            settings: Mutex::new(map),
        }
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get(&self, tenant_id: Uuid) -> AppResult<Option<DomainSettings>> {
        Ok(self.settings.lock().unwrap().get(&tenant_id).cloned())
    }

    async fn insert_registration(
        &self,
        tenant_id: Uuid,
        custom_domain: &str,
        provider_domain_id: &str,
        dns_records: &[DnsRecord],
        registered_at: NaiveDateTime,
    ) -> AppResult<DomainSettings> {
        let mut settings = self.settings.lock().unwrap();
        if let Some(existing) = settings.get(&tenant_id) {
            if existing.custom_domain.is_some() {
                return Err(AppError::DomainAlreadyRegistered);
            }
        }

        let record = DomainSettings {
            tenant_id,
            custom_domain: Some(custom_domain.to_string()),
            dns_status: DnsStatus::Pending,
            ssl_status: SslStatus::Pending,
            dns_records: dns_records.to_vec(),
            provider_domain_id: Some(provider_domain_id.to_string()),
            domain_registered_at: Some(registered_at),
            dns_verified_at: None,
            ssl_provisioned_at: None,
            last_checked_at: None,
        };
        settings.insert(tenant_id, record.clone());
        Ok(record)
    }

    async fn touch_last_checked(&self, tenant_id: Uuid, at: NaiveDateTime) -> AppResult<()> {
        let mut settings = self.settings.lock().unwrap();
        let record = settings.get_mut(&tenant_id).ok_or(AppError::NotFound)?;
        record.last_checked_at = Some(at);
        Ok(())
    }

    async fn mark_dns_verified(
        &self,
        tenant_id: Uuid,
        at: NaiveDateTime,
    ) -> AppResult<DomainSettings> {
        let mut settings = self.settings.lock().unwrap();
        let record = settings.get_mut(&tenant_id).ok_or(AppError::NotFound)?;
        if record.custom_domain.is_none() {
            return Err(AppError::NotFound);
        }

        record.dns_status = DnsStatus::Active;
        record.dns_verified_at = record.dns_verified_at.or(Some(at));
        Ok(record.clone())
    }

    async fn mark_ssl_provisioned(
        &self,
        tenant_id: Uuid,
        at: NaiveDateTime,
    ) -> AppResult<DomainSettings> {
        let mut settings = self.settings.lock().unwrap();
        let record = settings.get_mut(&tenant_id).ok_or(AppError::NotFound)?;
        if record.custom_domain.is_none() || record.dns_status != DnsStatus::Active {
            return Err(AppError::NotFound);
        }

        record.ssl_status = SslStatus::Active;
        record.ssl_provisioned_at = record.ssl_provisioned_at.or(Some(at));
        Ok(record.clone())
    }

    async fn reset(&self, tenant_id: Uuid) -> AppResult<()> {
        self.settings
            .lock()
            .unwrap()
            .insert(tenant_id, DomainSettings::absent(tenant_id));
        Ok(())
    }
}

enum ScriptedStatus {
    Ok(ProviderDomainStatus),
    TransportError(String),
}

/// Scriptable `DomainProvider` double. Status responses are consumed in
/// FIFO order; an empty script reports both flags unverified. Call counts
/// are tracked for assertions.
#[derive(Default)]
pub struct ScriptedDomainProvider {
    registration_records: Mutex<Vec<DnsRecord>>,
    registration_rejection: Mutex<Option<String>>,
    status_script: Mutex<VecDeque<ScriptedStatus>>,
    register_call_count: AtomicUsize,
    status_call_count: AtomicUsize,
}

impl ScriptedDomainProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent registration fail with `ProviderRejected`.
    pub fn reject_registrations(&self, message: &str) {
        *self.registration_rejection.lock().unwrap() = Some(message.to_string());
    }

    /// DNS records the provider returns on registration (empty by default,
    /// which exercises the fallback pair).
    pub fn set_registration_records(&self, records: Vec<DnsRecord>) {
        *self.registration_records.lock().unwrap() = records;
    }

    pub fn push_status(&self, status: ProviderDomainStatus) {
        self.status_script
            .lock()
            .unwrap()
            .push_back(ScriptedStatus::Ok(status));
    }

    pub fn push_status_error(&self, message: &str) {
        self.status_script
            .lock()
            .unwrap()
            .push_back(ScriptedStatus::TransportError(message.to_string()));
    }

    pub fn register_calls(&self) -> usize {
        self.register_call_count.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DomainProvider for ScriptedDomainProvider {
    async fn register_domain(&self, hostname: &str) -> AppResult<ProviderRegistration> {
        self.register_call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.registration_rejection.lock().unwrap().clone() {
            return Err(AppError::ProviderRejected(message));
        }
        Ok(ProviderRegistration {
            provider_id: format!("prov_{}", hostname.replace('.', "-")),
            dns_records: self.registration_records.lock().unwrap().clone(),
        })
    }

    async fn domain_status(&self, _provider_domain_id: &str) -> AppResult<ProviderDomainStatus> {
        self.status_call_count.fetch_add(1, Ordering::SeqCst);
        match self.status_script.lock().unwrap().pop_front() {
            Some(ScriptedStatus::Ok(status)) => Ok(status),
            Some(ScriptedStatus::TransportError(message)) => {
                Err(AppError::ProviderTransport(message))
            }
            None => Ok(ProviderDomainStatus {
                dns_verified: false,
                ssl_issued: false,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_settings;

    #[tokio::test]
    async fn insert_registration_rejects_existing_domain() {
        let store = InMemorySettingsStore::new();
        let tenant_id = Uuid::new_v4();
        let now = chrono::Utc::now().naive_utc();

        store
            .insert_registration(tenant_id, "myshop.com", "prov_1", &[], now)
            .await
            .unwrap();
        let result = store
            .insert_registration(tenant_id, "other.com", "prov_2", &[], now)
            .await;

        assert!(matches!(result, Err(AppError::DomainAlreadyRegistered)));
    }

    #[tokio::test]
    async fn mark_dns_verified_keeps_first_timestamp() {
        let settings = create_test_settings(|s| {
            s.dns_status = DnsStatus::Pending;
            s.dns_verified_at = None;
        });
        let tenant_id = settings.tenant_id;
        let store = InMemorySettingsStore::with_settings(vec![settings]);

        let t1 = chrono::Utc::now().naive_utc();
        let first = store.mark_dns_verified(tenant_id, t1).await.unwrap();
        let second = store
            .mark_dns_verified(tenant_id, t1 + chrono::Duration::seconds(30))
            .await
            .unwrap();

        assert_eq!(first.dns_verified_at, Some(t1));
        assert_eq!(second.dns_verified_at, Some(t1));
    }

    #[tokio::test]
    async fn reset_returns_record_to_absent_state() {
        let settings = create_test_settings(|_| {});
        let tenant_id = settings.tenant_id;
        let store = InMemorySettingsStore::with_settings(vec![settings]);

        store.reset(tenant_id).await.unwrap();

        let record = store.get(tenant_id).await.unwrap().unwrap();
        assert_eq!(record, DomainSettings::absent(tenant_id));
    }

    #[tokio::test]
    async fn scripted_provider_consumes_statuses_in_order() {
        let provider = ScriptedDomainProvider::new();
        provider.push_status(ProviderDomainStatus {
            dns_verified: true,
            ssl_issued: false,
        });

        let first = provider.domain_status("prov_1").await.unwrap();
        let second = provider.domain_status("prov_1").await.unwrap();

        assert!(first.dns_verified);
        assert!(!second.dns_verified);
        assert_eq!(provider.status_calls(), 2);
    }
}
