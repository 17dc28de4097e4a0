use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use tracing::instrument;
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::application::helpers::hostname::{is_valid_hostname, normalize_hostname};
use crate::application::use_cases::progress::{ProgressStep, derive_steps};
use crate::domain::entities::domain_settings::{DnsRecord, DnsStatus, DomainSettings, SslStatus};

/// Persistence port for per-tenant domain settings.
///
/// Every write is a focused partial update: it touches only the fields it
/// names and never clobbers the rest of the record. The two `mark_*` writes
/// keep their first-transition timestamps monotonic (set at most once).
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, tenant_id: Uuid) -> AppResult<Option<DomainSettings>>;

    /// All-or-nothing initial registration write. Fails with
    /// `DomainAlreadyRegistered` if the tenant already has a custom domain.
    async fn insert_registration(
        &self,
        tenant_id: Uuid,
        custom_domain: &str,
        provider_domain_id: &str,
        dns_records: &[DnsRecord],
        registered_at: NaiveDateTime,
    ) -> AppResult<DomainSettings>;

    async fn touch_last_checked(&self, tenant_id: Uuid, at: NaiveDateTime) -> AppResult<()>;

    async fn mark_dns_verified(
        &self,
        tenant_id: Uuid,
        at: NaiveDateTime,
    ) -> AppResult<DomainSettings>;

    async fn mark_ssl_provisioned(
        &self,
        tenant_id: Uuid,
        at: NaiveDateTime,
    ) -> AppResult<DomainSettings>;

    /// Logical reset to the absent state; the row itself is kept.
    async fn reset(&self, tenant_id: Uuid) -> AppResult<()>;
}

#[derive(Debug, Clone)]
pub struct ProviderRegistration {
    pub provider_id: String,
    pub dns_records: Vec<DnsRecord>,
}

#[derive(Debug, Clone, Copy)]
pub struct ProviderDomainStatus {
    pub dns_verified: bool,
    pub ssl_issued: bool,
}

/// Remote domain registration and verification API.
#[async_trait]
pub trait DomainProvider: Send + Sync {
    async fn register_domain(&self, hostname: &str) -> AppResult<ProviderRegistration>;
    async fn domain_status(&self, provider_domain_id: &str) -> AppResult<ProviderDomainStatus>;
}

#[derive(Clone)]
pub struct DomainSettingsUseCases {
    store: Arc<dyn SettingsStore>,
    provider: Arc<dyn DomainProvider>,
    ingress_ip: String,
    ingress_domain: String,
}

impl DomainSettingsUseCases {
    pub fn new(
        store: Arc<dyn SettingsStore>,
        provider: Arc<dyn DomainProvider>,
        ingress_ip: String,
        ingress_domain: String,
    ) -> Self {
        Self {
            store,
            provider,
            ingress_ip,
            ingress_domain,
        }
    }

    /// Register a tenant-supplied hostname with the external provider and
    /// persist the initial record. Nothing is persisted on validation or
    /// provider failure.
    #[instrument(skip(self))]
    pub async fn register(&self, tenant_id: Uuid, raw_input: &str) -> AppResult<DomainSettings> {
        let hostname = normalize_hostname(raw_input);
        if !is_valid_hostname(&hostname) {
            return Err(AppError::InvalidDomainFormat(format!(
                "'{}' is not a valid domain name (e.g., myshop.com)",
                raw_input.trim()
            )));
        }

        if let Some(existing) = self.store.get(tenant_id).await? {
            if existing.custom_domain.is_some() {
                return Err(AppError::DomainAlreadyRegistered);
            }
        }

        let registration = self.provider.register_domain(&hostname).await?;
        let dns_records = if registration.dns_records.is_empty() {
            self.fallback_dns_records()
        } else {
            registration.dns_records
        };

        self.store
            .insert_registration(
                tenant_id,
                &hostname,
                &registration.provider_id,
                &dns_records,
                Utc::now().naive_utc(),
            )
            .await
    }

    /// One reconciliation pass: query the provider and advance persisted
    /// state, in order. `last_checked_at` is updated on every attempt, even
    /// when the provider call then fails. Status fields only ever move
    /// forward, so repeated or concurrent calls are safe no-ops once a
    /// transition has been applied.
    #[instrument(skip(self))]
    pub async fn check(&self, tenant_id: Uuid) -> AppResult<DomainSettings> {
        let Some(settings) = self.store.get(tenant_id).await? else {
            return Ok(DomainSettings::absent(tenant_id));
        };
        if settings.custom_domain.is_none() {
            return Ok(settings);
        }
        let provider_id = settings.provider_domain_id.clone().ok_or_else(|| {
            AppError::Persistence("domain registered without a provider reference".into())
        })?;

        let now = Utc::now().naive_utc();
        self.store.touch_last_checked(tenant_id, now).await?;

        let status = self.provider.domain_status(&provider_id).await?;

        let mut current = settings;
        current.last_checked_at = Some(now);

        if status.dns_verified && current.dns_status == DnsStatus::Pending {
            current = self.store.mark_dns_verified(tenant_id, now).await?;
        }

        // SSL only activates once DNS is active, which keeps the stage order
        // intact even when the provider reports the flags out of order. When
        // both flip in the same pass the DNS update above unlocks SSL here.
        if status.ssl_issued
            && current.dns_status == DnsStatus::Active
            && current.ssl_status == SslStatus::Pending
        {
            current = self.store.mark_ssl_provisioned(tenant_id, now).await?;
        }

        Ok(current)
    }

    /// Current settings for a tenant, absent-state when none exist yet.
    #[instrument(skip(self))]
    pub async fn settings(&self, tenant_id: Uuid) -> AppResult<DomainSettings> {
        Ok(self
            .store
            .get(tenant_id)
            .await?
            .unwrap_or_else(|| DomainSettings::absent(tenant_id)))
    }

    /// The 5-stage onboarding projection for a tenant.
    #[instrument(skip(self))]
    pub async fn progress(&self, tenant_id: Uuid) -> AppResult<[ProgressStep; 5]> {
        Ok(derive_steps(&self.settings(tenant_id).await?))
    }

    /// Reset the tenant's settings to the absent state. The hostname is not
    /// deregistered at the provider.
    #[instrument(skip(self))]
    pub async fn remove(&self, tenant_id: Uuid) -> AppResult<()> {
        self.store.reset(tenant_id).await
    }

    /// Static advisory records used when the provider response omits them:
    /// an apex A record to the platform ingress IP and a `www` CNAME to the
    /// ingress hostname.
    fn fallback_dns_records(&self) -> Vec<DnsRecord> {
        vec![
            DnsRecord {
                record_type: "A".into(),
                host: "@".into(),
                value: self.ingress_ip.clone(),
            },
            DnsRecord {
                record_type: "CNAME".into(),
                host: "www".into(),
                value: self.ingress_domain.clone(),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::progress::StepState;
    use crate::test_utils::{InMemorySettingsStore, ScriptedDomainProvider};

    fn use_cases(
        store: Arc<InMemorySettingsStore>,
        provider: Arc<ScriptedDomainProvider>,
    ) -> DomainSettingsUseCases {
        DomainSettingsUseCases::new(
            store,
            provider,
            "203.0.113.10".to_string(),
            "storefronts.shopkit.dev".to_string(),
        )
    }

    #[tokio::test]
    async fn register_normalizes_the_hostname() {
        let store = Arc::new(InMemorySettingsStore::new());
        let provider = Arc::new(ScriptedDomainProvider::new());
        let uc = use_cases(store.clone(), provider);

        let settings = uc.register(Uuid::new_v4(), "MyShop.COM/").await.unwrap();

        assert_eq!(settings.custom_domain.as_deref(), Some("myshop.com"));
        assert_eq!(settings.dns_status, DnsStatus::Pending);
        assert_eq!(settings.ssl_status, SslStatus::Pending);
        assert!(settings.domain_registered_at.is_some());
        assert!(settings.provider_domain_id.is_some());
    }

    #[tokio::test]
    async fn register_rejects_invalid_input_without_persisting() {
        let store = Arc::new(InMemorySettingsStore::new());
        let provider = Arc::new(ScriptedDomainProvider::new());
        let uc = use_cases(store.clone(), provider.clone());
        let tenant_id = Uuid::new_v4();

        let result = uc.register(tenant_id, "not a domain").await;

        assert!(matches!(result, Err(AppError::InvalidDomainFormat(_))));
        assert!(store.get(tenant_id).await.unwrap().is_none());
        assert_eq!(provider.register_calls(), 0);
    }

    #[tokio::test]
    async fn register_persists_nothing_on_provider_rejection() {
        let store = Arc::new(InMemorySettingsStore::new());
        let provider = Arc::new(ScriptedDomainProvider::new());
        provider.reject_registrations("domain already claimed");
        let uc = use_cases(store.clone(), provider);
        let tenant_id = Uuid::new_v4();

        let result = uc.register(tenant_id, "taken.com").await;

        assert!(matches!(result, Err(AppError::ProviderRejected(_))));
        assert!(store.get(tenant_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn register_twice_requires_removal_first() {
        let store = Arc::new(InMemorySettingsStore::new());
        let provider = Arc::new(ScriptedDomainProvider::new());
        let uc = use_cases(store.clone(), provider);
        let tenant_id = Uuid::new_v4();

        uc.register(tenant_id, "first.com").await.unwrap();
        let result = uc.register(tenant_id, "second.com").await;
        assert!(matches!(result, Err(AppError::DomainAlreadyRegistered)));

        uc.remove(tenant_id).await.unwrap();
        let settings = uc.register(tenant_id, "second.com").await.unwrap();
        assert_eq!(settings.custom_domain.as_deref(), Some("second.com"));
    }

    #[tokio::test]
    async fn register_falls_back_to_static_dns_records() {
        let store = Arc::new(InMemorySettingsStore::new());
        let provider = Arc::new(ScriptedDomainProvider::new());
        let uc = use_cases(store.clone(), provider);

        let settings = uc.register(Uuid::new_v4(), "myshop.com").await.unwrap();

        assert_eq!(settings.dns_records.len(), 2);
        assert_eq!(settings.dns_records[0].record_type, "A");
        assert_eq!(settings.dns_records[0].host, "@");
        assert_eq!(settings.dns_records[0].value, "203.0.113.10");
        assert_eq!(settings.dns_records[1].record_type, "CNAME");
        assert_eq!(settings.dns_records[1].host, "www");
        assert_eq!(settings.dns_records[1].value, "storefronts.shopkit.dev");
    }

    #[tokio::test]
    async fn register_prefers_provider_supplied_dns_records() {
        let store = Arc::new(InMemorySettingsStore::new());
        let provider = Arc::new(ScriptedDomainProvider::new());
        provider.set_registration_records(vec![DnsRecord {
            record_type: "A".into(),
            host: "@".into(),
            value: "198.51.100.7".into(),
        }]);
        let uc = use_cases(store.clone(), provider);

        let settings = uc.register(Uuid::new_v4(), "myshop.com").await.unwrap();

        assert_eq!(settings.dns_records.len(), 1);
        assert_eq!(settings.dns_records[0].value, "198.51.100.7");
    }

    #[tokio::test]
    async fn check_advances_dns_but_not_ssl() {
        let store = Arc::new(InMemorySettingsStore::new());
        let provider = Arc::new(ScriptedDomainProvider::new());
        let uc = use_cases(store.clone(), provider.clone());
        let tenant_id = Uuid::new_v4();
        uc.register(tenant_id, "myshop.com").await.unwrap();

        provider.push_status(ProviderDomainStatus {
            dns_verified: true,
            ssl_issued: false,
        });
        let settings = uc.check(tenant_id).await.unwrap();

        assert_eq!(settings.dns_status, DnsStatus::Active);
        assert!(settings.dns_verified_at.is_some());
        assert_eq!(settings.ssl_status, SslStatus::Pending);
        assert!(settings.ssl_provisioned_at.is_none());
        assert!(settings.last_checked_at.is_some());
    }

    #[tokio::test]
    async fn check_ignores_ssl_while_dns_is_pending() {
        let store = Arc::new(InMemorySettingsStore::new());
        let provider = Arc::new(ScriptedDomainProvider::new());
        let uc = use_cases(store.clone(), provider.clone());
        let tenant_id = Uuid::new_v4();
        uc.register(tenant_id, "myshop.com").await.unwrap();

        // Provider reporting the flags out of order must not skip a stage.
        provider.push_status(ProviderDomainStatus {
            dns_verified: false,
            ssl_issued: true,
        });
        let settings = uc.check(tenant_id).await.unwrap();

        assert_eq!(settings.dns_status, DnsStatus::Pending);
        assert_eq!(settings.ssl_status, SslStatus::Pending);
        assert!(settings.ssl_provisioned_at.is_none());
    }

    #[tokio::test]
    async fn check_activates_both_when_reported_together() {
        let store = Arc::new(InMemorySettingsStore::new());
        let provider = Arc::new(ScriptedDomainProvider::new());
        let uc = use_cases(store.clone(), provider.clone());
        let tenant_id = Uuid::new_v4();
        uc.register(tenant_id, "myshop.com").await.unwrap();

        provider.push_status(ProviderDomainStatus {
            dns_verified: true,
            ssl_issued: true,
        });
        let settings = uc.check(tenant_id).await.unwrap();

        assert!(settings.is_fully_active());
        assert!(settings.dns_verified_at.is_some());
        assert!(settings.ssl_provisioned_at.is_some());
    }

    #[tokio::test]
    async fn check_is_idempotent_after_full_activation() {
        let store = Arc::new(InMemorySettingsStore::new());
        let provider = Arc::new(ScriptedDomainProvider::new());
        let uc = use_cases(store.clone(), provider.clone());
        let tenant_id = Uuid::new_v4();
        uc.register(tenant_id, "myshop.com").await.unwrap();

        provider.push_status(ProviderDomainStatus {
            dns_verified: true,
            ssl_issued: true,
        });
        let first = uc.check(tenant_id).await.unwrap();

        provider.push_status(ProviderDomainStatus {
            dns_verified: true,
            ssl_issued: true,
        });
        let second = uc.check(tenant_id).await.unwrap();

        assert_eq!(second.dns_verified_at, first.dns_verified_at);
        assert_eq!(second.ssl_provisioned_at, first.ssl_provisioned_at);
        assert_eq!(second.dns_status, DnsStatus::Active);
        assert_eq!(second.ssl_status, SslStatus::Active);
        // Only the check bookkeeping may move.
        assert!(second.last_checked_at.is_some());
    }

    #[tokio::test]
    async fn check_without_a_domain_is_a_no_op() {
        let store = Arc::new(InMemorySettingsStore::new());
        let provider = Arc::new(ScriptedDomainProvider::new());
        let uc = use_cases(store.clone(), provider.clone());
        let tenant_id = Uuid::new_v4();

        let settings = uc.check(tenant_id).await.unwrap();

        assert!(settings.custom_domain.is_none());
        assert_eq!(provider.status_calls(), 0);
    }

    #[tokio::test]
    async fn check_surfaces_transport_errors_without_mutating_status() {
        let store = Arc::new(InMemorySettingsStore::new());
        let provider = Arc::new(ScriptedDomainProvider::new());
        let uc = use_cases(store.clone(), provider.clone());
        let tenant_id = Uuid::new_v4();
        uc.register(tenant_id, "myshop.com").await.unwrap();

        provider.push_status_error("connection refused");
        let result = uc.check(tenant_id).await;

        let err = result.unwrap_err();
        assert!(err.is_retryable());

        let settings = uc.settings(tenant_id).await.unwrap();
        assert_eq!(settings.dns_status, DnsStatus::Pending);
        assert_eq!(settings.ssl_status, SslStatus::Pending);
        // The attempt is still recorded.
        assert!(settings.last_checked_at.is_some());
    }

    #[tokio::test]
    async fn remove_resets_to_all_pending_progress() {
        let store = Arc::new(InMemorySettingsStore::new());
        let provider = Arc::new(ScriptedDomainProvider::new());
        let uc = use_cases(store.clone(), provider.clone());
        let tenant_id = Uuid::new_v4();
        uc.register(tenant_id, "myshop.com").await.unwrap();
        provider.push_status(ProviderDomainStatus {
            dns_verified: true,
            ssl_issued: true,
        });
        uc.check(tenant_id).await.unwrap();

        uc.remove(tenant_id).await.unwrap();

        let settings = uc.settings(tenant_id).await.unwrap();
        assert!(settings.custom_domain.is_none());
        assert!(settings.provider_domain_id.is_none());
        assert!(settings.dns_verified_at.is_none());
        assert!(settings.ssl_provisioned_at.is_none());

        let steps = uc.progress(tenant_id).await.unwrap();
        assert!(steps.iter().all(|s| s.state == StepState::Pending));
    }

    #[tokio::test]
    async fn verification_timestamps_are_monotonic_under_random_responses() {
        use rand::Rng;

        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let store = Arc::new(InMemorySettingsStore::new());
            let provider = Arc::new(ScriptedDomainProvider::new());
            let uc = use_cases(store.clone(), provider.clone());
            let tenant_id = Uuid::new_v4();
            uc.register(tenant_id, "myshop.com").await.unwrap();

            let mut dns_verified_at: Option<chrono::NaiveDateTime> = None;
            let mut ssl_provisioned_at: Option<chrono::NaiveDateTime> = None;

            for _ in 0..30 {
                provider.push_status(ProviderDomainStatus {
                    dns_verified: rng.r#gen(),
                    ssl_issued: rng.r#gen(),
                });
                let settings = uc.check(tenant_id).await.unwrap();

                // Once set, a first-transition timestamp never changes.
                if let Some(prev) = dns_verified_at {
                    assert_eq!(settings.dns_verified_at, Some(prev));
                }
                if let Some(prev) = ssl_provisioned_at {
                    assert_eq!(settings.ssl_provisioned_at, Some(prev));
                }
                // And a timestamp implies its status stays active.
                if settings.dns_verified_at.is_some() {
                    assert_eq!(settings.dns_status, DnsStatus::Active);
                }
                if settings.ssl_provisioned_at.is_some() {
                    assert_eq!(settings.ssl_status, SslStatus::Active);
                }

                dns_verified_at = settings.dns_verified_at;
                ssl_provisioned_at = settings.ssl_provisioned_at;
            }
        }
    }
}
