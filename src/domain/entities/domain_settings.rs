use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::AsRefStr,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DnsStatus {
    #[default]
    Pending,
    Active,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::AsRefStr,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SslStatus {
    #[default]
    Pending,
    Active,
}

/// Advisory DNS record shown to the tenant so they can configure their zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub host: String,
    pub value: String,
}

/// Per-tenant custom domain state. One record per tenant, keyed by tenant id.
///
/// Invariants maintained by the store and use cases:
/// - `custom_domain == None` implies both statuses Pending and no provider reference.
/// - `dns_verified_at`/`ssl_provisioned_at` are set at most once; only an
///   explicit removal clears them.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainSettings {
    pub tenant_id: Uuid,
    pub custom_domain: Option<String>,
    pub dns_status: DnsStatus,
    pub ssl_status: SslStatus,
    pub dns_records: Vec<DnsRecord>,
    pub provider_domain_id: Option<String>,
    pub domain_registered_at: Option<NaiveDateTime>,
    pub dns_verified_at: Option<NaiveDateTime>,
    pub ssl_provisioned_at: Option<NaiveDateTime>,
    pub last_checked_at: Option<NaiveDateTime>,
}

impl DomainSettings {
    /// The state of a tenant that has never registered a domain (or removed it).
    pub fn absent(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            custom_domain: None,
            dns_status: DnsStatus::Pending,
            ssl_status: SslStatus::Pending,
            dns_records: Vec::new(),
            provider_domain_id: None,
            domain_registered_at: None,
            dns_verified_at: None,
            ssl_provisioned_at: None,
            last_checked_at: None,
        }
    }

    pub fn is_fully_active(&self) -> bool {
        self.dns_status == DnsStatus::Active && self.ssl_status == SslStatus::Active
    }
}
