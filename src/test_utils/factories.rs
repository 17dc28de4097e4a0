//! Test data factories for creating valid test fixtures.
//!
//! Each factory creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::domain::entities::domain_settings::{DnsRecord, DnsStatus, DomainSettings, SslStatus};

/// Create fully-active test settings with sensible defaults.
pub fn create_test_settings(overrides: impl FnOnce(&mut DomainSettings)) -> DomainSettings {
    let mut settings = DomainSettings {
        tenant_id: Uuid::new_v4(),
        custom_domain: Some("example.com".to_string()),
        dns_status: DnsStatus::Active,
        ssl_status: SslStatus::Active,
        dns_records: vec![
            DnsRecord {
                record_type: "A".to_string(),
                host: "@".to_string(),
                value: "203.0.113.10".to_string(),
            },
            DnsRecord {
                record_type: "CNAME".to_string(),
                host: "www".to_string(),
                value: "storefronts.shopkit.dev".to_string(),
            },
        ],
        provider_domain_id: Some("prov_example-com".to_string()),
        domain_registered_at: Some(test_datetime()),
        dns_verified_at: Some(test_datetime_offset_secs(60)),
        ssl_provisioned_at: Some(test_datetime_offset_secs(120)),
        last_checked_at: Some(test_datetime_offset_secs(120)),
    };
    overrides(&mut settings);
    settings
}

/// Returns a consistent test datetime (2024-01-15 12:00:00 UTC).
pub fn test_datetime() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2024-01-15 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

/// Returns the test datetime offset by the given number of seconds.
pub fn test_datetime_offset_secs(secs: i64) -> NaiveDateTime {
    test_datetime() + chrono::Duration::seconds(secs)
}
