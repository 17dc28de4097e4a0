use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::{PostgresPersistence, parse_json_with_fallback},
    app_error::{AppError, AppResult},
    domain::entities::domain_settings::{DnsRecord, DomainSettings},
    use_cases::domain_settings::SettingsStore,
};

fn row_to_settings(row: sqlx::postgres::PgRow) -> DomainSettings {
    let tenant_id: Uuid = row.get("tenant_id");
    let dns_records: serde_json::Value = row.get("dns_records");
    DomainSettings {
        tenant_id,
        custom_domain: row.get("custom_domain"),
        dns_status: row
            .get::<String, _>("dns_status")
            .parse()
            .unwrap_or_default(),
        ssl_status: row
            .get::<String, _>("ssl_status")
            .parse()
            .unwrap_or_default(),
        dns_records: parse_json_with_fallback(
            &dns_records,
            "dns_records",
            "domain_settings",
            &tenant_id.to_string(),
        ),
        provider_domain_id: row.get("provider_domain_id"),
        domain_registered_at: row.get("domain_registered_at"),
        dns_verified_at: row.get("dns_verified_at"),
        ssl_provisioned_at: row.get("ssl_provisioned_at"),
        last_checked_at: row.get("last_checked_at"),
    }
}

#[async_trait]
impl SettingsStore for PostgresPersistence {
    async fn get(&self, tenant_id: Uuid) -> AppResult<Option<DomainSettings>> {
        let row = sqlx::query(
            r#"
                SELECT tenant_id, custom_domain, dns_status, ssl_status, dns_records,
                       provider_domain_id, domain_registered_at, dns_verified_at,
                       ssl_provisioned_at, last_checked_at
                FROM domain_settings
                WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_settings))
    }

    async fn insert_registration(
        &self,
        tenant_id: Uuid,
        custom_domain: &str,
        provider_domain_id: &str,
        dns_records: &[DnsRecord],
        registered_at: NaiveDateTime,
    ) -> AppResult<DomainSettings> {
        let records_json = serde_json::to_value(dns_records)
            .map_err(|e| AppError::Persistence(format!("failed to encode dns records: {e}")))?;

        // The guarded upsert leaves an existing registration untouched; no
        // row comes back and the caller sees the conflict.
        let row = sqlx::query(
            r#"
                INSERT INTO domain_settings
                    (tenant_id, custom_domain, dns_status, ssl_status, dns_records,
                     provider_domain_id, domain_registered_at)
                VALUES ($1, $2, 'pending', 'pending', $3, $4, $5)
                ON CONFLICT (tenant_id) DO UPDATE
                SET custom_domain = EXCLUDED.custom_domain,
                    dns_status = 'pending',
                    ssl_status = 'pending',
                    dns_records = EXCLUDED.dns_records,
                    provider_domain_id = EXCLUDED.provider_domain_id,
                    domain_registered_at = EXCLUDED.domain_registered_at,
                    dns_verified_at = NULL,
                    ssl_provisioned_at = NULL,
                    last_checked_at = NULL
                WHERE domain_settings.custom_domain IS NULL
                RETURNING tenant_id, custom_domain, dns_status, ssl_status, dns_records,
                          provider_domain_id, domain_registered_at, dns_verified_at,
                          ssl_provisioned_at, last_checked_at
            "#,
        )
        .bind(tenant_id)
        .bind(custom_domain)
        .bind(records_json)
        .bind(provider_domain_id)
        .bind(registered_at)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;

        row.map(row_to_settings)
            .ok_or(AppError::DomainAlreadyRegistered)
    }

    async fn touch_last_checked(&self, tenant_id: Uuid, at: NaiveDateTime) -> AppResult<()> {
        sqlx::query("UPDATE domain_settings SET last_checked_at = $2 WHERE tenant_id = $1")
            .bind(tenant_id)
            .bind(at)
            .execute(self.pool())
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    async fn mark_dns_verified(
        &self,
        tenant_id: Uuid,
        at: NaiveDateTime,
    ) -> AppResult<DomainSettings> {
        // COALESCE keeps the first-transition timestamp monotonic even when
        // two sessions reconcile the same tenant concurrently.
        let row = sqlx::query(
            r#"
                UPDATE domain_settings
                SET dns_status = 'active',
                    dns_verified_at = COALESCE(dns_verified_at, $2)
                WHERE tenant_id = $1 AND custom_domain IS NOT NULL
                RETURNING tenant_id, custom_domain, dns_status, ssl_status, dns_records,
                          provider_domain_id, domain_registered_at, dns_verified_at,
                          ssl_provisioned_at, last_checked_at
            "#,
        )
        .bind(tenant_id)
        .bind(at)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;

        row.map(row_to_settings).ok_or(AppError::NotFound)
    }

    async fn mark_ssl_provisioned(
        &self,
        tenant_id: Uuid,
        at: NaiveDateTime,
    ) -> AppResult<DomainSettings> {
        let row = sqlx::query(
            r#"
                UPDATE domain_settings
                SET ssl_status = 'active',
                    ssl_provisioned_at = COALESCE(ssl_provisioned_at, $2)
                WHERE tenant_id = $1 AND custom_domain IS NOT NULL
                      AND dns_status = 'active'
                RETURNING tenant_id, custom_domain, dns_status, ssl_status, dns_records,
                          provider_domain_id, domain_registered_at, dns_verified_at,
                          ssl_provisioned_at, last_checked_at
            "#,
        )
        .bind(tenant_id)
        .bind(at)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;

        row.map(row_to_settings).ok_or(AppError::NotFound)
    }

    async fn reset(&self, tenant_id: Uuid) -> AppResult<()> {
        sqlx::query(
            r#"
                INSERT INTO domain_settings (tenant_id) VALUES ($1)
                ON CONFLICT (tenant_id) DO UPDATE
                SET custom_domain = NULL,
                    dns_status = 'pending',
                    ssl_status = 'pending',
                    dns_records = '[]'::jsonb,
                    provider_domain_id = NULL,
                    domain_registered_at = NULL,
                    dns_verified_at = NULL,
                    ssl_provisioned_at = NULL,
                    last_checked_at = NULL
            "#,
        )
        .bind(tenant_id)
        .execute(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(())
    }
}
