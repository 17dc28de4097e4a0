use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppResult,
    application::use_cases::progress::{ProgressStep, derive_steps},
    domain::entities::domain_settings::DomainSettings,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register_domain))
        .route("/", get(get_domain_settings))
        .route("/", delete(remove_domain))
        .route("/progress", get(get_progress))
        .route("/watch", post(start_watch))
        .route("/watch", delete(stop_watch))
}

#[derive(Deserialize)]
struct RegisterDomainPayload {
    domain: String,
}

#[derive(Serialize)]
struct DnsRecordResponse {
    #[serde(rename = "type")]
    record_type: String,
    host: String,
    value: String,
}

#[derive(Serialize)]
struct ProgressStepResponse {
    stage: String,
    state: String,
}

#[derive(Serialize)]
struct DomainSettingsResponse {
    custom_domain: Option<String>,
    dns_status: String,
    ssl_status: String,
    dns_records: Vec<DnsRecordResponse>,
    domain_registered_at: Option<chrono::NaiveDateTime>,
    dns_verified_at: Option<chrono::NaiveDateTime>,
    ssl_provisioned_at: Option<chrono::NaiveDateTime>,
    last_checked_at: Option<chrono::NaiveDateTime>,
    steps: Vec<ProgressStepResponse>,
}

fn settings_response(settings: DomainSettings) -> DomainSettingsResponse {
    let steps = steps_response(derive_steps(&settings));
    DomainSettingsResponse {
        custom_domain: settings.custom_domain,
        dns_status: settings.dns_status.as_ref().to_string(),
        ssl_status: settings.ssl_status.as_ref().to_string(),
        dns_records: settings
            .dns_records
            .into_iter()
            .map(|r| DnsRecordResponse {
                record_type: r.record_type,
                host: r.host,
                value: r.value,
            })
            .collect(),
        domain_registered_at: settings.domain_registered_at,
        dns_verified_at: settings.dns_verified_at,
        ssl_provisioned_at: settings.ssl_provisioned_at,
        last_checked_at: settings.last_checked_at,
        steps,
    }
}

fn steps_response(steps: [ProgressStep; 5]) -> Vec<ProgressStepResponse> {
    steps
        .into_iter()
        .map(|s| ProgressStepResponse {
            stage: s.stage.as_ref().to_string(),
            state: s.state.as_ref().to_string(),
        })
        .collect()
}

async fn register_domain(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Json(payload): Json<RegisterDomainPayload>,
) -> AppResult<impl IntoResponse> {
    let settings = app_state
        .domain_settings_use_cases
        .register(tenant_id, &payload.domain)
        .await?;

    Ok((StatusCode::CREATED, Json(settings_response(settings))))
}

async fn get_domain_settings(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let settings = app_state
        .domain_settings_use_cases
        .settings(tenant_id)
        .await?;

    Ok(Json(settings_response(settings)))
}

async fn get_progress(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let steps = app_state
        .domain_settings_use_cases
        .progress(tenant_id)
        .await?;

    Ok(Json(steps_response(steps)))
}

async fn remove_domain(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    app_state
        .domain_settings_use_cases
        .remove(tenant_id)
        .await?;
    app_state.domain_watchers.stop(tenant_id);

    Ok(StatusCode::NO_CONTENT)
}

/// Mounted by the settings view while it is open; the watch re-checks the
/// provider on a fixed interval and stops itself once the domain is active.
async fn start_watch(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let use_cases = app_state.domain_settings_use_cases.clone();
    app_state
        .domain_watchers
        .start(tenant_id, use_cases, move |settings| {
            tracing::debug!(
                tenant_id = %settings.tenant_id,
                dns_status = settings.dns_status.as_ref(),
                ssl_status = settings.ssl_status.as_ref(),
                "Domain status refreshed"
            );
        });

    Ok(StatusCode::ACCEPTED)
}

async fn stop_watch(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    app_state.domain_watchers.stop(tenant_id);

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use uuid::Uuid;

    use crate::test_utils::test_app_state;

    fn server() -> TestServer {
        let (app_state, _, _) = test_app_state();
        let app = axum::Router::new()
            .nest("/api", crate::adapters::http::routes::router())
            .with_state(app_state);
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn register_returns_created_with_normalized_domain() {
        let server = server();
        let tenant_id = Uuid::new_v4();

        let response = server
            .post(&format!("/api/tenants/{tenant_id}/domain"))
            .json(&json!({ "domain": "MyShop.COM/" }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["custom_domain"], "myshop.com");
        assert_eq!(body["dns_status"], "pending");
        assert_eq!(body["dns_records"].as_array().unwrap().len(), 2);
        assert_eq!(body["steps"][0]["state"], "completed");
        assert_eq!(body["steps"][1]["state"], "current");
    }

    #[tokio::test]
    async fn register_rejects_invalid_domain() {
        let server = server();
        let tenant_id = Uuid::new_v4();

        let response = server
            .post(&format!("/api/tenants/{tenant_id}/domain"))
            .json(&json!({ "domain": "not a domain" }))
            .await;

        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_DOMAIN_FORMAT");
    }

    #[tokio::test]
    async fn progress_for_unknown_tenant_is_all_pending() {
        let server = server();
        let tenant_id = Uuid::new_v4();

        let response = server
            .get(&format!("/api/tenants/{tenant_id}/domain/progress"))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let steps = body.as_array().unwrap();
        assert_eq!(steps.len(), 5);
        assert!(steps.iter().all(|s| s["state"] == "pending"));
    }

    #[tokio::test]
    async fn remove_resets_settings() {
        let server = server();
        let tenant_id = Uuid::new_v4();

        server
            .post(&format!("/api/tenants/{tenant_id}/domain"))
            .json(&json!({ "domain": "myshop.com" }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        server
            .delete(&format!("/api/tenants/{tenant_id}/domain"))
            .await
            .assert_status(axum::http::StatusCode::NO_CONTENT);

        let response = server.get(&format!("/api/tenants/{tenant_id}/domain")).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["custom_domain"], Value::Null);
    }
}
