use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub mod models;

use models::{
    AckResponse, BillingDetailsResponse, BillingSummary, BillingSummaryQuery,
    CreateProjectResponse, CreateVmRequest, CreateVmResponse, PowerResponse, ProfileResponse,
    ProjectListResponse, SystemStats, TemplateListResponse, VmListResponse,
};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication failed or session expired")]
    Unauthorized,
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Malformed response payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// The text shown to the user in a transient alert. Server-supplied
    /// messages pass through; everything else collapses to a generic one.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Server { message, .. } => message.clone(),
            _ => "请求失败，请稍后重试".to_string(),
        }
    }
}

/// Power operations accepted by `POST /vms/{id}/power/{action}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    On,
    Off,
    Restart,
}

impl PowerAction {
    pub fn as_path(&self) -> &'static str {
        match self {
            PowerAction::On => "on",
            PowerAction::Off => "off",
            PowerAction::Restart => "restart",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PowerAction::On => "开机",
            PowerAction::Off => "关机",
            PowerAction::Restart => "重启",
        }
    }

    /// Off and restart interrupt a running workload and require confirmation.
    pub fn is_disruptive(&self) -> bool {
        !matches!(self, PowerAction::On)
    }
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Thin wrapper over the platform REST API.
///
/// Owns one `reqwest::Client`, injects the bearer token and JSON content type
/// on every call, and maps the `{error}` envelope plus HTTP status into
/// `ApiError`. Successful bodies are deserialized into the caller's type and
/// nothing more; the backend is the source of truth for shapes.
pub struct ApiClient {
    base_url: String,
    token: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            client: Client::new(),
        }
    }

    pub fn set_token(&mut self, token: &str) {
        self.token = token.to_string();
    }

    /// Issues one request against the API. Caller-supplied headers are
    /// merged first so they can never clobber the auth or content-type
    /// headers. 401 is mapped to `ApiError::Unauthorized` without reading
    /// the body; any other non-2xx yields the server's `error` message or a
    /// status-based fallback.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T, ApiError> {
        let mut headers = extra_headers.unwrap_or_default();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        // A token the header codec rejects can never authenticate.
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| ApiError::Unauthorized)?;
        headers.insert(header::AUTHORIZATION, bearer);

        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.request(method, &url).headers(headers);
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        let bytes = response.bytes().await?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, None, None).await
    }

    pub async fn profile(&self) -> Result<ProfileResponse, ApiError> {
        self.get("/auth/profile").await
    }

    pub async fn logout(&self) -> Result<AckResponse, ApiError> {
        self.request(Method::POST, "/auth/logout", None, None).await
    }

    pub async fn system_stats(&self) -> Result<SystemStats, ApiError> {
        self.get("/system/stats").await
    }

    pub async fn list_vms(&self) -> Result<VmListResponse, ApiError> {
        self.get("/vms").await
    }

    pub async fn create_vm(&self, request: &CreateVmRequest) -> Result<CreateVmResponse, ApiError> {
        let body = serde_json::to_value(request)?;
        self.request(Method::POST, "/vms", Some(body), None).await
    }

    pub async fn power_vm(&self, vm_id: i64, action: PowerAction) -> Result<PowerResponse, ApiError> {
        let path = format!("/vms/{}/power/{}", vm_id, action.as_path());
        self.request(Method::POST, &path, None, None).await
    }

    pub async fn delete_vm(&self, vm_id: i64) -> Result<AckResponse, ApiError> {
        let path = format!("/vms/{vm_id}");
        self.request(Method::DELETE, &path, None, None).await
    }

    pub async fn list_projects(&self) -> Result<ProjectListResponse, ApiError> {
        self.get("/projects").await
    }

    pub async fn create_project(
        &self,
        project_name: &str,
        project_code: &str,
    ) -> Result<CreateProjectResponse, ApiError> {
        let body = serde_json::json!({
            "project_name": project_name,
            "project_code": project_code,
        });
        self.request(Method::POST, "/projects", Some(body), None).await
    }

    pub async fn list_templates(&self) -> Result<TemplateListResponse, ApiError> {
        self.get("/templates").await
    }

    pub async fn billing_summary(
        &self,
        query: &BillingSummaryQuery,
    ) -> Result<BillingSummary, ApiError> {
        self.get(&billing_summary_path(query)).await
    }

    pub async fn billing_details(
        &self,
        project_id: &str,
        page: u32,
    ) -> Result<BillingDetailsResponse, ApiError> {
        self.get(&billing_details_path(project_id, page)).await
    }
}

fn billing_summary_path(query: &BillingSummaryQuery) -> String {
    let mut params = Vec::new();
    if !query.start_date.is_empty() {
        params.push(format!("start_date={}", urlencoding::encode(&query.start_date)));
    }
    if !query.end_date.is_empty() {
        params.push(format!("end_date={}", urlencoding::encode(&query.end_date)));
    }
    if !query.project_id.is_empty() {
        params.push(format!("project_id={}", urlencoding::encode(&query.project_id)));
    }
    if params.is_empty() {
        "/billing/summary".to_string()
    } else {
        format!("/billing/summary?{}", params.join("&"))
    }
}

fn billing_details_path(project_id: &str, page: u32) -> String {
    if project_id.is_empty() {
        format!("/billing/details?page={page}")
    } else {
        format!(
            "/billing/details?project_id={}&page={}",
            urlencoding::encode(project_id),
            page
        )
    }
}
