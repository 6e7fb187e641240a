use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Represents the authenticated platform user.
/// Returned by `GET /auth/profile` inside a `{user: ...}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub last_login: Option<String>,
}

/// Lifecycle state of a virtual machine as reported by the backend.
///
/// Unknown wire values are preserved in `Other` so a newer backend does not
/// break rendering; they are displayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VmStatus {
    Creating,
    Running,
    Stopped,
    Expired,
    Deleted,
    Other(String),
}

impl VmStatus {
    pub fn as_str(&self) -> &str {
        match self {
            VmStatus::Creating => "creating",
            VmStatus::Running => "running",
            VmStatus::Stopped => "stopped",
            VmStatus::Expired => "expired",
            VmStatus::Deleted => "deleted",
            VmStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for VmStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "creating" => VmStatus::Creating,
            "running" => VmStatus::Running,
            "stopped" => VmStatus::Stopped,
            "expired" => VmStatus::Expired,
            "deleted" => VmStatus::Deleted,
            _ => VmStatus::Other(raw),
        }
    }
}

impl From<VmStatus> for String {
    fn from(status: VmStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Live metrics for a running VM. Only present on `Vm` when the machine is
/// powered on; the backend omits the field otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmMetrics {
    pub cpu_usage_percent: f64,
    pub memory_usage_mb: f64,
    pub disk_usage_gb: f64,
    pub uptime_seconds: i64,
}

/// A provisioned virtual machine record.
///
/// `days_until_expiry` is computed server-side against the deadline and is
/// trusted verbatim; timestamps are kept as the wire strings since the
/// console only redisplays them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vm {
    pub id: i64,
    pub name: String,
    pub status: VmStatus,
    pub project_id: i64,
    pub project_name: String,
    pub project_code: String,
    pub owner: String,
    pub ip_address: Option<String>,
    pub host_name: Option<String>,
    pub cpu_cores: u32,
    pub memory_gb: u32,
    pub disk_gb: u32,
    pub gpu_type: Option<String>,
    #[serde(default)]
    pub gpu_count: u32,
    pub template_name: Option<String>,
    pub created_at: String,
    pub deadline: String,
    pub days_until_expiry: i64,
    pub metrics: Option<VmMetrics>,
}

/// A project grouping VMs for quota and billing purposes.
/// Unique by `project_code`; created lazily by the console when a VM
/// creation references an unknown code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub project_name: String,
    pub project_code: String,
    pub vm_count: Option<u32>,
    pub created_at: Option<String>,
}

/// A VM template offered by the platform. Read-only reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub display_name: String,
    pub os_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmCounts {
    pub total: u64,
    pub running: u64,
    pub stopped: u64,
    pub expiring_soon: u64,
    pub expired: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceTotals {
    pub total_cpu_cores: u64,
    pub total_memory_gb: u64,
    pub total_disk_gb: u64,
    pub total_gpus: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCounts {
    pub total: u64,
}

/// Tenant-wide statistics shown on the dashboard landing tab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStats {
    pub vms: VmCounts,
    pub resources: ResourceTotals,
    pub projects: ProjectCounts,
}

/// Per-project cost aggregate inside the billing summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCost {
    pub project_name: String,
    pub project_code: String,
    pub vm_count: u32,
    pub cpu_cost: f64,
    pub memory_cost: f64,
    pub disk_cost: f64,
    pub gpu_cost: f64,
    pub total_cost: f64,
}

/// Aggregate billing totals, keyed by the backend's stringified project id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingSummary {
    pub total_cost: f64,
    pub record_count: u64,
    pub project_stats: HashMap<String, ProjectCost>,
}

/// One row of the paginated billing detail table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingRecord {
    pub id: Option<i64>,
    pub vm_name: String,
    pub owner: String,
    pub billing_date: String,
    pub cpu_cost: f64,
    pub memory_cost: f64,
    pub disk_cost: f64,
    pub gpu_cost: f64,
    pub total_cost: f64,
}

/// Pagination envelope for billing details; pages are 1-indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub pages: u32,
    pub per_page: u32,
    pub total: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VmListResponse {
    pub vms: Vec<Vm>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectListResponse {
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateListResponse {
    pub templates: Vec<Template>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillingDetailsResponse {
    pub records: Vec<BillingRecord>,
    pub pagination: Pagination,
}

/// Generic `{success, message}` acknowledgement (logout, VM deletion).
#[derive(Debug, Clone, Deserialize)]
pub struct AckResponse {
    pub success: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PowerResponse {
    pub success: bool,
    pub status: VmStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedVm {
    pub id: i64,
    pub name: String,
    pub ip_address: Option<String>,
    pub status: VmStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateVmResponse {
    pub success: bool,
    pub vm: CreatedVm,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedProject {
    pub id: i64,
    pub project_name: String,
    pub project_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectResponse {
    pub success: bool,
    pub project: CreatedProject,
}

/// Body of `POST /vms`. The backend re-validates everything; the console
/// relies on native form constraints and submits as-is.
#[derive(Debug, Clone, Serialize)]
pub struct CreateVmRequest {
    pub name: String,
    pub project_id: i64,
    pub project_name: String,
    pub project_code: String,
    pub owner: String,
    pub deadline: String,
    pub cpu_cores: u32,
    pub memory_gb: u32,
    pub disk_gb: u32,
    pub gpu_type: Option<String>,
    pub gpu_count: u32,
    pub template_name: String,
}

/// Filters applied to `GET /billing/summary`; empty strings mean unset.
#[derive(Debug, Clone, Default)]
pub struct BillingSummaryQuery {
    pub start_date: String,
    pub end_date: String,
    pub project_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vm_status_round_trips_known_values() {
        for raw in ["creating", "running", "stopped", "expired", "deleted"] {
            let status = VmStatus::from(raw.to_string());
            assert!(!matches!(status, VmStatus::Other(_)));
            assert_eq!(status.as_str(), raw);
        }
    }

    #[test]
    fn vm_status_keeps_unknown_values_verbatim() {
        let status = VmStatus::from("suspended".to_string());
        assert_eq!(status, VmStatus::Other("suspended".to_string()));
        assert_eq!(status.as_str(), "suspended");
    }

    #[test]
    fn vm_deserializes_without_optional_fields() {
        let payload = serde_json::json!({
            "id": 7,
            "name": "web-01",
            "status": "creating",
            "project_id": 3,
            "project_name": "门户网站",
            "project_code": "P-001",
            "owner": "张三",
            "ip_address": null,
            "host_name": null,
            "cpu_cores": 4,
            "memory_gb": 8,
            "disk_gb": 100,
            "gpu_type": null,
            "template_name": "Ubuntu-20.04-Template",
            "created_at": "2024-05-01T08:00:00",
            "deadline": "2024-06-01T08:00:00",
            "days_until_expiry": 31,
            "metrics": null
        });
        let vm: Vm = serde_json::from_value(payload).unwrap();
        assert_eq!(vm.status, VmStatus::Creating);
        assert_eq!(vm.gpu_count, 0);
        assert!(vm.metrics.is_none());
    }
}
