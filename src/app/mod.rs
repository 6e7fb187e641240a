use chrono::{Datelike, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::models::{BillingSummaryQuery, CreateVmRequest, Project, User};
use crate::api::{ApiClient, ApiError, PowerAction};
use crate::config::ConsoleConfig;
use crate::render;
use crate::session::{SessionStore, Storage};
use crate::state::{filter_vms, ConsoleState, Tab};
use crate::surface::{ids, AlertLevel, Surface};

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("session expired")]
    Unauthorized,
    #[error("request failed: {0}")]
    RequestFailed(String),
}

/// Values submitted from the create-VM form. Field validation is left to
/// the native form constraints; the backend re-validates everything.
#[derive(Debug, Clone, Default)]
pub struct CreateVmForm {
    pub name: String,
    pub project_name: String,
    pub project_code: String,
    pub owner: String,
    pub deadline: String,
    pub cpu_cores: u32,
    pub memory_gb: u32,
    pub disk_gb: u32,
    pub gpu_type: String,
    pub gpu_count: u32,
    pub template_name: String,
}

/// The console orchestrator: owns the API client, the session store, the
/// client-side state, and the presentation surface, and sequences every
/// load and user action between them.
///
/// All network calls are awaited one at a time on the caller's task, so
/// between awaits the state is always consistent. Overlapping loads of the
/// same resource are not queued; the state's generation counters reject the
/// stale commit instead.
pub struct Console<S: Surface> {
    api: ApiClient,
    session: SessionStore,
    state: ConsoleState,
    surface: S,
}

impl<S: Surface> Console<S> {
    pub fn new(config: &ConsoleConfig, storage: Box<dyn Storage>, surface: S) -> Self {
        let session = SessionStore::new(storage);
        let token = session.token().unwrap_or_default();
        let api = ApiClient::new(&config.api_base_url, &token);
        Self {
            api,
            session,
            state: ConsoleState::new(),
            surface,
        }
    }

    pub fn state(&self) -> &ConsoleState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Runs the startup sequence. Without a token nothing is loaded and the
    /// user is sent to the login surface. The loads run strictly in order;
    /// the first failed step aborts the rest and one generic message is
    /// shown on top of whatever the step itself already reported.
    pub async fn initialize(&mut self) {
        if self.session.token().is_none() {
            self.surface.redirect_to_login();
            return;
        }
        info!("initializing console");
        if let Err(ConsoleError::RequestFailed(reason)) = self.bootstrap().await {
            warn!(reason = %reason, "console initialization aborted");
            self.surface
                .alert(AlertLevel::Danger, "系统初始化失败，请刷新页面重试");
        }
    }

    async fn bootstrap(&mut self) -> Result<(), ConsoleError> {
        self.load_profile().await?;
        self.load_system_stats().await?;
        self.load_vms().await?;
        self.load_projects().await?;
        self.load_templates().await?;
        self.init_billing_dates();
        self.restore_draft();
        Ok(())
    }

    /// Loads the current user for the header display. A failure here keeps
    /// the session valid and only warns, but still aborts the remaining
    /// bootstrap steps like any other failed step.
    pub async fn load_profile(&mut self) -> Result<(), ConsoleError> {
        match self.api.profile().await {
            Ok(payload) => {
                self.session.cache_user(&payload.user);
                self.render_user(&payload.user);
                Ok(())
            }
            Err(ApiError::Unauthorized) => Err(self.force_logout()),
            Err(err) => {
                warn!(error = %err, "profile load failed");
                self.surface.alert(AlertLevel::Warning, "无法获取用户信息");
                Err(ConsoleError::RequestFailed(err.to_string()))
            }
        }
    }

    pub async fn load_system_stats(&mut self) -> Result<(), ConsoleError> {
        let started = self.state.begin_stats_load();
        match self.api.system_stats().await {
            Ok(stats) => {
                if self.state.stats_current(started) {
                    self.surface
                        .set_html(ids::STATS_GRID, &render::stats::stats_grid(&stats));
                }
                Ok(())
            }
            Err(err) => Err(self.report_failure(err)),
        }
    }

    /// Replaces the VM cache with the latest server list and re-renders the
    /// grid (through the current filter) and the recent panel.
    pub async fn load_vms(&mut self) -> Result<(), ConsoleError> {
        let started = self.state.begin_vm_load();
        match self.api.list_vms().await {
            Ok(payload) => {
                if self.state.commit_vms(started, payload.vms) {
                    self.render_vm_views();
                }
                Ok(())
            }
            Err(err) => Err(self.report_failure(err)),
        }
    }

    pub async fn load_projects(&mut self) -> Result<(), ConsoleError> {
        let started = self.state.begin_project_load();
        match self.api.list_projects().await {
            Ok(payload) => {
                if self.state.commit_projects(started, payload.projects) {
                    self.render_project_options();
                }
                Ok(())
            }
            Err(err) => Err(self.report_failure(err)),
        }
    }

    pub async fn load_templates(&mut self) -> Result<(), ConsoleError> {
        let started = self.state.begin_template_load();
        match self.api.list_templates().await {
            Ok(payload) => {
                if self.state.commit_templates(started, payload.templates) {
                    let markup = render::options::template_options(&self.state.templates);
                    self.surface.set_html(ids::TEMPLATE_SELECT, &markup);
                }
                Ok(())
            }
            Err(err) => Err(self.report_failure(err)),
        }
    }

    pub async fn load_billing_summary(&mut self) -> Result<(), ConsoleError> {
        let started = self.state.begin_billing_summary_load();
        let query = BillingSummaryQuery {
            start_date: self.state.billing.start_date.clone(),
            end_date: self.state.billing.end_date.clone(),
            project_id: self.state.billing.project_id.clone(),
        };
        match self.api.billing_summary(&query).await {
            Ok(summary) => {
                if self.state.billing_summary_current(started) {
                    self.surface
                        .set_html(ids::BILLING_SUMMARY, &render::billing::billing_summary(&summary));
                }
                Ok(())
            }
            Err(err) => Err(self.report_failure(err)),
        }
    }

    /// Fetches one 1-indexed page of billing details, preserving the active
    /// project filter.
    pub async fn load_billing_details(&mut self, page: u32) -> Result<(), ConsoleError> {
        let started = self.state.begin_billing_detail_load();
        let project_id = self.state.billing.project_id.clone();
        match self.api.billing_details(&project_id, page).await {
            Ok(payload) => {
                if self.state.billing_detail_current(started) {
                    self.state.billing.page = payload.pagination.page;
                    self.surface.set_html(
                        ids::BILLING_DETAILS,
                        &render::billing::billing_details(&payload.records),
                    );
                    self.surface.set_html(
                        ids::BILLING_PAGINATION,
                        &render::billing::pagination(&payload.pagination),
                    );
                }
                Ok(())
            }
            Err(err) => Err(self.report_failure(err)),
        }
    }

    pub fn set_search(&mut self, value: &str) {
        self.state.filter.search = value.to_string();
        self.render_vm_views();
    }

    pub fn set_project_filter(&mut self, value: &str) {
        self.state.filter.project = value.to_string();
        self.render_vm_views();
    }

    pub fn set_status_filter(&mut self, value: &str) {
        self.state.filter.status = value.to_string();
        self.render_vm_views();
    }

    /// Activates a tab. The originating control passes its tab explicitly;
    /// the handler never inspects an ambient event. Re-entering a tab
    /// re-runs its loads with no de-duplication against in-flight ones.
    pub async fn show_tab(&mut self, tab: Tab) {
        self.state.set_active_tab(tab);
        info!(tab = tab.as_str(), "tab activated");
        match tab {
            Tab::Dashboard => {
                let _ = self.load_system_stats().await;
                let _ = self.load_vms().await;
            }
            Tab::Vms => {
                let _ = self.load_vms().await;
            }
            Tab::Create => {}
            Tab::Billing => {
                let _ = self.load_billing_summary().await;
                let _ = self.load_billing_details(1).await;
            }
        }
    }

    /// Global refresh (shortcut or toolbar button): re-runs the active
    /// tab's loads.
    pub async fn refresh(&mut self) {
        self.show_tab(self.state.active_tab()).await;
    }

    /// The embedder calls this when the page regains visibility.
    pub async fn on_visibility_regained(&mut self) {
        self.refresh().await;
    }

    pub async fn set_billing_project(&mut self, project_id: &str) {
        self.state.billing.project_id = project_id.to_string();
        let _ = self.load_billing_summary().await;
        let _ = self.load_billing_details(1).await;
    }

    pub async fn set_billing_range(&mut self, start_date: &str, end_date: &str) {
        self.state.billing.start_date = start_date.to_string();
        self.state.billing.end_date = end_date.to_string();
        let _ = self.load_billing_summary().await;
    }

    pub async fn change_billing_page(&mut self, page: u32) {
        let _ = self.load_billing_details(page).await;
    }

    pub async fn power_vm(&mut self, vm_id: i64, action: PowerAction) {
        if action.is_disruptive() {
            let prompt = format!("确定要{}该虚拟机吗？", action.label());
            if !self.surface.confirm(&prompt) {
                return;
            }
        }
        match self.api.power_vm(vm_id, action).await {
            Ok(_) => {
                self.surface
                    .alert(AlertLevel::Success, &format!("{}指令已下发", action.label()));
                let _ = self.load_vms().await;
            }
            Err(err) => {
                let _ = self.report_failure(err);
            }
        }
    }

    pub async fn delete_vm(&mut self, vm_id: i64) {
        if !self.surface.confirm("确定要删除该虚拟机吗？此操作不可恢复。") {
            return;
        }
        match self.api.delete_vm(vm_id).await {
            Ok(_) => {
                self.surface.alert(AlertLevel::Success, "虚拟机已删除");
                let _ = self.load_vms().await;
            }
            Err(err) => {
                let _ = self.report_failure(err);
            }
        }
    }

    /// Submits the create form. A project code not present in the cache is
    /// created first, appended to the cache, and the project option lists
    /// are refreshed before the VM request is sent with the resolved id.
    pub async fn create_vm(&mut self, form: CreateVmForm) {
        let project_id = match self.resolve_project(&form).await {
            Ok(project_id) => project_id,
            Err(_) => return,
        };

        let request = CreateVmRequest {
            name: form.name,
            project_id,
            project_name: form.project_name,
            project_code: form.project_code,
            owner: form.owner,
            deadline: form.deadline,
            cpu_cores: form.cpu_cores,
            memory_gb: form.memory_gb,
            disk_gb: form.disk_gb,
            gpu_type: Some(form.gpu_type).filter(|gpu_type| !gpu_type.is_empty()),
            gpu_count: form.gpu_count,
            template_name: form.template_name,
        };
        match self.api.create_vm(&request).await {
            Ok(payload) => {
                info!(vm_id = payload.vm.id, "VM creation submitted");
                self.surface.alert(AlertLevel::Success, "虚拟机创建请求已提交");
                self.session.clear_draft();
                let _ = self.load_vms().await;
            }
            Err(err) => {
                let _ = self.report_failure(err);
            }
        }
    }

    async fn resolve_project(&mut self, form: &CreateVmForm) -> Result<i64, ConsoleError> {
        if let Some(project) = self.state.find_project_by_code(&form.project_code) {
            return Ok(project.id);
        }
        match self
            .api
            .create_project(&form.project_name, &form.project_code)
            .await
        {
            Ok(payload) => {
                let project_id = payload.project.id;
                self.state.add_project(Project {
                    id: project_id,
                    project_name: payload.project.project_name,
                    project_code: payload.project.project_code,
                    vm_count: None,
                    created_at: None,
                });
                self.render_project_options();
                Ok(project_id)
            }
            Err(err) => Err(self.report_failure(err)),
        }
    }

    /// Shows the detail panel for a cached VM. The list payload already
    /// carries metrics, so no extra fetch happens here.
    pub fn show_vm_detail(&mut self, vm_id: i64) {
        let markup = self.state.find_vm(vm_id).map(render::vms::vm_detail);
        match markup {
            Some(markup) => self.surface.set_html(ids::VM_DETAIL, &markup),
            None => self.surface.alert(AlertLevel::Warning, "未找到该虚拟机"),
        }
    }

    pub async fn logout(&mut self) {
        if let Err(err) = self.api.logout().await {
            warn!(error = %err, "logout request failed");
        }
        self.session.clear();
        self.surface.redirect_to_login();
    }

    /// Persists one create-form field; called on every input event.
    pub fn save_draft_field(&mut self, dom_id: &str, value: &str) {
        self.session.save_draft_field(dom_id, value);
    }

    fn restore_draft(&mut self) {
        for (dom_id, value) in self.session.draft_fields() {
            self.surface.set_value(&dom_id, &value);
        }
    }

    fn init_billing_dates(&mut self) {
        let today = Utc::now().date_naive();
        let first_of_month = today.with_day(1).unwrap_or(today);
        let start = first_of_month.format("%Y-%m-%d").to_string();
        let end = today.format("%Y-%m-%d").to_string();
        self.state.billing.start_date = start.clone();
        self.state.billing.end_date = end.clone();
        self.surface.set_value(ids::BILLING_START_DATE, &start);
        self.surface.set_value(ids::BILLING_END_DATE, &end);
    }

    fn render_vm_views(&mut self) {
        let grid = render::vms::vm_grid(&filter_vms(&self.state.vms, &self.state.filter));
        let recent = render::vms::recent_vms(self.state.recent_vms());
        self.surface.set_html(ids::VMS_GRID, &grid);
        self.surface.set_html(ids::RECENT_VMS, &recent);
    }

    fn render_project_options(&mut self) {
        let filter_options = render::options::project_filter_options(
            &self.state.projects,
            &self.state.filter.project,
        );
        let billing_options = render::options::project_filter_options(
            &self.state.projects,
            &self.state.billing.project_id,
        );
        self.surface.set_html(ids::PROJECT_FILTER, &filter_options);
        self.surface
            .set_html(ids::BILLING_PROJECT_FILTER, &billing_options);
    }

    fn render_user(&mut self, user: &User) {
        let name = render::escape_html(render::user_display_name(user));
        let initials = render::escape_html(&render::user_initials(user));
        self.surface.set_html(ids::USER_DISPLAY_NAME, &name);
        self.surface.set_html(ids::USER_AVATAR, &initials);
    }

    /// Maps an API failure to the user-visible outcome: 401 silently ends
    /// the session and redirects, anything else becomes a danger alert and
    /// the caller treats the call as "no update occurred".
    fn report_failure(&mut self, err: ApiError) -> ConsoleError {
        match err {
            ApiError::Unauthorized => self.force_logout(),
            err => {
                warn!(error = %err, "request failed");
                self.surface.alert(AlertLevel::Danger, &err.user_message());
                ConsoleError::RequestFailed(err.to_string())
            }
        }
    }

    fn force_logout(&mut self) -> ConsoleError {
        self.session.clear();
        self.surface.redirect_to_login();
        ConsoleError::Unauthorized
    }
}
