use crate::api::models::{Project, Template, Vm};

pub mod filter;

pub use filter::{filter_vms, matches_filter};

/// Top-level tabs of the console. Handlers always receive the originating
/// tab explicitly instead of reading it off an ambient event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Vms,
    Create,
    Billing,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Dashboard => "dashboard",
            Tab::Vms => "vms",
            Tab::Create => "create",
            Tab::Billing => "billing",
        }
    }
}

/// Current VM-list filter inputs, mirroring the three filter controls.
/// Empty string means "no filter" for each of them; `project` holds the
/// stringified project id the select reports.
#[derive(Debug, Clone, Default)]
pub struct VmFilter {
    pub search: String,
    pub project: String,
    pub status: String,
}

/// Active billing query: date range and project filter for the summary,
/// project filter and 1-indexed page for the details table.
#[derive(Debug, Clone)]
pub struct BillingQuery {
    pub start_date: String,
    pub end_date: String,
    pub project_id: String,
    pub page: u32,
}

impl Default for BillingQuery {
    fn default() -> Self {
        Self {
            start_date: String::new(),
            end_date: String::new(),
            project_id: String::new(),
            page: 1,
        }
    }
}

/// Monotonic counter guarding one cache against overlapping loads. A load
/// calls `begin` before its network await and commits only if no newer load
/// started in the meantime, so the last-started load wins regardless of
/// response arrival order.
#[derive(Debug, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn begin(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn is_current(&self, started: u64) -> bool {
        self.0 == started
    }
}

/// The whole client-side state of the console: in-memory mirrors of the
/// backend lists, the filter inputs, and the active tab. Caches are replaced
/// wholesale on every fetch and never merged, so a refresh is always a full
/// resync. The filtered view is derived on demand and never stored.
#[derive(Default)]
pub struct ConsoleState {
    pub vms: Vec<Vm>,
    pub projects: Vec<Project>,
    pub templates: Vec<Template>,
    pub filter: VmFilter,
    pub billing: BillingQuery,
    active_tab: Option<Tab>,
    vm_loads: Generation,
    project_loads: Generation,
    template_loads: Generation,
    stats_loads: Generation,
    billing_summary_loads: Generation,
    billing_detail_loads: Generation,
}

impl ConsoleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab.unwrap_or(Tab::Dashboard)
    }

    pub fn set_active_tab(&mut self, tab: Tab) {
        self.active_tab = Some(tab);
    }

    pub fn begin_vm_load(&mut self) -> u64 {
        self.vm_loads.begin()
    }

    pub fn commit_vms(&mut self, started: u64, vms: Vec<Vm>) -> bool {
        if !self.vm_loads.is_current(started) {
            return false;
        }
        self.vms = vms;
        true
    }

    pub fn begin_project_load(&mut self) -> u64 {
        self.project_loads.begin()
    }

    pub fn commit_projects(&mut self, started: u64, projects: Vec<Project>) -> bool {
        if !self.project_loads.is_current(started) {
            return false;
        }
        self.projects = projects;
        true
    }

    pub fn begin_template_load(&mut self) -> u64 {
        self.template_loads.begin()
    }

    pub fn commit_templates(&mut self, started: u64, templates: Vec<Template>) -> bool {
        if !self.template_loads.is_current(started) {
            return false;
        }
        self.templates = templates;
        true
    }

    pub fn begin_stats_load(&mut self) -> u64 {
        self.stats_loads.begin()
    }

    pub fn stats_current(&self, started: u64) -> bool {
        self.stats_loads.is_current(started)
    }

    pub fn begin_billing_summary_load(&mut self) -> u64 {
        self.billing_summary_loads.begin()
    }

    pub fn billing_summary_current(&self, started: u64) -> bool {
        self.billing_summary_loads.is_current(started)
    }

    pub fn begin_billing_detail_load(&mut self) -> u64 {
        self.billing_detail_loads.begin()
    }

    pub fn billing_detail_current(&self, started: u64) -> bool {
        self.billing_detail_loads.is_current(started)
    }

    /// The first five VMs in whatever order the backend returned them.
    pub fn recent_vms(&self) -> &[Vm] {
        &self.vms[..self.vms.len().min(5)]
    }

    pub fn find_vm(&self, vm_id: i64) -> Option<&Vm> {
        self.vms.iter().find(|vm| vm.id == vm_id)
    }

    pub fn find_project_by_code(&self, project_code: &str) -> Option<&Project> {
        self.projects
            .iter()
            .find(|project| project.project_code == project_code)
    }

    /// Appends a project created lazily during VM submission.
    pub fn add_project(&mut self, project: Project) {
        self.projects.push(project);
    }
}
