use std::collections::HashMap;

use rust_embed::RustEmbed;
use tracing::error;

use crate::render::escape_html;

/// The fixed element-id schema the renderers populate. The embedding shell
/// (web page, snapshot template) must provide elements with these ids; the
/// console core treats them as a stable external contract.
pub mod ids {
    pub const STATS_GRID: &str = "stats-grid";
    pub const VMS_GRID: &str = "vms-grid";
    pub const RECENT_VMS: &str = "recent-vms-list";
    pub const VM_DETAIL: &str = "vm-detail-content";
    pub const PROJECT_FILTER: &str = "project-filter";
    pub const BILLING_PROJECT_FILTER: &str = "billing-project-filter";
    pub const TEMPLATE_SELECT: &str = "vm-template";
    pub const BILLING_SUMMARY: &str = "billing-summary";
    pub const BILLING_DETAILS: &str = "billing-details";
    pub const BILLING_PAGINATION: &str = "billing-pagination";
    pub const BILLING_START_DATE: &str = "billing-start-date";
    pub const BILLING_END_DATE: &str = "billing-end-date";
    pub const USER_DISPLAY_NAME: &str = "user-display-name";
    pub const USER_AVATAR: &str = "user-avatar";

    /// Containers whose inner HTML the console rewrites.
    pub const HTML_SLOTS: &[&str] = &[
        STATS_GRID,
        VMS_GRID,
        RECENT_VMS,
        VM_DETAIL,
        PROJECT_FILTER,
        BILLING_PROJECT_FILTER,
        TEMPLATE_SELECT,
        BILLING_SUMMARY,
        BILLING_DETAILS,
        BILLING_PAGINATION,
        USER_DISPLAY_NAME,
        USER_AVATAR,
    ];

    /// Inputs whose value the console sets (date defaults, draft restore).
    pub const VALUE_SLOTS: &[&str] = &[
        BILLING_START_DATE,
        BILLING_END_DATE,
        "vm-name",
        "project-name",
        "project-code",
        "vm-owner",
        "vm-deadline",
        "cpu-cores",
        "memory-gb",
        "disk-gb",
        "gpu-type",
        "gpu-count",
    ];
}

/// Severity of a transient alert shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Success,
    Warning,
    Danger,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Success => "success",
            AlertLevel::Warning => "warning",
            AlertLevel::Danger => "danger",
        }
    }
}

/// Presentation seam between the console core and whatever hosts it. A web
/// shell forwards these calls to real DOM mutations; the snapshot binary
/// collects them into a static page; tests record them.
pub trait Surface: Send {
    /// Replaces the inner HTML of the element with the given id.
    fn set_html(&mut self, element_id: &str, html: &str);

    /// Sets the value of an input element.
    fn set_value(&mut self, element_id: &str, value: &str);

    /// Shows a transient, dismissible alert.
    fn alert(&mut self, level: AlertLevel, message: &str);

    /// Asks the user to confirm a disruptive action.
    fn confirm(&mut self, message: &str) -> bool;

    /// Navigates to the external login surface.
    fn redirect_to_login(&mut self);
}

const SHELL_ASSET: &str = "console.html";
const ALERTS_SLOT: &str = "console-alerts";

#[derive(RustEmbed)]
#[folder = "static"]
struct Assets;

/// Collects rendered fragments and splices them into the embedded shell to
/// produce one self-contained page. Fragment slots in the shell are
/// `<!--element-id-->` comments inside the matching containers; input values
/// are `[[element-id]]` placeholders inside `value` attributes. Unfilled
/// slots collapse to nothing. Confirmations answer yes: the snapshot driver
/// never issues disruptive actions.
#[derive(Default)]
pub struct PageSurface {
    fragments: HashMap<String, String>,
    values: HashMap<String, String>,
    alerts: Vec<(AlertLevel, String)>,
    login_redirected: bool,
}

impl PageSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login_redirected(&self) -> bool {
        self.login_redirected
    }

    pub fn render_page(&self) -> String {
        let Some(shell) = Assets::get(SHELL_ASSET) else {
            error!(asset = SHELL_ASSET, "embedded shell asset missing");
            return String::new();
        };
        let mut page = String::from_utf8_lossy(shell.data.as_ref()).into_owned();

        for id in ids::HTML_SLOTS {
            let marker = format!("<!--{id}-->");
            let fragment = self.fragments.get(*id).map(String::as_str).unwrap_or("");
            page = page.replace(&marker, fragment);
        }

        let alerts: String = self
            .alerts
            .iter()
            .map(|(level, message)| {
                format!(
                    "<div class=\"alert alert-{}\">{}<button class=\"alert-close\" data-action=\"dismiss-alert\">×</button></div>\n",
                    level.as_str(),
                    escape_html(message)
                )
            })
            .collect();
        page = page.replace(&format!("<!--{ALERTS_SLOT}-->"), &alerts);

        for id in ids::VALUE_SLOTS {
            let placeholder = format!("[[{id}]]");
            let value = self.values.get(*id).map(String::as_str).unwrap_or("");
            page = page.replace(&placeholder, &escape_html(value));
        }

        page
    }
}

impl Surface for PageSurface {
    fn set_html(&mut self, element_id: &str, html: &str) {
        self.fragments.insert(element_id.to_string(), html.to_string());
    }

    fn set_value(&mut self, element_id: &str, value: &str) {
        self.values.insert(element_id.to_string(), value.to_string());
    }

    fn alert(&mut self, level: AlertLevel, message: &str) {
        self.alerts.push((level, message.to_string()));
    }

    fn confirm(&mut self, _message: &str) -> bool {
        true
    }

    fn redirect_to_login(&mut self) {
        self.login_redirected = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_splices_fragments_and_values() {
        let mut surface = PageSurface::new();
        surface.set_html(ids::VMS_GRID, "<div class=\"vm-card\">web-01</div>");
        surface.set_value(ids::BILLING_START_DATE, "2024-05-01");
        surface.alert(AlertLevel::Success, "操作成功");

        let page = surface.render_page();
        assert!(page.contains("<div class=\"vm-card\">web-01</div>"));
        assert!(page.contains("value=\"2024-05-01\""));
        assert!(page.contains("alert-success"));
        // Unfilled slots must not leak their markers.
        assert!(!page.contains("<!--stats-grid-->"));
        assert!(!page.contains("[[vm-name]]"));
    }

    #[test]
    fn alert_messages_are_escaped() {
        let mut surface = PageSurface::new();
        surface.alert(AlertLevel::Danger, "<img src=x>");
        let page = surface.render_page();
        assert!(page.contains("&lt;img src=x&gt;"));
        assert!(!page.contains("<img src=x>"));
    }

    #[test]
    fn redirect_flag_is_observable() {
        let mut surface = PageSurface::new();
        assert!(!surface.login_redirected());
        surface.redirect_to_login();
        assert!(surface.login_redirected());
    }
}
