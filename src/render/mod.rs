use crate::api::models::{User, Vm, VmStatus};

pub mod billing;
pub mod options;
pub mod stats;
pub mod vms;

/// Escapes text for interpolation into markup. Applied to every
/// user-supplied or server-supplied free-text field; numeric and enum fields
/// are formatted instead.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Display label for a VM status. Unrecognized wire values pass through
/// verbatim instead of erroring.
pub fn status_label(status: &VmStatus) -> &str {
    match status {
        VmStatus::Creating => "创建中",
        VmStatus::Running => "运行中",
        VmStatus::Stopped => "已停止",
        VmStatus::Expired => "已过期",
        VmStatus::Deleted => "已删除",
        VmStatus::Other(raw) => raw,
    }
}

/// Extra CSS class on a VM card flagging expiry. Presentation only; the
/// action set does not depend on it.
pub fn vm_card_class(vm: &Vm) -> &'static str {
    if vm.status == VmStatus::Expired || vm.days_until_expiry <= 0 {
        "expired"
    } else if vm.days_until_expiry <= 7 {
        "expiring"
    } else {
        ""
    }
}

/// Actions offered on a VM card, driven by status alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmAction {
    PowerOn,
    PowerOff,
    Restart,
    Detail,
    Delete,
}

pub fn vm_actions(status: &VmStatus) -> Vec<VmAction> {
    match status {
        VmStatus::Stopped => vec![VmAction::PowerOn, VmAction::Detail, VmAction::Delete],
        VmStatus::Running => vec![
            VmAction::PowerOff,
            VmAction::Restart,
            VmAction::Detail,
            VmAction::Delete,
        ],
        _ => vec![VmAction::Detail, VmAction::Delete],
    }
}

/// Currency formatting used by every billing renderer.
pub fn format_cost(amount: f64) -> String {
    format!("¥{amount:.2}")
}

pub fn user_display_name(user: &User) -> &str {
    user.display_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(&user.username)
}

/// Up to two uppercase initials for the avatar badge, one per word of the
/// display name.
pub fn user_initials(user: &User) -> String {
    user_display_name(user)
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(|ch| ch.to_uppercase())
        .take(2)
        .collect()
}
