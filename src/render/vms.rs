use crate::api::models::{Vm, VmMetrics};

use super::{escape_html, status_label, vm_actions, vm_card_class, VmAction};

/// Renders the VM grid for the currently filtered subset. An empty subset
/// yields the empty-state block with its call-to-action, never a bare grid.
pub fn vm_grid(vms: &[&Vm]) -> String {
    if vms.is_empty() {
        return r#"<div class="empty-state">
    <div class="empty-icon">💻</div>
    <h3>暂无虚拟机</h3>
    <p>您还没有创建任何虚拟机<br>点击"创建虚拟机"开始使用</p>
    <button class="btn btn-primary" data-action="show-tab" data-tab="create">创建虚拟机</button>
</div>"#
            .to_string();
    }

    vms.iter().map(|vm| vm_card(vm)).collect::<Vec<_>>().join("\n")
}

fn vm_card(vm: &Vm) -> String {
    let ip = vm
        .ip_address
        .as_deref()
        .map(escape_html)
        .unwrap_or_else(|| "分配中...".to_string());

    let mut hardware = format!("{}核 / {}GB内存 / {}GB磁盘", vm.cpu_cores, vm.memory_gb, vm.disk_gb);
    if vm.gpu_count > 0 {
        if let Some(gpu_type) = vm.gpu_type.as_deref() {
            hardware.push_str(&format!(" / {} x{}", escape_html(gpu_type), vm.gpu_count));
        }
    }

    format!(
        r#"<div class="vm-card {card_class}" data-vm-id="{id}">
    <div class="vm-header">
        <div class="vm-name">{name}</div>
        <div class="vm-status status-{status}">{status_text}</div>
    </div>
    <div class="vm-info">
        <div class="vm-info-row"><span>项目:</span><span>{project} ({code})</span></div>
        <div class="vm-info-row"><span>申请人:</span><span>{owner}</span></div>
        <div class="vm-info-row"><span>IP地址:</span><span>{ip}</span></div>
        <div class="vm-info-row"><span>配置:</span><span>{hardware}</span></div>
        <div class="vm-info-row"><span>到期时间:</span><span>{deadline} ({expiry})</span></div>
    </div>
{metrics}    <div class="vm-actions">
{actions}    </div>
</div>"#,
        card_class = vm_card_class(vm),
        id = vm.id,
        name = escape_html(&vm.name),
        status = escape_html(vm.status.as_str()),
        status_text = escape_html(status_label(&vm.status)),
        project = escape_html(&vm.project_name),
        code = escape_html(&vm.project_code),
        owner = escape_html(&vm.owner),
        ip = ip,
        hardware = hardware,
        deadline = escape_html(&vm.deadline),
        expiry = expiry_hint(vm.days_until_expiry),
        metrics = vm
            .metrics
            .as_ref()
            .map(metrics_block)
            .unwrap_or_default(),
        actions = action_buttons(vm),
    )
}

fn expiry_hint(days_until_expiry: i64) -> String {
    if days_until_expiry <= 0 {
        "已过期".to_string()
    } else {
        format!("剩余 {days_until_expiry} 天")
    }
}

fn metrics_block(metrics: &VmMetrics) -> String {
    format!(
        r#"    <div class="vm-metrics">
        <span>CPU {cpu:.1}%</span>
        <span>内存 {memory:.0}MB</span>
        <span>磁盘 {disk:.1}GB</span>
        <span>运行 {uptime}</span>
    </div>
"#,
        cpu = metrics.cpu_usage_percent,
        memory = metrics.memory_usage_mb,
        disk = metrics.disk_usage_gb,
        uptime = format_uptime(metrics.uptime_seconds),
    )
}

fn action_buttons(vm: &Vm) -> String {
    vm_actions(&vm.status)
        .into_iter()
        .map(|action| {
            let (data_action, class, label) = match action {
                VmAction::PowerOn => ("power-on", "btn-success", "开机"),
                VmAction::PowerOff => ("power-off", "btn-warning", "关机"),
                VmAction::Restart => ("restart", "btn-warning", "重启"),
                VmAction::Detail => ("vm-detail", "btn-secondary", "详情"),
                VmAction::Delete => ("vm-delete", "btn-danger", "删除"),
            };
            format!(
                "        <button class=\"btn btn-sm {class}\" data-action=\"{data_action}\" data-vm-id=\"{}\">{label}</button>\n",
                vm.id
            )
        })
        .collect()
}

/// Renders the recent-VMs panel on the dashboard tab: the first few cache
/// entries in backend order, one compact row each.
pub fn recent_vms(vms: &[Vm]) -> String {
    if vms.is_empty() {
        return r#"<div class="empty-state">
    <div class="empty-icon">💻</div>
    <p>暂无虚拟机</p>
</div>"#
            .to_string();
    }

    let rows: Vec<String> = vms
        .iter()
        .map(|vm| {
            format!(
                r#"<div class="recent-vm-row" data-vm-id="{id}">
    <span class="vm-name">{name}</span>
    <span class="vm-status status-{status}">{status_text}</span>
    <span class="vm-project">{project}</span>
    <span class="vm-ip">{ip}</span>
</div>"#,
                id = vm.id,
                name = escape_html(&vm.name),
                status = escape_html(vm.status.as_str()),
                status_text = escape_html(status_label(&vm.status)),
                project = escape_html(&vm.project_name),
                ip = vm
                    .ip_address
                    .as_deref()
                    .map(escape_html)
                    .unwrap_or_else(|| "分配中...".to_string()),
            )
        })
        .collect();

    rows.join("\n")
}

/// Renders the VM detail panel shown in the modal. Everything comes from
/// the cached list entry; no extra fetch is made.
pub fn vm_detail(vm: &Vm) -> String {
    let mut rows = vec![
        detail_row("名称", &escape_html(&vm.name)),
        detail_row("状态", &escape_html(status_label(&vm.status))),
        detail_row(
            "项目",
            &format!(
                "{} ({})",
                escape_html(&vm.project_name),
                escape_html(&vm.project_code)
            ),
        ),
        detail_row("申请人", &escape_html(&vm.owner)),
        detail_row(
            "IP地址",
            &vm.ip_address
                .as_deref()
                .map(escape_html)
                .unwrap_or_else(|| "分配中...".to_string()),
        ),
        detail_row(
            "宿主机",
            &vm.host_name
                .as_deref()
                .map(escape_html)
                .unwrap_or_else(|| "-".to_string()),
        ),
        detail_row("CPU", &format!("{} 核", vm.cpu_cores)),
        detail_row("内存", &format!("{} GB", vm.memory_gb)),
        detail_row("磁盘", &format!("{} GB", vm.disk_gb)),
    ];

    if vm.gpu_count > 0 {
        let gpu = match vm.gpu_type.as_deref() {
            Some(gpu_type) => format!("{} x{}", escape_html(gpu_type), vm.gpu_count),
            None => format!("x{}", vm.gpu_count),
        };
        rows.push(detail_row("GPU", &gpu));
    }
    if let Some(template_name) = vm.template_name.as_deref() {
        rows.push(detail_row("模板", &escape_html(template_name)));
    }
    rows.push(detail_row("创建时间", &escape_html(&vm.created_at)));
    rows.push(detail_row(
        "到期时间",
        &format!(
            "{} ({})",
            escape_html(&vm.deadline),
            expiry_hint(vm.days_until_expiry)
        ),
    ));

    let metrics = match &vm.metrics {
        Some(metrics) => format!(
            r#"
<h4>运行指标</h4>
<div class="detail-metrics">
    {row_cpu}
    {row_memory}
    {row_disk}
    {row_uptime}
</div>"#,
            row_cpu = detail_row("CPU使用率", &format!("{:.1}%", metrics.cpu_usage_percent)),
            row_memory = detail_row("内存使用", &format!("{:.0} MB", metrics.memory_usage_mb)),
            row_disk = detail_row("磁盘使用", &format!("{:.1} GB", metrics.disk_usage_gb)),
            row_uptime = detail_row("运行时长", &format_uptime(metrics.uptime_seconds)),
        ),
        None => String::new(),
    };

    format!(
        r#"<div class="vm-detail" data-vm-id="{id}">
<div class="detail-rows">
    {rows}
</div>{metrics}
</div>"#,
        id = vm.id,
        rows = rows.join("\n    "),
        metrics = metrics,
    )
}

fn detail_row(label: &str, value: &str) -> String {
    format!(
        r#"<div class="detail-row"><span class="detail-label">{label}</span><span class="detail-value">{value}</span></div>"#
    )
}

fn format_uptime(uptime_seconds: i64) -> String {
    let total_hours = uptime_seconds.max(0) / 3600;
    let days = total_hours / 24;
    let hours = total_hours % 24;
    if days > 0 {
        format!("{days}天{hours}小时")
    } else {
        format!("{hours}小时")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::VmStatus;

    fn vm(name: &str, status: VmStatus) -> Vm {
        Vm {
            id: 11,
            name: name.to_string(),
            status,
            project_id: 1,
            project_name: "门户网站".to_string(),
            project_code: "P-001".to_string(),
            owner: "张三".to_string(),
            ip_address: Some("10.0.0.8".to_string()),
            host_name: Some("esxi-03".to_string()),
            cpu_cores: 4,
            memory_gb: 16,
            disk_gb: 200,
            gpu_type: None,
            gpu_count: 0,
            template_name: Some("Ubuntu-20.04-Template".to_string()),
            created_at: "2024-05-01T08:00:00".to_string(),
            deadline: "2024-06-01T08:00:00".to_string(),
            days_until_expiry: 31,
            metrics: None,
        }
    }

    #[test]
    fn empty_grid_renders_empty_state() {
        let markup = vm_grid(&[]);
        assert!(markup.contains("empty-state"));
        assert!(markup.contains("暂无虚拟机"));
        assert!(markup.contains("data-action=\"show-tab\""));
        assert!(!markup.contains("vm-card"));
    }

    #[test]
    fn grid_escapes_hostile_names() {
        let hostile = vm("<script>x</script>", VmStatus::Running);
        let refs = vec![&hostile];
        let markup = vm_grid(&refs);
        assert!(markup.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!markup.contains("<script>"));
    }

    #[test]
    fn stopped_card_offers_power_on_only() {
        let stopped = vm("db-01", VmStatus::Stopped);
        let refs = vec![&stopped];
        let markup = vm_grid(&refs);
        assert!(markup.contains("data-action=\"power-on\""));
        assert!(!markup.contains("data-action=\"power-off\""));
        assert!(!markup.contains("data-action=\"restart\""));
        assert!(markup.contains("data-action=\"vm-delete\""));
    }

    #[test]
    fn running_card_offers_power_off_and_restart() {
        let running = vm("web-01", VmStatus::Running);
        let refs = vec![&running];
        let markup = vm_grid(&refs);
        assert!(markup.contains("data-action=\"power-off\""));
        assert!(markup.contains("data-action=\"restart\""));
        assert!(!markup.contains("data-action=\"power-on\""));
    }

    #[test]
    fn unknown_status_renders_verbatim_without_power_actions() {
        let odd = vm("odd-01", VmStatus::Other("suspended".to_string()));
        let refs = vec![&odd];
        let markup = vm_grid(&refs);
        assert!(markup.contains("status-suspended"));
        assert!(markup.contains(">suspended<"));
        assert!(!markup.contains("data-action=\"power-"));
    }

    #[test]
    fn recent_panel_has_plain_empty_state() {
        let markup = recent_vms(&[]);
        assert!(markup.contains("empty-state"));
        assert!(!markup.contains("data-action=\"show-tab\""));
    }

    #[test]
    fn detail_includes_metrics_only_when_present() {
        let mut running = vm("web-01", VmStatus::Running);
        running.metrics = Some(VmMetrics {
            cpu_usage_percent: 42.5,
            memory_usage_mb: 2048.0,
            disk_usage_gb: 55.3,
            uptime_seconds: 90_000,
        });
        let markup = vm_detail(&running);
        assert!(markup.contains("运行指标"));
        assert!(markup.contains("42.5%"));
        assert!(markup.contains("1天1小时"));

        let stopped = vm("db-01", VmStatus::Stopped);
        assert!(!vm_detail(&stopped).contains("运行指标"));
    }

    #[test]
    fn uptime_formats_days_and_hours() {
        assert_eq!(format_uptime(0), "0小时");
        assert_eq!(format_uptime(3_600), "1小时");
        assert_eq!(format_uptime(86_400), "1天0小时");
        assert_eq!(format_uptime(-5), "0小时");
    }
}
