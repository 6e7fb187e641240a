use crate::api::models::SystemStats;

/// Renders the dashboard stat-card grid. Purely numeric content, so no
/// escaping beyond formatting.
pub fn stats_grid(stats: &SystemStats) -> String {
    let cards = [
        ("💻", "#667eea", stats.vms.total.to_string(), "总虚拟机数"),
        ("✅", "#27ae60", stats.vms.running.to_string(), "运行中"),
        ("⏹️", "#e74c3c", stats.vms.stopped.to_string(), "已停止"),
        ("⚠️", "#f39c12", stats.vms.expiring_soon.to_string(), "即将过期"),
        ("⚡", "#9b59b6", stats.resources.total_cpu_cores.to_string(), "总CPU核数"),
        ("🧠", "#3498db", format!("{}GB", stats.resources.total_memory_gb), "总内存"),
        ("💾", "#1abc9c", format!("{}GB", stats.resources.total_disk_gb), "总磁盘"),
        ("📁", "#34495e", stats.projects.total.to_string(), "项目数量"),
    ];

    cards
        .iter()
        .map(|(icon, color, number, label)| {
            format!(
                r#"<div class="stat-card">
    <div class="stat-number" style="color: {color};">{icon} {number}</div>
    <div class="stat-label">{label}</div>
</div>"#
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{ProjectCounts, ResourceTotals, VmCounts};

    #[test]
    fn grid_shows_all_eight_cards() {
        let stats = SystemStats {
            vms: VmCounts {
                total: 12,
                running: 7,
                stopped: 4,
                expiring_soon: 2,
                expired: 1,
            },
            resources: ResourceTotals {
                total_cpu_cores: 96,
                total_memory_gb: 384,
                total_disk_gb: 6000,
                total_gpus: 4,
            },
            projects: ProjectCounts { total: 5 },
        };

        let markup = stats_grid(&stats);
        assert_eq!(markup.matches("stat-card").count(), 8);
        assert!(markup.contains("总虚拟机数"));
        assert!(markup.contains("384GB"));
        assert!(markup.contains("项目数量"));
    }
}
