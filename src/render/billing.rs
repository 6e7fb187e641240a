use crate::api::models::{BillingRecord, BillingSummary, Pagination};

use super::{escape_html, format_cost};

/// Renders the billing summary: total header plus one row per project.
/// Rows are sorted by project code so repeated renders are stable; an empty
/// stats map keeps the table head and renders no body rows.
pub fn billing_summary(summary: &BillingSummary) -> String {
    let mut projects: Vec<_> = summary.project_stats.values().collect();
    projects.sort_by(|a, b| a.project_code.cmp(&b.project_code));

    let rows: String = projects
        .iter()
        .map(|stats| {
            format!(
                r#"        <tr>
            <td>{name}</td>
            <td>{code}</td>
            <td>{vm_count}</td>
            <td>{cpu}</td>
            <td>{memory}</td>
            <td>{disk}</td>
            <td>{gpu}</td>
            <td>{total}</td>
        </tr>
"#,
                name = escape_html(&stats.project_name),
                code = escape_html(&stats.project_code),
                vm_count = stats.vm_count,
                cpu = format_cost(stats.cpu_cost),
                memory = format_cost(stats.memory_cost),
                disk = format_cost(stats.disk_cost),
                gpu = format_cost(stats.gpu_cost),
                total = format_cost(stats.total_cost),
            )
        })
        .collect();

    format!(
        r#"<div class="billing-total">
    <span class="billing-total-label">总费用</span>
    <span class="billing-total-amount">{total}</span>
    <span class="billing-record-count">共 {count} 条记录</span>
</div>
<table class="billing-table">
    <thead>
        <tr>
            <th>项目</th>
            <th>项目编号</th>
            <th>虚拟机数</th>
            <th>CPU费用</th>
            <th>内存费用</th>
            <th>磁盘费用</th>
            <th>GPU费用</th>
            <th>总费用</th>
        </tr>
    </thead>
    <tbody>
{rows}    </tbody>
</table>"#,
        total = format_cost(summary.total_cost),
        count = summary.record_count,
        rows = rows,
    )
}

/// Renders the paginated billing detail table body.
pub fn billing_details(records: &[BillingRecord]) -> String {
    let body = if records.is_empty() {
        r#"        <tr class="empty-row"><td colspan="8">暂无计费记录</td></tr>
"#
        .to_string()
    } else {
        records
            .iter()
            .map(|record| {
                format!(
                    r#"        <tr>
            <td>{vm_name}</td>
            <td>{owner}</td>
            <td>{date}</td>
            <td>{cpu}</td>
            <td>{memory}</td>
            <td>{disk}</td>
            <td>{gpu}</td>
            <td>{total}</td>
        </tr>
"#,
                    vm_name = escape_html(&record.vm_name),
                    owner = escape_html(&record.owner),
                    date = escape_html(&record.billing_date),
                    cpu = format_cost(record.cpu_cost),
                    memory = format_cost(record.memory_cost),
                    disk = format_cost(record.disk_cost),
                    gpu = format_cost(record.gpu_cost),
                    total = format_cost(record.total_cost),
                )
            })
            .collect()
    };

    format!(
        r#"<table class="billing-table">
    <thead>
        <tr>
            <th>虚拟机</th>
            <th>申请人</th>
            <th>计费日期</th>
            <th>CPU费用</th>
            <th>内存费用</th>
            <th>磁盘费用</th>
            <th>GPU费用</th>
            <th>小计</th>
        </tr>
    </thead>
    <tbody>
{body}    </tbody>
</table>"#
    )
}

/// Renders the pager: previous control only when a previous page exists,
/// next control only when a next page exists, and always the page label.
/// The controls carry the 1-indexed target page.
pub fn pagination(pagination: &Pagination) -> String {
    let mut controls = String::new();
    if pagination.has_prev {
        controls.push_str(&format!(
            "<button class=\"btn btn-sm\" data-action=\"billing-page\" data-page=\"{}\">上一页</button>\n",
            pagination.page.saturating_sub(1).max(1)
        ));
    }
    controls.push_str(&format!(
        "<span class=\"page-label\">第 {} 页 / 共 {} 页</span>\n",
        pagination.page, pagination.pages
    ));
    if pagination.has_next {
        controls.push_str(&format!(
            "<button class=\"btn btn-sm\" data-action=\"billing-page\" data-page=\"{}\">下一页</button>\n",
            pagination.page + 1
        ));
    }
    controls
}
