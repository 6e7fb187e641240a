use crate::api::models::{Project, Template};

use super::escape_html;

/// Option list for the project filter selects (VM list and billing). The
/// leading option clears the filter; `selected` is the stringified project
/// id currently chosen, preserved across re-renders.
pub fn project_filter_options(projects: &[Project], selected: &str) -> String {
    let mut options = String::from("<option value=\"\">全部项目</option>\n");
    for project in projects {
        let value = project.id.to_string();
        let selected_attr = if value == selected { " selected" } else { "" };
        options.push_str(&format!(
            "<option value=\"{value}\"{selected_attr}>{name} ({code})</option>\n",
            name = escape_html(&project.project_name),
            code = escape_html(&project.project_code),
        ));
    }
    options
}

/// Option list for the template select in the create form.
pub fn template_options(templates: &[Template]) -> String {
    if templates.is_empty() {
        return "<option value=\"\">暂无可用模板</option>\n".to_string();
    }
    let mut options = String::from("<option value=\"\">选择模板</option>\n");
    for template in templates {
        options.push_str(&format!(
            "<option value=\"{name}\">{display_name}</option>\n",
            name = escape_html(&template.name),
            display_name = escape_html(&template.display_name),
        ));
    }
    options
}
