use crate::api::models::Vm;

use super::VmFilter;

/// Derives the displayed subset of the VM cache. Pure projection: the cache
/// is untouched and order is preserved.
pub fn filter_vms<'a>(vms: &'a [Vm], filter: &VmFilter) -> Vec<&'a Vm> {
    vms.iter().filter(|vm| matches_filter(vm, filter)).collect()
}

/// A VM is displayed iff it passes all three predicates: free-text search,
/// project select, and status select. Empty inputs pass everything.
pub fn matches_filter(vm: &Vm, filter: &VmFilter) -> bool {
    matches_search(vm, &filter.search)
        && matches_project(vm, &filter.project)
        && matches_status(vm, &filter.status)
}

fn matches_search(vm: &Vm, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    vm.name.to_lowercase().contains(&needle)
        || vm.owner.to_lowercase().contains(&needle)
        || vm.project_name.to_lowercase().contains(&needle)
}

fn matches_project(vm: &Vm, project: &str) -> bool {
    project.is_empty() || vm.project_id.to_string() == project
}

fn matches_status(vm: &Vm, status: &str) -> bool {
    status.is_empty() || vm.status.as_str() == status
}
