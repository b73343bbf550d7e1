//! Build pipeline wiring
//!
//! The public entry points resolve a target or nested task into the
//! dependency graph, creating the phase roots it hangs off as a side
//! effect. Calling them repeatedly with the same arguments is idempotent.

use tracing::trace;

use crate::builder::TaskBuilder;
use crate::clean;
use crate::error::{PhasrError, Result};
use crate::phase::{Phase, BUILD_CATEGORY};
use crate::registry::{TaskId, TaskRegistry};

/// Add a task to the Clean phase of the build pipeline.
///
/// Top-level targets resolve to `"Clean-Build-{target}"` hanging off the
/// `"Clean-Build-All"` root; nested tasks resolve to
/// `"{parent}-{target}"` hanging off their parent target's clean task.
pub fn build_clean_task<'a>(
    registry: &'a mut TaskRegistry,
    target_name: &str,
    is_target: bool,
    parent_task_name: &str,
) -> Result<TaskBuilder<'a>> {
    let id = clean::add_to_clean_task(
        registry,
        target_name,
        BUILD_CATEGORY,
        is_target,
        parent_task_name,
    )?;
    Ok(TaskBuilder::new(registry, id))
}

/// Add a task to the PreBuild phase of the build pipeline.
///
/// Top-level targets resolve to `"PreBuild-{target}"`, which depends on
/// the target's clean task and on the `"PreBuild-All"` root.
pub fn pre_build_task<'a>(
    registry: &'a mut TaskRegistry,
    target_name: &str,
    is_target: bool,
    parent_task_name: &str,
) -> Result<TaskBuilder<'a>> {
    let id = add_to_phase(
        registry,
        Phase::PreBuild,
        target_name,
        is_target,
        parent_task_name,
    )?;
    Ok(TaskBuilder::new(registry, id))
}

/// Add a task to the Build phase of the build pipeline.
///
/// Top-level targets resolve to `"Build-{target}"`, with the PreBuild and
/// Clean tasks for the same target wired in automatically. Nested tasks
/// resolve to `"{parent}-{target}"` and depend on their parent target.
///
/// # Example
///
/// ```
/// use phasr::{build_task, TaskRegistry};
///
/// let mut registry = TaskRegistry::new();
/// build_task(&mut registry, "Sln", true, "")?;
///
/// assert!(registry.has_dependency("Build-Sln", "PreBuild-Sln"));
/// assert!(registry.has_dependency("Build-Sln", "Build-All"));
/// # Ok::<(), phasr::PhasrError>(())
/// ```
pub fn build_task<'a>(
    registry: &'a mut TaskRegistry,
    target_name: &str,
    is_target: bool,
    parent_task_name: &str,
) -> Result<TaskBuilder<'a>> {
    let id = add_to_phase(
        registry,
        Phase::Build,
        target_name,
        is_target,
        parent_task_name,
    )?;
    Ok(TaskBuilder::new(registry, id))
}

/// Add a task to the PostBuild phase of the build pipeline.
///
/// PostBuild roots depend on their Build counterparts only when the
/// registry's `build_all_dependencies` setting is enabled at the time the
/// root is first created.
pub fn post_build_task<'a>(
    registry: &'a mut TaskRegistry,
    target_name: &str,
    is_target: bool,
    parent_task_name: &str,
) -> Result<TaskBuilder<'a>> {
    let id = add_to_phase(
        registry,
        Phase::PostBuild,
        target_name,
        is_target,
        parent_task_name,
    )?;
    Ok(TaskBuilder::new(registry, id))
}

/// Resolve a task into a phase of the build pipeline.
///
/// Targets become phase roots hanging off the phase's "All" root; nested
/// tasks keep the bare "{parent}-{target}" name and hang off their parent
/// target, which is materialized first.
fn add_to_phase(
    registry: &mut TaskRegistry,
    phase: Phase,
    target_name: &str,
    is_target: bool,
    parent_task_name: &str,
) -> Result<TaskId> {
    validate_task_args(phase, target_name, is_target, parent_task_name)?;

    let parent_task = if is_target {
        phase_root(registry, phase, "", true)
    } else {
        add_to_phase(registry, phase, parent_task_name, true, "")?
    };

    let new_task = if is_target {
        phase_root(registry, phase, target_name, true)
    } else {
        let name = format!("{}-{}", parent_task_name, target_name);
        registry.get_task(&name, false, BUILD_CATEGORY, phase)
    };

    registry.add_dependency(new_task, parent_task);
    trace!(phase = %phase, is_target, "resolved pipeline task for {}", target_name);
    Ok(new_task)
}

/// Get or create a phase root, wiring its upstream phase.
///
/// An empty target name falls back to the registry's default target. For
/// targets, PreBuild roots pull in Clean and Build roots pull in PreBuild;
/// the PostBuild to Build edge is wired only when `build_all_dependencies`
/// is set at the time the PostBuild root is first created.
pub(crate) fn phase_root(
    registry: &mut TaskRegistry,
    phase: Phase,
    target_name: &str,
    is_target: bool,
) -> TaskId {
    let target = scoped_target(registry, target_name);

    if phase == Phase::Clean {
        return clean::clean_task(registry, BUILD_CATEGORY, &target, is_target);
    }

    let name = phase.task_name(BUILD_CATEGORY, &target);
    let existed = registry.has_task(&name);
    let id = registry.get_task(&name, is_target, BUILD_CATEGORY, phase);

    if is_target {
        let upstream = match phase {
            Phase::PreBuild | Phase::Build => phase.upstream(),
            Phase::PostBuild if !existed && registry.build_all_dependencies() => phase.upstream(),
            _ => None,
        };

        if let Some(upstream) = upstream {
            let upstream_root = phase_root(registry, upstream, &target, true);
            registry.add_dependency(id, upstream_root);
        }
    }

    id
}

/// Reject empty target names, and nested tasks without a parent name.
pub(crate) fn validate_task_args(
    phase: Phase,
    target_name: &str,
    is_target: bool,
    parent_task_name: &str,
) -> Result<()> {
    if target_name.trim().is_empty() {
        return Err(PhasrError::EmptyTargetName { phase });
    }

    if !is_target && parent_task_name.trim().is_empty() {
        return Err(PhasrError::MissingParentTask {
            target: target_name.to_string(),
            phase,
        });
    }

    Ok(())
}

/// Fall back to the registry's default target for blank target names.
pub(crate) fn scoped_target(registry: &TaskRegistry, target_name: &str) -> String {
    if target_name.trim().is_empty() {
        registry.default_target().to_string()
    } else {
        target_name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(registry: &TaskRegistry) -> Vec<String> {
        let mut names: Vec<String> = registry.task_names().map(String::from).collect();
        names.sort();
        names
    }

    #[test]
    fn test_build_target_wires_phase_chain() {
        let mut registry = TaskRegistry::new();

        let builder = build_task(&mut registry, "Sln", true, "").unwrap();
        assert_eq!(builder.name(), "Build-Sln");

        assert_eq!(
            names(&registry),
            vec![
                "Build-All",
                "Build-Sln",
                "Clean-Build-All",
                "Clean-Build-Sln",
                "PreBuild-All",
                "PreBuild-Sln",
            ]
        );

        // Per-target phase chain
        assert!(registry.has_dependency("Build-Sln", "PreBuild-Sln"));
        assert!(registry.has_dependency("PreBuild-Sln", "Clean-Build-Sln"));

        // Target hangs off the phase's All root, which has its own chain
        assert!(registry.has_dependency("Build-Sln", "Build-All"));
        assert!(registry.has_dependency("Build-All", "PreBuild-All"));
        assert!(registry.has_dependency("PreBuild-All", "Clean-Build-All"));
    }

    #[test]
    fn test_execution_order_runs_clean_pre_build_build() {
        let mut registry = TaskRegistry::new();
        build_task(&mut registry, "Sln", true, "").unwrap();

        let order = registry.execution_order("Build-Sln").unwrap();
        let ordered: Vec<_> = order
            .iter()
            .map(|&id| registry.task(id).unwrap().name.as_str())
            .collect();

        let position = |name: &str| ordered.iter().position(|&n| n == name).unwrap();
        assert_eq!(ordered.len(), 6);
        assert!(position("Clean-Build-Sln") < position("PreBuild-Sln"));
        assert!(position("PreBuild-Sln") < position("Build-Sln"));
        assert!(position("Clean-Build-All") < position("PreBuild-All"));
        assert!(position("PreBuild-All") < position("Build-All"));
        assert!(position("Build-All") < position("Build-Sln"));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut registry = TaskRegistry::new();

        let first = build_task(&mut registry, "Sln", true, "").unwrap().finish();
        let nodes = registry.len();
        let edges = registry.edge_count();

        let second = build_task(&mut registry, "Sln", true, "").unwrap().finish();

        assert_eq!(first, second);
        assert_eq!(registry.len(), nodes);
        assert_eq!(registry.edge_count(), edges);
    }

    #[test]
    fn test_nested_task_depends_on_parent_target() {
        let mut registry = TaskRegistry::new();

        let builder = build_task(&mut registry, "Step1", false, "Sln").unwrap();
        assert_eq!(builder.name(), "Sln-Step1");

        // The parent target is materialized with its full chain
        assert!(registry.has_task("Build-Sln"));
        assert!(registry.has_task("PreBuild-Sln"));
        assert!(registry.has_dependency("Sln-Step1", "Build-Sln"));
        assert!(!registry.has_dependency("Sln-Step1", "Build-All"));
    }

    #[test]
    fn test_nested_task_is_not_a_target() {
        let mut registry = TaskRegistry::new();
        let id = build_task(&mut registry, "Step1", false, "Sln")
            .unwrap()
            .finish();

        let node = registry.task(id).unwrap();
        assert!(!node.is_target);
        assert_eq!(node.phase, Phase::Build);
        assert_eq!(node.category, "Build");
    }

    #[test]
    fn test_nested_execution_pulls_in_parent_chain() {
        let mut registry = TaskRegistry::new();
        build_task(&mut registry, "Step1", false, "Sln").unwrap();

        let order = registry.execution_order("Sln-Step1").unwrap();
        let ordered: Vec<_> = order
            .iter()
            .map(|&id| registry.task(id).unwrap().name.as_str())
            .collect();

        let position = |name: &str| ordered.iter().position(|&n| n == name).unwrap();
        assert!(position("Build-Sln") < position("Sln-Step1"));
        assert!(position("PreBuild-Sln") < position("Build-Sln"));
    }

    #[test]
    fn test_all_target_resolves_to_phase_root() {
        let mut registry = TaskRegistry::new();

        let id = build_task(&mut registry, "All", true, "").unwrap().finish();

        assert_eq!(registry.task(id).unwrap().name, "Build-All");
        assert!(registry.execution_order("Build-All").is_ok());
    }

    #[test]
    fn test_pre_build_target() {
        let mut registry = TaskRegistry::new();

        let builder = pre_build_task(&mut registry, "Sln", true, "").unwrap();
        assert_eq!(builder.name(), "PreBuild-Sln");

        assert!(registry.has_dependency("PreBuild-Sln", "Clean-Build-Sln"));
        assert!(registry.has_dependency("PreBuild-Sln", "PreBuild-All"));
    }

    #[test]
    fn test_clean_target() {
        let mut registry = TaskRegistry::new();

        let builder = build_clean_task(&mut registry, "Sln", true, "").unwrap();
        assert_eq!(builder.name(), "Clean-Build-Sln");

        assert!(registry.has_dependency("Clean-Build-Sln", "Clean-Build-All"));
        // Clean has no upstream phase
        assert_eq!(registry.dependencies("Clean-Build-All"), Some(vec![]));
    }

    #[test]
    fn test_post_build_without_flag_skips_build_edge() {
        let mut registry = TaskRegistry::new();

        post_build_task(&mut registry, "Sln", true, "").unwrap();

        assert!(registry.has_task("PostBuild-Sln"));
        assert!(!registry.has_dependency("PostBuild-Sln", "Build-Sln"));
        assert!(!registry.has_task("Build-Sln"));
    }

    #[test]
    fn test_post_build_with_flag_wires_build_edge() {
        let mut registry = TaskRegistry::new();
        registry.set_build_all_dependencies(true);

        post_build_task(&mut registry, "Sln", true, "").unwrap();

        assert!(registry.has_dependency("PostBuild-Sln", "Build-Sln"));
        assert!(registry.has_dependency("PostBuild-All", "Build-All"));
        // The Build roots bring their own upstream chain with them
        assert!(registry.has_dependency("Build-Sln", "PreBuild-Sln"));
    }

    #[test]
    fn test_post_build_flag_checked_at_first_resolution_only() {
        let mut registry = TaskRegistry::new();

        post_build_task(&mut registry, "Sln", true, "").unwrap();
        registry.set_build_all_dependencies(true);
        post_build_task(&mut registry, "Sln", true, "").unwrap();

        assert!(!registry.has_dependency("PostBuild-Sln", "Build-Sln"));
    }

    #[test]
    fn test_post_build_edge_survives_flag_changes() {
        let mut registry = TaskRegistry::new();
        registry.set_build_all_dependencies(true);

        post_build_task(&mut registry, "Sln", true, "").unwrap();
        registry.set_build_all_dependencies(false);
        post_build_task(&mut registry, "Sln", true, "").unwrap();

        assert!(registry.has_dependency("PostBuild-Sln", "Build-Sln"));
    }

    #[test]
    fn test_empty_target_rejected_by_every_phase() {
        let mut registry = TaskRegistry::new();

        assert!(matches!(
            build_clean_task(&mut registry, "", true, ""),
            Err(PhasrError::EmptyTargetName { phase: Phase::Clean })
        ));
        assert!(matches!(
            pre_build_task(&mut registry, "  ", true, ""),
            Err(PhasrError::EmptyTargetName { phase: Phase::PreBuild })
        ));
        assert!(matches!(
            build_task(&mut registry, "", true, ""),
            Err(PhasrError::EmptyTargetName { phase: Phase::Build })
        ));
        assert!(matches!(
            post_build_task(&mut registry, "", true, ""),
            Err(PhasrError::EmptyTargetName { phase: Phase::PostBuild })
        ));

        // Fail-fast: nothing was created
        assert!(registry.is_empty());
    }

    #[test]
    fn test_nested_without_parent_rejected() {
        let mut registry = TaskRegistry::new();

        let result = build_task(&mut registry, "Step1", false, " ");
        assert!(matches!(
            result,
            Err(PhasrError::MissingParentTask { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_custom_default_target_scopes_roots() {
        let mut registry = TaskRegistry::with_settings(crate::RegistrySettings {
            build_all_dependencies: false,
            default_target: "Everything".to_string(),
        });

        build_task(&mut registry, "Sln", true, "").unwrap();

        assert!(registry.has_dependency("Build-Sln", "Build-Everything"));
        assert!(!registry.has_task("Build-All"));
    }

    #[test]
    fn test_phases_share_clean_root() {
        let mut registry = TaskRegistry::new();

        pre_build_task(&mut registry, "Sln", true, "").unwrap();
        build_task(&mut registry, "Web", true, "").unwrap();

        // Both targets' chains reach the same Clean-Build-All root
        let order = registry.execution_order("Build-Web").unwrap();
        let ordered: Vec<_> = order
            .iter()
            .map(|&id| registry.task(id).unwrap().name.as_str())
            .collect();
        assert!(ordered.contains(&"Clean-Build-All"));
        assert!(registry.has_dependency("PreBuild-Sln", "Clean-Build-Sln"));
    }
}
