//! Clean-task helpers
//!
//! Clean tasks are category-scoped: every category gets its own
//! `"Clean-{category}-All"` root. The build pipeline uses category
//! `"Build"`; other task families can call these helpers with their own
//! category and get the same wiring.

use crate::error::Result;
use crate::phase::Phase;
use crate::pipeline::{scoped_target, validate_task_args};
use crate::registry::{TaskId, TaskRegistry};

/// Get or create the clean task for a category and target.
///
/// An empty target name falls back to the registry's default target, so
/// `clean_task(registry, "Build", "", true)` resolves the
/// `"Clean-Build-All"` root.
pub fn clean_task(
    registry: &mut TaskRegistry,
    category: &str,
    target_name: &str,
    is_target: bool,
) -> TaskId {
    let target = scoped_target(registry, target_name);
    let name = Phase::Clean.task_name(category, &target);
    registry.get_task(&name, is_target, category, Phase::Clean)
}

/// Add a task to a category's clean pipeline.
///
/// Top-level targets hang off the category's `"All"` clean root; nested
/// tasks keep the bare `"{parent}-{target}"` name and hang off their
/// parent target's clean task, which is materialized first.
pub fn add_to_clean_task(
    registry: &mut TaskRegistry,
    target_name: &str,
    category: &str,
    is_target: bool,
    parent_task_name: &str,
) -> Result<TaskId> {
    validate_task_args(Phase::Clean, target_name, is_target, parent_task_name)?;

    let parent_task = if is_target {
        clean_task(registry, category, "", true)
    } else {
        add_to_clean_task(registry, parent_task_name, category, true, "")?
    };

    let new_task = if is_target {
        clean_task(registry, category, target_name, true)
    } else {
        let name = format!("{}-{}", parent_task_name, target_name);
        registry.get_task(&name, false, category, Phase::Clean)
    };

    registry.add_dependency(new_task, parent_task);
    Ok(new_task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PhasrError;

    #[test]
    fn test_clean_root_naming() {
        let mut registry = TaskRegistry::new();

        let id = clean_task(&mut registry, "Build", "", true);
        assert_eq!(registry.task(id).unwrap().name, "Clean-Build-All");

        let sln = clean_task(&mut registry, "Build", "Sln", true);
        assert_eq!(registry.task(sln).unwrap().name, "Clean-Build-Sln");
    }

    #[test]
    fn test_clean_root_is_category_scoped() {
        let mut registry = TaskRegistry::new();

        clean_task(&mut registry, "Build", "", true);
        clean_task(&mut registry, "Unit", "", true);

        assert!(registry.has_task("Clean-Build-All"));
        assert!(registry.has_task("Clean-Unit-All"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_target_hangs_off_category_root() {
        let mut registry = TaskRegistry::new();

        let id = add_to_clean_task(&mut registry, "Sln", "Build", true, "").unwrap();

        assert_eq!(registry.task(id).unwrap().name, "Clean-Build-Sln");
        assert!(registry.has_dependency("Clean-Build-Sln", "Clean-Build-All"));
    }

    #[test]
    fn test_nested_clean_chain() {
        let mut registry = TaskRegistry::new();

        let id = add_to_clean_task(&mut registry, "Step1", "Build", false, "Sln").unwrap();

        assert_eq!(registry.task(id).unwrap().name, "Sln-Step1");
        assert!(registry.has_dependency("Sln-Step1", "Clean-Build-Sln"));
        assert!(registry.has_dependency("Clean-Build-Sln", "Clean-Build-All"));
    }

    #[test]
    fn test_clean_validation() {
        let mut registry = TaskRegistry::new();

        assert!(matches!(
            add_to_clean_task(&mut registry, "", "Build", true, ""),
            Err(PhasrError::EmptyTargetName { phase: Phase::Clean })
        ));
        assert!(matches!(
            add_to_clean_task(&mut registry, "Step1", "Build", false, ""),
            Err(PhasrError::MissingParentTask { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clean_task_nodes_carry_their_category() {
        let mut registry = TaskRegistry::new();

        let id = add_to_clean_task(&mut registry, "Fixtures", "Unit", true, "").unwrap();

        let node = registry.task(id).unwrap();
        assert_eq!(node.name, "Clean-Unit-Fixtures");
        assert_eq!(node.category, "Unit");
        assert_eq!(node.phase, Phase::Clean);
    }
}
