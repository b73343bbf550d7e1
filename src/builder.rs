//! Fluent task configuration
//!
//! The wiring helpers in [`crate::pipeline`] return a `TaskBuilder` so
//! callers can attach behavior to the task they just resolved.

use crate::error::ActionError;
use crate::registry::{TaskId, TaskRegistry};

/// Fluent handle to a task resolved by one of the wiring helpers.
///
/// Every method applies immediately to the registry; dropping the builder
/// loses nothing.
#[derive(Debug)]
pub struct TaskBuilder<'a> {
    registry: &'a mut TaskRegistry,
    id: TaskId,
}

impl<'a> TaskBuilder<'a> {
    pub(crate) fn new(registry: &'a mut TaskRegistry, id: TaskId) -> Self {
        Self { registry, id }
    }

    /// Handle to the underlying task
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Name of the underlying task
    pub fn name(&self) -> &str {
        &self.registry.node(self.id).name
    }

    /// Append an action to run when the task executes.
    ///
    /// Repeated calls accumulate; actions run in the order they were added.
    pub fn does<F>(mut self, action: F) -> Self
    where
        F: FnMut() -> std::result::Result<(), ActionError> + 'static,
    {
        self.registry.node_mut(self.id).push_action(Box::new(action));
        self
    }

    /// Set the task's description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.registry.node_mut(self.id).description = Some(description.into());
        self
    }

    /// Wire an extra dependency onto this task
    pub fn depends_on(mut self, dependency: TaskId) -> Self {
        self.registry.add_dependency(self.id, dependency);
        self
    }

    /// Finish building and return the task handle
    pub fn finish(self) -> TaskId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::Phase;

    fn builder_for<'a>(registry: &'a mut TaskRegistry, name: &str) -> TaskBuilder<'a> {
        let id = registry.get_task(name, true, "Build", Phase::Build);
        TaskBuilder::new(registry, id)
    }

    #[test]
    fn test_does_accumulates_actions() {
        let mut registry = TaskRegistry::new();

        let id = builder_for(&mut registry, "Build-Sln")
            .does(|| Ok(()))
            .does(|| Ok(()))
            .finish();

        assert_eq!(registry.task(id).unwrap().action_count(), 2);
    }

    #[test]
    fn test_with_description() {
        let mut registry = TaskRegistry::new();

        let id = builder_for(&mut registry, "Build-Sln")
            .with_description("Build the solution")
            .finish();

        assert_eq!(
            registry.task(id).unwrap().description.as_deref(),
            Some("Build the solution")
        );
    }

    #[test]
    fn test_depends_on_wires_edge() {
        let mut registry = TaskRegistry::new();
        let other = registry.get_task("Generate-Version", true, "Build", Phase::PreBuild);

        builder_for(&mut registry, "Build-Sln").depends_on(other);

        assert!(registry.has_dependency("Build-Sln", "Generate-Version"));
    }

    #[test]
    fn test_name_and_id_read_back() {
        let mut registry = TaskRegistry::new();

        let builder = builder_for(&mut registry, "Build-Sln");
        assert_eq!(builder.name(), "Build-Sln");

        let id = builder.id();
        assert_eq!(builder.finish(), id);
    }
}
