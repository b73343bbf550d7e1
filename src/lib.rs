//! phasr - phased build pipelines
//!
//! Wires deterministic Clean/PreBuild/Build/PostBuild task graphs for
//! build automation hosts. The host owns the build steps; phasr owns the
//! naming, the phase ordering, and the dependency graph.
//!
//! # Features
//!
//! - **Get-or-create registry** - tasks are keyed by name, so wiring the same
//!   target twice is a no-op
//! - **Deterministic naming** - `"Build-Sln"`, `"PreBuild-Sln"`,
//!   `"Clean-Build-Sln"`, nested `"Sln-Step1"`
//! - **Automatic phase chaining** - Build pulls in PreBuild, PreBuild pulls
//!   in Clean, per target
//! - **Opt-in PostBuild wiring** - PostBuild depends on Build only when
//!   `build_all_dependencies` is enabled
//! - **Dependency resolution** - topological execution order with cycle
//!   reporting
//! - **Run reports** - per-task outcome and timing, JSON-serializable
//!
//! # Example
//!
//! ```rust
//! use phasr::{build_task, run_target, TaskRegistry};
//!
//! fn main() -> phasr::Result<()> {
//!     let mut registry = TaskRegistry::new();
//!
//!     build_task(&mut registry, "Sln", true, "")?
//!         .with_description("Build the solution")
//!         .does(|| {
//!             println!("building the solution");
//!             Ok(())
//!         });
//!
//!     // The phase roots were wired automatically
//!     assert!(registry.has_task("PreBuild-Sln"));
//!     assert!(registry.has_task("Clean-Build-Sln"));
//!
//!     let report = run_target(&mut registry, "Build-Sln")?;
//!     assert_eq!(report.executed(), 1);
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod clean;
pub mod error;
pub mod phase;
pub mod pipeline;
pub mod registry;
pub mod runner;
pub mod settings;

#[cfg(feature = "logging")]
pub mod logging;

// Re-export main types
pub use builder::TaskBuilder;
pub use error::{ActionError, PhasrError, Result};
pub use phase::{Phase, BUILD_CATEGORY};
pub use pipeline::{build_clean_task, build_task, post_build_task, pre_build_task};
pub use registry::{
    EdgeExport, GraphExport, NodeExport, TaskAction, TaskId, TaskNode, TaskRegistry,
};
pub use runner::{run_target, RunReport, TaskOutcome, TaskRun};
pub use settings::RegistrySettings;
