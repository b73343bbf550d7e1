//! Build pipeline phases
//!
//! Every task belongs to one of four phases. Phase-root tasks chain
//! upstream (Build pulls in PreBuild, PreBuild pulls in Clean) so running
//! a phase root runs everything the phase depends on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category tag for tasks created by the build-family helpers.
pub const BUILD_CATEGORY: &str = "Build";

/// A phase of the build pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Phase {
    Clean,
    PreBuild,
    Build,
    PostBuild,
}

impl Phase {
    /// All phases in pipeline order.
    pub const ALL: [Phase; 4] = [Phase::Clean, Phase::PreBuild, Phase::Build, Phase::PostBuild];

    /// The name prefix used for this phase's tasks.
    pub fn prefix(self) -> &'static str {
        match self {
            Phase::Clean => "Clean",
            Phase::PreBuild => "PreBuild",
            Phase::Build => "Build",
            Phase::PostBuild => "PostBuild",
        }
    }

    /// The phase that must run before this one, if any.
    pub fn upstream(self) -> Option<Phase> {
        match self {
            Phase::Clean => None,
            Phase::PreBuild => Some(Phase::Clean),
            Phase::Build => Some(Phase::PreBuild),
            Phase::PostBuild => Some(Phase::Build),
        }
    }

    /// Canonical task name for a phase root.
    ///
    /// Clean roots carry the category ("Clean-Build-All"); the other phases
    /// use the plain "{Phase}-{target}" form ("Build-Sln").
    pub fn task_name(self, category: &str, target: &str) -> String {
        match self {
            Phase::Clean => format!("{}-{}-{}", self.prefix(), category, target),
            _ => format!("{}-{}", self.prefix(), target),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}
