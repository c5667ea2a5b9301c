//! An in-process preview engine for resource declarations.
//!
//! The engine turns the declarations recorded in a
//! [`Context`](flexfn_resource::Context) into a dependency [`Graph`], walks it
//! wave by wave asking a [`Simulator`] to stand in for the cloud, and produces a
//! resolved [`Deployment`]. Two deployments can be compared into a [`Plan`].
//! Nothing here talks to a real control plane or persists state.

#![deny(missing_docs)]

mod deployment;
mod graph;
mod plan;
mod preview;
pub mod simulator;

pub use deployment::{ComponentState, Deployment, ResourceState};
pub use graph::Graph;
pub use plan::{Operation, Plan, Step};
pub use preview::preview;
pub use simulator::{CreateRequest, Provisioned, Simulator};

use flexfn_output::Urn;

/// Type alias for a [`Result`]s with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A declaration depends on something that was never declared.
    #[error("'{dependent}' depends on '{dependency}', which has not been declared")]
    UnknownDependency {
        /// The declaration with the dangling edge.
        dependent: Urn,
        /// The missing dependency.
        dependency: Urn,
    },
    /// The declarations depend on each other in a loop.
    #[error("dependency cycle between: {}", .0.iter().map(Urn::as_str).collect::<Vec<_>>().join(", "))]
    Cycle(Vec<Urn>),
    /// A declaration's inputs could not be resolved.
    #[error("failed to resolve inputs of '{urn}'")]
    Resolve {
        /// The declaration whose inputs failed.
        urn: Urn,
        /// The underlying failure.
        #[source]
        source: flexfn_output::Error,
    },
    /// The simulator refused to create a resource.
    #[error("failed to create '{urn}'")]
    Simulate {
        /// The resource that failed.
        urn: Urn,
        /// The simulator's error.
        #[source]
        source: anyhow::Error,
    },
}
