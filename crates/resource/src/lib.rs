//! Resource declarations and the provisioning context that records them.
//!
//! Declaring a resource never creates anything: it records the desired state
//! in an explicit [`Context`] that a provisioning engine later walks. Outputs of
//! earlier declarations are referenced through [`ResourceHandle::output`] and
//! become the dependency edges of later ones.

#![deny(missing_docs)]

use serde::de::DeserializeOwned;

mod context;
mod properties;

pub use context::{Context, Declaration, DeclarationKind};
pub use flexfn_output::{Output, Urn};
pub use properties::Properties;

/// Type alias for a [`Result`]s with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned when recording declarations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two declarations produced the same URN.
    #[error("duplicate resource URN '{0}'; try giving it a unique name")]
    DuplicateResource(Urn),
    /// The parent named in the options has not been declared in this context.
    #[error("parent '{0}' has not been declared")]
    UnknownParent(Urn),
    /// A referenced declaration does not exist in this context.
    #[error("'{0}' has not been declared")]
    UnknownResource(Urn),
    /// Outputs can only be registered for components.
    #[error("'{0}' is not a component")]
    NotAComponent(Urn),
}

/// Options that place a declaration in the context.
#[derive(Clone, Debug, Default)]
pub struct ResourceOptions {
    /// The component that owns this declaration; it shares the parent's
    /// lifetime and its URN is qualified by the parent's type.
    pub parent: Option<Urn>,
    /// Extra dependencies not expressed through input values.
    pub depends_on: Vec<Urn>,
}

impl ResourceOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the owning component.
    pub fn with_parent(mut self, parent: &Urn) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Adds an explicit dependency.
    pub fn with_depends_on(mut self, urn: &Urn) -> Self {
        self.depends_on.push(urn.clone());
        self
    }
}

/// A declared resource, from which deferred outputs can be referenced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceHandle {
    urn: Urn,
}

impl ResourceHandle {
    /// Wraps the URN of a declared resource.
    pub fn new(urn: Urn) -> Self {
        Self { urn }
    }

    /// The resource's URN.
    pub fn urn(&self) -> &Urn {
        &self.urn
    }

    /// A deferred reference to a provider-reported property.
    pub fn output<T: DeserializeOwned + Send + Sync + 'static>(&self, path: &str) -> Output<T> {
        Output::property(self.urn.clone(), path)
    }

    /// The provider-assigned resource ID.
    pub fn id(&self) -> Output<String> {
        self.output("id")
    }

    /// The physical name the provider gave the resource.
    pub fn name(&self) -> Output<String> {
        self.output("name")
    }
}
