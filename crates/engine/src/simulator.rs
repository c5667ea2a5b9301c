//! Stand-ins for the cloud during preview.

use std::fmt::Debug;

use async_trait::async_trait;
use flexfn_output::Urn;
use serde_json::Value;

mod azure;

pub use azure::AzureSimulator;

/// A request to create one resource.
#[derive(Debug)]
pub struct CreateRequest<'a> {
    /// The resource being created.
    pub urn: &'a Urn,
    /// Its fully resolved inputs.
    pub inputs: &'a Value,
}

impl CreateRequest<'_> {
    /// The resource's type token.
    pub fn type_token(&self) -> &str {
        self.urn.type_token()
    }

    /// The resource's logical name.
    pub fn name(&self) -> &str {
        self.urn.name()
    }
}

/// What the simulated provider reports back for a created resource.
#[derive(Clone, Debug, PartialEq)]
pub struct Provisioned {
    /// The provider-assigned resource ID.
    pub id: String,
    /// Provider-generated properties; these take precedence over inputs of the
    /// same name.
    pub outputs: Value,
}

/// Fabricates provider-generated properties for declared resources.
///
/// Implementations should be deterministic so that previewing the same
/// declarations twice yields identical deployments.
#[async_trait]
pub trait Simulator: Debug + Send + Sync {
    /// Simulates creating a resource.
    async fn create(&self, request: &CreateRequest<'_>) -> anyhow::Result<Provisioned>;
}
