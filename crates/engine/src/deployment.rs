use flexfn_output::{StateLookup, Urn};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The resolved result of previewing a context.
///
/// Resources appear in the order they were created, so dependencies always
/// precede their dependents.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    /// Created resources.
    pub resources: IndexMap<Urn, ResourceState>,
    /// Components and their resolved outputs.
    pub components: IndexMap<Urn, ComponentState>,
}

/// One created resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceState {
    /// Provider type token.
    pub type_token: String,
    /// Logical name.
    pub name: String,
    /// Owning component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Urn>,
    /// Provider-assigned ID.
    pub id: String,
    /// The inputs it was created with.
    pub inputs: Value,
    /// Inputs overlaid with provider-generated properties.
    pub outputs: Value,
    /// The resources it waited for.
    pub dependencies: Vec<Urn>,
}

/// One component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentState {
    /// Component type token.
    pub type_token: String,
    /// Logical name.
    pub name: String,
    /// Owning component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Urn>,
    /// The outputs the component registered, resolved.
    pub outputs: Value,
}

impl Deployment {
    /// Looks up a created resource.
    pub fn resource(&self, urn: &Urn) -> Option<&ResourceState> {
        self.resources.get(urn)
    }

    /// Created resources of the given type.
    pub fn resources_of_type<'a>(
        &'a self,
        type_token: &'a str,
    ) -> impl Iterator<Item = (&'a Urn, &'a ResourceState)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, state)| state.type_token == type_token)
    }

    /// The resolved outputs of a component.
    pub fn component_outputs(&self, urn: &Urn) -> Option<&Value> {
        self.components.get(urn).map(|component| &component.outputs)
    }
}

impl StateLookup for Deployment {
    fn outputs(&self, urn: &Urn) -> Option<&Value> {
        self.resources
            .get(urn)
            .map(|resource| &resource.outputs)
            .or_else(|| self.component_outputs(urn))
    }
}
