use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::Urn;

/// Read access to the outputs of provisioned resources.
///
/// Implemented by provisioning engines; an [`Output`](crate::Output) can only
/// be resolved against one of these.
pub trait StateLookup: Send + Sync {
    /// Returns the provider-reported properties of the given resource, if it
    /// has been provisioned.
    fn outputs(&self, urn: &Urn) -> Option<&Value>;
}

impl StateLookup for BTreeMap<Urn, Value> {
    fn outputs(&self, urn: &Urn) -> Option<&Value> {
        self.get(urn)
    }
}

impl StateLookup for HashMap<Urn, Value> {
    fn outputs(&self, urn: &Urn) -> Option<&Value> {
        self.get(urn)
    }
}
