use std::collections::BTreeSet;

use flexfn_output::Urn;
use serde::Serialize;
use serde_json::Value;

use crate::Deployment;

/// What happens to one resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Operation {
    /// The resource does not exist yet.
    Create,
    /// Some inputs differ.
    Update {
        /// The top-level input properties that changed.
        changed: Vec<String>,
    },
    /// The resource is no longer declared.
    Delete,
    /// Nothing to do.
    Same,
}

/// One step of a [`Plan`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Step {
    /// The resource concerned.
    pub urn: Urn,
    /// What happens to it.
    #[serde(flatten)]
    pub operation: Operation,
}

/// The steps that take one deployment to another.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    steps: Vec<Step>,
}

impl Plan {
    /// Compares the inputs of two deployments.
    ///
    /// Creates and updates follow `desired`'s creation order; deletes come last,
    /// dependents before their dependencies.
    pub fn between(previous: &Deployment, desired: &Deployment) -> Self {
        let mut steps = desired
            .resources
            .iter()
            .map(|(urn, want)| {
                let operation = match previous.resource(urn) {
                    None => Operation::Create,
                    Some(have) => {
                        let changed = changed_properties(&have.inputs, &want.inputs);
                        if changed.is_empty() {
                            Operation::Same
                        } else {
                            Operation::Update { changed }
                        }
                    }
                };
                Step {
                    urn: urn.clone(),
                    operation,
                }
            })
            .collect::<Vec<_>>();

        steps.extend(
            previous
                .resources
                .keys()
                .rev()
                .filter(|urn| desired.resource(urn).is_none())
                .map(|urn| Step {
                    urn: urn.clone(),
                    operation: Operation::Delete,
                }),
        );
        Self { steps }
    }

    /// Deletes everything in `current`, dependents first.
    pub fn teardown(current: &Deployment) -> Self {
        Self::between(current, &Deployment::default())
    }

    /// All steps, including unchanged resources.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Steps that change something.
    pub fn changes(&self) -> impl Iterator<Item = &Step> {
        self.steps
            .iter()
            .filter(|step| step.operation != Operation::Same)
    }

    /// Whether applying the plan would change nothing.
    pub fn is_noop(&self) -> bool {
        self.changes().next().is_none()
    }
}

fn changed_properties(old: &Value, new: &Value) -> Vec<String> {
    match (old.as_object(), new.as_object()) {
        (Some(old), Some(new)) => old
            .keys()
            .chain(new.keys())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter(|key| old.get(*key) != new.get(*key))
            .cloned()
            .collect(),
        _ if old != new => vec![String::new()],
        _ => vec![],
    }
}
