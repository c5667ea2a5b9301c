use std::collections::BTreeMap;

use flexfn_output::Urn;
use flexfn_resource::{Context, Declaration};
use futures::future::try_join_all;
use serde_json::Value;

use crate::{
    ComponentState, CreateRequest, Deployment, Error, Graph, Provisioned, ResourceState, Result,
    Simulator,
};

/// Resolves every declaration in `ctx`, letting `simulator` play the cloud.
///
/// Resources are created wave by wave; resources within a wave are created
/// concurrently. A resource's inputs are resolved only once everything it
/// depends on has been created. A component's outputs join the state as soon
/// as everything it owns exists, so later resources can read them.
pub async fn preview(ctx: &Context, simulator: &dyn Simulator) -> Result<Deployment> {
    let graph = Graph::from_context(ctx)?;
    let waves = graph.waves()?;

    let mut state: BTreeMap<Urn, Value> = BTreeMap::new();
    let mut deployment = Deployment::default();
    let mut pending: Vec<&Declaration> = ctx.components().collect();
    settle_components(ctx, &mut pending, &mut state, &mut deployment, false)?;

    for (index, wave) in waves.iter().enumerate() {
        tracing::info!(wave = index, resources = wave.len(), "Creating resources");

        let resolved = wave
            .iter()
            .map(|declaration| {
                let inputs = declaration
                    .inputs()
                    .resolve(&state)
                    .map_err(|source| Error::Resolve {
                        urn: declaration.urn().clone(),
                        source,
                    })?;
                Ok((*declaration, inputs))
            })
            .collect::<Result<Vec<_>>>()?;

        let created = try_join_all(resolved.iter().map(|(declaration, inputs)| async move {
            let request = CreateRequest {
                urn: declaration.urn(),
                inputs,
            };
            simulator
                .create(&request)
                .await
                .map_err(|source| Error::Simulate {
                    urn: declaration.urn().clone(),
                    source,
                })
        }))
        .await?;

        for ((declaration, inputs), provisioned) in resolved.into_iter().zip(created) {
            let urn = declaration.urn();
            tracing::debug!(%urn, id = %provisioned.id, "Created resource");
            let outputs = overlay(&inputs, provisioned);
            state.insert(urn.clone(), outputs.clone());
            deployment.resources.insert(
                urn.clone(),
                ResourceState {
                    type_token: declaration.type_token().to_string(),
                    name: declaration.name().to_string(),
                    parent: declaration.parent().cloned(),
                    id: outputs["id"].as_str().unwrap_or_default().to_string(),
                    inputs,
                    outputs,
                    dependencies: graph
                        .dependencies_of(urn)
                        .map(|deps| deps.iter().cloned().collect())
                        .unwrap_or_default(),
                },
            );
        }

        settle_components(ctx, &mut pending, &mut state, &mut deployment, false)?;
    }

    settle_components(ctx, &mut pending, &mut state, &mut deployment, true)?;

    Ok(deployment)
}

/// Resolves the outputs of every pending component whose descendants all exist.
///
/// Outputs that read something outside the component stay pending until it
/// exists too; on the final pass they fail instead.
fn settle_components<'a>(
    ctx: &'a Context,
    pending: &mut Vec<&'a Declaration>,
    state: &mut BTreeMap<Urn, Value>,
    deployment: &mut Deployment,
    last: bool,
) -> Result<()> {
    loop {
        let mut settled = false;
        let mut index = 0;
        while index < pending.len() {
            let component = pending[index];
            let owned_exist = ctx.descendants(component.urn()).iter().all(|d| {
                if d.is_component() {
                    deployment.components.contains_key(d.urn())
                } else {
                    state.contains_key(d.urn())
                }
            });
            if !owned_exist {
                index += 1;
                continue;
            }

            let outputs = match component.outputs().map(|outputs| outputs.resolve(&*state)) {
                Some(Ok(outputs)) => outputs,
                Some(Err(flexfn_output::Error::Unresolved { .. })) if !last => {
                    index += 1;
                    continue;
                }
                Some(Err(source)) => {
                    return Err(Error::Resolve {
                        urn: component.urn().clone(),
                        source,
                    })
                }
                None => Value::Object(Default::default()),
            };
            tracing::debug!(urn = %component.urn(), "Resolved component outputs");

            pending.remove(index);
            state.insert(component.urn().clone(), outputs.clone());
            deployment.components.insert(
                component.urn().clone(),
                ComponentState {
                    type_token: component.type_token().to_string(),
                    name: component.name().to_string(),
                    parent: component.parent().cloned(),
                    outputs,
                },
            );
            settled = true;
        }
        if !settled || pending.is_empty() {
            return Ok(());
        }
    }
}

/// Inputs with the provider's properties laid over them, plus `id`.
fn overlay(inputs: &Value, provisioned: Provisioned) -> Value {
    let mut merged = inputs.as_object().cloned().unwrap_or_default();
    if let Value::Object(outputs) = provisioned.outputs {
        merged.extend(outputs);
    }
    merged.insert("id".to_string(), Value::String(provisioned.id));
    Value::Object(merged)
}
