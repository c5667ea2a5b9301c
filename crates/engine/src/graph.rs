use std::collections::{BTreeSet, HashSet};

use flexfn_output::Urn;
use flexfn_resource::{Context, Declaration};
use indexmap::IndexMap;

use crate::{Error, Result};

/// The dependency graph of the cloud resources in a context.
///
/// Components are not nodes: a dependency on a component stands for a
/// dependency on every resource it owns.
#[derive(Debug)]
pub struct Graph<'a> {
    nodes: IndexMap<&'a Urn, Node<'a>>,
}

#[derive(Debug)]
struct Node<'a> {
    declaration: &'a Declaration,
    dependencies: BTreeSet<Urn>,
}

impl<'a> Graph<'a> {
    /// Builds the graph from everything declared in `ctx`.
    pub fn from_context(ctx: &'a Context) -> Result<Self> {
        let mut nodes = IndexMap::new();
        for declaration in ctx.resources() {
            let mut dependencies = BTreeSet::new();
            for dependency in declaration.dependencies() {
                match ctx.get(&dependency) {
                    Some(target) if target.is_component() => dependencies.extend(
                        ctx.descendants(&dependency)
                            .into_iter()
                            .filter(|d| !d.is_component())
                            .map(|d| d.urn().clone()),
                    ),
                    Some(_) => {
                        dependencies.insert(dependency);
                    }
                    None => {
                        return Err(Error::UnknownDependency {
                            dependent: declaration.urn().clone(),
                            dependency,
                        })
                    }
                }
            }
            nodes.insert(
                declaration.urn(),
                Node {
                    declaration,
                    dependencies,
                },
            );
        }
        Ok(Self { nodes })
    }

    /// Resource URNs, in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Urn> {
        self.nodes.keys().copied()
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no resources.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// What the given resource waits for.
    pub fn dependencies_of(&self, urn: &Urn) -> Option<&BTreeSet<Urn>> {
        self.nodes.get(urn).map(|node| &node.dependencies)
    }

    /// Every `(dependent, dependency)` edge.
    pub fn edges(&self) -> Vec<(&Urn, &Urn)> {
        self.nodes
            .iter()
            .flat_map(|(urn, node)| node.dependencies.iter().map(move |dep| (*urn, dep)))
            .collect()
    }

    /// Groups resources into waves: each wave only depends on earlier waves,
    /// so everything within a wave can be created concurrently.
    pub fn waves(&self) -> Result<Vec<Vec<&'a Declaration>>> {
        let mut placed: HashSet<&Urn> = HashSet::new();
        let mut remaining = self.nodes.values().collect::<Vec<_>>();
        let mut waves = Vec::new();

        while !remaining.is_empty() {
            let (ready, blocked): (Vec<_>, Vec<_>) = remaining
                .into_iter()
                .partition(|node| node.dependencies.iter().all(|dep| placed.contains(dep)));
            if ready.is_empty() {
                let cycle = blocked
                    .iter()
                    .map(|node| node.declaration.urn().clone())
                    .collect();
                return Err(Error::Cycle(cycle));
            }
            placed.extend(ready.iter().map(|node| node.declaration.urn()));
            waves.push(ready.iter().map(|node| node.declaration).collect());
            remaining = blocked;
        }
        Ok(waves)
    }

    /// The order to delete resources in: dependents before their dependencies.
    pub fn teardown_order(&self) -> Result<Vec<&'a Urn>> {
        let waves = self.waves()?;
        Ok(waves
            .into_iter()
            .rev()
            .flat_map(|wave| wave.into_iter().rev().map(|d| d.urn()))
            .collect())
    }
}
