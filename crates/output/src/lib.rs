//! Deferred values for resource declarations.
//!
//! An [`Output`] stands for a value that only becomes known once the
//! provisioning engine has created the resources it was derived from. Code that
//! declares resources composes outputs with [`Output::map`], [`Output::zip`],
//! [`all`] and [`concat`]; it never reads them. Only an engine holding the
//! provisioned state (a [`StateLookup`]) can [`Output::resolve`] one.

#![deny(missing_docs)]

use std::{collections::BTreeSet, fmt, sync::Arc};

use serde::de::DeserializeOwned;
use serde_json::Value;

mod state;
mod urn;

pub use state::StateLookup;
pub use urn::{ParseUrnError, Urn};

/// Type alias for a [`Result`]s with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned when resolving an [`Output`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The referenced resource, or the property on it, has not been provisioned.
    #[error("property '{property}' of {urn} is not known yet")]
    Unresolved {
        /// The resource the property belongs to.
        urn: Urn,
        /// The dotted property path.
        property: String,
    },
    /// The provisioned property does not have the expected shape.
    #[error("property '{property}' of {urn} has an unexpected shape")]
    Decode {
        /// The resource the property belongs to.
        urn: Urn,
        /// The dotted property path.
        property: String,
        /// The underlying decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// A fallible transform applied with [`Output::try_map`] failed.
    #[error("failed to transform deferred value")]
    Transform(#[source] Box<dyn std::error::Error + Send + Sync>),
}

type Eval<T> = dyn Fn(&dyn StateLookup) -> Result<T> + Send + Sync;

/// A value that is only known once the resources it depends on exist.
///
/// Cloning an output is cheap; clones share the same underlying computation.
pub struct Output<T> {
    dependencies: BTreeSet<Urn>,
    eval: Arc<Eval<T>>,
}

impl<T> Clone for Output<T> {
    fn clone(&self) -> Self {
        Self {
            dependencies: self.dependencies.clone(),
            eval: self.eval.clone(),
        }
    }
}

impl<T> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> Output<T> {
    /// An output whose value is known at declaration time.
    pub fn known(value: T) -> Self {
        Self {
            dependencies: BTreeSet::new(),
            eval: Arc::new(move |_: &dyn StateLookup| -> Result<T> { Ok(value.clone()) }),
        }
    }
}

impl<T: DeserializeOwned + Send + Sync + 'static> Output<T> {
    /// An output reading the property at the dotted `path` of a provisioned
    /// resource, e.g. `primaryEndpoints.blob` or `hostNames.0`.
    pub fn property(urn: Urn, path: impl Into<String>) -> Self {
        let path = path.into();
        let dependencies = BTreeSet::from([urn.clone()]);
        let eval = move |state: &dyn StateLookup| -> Result<T> {
            let value = state
                .outputs(&urn)
                .and_then(|outputs| walk(outputs, &path))
                .filter(|value| !value.is_null())
                .ok_or_else(|| Error::Unresolved {
                    urn: urn.clone(),
                    property: path.clone(),
                })?;
            serde_json::from_value(value.clone()).map_err(|source| Error::Decode {
                urn: urn.clone(),
                property: path.clone(),
                source,
            })
        };
        Self {
            dependencies,
            eval: Arc::new(eval),
        }
    }
}

impl<T: Send + Sync + 'static> Output<T> {
    /// Transforms the eventual value.
    pub fn map<U, F>(self, f: F) -> Output<U>
    where
        U: Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let eval = self.eval;
        Output {
            dependencies: self.dependencies,
            eval: Arc::new(move |state: &dyn StateLookup| eval(state).map(&f)),
        }
    }

    /// Transforms the eventual value with a function that may fail.
    pub fn try_map<U, E, F>(self, f: F) -> Output<U>
    where
        U: Send + Sync + 'static,
        E: std::error::Error + Send + Sync + 'static,
        F: Fn(T) -> std::result::Result<U, E> + Send + Sync + 'static,
    {
        let eval = self.eval;
        Output {
            dependencies: self.dependencies,
            eval: Arc::new(move |state: &dyn StateLookup| -> Result<U> {
                f(eval(state)?).map_err(|err| Error::Transform(Box::new(err)))
            }),
        }
    }

    /// Combines two outputs into one that depends on both.
    pub fn zip<U: Send + Sync + 'static>(self, other: Output<U>) -> Output<(T, U)> {
        let mut dependencies = self.dependencies;
        dependencies.extend(other.dependencies);
        let (left, right) = (self.eval, other.eval);
        Output {
            dependencies,
            eval: Arc::new(move |state: &dyn StateLookup| -> Result<(T, U)> {
                Ok((left(state)?, right(state)?))
            }),
        }
    }

    /// The resources whose provisioning this output waits on.
    pub fn dependencies(&self) -> impl Iterator<Item = &Urn> {
        self.dependencies.iter()
    }

    /// Whether the output waits on the given resource.
    pub fn depends_on(&self, urn: &Urn) -> bool {
        self.dependencies.contains(urn)
    }

    /// Whether the value is available without provisioning anything.
    pub fn is_known(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Computes the value against provisioned state.
    ///
    /// This is the engine's half of the contract: declarations hand outputs to
    /// each other and never call this themselves.
    pub fn resolve(&self, state: &dyn StateLookup) -> Result<T> {
        (self.eval)(state)
    }
}

impl<T: Clone + Send + Sync + 'static> From<T> for Output<T> {
    fn from(value: T) -> Self {
        Self::known(value)
    }
}

/// Collects many outputs into one output of all their values, in order.
pub fn all<T: Send + Sync + 'static>(
    outputs: impl IntoIterator<Item = Output<T>>,
) -> Output<Vec<T>> {
    let outputs = outputs.into_iter().collect::<Vec<_>>();
    let dependencies = outputs
        .iter()
        .flat_map(|output| output.dependencies.iter().cloned())
        .collect();
    let evals = outputs.into_iter().map(|o| o.eval).collect::<Vec<_>>();
    Output {
        dependencies,
        eval: Arc::new(move |state: &dyn StateLookup| -> Result<Vec<T>> {
            evals.iter().map(|eval| eval(state)).collect()
        }),
    }
}

/// Joins string outputs end to end.
pub fn concat(parts: impl IntoIterator<Item = Output<String>>) -> Output<String> {
    all(parts).map(|parts| parts.concat())
}

fn walk<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |value, segment| match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}
