use flexfn_output::{Output, Urn};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// The input properties of a declaration, keyed by provider property name.
///
/// Values may be known up front or deferred; nested objects are built from
/// nested `Properties` so deferred values can appear at any depth.
#[derive(Clone, Debug, Default)]
pub struct Properties {
    entries: IndexMap<String, Output<Value>>,
}

impl Properties {
    /// Creates an empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property whose value is known now.
    ///
    /// A value that cannot be serialized fails when the inputs are resolved.
    pub fn with_value<T>(self, key: &str, value: T) -> Self
    where
        T: Serialize + Clone + Send + Sync + 'static,
    {
        self.insert(key, Output::known(value).try_map(serde_json::to_value))
    }

    /// Sets a property from a deferred value.
    pub fn with_output<T>(self, key: &str, value: Output<T>) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        self.insert(key, value.try_map(serde_json::to_value))
    }

    /// Sets a nested object property.
    pub fn with_object(self, key: &str, object: Properties) -> Self {
        self.insert(key, object.into_output())
    }

    /// Whether a property with the given key is set.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Every resource any property waits on.
    pub fn dependencies(&self) -> impl Iterator<Item = &Urn> {
        self.entries.values().flat_map(|output| output.dependencies())
    }

    /// Collapses the properties into a single deferred JSON object.
    pub fn into_output(self) -> Output<Value> {
        let (keys, values): (Vec<_>, Vec<_>) = self.entries.into_iter().unzip();
        flexfn_output::all(values).map(move |values| {
            Value::Object(keys.iter().cloned().zip(values).collect())
        })
    }

    fn insert(mut self, key: &str, value: Output<Value>) -> Self {
        self.entries.insert(key.to_string(), value);
        self
    }
}
