//! Built-in Azure role definitions.

use std::fmt;

/// A built-in role definition, identified by its well-known GUID.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuiltInRole {
    name: &'static str,
    guid: &'static str,
}

impl BuiltInRole {
    /// Read, write and delete blobs and containers.
    pub const STORAGE_BLOB_DATA_CONTRIBUTOR: Self = Self {
        name: "Storage Blob Data Contributor",
        guid: "ba92f5b4-2d11-453d-a403-e96b0029c9fe",
    };

    /// The role's display name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The role definition's resource ID.
    pub fn definition_id(&self) -> String {
        format!(
            "/providers/Microsoft.Authorization/roleDefinitions/{}",
            self.guid
        )
    }
}

impl fmt::Display for BuiltInRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
