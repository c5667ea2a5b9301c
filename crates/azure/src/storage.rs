//! Storage accounts and blob containers.

use flexfn_resource::{Context, Output, Properties, ResourceHandle, ResourceOptions, Result};
use serde::{Deserialize, Serialize};

/// Type token of [`StorageAccount`].
pub const STORAGE_ACCOUNT_TYPE: &str = "azure-native:storage:StorageAccount";
/// Type token of [`BlobContainer`].
pub const BLOB_CONTAINER_TYPE: &str = "azure-native:storage:BlobContainer";

/// The kind of storage account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kind {
    /// Legacy general purpose v1.
    Storage,
    /// General purpose v2.
    StorageV2,
    /// Blob-only storage.
    BlobStorage,
    /// Premium file shares.
    FileStorage,
    /// Premium block blobs.
    BlockBlobStorage,
}

/// Storage redundancy SKU.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkuName {
    /// Locally redundant, standard performance.
    #[serde(rename = "Standard_LRS")]
    StandardLrs,
    /// Zone redundant, standard performance.
    #[serde(rename = "Standard_ZRS")]
    StandardZrs,
    /// Geo redundant, standard performance.
    #[serde(rename = "Standard_GRS")]
    StandardGrs,
    /// Locally redundant, premium performance.
    #[serde(rename = "Premium_LRS")]
    PremiumLrs,
}

/// Arguments of a [`StorageAccount`].
#[derive(Clone, Debug)]
pub struct StorageAccountArgs {
    /// The resource group to create the account in.
    pub resource_group_name: Output<String>,
    /// Whether blobs may be made publicly readable.
    pub allow_blob_public_access: bool,
    /// The account kind.
    pub kind: Kind,
    /// The redundancy SKU.
    pub sku: SkuName,
}

/// A declared storage account.
#[derive(Clone, Debug)]
pub struct StorageAccount {
    handle: ResourceHandle,
}

declared_resource!(StorageAccount);

impl StorageAccount {
    /// Declares a storage account.
    pub fn new(
        ctx: &mut Context,
        name: &str,
        args: StorageAccountArgs,
        options: &ResourceOptions,
    ) -> Result<Self> {
        let inputs = Properties::new()
            .with_output("resourceGroupName", args.resource_group_name)
            .with_value("allowBlobPublicAccess", args.allow_blob_public_access)
            .with_value("kind", args.kind)
            .with_object("sku", Properties::new().with_value("name", args.sku));
        let handle = ctx.register_resource(STORAGE_ACCOUNT_TYPE, name, inputs, options)?;
        Ok(Self { handle })
    }

    /// The blob service endpoint, including the trailing slash.
    pub fn primary_blob_endpoint(&self) -> Output<String> {
        self.handle.output("primaryEndpoints.blob")
    }
}

/// Arguments of a [`BlobContainer`].
#[derive(Clone, Debug)]
pub struct BlobContainerArgs {
    /// The resource group of the owning account.
    pub resource_group_name: Output<String>,
    /// The owning storage account's name.
    pub account_name: Output<String>,
    /// The container name.
    pub container_name: String,
}

/// A declared blob container.
#[derive(Clone, Debug)]
pub struct BlobContainer {
    handle: ResourceHandle,
}

declared_resource!(BlobContainer);

impl BlobContainer {
    /// Declares a blob container.
    pub fn new(
        ctx: &mut Context,
        name: &str,
        args: BlobContainerArgs,
        options: &ResourceOptions,
    ) -> Result<Self> {
        let inputs = Properties::new()
            .with_output("resourceGroupName", args.resource_group_name)
            .with_output("accountName", args.account_name)
            .with_value("containerName", args.container_name);
        let handle = ctx.register_resource(BLOB_CONTAINER_TYPE, name, inputs, options)?;
        Ok(Self { handle })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use flexfn_resource::Urn;
    use serde_json::{json, Value};

    use super::*;

    #[test]
    fn storage_account_serializes_provider_names() -> anyhow::Result<()> {
        let mut ctx = Context::new("dev", "proj");
        let account = StorageAccount::new(
            &mut ctx,
            "acct",
            StorageAccountArgs {
                resource_group_name: "rg".to_string().into(),
                allow_blob_public_access: false,
                kind: Kind::StorageV2,
                sku: SkuName::StandardLrs,
            },
            &ResourceOptions::new(),
        )?;

        let inputs = ctx
            .get(account.urn())
            .unwrap()
            .inputs()
            .resolve(&BTreeMap::<Urn, Value>::new())?;
        assert_eq!(
            json!({
                "resourceGroupName": "rg",
                "allowBlobPublicAccess": false,
                "kind": "StorageV2",
                "sku": { "name": "Standard_LRS" },
            }),
            inputs
        );
        Ok(())
    }

    #[test]
    fn container_waits_on_account_name() -> anyhow::Result<()> {
        let mut ctx = Context::new("dev", "proj");
        let account = StorageAccount::new(
            &mut ctx,
            "acct",
            StorageAccountArgs {
                resource_group_name: "rg".to_string().into(),
                allow_blob_public_access: false,
                kind: Kind::StorageV2,
                sku: SkuName::StandardLrs,
            },
            &ResourceOptions::new(),
        )?;
        let container = BlobContainer::new(
            &mut ctx,
            "pkg",
            BlobContainerArgs {
                resource_group_name: "rg".to_string().into(),
                account_name: account.name(),
                container_name: "deploymentpackage".to_string(),
            },
            &ResourceOptions::new(),
        )?;

        let declaration = ctx.get(container.urn()).unwrap();
        assert!(declaration.dependencies().contains(account.urn()));

        let state = BTreeMap::from([(account.urn().clone(), json!({ "name": "acct0001" }))]);
        let inputs = declaration.inputs().resolve(&state)?;
        assert_eq!("acct0001", inputs["accountName"]);
        assert_eq!("deploymentpackage", inputs["containerName"]);
        Ok(())
    }
}
