//! A Flex Consumption function app with everything it needs to run.
//!
//! [`FunctionAppComponent`] declares a storage account, the blob container
//! deployment packages are uploaded to, a Linux Flex Consumption hosting plan,
//! the function app itself with a system-assigned identity, and a role
//! assignment that lets that identity read and write the account's blobs.
//! Nothing is provisioned here; the declarations land in a
//! [`Context`](flexfn_resource::Context) for an engine to act on.

#![deny(missing_docs)]

use flexfn_azure::{
    authorization::{PrincipalType, RoleAssignment, RoleAssignmentArgs},
    roles::BuiltInRole,
    storage::{BlobContainer, BlobContainerArgs, Kind, SkuName, StorageAccount, StorageAccountArgs},
    web::{
        AppServicePlan, AppServicePlanArgs, AuthenticationType, FunctionAppConfig,
        FunctionsDeploymentStorage, FunctionsDeploymentStorageType, ManagedServiceIdentityType,
        SkuDescription, WebApp, WebAppArgs, FUNCTION_APP_LINUX_KIND,
    },
};
use flexfn_output::{concat, Output, Urn};
use flexfn_resource::{Context, Properties, ResourceOptions, Result};

mod args;
mod settings;

pub use args::{FunctionAppArgs, DEFAULT_INSTANCE_MEMORY_MB, DEFAULT_MAXIMUM_INSTANCE_COUNT};
pub use settings::{
    default_app_settings, duplicate_names, merge_app_settings, STORAGE_ACCOUNT_NAME_SETTING,
};

/// Type token of [`FunctionAppComponent`].
pub const COMPONENT_TYPE: &str = "azure-native:functionapp:FunctionAppComponent";
/// Name of the container deployment packages are uploaded to.
pub const DEPLOYMENT_CONTAINER_NAME: &str = "deploymentpackage";
/// Hosting plan tier.
pub const PLAN_TIER: &str = "FlexConsumption";
/// Hosting plan SKU.
pub const PLAN_SKU: &str = "FC1";

/// The outputs a [`FunctionAppComponent`] registers.
#[derive(Clone, Debug)]
pub struct FunctionAppOutputs {
    /// Physical name of the storage account.
    pub storage_account_name: Output<String>,
    /// Physical name of the function app.
    pub function_app_name: Output<String>,
    /// Physical name of the hosting plan.
    pub service_plan_name: Output<String>,
    /// Host names the function app is reachable on.
    pub function_app_url: Output<Vec<String>>,
}

/// A function app, its storage and hosting plan, and the grant between them.
#[derive(Clone, Debug)]
pub struct FunctionAppComponent {
    urn: Urn,
    storage_account: StorageAccount,
    blob_container: BlobContainer,
    service_plan: AppServicePlan,
    function_app: WebApp,
    role_assignment: RoleAssignment,
}

impl FunctionAppComponent {
    /// Declares the component and its five children in `ctx`.
    ///
    /// The storage account, hosting plan and function app are named `name`;
    /// the container and role assignment get `name` as a prefix.
    pub fn new(
        ctx: &mut Context,
        name: &str,
        args: FunctionAppArgs,
        options: &ResourceOptions,
    ) -> Result<Self> {
        let urn = ctx.register_component(COMPONENT_TYPE, name, options)?;
        let children = ResourceOptions::new().with_parent(&urn);
        let scale_and_concurrency = args.scale_and_concurrency();

        let storage_account = StorageAccount::new(
            ctx,
            name,
            StorageAccountArgs {
                resource_group_name: args.resource_group_name.clone(),
                allow_blob_public_access: false,
                kind: Kind::StorageV2,
                sku: SkuName::StandardLrs,
            },
            &children,
        )?;

        let blob_container = BlobContainer::new(
            ctx,
            &format!("{name}-deploymentPackageContainer"),
            BlobContainerArgs {
                resource_group_name: args.resource_group_name.clone(),
                account_name: storage_account.name(),
                container_name: DEPLOYMENT_CONTAINER_NAME.to_string(),
            },
            &children,
        )?;

        let service_plan = AppServicePlan::new(
            ctx,
            name,
            AppServicePlanArgs {
                resource_group_name: args.resource_group_name.clone(),
                sku: SkuDescription {
                    tier: PLAN_TIER.to_string(),
                    name: PLAN_SKU.to_string(),
                },
                reserved: true,
            },
            &children,
        )?;

        let app_settings = merge_app_settings(
            default_app_settings(storage_account.name()),
            args.app_settings,
        );

        let function_app = WebApp::new(
            ctx,
            name,
            WebAppArgs {
                resource_group_name: args.resource_group_name,
                kind: FUNCTION_APP_LINUX_KIND.to_string(),
                server_farm_id: service_plan.id(),
                identity: ManagedServiceIdentityType::SystemAssigned,
                app_settings,
                function_app_config: FunctionAppConfig {
                    deployment_storage: FunctionsDeploymentStorage {
                        kind: FunctionsDeploymentStorageType::BlobContainer,
                        value: concat([
                            storage_account.primary_blob_endpoint(),
                            blob_container.name(),
                        ]),
                        authentication: AuthenticationType::SystemAssignedIdentity,
                    },
                    scale_and_concurrency,
                    runtime: args.runtime,
                },
            },
            &children,
        )?;

        let role_assignment = RoleAssignment::new(
            ctx,
            &format!("{name}-storageBlobDataContributor"),
            RoleAssignmentArgs {
                role: BuiltInRole::STORAGE_BLOB_DATA_CONTRIBUTOR,
                scope: storage_account.id(),
                principal_id: function_app.principal_id(),
                principal_type: PrincipalType::ServicePrincipal,
            },
            &children,
        )?;

        let component = Self {
            urn,
            storage_account,
            blob_container,
            service_plan,
            function_app,
            role_assignment,
        };
        let outputs = component.outputs();
        ctx.register_outputs(
            &component.urn,
            Properties::new()
                .with_output("storageAccountName", outputs.storage_account_name)
                .with_output("functionAppName", outputs.function_app_name)
                .with_output("servicePlanName", outputs.service_plan_name)
                .with_output("functionAppUrl", outputs.function_app_url),
        )?;
        tracing::debug!(urn = %component.urn, "Declared function app component");
        Ok(component)
    }

    /// The component's URN; every child is parented to it.
    pub fn urn(&self) -> &Urn {
        &self.urn
    }

    /// The storage account holding deployment packages and host state.
    pub fn storage_account(&self) -> &StorageAccount {
        &self.storage_account
    }

    /// The deployment package container.
    pub fn blob_container(&self) -> &BlobContainer {
        &self.blob_container
    }

    /// The hosting plan.
    pub fn service_plan(&self) -> &AppServicePlan {
        &self.service_plan
    }

    /// The function app.
    pub fn function_app(&self) -> &WebApp {
        &self.function_app
    }

    /// The blob access grant for the function app's identity.
    pub fn role_assignment(&self) -> &RoleAssignment {
        &self.role_assignment
    }

    /// URNs of the children, in declaration order.
    pub fn children(&self) -> [&Urn; 5] {
        [
            self.storage_account.urn(),
            self.blob_container.urn(),
            self.service_plan.urn(),
            self.function_app.urn(),
            self.role_assignment.urn(),
        ]
    }

    /// The component's outputs, as deferred values.
    pub fn outputs(&self) -> FunctionAppOutputs {
        FunctionAppOutputs {
            storage_account_name: self.storage_account.name(),
            function_app_name: self.function_app.name(),
            service_plan_name: self.service_plan.name(),
            function_app_url: self.function_app.host_names(),
        }
    }
}
