//! Hosting plans and function apps.

use std::{fmt, str::FromStr};

use flexfn_resource::{Context, Output, Properties, ResourceHandle, ResourceOptions, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Type token of [`AppServicePlan`].
pub const APP_SERVICE_PLAN_TYPE: &str = "azure-native:web:AppServicePlan";
/// Type token of [`WebApp`].
pub const WEB_APP_TYPE: &str = "azure-native:web:WebApp";
/// Site kind of a Linux function app.
pub const FUNCTION_APP_LINUX_KIND: &str = "functionapp,linux";

/// Pricing tier of a hosting plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuDescription {
    /// Tier, e.g. `FlexConsumption`.
    pub tier: String,
    /// SKU name, e.g. `FC1`.
    pub name: String,
}

/// Arguments of an [`AppServicePlan`].
#[derive(Clone, Debug)]
pub struct AppServicePlanArgs {
    /// The resource group to create the plan in.
    pub resource_group_name: Output<String>,
    /// The pricing tier.
    pub sku: SkuDescription,
    /// `true` for Linux plans.
    pub reserved: bool,
}

/// A declared hosting plan.
#[derive(Clone, Debug)]
pub struct AppServicePlan {
    handle: ResourceHandle,
}

declared_resource!(AppServicePlan);

impl AppServicePlan {
    /// Declares a hosting plan.
    pub fn new(
        ctx: &mut Context,
        name: &str,
        args: AppServicePlanArgs,
        options: &ResourceOptions,
    ) -> Result<Self> {
        let inputs = Properties::new()
            .with_output("resourceGroupName", args.resource_group_name)
            .with_value("sku", args.sku)
            .with_value("reserved", args.reserved);
        let handle = ctx.register_resource(APP_SERVICE_PLAN_TYPE, name, inputs, options)?;
        Ok(Self { handle })
    }
}

/// A name/value pair, as used for app settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NameValuePair {
    /// Setting name.
    pub name: String,
    /// Setting value.
    pub value: String,
}

impl NameValuePair {
    /// Creates a pair.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An error returned when a string is not a valid [`FunctionsRuntime`].
#[derive(Debug, thiserror::Error)]
pub enum ParseRuntimeError {
    /// The runtime name is not a Flex Consumption runtime.
    #[error("unknown runtime '{name}' (expected one of: {known})")]
    UnknownName {
        /// The name that was given.
        name: String,
        /// The accepted names, comma separated.
        known: String,
    },
    /// The text had a `:` with nothing after it.
    #[error("runtime version is empty in '{0}'")]
    EmptyVersion(String),
}

/// Language runtimes supported by Flex Consumption function apps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RuntimeName {
    /// .NET isolated worker.
    DotnetIsolated,
    /// Node.js.
    Node,
    /// Java.
    Java,
    /// PowerShell.
    Powershell,
    /// Python.
    Python,
    /// Custom handler.
    Custom,
}

impl RuntimeName {
    const ALL: [RuntimeName; 6] = [
        Self::DotnetIsolated,
        Self::Node,
        Self::Java,
        Self::Powershell,
        Self::Python,
        Self::Custom,
    ];

    /// The provider's name for the runtime.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DotnetIsolated => "dotnet-isolated",
            Self::Node => "node",
            Self::Java => "java",
            Self::Powershell => "powershell",
            Self::Python => "python",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for RuntimeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuntimeName {
    type Err = ParseRuntimeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ParseRuntimeError::UnknownName {
                name: s.to_string(),
                known: Self::ALL.map(|name| name.as_str()).join(", "),
            })
    }
}

/// The language runtime a function app runs on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FunctionsRuntime {
    /// Runtime name.
    pub name: RuntimeName,
    /// Runtime version, e.g. `3.11`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl fmt::Display for FunctionsRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(version) = &self.version {
            write!(f, ":{version}")?;
        }
        Ok(())
    }
}

/// Parses `name` or `name:version`, e.g. `python:3.11`.
impl FromStr for FunctionsRuntime {
    type Err = ParseRuntimeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (name, version) = match s.split_once(':') {
            Some((_, "")) => return Err(ParseRuntimeError::EmptyVersion(s.to_string())),
            Some((name, version)) => (name, Some(version.to_string())),
            None => (s, None),
        };
        Ok(Self {
            name: name.parse()?,
            version,
        })
    }
}

/// Managed identity types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManagedServiceIdentityType {
    /// An identity created with, and tied to, the resource.
    SystemAssigned,
    /// A separately managed identity.
    UserAssigned,
    /// No identity.
    None,
}

/// How a function app authenticates to its deployment storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthenticationType {
    /// The app's own system-assigned identity.
    SystemAssignedIdentity,
    /// A user-assigned identity.
    UserAssignedIdentity,
    /// A connection string held in an app setting.
    StorageAccountConnectionString,
}

/// Where deployment packages live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionsDeploymentStorageType {
    /// A blob container.
    #[serde(rename = "blobContainer")]
    BlobContainer,
}

/// Deployment package storage of a function app.
#[derive(Clone, Debug)]
pub struct FunctionsDeploymentStorage {
    /// Storage type.
    pub kind: FunctionsDeploymentStorageType,
    /// The container URL.
    pub value: Output<String>,
    /// How the app authenticates to the container.
    pub authentication: AuthenticationType,
}

/// Instance scaling bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleAndConcurrency {
    /// Memory per instance, in MB.
    #[serde(rename = "instanceMemoryMB")]
    pub instance_memory_mb: u32,
    /// Upper bound on scaled-out instances.
    pub maximum_instance_count: u32,
}

/// Flex Consumption specific configuration.
#[derive(Clone, Debug)]
pub struct FunctionAppConfig {
    /// Deployment package storage.
    pub deployment_storage: FunctionsDeploymentStorage,
    /// Scaling bounds.
    pub scale_and_concurrency: ScaleAndConcurrency,
    /// Language runtime.
    pub runtime: Output<FunctionsRuntime>,
}

/// Arguments of a [`WebApp`].
#[derive(Clone, Debug)]
pub struct WebAppArgs {
    /// The resource group to create the app in.
    pub resource_group_name: Output<String>,
    /// Site kind, e.g. [`FUNCTION_APP_LINUX_KIND`].
    pub kind: String,
    /// ID of the hosting plan.
    pub server_farm_id: Output<String>,
    /// Managed identity.
    pub identity: ManagedServiceIdentityType,
    /// App settings, in order.
    pub app_settings: Output<Vec<NameValuePair>>,
    /// Function app configuration.
    pub function_app_config: FunctionAppConfig,
}

/// A declared web or function app.
#[derive(Clone, Debug)]
pub struct WebApp {
    handle: ResourceHandle,
}

declared_resource!(WebApp);

impl WebApp {
    /// Declares a web app.
    pub fn new(
        ctx: &mut Context,
        name: &str,
        args: WebAppArgs,
        options: &ResourceOptions,
    ) -> Result<Self> {
        let config = args.function_app_config;
        let storage = config.deployment_storage;
        let deployment = Properties::new().with_object(
            "storage",
            Properties::new()
                .with_value("type", storage.kind)
                .with_output("value", storage.value)
                .with_object(
                    "authentication",
                    Properties::new().with_value("type", storage.authentication),
                ),
        );
        let inputs = Properties::new()
            .with_output("resourceGroupName", args.resource_group_name)
            .with_value("kind", args.kind)
            .with_output("serverFarmId", args.server_farm_id)
            .with_object("identity", Properties::new().with_value("type", args.identity))
            .with_object(
                "siteConfig",
                Properties::new().with_output("appSettings", args.app_settings),
            )
            .with_object(
                "functionAppConfig",
                Properties::new()
                    .with_object("deployment", deployment)
                    .with_value("scaleAndConcurrency", config.scale_and_concurrency)
                    .with_output("runtime", config.runtime),
            );
        let handle = ctx.register_resource(WEB_APP_TYPE, name, inputs, options)?;
        Ok(Self { handle })
    }

    /// Host names the app is reachable on.
    pub fn host_names(&self) -> Output<Vec<String>> {
        self.handle.output("hostNames")
    }

    /// Principal ID of the app's system-assigned identity.
    pub fn principal_id(&self) -> Output<String> {
        self.handle.output("identity.principalId")
    }
}
