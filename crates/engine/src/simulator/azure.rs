use anyhow::{bail, Context as _};
use async_trait::async_trait;
use flexfn_azure::{
    authorization::ROLE_ASSIGNMENT_TYPE,
    storage::{BLOB_CONTAINER_TYPE, STORAGE_ACCOUNT_TYPE},
    web::{APP_SERVICE_PLAN_TYPE, WEB_APP_TYPE},
};
use flexfn_output::Urn;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{CreateRequest, Provisioned, Simulator};

/// Storage account names are limited to 24 lowercase alphanumerics.
const STORAGE_ACCOUNT_NAME_MAX: usize = 24;
const SUFFIX_LEN: usize = 8;

/// Simulates the Azure resource types the function app component declares.
///
/// Generated names, IDs and identities are derived from the URN, so repeated
/// previews agree with each other.
#[derive(Clone, Debug)]
pub struct AzureSimulator {
    subscription_id: String,
    tenant_id: String,
}

impl Default for AzureSimulator {
    fn default() -> Self {
        Self::new("00000000-0000-0000-0000-000000000000")
    }
}

impl AzureSimulator {
    /// Creates a simulator placing resources in the given subscription.
    pub fn new(subscription_id: impl Into<String>) -> Self {
        let subscription_id = subscription_id.into();
        let tenant_id = stable_uuid(&format!("tenant/{subscription_id}")).to_string();
        Self {
            subscription_id,
            tenant_id,
        }
    }

    fn resource_group_id(&self, inputs: &Value) -> anyhow::Result<String> {
        let group = string_input(inputs, "resourceGroupName")?;
        Ok(format!(
            "/subscriptions/{}/resourceGroups/{group}",
            self.subscription_id
        ))
    }
}

#[async_trait]
impl Simulator for AzureSimulator {
    async fn create(&self, request: &CreateRequest<'_>) -> anyhow::Result<Provisioned> {
        let inputs = request.inputs;
        let urn = request.urn;
        let provisioned = match request.type_token() {
            STORAGE_ACCOUNT_TYPE => {
                let name = storage_account_name(urn);
                Provisioned {
                    id: format!(
                        "{}/providers/Microsoft.Storage/storageAccounts/{name}",
                        self.resource_group_id(inputs)?
                    ),
                    outputs: json!({
                        "name": name,
                        "primaryEndpoints": {
                            "blob": format!("https://{name}.blob.core.windows.net/"),
                        },
                    }),
                }
            }
            BLOB_CONTAINER_TYPE => {
                let account = string_input(inputs, "accountName")?;
                let name = string_input(inputs, "containerName")?;
                Provisioned {
                    id: format!(
                        "{}/providers/Microsoft.Storage/storageAccounts/{account}/blobServices/default/containers/{name}",
                        self.resource_group_id(inputs)?
                    ),
                    outputs: json!({ "name": name }),
                }
            }
            APP_SERVICE_PLAN_TYPE => {
                let name = auto_name(urn);
                Provisioned {
                    id: format!(
                        "{}/providers/Microsoft.Web/serverfarms/{name}",
                        self.resource_group_id(inputs)?
                    ),
                    outputs: json!({ "name": name }),
                }
            }
            WEB_APP_TYPE => {
                let name = auto_name(urn);
                let host = format!("{name}.azurewebsites.net");
                let identity_type = inputs
                    .pointer("/identity/type")
                    .cloned()
                    .unwrap_or(Value::Null);
                Provisioned {
                    id: format!(
                        "{}/providers/Microsoft.Web/sites/{name}",
                        self.resource_group_id(inputs)?
                    ),
                    outputs: json!({
                        "name": name,
                        "defaultHostName": host,
                        "hostNames": [host],
                        "identity": {
                            "type": identity_type,
                            "principalId": stable_uuid(&format!("principal/{urn}")).to_string(),
                            "tenantId": self.tenant_id,
                        },
                    }),
                }
            }
            ROLE_ASSIGNMENT_TYPE => {
                let scope = string_input(inputs, "scope")?;
                let name = stable_uuid(urn.as_str()).to_string();
                Provisioned {
                    id: format!("{scope}/providers/Microsoft.Authorization/roleAssignments/{name}"),
                    outputs: json!({ "name": name }),
                }
            }
            other => bail!("no simulation available for resource type '{other}'"),
        };
        Ok(provisioned)
    }
}

fn string_input<'a>(inputs: &'a Value, key: &str) -> anyhow::Result<&'a str> {
    inputs
        .get(key)
        .and_then(Value::as_str)
        .with_context(|| format!("missing string input '{key}'"))
}

fn suffix(urn: &Urn) -> String {
    Sha256::digest(urn.as_str().as_bytes())
        .iter()
        .take(SUFFIX_LEN / 2)
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Physical name in the provider's auto-naming style: `{logical}-{suffix}`.
fn auto_name(urn: &Urn) -> String {
    format!("{}-{}", urn.name(), suffix(urn))
}

fn storage_account_name(urn: &Urn) -> String {
    let mut name = urn
        .name()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .take(STORAGE_ACCOUNT_NAME_MAX - SUFFIX_LEN)
        .collect::<String>();
    name.push_str(&suffix(urn));
    name
}

fn stable_uuid(seed: &str) -> Uuid {
    let digest = Sha256::digest(seed.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}
