//! Role assignments.

use flexfn_resource::{Context, Output, Properties, ResourceHandle, ResourceOptions, Result};
use serde::{Deserialize, Serialize};

use crate::roles::BuiltInRole;

/// Type token of [`RoleAssignment`].
pub const ROLE_ASSIGNMENT_TYPE: &str = "azure-native:authorization:RoleAssignment";

/// The kind of principal a role is assigned to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrincipalType {
    /// A user account.
    User,
    /// A security group.
    Group,
    /// An application or managed identity.
    ServicePrincipal,
}

/// Arguments of a [`RoleAssignment`].
#[derive(Clone, Debug)]
pub struct RoleAssignmentArgs {
    /// The role to grant.
    pub role: BuiltInRole,
    /// The resource ID the grant applies to.
    pub scope: Output<String>,
    /// The principal receiving the grant.
    pub principal_id: Output<String>,
    /// The kind of principal.
    pub principal_type: PrincipalType,
}

/// A declared role assignment.
#[derive(Clone, Debug)]
pub struct RoleAssignment {
    handle: ResourceHandle,
}

declared_resource!(RoleAssignment);

impl RoleAssignment {
    /// Declares a role assignment.
    pub fn new(
        ctx: &mut Context,
        name: &str,
        args: RoleAssignmentArgs,
        options: &ResourceOptions,
    ) -> Result<Self> {
        let inputs = Properties::new()
            .with_value("roleDefinitionId", args.role.definition_id())
            .with_output("scope", args.scope)
            .with_output("principalId", args.principal_id)
            .with_value("principalType", args.principal_type);
        let handle = ctx.register_resource(ROLE_ASSIGNMENT_TYPE, name, inputs, options)?;
        Ok(Self { handle })
    }
}
