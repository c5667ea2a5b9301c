use std::collections::BTreeSet;

use flexfn_azure::{
    authorization::ROLE_ASSIGNMENT_TYPE,
    storage::{BLOB_CONTAINER_TYPE, STORAGE_ACCOUNT_TYPE},
    web::{FunctionsRuntime, NameValuePair, APP_SERVICE_PLAN_TYPE, WEB_APP_TYPE},
};
use flexfn_engine::{preview, simulator::AzureSimulator, Deployment, Graph, Plan};
use flexfn_function_app::{
    FunctionAppArgs, FunctionAppComponent, COMPONENT_TYPE, STORAGE_ACCOUNT_NAME_SETTING,
};
use flexfn_resource::{Context, Output, ResourceOptions, Urn};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn args() -> FunctionAppArgs {
    let runtime: FunctionsRuntime = "python:3.11".parse().unwrap();
    FunctionAppArgs::new("rg-orders".to_string(), runtime)
}

fn declare(args: FunctionAppArgs) -> anyhow::Result<(Context, FunctionAppComponent)> {
    let mut ctx = Context::new("dev", "orders");
    let component = FunctionAppComponent::new(&mut ctx, "orders", args, &ResourceOptions::new())?;
    Ok((ctx, component))
}

async fn deploy(args: FunctionAppArgs) -> anyhow::Result<(FunctionAppComponent, Deployment)> {
    let (ctx, component) = declare(args)?;
    let deployment = preview(&ctx, &AzureSimulator::default()).await?;
    Ok((component, deployment))
}

fn inputs<'a>(deployment: &'a Deployment, urn: &Urn) -> &'a Value {
    &deployment.resource(urn).unwrap().inputs
}

#[test]
fn declares_five_resources_with_six_edges() -> anyhow::Result<()> {
    let (ctx, component) = declare(args())?;

    assert_eq!(5, ctx.resources().count());
    assert_eq!(1, ctx.components().count());
    assert_eq!(5, ctx.children(component.urn()).count());
    assert_eq!(
        vec![
            STORAGE_ACCOUNT_TYPE,
            BLOB_CONTAINER_TYPE,
            APP_SERVICE_PLAN_TYPE,
            WEB_APP_TYPE,
            ROLE_ASSIGNMENT_TYPE,
        ],
        ctx.resources().map(|d| d.type_token()).collect::<Vec<_>>()
    );

    let graph = Graph::from_context(&ctx)?;
    let edges = graph
        .edges()
        .into_iter()
        .map(|(dependent, dependency)| (dependent.type_token(), dependency.type_token()))
        .collect::<BTreeSet<_>>();
    let expected = BTreeSet::from([
        (BLOB_CONTAINER_TYPE, STORAGE_ACCOUNT_TYPE),
        (WEB_APP_TYPE, APP_SERVICE_PLAN_TYPE),
        (WEB_APP_TYPE, STORAGE_ACCOUNT_TYPE),
        (WEB_APP_TYPE, BLOB_CONTAINER_TYPE),
        (ROLE_ASSIGNMENT_TYPE, WEB_APP_TYPE),
        (ROLE_ASSIGNMENT_TYPE, STORAGE_ACCOUNT_TYPE),
    ]);
    assert_eq!(expected, edges);
    assert_eq!(6, graph.edges().len());
    Ok(())
}

#[test]
fn children_are_qualified_by_the_component_type() -> anyhow::Result<()> {
    let (_, component) = declare(args())?;
    for child in component.children() {
        assert!(child.qualified_type().starts_with(COMPONENT_TYPE));
    }
    assert_eq!(
        "orders-deploymentPackageContainer",
        component.blob_container().urn().name()
    );
    assert_eq!(
        "orders-storageBlobDataContributor",
        component.role_assignment().urn().name()
    );
    Ok(())
}

#[test]
fn storage_and_plan_form_the_first_wave() -> anyhow::Result<()> {
    let (ctx, _) = declare(args())?;
    let graph = Graph::from_context(&ctx)?;
    let waves = graph
        .waves()?
        .into_iter()
        .map(|wave| wave.iter().map(|d| d.type_token()).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    assert_eq!(
        vec![
            vec![STORAGE_ACCOUNT_TYPE, APP_SERVICE_PLAN_TYPE],
            vec![BLOB_CONTAINER_TYPE],
            vec![WEB_APP_TYPE],
            vec![ROLE_ASSIGNMENT_TYPE],
        ],
        waves
    );
    Ok(())
}

#[tokio::test]
async fn default_app_settings_only() -> anyhow::Result<()> {
    let (component, deployment) = deploy(args()).await?;
    let account_name = component.storage_account().name().resolve(&deployment)?;

    let settings = &inputs(&deployment, component.function_app().urn())["siteConfig"]["appSettings"];
    assert_eq!(
        &json!([{ "name": STORAGE_ACCOUNT_NAME_SETTING, "value": account_name }]),
        settings
    );
    Ok(())
}

#[tokio::test]
async fn caller_settings_follow_the_default() -> anyhow::Result<()> {
    let args = args().with_app_settings(vec![NameValuePair::new("FOO", "bar")]);
    let (component, deployment) = deploy(args).await?;
    let account_name = component.storage_account().name().resolve(&deployment)?;

    let settings = &inputs(&deployment, component.function_app().urn())["siteConfig"]["appSettings"];
    assert_eq!(
        &json!([
            { "name": STORAGE_ACCOUNT_NAME_SETTING, "value": account_name },
            { "name": "FOO", "value": "bar" },
        ]),
        settings
    );
    Ok(())
}

#[tokio::test]
async fn scaling_defaults_and_overrides() -> anyhow::Result<()> {
    let scale = |deployment: &Deployment, component: &FunctionAppComponent| {
        inputs(deployment, component.function_app().urn())["functionAppConfig"]
            ["scaleAndConcurrency"]
            .clone()
    };

    let (component, deployment) = deploy(args()).await?;
    assert_eq!(
        json!({ "instanceMemoryMB": 2048, "maximumInstanceCount": 100 }),
        scale(&deployment, &component)
    );

    let (component, deployment) = deploy(
        args()
            .with_instance_memory_mb(512)
            .with_maximum_instance_count(10),
    )
    .await?;
    assert_eq!(
        json!({ "instanceMemoryMB": 512, "maximumInstanceCount": 10 }),
        scale(&deployment, &component)
    );
    Ok(())
}

#[tokio::test]
async fn storage_policy_is_fixed() -> anyhow::Result<()> {
    let (component, deployment) = deploy(args()).await?;

    let account = inputs(&deployment, component.storage_account().urn());
    assert_eq!(false, account["allowBlobPublicAccess"]);
    assert_eq!("StorageV2", account["kind"]);
    assert_eq!("Standard_LRS", account["sku"]["name"]);

    let container = inputs(&deployment, component.blob_container().urn());
    assert_eq!("deploymentpackage", container["containerName"]);
    assert_eq!(account_name(&deployment, &component), container["accountName"]);

    let plan = inputs(&deployment, component.service_plan().urn());
    assert_eq!(json!({ "tier": "FlexConsumption", "name": "FC1" }), plan["sku"]);
    assert_eq!(true, plan["reserved"]);
    Ok(())
}

fn account_name(deployment: &Deployment, component: &FunctionAppComponent) -> Value {
    deployment
        .resource(component.storage_account().urn())
        .unwrap()
        .outputs["name"]
        .clone()
}

#[tokio::test]
async fn function_app_deploys_from_the_container() -> anyhow::Result<()> {
    let (component, deployment) = deploy(args()).await?;
    let app = inputs(&deployment, component.function_app().urn());
    let account = account_name(&deployment, &component);

    assert_eq!("functionapp,linux", app["kind"]);
    assert_eq!("SystemAssigned", app["identity"]["type"]);
    assert_eq!(
        deployment
            .resource(component.service_plan().urn())
            .unwrap()
            .id,
        app["serverFarmId"]
    );
    assert_eq!(
        json!({
            "type": "blobContainer",
            "value": format!(
                "https://{}.blob.core.windows.net/deploymentpackage",
                account.as_str().unwrap()
            ),
            "authentication": { "type": "SystemAssignedIdentity" },
        }),
        app["functionAppConfig"]["deployment"]["storage"]
    );
    assert_eq!(
        json!({ "name": "python", "version": "3.11" }),
        app["functionAppConfig"]["runtime"]
    );
    Ok(())
}

#[tokio::test]
async fn role_is_granted_to_the_app_identity() -> anyhow::Result<()> {
    let (component, deployment) = deploy(args()).await?;
    let identity = component.function_app().principal_id().resolve(&deployment)?;
    let role = inputs(&deployment, component.role_assignment().urn());

    assert_eq!(identity, role["principalId"]);
    assert_eq!("ServicePrincipal", role["principalType"]);
    assert_eq!(
        "/providers/Microsoft.Authorization/roleDefinitions/ba92f5b4-2d11-453d-a403-e96b0029c9fe",
        role["roleDefinitionId"]
    );
    assert_eq!(
        deployment
            .resource(component.storage_account().urn())
            .unwrap()
            .id,
        role["scope"]
    );
    Ok(())
}

#[tokio::test]
async fn component_outputs_summarise_the_children() -> anyhow::Result<()> {
    let (component, deployment) = deploy(args()).await?;
    let outputs = deployment.component_outputs(component.urn()).unwrap();

    assert_eq!(account_name(&deployment, &component), outputs["storageAccountName"]);
    assert_eq!(
        component.function_app().name().resolve(&deployment)?,
        outputs["functionAppName"]
    );
    assert_eq!(
        component.service_plan().name().resolve(&deployment)?,
        outputs["servicePlanName"]
    );
    let hosts = component.outputs().function_app_url.resolve(&deployment)?;
    assert_eq!(1, hosts.len());
    assert!(hosts[0].ends_with(".azurewebsites.net"));
    assert_eq!(json!(hosts), outputs["functionAppUrl"]);
    Ok(())
}

#[tokio::test]
async fn identical_inputs_plan_no_changes() -> anyhow::Result<()> {
    let (_, first) = deploy(args()).await?;
    let (_, second) = deploy(args()).await?;

    let plan = Plan::between(&first, &second);
    assert!(plan.is_noop());
    assert_eq!(5, plan.steps().len());

    let (_, resized) = deploy(args().with_maximum_instance_count(40)).await?;
    let changes = Plan::between(&first, &resized)
        .changes()
        .map(|step| step.urn.type_token().to_string())
        .collect::<Vec<_>>();
    assert_eq!(vec![WEB_APP_TYPE.to_string()], changes);
    Ok(())
}

#[test]
fn teardown_removes_dependents_first() -> anyhow::Result<()> {
    let (ctx, _) = declare(args())?;
    let graph = Graph::from_context(&ctx)?;
    let order = graph
        .teardown_order()?
        .into_iter()
        .map(|urn| urn.type_token())
        .collect::<Vec<_>>();
    assert_eq!(
        vec![
            ROLE_ASSIGNMENT_TYPE,
            WEB_APP_TYPE,
            BLOB_CONTAINER_TYPE,
            APP_SERVICE_PLAN_TYPE,
            STORAGE_ACCOUNT_TYPE,
        ],
        order
    );
    Ok(())
}

#[test]
fn two_components_share_a_context() -> anyhow::Result<()> {
    let mut ctx = Context::new("dev", "shop");
    FunctionAppComponent::new(&mut ctx, "orders", args(), &ResourceOptions::new())?;
    FunctionAppComponent::new(&mut ctx, "billing", args(), &ResourceOptions::new())?;
    assert_eq!(10, ctx.resources().count());

    let err = FunctionAppComponent::new(&mut ctx, "orders", args(), &ResourceOptions::new())
        .unwrap_err();
    assert!(err.to_string().contains("duplicate resource URN"));
    Ok(())
}

#[tokio::test]
async fn one_component_reads_another_components_outputs() -> anyhow::Result<()> {
    let mut ctx = Context::new("dev", "shop");
    let orders = FunctionAppComponent::new(&mut ctx, "orders", args(), &ResourceOptions::new())?;
    let orders_storage = Output::<String>::property(orders.urn().clone(), "storageAccountName")
        .map(|name| vec![NameValuePair::new("ORDERS_STORAGE", name)]);
    let billing = FunctionAppComponent::new(
        &mut ctx,
        "billing",
        args().with_app_settings(orders_storage),
        &ResourceOptions::new(),
    )?;

    let graph = Graph::from_context(&ctx)?;
    let billing_app = graph.dependencies_of(billing.function_app().urn()).unwrap();
    for child in orders.children() {
        assert!(billing_app.contains(child));
    }

    let deployment = preview(&ctx, &AzureSimulator::default()).await?;
    let orders_account = orders.storage_account().name().resolve(&deployment)?;
    let billing_account = billing.storage_account().name().resolve(&deployment)?;
    assert_eq!(
        Some(&json!(orders_account)),
        deployment
            .component_outputs(orders.urn())
            .map(|outputs| &outputs["storageAccountName"])
    );

    let settings = &inputs(&deployment, billing.function_app().urn())["siteConfig"]["appSettings"];
    assert_eq!(
        &json!([
            { "name": STORAGE_ACCOUNT_NAME_SETTING, "value": billing_account },
            { "name": "ORDERS_STORAGE", "value": orders_account },
        ]),
        settings
    );
    Ok(())
}
