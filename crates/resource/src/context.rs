use std::collections::BTreeSet;

use flexfn_output::{Output, Urn};
use indexmap::IndexMap;
use serde_json::Value;

use crate::{Error, Properties, ResourceHandle, ResourceOptions, Result};

/// Whether a declaration describes a cloud resource or a grouping component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclarationKind {
    /// A resource the provider creates.
    Resource,
    /// A logical parent that owns other declarations and creates nothing itself.
    Component,
}

/// One recorded declaration.
#[derive(Clone, Debug)]
pub struct Declaration {
    urn: Urn,
    kind: DeclarationKind,
    parent: Option<Urn>,
    inputs: Output<Value>,
    depends_on: Vec<Urn>,
    outputs: Option<Output<Value>>,
}

impl Declaration {
    /// The declaration's URN.
    pub fn urn(&self) -> &Urn {
        &self.urn
    }

    /// The provider type token, e.g. `azure-native:web:WebApp`.
    pub fn type_token(&self) -> &str {
        self.urn.type_token()
    }

    /// The logical name.
    pub fn name(&self) -> &str {
        self.urn.name()
    }

    /// Resource or component.
    pub fn kind(&self) -> DeclarationKind {
        self.kind
    }

    /// Whether this is a component.
    pub fn is_component(&self) -> bool {
        self.kind == DeclarationKind::Component
    }

    /// The owning component, if any.
    pub fn parent(&self) -> Option<&Urn> {
        self.parent.as_ref()
    }

    /// The deferred input object sent to the provider.
    pub fn inputs(&self) -> &Output<Value> {
        &self.inputs
    }

    /// Everything this declaration must wait for: resources referenced by its
    /// inputs plus explicit `depends_on` entries.
    pub fn dependencies(&self) -> BTreeSet<Urn> {
        self.inputs
            .dependencies()
            .chain(&self.depends_on)
            .cloned()
            .collect()
    }

    /// The outputs a component registered, if any.
    pub fn outputs(&self) -> Option<&Output<Value>> {
        self.outputs.as_ref()
    }
}

/// The desired state of one stack, built up by declarations.
///
/// Contexts are passed explicitly to every declaration; nothing is registered
/// globally.
#[derive(Debug)]
pub struct Context {
    stack: String,
    project: String,
    declarations: IndexMap<Urn, Declaration>,
}

impl Context {
    /// Creates an empty context for the given stack and project.
    pub fn new(stack: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            stack: stack.into(),
            project: project.into(),
            declarations: IndexMap::new(),
        }
    }

    /// The stack name.
    pub fn stack(&self) -> &str {
        &self.stack
    }

    /// The project name.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Records a cloud resource.
    pub fn register_resource(
        &mut self,
        type_token: &str,
        name: &str,
        inputs: Properties,
        options: &ResourceOptions,
    ) -> Result<ResourceHandle> {
        let urn = self.declare(
            DeclarationKind::Resource,
            type_token,
            name,
            inputs.into_output(),
            options,
        )?;
        Ok(ResourceHandle::new(urn))
    }

    /// Records a component that will own other declarations.
    pub fn register_component(
        &mut self,
        type_token: &str,
        name: &str,
        options: &ResourceOptions,
    ) -> Result<Urn> {
        let inputs = Output::known(Value::Object(Default::default()));
        self.declare(DeclarationKind::Component, type_token, name, inputs, options)
    }

    /// Records the outputs a component exposes once its children resolve.
    pub fn register_outputs(&mut self, component: &Urn, outputs: Properties) -> Result<()> {
        let declaration = self
            .declarations
            .get_mut(component)
            .ok_or_else(|| Error::UnknownResource(component.clone()))?;
        if !declaration.is_component() {
            return Err(Error::NotAComponent(component.clone()));
        }
        declaration.outputs = Some(outputs.into_output());
        Ok(())
    }

    /// Looks up a declaration.
    pub fn get(&self, urn: &Urn) -> Option<&Declaration> {
        self.declarations.get(urn)
    }

    /// All declarations, in declaration order.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.values()
    }

    /// Declarations of cloud resources, in declaration order.
    pub fn resources(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations().filter(|d| !d.is_component())
    }

    /// Component declarations, in declaration order.
    pub fn components(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations().filter(|d| d.is_component())
    }

    /// Direct children of the given declaration.
    pub fn children<'a>(&'a self, urn: &'a Urn) -> impl Iterator<Item = &'a Declaration> + 'a {
        self.declarations()
            .filter(move |d| d.parent() == Some(urn))
    }

    /// Every declaration owned, directly or transitively, by the given one.
    pub fn descendants<'a>(&'a self, urn: &'a Urn) -> Vec<&'a Declaration> {
        let mut found = Vec::new();
        let mut pending = vec![urn];
        while let Some(parent) = pending.pop() {
            for child in self.children(parent) {
                pending.push(child.urn());
                found.push(child);
            }
        }
        found
    }

    /// Number of declarations, components included.
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    fn declare(
        &mut self,
        kind: DeclarationKind,
        type_token: &str,
        name: &str,
        inputs: Output<Value>,
        options: &ResourceOptions,
    ) -> Result<Urn> {
        let qualified_type = match &options.parent {
            Some(parent) => {
                let parent = self
                    .declarations
                    .get(parent)
                    .ok_or_else(|| Error::UnknownParent(parent.clone()))?;
                format!("{}${type_token}", parent.urn.qualified_type())
            }
            None => type_token.to_string(),
        };
        if let Some(missing) = options
            .depends_on
            .iter()
            .find(|urn| !self.declarations.contains_key(*urn))
        {
            return Err(Error::UnknownResource(missing.clone()));
        }

        let urn = Urn::new(&self.stack, &self.project, &qualified_type, name);
        if self.declarations.contains_key(&urn) {
            return Err(Error::DuplicateResource(urn));
        }

        tracing::debug!(%urn, ?kind, "Recorded declaration");
        self.declarations.insert(
            urn.clone(),
            Declaration {
                urn: urn.clone(),
                kind,
                parent: options.parent.clone(),
                inputs,
                depends_on: options.depends_on.clone(),
                outputs: None,
            },
        );
        Ok(urn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPONENT: &str = "test:index:Group";
    const THING: &str = "test:index:Thing";

    #[test]
    fn children_are_qualified_by_parent_type() -> anyhow::Result<()> {
        let mut ctx = Context::new("dev", "proj");
        let group = ctx.register_component(COMPONENT, "g", &ResourceOptions::new())?;
        let thing = ctx.register_resource(
            THING,
            "t",
            Properties::new(),
            &ResourceOptions::new().with_parent(&group),
        )?;

        assert_eq!(
            "urn:flexfn:dev::proj::test:index:Group$test:index:Thing::t",
            thing.urn().as_str()
        );
        assert_eq!(THING, ctx.get(thing.urn()).unwrap().type_token());
        assert_eq!(
            vec![thing.urn()],
            ctx.children(&group).map(|d| d.urn()).collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn duplicate_names_are_rejected() -> anyhow::Result<()> {
        let mut ctx = Context::new("dev", "proj");
        ctx.register_resource(THING, "t", Properties::new(), &ResourceOptions::new())?;
        let err = ctx
            .register_resource(THING, "t", Properties::new(), &ResourceOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateResource(_)));
        Ok(())
    }

    #[test]
    fn same_name_under_different_parent_types_is_allowed() -> anyhow::Result<()> {
        let mut ctx = Context::new("dev", "proj");
        let group = ctx.register_component(COMPONENT, "g", &ResourceOptions::new())?;
        ctx.register_resource(THING, "t", Properties::new(), &ResourceOptions::new())?;
        ctx.register_resource(
            THING,
            "t",
            Properties::new(),
            &ResourceOptions::new().with_parent(&group),
        )?;
        assert_eq!(2, ctx.resources().count());
        Ok(())
    }

    #[test]
    fn unknown_parents_and_dependencies_are_rejected() {
        let mut ctx = Context::new("dev", "proj");
        let ghost = Urn::new("dev", "proj", COMPONENT, "ghost");

        let err = ctx
            .register_resource(
                THING,
                "t",
                Properties::new(),
                &ResourceOptions::new().with_parent(&ghost),
            )
            .unwrap_err();
        assert!(matches!(err, Error::UnknownParent(_)));

        let err = ctx
            .register_resource(
                THING,
                "t",
                Properties::new(),
                &ResourceOptions::new().with_depends_on(&ghost),
            )
            .unwrap_err();
        assert!(matches!(err, Error::UnknownResource(_)));
        assert!(ctx.is_empty());
    }

    #[test]
    fn outputs_only_register_on_components() -> anyhow::Result<()> {
        let mut ctx = Context::new("dev", "proj");
        let thing = ctx.register_resource(THING, "t", Properties::new(), &ResourceOptions::new())?;
        let err = ctx
            .register_outputs(thing.urn(), Properties::new())
            .unwrap_err();
        assert!(matches!(err, Error::NotAComponent(_)));

        let group = ctx.register_component(COMPONENT, "g", &ResourceOptions::new())?;
        ctx.register_outputs(&group, Properties::new().with_output("thingName", thing.name()))?;
        let outputs = ctx.get(&group).unwrap().outputs().unwrap();
        assert!(outputs.depends_on(thing.urn()));
        Ok(())
    }

    #[test]
    fn dependencies_include_inputs_and_explicit_edges() -> anyhow::Result<()> {
        let mut ctx = Context::new("dev", "proj");
        let a = ctx.register_resource(THING, "a", Properties::new(), &ResourceOptions::new())?;
        let b = ctx.register_resource(THING, "b", Properties::new(), &ResourceOptions::new())?;
        let c = ctx.register_resource(
            THING,
            "c",
            Properties::new().with_output("aName", a.name()),
            &ResourceOptions::new().with_depends_on(b.urn()),
        )?;

        let deps = ctx.get(c.urn()).unwrap().dependencies();
        assert_eq!(
            BTreeSet::from([a.urn().clone(), b.urn().clone()]),
            deps
        );
        Ok(())
    }

    #[test]
    fn descendants_cover_nested_components() -> anyhow::Result<()> {
        let mut ctx = Context::new("dev", "proj");
        let outer = ctx.register_component(COMPONENT, "outer", &ResourceOptions::new())?;
        let inner = ctx.register_component(
            COMPONENT,
            "inner",
            &ResourceOptions::new().with_parent(&outer),
        )?;
        ctx.register_resource(
            THING,
            "leaf",
            Properties::new(),
            &ResourceOptions::new().with_parent(&inner),
        )?;

        assert_eq!(2, ctx.descendants(&outer).len());
        assert_eq!(1, ctx.descendants(&inner).len());
        Ok(())
    }
}
