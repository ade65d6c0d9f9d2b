//! Argument resolution for binding runtimes.
//!
//! Turns AST arguments into [`ResolvedArgument`]s: literals become plain
//! values, parameter references are substituted from a [`ParameterStore`],
//! and service references are left as named lookups for the runtime to
//! perform. Nothing is instantiated here.

use std::collections::BTreeMap;

use cdl_common::error::{CdlError, Result};
use serde::Serialize;

use crate::graph::DependencyGraph;
use crate::parser::ast::{ArgumentArrayNode, AssignableNode, ScopeNode, ServiceDefinitionNode};

/// Named configuration values substituted for `:name` references.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterStore {
    values: BTreeMap<String, serde_json::Value>,
}

impl ParameterStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding every parameter defined in `scope`.
    ///
    /// # Errors
    ///
    /// Returns a logical error if a definition holds a reference.
    pub fn from_scope(scope: &ScopeNode) -> Result<Self> {
        let mut store = Self::new();
        for parameter in scope.parameters() {
            store.set(parameter.name(), parameter.value().to_native()?);
        }
        Ok(store)
    }

    /// Sets a parameter, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: serde_json::Value) {
        let _ = self.values.insert(name.into(), value);
    }

    /// Returns the value of a parameter.
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.values.get(name)
    }

    /// Returns the value of a parameter, or `default` when it is not set.
    pub fn get_or(&self, name: &str, default: serde_json::Value) -> serde_json::Value {
        self.values.get(name).cloned().unwrap_or(default)
    }

    /// Returns `true` if the parameter is set.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no parameter is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copies every value of `other` into this store, replacing existing ones.
    pub fn extend_from(&mut self, other: &Self) {
        self.values
            .extend(other.values.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

impl<K: Into<String>> FromIterator<(K, serde_json::Value)> for ParameterStore {
    fn from_iter<I: IntoIterator<Item = (K, serde_json::Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// An argument ready for a runtime to consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResolvedArgument {
    /// A plain value (literal or substituted parameter).
    Value(serde_json::Value),
    /// The named service, to be looked up by the runtime.
    Service(String),
    /// An unkeyed array whose elements may include services.
    List(Vec<ResolvedArgument>),
    /// A keyed array in insertion order.
    Map(Vec<(String, ResolvedArgument)>),
}

/// A `- method(args)` call with resolved arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedMethodCall {
    /// Method name.
    pub name: String,
    /// Call arguments.
    pub arguments: Vec<ResolvedArgument>,
}

/// A service definition with resolved arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedService {
    /// Registered service name.
    pub name: String,
    /// Class path with a leading namespace separator.
    pub class_name: String,
    /// Constructor arguments.
    pub arguments: Vec<ResolvedArgument>,
    /// Calls to perform after construction.
    pub method_calls: Vec<ResolvedMethodCall>,
}

/// Resolves every argument of a call.
///
/// # Errors
///
/// Returns a not-found error for a parameter missing from `parameters`.
pub fn resolve_arguments(
    arguments: &ArgumentArrayNode,
    parameters: &ParameterStore,
) -> Result<Vec<ResolvedArgument>> {
    arguments
        .arguments()
        .iter()
        .map(|argument| resolve_node(argument, parameters))
        .collect()
}

/// Resolves the constructor and method call arguments of a definition.
///
/// # Errors
///
/// Returns a not-found error for a parameter missing from `parameters`.
pub fn resolve_service(
    definition: &ServiceDefinitionNode,
    parameters: &ParameterStore,
) -> Result<ResolvedService> {
    let method_calls = definition
        .method_calls()
        .iter()
        .map(|call| {
            resolve_arguments(call.arguments(), parameters).map(|arguments| ResolvedMethodCall {
                name: call.name().to_owned(),
                arguments,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ResolvedService {
        name: definition.name().to_owned(),
        class_name: definition.qualified_class_name(),
        arguments: resolve_arguments(definition.arguments(), parameters)?,
        method_calls,
    })
}

/// Resolves every service of a scope, dependencies first.
///
/// Parameters defined in the scope are used unless `overrides` sets the
/// same name.
///
/// # Errors
///
/// Returns a semantic error on a dependency cycle, or a not-found error
/// for a parameter defined neither in the scope nor in `overrides`.
pub fn resolve_scope(scope: &ScopeNode, overrides: &ParameterStore) -> Result<Vec<ResolvedService>> {
    let mut parameters = ParameterStore::from_scope(scope)?;
    parameters.extend_from(overrides);

    let order = DependencyGraph::from_scope(scope).resolve_order()?;
    tracing::debug!(services = order.len(), "resolving CDL scope");

    order
        .iter()
        .filter_map(|name| scope.service(name))
        .map(|definition| resolve_service(definition, &parameters))
        .collect()
}

fn resolve_node(node: &AssignableNode, parameters: &ParameterStore) -> Result<ResolvedArgument> {
    match node {
        AssignableNode::Value(value) => Ok(ResolvedArgument::Value(value.to_native())),
        AssignableNode::ParameterReference(reference) => parameters
            .get(reference.name())
            .cloned()
            .map(ResolvedArgument::Value)
            .ok_or_else(|| CdlError::NotFound {
                kind: "parameter",
                id: reference.name().to_owned(),
            }),
        AssignableNode::ServiceReference(reference) => {
            Ok(ResolvedArgument::Service(reference.name().to_owned()))
        }
        AssignableNode::Array(array) if array.is_keyed() => array
            .keyed_values()
            .into_iter()
            .map(|(key, value)| resolve_node(value, parameters).map(|resolved| (key, resolved)))
            .collect::<Result<Vec<_>>>()
            .map(ResolvedArgument::Map),
        AssignableNode::Array(array) => array
            .values()
            .map(|value| resolve_node(value, parameters))
            .collect::<Result<Vec<_>>>()
            .map(ResolvedArgument::List),
    }
}
