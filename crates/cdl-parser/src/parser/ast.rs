//! Abstract Syntax Tree for CDL sources.
//!
//! Nodes are plain owned data. Only [`ValueNode`], [`ArrayNode`],
//! [`ParameterReferenceNode`], and [`ServiceReferenceNode`] may appear in
//! argument or array-element position; they implement [`Assignable`] and
//! are wrapped in the closed [`AssignableNode`] sum type.

use std::fmt;

use cdl_common::constants::NAMESPACE_SEPARATOR;
use cdl_common::error::{CdlError, Result};
use cdl_common::types::Span;
use serde::Serialize;

use super::token::{Scalar, Token, TokenKind, ValueType};

/// Returns `name` with exactly one leading namespace separator.
pub fn qualify_class_name(name: &str) -> String {
    format!(
        "{NAMESPACE_SEPARATOR}{}",
        name.trim_start_matches(NAMESPACE_SEPARATOR)
    )
}

/// Variants of assignable and scope-level nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    /// [`ValueNode`].
    Value,
    /// [`ArrayNode`].
    Array,
    /// [`ParameterReferenceNode`].
    ParameterReference,
    /// [`ServiceReferenceNode`].
    ServiceReference,
    /// [`ServiceDefinitionNode`].
    ServiceDefinition,
    /// [`ParameterDefinitionNode`].
    ParameterDefinition,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Value => "value",
            Self::Array => "array",
            Self::ParameterReference => "parameter reference",
            Self::ServiceReference => "service reference",
            Self::ServiceDefinition => "service definition",
            Self::ParameterDefinition => "parameter definition",
        };
        f.write_str(name)
    }
}

/// Marker for node types legal wherever an argument or array element is
/// expected.
pub trait Assignable: Into<AssignableNode> {}

/// A node in argument or array-element position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum AssignableNode {
    /// A scalar literal.
    Value(ValueNode),
    /// A `{ ... }` literal array.
    Array(ArrayNode),
    /// A `:name` parameter reference.
    ParameterReference(ParameterReferenceNode),
    /// An `@name` service reference.
    ServiceReference(ServiceReferenceNode),
}

impl AssignableNode {
    /// Returns the variant of the wrapped node.
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Value(_) => NodeKind::Value,
            Self::Array(_) => NodeKind::Array,
            Self::ParameterReference(_) => NodeKind::ParameterReference,
            Self::ServiceReference(_) => NodeKind::ServiceReference,
        }
    }

    /// Returns the wrapped value node, if any.
    pub const fn as_value(&self) -> Option<&ValueNode> {
        match self {
            Self::Value(node) => Some(node),
            _ => None,
        }
    }

    /// Returns the wrapped array node, if any.
    pub const fn as_array(&self) -> Option<&ArrayNode> {
        match self {
            Self::Array(node) => Some(node),
            _ => None,
        }
    }

    /// Returns the wrapped parameter reference, if any.
    pub const fn as_parameter_reference(&self) -> Option<&ParameterReferenceNode> {
        match self {
            Self::ParameterReference(node) => Some(node),
            _ => None,
        }
    }

    /// Returns the wrapped service reference, if any.
    pub const fn as_service_reference(&self) -> Option<&ServiceReferenceNode> {
        match self {
            Self::ServiceReference(node) => Some(node),
            _ => None,
        }
    }

    /// Visits this node, then every nested array element depth-first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Self)) {
        visit(self);
        if let Self::Array(array) = self {
            for value in array.values() {
                value.walk(visit);
            }
        }
    }

    /// Converts the node into a plain value.
    ///
    /// # Errors
    ///
    /// Returns a logical error if the node is, or contains, a reference.
    pub fn to_native(&self) -> Result<serde_json::Value> {
        match self {
            Self::Value(node) => Ok(node.to_native()),
            Self::Array(node) => node.convert_to_native_array(),
            Self::ParameterReference(node) => Err(CdlError::logical(format!(
                "parameter reference `:{}` cannot be converted to a native value",
                node.name
            ))),
            Self::ServiceReference(node) => Err(CdlError::logical(format!(
                "service reference `@{}` cannot be converted to a native value",
                node.name
            ))),
        }
    }
}

/// A scalar literal with its type tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueNode {
    value: Scalar,
    value_type: ValueType,
}

impl ValueNode {
    /// Creates a value node.
    ///
    /// # Errors
    ///
    /// Returns a logical error if `value_type` does not describe `value`.
    pub fn new(value: Scalar, value_type: ValueType) -> Result<Self> {
        let mut node = Self::from(value);
        node.set_type(value_type)?;
        Ok(node)
    }

    /// Creates a value node from a literal token.
    ///
    /// # Errors
    ///
    /// Returns a logical error if the token is not a literal.
    pub fn from_token(token: &Token) -> Result<Self> {
        match &token.kind {
            TokenKind::Literal(scalar) => Ok(Self::from(scalar.clone())),
            other => Err(CdlError::logical(format!(
                "can only create a value node from a literal token, got {other}"
            ))),
        }
    }

    /// Returns the literal value.
    pub const fn raw_value(&self) -> &Scalar {
        &self.value
    }

    /// Returns the type tag.
    pub const fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Validates and assigns the type tag.
    ///
    /// # Errors
    ///
    /// Returns a logical error if `value_type` does not describe the value.
    pub fn set_type(&mut self, value_type: ValueType) -> Result<()> {
        if self.value.value_type() != value_type {
            return Err(CdlError::logical(format!(
                "invalid value type {value_type} assigned to {} value {}",
                self.value.value_type(),
                self.value
            )));
        }
        self.value_type = value_type;
        Ok(())
    }

    /// Converts the literal into a plain value.
    pub fn to_native(&self) -> serde_json::Value {
        self.value.to_native()
    }
}

impl From<Scalar> for ValueNode {
    fn from(value: Scalar) -> Self {
        let value_type = value.value_type();
        Self { value, value_type }
    }
}

impl Assignable for ValueNode {}

impl From<ValueNode> for AssignableNode {
    fn from(node: ValueNode) -> Self {
        Self::Value(node)
    }
}

/// `:name`, substituted from a parameter store at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterReferenceNode {
    name: String,
    span: Span,
}

impl ParameterReferenceNode {
    /// Creates a reference to the parameter `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            span: Span::default(),
        }
    }

    /// Attaches the source span of the reference.
    #[must_use]
    pub const fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Returns the referenced parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns where the reference was written.
    pub const fn span(&self) -> Span {
        self.span
    }
}

impl Assignable for ParameterReferenceNode {}

impl From<ParameterReferenceNode> for AssignableNode {
    fn from(node: ParameterReferenceNode) -> Self {
        Self::ParameterReference(node)
    }
}

/// `@name`, resolved to another service at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceReferenceNode {
    name: String,
    span: Span,
}

impl ServiceReferenceNode {
    /// Creates a reference to the service `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            span: Span::default(),
        }
    }

    /// Attaches the source span of the reference.
    #[must_use]
    pub const fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Returns the referenced service name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns where the reference was written.
    pub const fn span(&self) -> Span {
        self.span
    }
}

impl Assignable for ServiceReferenceNode {}

impl From<ServiceReferenceNode> for AssignableNode {
    fn from(node: ServiceReferenceNode) -> Self {
        Self::ServiceReference(node)
    }
}

/// Key of an array element written as `key: value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ArrayKey {
    /// A string key.
    String(String),
    /// An integer key.
    Integer(i64),
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(key) => f.write_str(key),
            Self::Integer(key) => write!(f, "{key}"),
        }
    }
}

/// One element of an [`ArrayNode`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayElementNode {
    /// Explicit key, if written.
    pub key: Option<ArrayKey>,
    /// Element value.
    pub value: AssignableNode,
}

/// A `{ ... }` literal array.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArrayNode {
    elements: Vec<ArrayElementNode>,
}

impl ArrayNode {
    /// Creates an empty array.
    pub const fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    /// Appends an unkeyed element.
    pub fn push(&mut self, value: impl Assignable) {
        self.elements.push(ArrayElementNode {
            key: None,
            value: value.into(),
        });
    }

    /// Appends a keyed element.
    pub fn push_keyed(&mut self, key: ArrayKey, value: impl Assignable) {
        self.elements.push(ArrayElementNode {
            key: Some(key),
            value: value.into(),
        });
    }

    /// Appends an already built element.
    pub fn push_element(&mut self, element: ArrayElementNode) {
        self.elements.push(element);
    }

    /// Returns the elements in source order.
    pub fn elements(&self) -> &[ArrayElementNode] {
        &self.elements
    }

    /// Iterates over element values in source order.
    pub fn values(&self) -> impl Iterator<Item = &AssignableNode> {
        self.elements.iter().map(|element| &element.value)
    }

    /// Returns the last element written under `key`.
    pub fn get(&self, key: &ArrayKey) -> Option<&AssignableNode> {
        self.elements
            .iter()
            .rev()
            .find(|element| element.key.as_ref() == Some(key))
            .map(|element| &element.value)
    }

    /// Returns `true` if an element was written under `key`.
    pub fn has_key(&self, key: &ArrayKey) -> bool {
        self.get(key).is_some()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns `true` if at least one element carries an explicit key.
    pub fn is_keyed(&self) -> bool {
        self.elements.iter().any(|element| element.key.is_some())
    }

    /// Returns elements paired with their effective keys.
    ///
    /// Unkeyed elements take the next free integer index. A later element
    /// written under an existing key replaces the earlier value in place.
    pub fn keyed_values(&self) -> Vec<(String, &AssignableNode)> {
        let mut entries: Vec<(String, &AssignableNode)> = Vec::with_capacity(self.len());
        let mut next_index: i64 = 0;
        for element in &self.elements {
            let key = match &element.key {
                Some(ArrayKey::String(key)) => {
                    if let Some(index) = canonical_index(key) {
                        next_index = next_index.max(index.saturating_add(1));
                    }
                    key.clone()
                }
                Some(ArrayKey::Integer(index)) => {
                    next_index = next_index.max(index.saturating_add(1));
                    index.to_string()
                }
                None => {
                    let index = next_index;
                    next_index = next_index.saturating_add(1);
                    index.to_string()
                }
            };
            match entries.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = &element.value,
                None => entries.push((key, &element.value)),
            }
        }
        entries
    }

    /// Recursively converts the array into plain values.
    ///
    /// Without keys the result is a JSON array, otherwise an
    /// insertion-ordered object built from [`Self::keyed_values`].
    ///
    /// # Errors
    ///
    /// Returns a logical error if any element is, or contains, a reference.
    pub fn convert_to_native_array(&self) -> Result<serde_json::Value> {
        if !self.is_keyed() {
            let items = self
                .values()
                .map(AssignableNode::to_native)
                .collect::<Result<Vec<_>>>()?;
            return Ok(serde_json::Value::Array(items));
        }

        let mut map = serde_json::Map::new();
        for (key, value) in self.keyed_values() {
            let _ = map.insert(key, value.to_native()?);
        }
        Ok(serde_json::Value::Object(map))
    }
}

/// Integer value of a string key written in canonical decimal form
/// (`"5"`, `"-1"`, not `"05"` or `"+5"`).
fn canonical_index(key: &str) -> Option<i64> {
    key.parse::<i64>()
        .ok()
        .filter(|index| index.to_string() == key)
}

impl Assignable for ArrayNode {}

impl From<ArrayNode> for AssignableNode {
    fn from(node: ArrayNode) -> Self {
        Self::Array(node)
    }
}

/// Positional arguments of a constructor or method call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArgumentArrayNode {
    arguments: Vec<AssignableNode>,
}

impl ArgumentArrayNode {
    /// Creates an empty argument list.
    pub const fn new() -> Self {
        Self {
            arguments: Vec::new(),
        }
    }

    /// Appends an argument.
    pub fn push(&mut self, argument: impl Assignable) {
        self.arguments.push(argument.into());
    }

    /// Appends an already wrapped argument.
    pub fn push_node(&mut self, argument: AssignableNode) {
        self.arguments.push(argument);
    }

    /// Returns the arguments in source order.
    pub fn arguments(&self) -> &[AssignableNode] {
        &self.arguments
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    /// Returns `true` if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Visits every argument and nested array element depth-first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a AssignableNode)) {
        for argument in &self.arguments {
            argument.walk(visit);
        }
    }
}

/// `- method(args)` following a service definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceMethodCallNode {
    name: String,
    arguments: ArgumentArrayNode,
}

impl ServiceMethodCallNode {
    /// Creates a method call.
    pub fn new(name: impl Into<String>, arguments: ArgumentArrayNode) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Returns the method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the call arguments.
    pub const fn arguments(&self) -> &ArgumentArrayNode {
        &self.arguments
    }
}

/// `@name: Class\Path(args)`, optionally followed by method calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceDefinitionNode {
    name: String,
    class_name: String,
    arguments: ArgumentArrayNode,
    method_calls: Vec<ServiceMethodCallNode>,
    span: Span,
}

impl ServiceDefinitionNode {
    /// Creates a definition without arguments.
    ///
    /// The class name is stored without a leading namespace separator.
    pub fn new(name: impl Into<String>, class_name: &str) -> Self {
        Self {
            name: name.into(),
            class_name: class_name
                .trim_start_matches(NAMESPACE_SEPARATOR)
                .to_owned(),
            arguments: ArgumentArrayNode::new(),
            method_calls: Vec::new(),
            span: Span::default(),
        }
    }

    /// Attaches the source span of the definition.
    #[must_use]
    pub const fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Replaces the constructor arguments.
    #[must_use]
    pub fn with_arguments(mut self, arguments: ArgumentArrayNode) -> Self {
        self.arguments = arguments;
        self
    }

    /// Appends a method call.
    pub fn add_method_call(&mut self, call: ServiceMethodCallNode) {
        self.method_calls.push(call);
    }

    /// Returns the registered service name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the class path as written, without a leading separator.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Returns the class path with a leading namespace separator.
    pub fn qualified_class_name(&self) -> String {
        qualify_class_name(&self.class_name)
    }

    /// Returns the constructor arguments.
    pub const fn arguments(&self) -> &ArgumentArrayNode {
        &self.arguments
    }

    /// Returns `false` only when the constructor takes no arguments.
    pub fn has_arguments(&self) -> bool {
        !self.arguments.is_empty()
    }

    /// Returns the method calls in source order.
    pub fn method_calls(&self) -> &[ServiceMethodCallNode] {
        &self.method_calls
    }

    /// Returns the source span of the definition.
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Visits every node in the constructor and method call arguments.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a AssignableNode)) {
        self.arguments.walk(visit);
        for call in &self.method_calls {
            call.arguments.walk(visit);
        }
    }

    /// Returns every `@name` used by this definition, in source order.
    pub fn service_references(&self) -> Vec<&ServiceReferenceNode> {
        let mut references = Vec::new();
        self.walk(&mut |node| {
            if let Some(reference) = node.as_service_reference() {
                references.push(reference);
            }
        });
        references
    }

    /// Returns every `:name` used by this definition, in source order.
    pub fn parameter_references(&self) -> Vec<&ParameterReferenceNode> {
        let mut references = Vec::new();
        self.walk(&mut |node| {
            if let Some(reference) = node.as_parameter_reference() {
                references.push(reference);
            }
        });
        references
    }
}

/// `:name: value` at scope level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDefinitionNode {
    name: String,
    value: AssignableNode,
    span: Span,
}

impl ParameterDefinitionNode {
    /// Creates a parameter definition.
    ///
    /// # Errors
    ///
    /// Returns a logical error if `value` is, or contains, a reference.
    pub fn new(name: impl Into<String>, value: AssignableNode) -> Result<Self> {
        let _ = value.to_native()?;
        Ok(Self {
            name: name.into(),
            value,
            span: Span::default(),
        })
    }

    /// Attaches the source span of the definition.
    #[must_use]
    pub const fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Returns the parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the literal value node.
    pub const fn value(&self) -> &AssignableNode {
        &self.value
    }

    /// Returns the source span of the definition.
    pub const fn span(&self) -> Span {
        self.span
    }
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum ScopeEntry {
    /// `:name: value`.
    Parameter(ParameterDefinitionNode),
    /// `@name: Class(...)`.
    Service(ServiceDefinitionNode),
}

impl ScopeEntry {
    /// Returns the variant of the wrapped node.
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Parameter(_) => NodeKind::ParameterDefinition,
            Self::Service(_) => NodeKind::ServiceDefinition,
        }
    }
}

/// An ordered sequence of parameter and service definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScopeNode {
    entries: Vec<ScopeEntry>,
}

impl ScopeNode {
    /// Creates an empty scope.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a statement.
    pub fn push(&mut self, entry: ScopeEntry) {
        self.entries.push(entry);
    }

    /// Returns the statements in source order.
    pub fn entries(&self) -> &[ScopeEntry] {
        &self.entries
    }

    /// Iterates over the service definitions in source order.
    pub fn services(&self) -> impl Iterator<Item = &ServiceDefinitionNode> {
        self.entries.iter().filter_map(|entry| match entry {
            ScopeEntry::Service(node) => Some(node),
            ScopeEntry::Parameter(_) => None,
        })
    }

    /// Iterates over the parameter definitions in source order.
    pub fn parameters(&self) -> impl Iterator<Item = &ParameterDefinitionNode> {
        self.entries.iter().filter_map(|entry| match entry {
            ScopeEntry::Parameter(node) => Some(node),
            ScopeEntry::Service(_) => None,
        })
    }

    /// Returns the first service defined under `name`.
    pub fn service(&self, name: &str) -> Option<&ServiceDefinitionNode> {
        self.services().find(|node| node.name() == name)
    }

    /// Returns the first parameter defined under `name`.
    pub fn parameter(&self, name: &str) -> Option<&ParameterDefinitionNode> {
        self.parameters().find(|node| node.name() == name)
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the scope has no statements.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
