//! Static analysis and validation of a parsed scope.
//!
//! Checks for duplicate names and circular service dependencies before
//! the scope is handed to a binding runtime.

use std::collections::HashSet;

use cdl_common::error::{CdlError, Result};

use super::ast::ScopeNode;
use crate::graph::DependencyGraph;

/// Validates a parsed scope for semantic correctness.
///
/// # Checks performed
///
/// 1. No duplicate service names.
/// 2. No duplicate parameter names.
/// 3. No dependency cycle between services defined in the scope.
///
/// References to services or parameters the scope does not define are
/// logged as warnings only, since the runtime may provide them.
///
/// # Errors
///
/// Returns a semantic error if any check fails.
pub fn validate(scope: &ScopeNode) -> Result<()> {
    tracing::debug!("validating CDL scope");
    check_duplicate_services(scope)?;
    check_duplicate_parameters(scope)?;
    warn_unresolved_references(scope);
    let _ = DependencyGraph::from_scope(scope).resolve_order()?;
    Ok(())
}

fn check_duplicate_services(scope: &ScopeNode) -> Result<()> {
    let mut seen = HashSet::new();
    for service in scope.services() {
        if !seen.insert(service.name()) {
            return Err(CdlError::Semantic {
                message: format!(
                    "duplicate service name \"{}\" at {}",
                    service.name(),
                    service.span()
                ),
            });
        }
    }
    Ok(())
}

fn check_duplicate_parameters(scope: &ScopeNode) -> Result<()> {
    let mut seen = HashSet::new();
    for parameter in scope.parameters() {
        if !seen.insert(parameter.name()) {
            return Err(CdlError::Semantic {
                message: format!(
                    "duplicate parameter name \"{}\" at {}",
                    parameter.name(),
                    parameter.span()
                ),
            });
        }
    }
    Ok(())
}

fn warn_unresolved_references(scope: &ScopeNode) {
    for service in scope.services() {
        for reference in service.service_references() {
            if scope.service(reference.name()).is_none() {
                tracing::warn!(
                    service = service.name(),
                    reference = reference.name(),
                    at = %reference.span(),
                    "service reference is not defined in this scope"
                );
            }
        }
        for reference in service.parameter_references() {
            if scope.parameter(reference.name()).is_none() {
                tracing::warn!(
                    service = service.name(),
                    parameter = reference.name(),
                    at = %reference.span(),
                    "parameter reference is not defined in this scope"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use cdl_common::error::ErrorKind;

    use super::*;
    use crate::parser::ast::{
        ArgumentArrayNode, ParameterDefinitionNode, ScopeEntry, ServiceDefinitionNode,
        ServiceReferenceNode, ValueNode,
    };
    use crate::parser::token::Scalar;

    fn make_service(name: &str, references: &[&str]) -> ScopeEntry {
        let mut args = ArgumentArrayNode::new();
        for reference in references {
            args.push(ServiceReferenceNode::new(*reference));
        }
        ScopeEntry::Service(ServiceDefinitionNode::new(name, "Acme\\Service").with_arguments(args))
    }

    fn make_parameter(name: &str) -> ScopeEntry {
        let value = ValueNode::from(Scalar::Integer(1));
        ScopeEntry::Parameter(
            ParameterDefinitionNode::new(name, value.into()).expect("literal value"),
        )
    }

    fn scope_of(entries: Vec<ScopeEntry>) -> ScopeNode {
        let mut scope = ScopeNode::new();
        for entry in entries {
            scope.push(entry);
        }
        scope
    }

    #[test]
    fn validate_empty_scope_succeeds() {
        assert!(validate(&ScopeNode::new()).is_ok());
    }

    #[test]
    fn validate_valid_scope_succeeds() {
        let scope = scope_of(vec![
            make_parameter("level"),
            make_service("logger", &[]),
            make_service("mailer", &["logger"]),
        ]);
        assert!(validate(&scope).is_ok());
    }

    #[test]
    fn validate_external_reference_succeeds() {
        let scope = scope_of(vec![make_service("mailer", &["transport"])]);
        assert!(validate(&scope).is_ok());
    }

    #[test]
    fn validate_duplicate_service_name_fails() {
        let scope = scope_of(vec![make_service("api", &[]), make_service("api", &[])]);
        let err = validate(&scope).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        let msg = err.to_string();
        assert!(msg.contains("duplicate service name"), "got: {msg}");
    }

    #[test]
    fn validate_duplicate_parameter_name_fails() {
        let scope = scope_of(vec![make_parameter("port"), make_parameter("port")]);
        let err = validate(&scope).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("duplicate parameter name \"port\""), "got: {msg}");
    }

    #[test]
    fn validate_same_name_for_service_and_parameter_succeeds() {
        let scope = scope_of(vec![make_parameter("db"), make_service("db", &[])]);
        assert!(validate(&scope).is_ok());
    }

    #[test]
    fn validate_dependency_cycle_fails() {
        let scope = scope_of(vec![make_service("a", &["b"]), make_service("b", &["a"])]);
        let err = validate(&scope).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert!(err.to_string().contains("cyclic"), "got: {err}");
    }

    #[test]
    fn validate_self_reference_fails() {
        let scope = scope_of(vec![make_service("a", &["a"])]);
        assert!(validate(&scope).is_err());
    }
}
