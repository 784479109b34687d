// Copyright (c) 2025 - Cowboy AI, Inc.
//! Naming and namespacing rules

use super::manifest::Manifest;
use crate::domain::{NameRule, NamespaceRule, NamingRules};

/// Names the rules can substitute
#[derive(Debug, Clone, Copy)]
pub struct NamingContext<'a> {
    pub tenant: &'a str,
    pub tenant_namespace: &'a str,
    pub operator_namespace: &'a str,
}

impl NamingContext<'_> {
    fn namespace_for(&self, rule: NamespaceRule) -> Option<&str> {
        match rule {
            NamespaceRule::Keep => None,
            NamespaceRule::Tenant => Some(self.tenant_namespace),
            NamespaceRule::Operator => Some(self.operator_namespace),
        }
    }
}

/// Rewrite a manifest's name and namespace
///
/// A core Namespace is named by the namespace rule directly and never has a
/// namespace of its own. Every other kind gets the name rule and the
/// namespace rule applied independently.
pub fn apply_naming(manifest: &mut Manifest, rules: &NamingRules, context: &NamingContext<'_>) {
    if manifest.is_namespace() {
        if let Some(namespace) = context.namespace_for(rules.namespace) {
            manifest.set_name(namespace);
        }
        manifest.set_namespace(None);
        return;
    }

    if rules.name == NameRule::Tenant {
        let name = format!("{}-{}", context.tenant, manifest.name());
        manifest.set_name(name);
    }
    if let Some(namespace) = context.namespace_for(rules.namespace) {
        manifest.set_namespace(Some(namespace));
    }
}
