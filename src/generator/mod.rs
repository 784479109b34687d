// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Generator
//!
//! Turns a tenant and its [`Blueprint`] into a content-addressed resource
//! list. Groups are processed strictly in blueprint order, because a group's
//! parameters may reference groups generated before it.
//!
//! ```text
//! for group in blueprint.resources:
//!     ResourceTemplate ──parameters──> data context
//!            │                              │
//!            └── raw / embedded ──render──> YAML documents
//!                                              │
//!                naming rules, labels ──> Manifest ──> Resource { id, order, sum }
//!
//! sum = hash(id:order:sum for every resource, in order)
//! ```
//!
//! Failures are accumulated across all groups; the call fails with every
//! failure listed if any occurred.

pub mod diff;
pub mod error;
pub mod hash;
pub mod manifest;
pub mod naming;
pub mod template;

use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use crate::cluster::{ClusterClient, ClusterClientExt};
use crate::config::OperatorConfig;
use crate::domain::{
    Blueprint, BlueprintResourceGroup, ParameterSpec, Resource, ResourceGroup, ResourceTemplate,
    Tenant, LABEL_TENANT,
};
use crate::resolver::ValueResolver;

pub use diff::{diff_resources, ResourceChange};
pub use error::{GenerationError, GenerationErrors, GroupFailure};
pub use hash::{aggregate_sum, content_sum, resource_id};
pub use manifest::Manifest;
pub use naming::{apply_naming, NamingContext};
pub use template::{split_documents, TemplateEngine};

/// Output of one generation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedResources {
    pub groups: Vec<ResourceGroup>,
    /// Aggregate sum over every resource, in order
    pub sum: String,
}

impl GeneratedResources {
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.groups.iter().flat_map(|group| group.resources.iter())
    }

    pub fn to_resource_list(&self) -> Vec<Resource> {
        self.resources().cloned().collect()
    }
}

/// Generates resources for tenants
pub struct ResourceGenerator<'a, C: ClusterClient + ?Sized> {
    cluster: &'a C,
    config: &'a OperatorConfig,
    engine: TemplateEngine,
}

impl<'a, C: ClusterClient + ?Sized> ResourceGenerator<'a, C> {
    pub fn new(cluster: &'a C, config: &'a OperatorConfig) -> Self {
        Self {
            cluster,
            config,
            engine: TemplateEngine::new(),
        }
    }

    /// Generate every group of `blueprint` for `tenant`
    pub async fn generate(
        &self,
        tenant: &Tenant,
        blueprint: &Blueprint,
    ) -> Result<GeneratedResources, GenerationErrors> {
        let mut groups: Vec<ResourceGroup> = Vec::new();
        let mut failures = Vec::new();
        let mut owners: HashMap<String, String> = HashMap::new();
        let mut order = 0i64;

        for group in &blueprint.spec.resources {
            match self
                .generate_group(tenant, blueprint, group, &groups, &mut order)
                .await
            {
                Ok(generated) => {
                    for resource in &generated.resources {
                        if let Some(owner) =
                            owners.insert(resource.id.clone(), group.name.clone())
                        {
                            failures.push(GroupFailure::new(
                                &group.name,
                                GenerationError::DuplicateResource(format!(
                                    "{} also generated by group {owner}",
                                    describe(&resource.embedded)
                                )),
                            ));
                        }
                    }
                    debug!(
                        group = %group.name,
                        resources = generated.resources.len(),
                        "Generated resource group"
                    );
                    groups.push(generated);
                }
                Err(errors) => {
                    for error in errors {
                        warn!(group = %group.name, %error, "Resource group failed");
                        failures.push(GroupFailure::new(&group.name, error));
                    }
                }
            }
        }

        if !failures.is_empty() {
            return Err(GenerationErrors(failures));
        }

        let sum = aggregate_sum(groups.iter().flat_map(|g| g.resources.iter()));
        Ok(GeneratedResources { groups, sum })
    }

    async fn generate_group(
        &self,
        tenant: &Tenant,
        blueprint: &Blueprint,
        group: &BlueprintResourceGroup,
        generated: &[ResourceGroup],
        order: &mut i64,
    ) -> Result<ResourceGroup, Vec<GenerationError>> {
        let template = self
            .cluster
            .get_object::<ResourceTemplate>(
                Some(self.config.operator_namespace.as_str()),
                &group.template,
            )
            .await
            .map_err(|e| vec![GenerationError::Lookup(e.to_string())])?
            .ok_or_else(|| vec![GenerationError::TemplateNotFound(group.template.clone())])?;

        let parameters = self
            .resolve_parameters(tenant, &template.spec.parameters, group, generated)
            .await?;

        let labels = merged(&blueprint.spec.labels, &tenant.spec.labels, Some(tenant));
        let annotations = merged(&blueprint.spec.annotations, &tenant.spec.annotations, None);
        let data = json!({
            "Parameters": parameters,
            "Tenant": {
                "Name": tenant.metadata.name,
                "Namespace": tenant.namespace(),
                "DisplayName": tenant.display_name(),
            },
            "Operator": { "Namespace": self.config.operator_namespace },
            "Labels": labels,
            "Annotations": annotations,
            "Blueprint": blueprint.metadata.name,
            "Group": group.name,
        });

        let mut errors = Vec::new();
        let mut documents = Vec::new();
        let sources = &template.spec.resources;
        for rendered in sources
            .raw
            .iter()
            .map(|raw| self.engine.render_raw(raw, &data))
            .chain(
                sources
                    .embedded
                    .iter()
                    .map(|embedded| self.engine.render_embedded(embedded, &data)),
            )
        {
            match rendered {
                Ok(docs) => documents.extend(docs),
                Err(error) => errors.push(error),
            }
        }

        let naming = NamingContext {
            tenant: &tenant.metadata.name,
            tenant_namespace: tenant.namespace(),
            operator_namespace: &self.config.operator_namespace,
        };
        let mut resources = Vec::new();
        for document in documents {
            let mut manifest = match Manifest::parse(document) {
                Ok(manifest) => manifest,
                Err(error) => {
                    errors.push(error);
                    continue;
                }
            };
            apply_naming(&mut manifest, &template.spec.naming, &naming);
            manifest.merge_labels(&labels);
            manifest.merge_annotations(&annotations);

            *order += 1;
            let id = resource_id(
                &manifest.qualified_kind(),
                manifest.namespace(),
                manifest.name(),
            );
            let embedded = manifest.into_value();
            resources.push(Resource {
                id,
                order: *order,
                sum: content_sum(&embedded),
                embedded,
            });
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ResourceGroup {
            name: group.name.clone(),
            source_template: group.template.clone(),
            resources,
        })
    }

    /// Bind every declared parameter to a literal, a reference or its default
    async fn resolve_parameters(
        &self,
        tenant: &Tenant,
        declared: &[ParameterSpec],
        group: &BlueprintResourceGroup,
        generated: &[ResourceGroup],
    ) -> Result<BTreeMap<String, String>, Vec<GenerationError>> {
        let mut errors: Vec<GenerationError> = group
            .parameters
            .iter()
            .filter(|binding| !declared.iter().any(|p| p.name == binding.name))
            .map(|binding| GenerationError::UnknownParameter(binding.name.clone()))
            .collect();

        let resolver = ValueResolver::new(
            self.cluster,
            &tenant.metadata.name,
            tenant.namespace(),
            &self.config.operator_namespace,
        );

        let mut values = BTreeMap::new();
        for parameter in declared {
            let binding = group.parameters.iter().find(|b| b.name == parameter.name);
            let value = match binding.map(|b| (&b.value, &b.value_ref)) {
                Some((Some(_), Some(_))) => {
                    errors.push(GenerationError::InvalidParameter {
                        name: parameter.name.clone(),
                        reason: "both value and valueRef are set".to_string(),
                    });
                    continue;
                }
                Some((Some(literal), None)) => Some(literal.clone()),
                Some((None, Some(value_ref))) => {
                    match resolver.resolve(value_ref, generated).await {
                        Ok(value) => Some(value),
                        Err(error) => {
                            errors.push(error.into());
                            continue;
                        }
                    }
                }
                Some((None, None)) | None => None,
            };

            let value = value.or_else(|| parameter.default.clone()).unwrap_or_default();
            if parameter.required && value.is_empty() {
                errors.push(GenerationError::MissingParameter(parameter.name.clone()));
                continue;
            }
            values.insert(parameter.name.clone(), value);
        }

        if errors.is_empty() {
            Ok(values)
        } else {
            Err(errors)
        }
    }
}

/// Blueprint entries overwritten by tenant entries, plus the tenant label
fn merged(
    blueprint: &BTreeMap<String, String>,
    tenant_entries: &BTreeMap<String, String>,
    tenant_label: Option<&Tenant>,
) -> BTreeMap<String, String> {
    let mut entries = blueprint.clone();
    entries.extend(tenant_entries.iter().map(|(k, v)| (k.clone(), v.clone())));
    if let Some(tenant) = tenant_label {
        entries.insert(LABEL_TENANT.to_string(), tenant.metadata.name.clone());
    }
    entries
}

fn describe(manifest: &Value) -> String {
    Manifest::parse(manifest.clone())
        .map(|m| m.object_ref().to_string())
        .unwrap_or_else(|_| manifest.to_string())
}
