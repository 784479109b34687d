// Copyright (c) 2025 - Cowboy AI, Inc.
//! Manifest templating
//!
//! Raw manifests are rendered as text; the result may hold several YAML
//! documents and each non-empty document becomes one manifest. Embedded
//! manifests keep their structure: every key and string value is rendered
//! on its own, so substituted text never has to be valid YAML.
//!
//! Templates run in strict mode (a missing variable is an error) with HTML
//! escaping disabled. Helpers:
//!
//! | Helper | Example | Output |
//! |---|---|---|
//! | `lower` | `{{lower Tenant.Name}}` | lowercase text |
//! | `upper` | `{{upper Tenant.Name}}` | uppercase text |
//! | `trim` | `{{trim Parameters.note}}` | text without surrounding whitespace |
//! | `quote` | `{{quote Tenant.DisplayName}}` | double-quoted, escaped text |
//! | `b64enc` | `{{b64enc Parameters.password}}` | standard base64 |
//! | `json` | `{{json Labels}}` | compact JSON |
//! | `default` | `{{default "small" Parameters.size}}` | fallback when empty |

use base64::{engine::general_purpose::STANDARD, Engine as _};
use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::GenerationError;

/// Handlebars registry configured for manifest rendering
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars.register_helper("lower", Box::new(lower_helper));
        handlebars.register_helper("upper", Box::new(upper_helper));
        handlebars.register_helper("trim", Box::new(trim_helper));
        handlebars.register_helper("quote", Box::new(quote_helper));
        handlebars.register_helper("b64enc", Box::new(b64enc_helper));
        handlebars.register_helper("json", Box::new(json_helper));
        handlebars.register_helper("default", Box::new(default_helper));

        Self { handlebars }
    }

    /// Render a template to text
    pub fn render(&self, source: &str, data: &Value) -> Result<String, GenerationError> {
        self.handlebars
            .render_template(source, data)
            .map_err(|e| GenerationError::Render(e.to_string()))
    }

    /// Render a raw manifest template into its documents
    pub fn render_raw(&self, source: &str, data: &Value) -> Result<Vec<Value>, GenerationError> {
        split_documents(&self.render(source, data)?)
    }

    /// Render an embedded manifest into its documents
    pub fn render_embedded(
        &self,
        embedded: &Value,
        data: &Value,
    ) -> Result<Vec<Value>, GenerationError> {
        match self.render_value(embedded, data)? {
            Value::Null => Ok(Vec::new()),
            document => Ok(vec![document]),
        }
    }

    fn render_value(&self, value: &Value, data: &Value) -> Result<Value, GenerationError> {
        Ok(match value {
            Value::String(text) => Value::String(self.render(text, data)?),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.render_value(item, data))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(fields) => {
                let mut rendered = Map::with_capacity(fields.len());
                for (key, field) in fields {
                    rendered.insert(self.render(key, data)?, self.render_value(field, data)?);
                }
                Value::Object(rendered)
            }
            scalar => scalar.clone(),
        })
    }
}

/// Split multi-document YAML, skipping empty documents
pub fn split_documents(text: &str) -> Result<Vec<Value>, GenerationError> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(text) {
        let value = Value::deserialize(document)
            .map_err(|e| GenerationError::InvalidManifest(e.to_string()))?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

/// Helper parameter as text; strings unquoted, null empty, others as JSON
fn param_text(h: &Helper, index: usize) -> String {
    match h.param(index).map(|p| p.value()) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn lower_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&param_text(h, 0).to_lowercase())?;
    Ok(())
}

fn upper_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&param_text(h, 0).to_uppercase())?;
    Ok(())
}

fn trim_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(param_text(h, 0).trim())?;
    Ok(())
}

fn quote_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&Value::String(param_text(h, 0)).to_string())?;
    Ok(())
}

fn b64enc_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&STANDARD.encode(param_text(h, 0)))?;
    Ok(())
}

fn json_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    if let Some(v) = h.param(0) {
        out.write(&v.value().to_string())?;
    }
    Ok(())
}

fn default_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = param_text(h, 1);
    if value.is_empty() {
        out.write(&param_text(h, 0))?;
    } else {
        out.write(&value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn data() -> Value {
        json!({
            "Tenant": { "Name": "acme", "DisplayName": "Acme & Co" },
            "Parameters": { "size": "", "password": "hunter2" },
            "Labels": { "team": "core" }
        })
    }

    #[test]
    fn test_helpers() {
        let engine = TemplateEngine::new();
        let rendered = engine
            .render(
                "{{upper Tenant.Name}} {{quote Tenant.DisplayName}} {{b64enc Parameters.password}} \
                 {{default \"small\" Parameters.size}} {{json Labels}}",
                &data(),
            )
            .unwrap();
        assert_eq!(
            rendered,
            r#"ACME "Acme & Co" aHVudGVyMg== small {"team":"core"}"#
        );
    }

    #[test]
    fn test_no_html_escaping() {
        let engine = TemplateEngine::new();
        assert_eq!(
            engine.render("{{Tenant.DisplayName}}", &data()).unwrap(),
            "Acme & Co"
        );
    }

    #[test]
    fn test_missing_variable_is_error() {
        let engine = TemplateEngine::new();
        let err = engine.render("{{Tenant.Region}}", &data()).unwrap_err();
        assert!(matches!(err, GenerationError::Render(_)));
    }

    #[test]
    fn test_split_skips_empty_documents() {
        let documents = split_documents(
            "---\napiVersion: v1\nkind: ConfigMap\n---\n---\napiVersion: v1\nkind: Secret\n",
        )
        .unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[1]["kind"], "Secret");
    }

    #[test]
    fn test_embedded_manifest_is_rendered() {
        let engine = TemplateEngine::new();
        let embedded = json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": { "name": "{{Tenant.Name}}-settings" },
            "data": { "owner": "{{Tenant.DisplayName}}" }
        });

        let documents = engine.render_embedded(&embedded, &data()).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0]["metadata"]["name"], "acme-settings");
        assert_eq!(documents[0]["data"]["owner"], "Acme & Co");
    }

    #[test]
    fn test_embedded_values_are_not_reparsed() {
        let engine = TemplateEngine::new();
        let data = json!({
            "Tenant": { "Name": "obrien", "DisplayName": "O'Brien Ltd" },
            "Parameters": { "note": "x: y", "channel": "#ops", "port": "8080" }
        });
        let embedded = json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": { "name": "{{Tenant.Name}}" },
            "data": {
                "owner": "{{Tenant.DisplayName}}",
                "note": "owner {{Parameters.note}}",
                "{{Tenant.Name}}-channel": "{{Parameters.channel}}",
                "ports": ["{{Parameters.port}}", 9090]
            }
        });

        let documents = engine.render_embedded(&embedded, &data).unwrap();
        assert_eq!(
            documents,
            vec![json!({
                "apiVersion": "v1",
                "kind": "ConfigMap",
                "metadata": { "name": "obrien" },
                "data": {
                    "owner": "O'Brien Ltd",
                    "note": "owner x: y",
                    "obrien-channel": "#ops",
                    "ports": ["8080", 9090]
                }
            })]
        );
    }

    #[test]
    fn test_embedded_missing_variable_is_error() {
        let engine = TemplateEngine::new();
        let err = engine
            .render_embedded(&json!({ "data": { "region": "{{Tenant.Region}}" } }), &data())
            .unwrap_err();
        assert!(matches!(err, GenerationError::Render(_)));
    }
}
