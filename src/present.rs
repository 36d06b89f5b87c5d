use crate::join::JoinedDataset;
use crate::models::Feature;
use crate::template::TemplateContext;
use serde_json::Value;

/// Prefix under which feature properties appear in template contexts.
pub const PROPERTY_PREFIX: &str = "@@";

/// Reserved context key holding the formatted value.
pub const VALUE_KEY: &str = "@@value";

fn scalar_display(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Flatten a feature into a template context.
///
/// Feature properties appear as `@@<key>`, the formatted value as `@@value`, and the
/// columns of the joined query row (if the feature has one) under their own names.
pub fn prepare_feature_properties(
    feature: &Feature,
    value_formatted: &str,
    data: &JoinedDataset,
    code_type: &str,
) -> TemplateContext {
    let mut ctx = TemplateContext::with_capacity(feature.properties.len() + 1);
    for (key, value) in &feature.properties {
        if let Some(text) = scalar_display(value) {
            ctx.insert(format!("{PROPERTY_PREFIX}{key}"), text);
        }
    }
    ctx.insert(VALUE_KEY.to_string(), value_formatted.to_string());

    if let Some(datum) = data.for_feature(feature, code_type) {
        for (column, value) in &datum.row {
            if let Some(text) = scalar_display(value) {
                ctx.insert(column.clone(), text);
            }
        }
    }
    ctx
}
