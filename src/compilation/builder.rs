//! Schema document → [`SchemaParsing`] tree.
//!
//! Walks the schema DOM recognizing draft-4 keywords (plus the draft-3
//! `extends`), recording one feature per constraint keyword and recursing
//! into subschemas. `id` scopes are pushed while the node is built, so
//! `$ref` targets are absolutized against the correct base. Unknown
//! keywords are ignored, as are annotations such as `title`.
use crate::compilation::context::UriScope;
use crate::compilation::features::{Feature, ItemsFeature, Policy};
use crate::compilation::parsing::{SchemaParsing, SchemaType, TypeSpec};
use crate::error::SchemaError;
use crate::number::Number;
use crate::validators::combined::CombinedKind;
use crate::value::CanonValue;
use fancy_regex::Regex;
use serde_json::{Map, Value};
use std::sync::Arc;

pub(crate) struct BuildContext<'a> {
    pub(crate) scope: &'a mut UriScope,
    /// Canonical URIs of every `$ref` encountered, checked after collection.
    pub(crate) refs: &'a mut Vec<String>,
}

pub(crate) fn build(schema: &Value, ctx: &mut BuildContext<'_>) -> Result<SchemaParsing, SchemaError> {
    let object = match schema {
        Value::Object(object) => object,
        _ => return Err(SchemaError::NotAnObject),
    };
    let mut node = SchemaParsing::new();
    if let Some(id) = object.get("id") {
        let id = id
            .as_str()
            .ok_or_else(|| SchemaError::malformed("id", "must be a string"))?;
        let id = ctx
            .scope
            .resolve(id)
            .map_err(|_| SchemaError::invalid_reference(id))?;
        ctx.scope.push_id(&id);
        node.id = Some(id);
    }
    let result = build_keywords(object, &mut node, ctx);
    if node.id.is_some() {
        ctx.scope.pop_id();
    }
    result.map(|_| node)
}

fn build_keywords(
    object: &Map<String, Value>,
    node: &mut SchemaParsing,
    ctx: &mut BuildContext<'_>,
) -> Result<(), SchemaError> {
    if let Some(reference) = object.get("$ref") {
        let reference = reference
            .as_str()
            .ok_or_else(|| SchemaError::malformed("$ref", "must be a string"))?;
        let url = ctx
            .scope
            .resolve(reference)
            .map_err(|_| SchemaError::invalid_reference(reference))?;
        let uri = UriScope::key_of(&url);
        ctx.refs.push(uri.clone());
        node.reference = Some(uri);
        // Other keywords next to `$ref` are ignored, but `definitions` may
        // hold the referenced subschemas themselves.
        if let Some(definitions) = object.get("definitions") {
            build_definitions(definitions, node, ctx)?;
        }
        return Ok(());
    }
    for (keyword, value) in object {
        match keyword.as_str() {
            "type" => node.type_spec = Some(parse_type(value)?),
            "properties" => {
                let map = as_object(value, "properties")?;
                let mut properties = Vec::with_capacity(map.len());
                for (name, subschema) in map {
                    properties.push((name.clone(), build(subschema, ctx)?));
                }
                node.features.push(Feature::Properties(properties));
            }
            "required" => {
                let keys = as_string_array(value, "required")?;
                node.features.push(Feature::Required(keys));
            }
            "additionalProperties" => {
                let policy = parse_policy(value, "additionalProperties", ctx)?;
                node.features.push(Feature::AdditionalProperties(policy));
            }
            "minProperties" => {
                node.features
                    .push(Feature::MinProperties(as_limit(value, "minProperties")?));
            }
            "maxProperties" => {
                node.features
                    .push(Feature::MaxProperties(as_limit(value, "maxProperties")?));
            }
            "items" => {
                let items = match value {
                    Value::Object(_) => ItemsFeature::Uniform(Box::new(build(value, ctx)?)),
                    Value::Array(subschemas) => {
                        let mut children = Vec::with_capacity(subschemas.len());
                        for subschema in subschemas {
                            children.push(build(subschema, ctx)?);
                        }
                        ItemsFeature::Tuple(children)
                    }
                    _ => {
                        return Err(SchemaError::malformed(
                            "items",
                            "must be a schema or an array of schemas",
                        ))
                    }
                };
                node.features.push(Feature::Items(items));
            }
            "additionalItems" => {
                let policy = parse_policy(value, "additionalItems", ctx)?;
                node.features.push(Feature::AdditionalItems(policy));
            }
            "minItems" => {
                node.features
                    .push(Feature::MinItems(as_limit(value, "minItems")?));
            }
            "maxItems" => {
                node.features
                    .push(Feature::MaxItems(as_limit(value, "maxItems")?));
            }
            "uniqueItems" => {
                node.features
                    .push(Feature::UniqueItems(as_bool(value, "uniqueItems")?));
            }
            "minimum" => {
                node.features
                    .push(Feature::Minimum(as_number(value, "minimum")?));
            }
            "maximum" => {
                node.features
                    .push(Feature::Maximum(as_number(value, "maximum")?));
            }
            "exclusiveMinimum" => {
                node.features
                    .push(Feature::ExclusiveMinimum(as_bool(value, "exclusiveMinimum")?));
            }
            "exclusiveMaximum" => {
                node.features
                    .push(Feature::ExclusiveMaximum(as_bool(value, "exclusiveMaximum")?));
            }
            "multipleOf" => {
                let divisor = as_number(value, "multipleOf")?;
                if !divisor.is_positive() {
                    return Err(SchemaError::malformed("multipleOf", "must be positive"));
                }
                node.features.push(Feature::MultipleOf(divisor));
            }
            "minLength" => {
                node.features
                    .push(Feature::MinLength(as_limit(value, "minLength")?));
            }
            "maxLength" => {
                node.features
                    .push(Feature::MaxLength(as_limit(value, "maxLength")?));
            }
            "pattern" => {
                let pattern = value
                    .as_str()
                    .ok_or_else(|| SchemaError::malformed("pattern", "must be a string"))?;
                let pattern = Regex::new(pattern).map_err(|err| {
                    SchemaError::malformed("pattern", format!("invalid regex: {}", err))
                })?;
                node.features.push(Feature::Pattern(Arc::new(pattern)));
            }
            "enum" => {
                let options = value
                    .as_array()
                    .ok_or_else(|| SchemaError::malformed("enum", "must be an array"))?;
                if options.is_empty() {
                    return Err(SchemaError::malformed("enum", "must not be empty"));
                }
                let options = options
                    .iter()
                    .map(CanonValue::from_json)
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| SchemaError::malformed("enum", "contains an invalid number"))?;
                node.features.push(Feature::Enum(options));
            }
            "default" => node.features.push(Feature::Default(value.clone())),
            "allOf" => build_combinator(value, CombinedKind::AllOf, "allOf", node, ctx)?,
            "anyOf" => build_combinator(value, CombinedKind::AnyOf, "anyOf", node, ctx)?,
            "oneOf" => build_combinator(value, CombinedKind::OneOf, "oneOf", node, ctx)?,
            "not" => {
                let child = build(value, ctx)?;
                node.combinators.push((CombinedKind::Not, vec![child]));
            }
            "extends" => match value {
                Value::Object(_) => node.extends.push(build(value, ctx)?),
                Value::Array(subschemas) => {
                    for subschema in subschemas {
                        node.extends.push(build(subschema, ctx)?);
                    }
                }
                _ => {
                    return Err(SchemaError::malformed(
                        "extends",
                        "must be a schema or an array of schemas",
                    ))
                }
            },
            "definitions" => build_definitions(value, node, ctx)?,
            // Handled before the keyword loop.
            "id" => {}
            // Annotations.
            "$schema" | "title" | "description" => {}
            _ => {}
        }
    }
    Ok(())
}

fn build_definitions(
    value: &Value,
    node: &mut SchemaParsing,
    ctx: &mut BuildContext<'_>,
) -> Result<(), SchemaError> {
    let map = as_object(value, "definitions")?;
    for (name, subschema) in map {
        let child = build(subschema, ctx)?;
        node.definitions.push((name.clone(), child));
    }
    Ok(())
}

fn build_combinator(
    value: &Value,
    kind: CombinedKind,
    keyword: &'static str,
    node: &mut SchemaParsing,
    ctx: &mut BuildContext<'_>,
) -> Result<(), SchemaError> {
    let subschemas = value
        .as_array()
        .ok_or_else(|| SchemaError::malformed(keyword, "must be an array of schemas"))?;
    if subschemas.is_empty() {
        return Err(SchemaError::malformed(keyword, "must not be empty"));
    }
    let mut children = Vec::with_capacity(subschemas.len());
    for subschema in subschemas {
        children.push(build(subschema, ctx)?);
    }
    node.combinators.push((kind, children));
    Ok(())
}

fn parse_type(value: &Value) -> Result<TypeSpec, SchemaError> {
    match value {
        Value::String(name) => SchemaType::from_name(name)
            .map(TypeSpec::One)
            .ok_or_else(|| SchemaError::unknown_type(name)),
        Value::Array(names) => {
            if names.is_empty() {
                return Err(SchemaError::malformed("type", "must not be empty"));
            }
            let mut types = Vec::with_capacity(names.len());
            for name in names {
                let name = name
                    .as_str()
                    .ok_or_else(|| SchemaError::malformed("type", "must be a list of names"))?;
                types.push(SchemaType::from_name(name).ok_or_else(|| SchemaError::unknown_type(name))?);
            }
            Ok(TypeSpec::Many(types))
        }
        _ => Err(SchemaError::malformed(
            "type",
            "must be a type name or a list of names",
        )),
    }
}

fn parse_policy(
    value: &Value,
    keyword: &'static str,
    ctx: &mut BuildContext<'_>,
) -> Result<Policy, SchemaError> {
    match value {
        Value::Bool(true) => Ok(Policy::Allow),
        Value::Bool(false) => Ok(Policy::Forbid),
        Value::Object(_) => Ok(Policy::Schema(build(value, ctx)?)),
        _ => Err(SchemaError::malformed(
            keyword,
            "must be a boolean or a schema",
        )),
    }
}

fn as_object<'a>(
    value: &'a Value,
    keyword: &'static str,
) -> Result<&'a Map<String, Value>, SchemaError> {
    value
        .as_object()
        .ok_or_else(|| SchemaError::malformed(keyword, "must be an object"))
}

fn as_string_array(value: &Value, keyword: &'static str) -> Result<Vec<String>, SchemaError> {
    let items = value
        .as_array()
        .ok_or_else(|| SchemaError::malformed(keyword, "must be an array of strings"))?;
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| SchemaError::malformed(keyword, "must be an array of strings"))
}

fn as_limit(value: &Value, keyword: &'static str) -> Result<u64, SchemaError> {
    value
        .as_u64()
        .ok_or_else(|| SchemaError::malformed(keyword, "must be a non-negative integer"))
}

fn as_bool(value: &Value, keyword: &'static str) -> Result<bool, SchemaError> {
    value
        .as_bool()
        .ok_or_else(|| SchemaError::malformed(keyword, "must be a boolean"))
}

fn as_number(value: &Value, keyword: &'static str) -> Result<Number, SchemaError> {
    match value {
        Value::Number(number) => Number::from_json(number)
            .map_err(|_| SchemaError::malformed(keyword, "must be a number")),
        _ => Err(SchemaError::malformed(keyword, "must be a number")),
    }
}
