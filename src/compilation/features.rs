//! Features: deferred constraint appliers.
//!
//! The builder accumulates one feature per recognized constraint keyword
//! before the concrete validator shape is known. During finalization each
//! feature is applied, in registration order, to the node's type validator
//! under construction; a feature aimed at a type the schema does not admit
//! is inert, matching the draft's per-type constraint semantics.
use crate::compilation::parsing::{SchemaParsing, SchemaType, TypeSpec};
use crate::event::{JsonType, JSON_TYPE_COUNT};
use crate::number::Number;
use crate::validators::array::{AdditionalItems, ArrayValidator, Items};
use crate::validators::boolean::boolean_validator;
use crate::validators::combined::all_of;
use crate::validators::combined_types::CombinedTypesValidator;
use crate::validators::enum_::EnumValidator;
use crate::validators::generic::generic_validator;
use crate::validators::null::null_validator;
use crate::validators::number::NumberValidator;
use crate::validators::object::{AdditionalProperties, ObjectValidator};
use crate::validators::string::StringValidator;
use crate::validators::unique_items::unique_items_validator;
use crate::validators::ValidatorRef;
use crate::value::CanonValue;
use fancy_regex::Regex;
use serde_json::Value;
use std::sync::Arc;

/// Subschema-or-boolean policy of `additionalProperties`/`additionalItems`.
pub(crate) enum Policy {
    Allow,
    Forbid,
    Schema(SchemaParsing),
}

pub(crate) enum ItemsFeature {
    Uniform(Box<SchemaParsing>),
    Tuple(Vec<SchemaParsing>),
}

pub(crate) enum Feature {
    Properties(Vec<(String, SchemaParsing)>),
    Required(Vec<String>),
    AdditionalProperties(Policy),
    MinProperties(u64),
    MaxProperties(u64),
    Items(ItemsFeature),
    AdditionalItems(Policy),
    MinItems(u64),
    MaxItems(u64),
    UniqueItems(bool),
    Minimum(Number),
    Maximum(Number),
    ExclusiveMinimum(bool),
    ExclusiveMaximum(bool),
    MultipleOf(Number),
    MinLength(u64),
    MaxLength(u64),
    Pattern(Arc<Regex>),
    Enum(Vec<CanonValue>),
    Default(Value),
}

impl Feature {
    /// The subschemas nested inside this feature, for the compilation passes.
    pub(crate) fn children_mut(&mut self) -> Vec<&mut SchemaParsing> {
        match self {
            Feature::Properties(properties) => {
                properties.iter_mut().map(|(_, child)| child).collect()
            }
            Feature::AdditionalProperties(Policy::Schema(child))
            | Feature::AdditionalItems(Policy::Schema(child)) => vec![child],
            Feature::Items(ItemsFeature::Uniform(child)) => vec![child.as_mut()],
            Feature::Items(ItemsFeature::Tuple(children)) => children.iter_mut().collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Default)]
pub(crate) struct NumberSketch {
    integer: bool,
    minimum: Option<Number>,
    exclusive_minimum: bool,
    maximum: Option<Number>,
    exclusive_maximum: bool,
    multiple_of: Option<Number>,
}

impl NumberSketch {
    fn build(self, enumeration: Option<Vec<Number>>) -> ValidatorRef {
        Arc::new(NumberValidator {
            integer_only: self.integer,
            minimum: self.minimum,
            exclusive_minimum: self.exclusive_minimum,
            maximum: self.maximum,
            exclusive_maximum: self.exclusive_maximum,
            multiple_of: self.multiple_of,
            enumeration,
        })
    }
}

#[derive(Default)]
pub(crate) struct StringSketch {
    min_length: Option<u64>,
    max_length: Option<u64>,
    pattern: Option<Arc<Regex>>,
}

impl StringSketch {
    fn build(self, enumeration: Option<Vec<String>>) -> ValidatorRef {
        Arc::new(StringValidator {
            min_length: self.min_length,
            max_length: self.max_length,
            pattern: self.pattern,
            enumeration,
        })
    }
}

enum ItemsStyle {
    Uniform(ValidatorRef),
    Tuple(Vec<ValidatorRef>),
}

#[derive(Default)]
pub(crate) struct ArraySketch {
    items: Option<ItemsStyle>,
    additional: Option<AdditionalItems>,
    min_items: Option<u64>,
    max_items: Option<u64>,
    unique: bool,
}

impl ArraySketch {
    fn build(self) -> ValidatorRef {
        let items = match self.items {
            None => Items::Uniform(generic_validator()),
            Some(ItemsStyle::Uniform(validator)) => Items::Uniform(validator),
            Some(ItemsStyle::Tuple(validators)) => Items::Tuple(
                validators,
                self.additional.unwrap_or(AdditionalItems::Allow),
            ),
        };
        let array: ValidatorRef = Arc::new(ArrayValidator::new(
            items,
            self.min_items,
            self.max_items,
        ));
        if self.unique {
            all_of(vec![array, unique_items_validator()])
        } else {
            array
        }
    }
}

#[derive(Default)]
pub(crate) struct ObjectSketch {
    properties: Vec<(String, ValidatorRef)>,
    required: Vec<String>,
    additional: Option<AdditionalProperties>,
    min_properties: Option<u64>,
    max_properties: Option<u64>,
}

impl ObjectSketch {
    fn build(self) -> ValidatorRef {
        let mut validator = ObjectValidator::new();
        for (name, child) in self.properties {
            validator.properties.insert(name, child);
        }
        validator.required = self.required;
        if let Some(additional) = self.additional {
            validator.additional = additional;
        }
        validator.min_properties = self.min_properties;
        validator.max_properties = self.max_properties;
        Arc::new(validator)
    }
}

/// Per-type slots for schemas admitting several primitive types, or for
/// typeless schemas which admit all of them.
pub(crate) struct TypeTable {
    null: bool,
    boolean: bool,
    number: Option<NumberSketch>,
    string: Option<StringSketch>,
    array: Option<ArraySketch>,
    object: Option<ObjectSketch>,
}

impl TypeTable {
    fn all() -> TypeTable {
        TypeTable {
            null: true,
            boolean: true,
            number: Some(NumberSketch::default()),
            string: Some(StringSketch::default()),
            array: Some(ArraySketch::default()),
            object: Some(ObjectSketch::default()),
        }
    }

    fn empty() -> TypeTable {
        TypeTable {
            null: false,
            boolean: false,
            number: None,
            string: None,
            array: None,
            object: None,
        }
    }

    fn build(self) -> ValidatorRef {
        let mut types: [Option<ValidatorRef>; JSON_TYPE_COUNT] = Default::default();
        if self.null {
            types[JsonType::Null.index()] = Some(null_validator());
        }
        if self.boolean {
            types[JsonType::Boolean.index()] = Some(boolean_validator());
        }
        if let Some(sketch) = self.number {
            types[JsonType::Number.index()] = Some(sketch.build(None));
        }
        if let Some(sketch) = self.string {
            types[JsonType::String.index()] = Some(sketch.build(None));
        }
        if let Some(sketch) = self.array {
            types[JsonType::Array.index()] = Some(sketch.build());
        }
        if let Some(sketch) = self.object {
            types[JsonType::Object.index()] = Some(sketch.build());
        }
        Arc::new(CombinedTypesValidator::new(types))
    }
}

enum TypeKind {
    Missing,
    Null,
    Boolean,
    Number(NumberSketch),
    String(StringSketch),
    Array(ArraySketch),
    Object(ObjectSketch),
    Multiple(TypeTable),
}

/// The node's type validator under construction: the `type` keyword picks
/// the shape, features fill the constraints in.
pub(crate) struct TypeBuilder {
    kind: TypeKind,
    enumeration: Option<Vec<CanonValue>>,
    default: Option<Value>,
}

impl TypeBuilder {
    pub(crate) fn new(spec: Option<&TypeSpec>) -> TypeBuilder {
        let kind = match spec {
            None => TypeKind::Missing,
            Some(TypeSpec::One(single)) => match single {
                SchemaType::Null => TypeKind::Null,
                SchemaType::Boolean => TypeKind::Boolean,
                SchemaType::Integer => TypeKind::Number(NumberSketch {
                    integer: true,
                    ..NumberSketch::default()
                }),
                SchemaType::Number => TypeKind::Number(NumberSketch::default()),
                SchemaType::String => TypeKind::String(StringSketch::default()),
                SchemaType::Array => TypeKind::Array(ArraySketch::default()),
                SchemaType::Object => TypeKind::Object(ObjectSketch::default()),
            },
            Some(TypeSpec::Many(types)) => {
                let mut table = TypeTable::empty();
                for single in types {
                    match single {
                        SchemaType::Null => table.null = true,
                        SchemaType::Boolean => table.boolean = true,
                        SchemaType::Integer => {
                            if table.number.is_none() {
                                table.number = Some(NumberSketch {
                                    integer: true,
                                    ..NumberSketch::default()
                                });
                            }
                        }
                        SchemaType::Number => match &mut table.number {
                            Some(sketch) => sketch.integer = false,
                            None => table.number = Some(NumberSketch::default()),
                        },
                        SchemaType::String => {
                            table.string.get_or_insert_with(StringSketch::default);
                        }
                        SchemaType::Array => {
                            table.array.get_or_insert_with(ArraySketch::default);
                        }
                        SchemaType::Object => {
                            table.object.get_or_insert_with(ObjectSketch::default);
                        }
                    }
                }
                TypeKind::Multiple(table)
            }
        };
        TypeBuilder {
            kind,
            enumeration: None,
            default: None,
        }
    }

    /// Apply one feature. A schema with features but no `type` admits every
    /// type, so the missing kind is first widened to the full table.
    pub(crate) fn apply(&mut self, feature: &Feature) {
        if let TypeKind::Missing = self.kind {
            self.kind = TypeKind::Multiple(TypeTable::all());
        }
        match feature {
            Feature::Properties(properties) => {
                if let Some(sketch) = self.object_mut() {
                    for (name, child) in properties {
                        sketch.properties.push((name.clone(), child.validator()));
                    }
                }
            }
            Feature::Required(keys) => {
                if let Some(sketch) = self.object_mut() {
                    sketch.required.extend(keys.iter().cloned());
                }
            }
            Feature::AdditionalProperties(policy) => {
                let additional = object_policy(policy);
                if let Some(sketch) = self.object_mut() {
                    sketch.additional = Some(additional);
                }
            }
            Feature::MinProperties(limit) => {
                if let Some(sketch) = self.object_mut() {
                    sketch.min_properties = Some(*limit);
                }
            }
            Feature::MaxProperties(limit) => {
                if let Some(sketch) = self.object_mut() {
                    sketch.max_properties = Some(*limit);
                }
            }
            Feature::Items(items) => {
                let style = match items {
                    ItemsFeature::Uniform(child) => ItemsStyle::Uniform(child.validator()),
                    ItemsFeature::Tuple(children) => {
                        ItemsStyle::Tuple(children.iter().map(SchemaParsing::validator).collect())
                    }
                };
                if let Some(sketch) = self.array_mut() {
                    sketch.items = Some(style);
                }
            }
            Feature::AdditionalItems(policy) => {
                let additional = items_policy(policy);
                if let Some(sketch) = self.array_mut() {
                    sketch.additional = Some(additional);
                }
            }
            Feature::MinItems(limit) => {
                if let Some(sketch) = self.array_mut() {
                    sketch.min_items = Some(*limit);
                }
            }
            Feature::MaxItems(limit) => {
                if let Some(sketch) = self.array_mut() {
                    sketch.max_items = Some(*limit);
                }
            }
            Feature::UniqueItems(unique) => {
                if let Some(sketch) = self.array_mut() {
                    sketch.unique = *unique;
                }
            }
            Feature::Minimum(limit) => {
                if let Some(sketch) = self.number_mut() {
                    sketch.minimum = Some(limit.clone());
                }
            }
            Feature::Maximum(limit) => {
                if let Some(sketch) = self.number_mut() {
                    sketch.maximum = Some(limit.clone());
                }
            }
            Feature::ExclusiveMinimum(exclusive) => {
                if let Some(sketch) = self.number_mut() {
                    sketch.exclusive_minimum = *exclusive;
                }
            }
            Feature::ExclusiveMaximum(exclusive) => {
                if let Some(sketch) = self.number_mut() {
                    sketch.exclusive_maximum = *exclusive;
                }
            }
            Feature::MultipleOf(divisor) => {
                if let Some(sketch) = self.number_mut() {
                    sketch.multiple_of = Some(divisor.clone());
                }
            }
            Feature::MinLength(limit) => {
                if let Some(sketch) = self.string_mut() {
                    sketch.min_length = Some(*limit);
                }
            }
            Feature::MaxLength(limit) => {
                if let Some(sketch) = self.string_mut() {
                    sketch.max_length = Some(*limit);
                }
            }
            Feature::Pattern(pattern) => {
                if let Some(sketch) = self.string_mut() {
                    sketch.pattern = Some(Arc::clone(pattern));
                }
            }
            Feature::Enum(options) => {
                self.enumeration = Some(options.clone());
            }
            Feature::Default(value) => {
                self.default = Some(value.clone());
            }
        }
    }

    /// The attached `default` value, taken by the node finalization to wrap
    /// the fused validator.
    pub(crate) fn take_default(&mut self) -> Option<Value> {
        self.default.take()
    }

    /// Collapse into the runtime validator. `None` when the schema had
    /// neither `type` nor any feature.
    pub(crate) fn build(self) -> Option<ValidatorRef> {
        let TypeBuilder {
            kind, enumeration, ..
        } = self;
        match kind {
            TypeKind::Missing => enumeration
                .map(|options| Arc::new(EnumValidator::new(options)) as ValidatorRef),
            TypeKind::Number(sketch) => {
                // Only numeric options can match a number.
                let options = enumeration.map(|options| {
                    options
                        .into_iter()
                        .filter_map(|option| match option {
                            CanonValue::Number(number) => Some(number),
                            _ => None,
                        })
                        .collect()
                });
                Some(sketch.build(options))
            }
            TypeKind::String(sketch) => {
                let options = enumeration.map(|options| {
                    options
                        .into_iter()
                        .filter_map(|option| match option {
                            CanonValue::String(value) => Some(value),
                            _ => None,
                        })
                        .collect()
                });
                Some(sketch.build(options))
            }
            TypeKind::Null => Some(wrap_enum(null_validator(), enumeration)),
            TypeKind::Boolean => Some(wrap_enum(boolean_validator(), enumeration)),
            TypeKind::Array(sketch) => Some(wrap_enum(sketch.build(), enumeration)),
            TypeKind::Object(sketch) => Some(wrap_enum(sketch.build(), enumeration)),
            TypeKind::Multiple(table) => Some(wrap_enum(table.build(), enumeration)),
        }
    }
}

fn wrap_enum(base: ValidatorRef, enumeration: Option<Vec<CanonValue>>) -> ValidatorRef {
    match enumeration {
        Some(options) => all_of(vec![base, Arc::new(EnumValidator::new(options))]),
        None => base,
    }
}

impl TypeBuilder {
    fn number_mut(&mut self) -> Option<&mut NumberSketch> {
        match &mut self.kind {
            TypeKind::Number(sketch) => Some(sketch),
            TypeKind::Multiple(table) => table.number.as_mut(),
            _ => None,
        }
    }

    fn string_mut(&mut self) -> Option<&mut StringSketch> {
        match &mut self.kind {
            TypeKind::String(sketch) => Some(sketch),
            TypeKind::Multiple(table) => table.string.as_mut(),
            _ => None,
        }
    }

    fn array_mut(&mut self) -> Option<&mut ArraySketch> {
        match &mut self.kind {
            TypeKind::Array(sketch) => Some(sketch),
            TypeKind::Multiple(table) => table.array.as_mut(),
            _ => None,
        }
    }

    fn object_mut(&mut self) -> Option<&mut ObjectSketch> {
        match &mut self.kind {
            TypeKind::Object(sketch) => Some(sketch),
            TypeKind::Multiple(table) => table.object.as_mut(),
            _ => None,
        }
    }
}

fn object_policy(policy: &Policy) -> AdditionalProperties {
    match policy {
        Policy::Allow => AdditionalProperties::Allow,
        Policy::Forbid => AdditionalProperties::Forbid,
        Policy::Schema(child) => AdditionalProperties::Schema(child.validator()),
    }
}

fn items_policy(policy: &Policy) -> AdditionalItems {
    match policy {
        Policy::Allow => AdditionalItems::Allow,
        Policy::Forbid => AdditionalItems::Forbid,
        Policy::Schema(child) => AdditionalItems::Schema(child.validator()),
    }
}
