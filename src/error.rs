//! Error types for schema compilation and instance validation.
use crate::resolver::SchemaResolverError;
use std::error;
use std::fmt::{self, Formatter};

/// Codes reported when an instance violates a schema or is malformed.
///
/// A single validation reports at most one code: the first failure of a leaf
/// validator, of a combinator after all alternatives are exhausted, or of a
/// cardinality constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The value is not `null`.
    NotNull,
    /// The value is not a boolean.
    NotBoolean,
    /// The value is not a string.
    NotString,
    /// The value is not a number.
    NotNumber,
    /// The value is a number, but not an integer.
    NotIntegerNumber,
    /// The value is not an array.
    NotArray,
    /// The value is not an object.
    NotObject,
    /// The value's type is not in the schema's `type` list.
    TypeNotAllowed,
    /// The value differs from the expected one (`enum` or a fixed boolean).
    UnexpectedValue,
    /// The array has fewer items than `minItems`.
    ArrayTooShort,
    /// The array has more items than `maxItems` allows, or items beyond the
    /// tuple when `additionalItems` is `false`.
    ArrayTooLong,
    /// The array has duplicate elements while `uniqueItems` is requested.
    ArrayNotUnique,
    /// The string is shorter than `minLength`.
    StringTooShort,
    /// The string is longer than `maxLength`.
    StringTooLong,
    /// The string does not match the `pattern` regex.
    StringDoesNotMatchPattern,
    /// The number is below `minimum`.
    NumberTooSmall,
    /// The number is above `maximum`.
    NumberTooLarge,
    /// The number is not a multiple of `multipleOf`.
    NumberNotMultiple,
    /// A key listed in `required` is missing and has no default.
    MissingRequiredKey,
    /// A key outside `properties` while `additionalProperties` is `false`.
    AdditionalPropertyNotAllowed,
    /// The object has more keys than `maxProperties`.
    TooManyProperties,
    /// The object has fewer keys than `minProperties`.
    TooFewProperties,
    /// No `anyOf` alternative accepted the value.
    AnyOfNoMatch,
    /// The number of `oneOf` alternatives that accepted the value is not one.
    OneOfNotOne,
    /// The schema under `not` accepted the value.
    NotNotRejected,
    /// The input is not well-formed JSON.
    Syntax,
    /// The validator tree was driven outside its contract.
    Internal,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let message = match self {
            ErrorCode::NotNull => "not a null",
            ErrorCode::NotBoolean => "not a boolean",
            ErrorCode::NotString => "not a string",
            ErrorCode::NotNumber => "not a number",
            ErrorCode::NotIntegerNumber => "not an integer number",
            ErrorCode::NotArray => "not an array",
            ErrorCode::NotObject => "not an object",
            ErrorCode::TypeNotAllowed => "type not allowed",
            ErrorCode::UnexpectedValue => "unexpected value",
            ErrorCode::ArrayTooShort => "array is too short",
            ErrorCode::ArrayTooLong => "array is too long",
            ErrorCode::ArrayNotUnique => "array has duplicate elements",
            ErrorCode::StringTooShort => "string is too short",
            ErrorCode::StringTooLong => "string is too long",
            ErrorCode::StringDoesNotMatchPattern => "string does not match the pattern",
            ErrorCode::NumberTooSmall => "number is too small",
            ErrorCode::NumberTooLarge => "number is too large",
            ErrorCode::NumberNotMultiple => "number is not a multiple of the divisor",
            ErrorCode::MissingRequiredKey => "a required key is missing",
            ErrorCode::AdditionalPropertyNotAllowed => "additional property is not allowed",
            ErrorCode::TooManyProperties => "object has too many properties",
            ErrorCode::TooFewProperties => "object does not have enough properties",
            ErrorCode::AnyOfNoMatch => "not valid under any of the given schemas",
            ErrorCode::OneOfNotOne => "not valid under exactly one of the given schemas",
            ErrorCode::NotNotRejected => "valid under the schema it should not match",
            ErrorCode::Syntax => "invalid JSON",
            ErrorCode::Internal => "internal error",
        };
        f.write_str(message)
    }
}

/// An error that can occur during validation of an instance document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationError {
    code: ErrorCode,
    offset: usize,
}

impl ValidationError {
    pub(crate) const fn new(code: ErrorCode, offset: usize) -> ValidationError {
        ValidationError { code, offset }
    }

    /// The code of the first violation encountered.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Byte offset of the offending token in the input document.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.code, self.offset)
    }
}

impl error::Error for ValidationError {}

/// An error that can occur during schema compilation.
#[derive(Debug)]
pub enum SchemaError {
    /// The schema source text is not valid JSON.
    Json(serde_json::Error),
    /// A (sub)schema is not a JSON object.
    NotAnObject,
    /// A keyword carries a value it cannot work with.
    Malformed {
        /// The offending keyword.
        keyword: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// `type` names a type unknown to the draft.
    UnknownType(String),
    /// `$ref` or `id` cannot be resolved to an absolute URI.
    InvalidReference(String),
    /// `$ref` points to a URI no schema is registered under.
    UnresolvedRef(String),
    /// Two subschemas resolve to the same absolute URI.
    DuplicateFragment(String),
    /// The external resolver failed to load a referenced document.
    Resolver {
        /// URL of the document that failed to load.
        url: String,
        /// The resolver's failure.
        source: SchemaResolverError,
    },
}

impl SchemaError {
    pub(crate) fn malformed(keyword: &'static str, reason: impl Into<String>) -> SchemaError {
        SchemaError::Malformed {
            keyword,
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_type(name: impl Into<String>) -> SchemaError {
        SchemaError::UnknownType(name.into())
    }

    pub(crate) fn invalid_reference(reference: impl Into<String>) -> SchemaError {
        SchemaError::InvalidReference(reference.into())
    }

    pub(crate) fn unresolved_ref(uri: impl Into<String>) -> SchemaError {
        SchemaError::UnresolvedRef(uri.into())
    }

    pub(crate) fn duplicate_fragment(uri: impl Into<String>) -> SchemaError {
        SchemaError::DuplicateFragment(uri.into())
    }

    pub(crate) fn resolver(url: String, source: SchemaResolverError) -> SchemaError {
        SchemaError::Resolver { url, source }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Json(err) => write!(f, "schema is not valid JSON: {}", err),
            SchemaError::NotAnObject => f.write_str("schema must be a JSON object"),
            SchemaError::Malformed { keyword, reason } => {
                write!(f, "invalid '{}': {}", keyword, reason)
            }
            SchemaError::UnknownType(name) => write!(f, "unknown type '{}'", name),
            SchemaError::InvalidReference(reference) => {
                write!(f, "invalid reference: {}", reference)
            }
            SchemaError::UnresolvedRef(uri) => write!(f, "unresolved reference: {}", uri),
            SchemaError::DuplicateFragment(uri) => {
                write!(f, "the fragment {} is registered twice", uri)
            }
            SchemaError::Resolver { url, source } => {
                write!(f, "failed to resolve {}: {}", url, source)
            }
        }
    }
}

impl error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            SchemaError::Json(err) => Some(err),
            SchemaError::Resolver { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::Json(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let err = ValidationError::new(ErrorCode::NotBoolean, 7);
        assert_eq!(err.to_string(), "not a boolean at offset 7");
    }

    #[test]
    fn schema_error_display() {
        let err = SchemaError::malformed("minLength", "must be a non-negative integer");
        assert_eq!(
            err.to_string(),
            "invalid 'minLength': must be a non-negative integer"
        );
        let err = SchemaError::unresolved_ref("json-schema:///#/definitions/missing");
        assert_eq!(
            err.to_string(),
            "unresolved reference: json-schema:///#/definitions/missing"
        );
    }
}
