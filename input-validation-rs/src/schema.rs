//! Schema-based validation
//!
//! A schema is an ordered list of field declarations. Validating a JSON
//! object against it looks each field up by name or alias, runs the field's
//! normalizers, then checks type, range and length. The result is a new
//! object holding only the declared fields under their canonical names.
//! Fields are checked in declaration order and the first failure is
//! returned.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::errors::{ValidationError, ValidationResult};
use crate::normalize::{NormalizeContext, Normalizer};

/// Schema for validating JSON objects
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Field definitions, in checking order
    fields: Vec<(String, FieldSchema)>,
    /// Whether to allow fields not declared in the schema
    allow_additional_fields: bool,
}

/// Schema for a single field
#[derive(Debug, Clone)]
pub struct FieldSchema {
    field_type: FieldType,
    required: bool,
    /// Alternative keys, tried in order after the canonical name
    aliases: Vec<String>,
    normalizers: Vec<Normalizer>,
    /// Value used when the field is absent or null
    default: Option<Value>,
    minimum: Option<f64>,
    maximum: Option<f64>,
    /// Character count for strings, item count for arrays
    min_length: Option<usize>,
    max_length: Option<usize>,
}

/// Supported field types
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    /// Whole number (i64)
    Integer,
    Number,
    /// ISO `YYYY-MM-DD`
    Date,
    /// `{"amount": number, "currency": "XXX"}`
    Money,
    /// Array of strings; duplicates and blanks removed
    StringSet,
    /// Array of strings, order kept
    StringList,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Normalize and check `value`, returning the canonical object
    pub fn validate(&self, value: &Value, ctx: &NormalizeContext) -> ValidationResult<Map<String, Value>> {
        let obj = match value {
            Value::Object(obj) => obj,
            other => {
                return Err(ValidationError::invalid_type(
                    "$",
                    format!("expected object, got {}", type_name(other)),
                ))
            }
        };

        if !self.allow_additional_fields {
            if let Some(unknown) = obj.keys().find(|key| !self.knows_key(key)) {
                return Err(ValidationError::invalid_type(
                    unknown.as_str(),
                    "unknown field is not allowed",
                ));
            }
        }

        let mut normalized = Map::new();
        for (name, field) in &self.fields {
            let raw = field.lookup(name, obj);
            let value = field.check(raw, name, ctx)?;
            normalized.insert(name.clone(), value);
        }

        Ok(normalized)
    }

    fn knows_key(&self, key: &str) -> bool {
        self.fields
            .iter()
            .any(|(name, field)| name == key || field.aliases.iter().any(|alias| alias == key))
    }
}

impl FieldSchema {
    pub fn string() -> FieldSchemaBuilder {
        FieldSchemaBuilder::new(FieldType::String)
    }

    pub fn integer() -> FieldSchemaBuilder {
        FieldSchemaBuilder::new(FieldType::Integer)
    }

    pub fn number() -> FieldSchemaBuilder {
        FieldSchemaBuilder::new(FieldType::Number)
    }

    pub fn date() -> FieldSchemaBuilder {
        FieldSchemaBuilder::new(FieldType::Date)
    }

    pub fn money() -> FieldSchemaBuilder {
        FieldSchemaBuilder::new(FieldType::Money)
    }

    pub fn string_set() -> FieldSchemaBuilder {
        FieldSchemaBuilder::new(FieldType::StringSet)
    }

    pub fn string_list() -> FieldSchemaBuilder {
        FieldSchemaBuilder::new(FieldType::StringList)
    }

    /// First non-null value under the canonical name or an alias
    fn lookup(&self, name: &str, obj: &Map<String, Value>) -> Value {
        std::iter::once(name)
            .chain(self.aliases.iter().map(String::as_str))
            .filter_map(|key| obj.get(key))
            .find(|value| !value.is_null())
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Normalize, default and check a single value
    pub fn check(&self, raw: Value, field: &str, ctx: &NormalizeContext) -> ValidationResult<Value> {
        let mut value = raw;
        for normalizer in &self.normalizers {
            if value.is_null() {
                break;
            }
            value = normalizer.apply(value, ctx, field)?;
        }

        if value.is_null() {
            return match (&self.default, self.required) {
                (Some(default), _) => Ok(default.clone()),
                (None, true) => Err(ValidationError::missing(field)),
                (None, false) => Ok(Value::Null),
            };
        }

        match (&self.field_type, value) {
            (FieldType::String, Value::String(s)) => {
                self.check_length(field, s.chars().count())?;
                Ok(Value::String(s))
            }
            (FieldType::Integer, Value::Number(n)) => {
                let num = n.as_f64().unwrap_or(f64::NAN);
                if num.fract() != 0.0 || !num.is_finite() {
                    return Err(ValidationError::invalid_type(
                        field,
                        format!("expected whole number, got {}", n),
                    ));
                }
                self.check_range(field, num)?;
                Ok(Value::from(num as i64))
            }
            (FieldType::Number, Value::Number(n)) => {
                let num = n.as_f64().unwrap_or(f64::NAN);
                self.check_range(field, num)?;
                Ok(Value::Number(n))
            }
            (FieldType::Date, Value::String(s)) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map(|date| Value::String(date.to_string()))
                .map_err(|_| ValidationError::invalid_format(field, format!("'{}' is not a YYYY-MM-DD date", s))),
            (FieldType::Money, Value::Object(obj)) => {
                let amount = obj
                    .get("amount")
                    .and_then(Value::as_f64)
                    .ok_or_else(|| ValidationError::invalid_type(format!("{}.amount", field), "expected number"))?;
                let currency = obj
                    .get("currency")
                    .and_then(Value::as_str)
                    .filter(|c| c.len() == 3 && c.chars().all(|ch| ch.is_ascii_uppercase()))
                    .ok_or_else(|| {
                        ValidationError::invalid_format(format!("{}.currency", field), "expected ISO 4217 code")
                    })?;
                self.check_range(field, amount)?;
                Ok(serde_json::json!({ "amount": amount, "currency": currency }))
            }
            (FieldType::StringSet, Value::Array(items)) => {
                let mut seen: Vec<String> = Vec::with_capacity(items.len());
                for (idx, item) in items.into_iter().enumerate() {
                    let s = expect_string(item, field, idx)?;
                    if !s.trim().is_empty() && !seen.contains(&s) {
                        seen.push(s);
                    }
                }
                seen.sort();
                self.check_length(field, seen.len())?;
                Ok(Value::from(seen))
            }
            (FieldType::StringList, Value::Array(items)) => {
                let list = items
                    .into_iter()
                    .enumerate()
                    .map(|(idx, item)| expect_string(item, field, idx))
                    .collect::<ValidationResult<Vec<_>>>()?;
                self.check_length(field, list.len())?;
                Ok(Value::from(list))
            }
            (expected, other) => Err(ValidationError::invalid_type(
                field,
                format!("expected {:?}, got {}", expected, type_name(&other)),
            )),
        }
    }

    fn check_range(&self, field: &str, num: f64) -> ValidationResult<()> {
        if let Some(min) = self.minimum {
            if num < min {
                return Err(ValidationError::out_of_range(
                    field,
                    format!("value {} is less than minimum {}", num, min),
                ));
            }
        }

        if let Some(max) = self.maximum {
            if num > max {
                return Err(ValidationError::out_of_range(
                    field,
                    format!("value {} exceeds maximum {}", num, max),
                ));
            }
        }

        Ok(())
    }

    fn check_length(&self, field: &str, len: usize) -> ValidationResult<()> {
        if let Some(min_len) = self.min_length {
            if len < min_len {
                return Err(ValidationError::new(
                    field,
                    crate::errors::ValidationReason::TooShort(format!("length {} is less than minimum {}", len, min_len)),
                ));
            }
        }

        if let Some(max_len) = self.max_length {
            if len > max_len {
                return Err(ValidationError::new(
                    field,
                    crate::errors::ValidationReason::TooLong(format!("length {} exceeds maximum {}", len, max_len)),
                ));
            }
        }

        Ok(())
    }
}

fn expect_string(item: Value, field: &str, idx: usize) -> ValidationResult<String> {
    match item {
        Value::String(s) => Ok(s),
        other => Err(ValidationError::invalid_type(
            format!("{}[{}]", field, idx),
            format!("expected string, got {}", type_name(&other)),
        )),
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Builder for field schemas
#[derive(Debug)]
pub struct FieldSchemaBuilder {
    schema: FieldSchema,
}

impl FieldSchemaBuilder {
    fn new(field_type: FieldType) -> Self {
        Self {
            schema: FieldSchema {
                field_type,
                required: false,
                aliases: Vec::new(),
                normalizers: Vec::new(),
                default: None,
                minimum: None,
                maximum: None,
                min_length: None,
                max_length: None,
            },
        }
    }

    /// Mark field as required
    pub fn required(mut self) -> Self {
        self.schema.required = true;
        self
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.schema.aliases.extend(aliases.iter().map(|alias| alias.to_string()));
        self
    }

    /// Append a normalizer; they run in the order added
    pub fn normalize(mut self, normalizer: Normalizer) -> Self {
        self.schema.normalizers.push(normalizer);
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.schema.default = Some(value);
        self
    }

    pub fn with_minimum(mut self, min: f64) -> Self {
        self.schema.minimum = Some(min);
        self
    }

    pub fn with_maximum(mut self, max: f64) -> Self {
        self.schema.maximum = Some(max);
        self
    }

    /// Inclusive numeric range
    pub fn range(self, min: f64, max: f64) -> Self {
        self.with_minimum(min).with_maximum(max)
    }

    pub fn with_min_length(mut self, min: usize) -> Self {
        self.schema.min_length = Some(min);
        self
    }

    pub fn with_max_length(mut self, max: usize) -> Self {
        self.schema.max_length = Some(max);
        self
    }

    pub fn build(self) -> FieldSchema {
        self.schema
    }
}

/// Schema builder for constructing schemas fluently
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required field
    pub fn required_field(mut self, name: &str, field_schema: FieldSchema) -> Self {
        let mut field = field_schema;
        field.required = true;
        self.schema.fields.push((name.to_string(), field));
        self
    }

    /// Add an optional field
    pub fn optional_field(mut self, name: &str, field_schema: FieldSchema) -> Self {
        let mut field = field_schema;
        field.required = false;
        self.schema.fields.push((name.to_string(), field));
        self
    }

    /// Allow fields not declared in the schema
    pub fn allow_additional_fields(mut self, allow: bool) -> Self {
        self.schema.allow_additional_fields = allow;
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationReason;
    use serde_json::json;

    fn ctx() -> NormalizeContext {
        NormalizeContext::new(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap())
    }

    fn person_schema() -> Schema {
        Schema::builder()
            .required_field(
                "name",
                FieldSchema::string()
                    .with_aliases(&["full_name"])
                    .normalize(Normalizer::Trim)
                    .normalize(Normalizer::NullIfBlank)
                    .with_min_length(2)
                    .build(),
            )
            .optional_field(
                "age",
                FieldSchema::integer()
                    .normalize(Normalizer::CoerceNumeric)
                    .with_minimum(0.0)
                    .with_maximum(120.0)
                    .build(),
            )
            .optional_field(
                "tags",
                FieldSchema::string_set()
                    .normalize(Normalizer::SplitList)
                    .normalize(Normalizer::Lowercase)
                    .with_default(json!([]))
                    .build(),
            )
            .allow_additional_fields(true)
            .build()
    }

    #[test]
    fn test_basic_schema_validation() {
        let schema = person_schema();

        let valid = schema
            .validate(&json!({"full_name": "  Ada ", "age": "36", "tags": "Maths, Engines", "extra": 1}), &ctx())
            .unwrap();
        assert_eq!(json!(valid), json!({"name": "Ada", "age": 36, "tags": ["engines", "maths"]}));

        let err = schema.validate(&json!({"age": 30}), &ctx()).unwrap_err();
        assert_eq!(err, ValidationError::missing("name"));

        let err = schema.validate(&json!({"name": "Ada", "age": "thirty"}), &ctx()).unwrap_err();
        assert_eq!(err.field, "age");
        assert!(matches!(err.reason, ValidationReason::InvalidType(_)));

        let err = schema.validate(&json!({"name": "Ada", "age": 200}), &ctx()).unwrap_err();
        assert!(matches!(err.reason, ValidationReason::OutOfRange(_)));

        let err = schema.validate(&json!({"name": "Ada", "age": 36.5}), &ctx()).unwrap_err();
        assert!(matches!(err.reason, ValidationReason::InvalidType(_)));
    }

    #[test]
    fn test_blank_required_field_is_missing() {
        let err = person_schema().validate(&json!({"name": "n/a"}), &ctx()).unwrap_err();
        assert_eq!(err, ValidationError::missing("name"));
    }

    #[test]
    fn test_first_failure_in_declaration_order() {
        let err = person_schema()
            .validate(&json!({"age": -1, "tags": [1]}), &ctx())
            .unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn test_additional_fields_rejected_when_closed() {
        let schema = Schema::builder()
            .required_field("name", FieldSchema::string().build())
            .build();
        let err = schema.validate(&json!({"name": "x", "other": 1}), &ctx()).unwrap_err();
        assert_eq!(err.field, "other");
    }

    #[test]
    fn test_non_object_input() {
        let err = person_schema().validate(&json!([1, 2]), &ctx()).unwrap_err();
        assert_eq!(err.field, "$");
    }

    #[test]
    fn test_money_and_date_fields() {
        let schema = Schema::builder()
            .optional_field(
                "budget",
                FieldSchema::money()
                    .normalize(Normalizer::StripCurrency {
                        default_currency: "EUR".to_string(),
                    })
                    .with_maximum(20_000.0)
                    .build(),
            )
            .optional_field("when", FieldSchema::date().normalize(Normalizer::RelativeDate).build())
            .build();

        let valid = schema.validate(&json!({"budget": "€800", "when": "May"}), &ctx()).unwrap();
        assert_eq!(valid["budget"], json!({"amount": 800.0, "currency": "EUR"}));
        assert_eq!(valid["when"], json!("2027-05-01"));

        let err = schema.validate(&json!({"budget": 25_000}), &ctx()).unwrap_err();
        assert_eq!(err.field, "budget");
        assert!(matches!(err.reason, ValidationReason::OutOfRange(_)));
    }
}
