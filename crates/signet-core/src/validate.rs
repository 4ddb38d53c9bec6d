//! Coercion and validation of raw values against composite schemas.

use std::borrow::Cow;

use indexmap::IndexMap;
use serde_json::{Number, Value};

use crate::error::{ErrorItem, ValidationError};
use crate::location::Location;
use crate::schema::{CompositeSchema, Constraints, FieldDefault, FieldSpec, FieldType};
use crate::value::{BoundValue, RawData, RawValue};

/// How field keys are matched against raw data keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyStyle {
    /// Exact match on the lookup key.
    Exact,
    /// Case-insensitive; a field name's underscores match hyphens.
    Header,
}

impl KeyStyle {
    pub(crate) fn for_location(location: Location) -> Self {
        match location {
            Location::Header => Self::Header,
            _ => Self::Exact,
        }
    }

    fn key<'f>(self, field: &'f FieldSpec) -> Cow<'f, str> {
        match self {
            Self::Exact => Cow::Borrowed(field.lookup_key()),
            Self::Header => field.key_at(Location::Header),
        }
    }
}

fn lookup<'a>(data: &'a RawData, key: &str, style: KeyStyle) -> Option<&'a RawValue> {
    data.get(key).or_else(|| match style {
        KeyStyle::Exact => None,
        KeyStyle::Header => data
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
            .map(|(_, value)| value),
    })
}

/// Collects failures while walking a schema.
#[derive(Debug, Default)]
pub(crate) struct Validation {
    loc: Vec<String>,
    errors: Vec<ErrorItem>,
}

impl Validation {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub(crate) fn into_errors(self) -> Vec<ErrorItem> {
        self.errors
    }

    /// Records a failure against the whole payload.
    pub(crate) fn root_error(&mut self, kind: &str, msg: impl Into<String>) {
        self.errors
            .push(ErrorItem::new(vec!["__root__".to_string()], kind, msg));
    }

    fn error(&mut self, kind: &str, msg: impl Into<String>) {
        self.errors.push(ErrorItem::new(self.loc.clone(), kind, msg));
    }

    fn fail(&mut self, kind: &str, msg: &str) -> Option<BoundValue> {
        self.error(kind, msg);
        None
    }

    /// Validates every field of `schema`, returning values keyed by field
    /// name. Failed fields are left out and recorded.
    pub(crate) fn fields(
        &mut self,
        schema: &CompositeSchema,
        data: &RawData,
        style: KeyStyle,
    ) -> IndexMap<String, BoundValue> {
        let mut out = IndexMap::with_capacity(schema.fields().len());
        for field in schema.fields() {
            let key = style.key(field);
            let raw = lookup(data, &key, style);
            self.loc.push(key.into_owned());
            match (raw, field.default()) {
                (Some(raw), _) => {
                    if let Some(value) = self.field_value(field, raw) {
                        out.insert(field.name().to_string(), value);
                    }
                }
                (None, FieldDefault::Value(default)) => {
                    out.insert(field.name().to_string(), BoundValue::Json(default.clone()));
                }
                (None, FieldDefault::Required) => self.error("value_error.missing", "field required"),
            }
            self.loc.pop();
        }
        out
    }

    fn field_value(&mut self, field: &FieldSpec, raw: &RawValue) -> Option<BoundValue> {
        let value = self.coerce(field.ty(), raw)?;
        self.check_constraints(field.constraint_set(), &value)
            .then_some(value)
    }

    fn coerce(&mut self, ty: &FieldType, raw: &RawValue) -> Option<BoundValue> {
        match ty {
            FieldType::Any => Some(BoundValue::from_raw(raw)),
            FieldType::File => match raw {
                RawValue::File(file) => Some(BoundValue::File(file.clone())),
                _ => self.fail("type_error.file", "file required"),
            },
            FieldType::Optional(inner) => match raw {
                RawValue::Json(Value::Null) => Some(BoundValue::Json(Value::Null)),
                other => self.coerce(inner, other),
            },
            FieldType::Array(inner) => self.coerce_array(inner, raw),
            FieldType::Object(schema) => match raw {
                RawValue::Json(Value::Object(map)) => {
                    let data: RawData = map
                        .iter()
                        .map(|(k, v)| (k.clone(), RawValue::Json(v.clone())))
                        .collect();
                    let before = self.error_count();
                    let fields = self.fields(schema, &data, KeyStyle::Exact);
                    (self.error_count() == before).then(|| BoundValue::object(fields))
                }
                _ => self.fail("type_error.dict", "value is not a valid dict"),
            },
            FieldType::String | FieldType::Integer | FieldType::Number | FieldType::Boolean => {
                let coerced = match raw {
                    RawValue::Json(value) => coerce_scalar(ty, value),
                    _ => None,
                };
                match coerced {
                    Some(value) => Some(BoundValue::Json(value)),
                    None => {
                        let (kind, msg) = scalar_error(ty);
                        self.fail(kind, msg)
                    }
                }
            }
        }
    }

    fn coerce_array(&mut self, inner: &FieldType, raw: &RawValue) -> Option<BoundValue> {
        let items: Vec<RawValue> = match raw {
            RawValue::Many(items) => items.clone(),
            RawValue::Json(Value::Array(items)) => items.iter().cloned().map(RawValue::Json).collect(),
            single => vec![single.clone()],
        };

        let before = self.error_count();
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            self.loc.push(index.to_string());
            if let Some(value) = self.coerce(inner, item) {
                out.push(value);
            }
            self.loc.pop();
        }
        (self.error_count() == before).then(|| BoundValue::list(out))
    }

    fn check_constraints(&mut self, constraints: &Constraints, value: &BoundValue) -> bool {
        if constraints.is_empty() {
            return true;
        }
        let before = self.error_count();
        match value {
            BoundValue::Json(Value::Number(n)) => {
                if let Some(x) = n.as_f64() {
                    self.check_number(constraints, x);
                }
            }
            BoundValue::Json(Value::String(s)) => self.check_string(constraints, s),
            BoundValue::Json(Value::Array(items)) => self.check_items(constraints, items.len()),
            BoundValue::List(items) => self.check_items(constraints, items.len()),
            _ => {}
        }
        self.error_count() == before
    }

    fn check_number(&mut self, c: &Constraints, x: f64) {
        if let Some(ge) = c.ge.filter(|ge| x < *ge) {
            self.error(
                "value_error.number.not_ge",
                format!("ensure this value is greater than or equal to {ge}"),
            );
        }
        if let Some(gt) = c.gt.filter(|gt| x <= *gt) {
            self.error("value_error.number.not_gt", format!("ensure this value is greater than {gt}"));
        }
        if let Some(le) = c.le.filter(|le| x > *le) {
            self.error(
                "value_error.number.not_le",
                format!("ensure this value is less than or equal to {le}"),
            );
        }
        if let Some(lt) = c.lt.filter(|lt| x >= *lt) {
            self.error("value_error.number.not_lt", format!("ensure this value is less than {lt}"));
        }
    }

    fn check_string(&mut self, c: &Constraints, s: &str) {
        let len = s.chars().count();
        if let Some(min) = c.min_length.filter(|min| len < *min) {
            self.error(
                "value_error.any_str.min_length",
                format!("ensure this value has at least {min} characters"),
            );
        }
        if let Some(max) = c.max_length.filter(|max| len > *max) {
            self.error(
                "value_error.any_str.max_length",
                format!("ensure this value has at most {max} characters"),
            );
        }
        if let Some(pattern) = &c.pattern {
            if !pattern.find(s).is_some_and(|m| m.start() == 0) {
                self.error(
                    "value_error.str.regex",
                    format!("string does not match regex \"{}\"", pattern.as_str()),
                );
            }
        }
    }

    fn check_items(&mut self, c: &Constraints, len: usize) {
        if let Some(min) = c.min_length.filter(|min| len < *min) {
            self.error(
                "value_error.list.min_items",
                format!("ensure this value has at least {min} items"),
            );
        }
        if let Some(max) = c.max_length.filter(|max| len > *max) {
            self.error(
                "value_error.list.max_items",
                format!("ensure this value has at most {max} items"),
            );
        }
    }
}

fn scalar_error(ty: &FieldType) -> (&'static str, &'static str) {
    match ty {
        FieldType::Integer => ("type_error.integer", "value is not a valid integer"),
        FieldType::Number => ("type_error.float", "value is not a valid float"),
        FieldType::Boolean => ("type_error.bool", "value could not be parsed to a boolean"),
        _ => ("type_error.str", "str type expected"),
    }
}

fn coerce_scalar(ty: &FieldType, value: &Value) -> Option<Value> {
    match ty {
        FieldType::Integer => as_integer(value),
        FieldType::Number => as_number(value),
        FieldType::Boolean => as_bool(value).map(Value::Bool),
        FieldType::String => as_string(value).map(Value::String),
        _ => Some(value.clone()),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn as_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(Value::Number(n.clone())),
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .filter(|f| *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| Value::from(f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .map(Value::from)
                .or_else(|_| s.parse::<u64>().map(Value::from))
                .ok()
        }
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<Value> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Number::from_f64(f).map(Value::Number)
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "t" | "yes" | "y" | "on" => Some(true),
            "0" | "false" | "f" | "no" | "n" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl CompositeSchema {
    /// Validates a flat map against this schema.
    ///
    /// Returns the validated object keyed by field name.
    ///
    /// # Errors
    ///
    /// Every failing field, aggregated.
    pub fn validate(&self, data: &RawData) -> Result<BoundValue, ValidationError> {
        let mut validation = Validation::new();
        let fields = validation.fields(self, data, KeyStyle::Exact);
        if validation.error_count() > 0 {
            return Err(ValidationError::new(validation.into_errors()));
        }
        Ok(BoundValue::object(fields))
    }
}
