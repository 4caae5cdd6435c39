use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value as JsonValue;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

use crate::errors::{ErrorKind, FilterError, FilterResult};

/// The kind tag of a [Literal].
///
/// Every literal carries exactly one of these tags; operators that restrict
/// their operands (comparisons, $in homogeneity) check it at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueType {
    Null,
    Boolean,
    Number,
    Text,
    Date,
    Time,
    Timestamp,
    Uuid,
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::Null => write!(f, "null"),
            ValueType::Boolean => write!(f, "boolean"),
            ValueType::Number => write!(f, "number"),
            ValueType::Text => write!(f, "text"),
            ValueType::Date => write!(f, "date"),
            ValueType::Time => write!(f, "time"),
            ValueType::Timestamp => write!(f, "timestamp"),
            ValueType::Uuid => write!(f, "uuid"),
        }
    }
}

/// A numeric literal preserving the integral vs. fractional distinction of
/// its JSON source text.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    /// Builds a `Number` from a JSON number token, keeping integral tokens
    /// integral.
    pub(crate) fn from_json(number: &serde_json::Number) -> Option<Number> {
        if let Some(i) = number.as_i64() {
            Some(Number::Integer(i))
        } else {
            number.as_f64().map(Number::Float)
        }
    }

    /// Returns the numeric value widened to `f64`.
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::Float(f) => *f,
        }
    }

    /// Checks whether this number was written as an integral token.
    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Float(n) => write!(f, "{}", n),
        }
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Integer(value as i64)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Integer(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

/// Describes the JSON kind of a value, for error messages.
pub(crate) fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// An immutable, kind-tagged scalar value used as an operator's comparand.
///
/// A `Literal` is produced from a raw JSON scalar by [Literal::classify].
/// JSON strings are further refined by probing a fixed sequence of grammars
/// (timestamp, date, time, UUID) before falling back to plain text, so a
/// filter author never has to annotate value types explicitly.
///
/// Accessing a representation inconsistent with the tag fails with
/// [ErrorKind::UnsupportedAccessor]; that failure class signals a programming
/// error in the consumer, not bad input.
///
/// # Examples
///
/// ```rust,ignore
/// use strainer::Literal;
///
/// let literal = Literal::classify(&serde_json::json!("2024-05-01"))?;
/// assert_eq!(literal.value_type(), strainer::ValueType::Date);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Literal {
    /// JSON null.
    Null,
    /// JSON true/false.
    Boolean(bool),
    /// JSON number, integral or fractional.
    Number(Number),
    /// A string that matched none of the probed grammars.
    Text(String),
    /// A string matching the `YYYY-MM-DD` date grammar.
    Date(NaiveDate),
    /// A string matching the `HH:MM:SS[.fff]` time grammar.
    Time(NaiveTime),
    /// A string matching the ISO 8601 date-time grammar, with or without a
    /// UTC offset; offset forms are normalized to UTC.
    Timestamp(NaiveDateTime),
    /// A string matching the hyphenated 8-4-4-4-12 hex UUID grammar.
    Uuid(Uuid),
}

impl Literal {
    /// Classifies a raw JSON scalar into a typed literal.
    ///
    /// # Arguments
    ///
    /// * `value` - The JSON value to classify; must be a scalar
    ///
    /// # Returns
    ///
    /// The classified literal, or a `TypeMismatch` error when the value is a
    /// JSON array or object.
    pub fn classify(value: &JsonValue) -> FilterResult<Literal> {
        match value {
            JsonValue::Null => Ok(Literal::Null),
            JsonValue::Bool(b) => Ok(Literal::Boolean(*b)),
            JsonValue::Number(n) => Number::from_json(n).map(Literal::Number).ok_or_else(|| {
                log::error!("Cannot represent the JSON number {} as a literal", n);
                FilterError::new(
                    &format!("Cannot represent the JSON number {} as a literal", n),
                    ErrorKind::TypeMismatch,
                )
            }),
            JsonValue::String(text) => Ok(Literal::classify_text(text)),
            other => {
                log::error!("A literal must be a JSON scalar, not {}", json_kind(other));
                Err(FilterError::new(
                    &format!("A literal must be a JSON scalar, not {}", json_kind(other)),
                    ErrorKind::TypeMismatch,
                ))
            }
        }
    }

    /// Refines a JSON string by probing grammars in order of specificity.
    ///
    /// The timestamp grammar is probed before the date grammar: a full
    /// date-time string would otherwise satisfy the looser date prefix.
    fn classify_text(text: &str) -> Literal {
        if let Some(timestamp) = parse_timestamp(text) {
            Literal::Timestamp(timestamp)
        } else if let Some(date) = parse_date(text) {
            Literal::Date(date)
        } else if let Some(time) = parse_time(text) {
            Literal::Time(time)
        } else if let Some(uuid) = parse_uuid(text) {
            Literal::Uuid(uuid)
        } else {
            Literal::Text(text.to_string())
        }
    }

    /// Gets the kind tag of this literal.
    pub fn value_type(&self) -> ValueType {
        match self {
            Literal::Null => ValueType::Null,
            Literal::Boolean(_) => ValueType::Boolean,
            Literal::Number(_) => ValueType::Number,
            Literal::Text(_) => ValueType::Text,
            Literal::Date(_) => ValueType::Date,
            Literal::Time(_) => ValueType::Time,
            Literal::Timestamp(_) => ValueType::Timestamp,
            Literal::Uuid(_) => ValueType::Uuid,
        }
    }

    /// Checks whether this literal is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    /// Gets the boolean this contains.
    ///
    /// # Returns
    ///
    /// The boolean value, or an `UnsupportedAccessor` error when this literal
    /// is not tagged as a boolean.
    pub fn as_boolean(&self) -> FilterResult<bool> {
        match self {
            Literal::Boolean(b) => Ok(*b),
            other => Err(unsupported_accessor("boolean", other)),
        }
    }

    /// Gets the number this contains.
    pub fn as_number(&self) -> FilterResult<Number> {
        match self {
            Literal::Number(n) => Ok(*n),
            other => Err(unsupported_accessor("number", other)),
        }
    }

    /// Gets the text this contains.
    pub fn as_text(&self) -> FilterResult<&str> {
        match self {
            Literal::Text(text) => Ok(text),
            other => Err(unsupported_accessor("text", other)),
        }
    }

    /// Gets the date this contains.
    pub fn as_date(&self) -> FilterResult<NaiveDate> {
        match self {
            Literal::Date(date) => Ok(*date),
            other => Err(unsupported_accessor("date", other)),
        }
    }

    /// Gets the time this contains.
    pub fn as_time(&self) -> FilterResult<NaiveTime> {
        match self {
            Literal::Time(time) => Ok(*time),
            other => Err(unsupported_accessor("time", other)),
        }
    }

    /// Gets the timestamp this contains.
    pub fn as_timestamp(&self) -> FilterResult<NaiveDateTime> {
        match self {
            Literal::Timestamp(timestamp) => Ok(*timestamp),
            other => Err(unsupported_accessor("timestamp", other)),
        }
    }

    /// Gets the UUID this contains.
    pub fn as_uuid(&self) -> FilterResult<Uuid> {
        match self {
            Literal::Uuid(uuid) => Ok(*uuid),
            other => Err(unsupported_accessor("uuid", other)),
        }
    }
}

fn unsupported_accessor(requested: &str, literal: &Literal) -> FilterError {
    log::error!(
        "A {} literal does not support the {} accessor",
        literal.value_type(),
        requested
    );
    FilterError::new(
        &format!(
            "A {} literal does not support the {} accessor",
            literal.value_type(),
            requested
        ),
        ErrorKind::UnsupportedAccessor,
    )
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Text(text) => write!(f, "{}", text),
            Literal::Date(date) => write!(f, "{}", date),
            Literal::Time(time) => write!(f, "{}", time),
            Literal::Timestamp(timestamp) => write!(f, "{}", timestamp),
            Literal::Uuid(uuid) => write!(f, "{}", uuid),
        }
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Boolean(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Number(Number::Integer(value as i64))
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Number(Number::Integer(value))
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Number(Number::Float(value))
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Text(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::Text(value)
    }
}

impl From<Number> for Literal {
    fn from(value: Number) -> Self {
        Literal::Number(value)
    }
}

impl From<NaiveDate> for Literal {
    fn from(value: NaiveDate) -> Self {
        Literal::Date(value)
    }
}

impl From<NaiveTime> for Literal {
    fn from(value: NaiveTime) -> Self {
        Literal::Time(value)
    }
}

impl From<NaiveDateTime> for Literal {
    fn from(value: NaiveDateTime) -> Self {
        Literal::Timestamp(value)
    }
}

impl From<Uuid> for Literal {
    fn from(value: Uuid) -> Self {
        Literal::Uuid(value)
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    if let Ok(date_time) = DateTime::parse_from_rfc3339(text) {
        return Some(date_time.naive_utc());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M:%S%.f").ok()
}

// The uuid crate also accepts braced, urn and simple forms; only the
// hyphenated 8-4-4-4-12 form counts as a UUID literal here.
fn parse_uuid(text: &str) -> Option<Uuid> {
    if text.len() == 36 {
        Uuid::parse_str(text).ok()
    } else {
        None
    }
}

/// A literal restricted to the comparison-capable kinds.
///
/// `ComparisonValue` is the same tagged family as [Literal] narrowed at
/// construction time to `{Number, Date, Time, Timestamp, Uuid}`. The ordering
/// operators ($lt, $lte, $gt, $gte) carry one of these instead of a plain
/// literal, so a boolean, text, or null comparand is rejected while the
/// filter is being compiled rather than when it is executed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComparisonValue(Literal);

impl ComparisonValue {
    /// Narrows a literal into a comparison value.
    ///
    /// # Arguments
    ///
    /// * `literal` - The literal to narrow
    ///
    /// # Returns
    ///
    /// The comparison value, or a `TypeMismatch` error when the literal kind
    /// does not support ordering.
    pub fn new(literal: Literal) -> FilterResult<ComparisonValue> {
        match literal.value_type() {
            ValueType::Number
            | ValueType::Date
            | ValueType::Time
            | ValueType::Timestamp
            | ValueType::Uuid => Ok(ComparisonValue(literal)),
            other => {
                log::error!("A {} literal cannot be used as a comparison value", other);
                Err(FilterError::new(
                    &format!("A {} literal cannot be used as a comparison value", other),
                    ErrorKind::TypeMismatch,
                ))
            }
        }
    }

    /// Classifies a raw JSON scalar directly into a comparison value.
    pub(crate) fn classify(value: &JsonValue) -> FilterResult<ComparisonValue> {
        ComparisonValue::new(Literal::classify(value)?)
    }

    /// Gets the underlying literal.
    pub fn literal(&self) -> &Literal {
        &self.0
    }

    /// Consumes this value, returning the underlying literal.
    pub fn into_literal(self) -> Literal {
        self.0
    }

    /// Gets the kind tag of the underlying literal.
    pub fn value_type(&self) -> ValueType {
        self.0.value_type()
    }

    /// Gets the number this contains.
    pub fn as_number(&self) -> FilterResult<Number> {
        self.0.as_number()
    }

    /// Gets the date this contains.
    pub fn as_date(&self) -> FilterResult<NaiveDate> {
        self.0.as_date()
    }

    /// Gets the time this contains.
    pub fn as_time(&self) -> FilterResult<NaiveTime> {
        self.0.as_time()
    }

    /// Gets the timestamp this contains.
    pub fn as_timestamp(&self) -> FilterResult<NaiveDateTime> {
        self.0.as_timestamp()
    }

    /// Gets the UUID this contains.
    pub fn as_uuid(&self) -> FilterResult<Uuid> {
        self.0.as_uuid()
    }
}

impl Display for ComparisonValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ComparisonValue> for Literal {
    fn from(value: ComparisonValue) -> Self {
        value.0
    }
}

impl From<i32> for ComparisonValue {
    fn from(value: i32) -> Self {
        ComparisonValue(Literal::from(value))
    }
}

impl From<i64> for ComparisonValue {
    fn from(value: i64) -> Self {
        ComparisonValue(Literal::from(value))
    }
}

impl From<f64> for ComparisonValue {
    fn from(value: f64) -> Self {
        ComparisonValue(Literal::from(value))
    }
}

impl From<Number> for ComparisonValue {
    fn from(value: Number) -> Self {
        ComparisonValue(Literal::Number(value))
    }
}

impl From<NaiveDate> for ComparisonValue {
    fn from(value: NaiveDate) -> Self {
        ComparisonValue(Literal::Date(value))
    }
}

impl From<NaiveTime> for ComparisonValue {
    fn from(value: NaiveTime) -> Self {
        ComparisonValue(Literal::Time(value))
    }
}

impl From<NaiveDateTime> for ComparisonValue {
    fn from(value: NaiveDateTime) -> Self {
        ComparisonValue(Literal::Timestamp(value))
    }
}

impl From<Uuid> for ComparisonValue {
    fn from(value: Uuid) -> Self {
        ComparisonValue(Literal::Uuid(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_null() {
        let literal = Literal::classify(&json!(null)).unwrap();
        assert_eq!(literal, Literal::Null);
        assert!(literal.is_null());
    }

    #[test]
    fn test_classify_boolean() {
        let literal = Literal::classify(&json!(true)).unwrap();
        assert_eq!(literal, Literal::Boolean(true));
        assert_eq!(literal.value_type(), ValueType::Boolean);
    }

    #[test]
    fn test_classify_integer() {
        let literal = Literal::classify(&json!(42)).unwrap();
        assert_eq!(literal, Literal::Number(Number::Integer(42)));
    }

    #[test]
    fn test_classify_float() {
        let literal = Literal::classify(&json!(4.5)).unwrap();
        assert_eq!(literal, Literal::Number(Number::Float(4.5)));
    }

    #[test]
    fn test_classify_timestamp() {
        let literal = Literal::classify(&json!("2024-05-01T10:00:00")).unwrap();
        assert_eq!(literal.value_type(), ValueType::Timestamp);
    }

    #[test]
    fn test_classify_timestamp_with_offset() {
        let literal = Literal::classify(&json!("2024-05-01T10:00:00Z")).unwrap();
        assert_eq!(literal.value_type(), ValueType::Timestamp);

        let shifted = Literal::classify(&json!("2024-05-01T12:00:00+02:00")).unwrap();
        // normalized to UTC, so both render the same instant
        assert_eq!(literal, shifted);
    }

    #[test]
    fn test_classify_timestamp_with_fraction() {
        let literal = Literal::classify(&json!("2024-05-01T10:00:00.250")).unwrap();
        assert_eq!(literal.value_type(), ValueType::Timestamp);
    }

    #[test]
    fn test_classify_date() {
        let literal = Literal::classify(&json!("2024-05-01")).unwrap();
        assert_eq!(literal.value_type(), ValueType::Date);
    }

    #[test]
    fn test_classify_time() {
        let literal = Literal::classify(&json!("10:00:00")).unwrap();
        assert_eq!(literal.value_type(), ValueType::Time);
    }

    #[test]
    fn test_classify_uuid() {
        let literal =
            Literal::classify(&json!("67e55044-10b1-426f-9247-bb680e5fe0c8")).unwrap();
        assert_eq!(literal.value_type(), ValueType::Uuid);
    }

    #[test]
    fn test_classify_text() {
        let literal = Literal::classify(&json!("hello")).unwrap();
        assert_eq!(literal, Literal::Text("hello".to_string()));
    }

    #[test]
    fn test_timestamp_never_classifies_as_date() {
        // the timestamp grammar must win over its own date prefix
        let literal = Literal::classify(&json!("2024-05-01T10:00:00")).unwrap();
        assert_eq!(literal.value_type(), ValueType::Timestamp);

        let date_only = Literal::classify(&json!("2024-05-01")).unwrap();
        assert_eq!(date_only.value_type(), ValueType::Date);
    }

    #[test]
    fn test_unhyphenated_uuid_is_text() {
        let literal = Literal::classify(&json!("67e5504410b1426f9247bb680e5fe0c8")).unwrap();
        assert_eq!(literal.value_type(), ValueType::Text);
    }

    #[test]
    fn test_malformed_date_is_text() {
        let literal = Literal::classify(&json!("2024-13-45")).unwrap();
        assert_eq!(literal.value_type(), ValueType::Text);
    }

    #[test]
    fn test_classify_rejects_array() {
        let result = Literal::classify(&json!([1, 2]));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_classify_rejects_object() {
        let result = Literal::classify(&json!({"a": 1}));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_accessor_matches_tag() {
        assert!(Literal::Boolean(true).as_boolean().unwrap());
        assert_eq!(
            Literal::Number(Number::Integer(7)).as_number().unwrap(),
            Number::Integer(7)
        );
        assert_eq!(Literal::Text("abc".to_string()).as_text().unwrap(), "abc");
    }

    #[test]
    fn test_accessor_mismatch_fails() {
        let literal = Literal::Boolean(true);
        let result = literal.as_number();
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::UnsupportedAccessor);
    }

    #[test]
    fn test_accessor_mismatch_on_null() {
        let result = Literal::Null.as_text();
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::UnsupportedAccessor);
    }

    #[test]
    fn test_number_as_f64() {
        assert_eq!(Number::Integer(2).as_f64(), 2.0);
        assert_eq!(Number::Float(2.5).as_f64(), 2.5);
        assert!(Number::Integer(2).is_integer());
        assert!(!Number::Float(2.5).is_integer());
    }

    #[test]
    fn test_comparison_value_accepts_comparable_kinds() {
        assert!(ComparisonValue::new(Literal::from(5)).is_ok());
        assert!(ComparisonValue::new(Literal::classify(&json!("2024-05-01")).unwrap()).is_ok());
        assert!(ComparisonValue::new(Literal::classify(&json!("10:00:00")).unwrap()).is_ok());
        assert!(
            ComparisonValue::new(Literal::classify(&json!("2024-05-01T10:00:00")).unwrap())
                .is_ok()
        );
        assert!(ComparisonValue::new(
            Literal::classify(&json!("67e55044-10b1-426f-9247-bb680e5fe0c8")).unwrap()
        )
        .is_ok());
    }

    #[test]
    fn test_comparison_value_rejects_boolean_text_null() {
        for literal in [
            Literal::Null,
            Literal::Boolean(false),
            Literal::Text("hello".to_string()),
        ] {
            let result = ComparisonValue::new(literal);
            assert!(result.is_err());
            assert_eq!(result.unwrap_err().kind(), &ErrorKind::TypeMismatch);
        }
    }

    #[test]
    fn test_comparison_value_accessors() {
        let value = ComparisonValue::from(42);
        assert_eq!(value.as_number().unwrap(), Number::Integer(42));
        assert!(value.as_date().is_err());
    }

    #[test]
    fn test_literal_display() {
        assert_eq!(format!("{}", Literal::Null), "null");
        assert_eq!(format!("{}", Literal::Boolean(true)), "true");
        assert_eq!(format!("{}", Literal::from(5)), "5");
        assert_eq!(format!("{}", Literal::from(5.5)), "5.5");
        assert_eq!(format!("{}", Literal::from("abc")), "abc");
    }

    #[test]
    fn test_value_type_display() {
        assert_eq!(format!("{}", ValueType::Timestamp), "timestamp");
        assert_eq!(format!("{}", ValueType::Uuid), "uuid");
    }
}
