use std::collections::HashMap;

use itertools::Itertools;
use once_cell::sync::Lazy;
use serde_json::Value as JsonValue;

use crate::common::value::{json_kind, ComparisonValue, Literal, Number};
use crate::errors::{ErrorKind, FilterError, FilterResult};

use super::filter::{parse_node, Filter, ParseContext};

/// The discriminant of a [ConditionalOperator].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperatorKind {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEquals,
    GreaterThan,
    GreaterThanOrEquals,
    In,
    NotIn,
    Begins,
    Contains,
    Ends,
    Modulo,
    ElemMatch,
}

// Read-only dispatch table, built once. Every operator keyword recognized in
// filter JSON maps to its kind here; a key missing from this table is an
// unknown operator.
static OPERATOR_KEYWORDS: Lazy<HashMap<&'static str, OperatorKind>> = Lazy::new(|| {
    HashMap::from([
        ("$eq", OperatorKind::Equals),
        ("$ne", OperatorKind::NotEquals),
        ("$lt", OperatorKind::LessThan),
        ("$lte", OperatorKind::LessThanOrEquals),
        ("$gt", OperatorKind::GreaterThan),
        ("$gte", OperatorKind::GreaterThanOrEquals),
        ("$in", OperatorKind::In),
        ("$nin", OperatorKind::NotIn),
        ("$begins", OperatorKind::Begins),
        ("$contains", OperatorKind::Contains),
        ("$ends", OperatorKind::Ends),
        ("$mod", OperatorKind::Modulo),
        ("$elemMatch", OperatorKind::ElemMatch),
    ])
});

impl OperatorKind {
    /// Looks up the operator kind for a filter keyword.
    ///
    /// # Arguments
    ///
    /// * `key` - The operator keyword as written in the filter JSON (e.g. `$lt`)
    ///
    /// # Returns
    ///
    /// The matching kind, or `None` when the keyword is not a recognized operator.
    pub fn from_key(key: &str) -> Option<OperatorKind> {
        OPERATOR_KEYWORDS.get(key).copied()
    }

    /// Gets the filter keyword for this operator kind.
    pub fn keyword(&self) -> &'static str {
        match self {
            OperatorKind::Equals => "$eq",
            OperatorKind::NotEquals => "$ne",
            OperatorKind::LessThan => "$lt",
            OperatorKind::LessThanOrEquals => "$lte",
            OperatorKind::GreaterThan => "$gt",
            OperatorKind::GreaterThanOrEquals => "$gte",
            OperatorKind::In => "$in",
            OperatorKind::NotIn => "$nin",
            OperatorKind::Begins => "$begins",
            OperatorKind::Contains => "$contains",
            OperatorKind::Ends => "$ends",
            OperatorKind::Modulo => "$mod",
            OperatorKind::ElemMatch => "$elemMatch",
        }
    }
}

/// A typed predicate applied to a selector's field.
///
/// Each variant carries its operands as typed values, validated at
/// construction time:
///
/// - `Equals`/`NotEquals` accept one literal of any kind, including null.
/// - The ordering operators carry a [ComparisonValue], so a boolean, text,
///   or null comparand never reaches the execution engine.
/// - `In`/`NotIn` carry an ordered list of literals that all share one
///   [crate::ValueType].
/// - `Begins`/`Contains`/`Ends` carry raw text; no literal classification is
///   applied to their argument.
/// - `Modulo` carries the divisor and remainder as numbers.
/// - `ElemMatch` carries one nested [Filter], applied to elements of an
///   array-valued field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionalOperator {
    Equals(Literal),
    NotEquals(Literal),
    LessThan(ComparisonValue),
    LessThanOrEquals(ComparisonValue),
    GreaterThan(ComparisonValue),
    GreaterThanOrEquals(ComparisonValue),
    In(Vec<Literal>),
    NotIn(Vec<Literal>),
    Begins(String),
    Contains(String),
    Ends(String),
    Modulo { divisor: Number, remainder: Number },
    ElemMatch(Box<Filter>),
}

impl ConditionalOperator {
    /// Gets the discriminant of this operator.
    pub fn kind(&self) -> OperatorKind {
        match self {
            ConditionalOperator::Equals(_) => OperatorKind::Equals,
            ConditionalOperator::NotEquals(_) => OperatorKind::NotEquals,
            ConditionalOperator::LessThan(_) => OperatorKind::LessThan,
            ConditionalOperator::LessThanOrEquals(_) => OperatorKind::LessThanOrEquals,
            ConditionalOperator::GreaterThan(_) => OperatorKind::GreaterThan,
            ConditionalOperator::GreaterThanOrEquals(_) => OperatorKind::GreaterThanOrEquals,
            ConditionalOperator::In(_) => OperatorKind::In,
            ConditionalOperator::NotIn(_) => OperatorKind::NotIn,
            ConditionalOperator::Begins(_) => OperatorKind::Begins,
            ConditionalOperator::Contains(_) => OperatorKind::Contains,
            ConditionalOperator::Ends(_) => OperatorKind::Ends,
            ConditionalOperator::Modulo { .. } => OperatorKind::Modulo,
            ConditionalOperator::ElemMatch(_) => OperatorKind::ElemMatch,
        }
    }
}

/// Parses the value of a selector field into a conditional operator.
///
/// A bare scalar is shorthand for `{"$eq": scalar}`. An object must contain
/// exactly one field, whose name must be a recognized operator keyword; the
/// argument is then validated per operator family. An array at a selector
/// position is malformed.
pub(crate) fn parse_operator(
    ctx: &mut ParseContext<'_>,
    value: &JsonValue,
    depth: usize,
) -> FilterResult<ConditionalOperator> {
    let (kind, argument) = match value {
        JsonValue::Object(object) => {
            if object.len() != 1 {
                log::error!(
                    "A selector object must contain exactly one conditional operator, found {}",
                    object.len()
                );
                return Err(FilterError::new(
                    "Only one conditional operator per selector can be specified at a time",
                    ErrorKind::ArityMismatch,
                ));
            }
            let Some((name, argument)) = object.iter().next() else {
                return Err(FilterError::new(
                    "Selector object unexpectedly empty",
                    ErrorKind::InternalError,
                ));
            };
            let kind = OperatorKind::from_key(name).ok_or_else(|| {
                log::error!("Cannot create a conditional operator from field \"{}\"", name);
                FilterError::new(
                    &format!("Cannot create a conditional operator from field \"{}\"", name),
                    ErrorKind::UnknownOperator,
                )
            })?;
            (kind, argument)
        }
        JsonValue::Array(_) => {
            log::error!("A field selector must be a literal value or an object");
            return Err(FilterError::new(
                "A field selector must be a literal value or an object",
                ErrorKind::MalformedFilter,
            ));
        }
        scalar => (OperatorKind::Equals, scalar),
    };

    match kind {
        OperatorKind::Equals => Ok(ConditionalOperator::Equals(equality_literal(
            kind, argument,
        )?)),
        OperatorKind::NotEquals => Ok(ConditionalOperator::NotEquals(equality_literal(
            kind, argument,
        )?)),
        OperatorKind::LessThan => Ok(ConditionalOperator::LessThan(comparison_value(
            kind, argument,
        )?)),
        OperatorKind::LessThanOrEquals => Ok(ConditionalOperator::LessThanOrEquals(
            comparison_value(kind, argument)?,
        )),
        OperatorKind::GreaterThan => Ok(ConditionalOperator::GreaterThan(comparison_value(
            kind, argument,
        )?)),
        OperatorKind::GreaterThanOrEquals => Ok(ConditionalOperator::GreaterThanOrEquals(
            comparison_value(kind, argument)?,
        )),
        OperatorKind::In => Ok(ConditionalOperator::In(equality_literal_list(
            kind, argument,
        )?)),
        OperatorKind::NotIn => Ok(ConditionalOperator::NotIn(equality_literal_list(
            kind, argument,
        )?)),
        OperatorKind::Begins => Ok(ConditionalOperator::Begins(text_argument(kind, argument)?)),
        OperatorKind::Contains => Ok(ConditionalOperator::Contains(text_argument(
            kind, argument,
        )?)),
        OperatorKind::Ends => Ok(ConditionalOperator::Ends(text_argument(kind, argument)?)),
        OperatorKind::Modulo => {
            let (divisor, remainder) = modulo_arguments(argument)?;
            Ok(ConditionalOperator::Modulo { divisor, remainder })
        }
        OperatorKind::ElemMatch => match argument {
            JsonValue::Object(object) => {
                let node = parse_node(ctx, object, depth + 1)?;
                Ok(ConditionalOperator::ElemMatch(Box::new(Filter::from_node(
                    node,
                ))))
            }
            other => {
                log::error!(
                    "The $elemMatch operator must be provided an object containing a search filter, not {}",
                    json_kind(other)
                );
                Err(FilterError::new(
                    &format!(
                        "The $elemMatch operator must be provided an object containing a search filter, not {}",
                        json_kind(other)
                    ),
                    ErrorKind::MalformedFilter,
                ))
            }
        },
    }
}

fn equality_literal(kind: OperatorKind, argument: &JsonValue) -> FilterResult<Literal> {
    Literal::classify(argument).map_err(|cause| {
        log::error!(
            "The {} conditional operator must be provided a value",
            kind.keyword()
        );
        FilterError::new_with_cause(
            &format!(
                "The {} conditional operator must be provided a value",
                kind.keyword()
            ),
            ErrorKind::TypeMismatch,
            cause,
        )
    })
}

fn comparison_value(kind: OperatorKind, argument: &JsonValue) -> FilterResult<ComparisonValue> {
    ComparisonValue::classify(argument).map_err(|cause| {
        log::error!(
            "The {} conditional operator must be provided a numeric, date, time, timestamp, or UUID value",
            kind.keyword()
        );
        FilterError::new_with_cause(
            &format!(
                "The {} conditional operator must be provided a numeric, date, time, timestamp, or UUID value",
                kind.keyword()
            ),
            ErrorKind::TypeMismatch,
            cause,
        )
    })
}

fn equality_literal_list(kind: OperatorKind, argument: &JsonValue) -> FilterResult<Vec<Literal>> {
    let JsonValue::Array(items) = argument else {
        log::error!(
            "The {} conditional operator must be provided an array of values, not {}",
            kind.keyword(),
            json_kind(argument)
        );
        return Err(FilterError::new(
            &format!(
                "The {} conditional operator must be provided an array of values, not {}",
                kind.keyword(),
                json_kind(argument)
            ),
            ErrorKind::ArityMismatch,
        ));
    };
    let literals = items
        .iter()
        .map(Literal::classify)
        .collect::<FilterResult<Vec<_>>>()
        .map_err(|cause| {
            FilterError::new_with_cause(
                &format!(
                    "The {} conditional operator must be provided an array of values",
                    kind.keyword()
                ),
                ErrorKind::TypeMismatch,
                cause,
            )
        })?;
    ensure_same_value_type(kind.keyword(), &literals)?;
    Ok(literals)
}

/// Checks the membership-list invariant: every literal in a $in/$nin array
/// must carry the same value type.
pub(crate) fn ensure_same_value_type(keyword: &str, literals: &[Literal]) -> FilterResult<()> {
    if literals.iter().map(Literal::value_type).all_equal() {
        Ok(())
    } else {
        log::error!("Every value in the {} array must have the same type", keyword);
        Err(FilterError::new(
            &format!("Every value in the {} array must have the same type", keyword),
            ErrorKind::TypeMismatch,
        ))
    }
}

fn text_argument(kind: OperatorKind, argument: &JsonValue) -> FilterResult<String> {
    match argument {
        JsonValue::String(text) => Ok(text.clone()),
        other => {
            log::error!(
                "The {} string operator must be provided a text value, not {}",
                kind.keyword(),
                json_kind(other)
            );
            Err(FilterError::new(
                &format!(
                    "The {} string operator must be provided a text value, not {}",
                    kind.keyword(),
                    json_kind(other)
                ),
                ErrorKind::TypeMismatch,
            ))
        }
    }
}

fn modulo_arguments(argument: &JsonValue) -> FilterResult<(Number, Number)> {
    let JsonValue::Array(items) = argument else {
        log::error!("The value for the $mod conditional operator must be an array");
        return Err(FilterError::new(
            "The value for the $mod conditional operator must be an array",
            ErrorKind::ArityMismatch,
        ));
    };
    if items.len() != 2 {
        log::error!(
            "The array for the $mod conditional operator must have exactly 2 values, found {}",
            items.len()
        );
        return Err(FilterError::new(
            "The array for the $mod conditional operator must have exactly 2 values",
            ErrorKind::ArityMismatch,
        ));
    }
    Ok((modulo_number(&items[0])?, modulo_number(&items[1])?))
}

fn modulo_number(value: &JsonValue) -> FilterResult<Number> {
    match value {
        JsonValue::Number(n) => Number::from_json(n).ok_or_else(|| {
            FilterError::new(
                &format!("Cannot represent the JSON number {} as a literal", n),
                ErrorKind::TypeMismatch,
            )
        }),
        other => {
            log::error!(
                "The array for the $mod conditional operator must only contain numbers, found {}",
                json_kind(other)
            );
            Err(FilterError::new(
                "The array for the $mod conditional operator must only contain numbers",
                ErrorKind::TypeMismatch,
            ))
        }
    }
}
