use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use once_cell::sync::Lazy;
use serde_json::Value as JsonValue;

use crate::common::value::json_kind;
use crate::errors::{ErrorKind, FilterError, FilterResult};

use super::filter::{parse_node, ParseContext, QueryNode};

/// The discriminant of a [Combinator].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombinatorKind {
    And,
    Or,
    Nand,
    Nor,
    Not,
}

// Reserved combinator keywords. A single-field filter object whose key is in
// this table is a combinator; every other key is an ordinary field selector.
static COMBINATOR_KEYWORDS: Lazy<HashMap<&'static str, CombinatorKind>> = Lazy::new(|| {
    HashMap::from([
        ("$and", CombinatorKind::And),
        ("$or", CombinatorKind::Or),
        ("$nand", CombinatorKind::Nand),
        ("$nor", CombinatorKind::Nor),
        ("$not", CombinatorKind::Not),
    ])
});

impl CombinatorKind {
    /// Looks up the combinator kind for a reserved filter keyword.
    ///
    /// # Arguments
    ///
    /// * `key` - The field name to look up (e.g. `$or`)
    ///
    /// # Returns
    ///
    /// The matching kind, or `None` when the field name is not reserved.
    pub fn from_key(key: &str) -> Option<CombinatorKind> {
        COMBINATOR_KEYWORDS.get(key).copied()
    }

    /// Gets the filter keyword for this combinator kind.
    pub fn keyword(&self) -> &'static str {
        match self {
            CombinatorKind::And => "$and",
            CombinatorKind::Or => "$or",
            CombinatorKind::Nand => "$nand",
            CombinatorKind::Nor => "$nor",
            CombinatorKind::Not => "$not",
        }
    }
}

/// A boolean aggregation node over child query nodes.
///
/// `And`, `Or`, `Nand`, and `Nor` hold an ordered list of children; `Not`
/// holds exactly one child, and that arity lives in the type rather than in a
/// runtime check. The [Combinator::children] accessor exposes all variants
/// uniformly to consumers walking the tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Combinator {
    And(Vec<QueryNode>),
    Or(Vec<QueryNode>),
    Nand(Vec<QueryNode>),
    Nor(Vec<QueryNode>),
    Not(Box<QueryNode>),
}

impl Combinator {
    /// Gets the discriminant of this combinator.
    pub fn kind(&self) -> CombinatorKind {
        match self {
            Combinator::And(_) => CombinatorKind::And,
            Combinator::Or(_) => CombinatorKind::Or,
            Combinator::Nand(_) => CombinatorKind::Nand,
            Combinator::Nor(_) => CombinatorKind::Nor,
            Combinator::Not(_) => CombinatorKind::Not,
        }
    }

    /// Gets the ordered children of this combinator.
    ///
    /// A `Not` combinator yields a one-element slice.
    pub fn children(&self) -> &[QueryNode] {
        match self {
            Combinator::And(children)
            | Combinator::Or(children)
            | Combinator::Nand(children)
            | Combinator::Nor(children) => children,
            Combinator::Not(child) => std::slice::from_ref(child.as_ref()),
        }
    }
}

impl Display for Combinator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Combinator::And(children) => {
                write!(f, "({})", children.iter().join(" && "))
            }
            Combinator::Or(children) => {
                write!(f, "({})", children.iter().join(" || "))
            }
            Combinator::Nand(children) => {
                write!(f, "!({})", children.iter().join(" && "))
            }
            Combinator::Nor(children) => {
                write!(f, "!({})", children.iter().join(" || "))
            }
            Combinator::Not(child) => write!(f, "!({})", child),
        }
    }
}

/// Parses the value of a reserved combinator field.
///
/// `$and`/`$or`/`$nand`/`$nor` require an array of filter objects; `$not`
/// requires a single filter object and never an array.
pub(crate) fn parse_combinator(
    ctx: &mut ParseContext<'_>,
    kind: CombinatorKind,
    value: &JsonValue,
    depth: usize,
) -> FilterResult<Combinator> {
    match kind {
        CombinatorKind::And => Ok(Combinator::And(parse_filter_list(ctx, kind, value, depth)?)),
        CombinatorKind::Or => Ok(Combinator::Or(parse_filter_list(ctx, kind, value, depth)?)),
        CombinatorKind::Nand => Ok(Combinator::Nand(parse_filter_list(ctx, kind, value, depth)?)),
        CombinatorKind::Nor => Ok(Combinator::Nor(parse_filter_list(ctx, kind, value, depth)?)),
        CombinatorKind::Not => match value {
            JsonValue::Object(object) => Ok(Combinator::Not(Box::new(parse_node(
                ctx,
                object,
                depth + 1,
            )?))),
            other => {
                log::error!(
                    "The filter for a $not combinator must be an object, not {}",
                    json_kind(other)
                );
                Err(FilterError::new(
                    &format!(
                        "The filter for a $not combinator must be an object, not {}",
                        json_kind(other)
                    ),
                    ErrorKind::MalformedFilter,
                ))
            }
        },
    }
}

fn parse_filter_list(
    ctx: &mut ParseContext<'_>,
    kind: CombinatorKind,
    value: &JsonValue,
    depth: usize,
) -> FilterResult<Vec<QueryNode>> {
    let JsonValue::Array(items) = value else {
        log::error!(
            "Can only create a {} combinator from an array, not {}",
            kind.keyword(),
            json_kind(value)
        );
        return Err(FilterError::new(
            &format!(
                "Can only create a {} combinator from an array, not {}",
                kind.keyword(),
                json_kind(value)
            ),
            ErrorKind::MalformedFilter,
        ));
    };
    let mut children = Vec::with_capacity(items.len());
    for item in items {
        match item {
            JsonValue::Object(object) => children.push(parse_node(ctx, object, depth + 1)?),
            other => {
                log::error!(
                    "Every filter in a combinator must be an object, not {}",
                    json_kind(other)
                );
                return Err(FilterError::new(
                    &format!(
                        "Every filter in a combinator must be an object, not {}",
                        json_kind(other)
                    ),
                    ErrorKind::MalformedFilter,
                ));
            }
        }
    }
    Ok(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::options::ParseOptions;
    use serde_json::json;

    fn parse(kind: CombinatorKind, value: &JsonValue) -> FilterResult<Combinator> {
        let options = ParseOptions::default();
        let mut ctx = ParseContext::new(&options);
        parse_combinator(&mut ctx, kind, value, 0)
    }

    #[test]
    fn test_and_combinator() {
        let combinator = parse(CombinatorKind::And, &json!([{"a": 1}, {"b": 2}])).unwrap();
        assert_eq!(combinator.kind(), CombinatorKind::And);
        assert_eq!(combinator.children().len(), 2);
    }

    #[test]
    fn test_or_combinator() {
        let combinator = parse(CombinatorKind::Or, &json!([{"a": 1}])).unwrap();
        assert_eq!(combinator.kind(), CombinatorKind::Or);
        assert_eq!(combinator.children().len(), 1);
    }

    #[test]
    fn test_nand_and_nor_combinators() {
        let nand = parse(CombinatorKind::Nand, &json!([{"a": 1}, {"b": 2}])).unwrap();
        assert_eq!(nand.kind(), CombinatorKind::Nand);

        let nor = parse(CombinatorKind::Nor, &json!([{"a": 1}, {"b": 2}])).unwrap();
        assert_eq!(nor.kind(), CombinatorKind::Nor);
    }

    #[test]
    fn test_empty_combinator_array_is_legal() {
        let combinator = parse(CombinatorKind::And, &json!([])).unwrap();
        assert!(combinator.children().is_empty());
    }

    #[test]
    fn test_combinator_rejects_object_value() {
        let result = parse(CombinatorKind::And, &json!({"a": 1}));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::MalformedFilter);
    }

    #[test]
    fn test_combinator_rejects_scalar_element() {
        let result = parse(CombinatorKind::Or, &json!([{"a": 1}, 5]));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::MalformedFilter);
    }

    #[test]
    fn test_not_combinator_takes_single_object() {
        let combinator = parse(CombinatorKind::Not, &json!({"a": 1})).unwrap();
        assert_eq!(combinator.kind(), CombinatorKind::Not);
        assert_eq!(combinator.children().len(), 1);
    }

    #[test]
    fn test_not_combinator_rejects_array() {
        let result = parse(CombinatorKind::Not, &json!([{"a": 1}]));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::MalformedFilter);
    }

    #[test]
    fn test_reserved_keyword_set() {
        for keyword in ["$and", "$or", "$nand", "$nor", "$not"] {
            let kind = CombinatorKind::from_key(keyword).unwrap();
            assert_eq!(kind.keyword(), keyword);
        }
        assert!(CombinatorKind::from_key("$elemMatch").is_none());
        assert!(CombinatorKind::from_key("age").is_none());
    }
}
