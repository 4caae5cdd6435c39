use std::fmt::{Display, Formatter};

use serde_json::{Map, Value as JsonValue};

use crate::common::value::json_kind;
use crate::errors::{ErrorKind, FilterError, FilterResult};

use super::combinators::{parse_combinator, Combinator, CombinatorKind};
use super::operators::parse_operator;
use super::options::ParseOptions;
use super::selector::Selector;

/// One node of a compiled filter tree.
///
/// A query node is either a [Selector] binding a field name to a conditional
/// operator, or a [Combinator] aggregating child nodes. Every switch over the
/// node kind is an exhaustive match, so adding a variant is a compile-time
/// event for every consumer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QueryNode {
    Selector(Selector),
    Combinator(Combinator),
}

impl QueryNode {
    /// Gets this node as a selector, if it is one.
    pub fn as_selector(&self) -> Option<&Selector> {
        match self {
            QueryNode::Selector(selector) => Some(selector),
            QueryNode::Combinator(_) => None,
        }
    }

    /// Gets this node as a combinator, if it is one.
    pub fn as_combinator(&self) -> Option<&Combinator> {
        match self {
            QueryNode::Selector(_) => None,
            QueryNode::Combinator(combinator) => Some(combinator),
        }
    }

    /// Checks whether this node is a selector.
    pub fn is_selector(&self) -> bool {
        matches!(self, QueryNode::Selector(_))
    }

    /// Checks whether this node is a combinator.
    pub fn is_combinator(&self) -> bool {
        matches!(self, QueryNode::Combinator(_))
    }
}

impl Display for QueryNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryNode::Selector(selector) => write!(f, "{}", selector),
            QueryNode::Combinator(combinator) => write!(f, "{}", combinator),
        }
    }
}

/// One parsed search filter.
///
/// A `Filter` owns exactly one [QueryNode] compiled from one JSON object.
/// The tree is built once, synchronously, and is immutable afterwards; it
/// keeps no reference to its JSON source. Because parsing is a pure
/// transform over the input value, independent filters can be compiled from
/// any number of threads without locking.
///
/// A filter is itself usable wherever a query node is expected
/// ([Filter::root], [Filter::into_root], `From<Filter> for QueryNode`), which
/// is what makes the $elemMatch recursion uniform.
///
/// # Grammar
///
/// - A single-field object whose key is one of the reserved combinator
///   keywords ($and, $or, $nand, $nor, $not) parses as that combinator.
/// - Any other single-field object parses as a selector; its value is either
///   a bare scalar (shorthand for `{"$eq": value}`) or a one-field operator
///   object.
/// - A multi-field object is sugar for an explicit `$and` of its entries,
///   preserving the object's insertion order.
/// - An empty object parses as an empty And, i.e. a filter that is
///   vacuously true.
///
/// # Examples
///
/// ```rust,ignore
/// use strainer::Filter;
///
/// let filter = Filter::parse_str(r#"{"age": {"$gte": 18}, "country": "US"}"#)?;
/// println!("{}", filter); // ((age >= 18) && (country == US))
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Filter {
    root: QueryNode,
}

impl Filter {
    /// Compiles a JSON value into a filter using the default [ParseOptions].
    ///
    /// # Arguments
    ///
    /// * `value` - The filter document; must be a JSON object
    ///
    /// # Returns
    ///
    /// The compiled filter, or the first error encountered. No partial tree
    /// is ever returned.
    pub fn parse(value: &JsonValue) -> FilterResult<Filter> {
        Filter::parse_with(value, &ParseOptions::default())
    }

    /// Compiles a JSON value into a filter with explicit parse limits.
    ///
    /// # Arguments
    ///
    /// * `value` - The filter document; must be a JSON object
    /// * `options` - Depth and node-count limits for this parse
    pub fn parse_with(value: &JsonValue, options: &ParseOptions) -> FilterResult<Filter> {
        let JsonValue::Object(object) = value else {
            log::error!("A search filter must be a JSON object, not {}", json_kind(value));
            return Err(FilterError::new(
                &format!("A search filter must be a JSON object, not {}", json_kind(value)),
                ErrorKind::MalformedFilter,
            ));
        };
        let mut ctx = ParseContext::new(options);
        let root = parse_node(&mut ctx, object, 0)?;
        Ok(Filter { root })
    }

    /// Compiles a JSON text into a filter using the default [ParseOptions].
    ///
    /// # Arguments
    ///
    /// * `text` - The filter document as JSON text
    pub fn parse_str(text: &str) -> FilterResult<Filter> {
        Filter::parse_str_with(text, &ParseOptions::default())
    }

    /// Compiles a JSON text into a filter with explicit parse limits.
    pub fn parse_str_with(text: &str, options: &ParseOptions) -> FilterResult<Filter> {
        let value: JsonValue = serde_json::from_str(text)?;
        Filter::parse_with(&value, options)
    }

    /// Wraps an already-built query node as a filter.
    pub(crate) fn from_node(root: QueryNode) -> Filter {
        Filter { root }
    }

    /// Gets the root query node of this filter.
    pub fn root(&self) -> &QueryNode {
        &self.root
    }

    /// Consumes this filter, returning its root query node.
    pub fn into_root(self) -> QueryNode {
        self.root
    }

    /// Combines this filter with another using logical AND.
    ///
    /// # Arguments
    ///
    /// * `filter` - The other filter to combine
    ///
    /// # Returns
    ///
    /// A new `Filter` representing `self AND filter`
    pub fn and(&self, filter: Filter) -> Filter {
        Filter::from_node(QueryNode::Combinator(Combinator::And(vec![
            self.clone().into_root(),
            filter.into_root(),
        ])))
    }

    /// Combines this filter with another using logical OR.
    ///
    /// # Arguments
    ///
    /// * `filter` - The other filter to combine
    ///
    /// # Returns
    ///
    /// A new `Filter` representing `self OR filter`
    pub fn or(&self, filter: Filter) -> Filter {
        Filter::from_node(QueryNode::Combinator(Combinator::Or(vec![
            self.clone().into_root(),
            filter.into_root(),
        ])))
    }

    /// Negates this filter using logical NOT.
    ///
    /// # Returns
    ///
    /// A new `Filter` representing `NOT self`
    pub fn not(&self) -> Filter {
        Filter::from_node(QueryNode::Combinator(Combinator::Not(Box::new(
            self.clone().into_root(),
        ))))
    }
}

impl Display for Filter {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root)
    }
}

impl From<Filter> for QueryNode {
    fn from(filter: Filter) -> Self {
        filter.root
    }
}

/// Shared state of one recursive parse: the configured limits and the count
/// of nodes built so far.
pub(crate) struct ParseContext<'a> {
    options: &'a ParseOptions,
    nodes: usize,
}

impl<'a> ParseContext<'a> {
    pub(crate) fn new(options: &'a ParseOptions) -> Self {
        ParseContext { options, nodes: 0 }
    }

    fn check_depth(&self, depth: usize) -> FilterResult<()> {
        if depth > self.options.max_depth() {
            log::error!(
                "Filter nesting exceeds the maximum depth of {}",
                self.options.max_depth()
            );
            return Err(FilterError::new(
                &format!(
                    "Filter nesting exceeds the maximum depth of {}",
                    self.options.max_depth()
                ),
                ErrorKind::LimitExceeded,
            ));
        }
        Ok(())
    }

    fn count_node(&mut self) -> FilterResult<()> {
        self.nodes += 1;
        if self.nodes > self.options.max_nodes() {
            log::error!(
                "Filter exceeds the maximum node count of {}",
                self.options.max_nodes()
            );
            return Err(FilterError::new(
                &format!(
                    "Filter exceeds the maximum node count of {}",
                    self.options.max_nodes()
                ),
                ErrorKind::LimitExceeded,
            ));
        }
        Ok(())
    }
}

/// Parses one filter object into one query node.
///
/// A single-field object parses under the combinator-or-selector rule. A
/// multi-field object parses each entry under that same rule, in insertion
/// order, and combines the results under an implicit And; an empty object
/// produces an empty And. Every recursive call descends into a strictly
/// smaller JSON subtree, so parsing always terminates.
pub(crate) fn parse_node(
    ctx: &mut ParseContext<'_>,
    object: &Map<String, JsonValue>,
    depth: usize,
) -> FilterResult<QueryNode> {
    ctx.check_depth(depth)?;
    if object.len() == 1 {
        let Some((field_name, value)) = object.iter().next() else {
            return Err(FilterError::new(
                "Filter object unexpectedly empty",
                ErrorKind::InternalError,
            ));
        };
        parse_entry(ctx, field_name, value, depth)
    } else {
        // Desugars {"a": 1, "b": 2} into an And over its single-field
        // entries. The entries sit at the same JSON depth as the object, so
        // the implicit And does not count as a nesting level.
        let mut children = Vec::with_capacity(object.len());
        for (field_name, value) in object {
            children.push(parse_entry(ctx, field_name, value, depth)?);
        }
        ctx.count_node()?;
        Ok(QueryNode::Combinator(Combinator::And(children)))
    }
}

fn parse_entry(
    ctx: &mut ParseContext<'_>,
    field_name: &str,
    value: &JsonValue,
    depth: usize,
) -> FilterResult<QueryNode> {
    if let Some(kind) = CombinatorKind::from_key(field_name) {
        let combinator = parse_combinator(ctx, kind, value, depth)?;
        ctx.count_node()?;
        Ok(QueryNode::Combinator(combinator))
    } else {
        let operator = parse_operator(ctx, value, depth)?;
        ctx.count_node()?;
        Ok(QueryNode::Selector(Selector::new(field_name, operator)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::value::Literal;
    use crate::filter::operators::ConditionalOperator;
    use serde_json::json;

    fn selector(node: &QueryNode) -> &Selector {
        node.as_selector().expect("expected a selector node")
    }

    #[test]
    fn test_parse_single_selector() {
        let filter = Filter::parse(&json!({"age": {"$gte": 18}})).unwrap();
        let selector = selector(filter.root());
        assert_eq!(selector.field_name(), "age");
    }

    #[test]
    fn test_shorthand_equals_matches_explicit() {
        let shorthand = Filter::parse(&json!({"age": 5})).unwrap();
        let explicit = Filter::parse(&json!({"age": {"$eq": 5}})).unwrap();
        assert_eq!(shorthand, explicit);
    }

    #[test]
    fn test_multi_field_object_is_implicit_and() {
        let filter = Filter::parse(&json!({"a": 1, "b": 2})).unwrap();
        let combinator = filter.root().as_combinator().expect("expected an And");
        assert_eq!(combinator.kind(), CombinatorKind::And);

        let children = combinator.children();
        assert_eq!(children.len(), 2);
        assert_eq!(selector(&children[0]).field_name(), "a");
        assert_eq!(selector(&children[1]).field_name(), "b");
    }

    #[test]
    fn test_multi_field_object_equals_explicit_and() {
        let implicit = Filter::parse(&json!({"a": 1, "b": 2})).unwrap();
        let explicit = Filter::parse(&json!({"$and": [{"a": 1}, {"b": 2}]})).unwrap();
        assert_eq!(implicit, explicit);
    }

    #[test]
    fn test_empty_object_is_empty_and() {
        let filter = Filter::parse(&json!({})).unwrap();
        let combinator = filter.root().as_combinator().expect("expected an And");
        assert_eq!(combinator.kind(), CombinatorKind::And);
        assert!(combinator.children().is_empty());
    }

    #[test]
    fn test_not_combinator_child_matches_standalone_parse() {
        let negated = Filter::parse(&json!({"$not": {"a": 1}})).unwrap();
        let standalone = Filter::parse(&json!({"a": 1})).unwrap();

        let combinator = negated.root().as_combinator().expect("expected a Not");
        assert_eq!(combinator.kind(), CombinatorKind::Not);
        assert_eq!(combinator.children()[0], standalone.into_root());
    }

    #[test]
    fn test_parse_rejects_non_object() {
        for value in [json!(5), json!("text"), json!([{"a": 1}]), json!(null)] {
            let result = Filter::parse(&value);
            assert!(result.is_err());
            assert_eq!(result.unwrap_err().kind(), &ErrorKind::MalformedFilter);
        }
    }

    #[test]
    fn test_parse_str() {
        let filter = Filter::parse_str(r#"{"age": {"$gte": 18}}"#).unwrap();
        assert!(filter.root().is_selector());
    }

    #[test]
    fn test_parse_str_rejects_invalid_json() {
        let result = Filter::parse_str("{not json");
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::MalformedFilter);
    }

    #[test]
    fn test_elem_match_nested_filter_matches_standalone_parse() {
        let filter =
            Filter::parse(&json!({"tags": {"$elemMatch": {"status": "active"}}})).unwrap();
        let standalone = Filter::parse(&json!({"status": "active"})).unwrap();

        let selector = selector(filter.root());
        if let ConditionalOperator::ElemMatch(nested) = selector.operator() {
            assert_eq!(nested.as_ref(), &standalone);
        } else {
            panic!("expected an $elemMatch operator");
        }
    }

    #[test]
    fn test_depth_limit() {
        let options = ParseOptions::new().with_max_depth(2);
        let shallow = json!({"$not": {"a": 1}});
        assert!(Filter::parse_with(&shallow, &options).is_ok());

        let deep = json!({"$not": {"$not": {"$not": {"a": 1}}}});
        let result = Filter::parse_with(&deep, &options);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::LimitExceeded);
    }

    #[test]
    fn test_node_limit() {
        let options = ParseOptions::new().with_max_nodes(2);
        let result = Filter::parse_with(&json!({"a": 1, "b": 2, "c": 3}), &options);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::LimitExceeded);
    }

    #[test]
    fn test_filter_and_instance_combinator() {
        let left = Filter::parse(&json!({"a": 1})).unwrap();
        let right = Filter::parse(&json!({"b": 2})).unwrap();
        let combined = left.and(right);

        let combinator = combined.root().as_combinator().expect("expected an And");
        assert_eq!(combinator.kind(), CombinatorKind::And);
        assert_eq!(combinator.children().len(), 2);
    }

    #[test]
    fn test_filter_or_instance_combinator() {
        let left = Filter::parse(&json!({"a": 1})).unwrap();
        let right = Filter::parse(&json!({"b": 2})).unwrap();
        let combined = left.or(right);
        assert_eq!(
            combined.root().as_combinator().map(Combinator::kind),
            Some(CombinatorKind::Or)
        );
    }

    #[test]
    fn test_filter_not_instance_combinator() {
        let filter = Filter::parse(&json!({"a": 1})).unwrap();
        let negated = filter.not();
        assert_eq!(
            negated.root().as_combinator().map(Combinator::kind),
            Some(CombinatorKind::Not)
        );
    }

    #[test]
    fn test_filter_display() {
        let filter = Filter::parse(&json!({"age": {"$gte": 18}, "country": "US"})).unwrap();
        assert_eq!(format!("{}", filter), "((age >= 18) && (country == US))");
    }

    #[test]
    fn test_filter_into_query_node() {
        let filter = Filter::parse(&json!({"age": 30})).unwrap();
        let node: QueryNode = filter.clone().into();
        assert_eq!(&node, filter.root());
    }

    #[test]
    fn test_selector_operator_value() {
        let filter = Filter::parse(&json!({"verified": true})).unwrap();
        let selector = selector(filter.root());
        assert_eq!(
            selector.operator(),
            &ConditionalOperator::Equals(Literal::Boolean(true))
        );
    }
}
