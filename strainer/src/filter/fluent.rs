use crate::common::value::{ComparisonValue, Literal, Number};
use crate::errors::FilterResult;

use super::combinators::Combinator;
use super::filter::{Filter, QueryNode};
use super::operators::{ensure_same_value_type, ConditionalOperator};
use super::selector::Selector;

/// Creates a fluent filter builder for the specified field name.
///
/// This function initializes a builder that allows chaining of comparison and
/// filter operations on a specific field, as an alternative to compiling a
/// JSON document. Filters built this way are structurally identical to their
/// parsed counterparts.
///
/// # Arguments
///
/// * `field_name` - The name of the field to filter on
///
/// # Returns
///
/// A `FluentFilter` builder for constructing field-specific filters
///
/// # Examples
///
/// ```rust,ignore
/// use strainer::{field, or};
///
/// let filter = or(vec![
///     field("age").gte(18),
///     field("country").eq("US"),
/// ]);
/// ```
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

/// A fluent builder for constructing filters on a specific field.
///
/// `FluentFilter` provides chainable methods for creating filters with
/// various conditions including equality, comparison operators, text
/// matching, and membership operations. Each method returns a [Filter] that
/// can be combined with other filters via [and], [or], [nand], [nor], and
/// [not], or via the instance combinators on `Filter` itself.
pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    /// Creates a filter matching records where the field equals the value.
    #[inline]
    pub fn eq<T: Into<Literal>>(self, value: T) -> Filter {
        self.selector(ConditionalOperator::Equals(value.into()))
    }

    /// Creates a filter matching records where the field does not equal the value.
    #[inline]
    pub fn ne<T: Into<Literal>>(self, value: T) -> Filter {
        self.selector(ConditionalOperator::NotEquals(value.into()))
    }

    /// Creates a filter matching records where the field is less than the value.
    #[inline]
    pub fn lt<T: Into<ComparisonValue>>(self, value: T) -> Filter {
        self.selector(ConditionalOperator::LessThan(value.into()))
    }

    /// Creates a filter matching records where the field is less than or
    /// equal to the value.
    #[inline]
    pub fn lte<T: Into<ComparisonValue>>(self, value: T) -> Filter {
        self.selector(ConditionalOperator::LessThanOrEquals(value.into()))
    }

    /// Creates a filter matching records where the field is greater than the value.
    #[inline]
    pub fn gt<T: Into<ComparisonValue>>(self, value: T) -> Filter {
        self.selector(ConditionalOperator::GreaterThan(value.into()))
    }

    /// Creates a filter matching records where the field is greater than or
    /// equal to the value.
    #[inline]
    pub fn gte<T: Into<ComparisonValue>>(self, value: T) -> Filter {
        self.selector(ConditionalOperator::GreaterThanOrEquals(value.into()))
    }

    /// Creates a filter matching records where the field's value is one of
    /// the given values.
    ///
    /// # Arguments
    ///
    /// * `values` - The candidate values; all must share one value type
    ///
    /// # Returns
    ///
    /// The membership filter, or a `TypeMismatch` error when the values mix
    /// types.
    pub fn in_values<T: Into<Literal>>(self, values: Vec<T>) -> FilterResult<Filter> {
        let literals: Vec<Literal> = values.into_iter().map(Into::into).collect();
        ensure_same_value_type("$in", &literals)?;
        Ok(self.selector(ConditionalOperator::In(literals)))
    }

    /// Creates a filter matching records where the field's value is none of
    /// the given values.
    pub fn nin<T: Into<Literal>>(self, values: Vec<T>) -> FilterResult<Filter> {
        let literals: Vec<Literal> = values.into_iter().map(Into::into).collect();
        ensure_same_value_type("$nin", &literals)?;
        Ok(self.selector(ConditionalOperator::NotIn(literals)))
    }

    /// Creates a filter matching records where the field's text starts with
    /// the given prefix.
    #[inline]
    pub fn begins<T: Into<String>>(self, text: T) -> Filter {
        self.selector(ConditionalOperator::Begins(text.into()))
    }

    /// Creates a filter matching records where the field's text contains the
    /// given fragment.
    #[inline]
    pub fn contains<T: Into<String>>(self, text: T) -> Filter {
        self.selector(ConditionalOperator::Contains(text.into()))
    }

    /// Creates a filter matching records where the field's text ends with the
    /// given suffix.
    #[inline]
    pub fn ends<T: Into<String>>(self, text: T) -> Filter {
        self.selector(ConditionalOperator::Ends(text.into()))
    }

    /// Creates a filter matching records where dividing the field by
    /// `divisor` leaves `remainder`.
    #[inline]
    pub fn modulo<D: Into<Number>, R: Into<Number>>(self, divisor: D, remainder: R) -> Filter {
        self.selector(ConditionalOperator::Modulo {
            divisor: divisor.into(),
            remainder: remainder.into(),
        })
    }

    /// Creates a filter matching records where at least one element of the
    /// array-valued field satisfies the nested filter.
    #[inline]
    pub fn elem_match(self, filter: Filter) -> Filter {
        self.selector(ConditionalOperator::ElemMatch(Box::new(filter)))
    }

    fn selector(self, operator: ConditionalOperator) -> Filter {
        Filter::from_node(QueryNode::Selector(Selector::new(&self.field_name, operator)))
    }
}

/// Combines multiple filters using logical AND.
///
/// # Arguments
///
/// * `filters` - A vector of filters to combine
///
/// # Returns
///
/// A `Filter` representing the AND of all filters
pub fn and(filters: Vec<Filter>) -> Filter {
    Filter::from_node(QueryNode::Combinator(Combinator::And(into_nodes(filters))))
}

/// Combines multiple filters using logical OR.
pub fn or(filters: Vec<Filter>) -> Filter {
    Filter::from_node(QueryNode::Combinator(Combinator::Or(into_nodes(filters))))
}

/// Combines multiple filters using logical NAND.
pub fn nand(filters: Vec<Filter>) -> Filter {
    Filter::from_node(QueryNode::Combinator(Combinator::Nand(into_nodes(filters))))
}

/// Combines multiple filters using logical NOR.
pub fn nor(filters: Vec<Filter>) -> Filter {
    Filter::from_node(QueryNode::Combinator(Combinator::Nor(into_nodes(filters))))
}

/// Negates a filter using logical NOT.
///
/// # Arguments
///
/// * `filter` - The filter to negate
///
/// # Returns
///
/// A `Filter` representing `NOT filter`
pub fn not(filter: Filter) -> Filter {
    Filter::from_node(QueryNode::Combinator(Combinator::Not(Box::new(
        filter.into_root(),
    ))))
}

fn into_nodes(filters: Vec<Filter>) -> Vec<QueryNode> {
    filters.into_iter().map(Filter::into_root).collect()
}
