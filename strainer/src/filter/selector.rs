use std::fmt::{Display, Formatter};

use itertools::Itertools;

use super::operators::ConditionalOperator;

/// A leaf query node binding one field name to one conditional operator.
///
/// Field-name semantics (existence, dotted-path resolution, case sensitivity
/// against an actual schema) are deferred entirely to the query execution
/// engine; a selector only records the name as written in the filter JSON.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selector {
    field_name: String,
    operator: ConditionalOperator,
}

impl Selector {
    /// Creates a selector applying the given operator to the given field.
    ///
    /// # Arguments
    ///
    /// * `field_name` - Name of the field the selector applies to
    /// * `operator` - The conditional operator applied to the field
    pub fn new(field_name: &str, operator: ConditionalOperator) -> Self {
        Selector {
            field_name: field_name.to_string(),
            operator,
        }
    }

    /// Gets the name of the field this selector applies to.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Gets the conditional operator applied to the field.
    pub fn operator(&self) -> &ConditionalOperator {
        &self.operator
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.operator {
            ConditionalOperator::Equals(value) => {
                write!(f, "({} == {})", self.field_name, value)
            }
            ConditionalOperator::NotEquals(value) => {
                write!(f, "({} != {})", self.field_name, value)
            }
            ConditionalOperator::LessThan(value) => {
                write!(f, "({} < {})", self.field_name, value)
            }
            ConditionalOperator::LessThanOrEquals(value) => {
                write!(f, "({} <= {})", self.field_name, value)
            }
            ConditionalOperator::GreaterThan(value) => {
                write!(f, "({} > {})", self.field_name, value)
            }
            ConditionalOperator::GreaterThanOrEquals(value) => {
                write!(f, "({} >= {})", self.field_name, value)
            }
            ConditionalOperator::In(values) => {
                write!(f, "({} in [{}])", self.field_name, values.iter().join(", "))
            }
            ConditionalOperator::NotIn(values) => write!(
                f,
                "({} not in [{}])",
                self.field_name,
                values.iter().join(", ")
            ),
            ConditionalOperator::Begins(text) => {
                write!(f, "({} begins \"{}\")", self.field_name, text)
            }
            ConditionalOperator::Contains(text) => {
                write!(f, "({} contains \"{}\")", self.field_name, text)
            }
            ConditionalOperator::Ends(text) => {
                write!(f, "({} ends \"{}\")", self.field_name, text)
            }
            ConditionalOperator::Modulo { divisor, remainder } => {
                write!(f, "({} % {} == {})", self.field_name, divisor, remainder)
            }
            ConditionalOperator::ElemMatch(filter) => {
                write!(f, "({} elem_match {})", self.field_name, filter)
            }
        }
    }
}
