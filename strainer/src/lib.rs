//! # Strainer - Search Filter Compiler
//!
//! Strainer compiles declarative, MongoDB-style JSON query expressions into
//! an immutable, strongly-typed abstract syntax tree of boolean combinators
//! and field-level conditional operators, with on-the-fly literal type
//! inference (number, text, date, time, timestamp, UUID, boolean, null).
//!
//! The compiled [Filter] is an in-process value meant to be handed to a
//! query execution engine; this crate does not execute queries, map columns
//! to storage, or coerce types against an actual schema.
//!
//! ## Key Features
//!
//! - **Declarative input**: one JSON object describes the whole query tree
//! - **Typed literals**: string literals are classified as timestamps,
//!   dates, times, UUIDs, or plain text by probing grammars in order of
//!   specificity
//! - **Closed AST**: combinator, operator, and literal kinds are exhaustive
//!   enums, so a missing case is a compile error rather than a runtime
//!   surprise
//! - **Construction-time validation**: comparison operands, `$in`
//!   homogeneity, and `$mod` arity are checked while the filter is compiled
//! - **Fluent API**: filters can also be built programmatically with
//!   [field] and the combinator helpers
//! - **Bounded parsing**: [ParseOptions] caps nesting depth and node count
//!   for filters arriving from untrusted sources
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use strainer::{Filter, QueryNode};
//!
//! # fn main() -> strainer::FilterResult<()> {
//! let filter = Filter::parse_str(
//!     r#"{"$or": [{"age": {"$gte": 18}}, {"country": "US", "verified": true}]}"#,
//! )?;
//!
//! match filter.root() {
//!     QueryNode::Selector(selector) => println!("field {}", selector.field_name()),
//!     QueryNode::Combinator(combinator) => println!("{:?}", combinator.kind()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`common`] - The literal model and small shared utilities
//! - [`errors`] - Error types and result definitions
//! - [`filter`] - The AST, the parsers, and the fluent builder

use crate::common::*;

pub mod common;
pub mod errors;
pub mod filter;

pub use common::value::{ComparisonValue, Literal, Number, ValueType};
pub use errors::{ErrorKind, FilterError, FilterResult};
pub use filter::{
    and, field, nand, nor, not, or, Combinator, CombinatorKind, ConditionalOperator, Filter,
    FluentFilter, OperatorKind, ParseOptions, QueryNode, Selector,
};
