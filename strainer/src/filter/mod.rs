//! The search filter compiler: JSON query expressions in, typed AST out.
//!
//! A filter is a MongoDB-style JSON object combining field-level conditional
//! operators with boolean combinators. This module compiles one such object
//! into an immutable [Filter] tree that a query execution engine can walk.
//!
//! # Compiling filters
//!
//! ```rust,ignore
//! use strainer::Filter;
//!
//! // {"age" >= 18} OR {"country" == "US" AND "verified" == true}
//! let filter = Filter::parse_str(
//!     r#"{"$or": [{"age": {"$gte": 18}}, {"country": "US", "verified": true}]}"#,
//! )?;
//! ```
//!
//! Filters can also be built programmatically with the fluent API:
//!
//! ```rust,ignore
//! use strainer::{field, or};
//!
//! let filter = or(vec![
//!     field("age").gte(18),
//!     field("country").eq("US").and(field("verified").eq(true)),
//! ]);
//! ```
//!
//! # Supported operators
//!
//! - **Equality**: `$eq`, `$ne` (a bare scalar is shorthand for `$eq`)
//! - **Comparison**: `$lt`, `$lte`, `$gt`, `$gte`
//! - **Membership**: `$in`, `$nin`
//! - **Text**: `$begins`, `$contains`, `$ends`
//! - **Arithmetic**: `$mod`
//! - **Array**: `$elemMatch`
//! - **Combinators**: `$and`, `$or`, `$nand`, `$nor`, `$not`

mod combinators;
mod filter;
mod fluent;
mod operators;
mod options;
mod selector;

pub use combinators::*;
pub use filter::*;
pub use fluent::*;
pub use operators::*;
pub use options::*;
pub use selector::*;
