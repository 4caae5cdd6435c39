/// Limits applied to a single filter parse.
///
/// Filter JSON often arrives from an untrusted request body, and the parser
/// recurses through combinators and $elemMatch operators. `ParseOptions`
/// bounds that recursion: `max_depth` caps the nesting level and `max_nodes`
/// caps the total number of AST nodes built. Exceeding either aborts the
/// parse with [crate::ErrorKind::LimitExceeded].
///
/// # Examples
///
/// ```rust,ignore
/// use strainer::{Filter, ParseOptions};
///
/// let options = ParseOptions::new().with_max_depth(8).with_max_nodes(256);
/// let filter = Filter::parse_str_with("{\"age\": {\"$gte\": 18}}", &options)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    max_depth: usize,
    max_nodes: usize,
}

impl ParseOptions {
    /// Default maximum nesting depth of a filter document.
    pub const DEFAULT_MAX_DEPTH: usize = 64;
    /// Default maximum number of AST nodes in one filter.
    pub const DEFAULT_MAX_NODES: usize = 10_000;

    /// Creates parse options with the default limits.
    pub fn new() -> Self {
        ParseOptions {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_nodes: Self::DEFAULT_MAX_NODES,
        }
    }

    /// Sets the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the maximum node count.
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Gets the maximum nesting depth.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Gets the maximum node count.
    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions::new()
    }
}
