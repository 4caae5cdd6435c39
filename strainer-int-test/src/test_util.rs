use strainer::{ErrorKind, Filter};

#[ctor::ctor]
fn init() {
    colog::init();
}

/// Parses a filter from JSON text, panicking with the error chain on failure.
pub fn parse_filter(text: &str) -> Filter {
    match Filter::parse_str(text) {
        Ok(filter) => filter,
        Err(e) => panic!("filter {} should parse: {:?}", text, e),
    }
}

/// Asserts that parsing the given JSON text fails with the expected error kind.
pub fn assert_parse_fails(text: &str, expected: ErrorKind) {
    match Filter::parse_str(text) {
        Ok(filter) => panic!("filter {} should not parse, got {}", text, filter),
        Err(e) => assert_eq!(
            e.kind(),
            &expected,
            "filter {} failed with message: {}",
            text,
            e.message()
        ),
    }
}
