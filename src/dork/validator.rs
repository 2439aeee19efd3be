/// Operators a dork must use at least one of.
pub const REQUIRED_OPERATORS: [&str; 3] = ["site:", "intext:", "intitle:"];

/// Marker that excludes the brand's legitimate domain.
pub const EXCLUSION_MARKER: &str = "-site:";

/// A query is executable when it carries a content/title/site operator and an exclusion clause.
pub fn is_valid(query: &str) -> bool {
    REQUIRED_OPERATORS.iter().any(|op| query.contains(op)) && query.contains(EXCLUSION_MARKER)
}
