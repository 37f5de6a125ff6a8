//! Parsing of individual query keys (`name`, `name=>alias`, `name?=>`, `=>alias`).

/// Invokes the level's member with the given argument array.
pub const PARAMS_KEY: &str = "()";
/// Replaces the level's resolved value with a literal.
pub const SOURCE_VALUE_KEY: &str = "<=";
/// Separates the source member from the result field name.
pub const SEPARATOR: &str = "=>";
/// Marks the source member as optional.
pub const OPTIONAL_SUFFIX: char = '?';

/// Where a sub-expression's result goes in the parent's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKey {
    /// Stored under this field name.
    Named(String),
    /// Replaces the parent's slot unwrapped.
    PassThrough,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    pub source_key: String,
    pub is_optional: bool,
    pub target: TargetKey,
}

/// Splits a key into its source, optionality and target parts.
///
/// Returns `None` if the key contains more than one separator.
pub fn parse_key(key: &str) -> Option<ParsedKey> {
    let (source, target) = match key.split_once(SEPARATOR) {
        None => (key, None),
        Some((_, rest)) if rest.contains(SEPARATOR) => return None,
        Some((source, target)) => (source, Some(target)),
    };

    let (source_key, is_optional) = match source.strip_suffix(OPTIONAL_SUFFIX) {
        Some(stripped) => (stripped, true),
        None => (source, false),
    };

    let target_name = target.unwrap_or(source_key);
    let target = if target_name.is_empty() {
        TargetKey::PassThrough
    } else {
        TargetKey::Named(target_name.to_string())
    };

    Some(ParsedKey {
        source_key: source_key.to_string(),
        is_optional,
        target,
    })
}
