//! Type and endpoint naming rules.
//!
//! Every generated collection name is `prefix + PascalCase(source name)`;
//! the prefix namespaces synced types away from host-defined ones. A single
//! `TypeNamer` is threaded through the whole pipeline so content types,
//! relation targets, components, and zone unions all agree on names.

/// Derives collection, union, and query-field names from source identifiers.
#[derive(Debug, Clone)]
pub struct TypeNamer {
    prefix: String,
}

impl TypeNamer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Collection type name for a source identifier (api id or component uid).
    pub fn type_name(&self, source_name: &str) -> String {
        format!("{}{}", self.prefix, pascal_case(source_name))
    }

    /// The shared media collection name.
    pub fn media_type_name(&self) -> String {
        self.type_name("image")
    }

    /// Union type name for a dynamic zone field on a content type.
    pub fn union_name(&self, api_id: &str, field: &str) -> String {
        self.type_name(&format!("{} {}", api_id, field))
    }

    /// Root query field for a singleton collection.
    pub fn query_field(&self, type_name: &str) -> String {
        camel_case(type_name)
    }
}

/// Uppercase each word boundary; word separators are any non-alphanumeric
/// characters, so `"sections.hero"` and `"home-page"` both normalize.
pub fn pascal_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_boundary = true;

    for c in input.chars() {
        if !c.is_alphanumeric() {
            at_boundary = true;
            continue;
        }
        if at_boundary {
            out.extend(c.to_uppercase());
            at_boundary = false;
        } else {
            out.push(c);
        }
    }

    out
}

/// Pascal-case with a lowercased leading character.
pub fn camel_case(input: &str) -> String {
    let pascal = pascal_case(input);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => pascal,
    }
}

/// Naive English pluralization for collection entry endpoints.
pub fn pluralize(word: &str) -> String {
    let lower = word.to_lowercase();

    if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        return format!("{}es", word);
    }

    if lower.ends_with('y') {
        let stem: String = word.chars().take(word.chars().count() - 1).collect();
        let before_y = lower.chars().rev().nth(1);
        if !matches!(before_y, Some('a' | 'e' | 'i' | 'o' | 'u')) {
            return format!("{}ies", stem);
        }
    }

    format!("{}s", word)
}
