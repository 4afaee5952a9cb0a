//! Inline `style` attribute merging.
//!
//! An inline style is treated as an ordered map from CSS property name to
//! value. Existing declarations keep their position when overwritten; new
//! properties are appended in the order they are supplied. Property names
//! supplied by callers may be camelCase (`backgroundColor`) and are
//! converted to kebab-case before merging.

use std::fmt;

use indexmap::IndexMap;

/// Ordered set of CSS declarations parsed from or destined for a `style`
/// attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDeclarations {
    declarations: IndexMap<String, String>,
}

impl StyleDeclarations {
    /// Parse a `style` attribute value.
    ///
    /// Declarations are split on `;`, then on the first `:`. Entries with
    /// an empty property or value are dropped. A repeated property keeps
    /// its first position but takes the last value.
    pub fn parse(style: &str) -> Self {
        let mut declarations = IndexMap::new();
        for declaration in style.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            let (property, value) = (property.trim(), value.trim());
            if property.is_empty() || value.is_empty() {
                continue;
            }
            declarations.insert(property.to_owned(), value.to_owned());
        }
        Self { declarations }
    }

    /// Insert or overwrite declarations, converting each name to kebab-case.
    pub fn apply<K, V>(&mut self, updates: impl IntoIterator<Item = (K, V)>)
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in updates {
            self.declarations
                .insert(to_kebab_case(name.as_ref()), value.into());
        }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations.get(property).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl fmt::Display for StyleDeclarations {
    /// Writes `property: value; ` for every declaration, trailing space included.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (property, value) in &self.declarations {
            write!(f, "{property}: {value}; ")?;
        }
        Ok(())
    }
}

/// Convert a camelCase property name to kebab-case.
///
/// A hyphen goes before every ASCII uppercase letter and the whole result is
/// lower-cased, so `backgroundColor` becomes `background-color` and an
/// already kebab-cased name passes through unchanged.
pub fn to_kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
        }
        out.push(c);
    }
    out.to_lowercase()
}

/// Build a fresh `style` value from supplied declarations only.
pub fn build_style<K, V>(updates: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: Into<String>,
{
    let mut styles = StyleDeclarations::default();
    styles.apply(updates);
    styles.to_string()
}

/// Merge supplied declarations into an existing `style` value.
pub fn merge_style<K, V>(existing: &str, updates: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: Into<String>,
{
    let mut styles = StyleDeclarations::parse(existing);
    styles.apply(updates);
    styles.to_string()
}
