//! Record type descriptors.
//!
//! A `RecordType` is the immutable schema shared by every record of a record set:
//! the ordered field names, an identifier-safe alias per field and one lookup table
//! resolving both spellings to a position. Field access never re-resolves names at
//! scan time; scanners and calculations resolve a position once at construction.

use crate::error::{Error, Result};
use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use hashbrown::HashMap;

/// Shared handle to a record type.
pub type SchemaRef = Rc<RecordType>;

/// An ordered, non-empty list of field names.
#[derive(Clone)]
pub struct RecordType {
    fields: Vec<String>,
    aliases: Vec<String>,
    lookup: HashMap<String, usize>,
}

impl RecordType {
    /// Creates a record type from field names.
    ///
    /// Fails if the list is empty, if a name is empty, or if a name repeats.
    pub fn new<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(Error::invalid_schema("a record type needs at least one field"));
        }

        let mut lookup = HashMap::with_capacity(fields.len() * 2);
        for (index, name) in fields.iter().enumerate() {
            if name.is_empty() {
                return Err(Error::invalid_schema(format!("field {} has an empty name", index)));
            }
            if lookup.insert(name.clone(), index).is_some() {
                return Err(Error::invalid_schema(format!("duplicate field \"{}\"", name)));
            }
        }

        let mut aliases: Vec<String> = Vec::with_capacity(fields.len());
        for (index, name) in fields.iter().enumerate() {
            let base = sanitize(name);
            let mut alias = base.clone();
            let mut suffix = 1;
            while aliases.contains(&alias) || lookup.get(&alias).is_some_and(|at| *at != index) {
                alias = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            // Aliases skip the raw names of other fields.
            lookup.entry(alias.clone()).or_insert(index);
            aliases.push(alias);
        }

        Ok(Self {
            fields,
            aliases,
            lookup,
        })
    }

    /// Creates a shared record type.
    pub fn shared<I, S>(fields: I) -> Result<SchemaRef>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(fields).map(Rc::new)
    }

    /// Returns the number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false; a record type has at least one field.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the raw field names in order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns the field name at a position.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Returns the identifier-safe aliases in field order.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Resolves a raw or sanitized field name to its position.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    /// Resolves a field name, failing with `ColumnNotFound`.
    pub fn resolve(&self, name: &str) -> Result<usize> {
        self.index_of(name)
            .ok_or_else(|| Error::column_not_found(name))
    }

    /// Bounds-checks a numeric field position.
    pub fn position(&self, index: usize) -> Result<usize> {
        if index < self.fields.len() {
            Ok(index)
        } else {
            Err(Error::column_not_found(index.to_string()))
        }
    }

    /// Returns true if the name resolves to a field.
    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// Joins the raw field names with ", ".
    pub fn describe(&self) -> String {
        self.fields.join(", ")
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for RecordType {}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordType").field(&self.fields).finish()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.describe())
    }
}

/// Replaces characters outside `[A-Za-z0-9_]` and prefixes a leading digit with `C`.
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.push('C');
    }
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_new_and_lookup() {
        let rt = RecordType::new(["a", "b", "c"]).unwrap();
        assert_eq!(rt.len(), 3);
        assert_eq!(rt.index_of("b"), Some(1));
        assert_eq!(rt.index_of("z"), None);
        assert_eq!(rt.field(2), Some("c"));
        assert_eq!(rt.describe(), "a, b, c");
    }

    #[test]
    fn test_empty_and_duplicate_fields_rejected() {
        assert!(matches!(
            RecordType::new(Vec::<String>::new()),
            Err(Error::InvalidSchema { .. })
        ));
        assert!(RecordType::new(["a", "a"]).is_err());
        assert!(RecordType::new(["a", ""]).is_err());
    }

    #[test]
    fn test_sanitized_aliases() {
        let rt = RecordType::new(["first name", "2nd", "x-y", "x_y"]).unwrap();
        assert_eq!(
            rt.aliases(),
            &[
                String::from("first_name"),
                String::from("C2nd"),
                String::from("x_y_1"),
                String::from("x_y"),
            ]
        );
        assert_eq!(rt.index_of("first name"), Some(0));
        assert_eq!(rt.index_of("first_name"), Some(0));
        assert_eq!(rt.index_of("C2nd"), Some(1));
        assert_eq!(rt.index_of("x_y"), Some(3));
        assert_eq!(rt.index_of("x-y"), Some(2));
        assert_eq!(rt.index_of("x_y_1"), Some(2));
    }

    #[test]
    fn test_alias_never_names_another_field() {
        let rt = RecordType::new(["a b", "a_b"]).unwrap();
        assert_eq!(rt.aliases(), &[String::from("a_b_1"), String::from("a_b")]);
        for (index, alias) in rt.aliases().iter().enumerate() {
            assert_eq!(rt.index_of(alias), Some(index));
        }
    }

    #[test]
    fn test_resolve_and_position() {
        let rt = RecordType::new(vec!["a", "b"]).unwrap();
        assert_eq!(rt.resolve("a").unwrap(), 0);
        assert_eq!(rt.resolve("q"), Err(Error::column_not_found("q")));
        assert_eq!(rt.position(1).unwrap(), 1);
        assert!(rt.position(2).is_err());
    }

    #[test]
    fn test_equality_by_fields() {
        let a = RecordType::new(["a", "b"]).unwrap();
        let b = RecordType::new(["a", "b"]).unwrap();
        let c = RecordType::new(["b", "a"]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("a.b"), "a_b");
        assert_eq!(sanitize("9lives"), "C9lives");
        assert_eq!(sanitize("ok_1"), "ok_1");
    }
}
