use std::fmt::Write as _;

/// Insertion-ordered mapping from column name to optional SQL literal.
///
/// An absent value renders as the literal `NULL` in value lists and as
/// `is null` in filter fragments. Values are stored fully rendered (quoted
/// and escaped where necessary) so the renderers below only join them.
#[derive(Debug, Clone, Default)]
pub struct AttributeMap {
    entries: Vec<(String, Option<String>)>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value for `column`, keeping first-insertion
    /// order.
    pub fn set(&mut self, column: impl Into<String>, value: Option<String>) {
        let column = column.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Option<String>> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Comma-joined column list for an INSERT statement.
    pub fn columns(&self) -> String {
        let names: Vec<&str> = self.entries.iter().map(|(name, _)| name.as_str()).collect();
        names.join(",")
    }

    /// Comma-joined value list matching [`AttributeMap::columns`].
    pub fn values(&self) -> String {
        let mut out = String::new();
        for (i, (_, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(value.as_deref().unwrap_or("NULL"));
        }
        out
    }

    /// `col=value` assignments for an UPDATE statement.
    pub fn assignments(&self) -> String {
        let mut out = String::new();
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "{}={}", name, value.as_deref().unwrap_or("NULL"));
        }
        out
    }

    /// `col=value and …` filter; absent values render as `col is null`.
    pub fn filter(&self) -> String {
        let mut out = String::new();
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push_str(" and ");
            }
            match value {
                Some(value) => {
                    let _ = write!(out, "{}={}", name, value);
                }
                None => {
                    let _ = write!(out, "{} is null", name);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let mut map = AttributeMap::new();
        map.set("zeta", Some("1".into()));
        map.set("alpha", Some("2".into()));
        map.set("mid", None);
        assert_eq!(map.columns(), "zeta,alpha,mid");
        assert_eq!(map.values(), "1,2,NULL");
    }

    #[test]
    fn test_upsert_keeps_position() {
        let mut map = AttributeMap::new();
        map.set("a", Some("1".into()));
        map.set("b", Some("2".into()));
        map.set("a", Some("3".into()));
        assert_eq!(map.len(), 2);
        assert_eq!(map.columns(), "a,b");
        assert_eq!(map.values(), "3,2");
    }

    #[test]
    fn test_filter_renders_is_null() {
        let mut map = AttributeMap::new();
        map.set("id", Some("'x'".into()));
        map.set("uncertainty", None);
        assert_eq!(map.filter(), "id='x' and uncertainty is null");
    }

    #[test]
    fn test_assignments() {
        let mut map = AttributeMap::new();
        map.set("text", Some("'hi'".into()));
        map.set("author", None);
        assert_eq!(map.assignments(), "text='hi',author=NULL");
    }
}
