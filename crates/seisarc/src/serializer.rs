//! Row serialization protocol
//!
//! A [`RowSerializer`] drives an object's `serialize` method in one of two
//! roles: *writer* (collects rendered SQL literals into attribute maps) or
//! *reader* (decodes the current cursor row into the object's fields). The
//! same attribute declarations serve both directions.
//!
//! Nested structs are flattened into columns through the attribute prefix
//! stack: pushing `creationInfo` and writing `agencyID` yields the column
//! `creationInfo_agencyID`. Nullable nested structs carry a companion
//! `name_used` flag column distinguishing "present with all-null fields"
//! from "absent". Timestamps declared with [`Hints::SPLIT_TIME`] store whole
//! seconds in the named column and microseconds in a `name_ms` companion.
//! Sub-table attributes ([`Hints::DB_TABLE`]) are written to their own table
//! and linked through a `name_oid` column; they are write-only, the reader
//! observes the link and leaves the attribute absent.

use num_complex::Complex64;
use tracing::{debug, error};

use seisarc_core::error::{Result, SeisarcError};
use seisarc_core::{AttributeMap, DbDriver, Hints, TimeValue};

pub(crate) const ATTRIBUTE_SEPARATOR: &str = "_";
const MICROSECONDS_POSTFIX: &str = "ms";
const OBJECT_USED_POSTFIX: &str = "used";
const CHILD_ID_POSTFIX: &str = "oid";
const PREFIX_STACK_CAPACITY: usize = 64;

/// Fixed-capacity stack of byte offsets into a growable name buffer.
///
/// Pushing appends `_name` without per-push allocation; popping truncates
/// back to the recorded offset. Exceeding the capacity is a programming
/// error in a `serialize` implementation and panics.
pub(crate) struct PrefixStack {
    buffer: String,
    offsets: [usize; PREFIX_STACK_CAPACITY],
    depth: usize,
}

impl PrefixStack {
    fn new() -> Self {
        Self {
            buffer: String::new(),
            offsets: [0; PREFIX_STACK_CAPACITY],
            depth: 0,
        }
    }

    pub(crate) fn push(&mut self, name: &str) {
        if self.depth >= PREFIX_STACK_CAPACITY {
            panic!(
                "attribute prefix stack overflow (more than {} elements)",
                PREFIX_STACK_CAPACITY
            );
        }
        self.offsets[self.depth] = self.buffer.len();
        self.depth += 1;

        if !self.buffer.is_empty() {
            self.buffer.push_str(ATTRIBUTE_SEPARATOR);
        }
        self.buffer.push_str(name);
    }

    pub(crate) fn pop(&mut self) {
        if self.depth == 0 {
            return;
        }
        self.depth -= 1;
        self.buffer.truncate(self.offsets[self.depth]);
    }

    pub(crate) fn current(&self) -> &str {
        &self.buffer
    }

    fn take_buffer(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    fn restore_buffer(&mut self, buffer: String) {
        self.buffer = buffer;
    }
}

struct ChildTable {
    table: &'static str,
    attributes: AttributeMap,
}

/// Completed writer-side pass: the row's attribute maps plus the validity
/// flag.
pub(crate) struct SerializedRow {
    pub root: AttributeMap,
    pub index: AttributeMap,
    pub valid: bool,
}

/// Serialization context handed to `ArchiveObject::serialize`.
pub struct RowSerializer<'a> {
    db: &'a mut dyn DbDriver,
    reading: bool,
    valid: bool,
    hints: Hints,
    /// When set, attributes tagged `INDEX_ATTRIBUTE` are diverted into the
    /// index map instead of the row map.
    ignore_index_attributes: bool,
    prefix: PrefixStack,
    current_name: String,
    current_field: Option<Vec<u8>>,
    root: AttributeMap,
    index: AttributeMap,
    child_stack: Vec<ChildTable>,
}

impl<'a> RowSerializer<'a> {
    pub(crate) fn writer(db: &'a mut dyn DbDriver, ignore_index_attributes: bool) -> Self {
        Self::new(db, false, ignore_index_attributes)
    }

    pub(crate) fn reader(db: &'a mut dyn DbDriver) -> Self {
        Self::new(db, true, false)
    }

    fn new(db: &'a mut dyn DbDriver, reading: bool, ignore_index_attributes: bool) -> Self {
        Self {
            db,
            reading,
            valid: true,
            hints: Hints::IGNORE_CHILDS,
            ignore_index_attributes,
            prefix: PrefixStack::new(),
            current_name: String::new(),
            current_field: None,
            root: AttributeMap::new(),
            index: AttributeMap::new(),
            child_stack: Vec::new(),
        }
    }

    pub fn is_reading(&self) -> bool {
        self.reading
    }

    pub fn hint(&self) -> Hints {
        self.hints
    }

    pub fn success(&self) -> bool {
        self.valid
    }

    pub fn escape(&self, input: &str) -> String {
        self.db.escape(input)
    }

    pub fn time_to_string(&self, time: &TimeValue) -> String {
        self.db.time_to_string(time)
    }

    pub fn string_to_time(&self, text: &str) -> Option<TimeValue> {
        self.db.string_to_time(text)
    }

    pub(crate) fn set_validity(&mut self, valid: bool) {
        if !valid {
            self.valid = false;
        }
    }

    pub(crate) fn into_row(self) -> SerializedRow {
        SerializedRow {
            root: self.root,
            index: self.index,
            valid: self.valid,
        }
    }

    /// Declare a mandatory scalar attribute.
    pub fn value<T: ArchiveValue>(&mut self, name: &str, value: &mut T, hints: Hints) -> Result<()> {
        let previous = self.install_hints(hints);
        self.set_current_name(name);

        if self.reading {
            self.read_attrib();
            match self.current_field.take() {
                Some(field) => match T::from_field(&field, self) {
                    Some(decoded) => *value = decoded,
                    None => {
                        error!(
                            "could not decode column '{}' from '{}'",
                            self.composed_name(),
                            String::from_utf8_lossy(&field)
                        );
                        self.set_validity(false);
                    }
                },
                None => match T::on_null() {
                    Some(decoded) => *value = decoded,
                    None => self.set_validity(false),
                },
            }
        } else {
            let rendered = value.to_sql(self);
            self.write_attrib(Some(rendered));
            value.write_companion(self);
        }

        self.hints = previous;
        Ok(())
    }

    /// Declare an optional scalar attribute; `None` maps to SQL NULL.
    pub fn optional<T: ArchiveValue>(
        &mut self,
        name: &str,
        value: &mut Option<T>,
        hints: Hints,
    ) -> Result<()> {
        let previous = self.install_hints(hints);
        self.set_current_name(name);

        if self.reading {
            self.read_attrib();
            match self.current_field.take() {
                Some(field) => match T::from_field(&field, self) {
                    Some(decoded) => *value = Some(decoded),
                    None => {
                        error!(
                            "could not decode column '{}' from '{}'",
                            self.composed_name(),
                            String::from_utf8_lossy(&field)
                        );
                        self.set_validity(false);
                        *value = None;
                    }
                },
                None => *value = None,
            }
        } else {
            match value {
                Some(inner) => {
                    let rendered = inner.to_sql(self);
                    self.write_attrib(Some(rendered));
                    inner.write_companion(self);
                }
                None => self.write_attrib(None),
            }
        }

        self.hints = previous;
        Ok(())
    }

    /// Declare a mandatory nested struct, flattened under `name_`.
    pub fn nested<S: NestedAttribute>(
        &mut self,
        name: &str,
        value: &mut S,
        hints: Hints,
    ) -> Result<()> {
        let previous = self.install_hints(hints | Hints::STATIC_TYPE);
        self.prefix.push(name);
        let result = value.serialize(self);
        self.prefix.pop();
        self.hints = previous;
        result
    }

    /// Declare a nullable nested struct with its `name_used` flag column.
    pub fn optional_nested<S: NestedAttribute + Default>(
        &mut self,
        name: &str,
        value: &mut Option<S>,
        hints: Hints,
    ) -> Result<()> {
        let previous = self.install_hints(hints | Hints::STATIC_TYPE);

        let result = if self.reading {
            self.prefix.push(name);
            self.set_current_name(OBJECT_USED_POSTFIX);
            self.read_attrib();
            let used = self
                .current_field
                .take()
                .map(|field| parse_bool(&field).unwrap_or(false))
                .unwrap_or(false);

            if used {
                let mut inner = S::default();
                let result = inner.serialize(self);
                *value = Some(inner);
                self.prefix.pop();
                result
            } else {
                *value = None;
                self.prefix.pop();
                Ok(())
            }
        } else {
            match value {
                Some(inner) => {
                    self.prefix.push(name);
                    self.set_current_name(OBJECT_USED_POSTFIX);
                    self.write_attrib(Some("'1'".to_string()));
                    let result = inner.serialize(self);
                    self.prefix.pop();
                    result
                }
                None => {
                    // Absent struct: only the flag column is written; the
                    // name_* columns stay NULL by omission.
                    self.current_name = format!(
                        "{}{}{}",
                        name, ATTRIBUTE_SEPARATOR, OBJECT_USED_POSTFIX
                    );
                    self.write_attrib(Some("'0'".to_string()));
                    Ok(())
                }
            }
        };

        self.hints = previous;
        result
    }

    /// Declare a sub-table attribute: the value is written to its own table
    /// and linked through a `name_oid` column.
    ///
    /// Sub-table attributes are write-only; the reader observes the link and
    /// yields `None`, which is why only `Option` values are accepted.
    pub fn sub_table<S: NestedAttribute>(
        &mut self,
        name: &str,
        value: &mut Option<S>,
        hints: Hints,
    ) -> Result<()> {
        let previous = self.install_hints(hints | Hints::STATIC_TYPE | Hints::DB_TABLE);

        let result = if self.reading {
            self.prefix.push(name);
            self.set_current_name(CHILD_ID_POSTFIX);
            self.read_attrib();
            if let Some(field) = self.current_field.take() {
                debug!(
                    "child table '{}' row {} not hydrated (write-only attribute)",
                    S::type_name(),
                    String::from_utf8_lossy(&field)
                );
            }
            *value = None;
            self.prefix.pop();
            Ok(())
        } else {
            match value {
                Some(inner) => self.write_child_table(name, inner),
                // An absent sub-table attribute writes nothing at all.
                None => Ok(()),
            }
        };

        self.hints = previous;
        result
    }

    fn write_child_table<S: NestedAttribute>(&mut self, name: &str, value: &mut S) -> Result<()> {
        self.prefix.push(name);
        self.child_stack.push(ChildTable {
            table: S::type_name(),
            attributes: AttributeMap::new(),
        });

        // Child-table columns are unprefixed; the pushed name only scopes
        // the back-link column.
        let saved_prefix = self.prefix.take_buffer();
        let result = value.serialize(self);
        self.prefix.restore_buffer(saved_prefix);

        let child = self.child_stack.pop().expect("child table frame");
        result?;

        let sql = format!(
            "insert into {}({}) values({})",
            child.table,
            child.attributes.columns(),
            child.attributes.values()
        );
        self.db
            .execute(&sql)
            .map_err(|e| SeisarcError::Serialization(e.to_string()))?;
        let child_oid = self.db.last_insert_id(child.table)?;

        self.set_current_name(CHILD_ID_POSTFIX);
        self.write_attrib(Some(child_oid.to_string()));
        self.prefix.pop();
        Ok(())
    }

    fn install_hints(&mut self, hints: Hints) -> Hints {
        std::mem::replace(&mut self.hints, hints | Hints::IGNORE_CHILDS)
    }

    fn set_current_name(&mut self, name: &str) {
        self.current_name.clear();
        self.current_name.push_str(name);
    }

    fn composed_name(&self) -> String {
        if self.prefix.current().is_empty() {
            self.current_name.clone()
        } else if self.current_name.is_empty() {
            self.prefix.current().to_string()
        } else {
            format!(
                "{}{}{}",
                self.prefix.current(),
                ATTRIBUTE_SEPARATOR,
                self.current_name
            )
        }
    }

    pub(crate) fn write_attrib(&mut self, value: Option<String>) {
        if self.prefix.current().is_empty() && self.current_name == "publicID" {
            // publicID lives in the PublicObject table, not the class table.
            return;
        }
        let column = self.db.convert_column_name(&self.composed_name());

        let map = if self.hints.contains(Hints::INDEX_ATTRIBUTE) && self.ignore_index_attributes {
            &mut self.index
        } else if let Some(child) = self.child_stack.last_mut() {
            &mut child.attributes
        } else {
            &mut self.root
        };
        map.set(column, value);
    }

    pub(crate) fn read_attrib(&mut self) {
        let column = self.db.convert_column_name(&self.composed_name());
        self.current_field = self
            .db
            .find_column(&column)
            .and_then(|index| self.db.row_field(index))
            .map(|field| field.to_vec());
    }

    /// Write a companion column named `current_ATTRIBUTE_SEPARATOR postfix`.
    pub(crate) fn write_companion_column(&mut self, postfix: &str, value: Option<String>) {
        let saved = self.current_name.clone();
        self.current_name.push_str(ATTRIBUTE_SEPARATOR);
        self.current_name.push_str(postfix);
        self.write_attrib(value);
        self.current_name = saved;
    }

    /// Read the companion column named after the current attribute.
    pub(crate) fn read_companion_column(&mut self, postfix: &str) -> Option<Vec<u8>> {
        let saved = self.current_name.clone();
        self.current_name.push_str(ATTRIBUTE_SEPARATOR);
        self.current_name.push_str(postfix);
        self.read_attrib();
        self.current_name = saved;
        self.current_field.take()
    }
}

/// Bool parsing accepted by the archive: numeric (non-zero is true) or the
/// usual textual spellings, case-insensitive.
pub(crate) fn parse_bool(field: &[u8]) -> Option<bool> {
    let text = std::str::from_utf8(field).ok()?.trim();
    if let Ok(numeric) = text.parse::<i64>() {
        return Some(numeric != 0);
    }
    match text.to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" => Some(true),
        "f" | "false" | "n" | "no" => Some(false),
        _ => None,
    }
}

fn parse_str<T: std::str::FromStr>(field: &[u8]) -> Option<T> {
    std::str::from_utf8(field).ok()?.trim().parse().ok()
}

/// A scalar attribute value the archive can store in one column (plus, for
/// split timestamps, a companion column).
pub trait ArchiveValue: Sized {
    /// Render as a SQL literal, quoted and escaped where necessary.
    fn to_sql(&self, ser: &mut RowSerializer<'_>) -> String;

    /// Write any companion column (split timestamps).
    fn write_companion(&self, _ser: &mut RowSerializer<'_>) {}

    /// Decode from the raw column bytes.
    fn from_field(field: &[u8], ser: &mut RowSerializer<'_>) -> Option<Self>;

    /// Value to use when the column is NULL or missing; `None` marks the
    /// object invalid.
    fn on_null() -> Option<Self> {
        None
    }
}

macro_rules! numeric_archive_value {
    ($($ty:ty),*) => {
        $(impl ArchiveValue for $ty {
            fn to_sql(&self, _ser: &mut RowSerializer<'_>) -> String {
                self.to_string()
            }

            fn from_field(field: &[u8], _ser: &mut RowSerializer<'_>) -> Option<Self> {
                parse_str(field)
            }
        })*
    };
}

numeric_archive_value!(i8, i16, i32, i64, f32, f64);

impl ArchiveValue for bool {
    fn to_sql(&self, _ser: &mut RowSerializer<'_>) -> String {
        if *self { "'1'".to_string() } else { "'0'".to_string() }
    }

    fn from_field(field: &[u8], _ser: &mut RowSerializer<'_>) -> Option<Self> {
        parse_bool(field)
    }
}

impl ArchiveValue for String {
    fn to_sql(&self, ser: &mut RowSerializer<'_>) -> String {
        format!("'{}'", ser.escape(self))
    }

    fn from_field(field: &[u8], _ser: &mut RowSerializer<'_>) -> Option<Self> {
        Some(String::from_utf8_lossy(field).into_owned())
    }

    fn on_null() -> Option<Self> {
        // A missing string column reads as empty, not as a hydration error;
        // joined queries do not expose every table's columns.
        Some(String::new())
    }
}

impl ArchiveValue for TimeValue {
    fn to_sql(&self, ser: &mut RowSerializer<'_>) -> String {
        format!("'{}'", ser.time_to_string(self))
    }

    fn write_companion(&self, ser: &mut RowSerializer<'_>) {
        if ser.hint().contains(Hints::SPLIT_TIME) {
            let micros = self.timestamp_subsec_micros();
            ser.write_companion_column(MICROSECONDS_POSTFIX, Some(micros.to_string()));
        }
    }

    fn from_field(field: &[u8], ser: &mut RowSerializer<'_>) -> Option<Self> {
        let text = std::str::from_utf8(field).ok()?;
        let mut time = ser.string_to_time(text)?;
        if ser.hint().contains(Hints::SPLIT_TIME) {
            if let Some(ms_field) = ser.read_companion_column(MICROSECONDS_POSTFIX) {
                if let Some(micros) = parse_str::<i64>(&ms_field) {
                    time = time + chrono::Duration::microseconds(micros);
                }
            }
        }
        Some(time)
    }
}

impl ArchiveValue for Complex64 {
    fn to_sql(&self, _ser: &mut RowSerializer<'_>) -> String {
        format!("'({},{})'", self.re, self.im)
    }

    fn from_field(field: &[u8], _ser: &mut RowSerializer<'_>) -> Option<Self> {
        let text = std::str::from_utf8(field).ok()?.trim();
        let inner = text.strip_prefix('(')?.strip_suffix(')')?;
        let (re, im) = inner.split_once(',')?;
        Some(Complex64::new(
            re.trim().parse().ok()?,
            im.trim().parse().ok()?,
        ))
    }
}

impl ArchiveValue for Vec<f64> {
    fn to_sql(&self, _ser: &mut RowSerializer<'_>) -> String {
        let rendered: Vec<String> = self.iter().map(|v| v.to_string()).collect();
        format!("'{}'", rendered.join(" "))
    }

    fn from_field(field: &[u8], _ser: &mut RowSerializer<'_>) -> Option<Self> {
        let text = std::str::from_utf8(field).ok()?;
        text.split_whitespace()
            .map(|part| part.parse().ok())
            .collect()
    }
}

/// A statically known struct flattened into its parent's row (or, with
/// [`Hints::DB_TABLE`], into its own table).
pub trait NestedAttribute {
    /// Type name, used as the table name for sub-table storage.
    fn type_name() -> &'static str
    where
        Self: Sized;

    fn serialize(&mut self, ser: &mut RowSerializer<'_>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_stack_composition() {
        let mut stack = PrefixStack::new();
        stack.push("a");
        stack.push("b");
        stack.push("c");
        assert_eq!(stack.current(), "a_b_c");
        stack.pop();
        assert_eq!(stack.current(), "a_b");
        stack.pop();
        stack.pop();
        assert_eq!(stack.current(), "");
        // popping an empty stack is harmless
        stack.pop();
        assert_eq!(stack.current(), "");
    }

    #[test]
    #[should_panic(expected = "attribute prefix stack overflow")]
    fn test_prefix_stack_overflow() {
        let mut stack = PrefixStack::new();
        for _ in 0..65 {
            stack.push("deep");
        }
    }

    #[test]
    fn test_parse_bool_spellings() {
        assert_eq!(parse_bool(b"1"), Some(true));
        assert_eq!(parse_bool(b"0"), Some(false));
        assert_eq!(parse_bool(b"42"), Some(true));
        assert_eq!(parse_bool(b"TRUE"), Some(true));
        assert_eq!(parse_bool(b"no"), Some(false));
        assert_eq!(parse_bool(b"y"), Some(true));
        assert_eq!(parse_bool(b"maybe"), None);
    }
}
