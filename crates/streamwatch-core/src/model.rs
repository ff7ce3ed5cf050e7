use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Number(Decimal),
    Text(String),
    Date(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric value, only for `Number` cells.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Number(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Name of the variant, used in coercion error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Number(d) => write!(f, "{}", d.normalize()),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
        }
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Number(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Self {
        Value::Date(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// One observation: an ordered mapping of field name to value.
///
/// `row` is the 1-based row number in the source sheet (the header is row 1),
/// kept through every stage so failures can point back at the spreadsheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    row: usize,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(row: usize) -> Self {
        Record {
            row,
            fields: Vec::new(),
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == field).map(|(_, v)| v)
    }

    /// Replace the value of an existing field or append a new one.
    pub fn set(&mut self, field: &str, value: Value) {
        match self.fields.iter_mut().find(|(k, _)| k == field) {
            Some((_, v)) => *v = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        let idx = self.fields.iter().position(|(k, _)| k == field)?;
        Some(self.fields.remove(idx).1)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn rename(&mut self, from: &str, to: &str) {
        if let Some((k, _)) = self.fields.iter_mut().find(|(k, _)| k == from) {
            *k = to.to_string();
        }
    }

    fn retain_fields(&mut self, keep: impl Fn(&str) -> bool) {
        self.fields.retain(|(k, _)| keep(k));
    }
}

/// An ordered table of records sharing one set of columns.
///
/// Every record carries exactly the dataset's columns, in column order. Schema
/// changes go through the `Dataset` methods so that stays true.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub name: String,
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Dataset {
            name: name.into(),
            columns,
            records: Vec::new(),
        }
    }

    /// Append a row; values are matched to columns by position and missing
    /// trailing values are filled with `Null`.
    pub fn push_row(&mut self, row: usize, values: Vec<Value>) {
        let mut record = Record::new(row);
        let mut values = values.into_iter();
        for column in &self.columns {
            record.set(column, values.next().unwrap_or_default());
        }
        self.records.push(record);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<(), crate::error::StreamwatchError> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(crate::error::StreamwatchError::MissingField {
                field: name.to_string(),
            })
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Mutable access to records for value rewrites. Callers must only `set`
    /// fields that are already columns (see [`Dataset::ensure_column`]).
    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Add a column filled with `Null` if it does not exist yet.
    pub fn ensure_column(&mut self, name: &str) {
        if self.has_column(name) {
            return;
        }
        self.columns.push(name.to_string());
        for record in &mut self.records {
            record.set(name, Value::Null);
        }
    }

    /// Rename a column in place. If `to` already exists it is replaced.
    pub fn rename_column(&mut self, from: &str, to: &str) {
        if from == to || !self.has_column(from) {
            return;
        }
        if self.has_column(to) {
            self.drop_column(to);
        }
        for column in &mut self.columns {
            if column == from {
                *column = to.to_string();
            }
        }
        for record in &mut self.records {
            record.rename(from, to);
        }
    }

    pub fn drop_column(&mut self, name: &str) {
        self.columns.retain(|c| c != name);
        for record in &mut self.records {
            record.remove(name);
        }
    }

    /// Keep only the named columns, preserving dataset order.
    pub fn retain_columns(&mut self, keep: &[String]) {
        self.columns.retain(|c| keep.contains(c));
        for record in &mut self.records {
            record.retain_fields(|k| keep.iter().any(|c| c == k));
        }
    }

    pub fn retain_records(&mut self, keep: impl FnMut(&Record) -> bool) {
        self.records.retain(keep);
    }

    /// Rebuild from already-aligned records; used by stages that drop rows.
    pub(crate) fn with_records(&self, records: Vec<Record>) -> Dataset {
        Dataset {
            name: self.name.clone(),
            columns: self.columns.clone(),
            records,
        }
    }
}
