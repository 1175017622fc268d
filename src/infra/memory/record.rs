use std::collections::BTreeMap;

use crate::domain::entities::value::Value;
use crate::usecase::ports::row::{Related, Row};

/// A schemaless row: named fields, optional display labels, nested related
/// records and an optional canonical URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
    labels: BTreeMap<String, String>,
    related: BTreeMap<String, Option<Record>>,
    url: Option<String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_label(mut self, column: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(column.into(), label.into());
        self
    }

    /// `None` models a relation that exists but is empty.
    pub fn with_related(mut self, name: impl Into<String>, record: Option<Record>) -> Self {
        self.related.insert(name.into(), record);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn set_label(&mut self, column: impl Into<String>, label: impl Into<String>) {
        self.labels.insert(column.into(), label.into());
    }

    pub fn set_url(&mut self, url: Option<String>) {
        self.url = url;
    }

    /// Stores `value` under a nested path, creating related records on the
    /// way.
    pub fn set_path(&mut self, segments: &[&str], value: Value) {
        match segments {
            [] => {}
            [name] => self.set_field(*name, value),
            [head, rest @ ..] => self
                .related
                .entry((*head).to_string())
                .or_insert_with(|| Some(Record::new()))
                .get_or_insert_with(Record::new)
                .set_path(rest, value),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

impl Row for Record {
    fn display_label(&self, column: &str) -> Option<String> {
        self.labels.get(column).cloned()
    }

    fn field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }

    fn related(&self, name: &str) -> Option<Related<'_>> {
        self.related.get(name).map(|record| match record {
            Some(record) => Related::Row(record),
            None => Related::Null,
        })
    }

    fn canonical_url(&self) -> Option<String> {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_path_builds_nested_records() {
        let mut record = Record::new();
        record.set_path(&["author", "name"], Value::from("Ursula"));
        record.set_path(&["author", "country", "code"], Value::from("US"));

        assert_eq!(record.path("author.name"), Value::from("Ursula"));
        assert_eq!(record.path("author.country.code"), Value::from("US"));
        assert_eq!(record.path("author.missing"), Value::Null);
    }

    #[test]
    fn empty_relation_yields_null() {
        let record = Record::new().with_related("editor", None);
        assert_eq!(record.path("editor.name"), Value::Null);
    }
}
