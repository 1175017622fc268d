use crate::domain::entities::value::Value;

/// Result of following a relation from a row.
pub enum Related<'a> {
    /// The relation exists but points at nothing.
    Null,
    Row(&'a dyn Row),
}

/// Capabilities a record exposes to column rendering.
///
/// Only [`Row::field`] is required; the rest default to "not supported" and
/// are probed in a fixed order by the renderer.
pub trait Row {
    /// Human readable label for an enumerated field, e.g. `"Active"` for a
    /// stored status code.
    fn display_label(&self, _column: &str) -> Option<String> {
        None
    }

    /// Direct attribute access. `None` means the row has no such field.
    fn field(&self, name: &str) -> Option<Value>;

    /// Related row reachable by `name`, used to walk dotted paths.
    fn related(&self, _name: &str) -> Option<Related<'_>> {
        None
    }

    /// Walks a dotted path through related rows, yielding `Null` as soon as a
    /// link is missing or empty.
    fn path(&self, path: &str) -> Value {
        match path.split_once('.') {
            None => self.field(path).unwrap_or(Value::Null),
            Some((head, rest)) => match self.related(head) {
                Some(Related::Row(next)) => next.path(rest),
                Some(Related::Null) | None => Value::Null,
            },
        }
    }

    /// Link target for the row; when present every rendered cell of the row
    /// becomes an anchor to it.
    fn canonical_url(&self) -> Option<String> {
        None
    }
}
