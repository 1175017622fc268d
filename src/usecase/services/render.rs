use crate::domain::entities::config::ColumnSpec;
use crate::domain::entities::value::Value;
use crate::usecase::ports::row::Row;

/// Renders one cell.
///
/// Probes the row's display label, then the direct field, then the dotted
/// path. Rows with a canonical URL get every cell wrapped in a link.
pub fn render_column<R: Row + ?Sized>(row: &R, column: &ColumnSpec) -> Value {
    let name = column.as_str();
    let value = match row.display_label(name) {
        Some(label) => Value::Text(label),
        None => match row.field(name) {
            Some(value) => value,
            None => row.path(name),
        },
    };

    match row.canonical_url() {
        Some(url) => Value::Text(link(&url, &value)),
        None => value,
    }
}

fn link(url: &str, text: &Value) -> String {
    format!(
        "<a href=\"{}\">{}</a>",
        escape_html(url),
        escape_html(&text.to_string())
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::ports::row::Related;

    struct Author {
        name: &'static str,
    }

    impl Row for Author {
        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "name" => Some(Value::from(self.name)),
                _ => None,
            }
        }
    }

    struct Book {
        title: &'static str,
        status: i64,
        author: Option<Author>,
        url: Option<&'static str>,
    }

    impl Row for Book {
        fn display_label(&self, column: &str) -> Option<String> {
            match (column, self.status) {
                ("status", 0) => Some("Draft".to_string()),
                ("status", _) => Some("Published".to_string()),
                _ => None,
            }
        }

        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "title" => Some(Value::from(self.title)),
                "status" => Some(Value::Integer(self.status)),
                _ => None,
            }
        }

        fn related(&self, name: &str) -> Option<Related<'_>> {
            match name {
                "author" => Some(match &self.author {
                    Some(author) => Related::Row(author),
                    None => Related::Null,
                }),
                _ => None,
            }
        }

        fn canonical_url(&self) -> Option<String> {
            self.url.map(str::to_string)
        }
    }

    fn book() -> Book {
        Book {
            title: "Dune",
            status: 1,
            author: Some(Author {
                name: "Frank Herbert",
            }),
            url: None,
        }
    }

    #[test]
    fn display_label_wins_over_same_named_field() {
        let rendered = render_column(&book(), &ColumnSpec::from("status"));
        assert_eq!(rendered, Value::from("Published"));
    }

    #[test]
    fn direct_field_renders_raw_value() {
        assert_eq!(
            render_column(&book(), &ColumnSpec::from("title")),
            Value::from("Dune")
        );
    }

    #[test]
    fn dotted_path_walks_related_rows() {
        assert_eq!(
            render_column(&book(), &ColumnSpec::from("author.name")),
            Value::from("Frank Herbert")
        );
    }

    #[test]
    fn dotted_path_through_null_link_renders_empty() {
        let orphan = Book {
            author: None,
            ..book()
        };
        assert_eq!(
            render_column(&orphan, &ColumnSpec::from("author.name")),
            Value::Null
        );
        assert_eq!(
            render_column(&orphan, &ColumnSpec::from("publisher.name")),
            Value::Null
        );
    }

    #[test]
    fn canonical_url_wraps_every_column() {
        let linked = Book {
            title: "Tom & Jerry",
            url: Some("/books/7/"),
            ..book()
        };
        assert_eq!(
            render_column(&linked, &ColumnSpec::from("title")),
            Value::from("<a href=\"/books/7/\">Tom &amp; Jerry</a>")
        );
        assert_eq!(
            render_column(&linked, &ColumnSpec::from("author.name")),
            Value::from("<a href=\"/books/7/\">Frank Herbert</a>")
        );
    }
}
