use std::collections::BTreeMap;
use std::sync::OnceLock;

use percent_encoding::percent_decode_str;
use regex::Regex;

pub const DEFAULT_PAGE_LENGTH: i64 = 10;
/// `length` value the widget sends when paging is switched off.
pub const UNLIMITED_PAGE_LENGTH: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Only the exact string `desc` sorts descending.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn is_desc(self) -> bool {
        matches!(self, SortDirection::Desc)
    }
}

/// One requested sort level: an index into the view's order columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column_idx: i64,
    pub direction: SortDirection,
}

/// Parameters of one table widget request, parsed once at the boundary.
///
/// Unparseable numbers fall back to their defaults instead of failing the
/// request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatatableRequest {
    pub draw: i64,
    pub start: i64,
    pub length: i64,
    pub order: Vec<SortSpec>,
    pub search: String,
    params: BTreeMap<String, String>,
}

impl Default for DatatableRequest {
    fn default() -> Self {
        Self::from_params(BTreeMap::new())
    }
}

fn order_column_key() -> &'static Regex {
    static KEY: OnceLock<Regex> = OnceLock::new();
    KEY.get_or_init(|| Regex::new(r"^order\[\d+\]\[column\]$").expect("static regex is valid"))
}

fn parse_int(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

fn parse_urlencoded(source: &str) -> impl Iterator<Item = (String, String)> + '_ {
    source
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
}

impl DatatableRequest {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let params = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self::from_params(params)
    }

    /// Parses an `application/x-www-form-urlencoded` string, with or without
    /// a leading `?`.
    pub fn from_query_string(query: &str) -> Self {
        Self::from_pairs(parse_urlencoded(query))
    }

    /// Merges a query string and a form body; body values win on conflicts.
    pub fn from_http(query: &str, body: &str) -> Self {
        Self::from_pairs(parse_urlencoded(query).chain(parse_urlencoded(body)))
    }

    fn from_params(params: BTreeMap<String, String>) -> Self {
        let get = |key: &str| params.get(key).map(String::as_str);

        let levels = params
            .keys()
            .filter(|key| order_column_key().is_match(key))
            .count();
        let order = (0..levels)
            .map(|level| SortSpec {
                column_idx: parse_int(get(&format!("order[{level}][column]")), 0),
                direction: SortDirection::from_param(get(&format!("order[{level}][dir]"))),
            })
            .collect();

        Self {
            draw: parse_int(get("draw"), 0),
            start: parse_int(get("start"), 0),
            length: parse_int(get("length"), DEFAULT_PAGE_LENGTH),
            order,
            search: get("search[value]").unwrap_or_default().to_string(),
            params,
        }
    }

    /// Raw parameter access for filters that read widget keys this type does
    /// not model, such as per-column search terms.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameters_use_defaults() {
        let request = DatatableRequest::default();
        assert_eq!(request.draw, 0);
        assert_eq!(request.start, 0);
        assert_eq!(request.length, DEFAULT_PAGE_LENGTH);
        assert!(request.order.is_empty());
        assert!(request.search.is_empty());
    }

    #[test]
    fn malformed_numbers_fall_back_to_defaults() {
        let request = DatatableRequest::from_pairs([
            ("draw", "abc"),
            ("start", "1.5"),
            ("length", ""),
            ("order[0][column]", "name"),
        ]);
        assert_eq!(request.draw, 0);
        assert_eq!(request.start, 0);
        assert_eq!(request.length, DEFAULT_PAGE_LENGTH);
        assert_eq!(
            request.order,
            vec![SortSpec {
                column_idx: 0,
                direction: SortDirection::Asc
            }]
        );
    }

    #[test]
    fn sort_levels_are_read_in_index_order() {
        let request = DatatableRequest::from_pairs([
            ("order[1][column]", "0"),
            ("order[1][dir]", "asc"),
            ("order[0][column]", "2"),
            ("order[0][dir]", "desc"),
        ]);
        assert_eq!(
            request.order,
            vec![
                SortSpec {
                    column_idx: 2,
                    direction: SortDirection::Desc
                },
                SortSpec {
                    column_idx: 0,
                    direction: SortDirection::Asc
                },
            ]
        );
    }

    #[test]
    fn only_exact_desc_reverses_direction() {
        assert_eq!(SortDirection::from_param(Some("desc")), SortDirection::Desc);
        assert_eq!(SortDirection::from_param(Some("DESC")), SortDirection::Asc);
        assert_eq!(SortDirection::from_param(None), SortDirection::Asc);
    }

    #[test]
    fn query_string_is_percent_decoded() {
        let request = DatatableRequest::from_query_string(
            "?draw=7&start=20&length=-1&order%5B0%5D%5Bcolumn%5D=1&search%5Bvalue%5D=new+york",
        );
        assert_eq!(request.draw, 7);
        assert_eq!(request.start, 20);
        assert_eq!(request.length, UNLIMITED_PAGE_LENGTH);
        assert_eq!(request.order.len(), 1);
        assert_eq!(request.order[0].column_idx, 1);
        assert_eq!(request.search, "new york");
    }

    #[test]
    fn body_parameters_override_query_parameters() {
        let request = DatatableRequest::from_http("draw=1&start=5", "draw=2");
        assert_eq!(request.draw, 2);
        assert_eq!(request.start, 5);
        assert_eq!(request.param("draw"), Some("2"));
    }
}
