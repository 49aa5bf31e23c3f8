//! Cursor connections.
//!
//! Every list field of the API returns
//! `{edges: [{cursor, node}], pageInfo: {startCursor, endCursor, hasNextPage, hasPreviousPage}}`.
//! Cursors are opaque and only ever handed back to the server.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge<T> {
    pub cursor: String,
    pub node: T,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub start_cursor: Option<String>,
    #[serde(default)]
    pub end_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub has_previous_page: bool,
}

impl PageInfo {
    /// Cursor to pass as `after` for the next page, if there is one.
    pub fn next_cursor(&self) -> Option<&str> {
        if self.has_next_page {
            self.end_cursor.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    #[serde(default)]
    pub page_info: PageInfo,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self {
            edges: Vec::new(),
            page_info: PageInfo::default(),
        }
    }
}

impl<T> Connection<T> {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|edge| &edge.node)
    }

    pub fn into_nodes(self) -> impl Iterator<Item = T> {
        self.edges.into_iter().map(|edge| edge.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decodes_connection_with_null_cursors() {
        let conn: Connection<String> = serde_json::from_value(json!({
            "edges": [],
            "pageInfo": {
                "startCursor": null,
                "endCursor": null,
                "hasNextPage": false,
                "hasPreviousPage": false
            }
        }))
        .unwrap_or_else(|e| panic!("decode: {e}"));

        assert!(conn.is_empty());
        assert_eq!(conn.page_info.next_cursor(), None);
    }

    #[test]
    fn next_cursor_requires_next_page() {
        let info = PageInfo {
            start_cursor: Some("a".to_string()),
            end_cursor: Some("b".to_string()),
            has_next_page: true,
            has_previous_page: false,
        };
        assert_eq!(info.next_cursor(), Some("b"));

        let last = PageInfo {
            has_next_page: false,
            ..info
        };
        assert_eq!(last.next_cursor(), None);
    }
}
