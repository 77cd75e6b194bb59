//! Appwrite list-documents query strings.

use serde_json::json;

/// Builders for the JSON query strings accepted by `queries[]`.
#[derive(Debug, Clone, Copy)]
pub struct Query;

impl Query {
    /// Exact match of `attribute` against `value`.
    #[must_use]
    pub fn equal(attribute: &str, value: &str) -> String {
        json!({ "method": "equal", "attribute": attribute, "values": [value] }).to_string()
    }

    /// Order results by `attribute`, highest first.
    #[must_use]
    pub fn order_desc(attribute: &str) -> String {
        json!({ "method": "orderDesc", "attribute": attribute }).to_string()
    }

    /// Limit the number of returned documents.
    #[must_use]
    pub fn limit(limit: u32) -> String {
        json!({ "method": "limit", "values": [limit] }).to_string()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_equal_escapes_value() {
        // Arrange & Act
        let q = Query::equal("query", r#"say "hi""#);
        let parsed: serde_json::Value = serde_json::from_str(&q).unwrap();

        // Assert
        assert_eq!(parsed["method"], "equal");
        assert_eq!(parsed["attribute"], "query");
        assert_eq!(parsed["values"][0], r#"say "hi""#);
    }

    #[test]
    fn test_order_desc_and_limit() {
        // Arrange & Act
        let order: serde_json::Value = serde_json::from_str(&Query::order_desc("count")).unwrap();
        let limit: serde_json::Value = serde_json::from_str(&Query::limit(5)).unwrap();

        // Assert
        assert_eq!(order["method"], "orderDesc");
        assert_eq!(order["attribute"], "count");
        assert_eq!(limit["method"], "limit");
        assert_eq!(limit["values"][0], 5);
    }
}
