//! Taxonomy models for the storefront category hierarchy.
//!
//! The upstream feed encodes an unset hierarchy level with the string
//! `"EMPTY"`. In memory every level is an `Option<String>`; the sentinel only
//! exists on the wire, where it is restored on serialization so cached copies
//! keep the exact upstream shape.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

/// Wire value marking an unset hierarchy level.
pub const EMPTY_LEVEL: &str = "EMPTY";

/// Number of hierarchy levels (DEPT, TYP, SUBTYP_1, SUBTYP_2, SUBTYP_3).
pub const LEVEL_COUNT: usize = 5;

/// One node of the DEPT/TYP/SUBTYP_1-3 category hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TaxonomyItem {
    #[serde(deserialize_with = "lenient::i64")]
    pub web_taxonomy_id: i64,
    #[serde(with = "level", default)]
    pub dept: Option<String>,
    #[serde(with = "level", default)]
    pub typ: Option<String>,
    #[serde(rename = "SUBTYP_1", with = "level", default)]
    pub subtyp_1: Option<String>,
    #[serde(rename = "SUBTYP_2", with = "level", default)]
    pub subtyp_2: Option<String>,
    #[serde(rename = "SUBTYP_3", with = "level", default)]
    pub subtyp_3: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub web_url: String,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub active: bool,
    #[serde(default, deserialize_with = "lenient::string")]
    pub short_desc: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub long_desc: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub meta_tags: String,
    #[serde(default, deserialize_with = "lenient::i64")]
    pub sort_position: i64,
}

impl TaxonomyItem {
    /// Hierarchy levels in order, shallowest first.
    pub fn levels(&self) -> [Option<&str>; LEVEL_COUNT] {
        [
            self.dept.as_deref(),
            self.typ.as_deref(),
            self.subtyp_1.as_deref(),
            self.subtyp_2.as_deref(),
            self.subtyp_3.as_deref(),
        ]
    }

    /// Index of the deepest set level, or `None` for a node with no DEPT.
    pub fn depth(&self) -> Option<usize> {
        self.levels().iter().rposition(Option::is_some)
    }
}

/// A single step of the navigation trail shown above a category page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BreadcrumbItem {
    pub label: String,
    pub url: String,
}

impl BreadcrumbItem {
    pub fn home() -> Self {
        Self {
            label: "Home".to_string(),
            url: "/".to_string(),
        }
    }
}

/// A resolved category page: the node itself, its trail and its children.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryView {
    pub category: TaxonomyItem,
    pub breadcrumbs: Vec<BreadcrumbItem>,
    pub children: Vec<TaxonomyItem>,
}

/// Serde adapter between `Option<String>` and the `"EMPTY"` wire sentinel.
pub(crate) mod level {
    use super::*;

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.as_deref().unwrap_or(EMPTY_LEVEL))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = super::lenient::string(deserializer)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == EMPTY_LEVEL {
            Ok(None)
        } else {
            Ok(Some(trimmed.to_string()))
        }
    }
}

/// Coercing deserializers for upstream feeds that mix strings, numbers and
/// nulls for the same field.
pub(crate) mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => String::new(),
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => other.to_string(),
        })
    }

    pub fn f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64().unwrap_or_default(),
            Value::String(s) => s.trim().parse().unwrap_or_default(),
            _ => 0.0,
        })
    }

    pub fn i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => Ok(n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or_default()),
            Value::String(s) if s.trim().is_empty() => Ok(0),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .or_else(|_| s.parse::<f64>().map(|f| f as i64))
                    .map_err(|_| D::Error::custom(format!("expected integer, got {:?}", s)))
            }
            _ => Ok(0),
        }
    }

    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => matches!(
                s.trim().to_ascii_uppercase().as_str(),
                "1" | "Y" | "YES" | "TRUE" | "T"
            ),
            _ => false,
        })
    }

    pub fn vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sentinel_levels_become_none() {
        let item: TaxonomyItem = serde_json::from_value(json!({
            "WEB_TAXONOMY_ID": "12",
            "DEPT": "Shoes",
            "TYP": "Running",
            "SUBTYP_1": "EMPTY",
            "SUBTYP_2": "EMPTY",
            "SUBTYP_3": null,
            "WEB_URL": "shoes-running",
            "ACTIVE": 1,
            "SORT_POSITION": "3"
        }))
        .unwrap();

        assert_eq!(item.web_taxonomy_id, 12);
        assert_eq!(item.dept.as_deref(), Some("Shoes"));
        assert_eq!(item.typ.as_deref(), Some("Running"));
        assert_eq!(item.subtyp_1, None);
        assert_eq!(item.subtyp_3, None);
        assert!(item.active);
        assert_eq!(item.sort_position, 3);
        assert_eq!(item.depth(), Some(1));
    }

    #[test]
    fn test_none_levels_serialize_as_sentinel() {
        let item: TaxonomyItem = serde_json::from_value(json!({
            "WEB_TAXONOMY_ID": 1,
            "DEPT": "Shoes",
            "TYP": "EMPTY",
            "WEB_URL": "shoes"
        }))
        .unwrap();

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["DEPT"], "Shoes");
        assert_eq!(value["TYP"], EMPTY_LEVEL);
        assert_eq!(value["SUBTYP_3"], EMPTY_LEVEL);
        assert_eq!(value["ACTIVE"], false);
    }

    #[test]
    fn test_depth_of_unset_node() {
        let item: TaxonomyItem =
            serde_json::from_value(json!({ "WEB_TAXONOMY_ID": 9, "WEB_URL": "orphan" })).unwrap();
        assert_eq!(item.depth(), None);
    }
}
