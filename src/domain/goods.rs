//! Goods catalog entities.
//!
//! A good is a catalog item scoped to a project. The `(id, project_id)` pair
//! is the only valid addressing key: an id paired with the wrong project must
//! behave as "not found" so existence never leaks across projects.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A catalog item owned by a project.
///
/// `id` and `project_id` are immutable once assigned by the store. `removed`
/// only ever transitions false to true (soft delete; rows are never erased).
/// `priority` is mutable only through the reprioritization cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Good {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub priority: i32,
    pub removed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// One page of the goods listing, with the counters the caller echoes back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoodPage {
    pub meta: PageMeta,
    pub goods: Vec<Good>,
}

/// Page counters: `total` and `removed` describe the rows in this page only,
/// `limit`/`offset` echo the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub removed: i64,
    pub limit: i64,
    pub offset: i64,
}

impl GoodPage {
    pub fn assemble(goods: Vec<Good>, limit: i64, offset: i64) -> Self {
        let removed = goods.iter().filter(|good| good.removed).count() as i64;
        let meta = PageMeta {
            total: goods.len() as i64,
            removed,
            limit,
            offset,
        };
        Self { meta, goods }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn sample_good(id: i64, removed: bool) -> Good {
        Good {
            id,
            project_id: 1,
            name: format!("good-{id}"),
            description: None,
            priority: id as i32,
            removed,
            created_at: datetime!(2024-03-01 12:00 UTC),
        }
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let good = Good {
            id: 7,
            project_id: 3,
            name: "Lamp".to_string(),
            description: Some("desk lamp".to_string()),
            priority: 2,
            removed: false,
            created_at: datetime!(2024-03-01 12:00 UTC),
        };

        let value = serde_json::to_value(&good).expect("serializable");
        assert_eq!(value["id"], 7);
        assert_eq!(value["projectId"], 3);
        assert_eq!(value["name"], "Lamp");
        assert_eq!(value["description"], "desk lamp");
        assert_eq!(value["priority"], 2);
        assert_eq!(value["removed"], false);
        assert_eq!(value["createdAt"], "2024-03-01T12:00:00Z");
    }

    #[test]
    fn good_round_trips_through_json() {
        let good = sample_good(11, true);
        let payload = serde_json::to_string(&good).expect("serializable");
        let parsed: Good = serde_json::from_str(&payload).expect("deserializable");
        assert_eq!(parsed, good);
    }

    #[test]
    fn page_meta_counts_removed_rows() {
        let goods = vec![
            sample_good(1, false),
            sample_good(2, true),
            sample_good(3, true),
        ];

        let page = GoodPage::assemble(goods, 10, 0);

        assert_eq!(page.meta.total, 3);
        assert_eq!(page.meta.removed, 2);
        assert_eq!(page.meta.limit, 10);
        assert_eq!(page.meta.offset, 0);
    }
}
