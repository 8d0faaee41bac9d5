//! Destination tables and row shape

use chrono::{DateTime, FixedOffset};

use crate::routing::{AssistanceRequestRecord, VoteRecord};

/// A destination table and its ordered insert columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: [&'static str; 3],
}

/// Visitor ratings.
pub const VOTE_TABLE: TableSpec = TableSpec {
    name: "rating",
    columns: ["rating_id", "exhibition_id", "vote_at"],
};

/// Assistance requests.
pub const ASSISTANCE_TABLE: TableSpec = TableSpec {
    name: "type",
    columns: ["type_details_id", "exhibition_id", "request_at"],
};

impl TableSpec {
    /// `INSERT INTO "name" ("a", "b", "c") `, ready for a VALUES list.
    pub fn insert_prefix(&self) -> String {
        let columns: Vec<String> = self.columns.iter().map(|c| quote_ident(c)).collect();
        format!("INSERT INTO {} ({}) ", quote_ident(self.name), columns.join(", "))
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// One row for either table: kind code, exhibition, timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRow {
    pub code: i32,
    pub exhibition_id: String,
    pub observed_at: DateTime<FixedOffset>,
}

impl From<&VoteRecord> for StoreRow {
    fn from(vote: &VoteRecord) -> Self {
        Self {
            code: i32::from(vote.rating),
            exhibition_id: vote.exhibition_id.to_string(),
            observed_at: vote.observed_at,
        }
    }
}

impl From<&AssistanceRequestRecord> for StoreRow {
    fn from(request: &AssistanceRequestRecord) -> Self {
        Self {
            code: i32::from(request.request_type),
            exhibition_id: request.exhibition_id.to_string(),
            observed_at: request.observed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::ExhibitionId;

    #[test]
    fn test_insert_prefix() {
        assert_eq!(
            VOTE_TABLE.insert_prefix(),
            r#"INSERT INTO "rating" ("rating_id", "exhibition_id", "vote_at") "#
        );
        assert_eq!(
            ASSISTANCE_TABLE.insert_prefix(),
            r#"INSERT INTO "type" ("type_details_id", "exhibition_id", "request_at") "#
        );
    }

    #[test]
    fn test_rows_from_records() {
        let at = DateTime::parse_from_rfc3339("2024-03-13T12:00:00.123456+00:00").unwrap();
        let vote = VoteRecord {
            rating: 4,
            exhibition_id: ExhibitionId::from_site(2),
            observed_at: at,
        };
        let request = AssistanceRequestRecord {
            request_type: 1,
            exhibition_id: ExhibitionId::from_site(0),
            observed_at: at,
        };

        assert_eq!(
            StoreRow::from(&vote),
            StoreRow {
                code: 4,
                exhibition_id: "EXH_02".into(),
                observed_at: at,
            }
        );
        assert_eq!(StoreRow::from(&request).code, 1);
        assert_eq!(StoreRow::from(&request).exhibition_id, "EXH_00");
    }
}
