//! Persistable record kinds

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Exhibition code as stored, e.g. `EXH_03` for site 3.
///
/// The encoding is a fixed `EXH_0` prefix plus the site digit, so it only
/// holds for single-digit sites.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExhibitionId(String);

impl ExhibitionId {
    pub fn from_site(site: u8) -> Self {
        Self(format!("EXH_0{}", site))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExhibitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A visitor rating, 0 to 5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub rating: u8,
    pub exhibition_id: ExhibitionId,
    pub observed_at: DateTime<FixedOffset>,
}

/// A request for staff assistance (0 or 1 selects the kind).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistanceRequestRecord {
    pub request_type: u8,
    pub exhibition_id: ExhibitionId,
    pub observed_at: DateTime<FixedOffset>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhibition_id_encoding() {
        assert_eq!(ExhibitionId::from_site(0).as_str(), "EXH_00");
        assert_eq!(ExhibitionId::from_site(3).to_string(), "EXH_03");
        assert_eq!(ExhibitionId::from_site(5).as_str(), "EXH_05");
    }
}
