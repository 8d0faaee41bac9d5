//! Splitting a batch by record kind

use crate::validation::{Reading, ValidMessage};

use super::records::{AssistanceRequestRecord, ExhibitionId, VoteRecord};

/// One flushed batch, split by destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutedBatch {
    pub votes: Vec<VoteRecord>,
    pub assistance: Vec<AssistanceRequestRecord>,
}

impl RoutedBatch {
    /// Total records across both kinds.
    pub fn len(&self) -> usize {
        self.votes.len() + self.assistance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty() && self.assistance.is_empty()
    }
}

/// Classifies each message as a rating or an assistance request.
///
/// Input order is kept within each output sequence.
pub fn classify_and_split(messages: &[ValidMessage]) -> RoutedBatch {
    let mut batch = RoutedBatch::default();

    for msg in messages {
        let exhibition_id = ExhibitionId::from_site(msg.site());
        match msg.reading() {
            Reading::Rating(rating) => batch.votes.push(VoteRecord {
                rating,
                exhibition_id,
                observed_at: msg.observed_at(),
            }),
            Reading::Assistance(request_type) => batch.assistance.push(AssistanceRequestRecord {
                request_type,
                exhibition_id,
                observed_at: msg.observed_at(),
            }),
        }
    }

    batch
}
