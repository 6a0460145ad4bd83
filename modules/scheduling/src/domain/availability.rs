use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::contract::model::Slot;
use crate::domain::bounded::store_call;
use crate::domain::error::DomainError;
use crate::domain::repo::AppointmentsRepository;

/// Interval queries over live appointments.
///
/// Stored slots have an inclusive end one millisecond short of the next
/// hour, and the overlap test is strict on both sides, so back-to-back
/// hours never conflict.
#[derive(Clone)]
pub struct AvailabilityEngine {
    repo: Arc<dyn AppointmentsRepository>,
    io_timeout: Duration,
}

impl AvailabilityEngine {
    pub fn new(repo: Arc<dyn AppointmentsRepository>, io_timeout: Duration) -> Self {
        Self { repo, io_timeout }
    }

    /// True iff no live appointment overlaps `[begin, end)`.
    #[instrument(name = "scheduling.availability.is_available", skip(self))]
    pub async fn is_available(&self, begin: i64, end: i64) -> Result<bool, DomainError> {
        if begin >= end {
            return Err(DomainError::invalid_interval(begin, end));
        }
        let conflicts = store_call(
            "count_overlapping",
            self.io_timeout,
            self.repo.count_overlapping(begin, end),
        )
        .await?;
        debug!(conflicts, "Checked slot availability");
        Ok(conflicts == 0)
    }

    /// Interval projection of live appointments overlapping
    /// `[month_start, month_end)`, ascending by start.
    #[instrument(name = "scheduling.availability.monthly_occupancy", skip(self))]
    pub async fn monthly_occupancy(
        &self,
        month_start: i64,
        month_end: i64,
    ) -> Result<Vec<Slot>, DomainError> {
        if month_start >= month_end {
            return Err(DomainError::invalid_interval(month_start, month_end));
        }
        let mut slots = store_call(
            "find_overlapping_slots",
            self.io_timeout,
            self.repo.find_overlapping_slots(month_start, month_end),
        )
        .await?;
        // Ascending order is part of the projection's contract.
        slots.sort_by_key(|s| s.begins_at);
        debug!(count = slots.len(), "Collected monthly occupancy");
        Ok(slots)
    }
}
