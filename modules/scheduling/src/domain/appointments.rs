use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::contract::model::{Appointment, AppointmentId, Calendar, Caller, NewAppointment};
use crate::domain::availability::AvailabilityEngine;
use crate::domain::bounded::store_call;
use crate::domain::clock::{is_hour_aligned, parse_timestamp, slot_end, Clock, MonthWindow};
use crate::domain::error::DomainError;
use crate::domain::repo::{AppointmentDraft, AppointmentsRepository};
use crate::domain::validation::Input;
use crate::domain::ServiceConfig;

/// Appointment lifecycle: booking, soft deletion, listing and the calendar.
///
/// Booking is serialized through `booking_gate`, and the store's slot
/// constraint is the final arbiter when several processes share one store.
#[derive(Clone)]
pub struct AppointmentService {
    repo: Arc<dyn AppointmentsRepository>,
    availability: AvailabilityEngine,
    clock: Arc<dyn Clock>,
    booking_gate: Arc<Mutex<()>>,
    config: ServiceConfig,
}

impl AppointmentService {
    pub fn new(
        repo: Arc<dyn AppointmentsRepository>,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            availability: AvailabilityEngine::new(repo.clone(), config.io_timeout),
            repo,
            clock,
            booking_gate: Arc::new(Mutex::new(())),
            config,
        }
    }

    pub fn availability(&self) -> &AvailabilityEngine {
        &self.availability
    }

    #[instrument(
        name = "scheduling.appointments.create",
        skip(self, input),
        fields(owner_id = caller.user_id, begins_at = %input.begins_at)
    )]
    pub async fn create(
        &self,
        input: NewAppointment,
        caller: Caller,
    ) -> Result<Appointment, DomainError> {
        info!("Creating appointment");

        let input = input.prepare()?;
        let begins_at = parse_timestamp(&input.begins_at)?;
        if !is_hour_aligned(begins_at) {
            return Err(DomainError::slot_not_aligned(begins_at));
        }
        let now = self.clock.now_millis();
        if begins_at <= now {
            return Err(DomainError::slot_in_past(begins_at));
        }
        let ends_at = slot_end(begins_at);

        let _gate = self.booking_gate.lock().await;

        if !self.availability.is_available(begins_at, ends_at).await? {
            return Err(DomainError::slot_taken(begins_at));
        }

        let draft = AppointmentDraft {
            begins_at,
            ends_at,
            owner_id: caller.user_id,
            title: input.title,
            created_at: now,
        };
        let appointment = store_call(
            "insert_appointment",
            self.config.io_timeout,
            self.repo.insert_if_free(draft),
        )
        .await?
        .ok_or_else(|| {
            debug!("Slot constraint rejected the insert");
            DomainError::slot_taken(begins_at)
        })?;

        info!(appointment_id = appointment.id, "Successfully created appointment");
        Ok(appointment)
    }

    /// Soft-delete one of the caller's appointments. Absent, already deleted
    /// and foreign appointments all answer `NotFound`.
    #[instrument(
        name = "scheduling.appointments.delete",
        skip(self),
        fields(appointment_id = id, owner_id = caller.user_id)
    )]
    pub async fn delete(&self, id: AppointmentId, caller: Caller) -> Result<(), DomainError> {
        info!("Deleting appointment");

        let appointment = store_call(
            "find_appointment",
            self.config.io_timeout,
            self.repo.find_by_id(id),
        )
        .await?
        .filter(|a| !a.is_deleted && a.owner_id == caller.user_id)
        .ok_or_else(|| DomainError::not_found("appointment"))?;

        let deleted = store_call(
            "soft_delete_appointment",
            self.config.io_timeout,
            self.repo.soft_delete(appointment.id, self.clock.now_millis()),
        )
        .await?;
        if !deleted {
            return Err(DomainError::not_found("appointment"));
        }

        info!("Successfully deleted appointment");
        Ok(())
    }

    #[instrument(
        name = "scheduling.appointments.list",
        skip(self),
        fields(user_id = caller.user_id, is_admin = caller.is_admin)
    )]
    pub async fn list_for_caller(&self, caller: Caller) -> Result<Vec<Appointment>, DomainError> {
        debug!("Listing appointments");
        let appointments = if caller.is_admin {
            store_call(
                "find_all_appointments",
                self.config.io_timeout,
                self.repo.find_all(),
            )
            .await?
        } else {
            store_call(
                "find_appointments_by_owner",
                self.config.io_timeout,
                self.repo.find_by_owner(caller.user_id),
            )
            .await?
        };
        debug!(count = appointments.len(), "Listed appointments");
        Ok(appointments)
    }

    /// Occupied slots for a `YYYY-MM` selector.
    #[instrument(name = "scheduling.appointments.calendar", skip(self))]
    pub async fn calendar(&self, month: &str) -> Result<Calendar, DomainError> {
        let month = month.trim();
        let window = MonthWindow::parse(month)?;
        let scheduled = self
            .availability
            .monthly_occupancy(window.start, window.end)
            .await?;
        Ok(Calendar {
            month: month.to_string(),
            scheduled,
        })
    }
}
