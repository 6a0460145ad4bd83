use async_trait::async_trait;

use crate::contract::{
    error::SchedulingError,
    model::{
        Appointment, AppointmentId, AuthTokens, Calendar, ConfirmSignupRequest, LoginRequest,
        NewAppointment, SignupRequest, UserView,
    },
};

/// Inbound surface of the scheduling module.
///
/// `subject` is the identity-provider subject id of the authenticated caller,
/// as extracted from its access token by the transport layer.
#[async_trait]
pub trait SchedulingApi: Send + Sync {
    /// All appointments for admins, otherwise only the caller's own.
    async fn list_appointments(&self, subject: &str) -> Result<Vec<Appointment>, SchedulingError>;

    /// Book the slot described by `input` for the caller.
    async fn create_appointment(
        &self,
        input: NewAppointment,
        subject: &str,
    ) -> Result<Appointment, SchedulingError>;

    /// Soft-delete one of the caller's own appointments.
    async fn delete_appointment(
        &self,
        id: AppointmentId,
        subject: &str,
    ) -> Result<(), SchedulingError>;

    /// Occupied slots for a `YYYY-MM` month selector.
    async fn get_calendar(&self, month: &str) -> Result<Calendar, SchedulingError>;

    async fn list_users(&self) -> Result<Vec<UserView>, SchedulingError>;

    /// `id_or_self` is either a numeric user id or `@me`.
    async fn get_user(&self, id_or_self: &str, subject: &str)
        -> Result<UserView, SchedulingError>;

    /// Provision an account; returns the provider subject id.
    async fn create_user(&self, input: SignupRequest) -> Result<String, SchedulingError>;

    async fn login(&self, input: LoginRequest) -> Result<AuthTokens, SchedulingError>;

    async fn confirm_signup(&self, input: ConfirmSignupRequest) -> Result<(), SchedulingError>;
}
