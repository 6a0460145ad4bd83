use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::SchedulingApi,
    error::SchedulingError,
    model::{
        Appointment, AppointmentId, AuthTokens, Calendar, ConfirmSignupRequest, LoginRequest,
        NewAppointment, SignupRequest, UserView,
    },
};
use crate::domain::appointments::AppointmentService;
use crate::domain::identity::IdentityService;

/// Local implementation of the SchedulingApi trait that delegates to the
/// domain services, resolving the caller's subject id first.
pub struct SchedulingLocalClient {
    appointments: Arc<AppointmentService>,
    identity: Arc<IdentityService>,
}

impl SchedulingLocalClient {
    pub fn new(appointments: Arc<AppointmentService>, identity: Arc<IdentityService>) -> Self {
        Self {
            appointments,
            identity,
        }
    }
}

#[async_trait]
impl SchedulingApi for SchedulingLocalClient {
    async fn list_appointments(&self, subject: &str) -> Result<Vec<Appointment>, SchedulingError> {
        let caller = self.identity.resolve_caller(subject).await?;
        self.appointments
            .list_for_caller(caller)
            .await
            .map_err(Into::into)
    }

    async fn create_appointment(
        &self,
        input: NewAppointment,
        subject: &str,
    ) -> Result<Appointment, SchedulingError> {
        let caller = self.identity.resolve_caller(subject).await?;
        self.appointments
            .create(input, caller)
            .await
            .map_err(Into::into)
    }

    async fn delete_appointment(
        &self,
        id: AppointmentId,
        subject: &str,
    ) -> Result<(), SchedulingError> {
        let caller = self.identity.resolve_caller(subject).await?;
        self.appointments
            .delete(id, caller)
            .await
            .map_err(Into::into)
    }

    async fn get_calendar(&self, month: &str) -> Result<Calendar, SchedulingError> {
        self.appointments.calendar(month).await.map_err(Into::into)
    }

    async fn list_users(&self) -> Result<Vec<UserView>, SchedulingError> {
        let users = self.identity.list_users().await?;
        Ok(users.into_iter().map(UserView::from).collect())
    }

    async fn get_user(
        &self,
        id_or_self: &str,
        subject: &str,
    ) -> Result<UserView, SchedulingError> {
        let user = self.identity.get_user(id_or_self, subject).await?;
        Ok(user.into())
    }

    async fn create_user(&self, input: SignupRequest) -> Result<String, SchedulingError> {
        self.identity.signup(input).await.map_err(Into::into)
    }

    async fn login(&self, input: LoginRequest) -> Result<AuthTokens, SchedulingError> {
        self.identity.login(input).await.map_err(Into::into)
    }

    async fn confirm_signup(&self, input: ConfirmSignupRequest) -> Result<(), SchedulingError> {
        self.identity.confirm_signup(input).await.map_err(Into::into)
    }
}
