//! Tests to verify that the services emit the expected tracing spans

mod common;

use common::{seed_user, sqlite, FixedClock, MockIdentityProvider};
use scheduling::config::SchedulingConfig;
use scheduling::contract::model::{NewAppointment, SignupRequest};
use scheduling::Scheduling;
use tracing_test::traced_test;

async fn module() -> (Scheduling, String) {
    let db = sqlite().await;
    let user = seed_user(&db, "alice", false).await;
    let module = Scheduling::with_collaborators(
        &SchedulingConfig::default(),
        db,
        MockIdentityProvider::new(),
        FixedClock::at("2025-08-01T00:00:00Z"),
    );
    (module, user.external_subject_id)
}

#[traced_test]
#[tokio::test]
async fn create_appointment_emits_spans() {
    // Arrange
    let (module, subject) = module().await;

    // Act
    let result = module
        .api()
        .create_appointment(
            NewAppointment {
                begins_at: "2025-08-15T14:00:00Z".into(),
                title: None,
            },
            &subject,
        )
        .await;

    // Assert
    assert!(result.is_ok());
    assert!(logs_contain("scheduling.identity.resolve_caller"));
    assert!(logs_contain("scheduling.appointments.create"));
    assert!(logs_contain("Successfully created appointment"));
}

#[traced_test]
#[tokio::test]
async fn rejected_booking_is_not_logged_as_created() {
    // Arrange
    let (module, subject) = module().await;

    // Act
    let result = module
        .api()
        .create_appointment(
            NewAppointment {
                begins_at: "2025-08-15T14:30:00Z".into(),
                title: None,
            },
            &subject,
        )
        .await;

    // Assert
    assert!(result.is_err());
    assert!(logs_contain("Creating appointment"));
    assert!(!logs_contain("Successfully created appointment"));
}

#[traced_test]
#[tokio::test]
async fn calendar_emits_spans() {
    // Arrange
    let (module, _) = module().await;

    // Act
    let result = module.api().get_calendar("2025-08").await;

    // Assert
    assert!(result.is_ok());
    assert!(logs_contain("scheduling.availability.monthly_occupancy"));
}

#[traced_test]
#[tokio::test]
async fn signup_logs_each_saga_step_without_the_password() {
    // Arrange
    let (module, _) = module().await;

    // Act
    let result = module
        .api()
        .create_user(SignupRequest {
            username: "bob".into(),
            email: "bob@example.com".into(),
            password: "Secr3t!pass".into(),
        })
        .await;

    // Assert
    assert!(result.is_ok());
    assert!(logs_contain("reserve_email"));
    assert!(logs_contain("create_external_account"));
    assert!(logs_contain("persist_local_user"));
    assert!(!logs_contain("Secr3t!pass"));
}

#[tokio::test]
async fn local_client_round_trip() {
    let (module, subject) = module().await;
    let api = module.api();

    let booked = api
        .create_appointment(
            NewAppointment {
                begins_at: "2025-08-15T14:00:00Z".into(),
                title: Some("Standup".into()),
            },
            &subject,
        )
        .await
        .unwrap();
    let mine = api.list_appointments(&subject).await.unwrap();
    let me = api.get_user("@me", &subject).await.unwrap();
    let everyone = api.list_users().await.unwrap();
    api.delete_appointment(booked.id, &subject).await.unwrap();
    let stranger = api.list_appointments("nobody").await.unwrap_err();

    assert_eq!(mine, vec![booked]);
    assert_eq!(me.username, "alice");
    assert_eq!(everyone.len(), 1);
    assert!(api.list_appointments(&subject).await.unwrap().is_empty());
    assert_eq!(
        stranger,
        scheduling::contract::error::SchedulingError::IdentityNotFound
    );
}
