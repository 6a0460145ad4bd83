//! Runtime helpers for catalog-driven Problem building.
use http::StatusCode;

pub mod problem;

pub use problem::{Problem, APPLICATION_PROBLEM_JSON};

/// Static error definition from catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
    pub type_url: &'static str,
}

impl ErrDef {
    /// Convert this error definition into a Problem with the given detail
    #[inline]
    pub fn to_problem(&self, detail: impl Into<String>) -> Problem {
        Problem::new(
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            self.title,
            detail.into(),
        )
        .with_code(self.code)
        .with_type(self.type_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn err_def_to_problem_works() {
        let def = ErrDef {
            status: 409,
            title: "Slot Taken",
            code: "scheduling.slot.taken.v1",
            type_url: "https://errors.slotkeeper.dev/scheduling.slot.taken.v1",
        };

        let problem = def.to_problem("2025-08-15T14:00:00Z is already booked");
        assert_eq!(problem.status, 409);
        assert_eq!(problem.title, "Slot Taken");
        assert_eq!(problem.detail, "2025-08-15T14:00:00Z is already booked");
        assert_eq!(problem.code, "scheduling.slot.taken.v1");
        assert_eq!(
            problem.type_url,
            "https://errors.slotkeeper.dev/scheduling.slot.taken.v1"
        );
    }
}
