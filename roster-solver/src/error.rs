use chrono::{NaiveDate, NaiveTime, Weekday};
use thiserror::Error;
use uuid::Uuid;

/// Problems with the input snapshot that abort the run before any
/// assignment is made. Business infeasibility is never an error; it ends
/// up in the result's validation report instead.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Week start {0} is not a Monday")]
    WeekStartNotMonday(NaiveDate),

    #[error("Employee {employee} references unknown shop {shop}")]
    UnknownShop { employee: Uuid, shop: Uuid },

    #[error("Shop {shop} closes at or before opening on {day}: {open}..{close}")]
    InvalidOpenHours {
        shop: Uuid,
        day: Weekday,
        open: NaiveTime,
        close: NaiveTime,
    },

    #[error("Shop {shop} is closed on {day} but declares demand")]
    DemandWhileClosed { shop: Uuid, day: Weekday },

    #[error("Shop {shop} declares an empty special interval on {day}")]
    InvalidSpecialInterval { shop: Uuid, day: Weekday },

    #[error("Leave for employee {employee} ends {end} before it starts {start}")]
    InvalidLeaveRange {
        employee: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Employee {employee} does not work for the company of primary shop {shop}")]
    CompanyMismatch { employee: Uuid, shop: Uuid },
}
