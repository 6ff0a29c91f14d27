use chrono::Weekday;

pub mod engine;
pub mod input;
pub mod ledger;
pub mod slots;

mod balance;
mod failsafe;
mod gap;
mod result;
mod targeted;

/// Roster days in assignment order.
pub(crate) const WEEK_DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];
