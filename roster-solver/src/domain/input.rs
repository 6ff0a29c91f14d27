use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Deserialize;
use uuid::Uuid;

use shared::types::{Employee, LeaveRequest, Shop};

use crate::domain::WEEK_DAYS;
use crate::error::RosterError;

/// Immutable snapshot the solver runs against. Built by the caller from
/// whatever store holds shops, employees, and leave; the solver never
/// looks anywhere else.
#[derive(Debug, Clone, Deserialize)]
pub struct RosterInput {
    /// Monday the roster week begins on.
    pub week_start: NaiveDate,
    pub shops: Vec<Shop>,
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub leave_requests: Vec<LeaveRequest>,
    /// Force-excluded for this week only.
    #[serde(default)]
    pub excluded_employee_ids: HashSet<Uuid>,
    /// Restricted to morning shifts for this week only.
    #[serde(default)]
    pub am_only_employee_ids: HashSet<Uuid>,
    /// Extra per-week days off, overlaid on personal constraints.
    #[serde(default)]
    pub fixed_days_off: HashMap<Uuid, Vec<Weekday>>,
}

impl RosterInput {
    /// Rejects malformed snapshots with a single descriptive error before
    /// any assignment runs.
    pub fn validate(&self) -> Result<(), RosterError> {
        if self.week_start.weekday() != Weekday::Mon {
            return Err(RosterError::WeekStartNotMonday(self.week_start));
        }

        let shops_by_id: HashMap<Uuid, &Shop> = self.shops.iter().map(|s| (s.id, s)).collect();

        for employee in &self.employees {
            let Some(primary) = shops_by_id.get(&employee.primary_shop) else {
                return Err(RosterError::UnknownShop {
                    employee: employee.id,
                    shop: employee.primary_shop,
                });
            };
            if !employee.company.matches(primary.company) {
                return Err(RosterError::CompanyMismatch {
                    employee: employee.id,
                    shop: primary.id,
                });
            }
            for &shop in &employee.secondary_shops {
                if !shops_by_id.contains_key(&shop) {
                    return Err(RosterError::UnknownShop {
                        employee: employee.id,
                        shop,
                    });
                }
            }
        }

        for shop in &self.shops {
            for day in WEEK_DAYS {
                match shop.hours.get(day) {
                    Some(hours) if hours.close <= hours.open => {
                        return Err(RosterError::InvalidOpenHours {
                            shop: shop.id,
                            day,
                            open: hours.open,
                            close: hours.close,
                        });
                    }
                    None if shop.demand.get(day).total() > 0 => {
                        return Err(RosterError::DemandWhileClosed { shop: shop.id, day });
                    }
                    _ => {}
                }
                for interval in shop.special_shifts.get(day) {
                    if interval.end <= interval.start {
                        return Err(RosterError::InvalidSpecialInterval { shop: shop.id, day });
                    }
                }
            }
        }

        for leave in &self.leave_requests {
            if leave.end_date < leave.start_date {
                return Err(RosterError::InvalidLeaveRange {
                    employee: leave.employee_id,
                    start: leave.start_date,
                    end: leave.end_date,
                });
            }
        }

        Ok(())
    }
}
