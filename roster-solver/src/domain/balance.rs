use chrono::{Duration, Weekday};
use uuid::Uuid;

use shared::types::ShiftKind;

use crate::domain::engine::RosterEngine;

impl<'a> RosterEngine<'a> {
    /// Brings over-target employees back to contract by shortening their
    /// longest ordinary weekday shift. At most one trim per employee; a
    /// trim that would leave less than the minimum shift length is left
    /// alone and surfaced by validation instead.
    pub(crate) fn balance_weekday_hours(&mut self) {
        let employee_ids: Vec<Uuid> = self.input.employees.iter().map(|e| e.id).collect();
        for employee_id in employee_ids {
            let Some(employee) = self.employee(employee_id) else {
                continue;
            };
            let target = self.config.weekday_target(employee.contract);
            let worked = self.ledger.weekday_minutes(employee_id);
            if worked <= target {
                continue;
            }
            let excess = worked - target;

            let mut pick: Option<usize> = None;
            let mut longest: i64 = 0;
            for (index, shift) in self.shifts.iter().enumerate() {
                if shift.employee_id != employee_id
                    || shift.kind == ShiftKind::FullDay
                    || shift.weekday == Weekday::Sun
                {
                    continue;
                }
                let minutes = (shift.end - shift.start).num_minutes();
                if minutes > longest {
                    longest = minutes;
                    pick = Some(index);
                }
            }

            let Some(index) = pick else {
                tracing::warn!(%employee_id, excess, "No trimmable shift for over-target employee");
                self.trim_blocked.push((employee_id, excess));
                continue;
            };

            let new_minutes = longest - i64::from(excess);
            if new_minutes < i64::from(self.config.min_shift_minutes) {
                tracing::warn!(%employee_id, excess, "Trim blocked by minimum shift length");
                self.trim_blocked.push((employee_id, excess));
                continue;
            }

            let shift = &mut self.shifts[index];
            shift.end = shift.start + Duration::minutes(new_minutes);
            shift.hours = new_minutes as f64 / 60.0;
            let day = shift.weekday;
            self.ledger.deduct(employee_id, day, excess);
            tracing::debug!(%employee_id, trimmed_minutes = excess, "Shortened shift to contract target");
        }
    }
}
