use shared::types::{
    ContractType, DayHalf, EmployeeSummary, RosterData, RosterResult, ShopCoverage, UnfilledSlot,
    ValidationReport, WeekSummary,
};

use crate::domain::WEEK_DAYS;
use crate::domain::engine::RosterEngine;

/// Two hours of grace over the hard cap before an overage becomes a
/// blocking error rather than a warning.
const CAP_GRACE_MINUTES: u32 = 120;

impl<'a> RosterEngine<'a> {
    /// Assembles the final result from the terminal solver state. All
    /// iteration follows input declaration order, so identical input
    /// yields byte-identical output.
    pub(crate) fn into_result(self) -> RosterResult {
        let mut unfilled_slots: Vec<UnfilledSlot> = Vec::new();
        for shop in self.input.shops.iter().filter(|s| s.active) {
            for day in WEEK_DAYS {
                let remaining = self.slots.remaining(shop.id, day);
                if remaining.am > 0 {
                    unfilled_slots.push(UnfilledSlot {
                        shop_id: shop.id,
                        weekday: day,
                        date: self.date_of(day),
                        half: DayHalf::Am,
                        open_demand: remaining.am,
                    });
                }
                if remaining.pm > 0 {
                    unfilled_slots.push(UnfilledSlot {
                        shop_id: shop.id,
                        weekday: day,
                        date: self.date_of(day),
                        half: DayHalf::Pm,
                        open_demand: remaining.pm,
                    });
                }
            }
        }

        let employee_summaries: Vec<EmployeeSummary> = self
            .input
            .employees
            .iter()
            .map(|employee| EmployeeSummary {
                employee_id: employee.id,
                name: employee.name.clone(),
                contract: employee.contract,
                total_hours: minutes_to_hours(self.ledger.total_minutes(employee.id)),
                weekday_hours: minutes_to_hours(self.ledger.weekday_minutes(employee.id)),
                sunday_hours: minutes_to_hours(self.ledger.sunday_minutes(employee.id)),
                shift_count: self
                    .shifts
                    .iter()
                    .filter(|s| s.employee_id == employee.id)
                    .count() as u32,
                days_worked: WEEK_DAYS
                    .iter()
                    .filter(|&&day| self.ledger.shifts_on(employee.id, day) > 0)
                    .count() as u32,
            })
            .collect();

        let shop_coverage: Vec<ShopCoverage> = self
            .input
            .shops
            .iter()
            .filter(|s| s.active)
            .map(|shop| {
                let demand_slots: u32 = WEEK_DAYS.iter().map(|&d| shop.demand.get(d).total()).sum();
                let open: u32 = WEEK_DAYS
                    .iter()
                    .map(|&d| self.slots.remaining(shop.id, d).total())
                    .sum();
                let filled_slots = demand_slots.saturating_sub(open);
                ShopCoverage {
                    shop_id: shop.id,
                    name: shop.name.clone(),
                    demand_slots,
                    filled_slots,
                    coverage_percent: percent(filled_slots, demand_slots),
                }
            })
            .collect();

        let demand_total: u32 = shop_coverage.iter().map(|c| c.demand_slots).sum();
        let filled_total: u32 = shop_coverage.iter().map(|c| c.filled_slots).sum();
        let unfilled_slot_count: u32 = unfilled_slots.iter().map(|s| s.open_demand).sum();

        let validation = self.validate(&unfilled_slots);
        let (employees_at_target, employees_under, employees_over) = self.hour_buckets();

        RosterResult {
            week_start: self.input.week_start,
            week_end: self.dates[6],
            summary: WeekSummary {
                total_shifts: self.shifts.len() as u32,
                total_hours: self.shifts.iter().map(|s| s.hours).sum(),
                coverage_percent: percent(filled_total, demand_total),
                employees_at_target,
                employees_under,
                employees_over,
                unfilled_slot_count,
            },
            data: RosterData {
                shifts: self.shifts,
                unfilled_slots,
                employee_summaries,
                shop_coverage,
            },
            validation,
        }
    }

    /// Errors block acceptance; warnings are informational. A partial
    /// roster is still returned either way.
    fn validate(&self, unfilled_slots: &[UnfilledSlot]) -> ValidationReport {
        let mut errors: Vec<String> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        for slot in unfilled_slots {
            let shop_name = self
                .input
                .shops
                .iter()
                .find(|s| s.id == slot.shop_id)
                .map_or("unknown shop", |s| s.name.as_str());
            let half = match slot.half {
                DayHalf::Am => "morning",
                DayHalf::Pm => "afternoon",
            };
            errors.push(format!(
                "{} {half} slot(s) unfilled at {shop_name} on {}",
                slot.open_demand, slot.date
            ));
        }

        for employee in &self.input.employees {
            let weekday = self.ledger.weekday_minutes(employee.id);
            let hard_cap = self.config.weekday_cap(employee.contract);
            if weekday > hard_cap + CAP_GRACE_MINUTES {
                errors.push(format!(
                    "{} has {:.1}h weekday hours, over the {:.0}h cap",
                    employee.name,
                    minutes_to_hours(weekday),
                    minutes_to_hours(hard_cap)
                ));
            }

            if !employee.active
                || employee.emergency_only
                || self.input.excluded_employee_ids.contains(&employee.id)
            {
                continue;
            }
            match employee.contract {
                ContractType::FullTime if weekday < self.config.full_time_floor_minutes => {
                    warnings.push(format!(
                        "{} is under contract at {:.1}h weekday hours",
                        employee.name,
                        minutes_to_hours(weekday)
                    ));
                }
                ContractType::PartTime if weekday > self.config.part_time_cap_minutes => {
                    warnings.push(format!(
                        "{} exceeds the part-time cap at {:.1}h weekday hours",
                        employee.name,
                        minutes_to_hours(weekday)
                    ));
                }
                _ => {}
            }
        }

        for &(employee_id, excess) in &self.trim_blocked {
            let name = self
                .employee(employee_id)
                .map_or("unknown employee", |e| e.name.as_str());
            errors.push(format!(
                "{name} remains {excess} minutes over contract; no shift could be trimmed"
            ));
        }

        ValidationReport {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    fn hour_buckets(&self) -> (u32, u32, u32) {
        let mut at_target = 0;
        let mut under = 0;
        let mut over = 0;
        for employee in &self.input.employees {
            if !employee.active || employee.emergency_only {
                continue;
            }
            let weekday = self.ledger.weekday_minutes(employee.id);
            if weekday > self.config.weekday_cap(employee.contract) {
                over += 1;
            } else if employee.contract == ContractType::FullTime
                && weekday < self.config.full_time_floor_minutes
            {
                under += 1;
            } else if self.ledger.total_minutes(employee.id) > 0 {
                at_target += 1;
            }
        }
        (at_target, under, over)
    }
}

fn minutes_to_hours(minutes: u32) -> f64 {
    f64::from(minutes) / 60.0
}

fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        100.0
    } else {
        f64::from(part) * 100.0 / f64::from(whole)
    }
}
