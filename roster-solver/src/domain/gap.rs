use std::collections::HashSet;

use chrono::{Duration, Weekday};
use uuid::Uuid;

use shared::types::{ContractType, DayHalf, ShiftKind, Shop, StaffingModel};

use crate::domain::engine::RosterEngine;

/// Weekend-first sweep order: the hardest days consume the remaining
/// slack while employees still have headroom under their caps.
const SWEEP_ORDER: [Weekday; 7] = [
    Weekday::Sat,
    Weekday::Fri,
    Weekday::Thu,
    Weekday::Wed,
    Weekday::Tue,
    Weekday::Mon,
    Weekday::Sun,
];

impl<'a> RosterEngine<'a> {
    /// Sweeps all shops for demand the targeted stages left behind,
    /// borrowing company-matched employees by lowest hours first. Repeated
    /// passes let hours freed by one fill unlock the next.
    pub(crate) fn fill_remaining_gaps(&mut self) {
        for pass in 1..=self.config.gap_fill_passes {
            let open_before = self.slots.total_remaining();
            if open_before == 0 {
                break;
            }
            for day in SWEEP_ORDER {
                for shop in self.active_shops() {
                    self.fill_gap_cell(shop, day, DayHalf::Am);
                    self.fill_gap_cell(shop, day, DayHalf::Pm);
                }
            }
            let open_after = self.slots.total_remaining();
            tracing::debug!(pass, open_before, open_after, "Gap sweep finished");
            if open_after == open_before {
                break;
            }
        }

        self.rescue_sunday_afternoons();
        self.rescue_saturday_mornings();
    }

    fn fill_gap_cell(&mut self, shop: &Shop, day: Weekday, half: DayHalf) {
        while self.slots.half_remaining(shop.id, day, half) > 0 {
            if !self.issue_gap_shift(shop, day, half) {
                break;
            }
        }
    }

    /// Borrows the company-matched employee furthest under target. The
    /// shift tops the employee up to their contract; shifts shorter than
    /// the preferred length exist to zero out small deficits exactly.
    fn issue_gap_shift(&mut self, shop: &Shop, day: Weekday, half: DayHalf) -> bool {
        let Some((window_start, window_end)) = self.half_window(shop, day, half) else {
            return false;
        };
        let window_minutes = (window_end - window_start).num_minutes() as u32;

        for candidate in self.borrow_candidates(shop) {
            let Some(employee) = self.employee(candidate) else {
                continue;
            };
            let target = self.config.weekday_target(employee.contract);
            let remaining = target.saturating_sub(self.ledger.weekday_minutes(candidate));
            if remaining < self.config.gap_min_remaining_minutes {
                continue;
            }

            let length = if remaining < self.config.gap_base_shift_minutes {
                remaining
            } else {
                remaining.max(self.config.gap_base_shift_minutes)
            }
            .min(window_minutes);

            let end = window_start + Duration::minutes(i64::from(length));
            if !self.can_assign(candidate, shop, day, window_start, end) {
                continue;
            }
            if self.issue_shift(shop, candidate, day, window_start, end, Self::half_kind(half)) {
                return true;
            }
        }
        false
    }

    /// Company-matched borrow list: the shop's own staff first, then the
    /// rest of the company in declaration order, fairest first overall.
    /// Emergency reserves and pinned solo primaries never appear.
    fn borrow_candidates(&self, shop: &Shop) -> Vec<Uuid> {
        let mut seen: HashSet<Uuid> = HashSet::new();
        let mut ordered: Vec<Uuid> = Vec::new();
        for &id in shop
            .primary_employees
            .iter()
            .chain(&shop.secondary_employees)
        {
            if seen.insert(id) {
                ordered.push(id);
            }
        }
        for employee in &self.input.employees {
            if employee.company.matches(shop.company) && seen.insert(employee.id) {
                ordered.push(employee.id);
            }
        }

        ordered.retain(|id| {
            let Some(employee) = self.employee(*id) else {
                return false;
            };
            employee.active && !employee.emergency_only && !self.pinned.contains(id)
        });
        self.rank_by_weekday_minutes(&ordered)
    }

    /// A full-timer who has already met the weekday contract may take one
    /// Sunday afternoon to close an otherwise dead slot.
    fn rescue_sunday_afternoons(&mut self) {
        for shop in self.active_shops() {
            if self.slots.half_remaining(shop.id, Weekday::Sun, DayHalf::Pm) == 0 {
                continue;
            }
            let Some((start, window_end)) = self.pm_window(shop, Weekday::Sun) else {
                continue;
            };
            let end = (start + Duration::minutes(i64::from(self.config.sunday_rescue_minutes)))
                .min(window_end);

            let candidates: Vec<Uuid> = self
                .input
                .employees
                .iter()
                .filter(|e| {
                    e.contract == ContractType::FullTime
                        && e.company.matches(shop.company)
                        && !e.emergency_only
                        && self.ledger.weekday_minutes(e.id) >= self.config.full_time_floor_minutes
                })
                .map(|e| e.id)
                .collect();

            for id in candidates {
                if self.can_assign(id, shop, Weekday::Sun, start, end)
                    && self.issue_shift(shop, id, Weekday::Sun, start, end, ShiftKind::Evening)
                {
                    tracing::debug!(shop = %shop.name, "Sunday afternoon rescued");
                    break;
                }
            }
        }
    }

    /// A part-timer still under cap may take one Saturday morning on a
    /// blended shop with an open slot.
    fn rescue_saturday_mornings(&mut self) {
        for shop in self.shops_with(StaffingModel::PartTimeBlend) {
            if self.slots.half_remaining(shop.id, Weekday::Sat, DayHalf::Am) == 0 {
                continue;
            }
            let Some((start, window_end)) = self.am_window(shop, Weekday::Sat) else {
                continue;
            };
            let end = (start + Duration::minutes(i64::from(self.config.saturday_rescue_minutes)))
                .min(window_end);

            let candidates: Vec<Uuid> = self
                .input
                .employees
                .iter()
                .filter(|e| {
                    e.contract == ContractType::PartTime
                        && e.company.matches(shop.company)
                        && !e.emergency_only
                        && self.ledger.weekday_minutes(e.id) < self.config.part_time_cap_minutes
                })
                .map(|e| e.id)
                .collect();

            for id in candidates {
                if self.can_assign(id, shop, Weekday::Sat, start, end)
                    && self.issue_shift(shop, id, Weekday::Sat, start, end, ShiftKind::Morning)
                {
                    tracing::debug!(shop = %shop.name, "Saturday morning rescued");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use shared::types::{
        Company, CompanyScope, Employee, OpenHours, ShiftWindowPreference, SlotDemand, WeekMap,
    };
    use std::collections::{HashMap, HashSet};

    use crate::config::SolverConfig;
    use crate::domain::input::RosterInput;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn shop(company: Company, staffing: StaffingModel) -> Shop {
        Shop {
            id: Uuid::new_v4(),
            name: "Shop".to_string(),
            company,
            active: true,
            hours: WeekMap::splat(Some(OpenHours {
                open: t(6, 30),
                close: t(21, 30),
            })),
            demand: WeekMap::default(),
            special_shifts: WeekMap::default(),
            staffing,
            primary_employees: vec![],
            secondary_employees: vec![],
        }
    }

    fn employee(primary: &Shop, contract: ContractType) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            name: "Employee".to_string(),
            company: match primary.company {
                Company::A => CompanyScope::A,
                Company::B => CompanyScope::B,
            },
            contract,
            primary_shop: primary.id,
            secondary_shops: vec![],
            days_off: vec![],
            preference: ShiftWindowPreference::Any,
            emergency_only: false,
            active: true,
        }
    }

    fn input(shops: Vec<Shop>, employees: Vec<Employee>) -> RosterInput {
        RosterInput {
            week_start: NaiveDate::from_ymd_opt(2026, 2, 16).unwrap(),
            shops,
            employees,
            leave_requests: vec![],
            excluded_employee_ids: HashSet::new(),
            am_only_employee_ids: HashSet::new(),
            fixed_days_off: HashMap::new(),
        }
    }

    #[test]
    fn gap_shift_length_tops_up_to_the_contract_exactly() {
        let mut shop = shop(Company::A, StaffingModel::Flagship);
        *shop.demand.get_mut(Weekday::Sat) = SlotDemand { am: 1, pm: 0 };
        let worker = employee(&shop, ContractType::FullTime);
        let worker_id = worker.id;

        let snapshot = input(vec![shop.clone()], vec![worker]);
        let config = SolverConfig::default();
        let mut engine = RosterEngine::new(&snapshot, &config);

        // 37h already on the books; 3h short of the 40h target.
        for day in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu] {
            engine.issue_shift(&shop, worker_id, day, t(6, 30), t(15, 45), ShiftKind::Morning);
        }
        assert_eq!(engine.ledger.weekday_minutes(worker_id), 2220);

        engine.fill_remaining_gaps();

        let saturday: Vec<_> = engine
            .shifts
            .iter()
            .filter(|s| s.weekday == Weekday::Sat)
            .collect();
        assert_eq!(saturday.len(), 1);
        assert_eq!(saturday[0].hours, 3.0);
        assert_eq!(engine.ledger.weekday_minutes(worker_id), 2400);
        assert_eq!(engine.slots.total_remaining(), 0);
    }

    #[test]
    fn gap_filler_skips_employees_within_the_minimum_remaining() {
        let mut shop = shop(Company::A, StaffingModel::Flagship);
        *shop.demand.get_mut(Weekday::Fri) = SlotDemand { am: 1, pm: 0 };
        let worker = employee(&shop, ContractType::FullTime);
        let worker_id = worker.id;

        let snapshot = input(vec![shop.clone()], vec![worker]);
        let config = SolverConfig::default();
        let mut engine = RosterEngine::new(&snapshot, &config);

        // 38.5h on the books leaves 1.5h, below the 2.5h minimum.
        for day in [Weekday::Mon, Weekday::Tue] {
            engine.issue_shift(&shop, worker_id, day, t(6, 30), t(17, 30), ShiftKind::Morning);
        }
        engine.issue_shift(&shop, worker_id, Weekday::Wed, t(6, 30), t(15, 0), ShiftKind::Morning);
        engine.issue_shift(&shop, worker_id, Weekday::Thu, t(6, 30), t(14, 30), ShiftKind::Morning);
        assert_eq!(engine.ledger.weekday_minutes(worker_id), 2310);

        engine.fill_remaining_gaps();

        assert_eq!(engine.slots.total_remaining(), 1);
        assert_eq!(engine.ledger.weekday_minutes(worker_id), 2310);
    }

    #[test]
    fn borrowing_respects_company_boundaries() {
        let mut shop_a = shop(Company::A, StaffingModel::Flagship);
        *shop_a.demand.get_mut(Weekday::Mon) = SlotDemand { am: 1, pm: 0 };
        let shop_b = shop(Company::B, StaffingModel::Flagship);
        let other_company = employee(&shop_b, ContractType::FullTime);

        let snapshot = input(vec![shop_a, shop_b], vec![other_company]);
        let config = SolverConfig::default();
        let mut engine = RosterEngine::new(&snapshot, &config);

        engine.fill_remaining_gaps();

        assert!(engine.shifts.is_empty());
        assert_eq!(engine.slots.total_remaining(), 1);
    }

    #[test]
    fn sunday_rescue_requires_a_full_contract_week() {
        let mut shop = shop(Company::A, StaffingModel::Flagship);
        *shop.demand.get_mut(Weekday::Sun) = SlotDemand { am: 0, pm: 1 };
        let worker = employee(&shop, ContractType::FullTime);
        let worker_id = worker.id;

        let snapshot = input(vec![shop.clone()], vec![worker]);
        let config = SolverConfig::default();

        // 37h40m: too close to target for the regular sweep, below the
        // 38h floor for the rescue. The slot stays open.
        let mut engine = RosterEngine::new(&snapshot, &config);
        for day in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu] {
            engine.issue_shift(&shop, worker_id, day, t(6, 30), t(14, 30), ShiftKind::Morning);
        }
        engine.issue_shift(&shop, worker_id, Weekday::Fri, t(6, 30), t(12, 10), ShiftKind::Morning);
        assert_eq!(engine.ledger.weekday_minutes(worker_id), 2260);
        engine.fill_remaining_gaps();
        assert_eq!(engine.slots.total_remaining(), 1);

        // At the floor: one 7.5h Sunday afternoon.
        let mut engine = RosterEngine::new(&snapshot, &config);
        for day in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ] {
            engine.issue_shift(&shop, worker_id, day, t(6, 30), t(14, 6), ShiftKind::Morning);
        }
        assert_eq!(engine.ledger.weekday_minutes(worker_id), 2280);
        engine.fill_remaining_gaps();

        let sunday: Vec<_> = engine
            .shifts
            .iter()
            .filter(|s| s.weekday == Weekday::Sun)
            .collect();
        assert_eq!(sunday.len(), 1);
        assert_eq!(sunday[0].hours, 7.5);
        assert_eq!(sunday[0].start, t(14, 0));
        assert!(sunday[0].overtime);
        assert_eq!(engine.slots.total_remaining(), 0);
    }
}
