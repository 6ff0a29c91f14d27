use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveTime, Weekday};
use uuid::Uuid;

use shared::time::{day_index, week_dates};
use shared::types::{
    DayHalf, Employee, LeaveStatus, RosterResult, Shift, ShiftKind, ShiftWindowPreference, Shop,
    SpecialInterval, StaffingModel,
};

use crate::config::SolverConfig;
use crate::domain::input::RosterInput;
use crate::domain::ledger::HourLedger;
use crate::domain::slots::SlotTracker;

/// Per-employee availability, collapsed from personal constraints and the
/// per-week overlays at build time. Every stage consults this through
/// [`RosterEngine::can_assign`] and nothing else.
#[derive(Debug, Default)]
struct ResolvedConstraints {
    off_days: [bool; 7],
    morning_only: bool,
    evening_only: bool,
    excluded: bool,
    leave: Vec<(NaiveDate, NaiveDate)>,
}

/// Owns everything the stages mutate: the shift list, the hour ledger, the
/// slot tracker, and the shift id counter. Stages run as methods in a
/// fixed order; later stages see earlier decisions but never revisit them.
pub struct RosterEngine<'a> {
    pub(crate) input: &'a RosterInput,
    pub(crate) config: &'a SolverConfig,
    pub(crate) dates: [NaiveDate; 7],
    pub(crate) shifts: Vec<Shift>,
    pub(crate) ledger: HourLedger,
    pub(crate) slots: SlotTracker,
    next_shift_id: u32,
    employees: HashMap<Uuid, &'a Employee>,
    constraints: HashMap<Uuid, ResolvedConstraints>,
    /// Fixed morning primaries of solo shops; the gap filler never
    /// borrows them for other shops.
    pub(crate) pinned: HashSet<Uuid>,
    /// Lets emergency-only staff through the oracle; set only while the
    /// emergency stage runs.
    pub(crate) emergency_stage: bool,
    /// Employees the balance stage could not bring back to target, with
    /// the excess minutes.
    pub(crate) trim_blocked: Vec<(Uuid, u32)>,
}

impl<'a> RosterEngine<'a> {
    pub fn new(input: &'a RosterInput, config: &'a SolverConfig) -> Self {
        let mut constraints: HashMap<Uuid, ResolvedConstraints> = HashMap::new();
        for employee in &input.employees {
            let mut resolved = ResolvedConstraints::default();
            for &day in &employee.days_off {
                resolved.off_days[day_index(day)] = true;
            }
            if let Some(extra) = input.fixed_days_off.get(&employee.id) {
                for &day in extra {
                    resolved.off_days[day_index(day)] = true;
                }
            }
            resolved.morning_only = employee.preference == ShiftWindowPreference::MorningOnly
                || input.am_only_employee_ids.contains(&employee.id);
            resolved.evening_only =
                employee.preference == ShiftWindowPreference::EveningOnly && !resolved.morning_only;
            resolved.excluded = input.excluded_employee_ids.contains(&employee.id);
            constraints.insert(employee.id, resolved);
        }
        for leave in &input.leave_requests {
            if leave.status != LeaveStatus::Approved {
                continue;
            }
            if let Some(resolved) = constraints.get_mut(&leave.employee_id) {
                resolved.leave.push((leave.start_date, leave.end_date));
            }
        }

        let pinned = input
            .shops
            .iter()
            .filter(|s| s.staffing == StaffingModel::SoloWithBackups)
            .filter_map(|s| s.primary_employees.first().copied())
            .collect();

        Self {
            input,
            config,
            dates: week_dates(input.week_start),
            shifts: Vec::new(),
            ledger: HourLedger::default(),
            slots: SlotTracker::seed(&input.shops),
            next_shift_id: 0,
            employees: input.employees.iter().map(|e| (e.id, e)).collect(),
            constraints,
            pinned,
            emergency_stage: false,
            trim_blocked: Vec::new(),
        }
    }

    /// Runs every stage in order and assembles the result.
    pub fn run(mut self) -> RosterResult {
        tracing::debug!(
            week_start = %self.input.week_start,
            open_slots = self.slots.total_remaining(),
            "Starting roster build"
        );

        self.assign_solo_shops();
        self.assign_saturday_special_shops();
        self.assign_two_person_shops();
        self.assign_flagship_shops();
        self.assign_small_team_shops();
        self.assign_blended_shops();
        tracing::debug!(
            shifts = self.shifts.len(),
            open_slots = self.slots.total_remaining(),
            "Targeted shop stages complete"
        );

        self.fill_remaining_gaps();
        self.cover_with_emergency_staff();
        self.balance_weekday_hours();

        tracing::debug!(
            shifts = self.shifts.len(),
            open_slots = self.slots.total_remaining(),
            "Roster build complete"
        );
        self.into_result()
    }

    // region: Lookups

    pub(crate) fn employee(&self, id: Uuid) -> Option<&'a Employee> {
        self.employees.get(&id).copied()
    }

    pub(crate) fn date_of(&self, day: Weekday) -> NaiveDate {
        self.dates[day_index(day)]
    }

    pub(crate) fn active_shops(&self) -> Vec<&'a Shop> {
        self.input.shops.iter().filter(|s| s.active).collect()
    }

    pub(crate) fn shops_with(&self, model: StaffingModel) -> Vec<&'a Shop> {
        self.input
            .shops
            .iter()
            .filter(|s| s.active && s.staffing == model)
            .collect()
    }

    // endregion: Lookups

    // region: Feasibility oracle

    /// The single gate every assignment passes through: activity,
    /// exclusions, days off, leave, the weekday contract cap, the per-day
    /// shift limit, and morning/evening restrictions. Sunday never counts
    /// against the weekday cap.
    pub(crate) fn can_assign(
        &self,
        employee_id: Uuid,
        shop: &Shop,
        day: Weekday,
        start: NaiveTime,
        end: NaiveTime,
    ) -> bool {
        let Some(employee) = self.employee(employee_id) else {
            return false;
        };
        let Some(rules) = self.constraints.get(&employee_id) else {
            return false;
        };

        if !employee.active || rules.excluded {
            return false;
        }
        if employee.emergency_only && !self.emergency_stage {
            return false;
        }
        if rules.off_days[day_index(day)] {
            return false;
        }
        let date = self.date_of(day);
        if rules.leave.iter().any(|&(from, to)| from <= date && date <= to) {
            return false;
        }

        let minutes = (end - start).num_minutes().max(0) as u32;
        if day != Weekday::Sun {
            let cap = self.config.weekday_cap(employee.contract);
            if self.ledger.weekday_minutes(employee_id) + minutes > cap {
                return false;
            }
        }

        let taken_today = self.ledger.shifts_on(employee_id, day);
        if taken_today >= self.config.max_shifts_per_day {
            return false;
        }
        if taken_today >= 1 && minutes > self.config.second_shift_max_minutes {
            return false;
        }

        let midpoint = self.config.midpoint(shop.company);
        if rules.morning_only && start >= midpoint {
            return false;
        }
        if rules.evening_only && start < midpoint {
            return false;
        }

        true
    }

    // endregion: Feasibility oracle

    // region: Shift issuer

    /// Appends a shift and updates the ledger and slot tracker. Duplicate
    /// attempts and sub-minimum shifts are discarded without error, so
    /// callers may retry freely.
    pub(crate) fn issue_shift(
        &mut self,
        shop: &Shop,
        employee_id: Uuid,
        day: Weekday,
        start: NaiveTime,
        end: NaiveTime,
        kind: ShiftKind,
    ) -> bool {
        let minutes = (end - start).num_minutes();
        if minutes < self.config.min_issue_minutes as i64 {
            tracing::debug!(%employee_id, %start, %end, "Refusing sub-minimum shift");
            return false;
        }

        let date = self.date_of(day);
        let duplicate = self.shifts.iter().any(|s| {
            s.employee_id == employee_id && s.date == date && s.start == start && s.end == end
        });
        if duplicate {
            tracing::debug!(%employee_id, %date, "Discarding duplicate shift attempt");
            return false;
        }

        self.next_shift_id += 1;
        self.shifts.push(Shift {
            id: self.next_shift_id,
            shop_id: shop.id,
            employee_id,
            weekday: day,
            date,
            start,
            end,
            hours: minutes as f64 / 60.0,
            kind,
            overtime: day == Weekday::Sun,
        });
        self.ledger.record(employee_id, day, minutes as u32, kind);
        self.slots.consume(shop.id, day, kind);
        true
    }

    // endregion: Shift issuer

    // region: Shared assignment helpers

    pub(crate) fn am_window(&self, shop: &Shop, day: Weekday) -> Option<(NaiveTime, NaiveTime)> {
        let hours = (*shop.hours.get(day))?;
        let end = hours.close.min(self.config.midpoint(shop.company));
        (hours.open < end).then_some((hours.open, end))
    }

    pub(crate) fn pm_window(&self, shop: &Shop, day: Weekday) -> Option<(NaiveTime, NaiveTime)> {
        let hours = (*shop.hours.get(day))?;
        let start = hours.open.max(self.config.midpoint(shop.company));
        (start < hours.close).then_some((start, hours.close))
    }

    pub(crate) fn half_window(
        &self,
        shop: &Shop,
        day: Weekday,
        half: DayHalf,
    ) -> Option<(NaiveTime, NaiveTime)> {
        match half {
            DayHalf::Am => self.am_window(shop, day),
            DayHalf::Pm => self.pm_window(shop, day),
        }
    }

    pub(crate) fn half_kind(half: DayHalf) -> ShiftKind {
        match half {
            DayHalf::Am => ShiftKind::Morning,
            DayHalf::Pm => ShiftKind::Evening,
        }
    }

    /// Candidates furthest from their contract target come first;
    /// declaration order breaks ties, so the ordering is reproducible.
    pub(crate) fn rank_by_weekday_minutes(&self, ids: &[Uuid]) -> Vec<Uuid> {
        let mut ranked = ids.to_vec();
        ranked.sort_by_key(|&id| self.ledger.weekday_minutes(id));
        ranked
    }

    /// Assign the whole open window to one person while both halves still
    /// need someone; covering the full day satisfies an AM and a PM slot
    /// at once.
    pub(crate) fn try_full_day(&mut self, shop: &Shop, employee_id: Uuid, day: Weekday) -> bool {
        let remaining = self.slots.remaining(shop.id, day);
        if remaining.am == 0 || remaining.pm == 0 {
            return false;
        }
        let Some(hours) = *shop.hours.get(day) else {
            return false;
        };
        if !self.can_assign(employee_id, shop, day, hours.open, hours.close) {
            return false;
        }
        self.issue_shift(shop, employee_id, day, hours.open, hours.close, ShiftKind::FullDay)
    }

    /// Assign one half-day slot if the employee fits its window.
    pub(crate) fn try_half_shift(
        &mut self,
        shop: &Shop,
        employee_id: Uuid,
        day: Weekday,
        half: DayHalf,
    ) -> bool {
        if self.slots.half_remaining(shop.id, day, half) == 0 {
            return false;
        }
        let Some((start, end)) = self.half_window(shop, day, half) else {
            return false;
        };
        if !self.can_assign(employee_id, shop, day, start, end) {
            return false;
        }
        self.issue_shift(shop, employee_id, day, start, end, Self::half_kind(half))
    }

    /// Issue half shifts from `candidates`, fairest first, until the
    /// half's demand is exhausted or nobody else fits.
    pub(crate) fn fill_half(&mut self, shop: &Shop, day: Weekday, half: DayHalf, candidates: &[Uuid]) {
        let mut rejected: HashSet<Uuid> = HashSet::new();
        while self.slots.half_remaining(shop.id, day, half) > 0 {
            let mut progressed = false;
            for id in self.rank_by_weekday_minutes(candidates) {
                if rejected.contains(&id) {
                    continue;
                }
                if self.try_half_shift(shop, id, day, half) {
                    progressed = true;
                    break;
                }
                rejected.insert(id);
            }
            if !progressed {
                break;
            }
        }
    }

    /// Hand the declared intervals to the primaries in order; each
    /// interval's classification decides which slot it consumes.
    pub(crate) fn dispatch_special_shifts(&mut self, shop: &Shop, day: Weekday) {
        let intervals = shop.special_shifts.get(day).clone();
        let mut used: HashSet<Uuid> = HashSet::new();
        for interval in intervals {
            let kind = self.classify_interval(interval);
            for &candidate in &shop.primary_employees {
                if used.contains(&candidate) {
                    continue;
                }
                if !self.can_assign(candidate, shop, day, interval.start, interval.end) {
                    continue;
                }
                if self.issue_shift(shop, candidate, day, interval.start, interval.end, kind) {
                    used.insert(candidate);
                    break;
                }
            }
        }
    }

    pub(crate) fn classify_interval(&self, interval: SpecialInterval) -> ShiftKind {
        let minutes = (interval.end - interval.start).num_minutes();
        if minutes >= self.config.full_day_threshold_minutes as i64 {
            ShiftKind::FullDay
        } else if interval.start < self.config.morning_cutoff {
            ShiftKind::Morning
        } else {
            ShiftKind::Evening
        }
    }

    // endregion: Shared assignment helpers
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::types::{
        Company, CompanyScope, ContractType, LeaveRequest, OpenHours, SlotDemand, WeekMap,
    };

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 16).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn shop(company: Company) -> Shop {
        Shop {
            id: Uuid::new_v4(),
            name: "Shop".to_string(),
            company,
            active: true,
            hours: WeekMap::splat(Some(OpenHours {
                open: t(6, 30),
                close: t(21, 30),
            })),
            demand: WeekMap::splat(SlotDemand { am: 2, pm: 2 }),
            special_shifts: WeekMap::default(),
            staffing: StaffingModel::TwoPerson,
            primary_employees: vec![],
            secondary_employees: vec![],
        }
    }

    fn employee(primary: &Shop) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            name: "Employee".to_string(),
            company: CompanyScope::Both,
            contract: ContractType::FullTime,
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
            week_start: monday(),
            shops,
            employees,
            leave_requests: vec![],
            excluded_employee_ids: HashSet::new(),
            am_only_employee_ids: HashSet::new(),
            fixed_days_off: HashMap::new(),
        }
    }

    #[test]
    fn oracle_rejects_days_off_and_overlays() {
        let shop = shop(Company::A);
        let mut worker = employee(&shop);
        worker.days_off = vec![Weekday::Mon];
        let worker_id = worker.id;
        let mut snapshot = input(vec![shop.clone()], vec![worker]);
        snapshot
            .fixed_days_off
            .insert(worker_id, vec![Weekday::Wed]);
        let config = SolverConfig::default();
        let engine = RosterEngine::new(&snapshot, &config);

        assert!(!engine.can_assign(worker_id, &shop, Weekday::Mon, t(6, 30), t(14, 0)));
        assert!(!engine.can_assign(worker_id, &shop, Weekday::Wed, t(6, 30), t(14, 0)));
        assert!(engine.can_assign(worker_id, &shop, Weekday::Tue, t(6, 30), t(14, 0)));
    }

    #[test]
    fn oracle_rejects_approved_leave_only() {
        let shop = shop(Company::A);
        let worker = employee(&shop);
        let worker_id = worker.id;
        let mut snapshot = input(vec![shop.clone()], vec![worker]);
        snapshot.leave_requests.push(LeaveRequest {
            employee_id: worker_id,
            start_date: monday(),
            end_date: monday() + chrono::Duration::days(2),
            status: LeaveStatus::Approved,
        });
        snapshot.leave_requests.push(LeaveRequest {
            employee_id: worker_id,
            start_date: monday() + chrono::Duration::days(4),
            end_date: monday() + chrono::Duration::days(4),
            status: LeaveStatus::Pending,
        });
        let config = SolverConfig::default();
        let engine = RosterEngine::new(&snapshot, &config);

        // Mon-Wed approved leave blocks; Friday's pending request does not.
        assert!(!engine.can_assign(worker_id, &shop, Weekday::Tue, t(6, 30), t(14, 0)));
        assert!(engine.can_assign(worker_id, &shop, Weekday::Thu, t(6, 30), t(14, 0)));
        assert!(engine.can_assign(worker_id, &shop, Weekday::Fri, t(6, 30), t(14, 0)));
    }

    #[test]
    fn oracle_enforces_the_weekday_cap_but_not_on_sunday() {
        let shop = shop(Company::A);
        let worker = employee(&shop);
        let worker_id = worker.id;
        let snapshot = input(vec![shop.clone()], vec![worker]);
        let config = SolverConfig::default();
        let mut engine = RosterEngine::new(&snapshot, &config);

        // Five 8h days leave 2h of headroom under the 42h hard cap.
        for day in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ] {
            engine.issue_shift(&shop, worker_id, day, t(6, 30), t(14, 30), ShiftKind::Morning);
        }
        assert_eq!(engine.ledger.weekday_minutes(worker_id), 2400);

        assert!(!engine.can_assign(worker_id, &shop, Weekday::Sat, t(6, 30), t(14, 0)));
        assert!(engine.can_assign(worker_id, &shop, Weekday::Sat, t(6, 30), t(8, 30)));
        // Sunday ignores the weekday cap entirely.
        assert!(engine.can_assign(worker_id, &shop, Weekday::Sun, t(6, 30), t(14, 0)));
    }

    #[test]
    fn oracle_limits_shifts_per_day_and_second_shift_length() {
        let shop = shop(Company::A);
        let worker = employee(&shop);
        let worker_id = worker.id;
        let snapshot = input(vec![shop.clone()], vec![worker]);
        let config = SolverConfig::default();
        let mut engine = RosterEngine::new(&snapshot, &config);

        engine.issue_shift(&shop, worker_id, Weekday::Mon, t(6, 30), t(11, 30), ShiftKind::Morning);

        // Second shift over 8h is out, 7.5h is fine.
        assert!(!engine.can_assign(worker_id, &shop, Weekday::Mon, t(11, 30), t(20, 0)));
        assert!(engine.can_assign(worker_id, &shop, Weekday::Mon, t(14, 0), t(21, 30)));

        engine.issue_shift(&shop, worker_id, Weekday::Mon, t(14, 0), t(21, 30), ShiftKind::Evening);
        // Two shifts exhaust the day.
        assert!(!engine.can_assign(worker_id, &shop, Weekday::Mon, t(12, 0), t(13, 0)));
    }

    #[test]
    fn oracle_honors_morning_and_evening_restrictions() {
        let shop = shop(Company::A);
        let mut early = employee(&shop);
        early.preference = ShiftWindowPreference::MorningOnly;
        let mut late = employee(&shop);
        late.preference = ShiftWindowPreference::EveningOnly;
        let (early_id, late_id) = (early.id, late.id);
        let snapshot = input(vec![shop.clone()], vec![early, late]);
        let config = SolverConfig::default();
        let engine = RosterEngine::new(&snapshot, &config);

        // Company A midpoint is 14:00.
        assert!(engine.can_assign(early_id, &shop, Weekday::Mon, t(6, 30), t(14, 0)));
        assert!(!engine.can_assign(early_id, &shop, Weekday::Mon, t(14, 0), t(21, 30)));
        assert!(engine.can_assign(late_id, &shop, Weekday::Mon, t(14, 0), t(21, 30)));
        assert!(!engine.can_assign(late_id, &shop, Weekday::Mon, t(6, 30), t(14, 0)));
    }

    #[test]
    fn oracle_withholds_emergency_staff_outside_the_emergency_stage() {
        let shop = shop(Company::A);
        let mut reserve = employee(&shop);
        reserve.emergency_only = true;
        let reserve_id = reserve.id;
        let snapshot = input(vec![shop.clone()], vec![reserve]);
        let config = SolverConfig::default();
        let mut engine = RosterEngine::new(&snapshot, &config);

        assert!(!engine.can_assign(reserve_id, &shop, Weekday::Mon, t(6, 30), t(14, 0)));
        engine.emergency_stage = true;
        assert!(engine.can_assign(reserve_id, &shop, Weekday::Mon, t(6, 30), t(14, 0)));
    }

    #[test]
    fn issuer_discards_duplicates_and_keeps_ids_monotonic() {
        let shop = shop(Company::A);
        let worker = employee(&shop);
        let worker_id = worker.id;
        let snapshot = input(vec![shop.clone()], vec![worker]);
        let config = SolverConfig::default();
        let mut engine = RosterEngine::new(&snapshot, &config);

        assert!(engine.issue_shift(&shop, worker_id, Weekday::Mon, t(6, 30), t(14, 0), ShiftKind::Morning));
        assert!(!engine.issue_shift(&shop, worker_id, Weekday::Mon, t(6, 30), t(14, 0), ShiftKind::Morning));
        assert!(engine.issue_shift(&shop, worker_id, Weekday::Tue, t(6, 30), t(14, 0), ShiftKind::Morning));

        let ids: Vec<u32> = engine.shifts.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(engine.ledger.shifts_on(worker_id, Weekday::Mon), 1);
    }

    #[test]
    fn issuer_refuses_shifts_under_half_an_hour() {
        let shop = shop(Company::A);
        let worker = employee(&shop);
        let worker_id = worker.id;
        let snapshot = input(vec![shop.clone()], vec![worker]);
        let config = SolverConfig::default();
        let mut engine = RosterEngine::new(&snapshot, &config);

        assert!(!engine.issue_shift(&shop, worker_id, Weekday::Mon, t(9, 0), t(9, 20), ShiftKind::Morning));
        assert!(engine.shifts.is_empty());
        assert_eq!(engine.ledger.total_minutes(worker_id), 0);
    }

    #[test]
    fn reduced_sunday_window_leaves_no_afternoon() {
        let mut shop = shop(Company::B);
        *shop.hours.get_mut(Weekday::Sun) = Some(OpenHours {
            open: t(8, 0),
            close: t(12, 30),
        });
        let snapshot = input(vec![shop.clone()], vec![]);
        let config = SolverConfig::default();
        let engine = RosterEngine::new(&snapshot, &config);

        // Company B midpoint is 13:00, past Sunday's close.
        assert_eq!(engine.am_window(&shop, Weekday::Sun), Some((t(8, 0), t(12, 30))));
        assert_eq!(engine.pm_window(&shop, Weekday::Sun), None);
        assert_eq!(engine.pm_window(&shop, Weekday::Mon), Some((t(13, 0), t(21, 30))));
    }

    #[test]
    fn interval_classification() {
        let shop = shop(Company::A);
        let snapshot = input(vec![shop], vec![]);
        let config = SolverConfig::default();
        let engine = RosterEngine::new(&snapshot, &config);

        let long = SpecialInterval { start: t(10, 0), end: t(21, 30) };
        let early = SpecialInterval { start: t(6, 30), end: t(14, 0) };
        let late = SpecialInterval { start: t(13, 0), end: t(19, 0) };

        assert_eq!(engine.classify_interval(long), ShiftKind::FullDay);
        assert_eq!(engine.classify_interval(early), ShiftKind::Morning);
        assert_eq!(engine.classify_interval(late), ShiftKind::Evening);
    }

    #[test]
    fn ranking_is_fairest_first_with_stable_ties() {
        let shop = shop(Company::A);
        let first = employee(&shop);
        let second = employee(&shop);
        let third = employee(&shop);
        let ids = [first.id, second.id, third.id];
        let snapshot = input(vec![shop.clone()], vec![first, second, third]);
        let config = SolverConfig::default();
        let mut engine = RosterEngine::new(&snapshot, &config);

        engine.issue_shift(&shop, ids[0], Weekday::Mon, t(6, 30), t(14, 0), ShiftKind::Morning);

        // Untouched employees tie at zero and keep declaration order.
        assert_eq!(engine.rank_by_weekday_minutes(&ids), vec![ids[1], ids[2], ids[0]]);
    }
}
