use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// region: Roster domain types

/// Owning company of a shop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Company {
    A,
    B,
}

/// Which company (or companies) an employee may be rostered for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanyScope {
    A,
    B,
    Both,
}

impl CompanyScope {
    pub fn matches(self, company: Company) -> bool {
        match (self, company) {
            (CompanyScope::Both, _) => true,
            (CompanyScope::A, Company::A) => true,
            (CompanyScope::B, Company::B) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractType {
    FullTime,
    PartTime,
}

/// Personal restriction on which half of the day an employee works.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftWindowPreference {
    Any,
    MorningOnly,
    EveningOnly,
}

impl ShiftWindowPreference {
    fn any() -> Self {
        ShiftWindowPreference::Any
    }
}

/// Staffing pattern a shop is covered with. Each pattern has its own
/// targeted assignment stage; rosters come from the shop's primary and
/// secondary employee lists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffingModel {
    /// One fixed morning primary, ordered backups cover the rest.
    SoloWithBackups,
    /// Two primaries; Saturday runs on declared special intervals.
    SaturdaySpecial,
    /// Two primaries rotating first pick by day parity.
    TwoPerson,
    /// Large primary roster filled lowest-hours-first.
    Flagship,
    /// Small primary roster with a secondary bridge.
    SmallTeam,
    /// Full-timers first, part-timers fill the remainder.
    PartTimeBlend,
}

/// Opening window for one day. A closed day carries no `OpenHours` at all.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl OpenHours {
    pub fn span_minutes(&self) -> i64 {
        (self.close - self.open).num_minutes()
    }
}

/// Base staffing demand for one day, split into morning and afternoon slots.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotDemand {
    pub am: u32,
    pub pm: u32,
}

impl SlotDemand {
    pub fn total(&self) -> u32 {
        self.am + self.pm
    }
}

/// A declared interval that replaces the default AM/PM split for one day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpecialInterval {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Per-day values for one week, indexed Monday-first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct WeekMap<T>([T; 7]);

impl<T> WeekMap<T> {
    pub fn new(days: [T; 7]) -> Self {
        Self(days)
    }

    pub fn get(&self, day: Weekday) -> &T {
        &self.0[day.num_days_from_monday() as usize]
    }

    pub fn get_mut(&mut self, day: Weekday) -> &mut T {
        &mut self.0[day.num_days_from_monday() as usize]
    }
}

impl<T: Clone> WeekMap<T> {
    pub fn splat(value: T) -> Self {
        Self(std::array::from_fn(|_| value.clone()))
    }
}

impl<T: Default> Default for WeekMap<T> {
    fn default() -> Self {
        Self(std::array::from_fn(|_| T::default()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shop {
    pub id: Uuid,
    pub name: String,
    pub company: Company,
    pub active: bool,
    pub hours: WeekMap<Option<OpenHours>>,
    pub demand: WeekMap<SlotDemand>,
    #[serde(default)]
    pub special_shifts: WeekMap<Vec<SpecialInterval>>,
    pub staffing: StaffingModel,
    pub primary_employees: Vec<Uuid>,
    #[serde(default)]
    pub secondary_employees: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub company: CompanyScope,
    pub contract: ContractType,
    pub primary_shop: Uuid,
    #[serde(default)]
    pub secondary_shops: Vec<Uuid>,
    #[serde(default)]
    pub days_off: Vec<Weekday>,
    #[serde(default = "ShiftWindowPreference::any")]
    pub preference: ShiftWindowPreference,
    #[serde(default)]
    pub emergency_only: bool,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// A leave request over an inclusive date range. Only approved requests
/// block scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub employee_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
}

// endregion: Roster domain types

// region: Solver output types

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayHalf {
    Am,
    Pm,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftKind {
    Morning,
    Evening,
    FullDay,
}

/// One concrete assignment in the produced roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Shift {
    pub id: u32,
    pub shop_id: Uuid,
    pub employee_id: Uuid,
    pub weekday: Weekday,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub hours: f64,
    pub kind: ShiftKind,
    pub overtime: bool,
}

/// A demand slot nobody could be found for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnfilledSlot {
    pub shop_id: Uuid,
    pub weekday: Weekday,
    pub date: NaiveDate,
    pub half: DayHalf,
    pub open_demand: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeSummary {
    pub employee_id: Uuid,
    pub name: String,
    pub contract: ContractType,
    pub total_hours: f64,
    pub weekday_hours: f64,
    pub sunday_hours: f64,
    pub shift_count: u32,
    pub days_worked: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopCoverage {
    pub shop_id: Uuid,
    pub name: String,
    pub demand_slots: u32,
    pub filled_slots: u32,
    pub coverage_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekSummary {
    pub total_shifts: u32,
    pub total_hours: f64,
    pub coverage_percent: f64,
    pub employees_at_target: u32,
    pub employees_under: u32,
    pub employees_over: u32,
    pub unfilled_slot_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterData {
    pub shifts: Vec<Shift>,
    pub unfilled_slots: Vec<UnfilledSlot>,
    pub employee_summaries: Vec<EmployeeSummary>,
    pub shop_coverage: Vec<ShopCoverage>,
}

/// Complete solver output for one week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterResult {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub summary: WeekSummary,
    pub data: RosterData,
    pub validation: ValidationReport,
}

// endregion: Solver output types

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_scope_matching() {
        assert!(CompanyScope::A.matches(Company::A));
        assert!(!CompanyScope::A.matches(Company::B));
        assert!(CompanyScope::Both.matches(Company::A));
        assert!(CompanyScope::Both.matches(Company::B));
    }

    #[test]
    fn week_map_is_monday_first() {
        let mut map = WeekMap::new([0u32, 1, 2, 3, 4, 5, 6]);
        assert_eq!(*map.get(Weekday::Mon), 0);
        assert_eq!(*map.get(Weekday::Sun), 6);

        *map.get_mut(Weekday::Wed) = 42;
        assert_eq!(*map.get(Weekday::Wed), 42);
    }
}
