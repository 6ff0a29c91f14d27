use std::collections::HashMap;

use chrono::Weekday;
use uuid::Uuid;

use shared::time::day_index;
use shared::types::ShiftKind;

/// Running per-employee totals, written once per issued shift. Weekday
/// (Monday to Saturday) and Sunday minutes are kept in separate columns;
/// the contract cap only ever looks at the weekday column.
#[derive(Debug, Default)]
pub struct HourLedger {
    entries: HashMap<Uuid, LedgerEntry>,
}

#[derive(Debug, Default, Clone)]
struct LedgerEntry {
    total_minutes: u32,
    weekday_minutes: u32,
    sunday_minutes: u32,
    daily_shifts: [u32; 7],
}

impl HourLedger {
    pub fn record(&mut self, employee: Uuid, day: Weekday, minutes: u32, kind: ShiftKind) {
        let entry = self.entries.entry(employee).or_default();
        entry.total_minutes += minutes;
        if day == Weekday::Sun {
            entry.sunday_minutes += minutes;
        } else {
            entry.weekday_minutes += minutes;
        }
        // A full day occupies both halves and exhausts the daily limit.
        entry.daily_shifts[day_index(day)] += if kind == ShiftKind::FullDay { 2 } else { 1 };
    }

    /// Removes trimmed minutes again. Only the balance stage calls this;
    /// the shift itself stays issued.
    pub fn deduct(&mut self, employee: Uuid, day: Weekday, minutes: u32) {
        let Some(entry) = self.entries.get_mut(&employee) else {
            return;
        };
        entry.total_minutes = entry.total_minutes.saturating_sub(minutes);
        if day == Weekday::Sun {
            entry.sunday_minutes = entry.sunday_minutes.saturating_sub(minutes);
        } else {
            entry.weekday_minutes = entry.weekday_minutes.saturating_sub(minutes);
        }
    }

    pub fn total_minutes(&self, employee: Uuid) -> u32 {
        self.entries.get(&employee).map_or(0, |e| e.total_minutes)
    }

    pub fn weekday_minutes(&self, employee: Uuid) -> u32 {
        self.entries.get(&employee).map_or(0, |e| e.weekday_minutes)
    }

    pub fn sunday_minutes(&self, employee: Uuid) -> u32 {
        self.entries.get(&employee).map_or(0, |e| e.sunday_minutes)
    }

    pub fn shifts_on(&self, employee: Uuid, day: Weekday) -> u32 {
        self.entries
            .get(&employee)
            .map_or(0, |e| e.daily_shifts[day_index(day)])
    }
}
