use chrono::Weekday;
use uuid::Uuid;

use shared::types::{ContractType, DayHalf, Shop, StaffingModel};

use crate::domain::WEEK_DAYS;
use crate::domain::engine::RosterEngine;

/// Targeted staffing stages, one per shop class. Days always run Monday
/// to Sunday; full days are preferred whenever both halves still need
/// someone, and declared special intervals replace the default split for
/// that day.
impl<'a> RosterEngine<'a> {
    /// Shops where one fixed primary opens every morning and an ordered
    /// backup list covers the rest. The primary never takes the
    /// afternoon; backups stand in for the morning only when the primary
    /// cannot work at all.
    pub(crate) fn assign_solo_shops(&mut self) {
        for shop in self.shops_with(StaffingModel::SoloWithBackups) {
            for day in WEEK_DAYS {
                if self.dispatch_if_special(shop, day) {
                    continue;
                }
                if shop.hours.get(day).is_none() {
                    continue;
                }

                if self.slots.half_remaining(shop.id, day, DayHalf::Am) > 0 {
                    let mut covered = false;
                    if let Some(&primary) = shop.primary_employees.first() {
                        covered = self.try_half_shift(shop, primary, day, DayHalf::Am);
                    }
                    if !covered {
                        for &backup in &shop.secondary_employees {
                            if self.try_half_shift(shop, backup, day, DayHalf::Am) {
                                break;
                            }
                        }
                    }
                }

                if self.slots.half_remaining(shop.id, day, DayHalf::Pm) > 0 {
                    for &backup in &shop.secondary_employees {
                        if self.try_half_shift(shop, backup, day, DayHalf::Pm) {
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Two-primary shops whose Saturday runs on declared intervals; other
    /// days prefer a full day and fall back to a plain split.
    pub(crate) fn assign_saturday_special_shops(&mut self) {
        for shop in self.shops_with(StaffingModel::SaturdaySpecial) {
            for day in WEEK_DAYS {
                if self.dispatch_if_special(shop, day) {
                    continue;
                }
                if shop.hours.get(day).is_none() {
                    continue;
                }
                self.prefer_full_day_then_split(shop, day, &shop.primary_employees);
            }
        }
    }

    /// Two primaries rotate who gets first pick by day parity: one opens
    /// on even days, the other on odd days. Fair rotation without any
    /// carried state.
    pub(crate) fn assign_two_person_shops(&mut self) {
        for shop in self.shops_with(StaffingModel::TwoPerson) {
            for (index, day) in WEEK_DAYS.into_iter().enumerate() {
                if self.dispatch_if_special(shop, day) {
                    continue;
                }
                if shop.hours.get(day).is_none() {
                    continue;
                }

                let mut order: Vec<Uuid> = shop.primary_employees.clone();
                if order.len() >= 2 && index % 2 == 1 {
                    order.swap(0, 1);
                }

                let remaining = self.slots.remaining(shop.id, day);
                if remaining.am > 0 && remaining.pm > 0 {
                    for &id in &order {
                        if self.try_full_day(shop, id, day) {
                            break;
                        }
                    }
                }

                // First pick opens, the other closes; either stands in
                // when the other is blocked.
                if self.slots.half_remaining(shop.id, day, DayHalf::Am) > 0 {
                    for &id in &order {
                        if self.try_half_shift(shop, id, day, DayHalf::Am) {
                            break;
                        }
                    }
                }
                if self.slots.half_remaining(shop.id, day, DayHalf::Pm) > 0 {
                    for &id in order.iter().rev() {
                        if self.try_half_shift(shop, id, day, DayHalf::Pm) {
                            break;
                        }
                    }
                }
            }
        }
    }

    /// High-demand shops with a large primary roster: at most one full
    /// day, then lowest-hours-first half fills.
    pub(crate) fn assign_flagship_shops(&mut self) {
        for shop in self.shops_with(StaffingModel::Flagship) {
            for day in WEEK_DAYS {
                if self.dispatch_if_special(shop, day) {
                    continue;
                }
                if shop.hours.get(day).is_none() {
                    continue;
                }
                self.prefer_full_day_then_split(shop, day, &shop.primary_employees);
            }
        }
    }

    /// Small-roster shops with a named bridge: primaries first, the
    /// secondary bridge only for demand that survives them.
    pub(crate) fn assign_small_team_shops(&mut self) {
        for shop in self.shops_with(StaffingModel::SmallTeam) {
            for day in WEEK_DAYS {
                if self.dispatch_if_special(shop, day) {
                    continue;
                }
                if shop.hours.get(day).is_none() {
                    continue;
                }
                self.prefer_full_day_then_split(shop, day, &shop.primary_employees);
                self.fill_half(shop, day, DayHalf::Am, &shop.secondary_employees);
                self.fill_half(shop, day, DayHalf::Pm, &shop.secondary_employees);
            }
        }
    }

    /// Blended shops: full-timers take full days and halves first,
    /// part-timers absorb what is left. The reduced Sunday window makes
    /// these shops morning-only on Sundays through the window math alone.
    pub(crate) fn assign_blended_shops(&mut self) {
        for shop in self.shops_with(StaffingModel::PartTimeBlend) {
            let full_timers: Vec<Uuid> = self.primaries_with_contract(shop, ContractType::FullTime);
            let part_timers: Vec<Uuid> = self.primaries_with_contract(shop, ContractType::PartTime);

            for day in WEEK_DAYS {
                if self.dispatch_if_special(shop, day) {
                    continue;
                }
                if shop.hours.get(day).is_none() {
                    continue;
                }

                let remaining = self.slots.remaining(shop.id, day);
                if remaining.am > 0 && remaining.pm > 0 {
                    for id in self.rank_by_weekday_minutes(&full_timers) {
                        if self.try_full_day(shop, id, day) {
                            break;
                        }
                    }
                }
                self.fill_half(shop, day, DayHalf::Am, &full_timers);
                self.fill_half(shop, day, DayHalf::Pm, &full_timers);
                self.fill_half(shop, day, DayHalf::Am, &part_timers);
                self.fill_half(shop, day, DayHalf::Pm, &part_timers);
            }
        }
    }

    /// Runs the declared intervals for the day, if any. Returns whether
    /// the day was special; special days skip the default split entirely.
    fn dispatch_if_special(&mut self, shop: &Shop, day: Weekday) -> bool {
        if shop.special_shifts.get(day).is_empty() {
            return false;
        }
        self.dispatch_special_shifts(shop, day);
        true
    }

    fn prefer_full_day_then_split(&mut self, shop: &Shop, day: Weekday, roster: &[Uuid]) {
        let remaining = self.slots.remaining(shop.id, day);
        if remaining.am > 0 && remaining.pm > 0 {
            for id in self.rank_by_weekday_minutes(roster) {
                if self.try_full_day(shop, id, day) {
                    break;
                }
            }
        }
        self.fill_half(shop, day, DayHalf::Am, roster);
        self.fill_half(shop, day, DayHalf::Pm, roster);
    }

    fn primaries_with_contract(&self, shop: &Shop, contract: ContractType) -> Vec<Uuid> {
        shop.primary_employees
            .iter()
            .copied()
            .filter(|&id| self.employee(id).is_some_and(|e| e.contract == contract))
            .collect()
    }
}
