use std::collections::HashMap;

use chrono::Weekday;
use uuid::Uuid;

use shared::time::day_index;
use shared::types::{DayHalf, ShiftKind, Shop, SlotDemand};

use crate::domain::WEEK_DAYS;

/// Outstanding AM/PM coverage demand per shop and day. Seeded once from
/// the declared base demand, decremented as shifts are issued.
#[derive(Debug, Default)]
pub struct SlotTracker {
    cells: HashMap<Uuid, [SlotDemand; 7]>,
}

impl SlotTracker {
    pub fn seed(shops: &[Shop]) -> Self {
        let mut cells = HashMap::new();
        for shop in shops.iter().filter(|s| s.active) {
            let week: [SlotDemand; 7] = std::array::from_fn(|i| *shop.demand.get(WEEK_DAYS[i]));
            cells.insert(shop.id, week);
        }
        Self { cells }
    }

    pub fn remaining(&self, shop: Uuid, day: Weekday) -> SlotDemand {
        self.cells
            .get(&shop)
            .map_or(SlotDemand::default(), |week| week[day_index(day)])
    }

    pub fn half_remaining(&self, shop: Uuid, day: Weekday, half: DayHalf) -> u32 {
        let cell = self.remaining(shop, day);
        match half {
            DayHalf::Am => cell.am,
            DayHalf::Pm => cell.pm,
        }
    }

    /// Consume demand for an issued shift. Decrementing an empty slot is a
    /// no-op: full-day assignments legitimately over-consume a half that a
    /// special shift already covered.
    pub fn consume(&mut self, shop: Uuid, day: Weekday, kind: ShiftKind) {
        let Some(week) = self.cells.get_mut(&shop) else {
            return;
        };
        let cell = &mut week[day_index(day)];
        match kind {
            ShiftKind::Morning => cell.am = cell.am.saturating_sub(1),
            ShiftKind::Evening => cell.pm = cell.pm.saturating_sub(1),
            ShiftKind::FullDay => {
                cell.am = cell.am.saturating_sub(1);
                cell.pm = cell.pm.saturating_sub(1);
            }
        }
    }

    /// Total open slots across all shops and days.
    pub fn total_remaining(&self) -> u32 {
        self.cells
            .values()
            .map(|week| week.iter().map(SlotDemand::total).sum::<u32>())
            .sum()
    }
}
