use uuid::Uuid;

use shared::types::{Company, DayHalf};

use crate::domain::WEEK_DAYS;
use crate::domain::engine::RosterEngine;

impl<'a> RosterEngine<'a> {
    /// Last resort for demand that survived every regular stage: sweep the
    /// Company A shops with the emergency reserves, one morning and one
    /// afternoon attempt per shop and day. This is the only stage that
    /// sees emergency-only staff; they contribute nothing to fairness
    /// ordering anywhere else.
    pub(crate) fn cover_with_emergency_staff(&mut self) {
        if self.slots.total_remaining() == 0 {
            return;
        }
        let reserves: Vec<Uuid> = self
            .input
            .employees
            .iter()
            .filter(|e| e.emergency_only && e.active)
            .map(|e| e.id)
            .collect();
        if reserves.is_empty() {
            return;
        }

        self.emergency_stage = true;
        for shop in self.active_shops() {
            if shop.company != Company::A {
                continue;
            }
            for day in WEEK_DAYS {
                for half in [DayHalf::Am, DayHalf::Pm] {
                    if self.slots.half_remaining(shop.id, day, half) == 0 {
                        continue;
                    }
                    for &reserve in &reserves {
                        if self.try_half_shift(shop, reserve, day, half) {
                            tracing::warn!(
                                shop = %shop.name,
                                ?day,
                                ?half,
                                "Emergency reserve deployed"
                            );
                            break;
                        }
                    }
                }
            }
        }
        self.emergency_stage = false;
    }
}
