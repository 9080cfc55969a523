use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::plans::PlanEntity;
use crate::domain::value_objects::quotas::QuotaEntry;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuotaEntity {
    pub plan_id: Uuid,
    pub user_id: Uuid,
    pub quotas: BTreeMap<String, QuotaEntry>,
}

impl QuotaEntity {
    /// Fresh quotas for every limitation of `plan`.
    pub fn for_plan(user_id: Uuid, plan: &PlanEntity, now: DateTime<Utc>) -> Self {
        Self::carried_over(user_id, plan, None, now)
    }

    /// Quotas for `plan` keeping consumption and reset dates from `previous`
    /// for limitation types both plans share.
    pub fn carried_over(
        user_id: Uuid,
        plan: &PlanEntity,
        previous: Option<&QuotaEntity>,
        now: DateTime<Utc>,
    ) -> Self {
        let quotas = plan
            .limitations
            .iter()
            .map(|limitation| {
                let carried = previous.and_then(|p| p.quotas.get(&limitation.limitation_type));
                let entry = QuotaEntry {
                    used: carried.map(|entry| entry.used).unwrap_or(0),
                    limit: limitation.effective_limit(),
                    reset_date: carried.map(|entry| entry.reset_date).unwrap_or_else(|| {
                        limitation.period_or_default().next_reset_after(now)
                    }),
                    overage: carried.map(|entry| entry.overage).unwrap_or(0),
                };
                (limitation.limitation_type.clone(), entry)
            })
            .collect();

        Self {
            plan_id: plan.id,
            user_id,
            quotas,
        }
    }

    pub fn used_counters(&self) -> BTreeMap<String, i64> {
        self.quotas
            .iter()
            .map(|(quota_type, entry)| (quota_type.clone(), entry.used))
            .collect()
    }
}
