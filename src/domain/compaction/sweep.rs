//! Periodic sweep planning.
//!
//! A sweep looks at every stored session and decides, per session, whether
//! to delete it (too old or inactive), clear its stale transient selection,
//! or replace it with an optimized copy. Planning is pure; the session store
//! applies the plan.

use serde::{Deserialize, Serialize};

use super::optimizer::SessionOptimizer;
use super::size::serialized_size;
use crate::domain::foundation::{SessionKey, Timestamp};
use crate::domain::session::{Session, TransientSelection};

/// Why a session is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryReason {
    /// No activity within the inactivity window, or no activity recorded.
    Inactive,
    /// Created longer ago than the maximum age.
    TooOld,
}

/// Totals reported by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub examined: usize,
    pub removed: usize,
    pub optimized_count: usize,
    pub selections_cleared: usize,
    pub bytes_saved: usize,
}

/// Changes a sweep wants applied.
#[derive(Debug, Clone, Default)]
pub struct SweepPlan {
    pub removals: Vec<(SessionKey, ExpiryReason)>,
    pub replacements: Vec<(SessionKey, Session)>,
    pub outcome: SweepOutcome,
}

impl SweepPlan {
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.replacements.is_empty()
    }
}

impl SessionOptimizer {
    /// Returns why `session` should be deleted at `now`, if it should.
    pub fn expiry(&self, session: &Session, now: &Timestamp) -> Option<ExpiryReason> {
        let limits = self.limits();

        match session.last_activity() {
            None => return Some(ExpiryReason::Inactive),
            Some(at) if at.is_older_than(limits.max_inactive_secs, now) => {
                return Some(ExpiryReason::Inactive)
            }
            Some(_) => {}
        }

        // Records written before creation time was tracked only age by activity.
        match &session.created_at {
            Some(created) if created.is_older_than(limits.max_age_secs, now) => {
                Some(ExpiryReason::TooOld)
            }
            _ => None,
        }
    }

    fn selection_is_stale(&self, selection: &TransientSelection, now: &Timestamp) -> bool {
        if selection.is_empty() {
            return false;
        }
        match &selection.updated_at {
            Some(at) => at.is_older_than(self.limits().selection_ttl_secs, now),
            None => true,
        }
    }
}

pub(super) fn plan(
    optimizer: &SessionOptimizer,
    sessions: &[(SessionKey, Session)],
    now: Timestamp,
) -> SweepPlan {
    let mut plan = SweepPlan::default();
    plan.outcome.examined = sessions.len();

    for (key, session) in sessions {
        if let Some(reason) = optimizer.expiry(session, &now) {
            plan.removals.push((*key, reason));
            plan.outcome.removed += 1;
            continue;
        }

        let mut candidate: Option<Session> = None;

        if optimizer.selection_is_stale(&session.selection, &now) {
            let mut cleared = session.clone();
            cleared.selection = TransientSelection::default();
            candidate = Some(cleared);
            plan.outcome.selections_cleared += 1;
        }

        let current = candidate.as_ref().unwrap_or(session);
        if optimizer.check_size(current).is_oversized {
            let (optimized, report) = optimizer.optimize(current);
            if report.savings_ratio() > optimizer.limits().min_improvement_ratio {
                candidate = Some(optimized);
                plan.outcome.optimized_count += 1;
            }
        }

        if let Some(replacement) = candidate {
            plan.outcome.bytes_saved += serialized_size(session)
                .saturating_sub(serialized_size(&replacement));
            plan.replacements.push((*key, replacement));
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Product, ProductSnapshot};
    use crate::domain::compaction::CompactionLimits;
    use crate::domain::foundation::{CategoryId, ProductId};

    fn now() -> Timestamp {
        Timestamp::now()
    }

    fn active_session(now: &Timestamp, secs_ago: u64) -> Session {
        let mut session = Session::default();
        session.created_at = Some(now.minus_secs(secs_ago));
        session.touch_at(now.minus_secs(secs_ago));
        session
    }

    #[test]
    fn removes_inactive_and_keeps_recent() {
        let now = now();
        let stale = active_session(&now, 25 * 60 * 60);
        let recent = active_session(&now, 60);

        let plan = SessionOptimizer::default().plan_sweep(
            &[(SessionKey::new(1, 1), stale), (SessionKey::new(2, 2), recent)],
            now,
        );

        assert_eq!(plan.removals, vec![(SessionKey::new(1, 1), ExpiryReason::Inactive)]);
        assert_eq!(plan.outcome.removed, 1);
        assert!(plan.replacements.is_empty());
    }

    #[test]
    fn session_without_activity_is_maximally_stale() {
        let session = Session::default();
        assert_eq!(
            SessionOptimizer::default().expiry(&session, &now()),
            Some(ExpiryReason::Inactive)
        );
    }

    #[test]
    fn unbounded_limits_keep_recent_sessions() {
        let now = now();
        let optimizer = SessionOptimizer::new(CompactionLimits {
            max_inactive_secs: u64::MAX,
            max_age_secs: u64::MAX,
            ..CompactionLimits::default()
        });

        assert_eq!(optimizer.expiry(&active_session(&now, 60), &now), None);
    }

    #[test]
    fn active_but_ancient_session_is_removed() {
        let now = now();
        let mut session = active_session(&now, 60);
        session.created_at = Some(now.minus_days(8));

        assert_eq!(
            SessionOptimizer::default().expiry(&session, &now),
            Some(ExpiryReason::TooOld)
        );
    }

    #[test]
    fn oversized_session_is_replaced_with_optimized_copy() {
        let now = now();
        let mut session = active_session(&now, 60);
        for id in 0..300 {
            session.selection.quantities.set(ProductId(id), 1);
        }
        session.selection.touch();

        let plan = SessionOptimizer::default().plan_sweep(&[(SessionKey::new(3, 3), session)], now);

        assert_eq!(plan.outcome.optimized_count, 1);
        assert!(plan.outcome.bytes_saved > 0);
        let (_, replacement) = &plan.replacements[0];
        assert_eq!(replacement.selection.quantities.len(), 20);
    }

    #[test]
    fn small_gain_is_not_worth_a_rewrite() {
        let now = now();
        let mut session = active_session(&now, 60);
        session
            .cart
            .add_item(&ProductSnapshot::new(ProductId(1), "Tea", 5000), 1)
            .unwrap();
        session.touch_at(now.minus_secs(60));
        session.selection.cached_products = Some(vec![Product {
            id: ProductId(1),
            category_id: CategoryId(1),
            name: "Tea".to_string(),
            price: 5000,
            description: None,
            image_url: None,
        }]);
        session.selection.touch();

        // Oversized by bytes, but dropping one cached product saves little.
        let optimizer = SessionOptimizer::new(CompactionLimits {
            max_session_bytes: 16,
            min_improvement_ratio: 0.9,
            ..CompactionLimits::default()
        });
        let plan = optimizer.plan_sweep(&[(SessionKey::new(4, 4), session)], now);

        assert_eq!(plan.outcome.optimized_count, 0);
        assert!(plan.is_empty());
    }

    #[test]
    fn stale_selection_is_cleared() {
        let now = now();
        let mut session = active_session(&now, 60);
        session.selection.quantities.set(ProductId(9), 3);
        session.selection.updated_at = Some(now.minus_secs(2 * 60 * 60));

        let plan = SessionOptimizer::default().plan_sweep(&[(SessionKey::new(5, 5), session)], now);

        assert_eq!(plan.outcome.selections_cleared, 1);
        let (_, replacement) = &plan.replacements[0];
        assert!(replacement.selection.is_empty());
    }
}
