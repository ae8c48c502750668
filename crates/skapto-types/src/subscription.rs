//! Subscription state derived from entitlements

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::PlanKind;

/// Local view of a customer's access.
///
/// Recomputed on every reconciliation, never patched in place. Fields are
/// private so every value goes through one of the constructors, which keep
/// these invariants:
///
/// - `Monthly` plans carry no visit count (unlimited)
/// - `SingleVisit` plans carry at most one remaining visit
/// - an inactive subscription has no plan and no visits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSubscription")]
pub struct Subscription {
    is_active: bool,
    plan: Option<PlanKind>,
    expires_at: Option<DateTime<Utc>>,
    remaining_visits: u32,
}

impl Subscription {
    /// No active plan
    pub const fn inactive() -> Self {
        Self {
            is_active: false,
            plan: None,
            expires_at: None,
            remaining_visits: 0,
        }
    }

    /// Active monthly membership
    pub const fn monthly(expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            is_active: true,
            plan: Some(PlanKind::Monthly),
            expires_at,
            remaining_visits: 0,
        }
    }

    /// Active single visit pass with one unspent visit
    pub const fn single_visit(expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            is_active: true,
            plan: Some(PlanKind::SingleVisit),
            expires_at,
            remaining_visits: 1,
        }
    }

    /// Whether any plan is active
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Active plan, if any
    pub const fn plan(&self) -> Option<PlanKind> {
        self.plan
    }

    /// Entitlement expiry, if the provider reported one
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Visits left on a metered plan
    pub const fn remaining_visits(&self) -> u32 {
        self.remaining_visits
    }

    /// Status line shown on the profile screen
    pub fn status_text(&self) -> String {
        match (self.is_active, self.plan) {
            (true, Some(PlanKind::Monthly)) => "Active Member".to_string(),
            (true, Some(PlanKind::SingleVisit)) => {
                let visits = self.remaining_visits;
                let suffix = if visits == 1 { "" } else { "s" };
                format!("{visits} visit{suffix} remaining")
            }
            _ => "No Active Subscription".to_string(),
        }
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::inactive()
    }
}

/// Wire form, checked before it becomes a [`Subscription`]
#[derive(Deserialize)]
struct RawSubscription {
    is_active: bool,
    plan: Option<PlanKind>,
    expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    remaining_visits: u32,
}

impl TryFrom<RawSubscription> for Subscription {
    type Error = InvalidSubscription;

    fn try_from(raw: RawSubscription) -> Result<Self, Self::Error> {
        match (raw.is_active, raw.plan, raw.remaining_visits) {
            (false, None, 0) => Ok(Self::inactive()),
            (true, Some(PlanKind::Monthly), 0) => Ok(Self::monthly(raw.expires_at)),
            (true, Some(PlanKind::SingleVisit), 1) => Ok(Self::single_visit(raw.expires_at)),
            (is_active, plan, remaining_visits) => Err(InvalidSubscription {
                is_active,
                plan,
                remaining_visits,
            }),
        }
    }
}

/// Field combination no constructor can produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSubscription {
    pub is_active: bool,
    pub plan: Option<PlanKind>,
    pub remaining_visits: u32,
}

impl std::fmt::Display for InvalidSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid subscription: active={} plan={:?} remaining_visits={}",
            self.is_active, self.plan, self.remaining_visits
        )
    }
}

impl std::error::Error for InvalidSubscription {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_inactive_has_no_plan_or_visits() {
        let sub = Subscription::inactive();
        assert!(!sub.is_active());
        assert_eq!(sub.plan(), None);
        assert_eq!(sub.remaining_visits(), 0);
        assert_eq!(sub.expires_at(), None);
    }

    #[test]
    fn test_monthly_is_unmetered() {
        let expiry = Utc::now() + Duration::days(30);
        let sub = Subscription::monthly(Some(expiry));
        assert!(sub.is_active());
        assert_eq!(sub.plan(), Some(PlanKind::Monthly));
        assert_eq!(sub.remaining_visits(), 0);
        assert_eq!(sub.expires_at(), Some(expiry));
    }

    #[test]
    fn test_single_visit_has_one_visit() {
        let sub = Subscription::single_visit(None);
        assert_eq!(sub.plan(), Some(PlanKind::SingleVisit));
        assert_eq!(sub.remaining_visits(), 1);
    }

    #[test]
    fn test_status_text() {
        assert_eq!(Subscription::monthly(None).status_text(), "Active Member");
        assert_eq!(
            Subscription::single_visit(None).status_text(),
            "1 visit remaining"
        );
        assert_eq!(
            Subscription::inactive().status_text(),
            "No Active Subscription"
        );
    }

    #[test]
    fn test_serializes_with_plan_name() {
        let json = serde_json::to_value(Subscription::single_visit(None)).unwrap();
        assert_eq!(json["plan"], "single_visit");
        assert_eq!(json["remaining_visits"], 1);
        assert_eq!(json["is_active"], true);
    }

    #[test]
    fn test_deserialize_checks_invariants() {
        let json = serde_json::to_string(&Subscription::monthly(None)).unwrap();
        let parsed: Subscription = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Subscription::monthly(None));

        let inactive_with_plan = r#"{"is_active":false,"plan":"monthly","expires_at":null,"remaining_visits":5}"#;
        assert!(serde_json::from_str::<Subscription>(inactive_with_plan).is_err());

        let pass_with_extra_visits = r#"{"is_active":true,"plan":"single_visit","expires_at":null,"remaining_visits":3}"#;
        assert!(serde_json::from_str::<Subscription>(pass_with_extra_visits).is_err());
    }
}
