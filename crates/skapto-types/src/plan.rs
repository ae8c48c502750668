//! Plan kinds sold by the storefront

use serde::{Deserialize, Serialize};

/// Kind of access plan a customer holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    /// Monthly membership - unlimited workshops while active
    Monthly,
    /// Single visit pass - one workshop per purchase
    SingleVisit,
}

impl PlanKind {
    /// Human readable plan name
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Monthly => "Monthly Membership",
            Self::SingleVisit => "Single Visit Pass",
        }
    }

    /// Short marketing description
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Monthly => "Unlimited access to all workshops for one month",
            Self::SingleVisit => "Access to any single workshop",
        }
    }

    /// Benefits listed on the paywall
    pub const fn benefits(&self) -> &'static [&'static str] {
        match self {
            Self::Monthly => &[
                "Unlimited workshop access",
                "Priority booking",
                "10% discount on materials",
                "Special events access",
                "Cancel anytime",
            ],
            Self::SingleVisit => &[
                "Access to one workshop",
                "All materials included",
                "No commitment",
                "Valid for 30 days",
            ],
        }
    }

    /// Whether the plan is counted per visit rather than unlimited
    pub const fn is_metered(&self) -> bool {
        matches!(self, Self::SingleVisit)
    }
}

impl std::fmt::Display for PlanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Monthly => write!(f, "monthly"),
            Self::SingleVisit => write!(f, "single_visit"),
        }
    }
}

impl std::str::FromStr for PlanKind {
    type Err = PlanParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" | "monthly_membership" => Ok(Self::Monthly),
            "single_visit" | "singlevisit" | "one_time" => Ok(Self::SingleVisit),
            _ => Err(PlanParseError(s.to_string())),
        }
    }
}

/// Error parsing a plan string
#[derive(Debug, Clone)]
pub struct PlanParseError(pub String);

impl std::fmt::Display for PlanParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid plan: {}", self.0)
    }
}

impl std::error::Error for PlanParseError {}
