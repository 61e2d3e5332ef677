//! Plan tier definitions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Subscription plan a user can hold.
///
/// Names are case-sensitive on the wire (`"Premium"`, not `"premium"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlanTier {
    /// Default plan for every account; carries no entitlements and cannot be bought.
    Free,
    Basic,
    Premium,
    Elite,
}

impl PlanTier {
    /// Tiers that can be purchased, cheapest first.
    pub const PURCHASABLE: [PlanTier; 3] = [PlanTier::Basic, PlanTier::Premium, PlanTier::Elite];

    /// Returns true if this tier is sold through the payment flow.
    pub fn is_paid(&self) -> bool {
        !matches!(self, PlanTier::Free)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "Free",
            PlanTier::Basic => "Basic",
            PlanTier::Premium => "Premium",
            PlanTier::Elite => "Elite",
        }
    }
}

impl Default for PlanTier {
    fn default() -> Self {
        PlanTier::Free
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Free" => Ok(PlanTier::Free),
            "Basic" => Ok(PlanTier::Basic),
            "Premium" => Ok(PlanTier::Premium),
            "Elite" => Ok(PlanTier::Elite),
            other => Err(ValidationError::invalid_format(
                "planType",
                format!("unknown plan '{}'", other),
            )),
        }
    }
}
