//! Feature flags granted by each plan tier.

use super::PlanTier;
use serde::{Deserialize, Serialize};

/// Fixed set of boolean features attached to a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementBundle {
    pub personal_training: bool,
    pub nutrition_consultation: bool,
    pub group_classes: bool,
    pub priority_booking: bool,
    pub custom_workout_plans: bool,
    pub custom_nutrition_plans: bool,
    pub progress_analytics: bool,
    pub vip_access: bool,
}

impl EntitlementBundle {
    /// Standard bundle for a tier.
    ///
    /// | Feature | Basic | Premium | Elite |
    /// |---------|-------|---------|-------|
    /// | personalTraining | - | yes | yes |
    /// | nutritionConsultation | - | yes | yes |
    /// | groupClasses | yes | yes | yes |
    /// | priorityBooking | - | yes | yes |
    /// | customWorkoutPlans | yes | yes | yes |
    /// | customNutritionPlans | - | yes | yes |
    /// | progressAnalytics | yes | yes | yes |
    /// | vipAccess | - | - | yes |
    ///
    /// Basic matches the published plan table, so nutrition consultation stays off.
    pub fn for_tier(tier: PlanTier) -> Self {
        match tier {
            PlanTier::Free => Self::default(),
            PlanTier::Basic => Self {
                group_classes: true,
                custom_workout_plans: true,
                progress_analytics: true,
                ..Self::default()
            },
            PlanTier::Premium => Self {
                vip_access: false,
                ..Self::all()
            },
            PlanTier::Elite => Self::all(),
        }
    }

    fn all() -> Self {
        Self {
            personal_training: true,
            nutrition_consultation: true,
            group_classes: true,
            priority_booking: true,
            custom_workout_plans: true,
            custom_nutrition_plans: true,
            progress_analytics: true,
            vip_access: true,
        }
    }

    /// Number of features switched on.
    pub fn granted_count(&self) -> usize {
        [
            self.personal_training,
            self.nutrition_consultation,
            self.group_classes,
            self.priority_booking,
            self.custom_workout_plans,
            self.custom_nutrition_plans,
            self.progress_analytics,
            self.vip_access,
        ]
        .iter()
        .filter(|flag| **flag)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_grants_nothing() {
        assert_eq!(EntitlementBundle::for_tier(PlanTier::Free).granted_count(), 0);
    }

    #[test]
    fn basic_grants_only_core_features() {
        let bundle = EntitlementBundle::for_tier(PlanTier::Basic);

        assert!(!bundle.personal_training);
        assert!(!bundle.nutrition_consultation);
        assert!(bundle.group_classes);
        assert!(!bundle.priority_booking);
        assert!(bundle.custom_workout_plans);
        assert!(!bundle.custom_nutrition_plans);
        assert!(bundle.progress_analytics);
        assert!(!bundle.vip_access);
    }

    #[test]
    fn premium_grants_everything_but_vip() {
        let bundle = EntitlementBundle::for_tier(PlanTier::Premium);

        assert!(bundle.personal_training);
        assert!(!bundle.vip_access);
        assert_eq!(bundle.granted_count(), 7);
    }

    #[test]
    fn elite_grants_everything() {
        assert_eq!(EntitlementBundle::for_tier(PlanTier::Elite).granted_count(), 8);
    }

    #[test]
    fn higher_tiers_never_lose_features() {
        let basic = EntitlementBundle::for_tier(PlanTier::Basic);
        let premium = EntitlementBundle::for_tier(PlanTier::Premium);
        assert!(basic.granted_count() < premium.granted_count());
        assert!(premium.group_classes && premium.custom_workout_plans && premium.progress_analytics);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(EntitlementBundle::for_tier(PlanTier::Elite)).unwrap();
        assert_eq!(json["personalTraining"], true);
        assert_eq!(json["customNutritionPlans"], true);
        assert_eq!(json["vipAccess"], true);
    }
}
