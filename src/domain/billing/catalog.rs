//! Plan catalog: the one place prices and entitlements are looked up.
//!
//! Order creation reads prices from here, activation reads bundles from
//! here, so the two can never drift apart.

use std::collections::BTreeMap;

use super::{BillingError, EntitlementBundle, PlanTier};
use crate::domain::foundation::ValidationError;

/// Default plan length in days.
pub const DEFAULT_PLAN_PERIOD_DAYS: i64 = 30;

/// Default settlement currency.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Gateway amounts are in the currency's smallest unit.
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Largest price whose minor-unit amount still fits an `i64`.
pub const MAX_PLAN_PRICE: i64 = i64::MAX / MINOR_UNITS_PER_MAJOR;

/// Price and entitlements for one purchasable tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOffer {
    pub tier: PlanTier,
    /// Price in major currency units, as stored on the payment.
    pub price: i64,
    pub features: EntitlementBundle,
}

impl PlanOffer {
    /// Amount to request from the gateway.
    pub fn gateway_amount(&self) -> Result<i64, BillingError> {
        self.price.checked_mul(MINOR_UNITS_PER_MAJOR).ok_or_else(|| {
            BillingError::infrastructure(format!(
                "{} price {} overflows the gateway amount",
                self.tier, self.price
            ))
        })
    }
}

/// Tier to offer mapping plus the commercial terms shared by all tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCatalog {
    offers: BTreeMap<PlanTier, PlanOffer>,
    currency: String,
    period_days: i64,
}

impl PlanCatalog {
    /// Catalog with the standard price list.
    ///
    /// | Tier | Price |
    /// |------|-------|
    /// | Basic | 2999 |
    /// | Premium | 4999 |
    /// | Elite | 7999 |
    pub fn standard() -> Self {
        let offers = [
            (PlanTier::Basic, 2999),
            (PlanTier::Premium, 4999),
            (PlanTier::Elite, 7999),
        ]
        .into_iter()
        .map(|(tier, price)| {
            (
                tier,
                PlanOffer {
                    tier,
                    price,
                    features: EntitlementBundle::for_tier(tier),
                },
            )
        })
        .collect();

        Self {
            offers,
            currency: DEFAULT_CURRENCY.to_string(),
            period_days: DEFAULT_PLAN_PERIOD_DAYS,
        }
    }

    /// Overrides the price of a paid tier.
    pub fn with_price(mut self, tier: PlanTier, price: i64) -> Result<Self, ValidationError> {
        if !(1..=MAX_PLAN_PRICE).contains(&price) {
            return Err(ValidationError::out_of_range("price", 1, MAX_PLAN_PRICE, price));
        }
        let offer = self.offers.get_mut(&tier).ok_or_else(|| {
            ValidationError::invalid_format("tier", format!("{} is not purchasable", tier))
        })?;
        offer.price = price;
        Ok(self)
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_period_days(mut self, days: i64) -> Self {
        self.period_days = days;
        self
    }

    /// Looks up the offer for a tier name as sent by a client.
    ///
    /// Unknown names and the free tier are both rejected.
    pub fn resolve(&self, plan_type: &str) -> Result<&PlanOffer, BillingError> {
        plan_type
            .parse::<PlanTier>()
            .ok()
            .and_then(|tier| self.offers.get(&tier))
            .ok_or_else(|| BillingError::invalid_plan(plan_type))
    }

    pub fn offer(&self, tier: PlanTier) -> Option<&PlanOffer> {
        self.offers.get(&tier)
    }

    /// Entitlements granted on activation of `tier`.
    pub fn entitlements_for(&self, tier: PlanTier) -> EntitlementBundle {
        self.offers
            .get(&tier)
            .map(|offer| offer.features)
            .unwrap_or_else(|| EntitlementBundle::for_tier(tier))
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn period_days(&self) -> i64 {
        self.period_days
    }

    pub fn offers(&self) -> impl Iterator<Item = &PlanOffer> {
        self.offers.values()
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
