//! Billing plans.
//!
//! Plans are seeded once and treated as immutable. `(tier, user_type)` is
//! unique; prices are integer minor units (kobo).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{PlanId, Timestamp, ValidationError};

/// Account type a plan is sold to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Farmer,
    Buyer,
    Organization,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Farmer => "farmer",
            UserType::Buyer => "buyer",
            UserType::Organization => "organization",
        }
    }
}

impl FromStr for UserType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "farmer" => Ok(UserType::Farmer),
            "buyer" => Ok(UserType::Buyer),
            "organization" | "org" => Ok(UserType::Organization),
            other => Err(ValidationError::invalid_format(
                "user_type",
                format!("unknown user type '{}'", other),
            )),
        }
    }
}

/// Billing period of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanInterval {
    Monthly,
    Yearly,
}

impl PlanInterval {
    /// Length of one paid period. Fixed day counts, not calendar months.
    pub fn period_days(&self) -> i64 {
        match self {
            PlanInterval::Monthly => 30,
            PlanInterval::Yearly => 365,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanInterval::Monthly => "monthly",
            PlanInterval::Yearly => "yearly",
        }
    }
}

impl fmt::Display for PlanInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlanInterval {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(PlanInterval::Monthly),
            "yearly" => Ok(PlanInterval::Yearly),
            other => Err(ValidationError::invalid_format(
                "interval",
                format!("unknown interval '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    /// 1 = entry level; higher tiers unlock more.
    pub tier: i16,
    pub user_type: UserType,
    pub price_minor: i64,
    pub interval: PlanInterval,
    pub description: String,
    pub created_at: Timestamp,
}

impl Plan {
    pub fn new(
        name: impl Into<String>,
        tier: i16,
        user_type: UserType,
        price_minor: i64,
        interval: PlanInterval,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if tier < 1 {
            return Err(ValidationError::not_positive("tier", tier));
        }
        if price_minor < 0 {
            return Err(ValidationError::invalid_format("price", "must not be negative"));
        }
        Ok(Self {
            id: PlanId::new(),
            name,
            tier,
            user_type,
            price_minor,
            interval,
            description: String::new(),
            created_at: Timestamp::now(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_free(&self) -> bool {
        self.price_minor == 0
    }

    /// The marketplace's standard plan catalogue.
    pub fn catalogue() -> Vec<Plan> {
        use PlanInterval::Monthly;
        use UserType::*;

        [
            ("Farmer Free", 1, Farmer, 0, "List crops and receive orders"),
            ("Farmer Standard", 2, Farmer, 150_000, "Advisory alerts and sales insights"),
            ("Farmer Premium", 3, Farmer, 500_000, "Priority listing and full analytics"),
            ("Buyer Free", 1, Buyer, 0, "Browse and order"),
            ("Buyer Standard", 2, Buyer, 200_000, "Bulk ordering"),
            ("Buyer Premium", 3, Buyer, 700_000, "Dedicated sourcing support"),
            ("Organization Free", 1, Organization, 0, "Cooperative directory"),
            ("Organization Pro", 2, Organization, 5_000_000, "Member management and reporting"),
        ]
        .into_iter()
        .filter_map(|(name, tier, user_type, price, description)| {
            Plan::new(name, tier, user_type, price, Monthly)
                .ok()
                .map(|plan| plan.with_description(description))
        })
        .collect()
    }
}
