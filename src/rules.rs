//! Per-card reward formulas as data.
//!
//! Each entry says which spend categories feed a bucket, how much of each
//! category it takes, the earn rate and an optional annual spend cap. The
//! calculator evaluates every entry the same way.

use crate::models::SpendCategory::{Dining, Gas, Groceries, Other, Streaming, Travel};
use crate::models::{RewardType, SpendCategory};

/// What a unit earned is worth in dollars. Lists every valuation the
/// calculator knows, including currencies no built-in card earns yet.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointCurrency {
    CashBack,
    ChaseUltimateRewards,
    AmexMembershipRewards,
    CapitalOneMiles,
    CitiThankYou,
    HotelPoints,
    AirlineMiles,
}

impl PointCurrency {
    /// Dollars per point or mile. Cash back rates are percentages, so a
    /// "unit" there is one percent of a dollar.
    pub fn unit_value(&self) -> f64 {
        match self {
            Self::CashBack => 0.01,
            Self::ChaseUltimateRewards => 0.015,
            Self::AmexMembershipRewards => 0.012,
            Self::CapitalOneMiles => 0.011,
            Self::CitiThankYou => 0.01,
            Self::HotelPoints => 0.01,
            Self::AirlineMiles => 0.014,
        }
    }

    pub fn reward_type(&self) -> RewardType {
        match self {
            Self::CashBack => RewardType::Cashback,
            Self::CapitalOneMiles | Self::AirlineMiles => RewardType::Miles,
            Self::ChaseUltimateRewards
            | Self::AmexMembershipRewards
            | Self::CitiThankYou
            | Self::HotelPoints => RewardType::Points,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CashBack => "Cash Back",
            Self::ChaseUltimateRewards => "Chase Ultimate Rewards",
            Self::AmexMembershipRewards => "American Express Membership Rewards",
            Self::CapitalOneMiles => "Capital One Miles",
            Self::CitiThankYou => "Citi ThankYou Points",
            Self::HotelPoints => "Hotel Points",
            Self::AirlineMiles => "Airline Miles",
        }
    }
}

/// Above `limit` dollars of annual spend the bucket earns `rate_after`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnualCap {
    pub limit: f64,
    pub rate_after: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardRule {
    pub label: &'static str,
    pub rate: f64,
    /// Spend categories and the share of each attributed to this bucket.
    pub sources: &'static [(SpendCategory, f64)],
    pub cap: Option<AnnualCap>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WelcomeBonus {
    None,
    /// Bonus points or miles, valued at the card's currency.
    Points(f64),
    /// Flat statement credit in dollars.
    Cash(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardRules {
    pub name: &'static str,
    pub ids: &'static [&'static str],
    pub currency: PointCurrency,
    pub rules: &'static [RewardRule],
    pub welcome_bonus: WelcomeBonus,
}

const SIX_K_THEN_ONE: Option<AnnualCap> = Some(AnnualCap {
    limit: 6000.0,
    rate_after: 1.0,
});

const fn rule(label: &'static str, rate: f64, sources: &'static [(SpendCategory, f64)]) -> RewardRule {
    RewardRule {
        label,
        rate,
        sources,
        cap: None,
    }
}

const fn capped(
    label: &'static str,
    rate: f64,
    sources: &'static [(SpendCategory, f64)],
    cap: Option<AnnualCap>,
) -> RewardRule {
    RewardRule {
        label,
        rate,
        sources,
        cap,
    }
}

pub const KNOWN_CARDS: &[CardRules] = &[
    CardRules {
        name: "United Explorer Card",
        ids: &["united-explorer", "united-explorer-card", "united-explorer-visa"],
        currency: PointCurrency::AirlineMiles,
        rules: &[
            rule("United Purchases", 2.0, &[(Travel, 1.0)]),
            rule("Dining", 2.0, &[(Dining, 1.0)]),
            rule("Hotels", 2.0, &[(Travel, 1.0)]),
            rule(
                "Other Purchases",
                1.0,
                &[(Groceries, 1.0), (Gas, 1.0), (Streaming, 1.0), (Other, 1.0)],
            ),
        ],
        welcome_bonus: WelcomeBonus::Points(60_000.0),
    },
    CardRules {
        name: "Chase Sapphire Preferred",
        ids: &["chase-sapphire-preferred", "chase-sapphire-preferred-card"],
        currency: PointCurrency::ChaseUltimateRewards,
        rules: &[
            rule("Chase Travel", 5.0, &[(Travel, 1.0)]),
            rule("Dining", 3.0, &[(Dining, 1.0)]),
            rule("Streaming", 3.0, &[(Streaming, 1.0)]),
            rule("Online Groceries", 3.0, &[(Groceries, 1.0)]),
            rule("Other Travel", 2.0, &[(Travel, 1.0)]),
            rule("Other Purchases", 1.0, &[(Other, 1.0)]),
        ],
        welcome_bonus: WelcomeBonus::Points(60_000.0),
    },
    CardRules {
        name: "Blue Cash Everyday",
        ids: &[
            "blue-cash-everyday",
            "blue-cash-everyday-card",
            "blue-cash-everyday-card-from-american-express",
        ],
        currency: PointCurrency::CashBack,
        rules: &[
            capped("U.S. Supermarkets", 3.0, &[(Groceries, 1.0)], SIX_K_THEN_ONE),
            capped("U.S. Online Retail", 3.0, &[(Other, 0.5)], SIX_K_THEN_ONE),
            capped("U.S. Gas Stations", 3.0, &[(Gas, 1.0)], SIX_K_THEN_ONE),
            rule(
                "Other Purchases",
                1.0,
                &[(Dining, 1.0), (Travel, 1.0), (Streaming, 1.0), (Other, 0.5)],
            ),
        ],
        welcome_bonus: WelcomeBonus::Cash(200.0),
    },
    CardRules {
        name: "Blue Cash Preferred",
        ids: &[
            "blue-cash-preferred",
            "blue-cash-preferred-card",
            "blue-cash-preferred-card-from-american-express",
        ],
        currency: PointCurrency::CashBack,
        rules: &[
            capped("U.S. Supermarkets", 6.0, &[(Groceries, 1.0)], SIX_K_THEN_ONE),
            rule("U.S. Streaming", 6.0, &[(Streaming, 1.0)]),
            rule("Transit & Gas", 3.0, &[(Gas, 1.0), (Other, 0.1)]),
            rule("Other Purchases", 1.0, &[(Dining, 1.0), (Travel, 1.0), (Other, 0.9)]),
        ],
        welcome_bonus: WelcomeBonus::Cash(250.0),
    },
];

/// Flat 1% / 1x on everything, used for cards without their own entry.
pub const DEFAULT_RULE: RewardRule = rule(
    "All purchases",
    1.0,
    &[
        (Dining, 1.0),
        (Groceries, 1.0),
        (Gas, 1.0),
        (Travel, 1.0),
        (Streaming, 1.0),
        (Other, 1.0),
    ],
);

pub const DEFAULT_RULES: &[RewardRule] = &[DEFAULT_RULE];

pub fn lookup(card_id: &str) -> Option<&'static CardRules> {
    KNOWN_CARDS.iter().find(|c| c.ids.iter().any(|id| *id == card_id))
}
