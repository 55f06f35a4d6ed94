use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CardwiseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendCategory {
    Dining,
    Groceries,
    Gas,
    Travel,
    Streaming,
    Other,
}

impl SpendCategory {
    pub const ALL: [SpendCategory; 6] = [
        Self::Dining,
        Self::Groceries,
        Self::Gas,
        Self::Travel,
        Self::Streaming,
        Self::Other,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Dining => "dining",
            Self::Groceries => "groceries",
            Self::Gas => "gas",
            Self::Travel => "travel",
            Self::Streaming => "streaming",
            Self::Other => "other",
        }
    }
}

/// Monthly spend per category, in dollars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpendingProfile {
    #[serde(default)]
    pub dining: f64,
    #[serde(default)]
    pub groceries: f64,
    #[serde(default)]
    pub gas: f64,
    #[serde(default)]
    pub travel: f64,
    #[serde(default)]
    pub streaming: f64,
    #[serde(default)]
    pub other: f64,
}

impl SpendingProfile {
    pub fn get(&self, category: SpendCategory) -> f64 {
        match category {
            SpendCategory::Dining => self.dining,
            SpendCategory::Groceries => self.groceries,
            SpendCategory::Gas => self.gas,
            SpendCategory::Travel => self.travel,
            SpendCategory::Streaming => self.streaming,
            SpendCategory::Other => self.other,
        }
    }

    pub fn set(&mut self, category: SpendCategory, amount: f64) {
        let slot = match category {
            SpendCategory::Dining => &mut self.dining,
            SpendCategory::Groceries => &mut self.groceries,
            SpendCategory::Gas => &mut self.gas,
            SpendCategory::Travel => &mut self.travel,
            SpendCategory::Streaming => &mut self.streaming,
            SpendCategory::Other => &mut self.other,
        };
        *slot = amount;
    }

    /// Copy with every negative or non-finite amount replaced by zero.
    pub fn clamped(&self) -> SpendingProfile {
        let mut out = *self;
        for category in SpendCategory::ALL {
            let v = out.get(category);
            if !v.is_finite() || v < 0.0 {
                out.set(category, 0.0);
            }
        }
        out
    }

    pub fn total(&self) -> f64 {
        SpendCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    #[default]
    Personal,
    Business,
    Student,
    Secured,
}

impl CardType {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Business => "business",
            Self::Student => "student",
            Self::Secured => "secured",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Visa,
    Mastercard,
    Amex,
    Discover,
}

impl Network {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::Amex => "amex",
            Self::Discover => "discover",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardType {
    Points,
    Miles,
    #[default]
    Cashback,
}

impl RewardType {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Miles => "miles",
            Self::Cashback => "cashback",
        }
    }

    pub fn is_points(&self) -> bool {
        matches!(self, Self::Points | Self::Miles)
    }
}

impl fmt::Display for RewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A card as published by the feed. Never mutated after loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub id: String,
    pub name: String,
    pub bank: String,
    pub link: String,
    #[serde(rename = "purchaseAPR")]
    pub purchase_apr: String,
    #[serde(rename = "balanceTransferAPR")]
    pub balance_transfer_apr: String,
    pub annual_fee: String,
    pub credit_level: String,
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default)]
    pub card_type: CardType,
    #[serde(default)]
    pub network: Option<Network>,
    #[serde(default)]
    pub reward_type: RewardType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category: String,
    pub rate: f64,
    pub monthly_spend: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_earned: Option<f64>,
    pub annual_value: f64,
}

/// A card plus everything computed for one spending profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedCard {
    #[serde(flatten)]
    pub card: CardRecord,
    pub breakdown: Vec<CategoryBreakdown>,
    pub annual_rewards: f64,
    pub welcome_bonus: f64,
    pub annual_fee_amount: f64,
    pub net_value: f64,
    pub earned_as: RewardType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_earned: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus_points: Option<f64>,
}

impl FromStr for SpendCategory {
    type Err = CardwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SpendCategory::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CardwiseError::Other(format!("Unknown spend category: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_defaults_to_zero() {
        let p = SpendingProfile::default();
        assert_eq!(p.total(), 0.0);
        for c in SpendCategory::ALL {
            assert_eq!(p.get(c), 0.0);
        }
    }

    #[test]
    fn test_clamped_zeroes_negatives_and_nan() {
        let p = SpendingProfile {
            dining: -50.0,
            groceries: 200.0,
            gas: f64::NAN,
            travel: f64::INFINITY,
            ..Default::default()
        };
        let c = p.clamped();
        assert_eq!(c.dining, 0.0);
        assert_eq!(c.groceries, 200.0);
        assert_eq!(c.gas, 0.0);
        assert_eq!(c.travel, 0.0);
    }

    #[test]
    fn test_spend_category_from_str() {
        assert_eq!("Dining".parse::<SpendCategory>().unwrap(), SpendCategory::Dining);
        assert!("coffee".parse::<SpendCategory>().is_err());
    }

    #[test]
    fn test_card_record_serializes_feed_field_names() {
        let card = CardRecord {
            id: "x".to_string(),
            name: "X".to_string(),
            bank: "B".to_string(),
            link: String::new(),
            purchase_apr: "20%".to_string(),
            balance_transfer_apr: "20%".to_string(),
            annual_fee: "$0".to_string(),
            credit_level: "Good".to_string(),
            bullets: vec![],
            card_type: CardType::Student,
            network: Some(Network::Visa),
            reward_type: RewardType::Miles,
        };
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["purchaseAPR"], "20%");
        assert_eq!(json["annualFee"], "$0");
        assert_eq!(json["cardType"], "student");
        assert_eq!(json["network"], "visa");
        assert_eq!(json["rewardType"], "miles");
    }
}
