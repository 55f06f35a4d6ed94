use std::str::FromStr;

use clap::ValueEnum;

use crate::calculator::compute_all;
use crate::error::CardwiseError;
use crate::filters::{filter_cards, FilterSet};
use crate::models::{CardRecord, EnrichedCard, SpendingProfile};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    /// Net first-year value
    #[default]
    Value,
    /// Annual rewards from spending
    Rewards,
    /// Parsed annual fee
    Fee,
    /// Welcome bonus value
    Bonus,
}

impl SortKey {
    fn metric(&self, card: &EnrichedCard) -> f64 {
        match self {
            Self::Value => card.net_value,
            Self::Rewards => card.annual_rewards,
            Self::Fee => card.annual_fee_amount,
            Self::Bonus => card.welcome_bonus,
        }
    }
}

impl FromStr for SortKey {
    type Err = CardwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
            .map_err(|_| CardwiseError::Other(format!("Unknown sort key: {s}")))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Stable sort; cards with equal metrics keep their catalog order.
pub fn sort_cards(cards: &mut [EnrichedCard], key: SortKey, order: SortOrder) {
    cards.sort_by(|a, b| {
        let ord = key.metric(a).total_cmp(&key.metric(b));
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

/// Value, filter and rank a catalog for one spending profile.
pub fn evaluate(
    cards: &[CardRecord],
    spend: &SpendingProfile,
    filters: &FilterSet,
    key: SortKey,
    order: SortOrder,
) -> Vec<EnrichedCard> {
    let mut ranked = filter_cards(compute_all(cards, spend), filters);
    sort_cards(&mut ranked, key, order);
    ranked
}

/// Position of the best card by `key`, if any.
pub fn best_by(cards: &[EnrichedCard], key: SortKey) -> Option<usize> {
    cards
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| {
            key.metric(a)
                .total_cmp(&key.metric(b))
                .then_with(|| ib.cmp(ia))
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::compute;
    use crate::catalog::fallback_cards;

    fn with_values(values: &[(&str, f64, f64, f64)]) -> Vec<EnrichedCard> {
        let base = compute(&fallback_cards()[0], &SpendingProfile::default());
        values
            .iter()
            .map(|(id, net, fee, bonus)| {
                let mut c = base.clone();
                c.card.id = id.to_string();
                c.net_value = *net;
                c.annual_fee_amount = *fee;
                c.welcome_bonus = *bonus;
                c
            })
            .collect()
    }

    fn ids(cards: &[EnrichedCard]) -> Vec<&str> {
        cards.iter().map(|c| c.card.id.as_str()).collect()
    }

    #[test]
    fn test_sort_by_value_desc() {
        let mut cards = with_values(&[("a", 10.0, 0.0, 0.0), ("b", 30.0, 0.0, 0.0), ("c", 20.0, 0.0, 0.0)]);
        sort_cards(&mut cards, SortKey::Value, SortOrder::Desc);
        assert_eq!(ids(&cards), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_by_fee_asc_is_stable() {
        let mut cards = with_values(&[("a", 0.0, 95.0, 0.0), ("b", 0.0, 0.0, 0.0), ("c", 0.0, 0.0, 0.0)]);
        sort_cards(&mut cards, SortKey::Fee, SortOrder::Asc);
        assert_eq!(ids(&cards), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_by_bonus() {
        let mut cards = with_values(&[("a", 0.0, 0.0, 200.0), ("b", 0.0, 0.0, 900.0)]);
        sort_cards(&mut cards, SortKey::Bonus, SortOrder::Desc);
        assert_eq!(ids(&cards), vec!["b", "a"]);
    }

    #[test]
    fn test_best_by_prefers_first_on_tie() {
        let cards = with_values(&[("a", 5.0, 0.0, 0.0), ("b", 5.0, 0.0, 0.0), ("c", 1.0, 0.0, 0.0)]);
        assert_eq!(best_by(&cards, SortKey::Value), Some(0));
        assert_eq!(best_by(&[], SortKey::Value), None);
    }

    #[test]
    fn test_sort_key_from_str() {
        assert_eq!("fee".parse::<SortKey>().unwrap(), SortKey::Fee);
        assert_eq!("REWARDS".parse::<SortKey>().unwrap(), SortKey::Rewards);
        assert!("name".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_evaluate_pipeline() {
        let mut cards = fallback_cards();
        let mut bce = cards[0].clone();
        bce.id = "blue-cash-everyday".to_string();
        bce.name = "Blue Cash Everyday".to_string();
        bce.network = None;
        cards.push(bce);
        let spend = SpendingProfile {
            groceries: 500.0,
            ..Default::default()
        };

        let all = evaluate(&cards, &spend, &FilterSet::new(), SortKey::Value, SortOrder::Desc);
        assert_eq!(all[0].card.id, "blue-cash-everyday");
        assert_eq!(all.len(), 3);

        let filters: FilterSet = ["mastercard"].iter().collect();
        let filtered = evaluate(&cards, &spend, &filters, SortKey::Value, SortOrder::Desc);
        assert_eq!(ids(&filtered), vec!["citi-double-cash-card"]);
    }
}
