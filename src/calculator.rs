use crate::models::{CardRecord, CategoryBreakdown, EnrichedCard, SpendingProfile};
use crate::parse::dollar_amount;
use crate::rules::{self, RewardRule, WelcomeBonus, DEFAULT_RULES};

/// Cents-per-unit for cards without their own formula: 1% cash back, or
/// 1 point per dollar at a cent each.
const DEFAULT_UNIT_VALUE: f64 = 0.01;

/// Value `card` against a monthly spending profile.
///
/// Negative or non-finite spend is treated as zero. The result depends only
/// on the arguments.
pub fn compute(card: &CardRecord, spend: &SpendingProfile) -> EnrichedCard {
    let spend = spend.clamped();

    let (earned_as, unit_value, card_rules, bonus) = match rules::lookup(&card.id) {
        Some(known) => (
            known.currency.reward_type(),
            known.currency.unit_value(),
            known.rules,
            known.welcome_bonus,
        ),
        None => (card.reward_type, DEFAULT_UNIT_VALUE, DEFAULT_RULES, WelcomeBonus::None),
    };
    let is_points = earned_as.is_points();

    let breakdown: Vec<CategoryBreakdown> = card_rules
        .iter()
        .map(|rule| evaluate_rule(rule, &spend, unit_value, is_points))
        .collect();

    let annual_rewards: f64 = breakdown.iter().map(|b| b.annual_value).sum();
    let points_earned: Option<f64> = is_points.then(|| breakdown.iter().filter_map(|b| b.points_earned).sum());

    let (welcome_bonus, bonus_points) = match bonus {
        WelcomeBonus::Points(points) => (points * unit_value, Some(points)),
        WelcomeBonus::Cash(dollars) => (dollars, None),
        WelcomeBonus::None => (0.0, is_points.then_some(0.0)),
    };

    let annual_fee_amount = dollar_amount(&card.annual_fee);

    EnrichedCard {
        card: card.clone(),
        breakdown,
        annual_rewards,
        welcome_bonus,
        annual_fee_amount,
        net_value: annual_rewards + welcome_bonus - annual_fee_amount,
        earned_as,
        points_earned,
        bonus_points,
    }
}

fn evaluate_rule(
    rule: &RewardRule,
    spend: &SpendingProfile,
    unit_value: f64,
    is_points: bool,
) -> CategoryBreakdown {
    let monthly_spend: f64 = rule
        .sources
        .iter()
        .map(|(category, share)| spend.get(*category) * share)
        .sum();
    let annual_spend = monthly_spend * 12.0;

    let earned = match rule.cap {
        Some(cap) => {
            annual_spend.min(cap.limit) * rule.rate
                + (annual_spend - cap.limit).max(0.0) * cap.rate_after
        }
        None => annual_spend * rule.rate,
    };

    CategoryBreakdown {
        category: rule.label.to_string(),
        rate: rule.rate,
        monthly_spend,
        points_earned: is_points.then_some(earned),
        annual_value: earned * unit_value,
    }
}

/// Value every card against the same profile.
pub fn compute_all(cards: &[CardRecord], spend: &SpendingProfile) -> Vec<EnrichedCard> {
    cards.iter().map(|card| compute(card, spend)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fallback_cards;
    use crate::models::{CardType, RewardType};

    fn card(id: &str, fee: &str, reward_type: RewardType) -> CardRecord {
        CardRecord {
            id: id.to_string(),
            name: id.to_string(),
            bank: "Test Bank".to_string(),
            link: String::new(),
            purchase_apr: "20.24% Variable".to_string(),
            balance_transfer_apr: "20.24% Variable".to_string(),
            annual_fee: fee.to_string(),
            credit_level: "Good".to_string(),
            bullets: vec![],
            card_type: CardType::Personal,
            network: None,
            reward_type,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_default_formula_flat_rate() {
        let spend = SpendingProfile {
            groceries: 500.0,
            ..Default::default()
        };
        let result = compute(&card("some-card", "$0", RewardType::Cashback), &spend);
        assert!(close(result.annual_rewards, 60.0));
        assert!(close(result.net_value, 60.0));
        assert_eq!(result.welcome_bonus, 0.0);
        assert_eq!(result.annual_fee_amount, 0.0);
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].category, "All purchases");
        assert_eq!(result.breakdown[0].monthly_spend, 500.0);
        assert_eq!(result.breakdown[0].points_earned, None);
        assert_eq!(result.points_earned, None);
    }

    #[test]
    fn test_zero_spend_earns_nothing_but_keeps_bonus() {
        let spend = SpendingProfile::default();
        for id in ["chase-sapphire-preferred", "blue-cash-everyday", "unknown"] {
            let result = compute(&card(id, "$95", RewardType::Points), &spend);
            assert_eq!(result.annual_rewards, 0.0, "{id}");
            assert!(close(result.net_value, result.welcome_bonus - 95.0), "{id}");
        }
        for fallback in fallback_cards() {
            let result = compute(&fallback, &spend);
            assert_eq!(result.annual_rewards, 0.0);
            assert_eq!(result.net_value, 0.0);
        }
    }

    #[test]
    fn test_compute_is_deterministic() {
        let spend = SpendingProfile {
            dining: 123.45,
            groceries: 678.9,
            gas: 55.5,
            travel: 310.0,
            streaming: 19.99,
            other: 1000.01,
        };
        for id in ["united-explorer", "blue-cash-preferred", "other"] {
            let c = card(id, "$95", RewardType::Cashback);
            let a = compute(&c, &spend);
            let b = compute(&c, &spend);
            assert_eq!(a.net_value.to_bits(), b.net_value.to_bits());
            assert_eq!(a.annual_rewards.to_bits(), b.annual_rewards.to_bits());
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_negative_spend_is_clamped() {
        let negative = SpendingProfile {
            dining: -50.0,
            ..Default::default()
        };
        for id in ["chase-sapphire-preferred", "blue-cash-everyday", "other"] {
            let c = card(id, "$0", RewardType::Cashback);
            assert_eq!(compute(&c, &negative), compute(&c, &SpendingProfile::default()));
        }
    }

    #[test]
    fn test_chase_sapphire_preferred() {
        let spend = SpendingProfile {
            travel: 100.0,
            dining: 200.0,
            other: 300.0,
            ..Default::default()
        };
        let result = compute(&card("chase-sapphire-preferred", "$95", RewardType::Cashback), &spend);
        assert_eq!(result.earned_as, RewardType::Points);
        assert_eq!(result.breakdown.len(), 6);
        assert!(close(result.points_earned.unwrap(), 19_200.0));
        assert_eq!(result.bonus_points, Some(60_000.0));
        assert!(close(result.annual_rewards, 288.0));
        assert!(close(result.welcome_bonus, 900.0));
        assert!(close(result.net_value, 1093.0));
        assert_eq!(result.breakdown[0].category, "Chase Travel");
        assert!(close(result.breakdown[0].points_earned.unwrap(), 6000.0));
    }

    #[test]
    fn test_united_explorer_miles() {
        let spend = SpendingProfile {
            travel: 100.0,
            dining: 50.0,
            groceries: 100.0,
            ..Default::default()
        };
        let result = compute(&card("united-explorer", "$95", RewardType::Cashback), &spend);
        assert_eq!(result.earned_as, RewardType::Miles);
        assert!(close(result.points_earned.unwrap(), 7200.0));
        assert!(close(result.annual_rewards, 100.8));
        assert!(close(result.welcome_bonus, 840.0));
        assert!(close(result.net_value, 845.8));
    }

    #[test]
    fn test_blue_cash_everyday_cap() {
        let spend = SpendingProfile {
            groceries: 600.0,
            ..Default::default()
        };
        let result = compute(&card("blue-cash-everyday", "$0", RewardType::Points), &spend);
        assert_eq!(result.earned_as, RewardType::Cashback);
        assert_eq!(result.points_earned, None);
        assert_eq!(result.bonus_points, None);
        let supermarkets = &result.breakdown[0];
        assert_eq!(supermarkets.category, "U.S. Supermarkets");
        assert!(close(supermarkets.annual_value, 192.0));
        assert!(close(result.annual_rewards, 192.0));
        assert!(close(result.net_value, 392.0));
    }

    #[test]
    fn test_blue_cash_everyday_under_cap() {
        let spend = SpendingProfile {
            groceries: 400.0,
            other: 200.0,
            ..Default::default()
        };
        let result = compute(&card("blue-cash-everyday", "$0", RewardType::Cashback), &spend);
        assert!(close(result.breakdown[0].annual_value, 144.0));
        assert!(close(result.breakdown[1].annual_value, 36.0));
        assert_eq!(result.breakdown[1].monthly_spend, 100.0);
        assert!(close(result.breakdown[3].annual_value, 12.0));
    }

    #[test]
    fn test_blue_cash_preferred() {
        let spend = SpendingProfile {
            groceries: 600.0,
            streaming: 20.0,
            gas: 100.0,
            other: 1000.0,
            ..Default::default()
        };
        let result = compute(&card("blue-cash-preferred", "$95", RewardType::Cashback), &spend);
        assert!(close(result.breakdown[0].annual_value, 372.0));
        assert!(close(result.breakdown[1].annual_value, 14.4));
        assert!(close(result.breakdown[2].annual_value, 72.0));
        assert!(close(result.breakdown[3].annual_value, 108.0));
        assert!(close(result.annual_rewards, 566.4));
        assert!(close(result.net_value, 721.4));
    }

    #[test]
    fn test_unknown_points_card_keeps_reward_type() {
        let spend = SpendingProfile {
            dining: 1000.0,
            ..Default::default()
        };
        let result = compute(&card("mystery", "$0", RewardType::Miles), &spend);
        assert_eq!(result.earned_as, RewardType::Miles);
        assert!(close(result.points_earned.unwrap(), 12_000.0));
        assert_eq!(result.bonus_points, Some(0.0));
        assert!(close(result.annual_rewards, 120.0));
    }

    #[test]
    fn test_annual_fee_parsed_from_text() {
        let spend = SpendingProfile::default();
        let result = compute(&card("x", "$550 annual fee", RewardType::Cashback), &spend);
        assert_eq!(result.annual_fee_amount, 550.0);
        assert_eq!(result.net_value, -550.0);
        let result = compute(&card("x", "None", RewardType::Cashback), &spend);
        assert_eq!(result.annual_fee_amount, 0.0);
    }

    #[test]
    fn test_compute_all_preserves_order() {
        let cards = fallback_cards();
        let out = compute_all(&cards, &SpendingProfile::default());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].card.name, "Chase Freedom Unlimited");
        assert_eq!(out[1].card.name, "Citi Double Cash Card");
    }
}
