use url::form_urlencoded;

use crate::models::{SpendCategory, SpendingProfile};
use crate::parse::spend_amount;

const SPEND_PREFIX: &str = "spend_";
const CARDS_PARAM: &str = "cards";

fn pairs(query: &str) -> form_urlencoded::Parse<'_> {
    let query = query.trim();
    let query = query.split_once('?').map_or(query, |(_, q)| q);
    form_urlencoded::parse(query.as_bytes())
}

/// Spending profile from `spend_<category>` query parameters. Missing,
/// unparseable and negative amounts read as zero; a repeated parameter keeps
/// its first value.
pub fn parse_spend_query(query: &str) -> SpendingProfile {
    let mut profile = SpendingProfile::default();
    let mut seen = Vec::new();
    for (key, value) in pairs(query) {
        let Some(name) = key.strip_prefix(SPEND_PREFIX) else {
            continue;
        };
        let Ok(category) = name.parse::<SpendCategory>() else {
            continue;
        };
        if seen.contains(&category) {
            continue;
        }
        seen.push(category);
        profile.set(category, spend_amount(&value));
    }
    profile
}

/// Card ids from the comma-separated `cards` parameter.
pub fn parse_card_ids(query: &str) -> Vec<String> {
    pairs(query)
        .find(|(key, _)| key == CARDS_PARAM)
        .map(|(_, value)| {
            value
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Query string that reproduces `profile` (and an optional card selection).
pub fn share_query(profile: &SpendingProfile, card_ids: &[String]) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());
    for category in SpendCategory::ALL {
        out.append_pair(
            &format!("{SPEND_PREFIX}{}", category.key()),
            &profile.get(category).to_string(),
        );
    }
    if !card_ids.is_empty() {
        out.append_pair(CARDS_PARAM, &card_ids.join(","));
    }
    out.finish()
}
