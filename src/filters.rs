use std::collections::BTreeSet;
use std::convert::Infallible;
use std::str::FromStr;

use crate::error::{CardwiseError, Result};
use crate::models::{CardType, EnrichedCard, Network};
use crate::parse::apr_value;

/// Ongoing purchase APR below this counts as low interest.
pub const LOW_INTEREST_APR: f64 = 18.0;
/// Assumed APR when the card lists none.
const MISSING_APR: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AprField {
    Purchase,
    BalanceTransfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditTier {
    ExcellentGood,
    Limited,
    Bad,
}

impl CreditTier {
    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::ExcellentGood => &["excellent", "good"],
            Self::Limited => &["limited"],
            Self::Bad => &["bad"],
        }
    }
}

/// One filter tag and the predicate it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterTag {
    /// Some bullet contains every keyword of at least one alternative.
    Benefit(&'static [&'static [&'static str]]),
    ZeroApr(AprField),
    LowInterest,
    NoAnnualFee,
    NoFirstYearFee,
    CardType(CardType),
    Network(Network),
    Bank(&'static str),
    Credit(CreditTier),
    SignupBonus,
    Unknown(String),
}

const BENEFITS: &[(&str, &[&[&str]])] = &[
    ("rental-car-insurance", &[&["rental", "car", "insurance"]]),
    ("flight-delay-protection", &[&["flight", "delay"]]),
    ("baggage-delay-coverage", &[&["baggage", "delay"]]),
    ("airport-lounge-access", &[&["airport", "lounge"]]),
    ("purchase-protection", &[&["purchase", "protection"]]),
    ("return-protection", &[&["return", "protection"]]),
    ("price-protection", &[&["price", "protection"]]),
    ("extended-warranty", &[&["extended", "warranty"]]),
    ("anniversary-bonus", &[&["anniversary"]]),
    ("cell-phone-protection", &[&["cell", "phone", "protection"]]),
    ("global-entry-tsa", &[&["global entry"], &["tsa"]]),
    ("lost-luggage-insurance", &[&["lost", "luggage"]]),
    ("lounge-access", &[&["lounge"]]),
    ("no-foreign-transaction-fee", &[&["foreign", "transaction"]]),
    ("travel-accident-insurance", &[&["travel", "accident"]]),
    ("travel-medical-insurance", &[&["travel", "medical"]]),
    ("trip-cancellation-insurance", &[&["trip", "cancellation"]]),
    ("trip-delay-insurance", &[&["trip", "delay"]]),
    ("no-transfer-fee", &[&["balance", "transfer", "fee"]]),
    ("cashback", &[&["cash", "back"]]),
    ("travel", &[&["travel"], &["miles"]]),
    ("points", &[&["points"]]),
];

const BANKS: &[&str] = &["chase", "wells-fargo", "capital-one", "boa", "citi"];

impl FromStr for FilterTag {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some((_, keywords)) = BENEFITS.iter().find(|(key, _)| *key == s) {
            return Ok(Self::Benefit(*keywords));
        }
        if let Some(bank) = BANKS.iter().find(|bank| **bank == s) {
            return Ok(Self::Bank(*bank));
        }
        let tag = match s {
            "zero-apr-purchase" => Self::ZeroApr(AprField::Purchase),
            "zero-apr-transfer" => Self::ZeroApr(AprField::BalanceTransfer),
            "low-interest" => Self::LowInterest,
            "no-annual-fee" => Self::NoAnnualFee,
            "no-first-year-fee" => Self::NoFirstYearFee,
            "personal" => Self::CardType(CardType::Personal),
            "business" => Self::CardType(CardType::Business),
            "student" => Self::CardType(CardType::Student),
            "secured" => Self::CardType(CardType::Secured),
            "visa" => Self::Network(Network::Visa),
            "mastercard" => Self::Network(Network::Mastercard),
            "amex" => Self::Network(Network::Amex),
            "excellent-good" => Self::Credit(CreditTier::ExcellentGood),
            "limited" => Self::Credit(CreditTier::Limited),
            "bad" => Self::Credit(CreditTier::Bad),
            "signup-bonus" => Self::SignupBonus,
            other => Self::Unknown(other.to_string()),
        };
        Ok(tag)
    }
}

fn has_benefit(card: &EnrichedCard, keywords: &[&str]) -> bool {
    card.card.bullets.iter().any(|bullet| {
        let bullet = bullet.to_lowercase();
        keywords.iter().all(|k| bullet.contains(&k.to_lowercase()))
    })
}

impl FilterTag {
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    pub fn matches(&self, card: &EnrichedCard) -> bool {
        let record = &card.card;
        match self {
            Self::Benefit(alternatives) => alternatives.iter().any(|kw| has_benefit(card, kw)),
            Self::ZeroApr(field) => {
                let text = match field {
                    AprField::Purchase => &record.purchase_apr,
                    AprField::BalanceTransfer => &record.balance_transfer_apr,
                };
                text.to_lowercase().contains("0%")
            }
            Self::LowInterest => apr_value(&record.purchase_apr, MISSING_APR)
                .is_some_and(|apr| apr < LOW_INTEREST_APR),
            Self::NoAnnualFee => record.annual_fee.trim() == "$0",
            Self::NoFirstYearFee => {
                let fee = record.annual_fee.to_lowercase();
                fee.contains("intro") || fee.contains("first year")
            }
            Self::CardType(card_type) => record.card_type == *card_type,
            Self::Network(network) => record.network == Some(*network),
            Self::Bank(bank) => record.bank.to_lowercase().contains(bank),
            Self::Credit(tier) => {
                let level = record.credit_level.to_lowercase();
                tier.keywords().iter().any(|k| level.contains(k))
            }
            Self::SignupBonus => card.welcome_bonus > 0.0,
            Self::Unknown(_) => true,
        }
    }
}

/// What to do with tags that map to no predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterPolicy {
    /// Unknown tags match every card.
    #[default]
    Permissive,
    /// Unknown tags are rejected before any card is evaluated.
    Strict,
}

/// The active filter tags. Order is irrelevant and duplicates collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    tags: BTreeSet<String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn insert(&mut self, tag: &str) -> bool {
        self.tags.insert(tag.trim().to_string())
    }

    /// Add the tag if absent, remove it if present. Returns whether the tag
    /// is active afterwards.
    pub fn toggle(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if self.tags.remove(tag) {
            false
        } else {
            self.tags.insert(tag.to_string());
            true
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn parsed(&self) -> Vec<FilterTag> {
        self.iter()
            .map(|t| match t.parse::<FilterTag>() {
                Ok(tag) => tag,
                Err(never) => match never {},
            })
            .collect()
    }

    /// Under [`FilterPolicy::Strict`], fail on the first unknown tag.
    pub fn validate(&self, policy: FilterPolicy) -> Result<()> {
        if policy == FilterPolicy::Strict {
            if let Some(FilterTag::Unknown(tag)) = self.parsed().into_iter().find(|t| !t.is_known()) {
                return Err(CardwiseError::UnknownFilter(tag));
            }
        }
        Ok(())
    }
}

impl<S: AsRef<str>> FromIterator<S> for FilterSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = FilterSet::new();
        for tag in iter {
            set.insert(tag.as_ref());
        }
        set
    }
}

/// True iff `card` satisfies every active tag. Unknown tags never exclude.
pub fn matches(card: &EnrichedCard, filters: &FilterSet) -> bool {
    filters.parsed().iter().all(|tag| tag.matches(card))
}

pub fn filter_cards(cards: Vec<EnrichedCard>, filters: &FilterSet) -> Vec<EnrichedCard> {
    if filters.is_empty() {
        return cards;
    }
    cards.into_iter().filter(|card| matches(card, filters)).collect()
}

// ---------------------------------------------------------------------------
// Filter groups, as offered to users
// ---------------------------------------------------------------------------

pub struct FilterOption {
    pub id: &'static str,
    pub label: &'static str,
}

pub struct FilterGroup {
    pub title: &'static str,
    pub options: &'static [FilterOption],
}

const fn opt(id: &'static str, label: &'static str) -> FilterOption {
    FilterOption { id, label }
}

pub const GROUPS: &[FilterGroup] = &[
    FilterGroup {
        title: "Rewards",
        options: &[
            opt("cashback", "Cash Back"),
            opt("travel", "Travel Rewards"),
            opt("points", "Points"),
        ],
    },
    FilterGroup {
        title: "Bonus",
        options: &[opt("signup-bonus", "Sign-up Bonus")],
    },
    FilterGroup {
        title: "Annual Fee",
        options: &[
            opt("no-annual-fee", "No Annual Fee"),
            opt("no-first-year-fee", "No Annual Fee 1st Year"),
        ],
    },
    FilterGroup {
        title: "Low Interest",
        options: &[
            opt("zero-apr-purchase", "0% APR on Purchase"),
            opt("low-interest", "Low Interest"),
        ],
    },
    FilterGroup {
        title: "Balance Transfers",
        options: &[
            opt("zero-apr-transfer", "0% APR on Balance Transfer"),
            opt("no-transfer-fee", "No Balance Transfer Fee"),
        ],
    },
    FilterGroup {
        title: "Foreign Transaction Fee",
        options: &[opt("no-foreign-transaction-fee", "No Foreign Transaction Fee")],
    },
    FilterGroup {
        title: "Card Type",
        options: &[
            opt("personal", "Personal"),
            opt("business", "Business"),
            opt("student", "Student"),
            opt("secured", "Secured"),
        ],
    },
    FilterGroup {
        title: "Network or Issuing Bank",
        options: &[
            opt("visa", "Visa"),
            opt("mastercard", "MasterCard"),
            opt("amex", "American Express"),
            opt("boa", "Bank of America"),
            opt("citi", "Citibank"),
            opt("chase", "Chase"),
            opt("wells-fargo", "Wells Fargo"),
            opt("capital-one", "Capital One"),
        ],
    },
    FilterGroup {
        title: "My Credit History",
        options: &[
            opt("excellent-good", "Good or Excellent"),
            opt("limited", "Limited or No Credit"),
            opt("bad", "Bad Credit"),
        ],
    },
    FilterGroup {
        title: "Card Benefits",
        options: &[
            opt("rental-car-insurance", "Rental Car Insurance"),
            opt("flight-delay-protection", "Flight Delay Protection"),
            opt("baggage-delay-coverage", "Baggage Delay Coverage"),
            opt("airport-lounge-access", "Airport Lounge Access"),
            opt("return-protection", "Return Protection"),
            opt("price-protection", "Price Protection"),
            opt("extended-warranty", "Extended Warranty"),
            opt("anniversary-bonus", "Anniversary Bonus"),
            opt("cell-phone-protection", "Cell Phone Protection"),
            opt("global-entry-tsa", "Global Entry/TSA PreCheck"),
            opt("lost-luggage-insurance", "Lost Luggage Insurance"),
            opt("lounge-access", "Lounge Access"),
            opt("purchase-protection", "Purchase Protection"),
            opt("travel-accident-insurance", "Travel Accident Insurance"),
            opt("travel-medical-insurance", "Travel Medical Insurance"),
            opt("trip-cancellation-insurance", "Trip Cancellation Insurance"),
            opt("trip-delay-insurance", "Trip Delay Insurance"),
        ],
    },
];
