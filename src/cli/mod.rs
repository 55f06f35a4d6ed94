pub mod cache;
pub mod cards;
pub mod compare;
pub mod filters;
pub mod init;
pub mod rank;
pub mod share;
pub mod show;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::warn;

use crate::catalog::{feed_source, CatalogLoad, CatalogLoader};
use crate::error::{CardwiseError, Result};
use crate::filters::{FilterPolicy, FilterSet};
use crate::models::{CardRecord, SpendCategory, SpendingProfile};
use crate::parse::spend_amount;
use crate::query::parse_spend_query;
use crate::ranking::SortKey;
use crate::settings::Settings;
use crate::store::{KvStore, MemoryStore, SqliteStore};

#[derive(Parser)]
#[command(
    name = "cardwise",
    version,
    about = "Find the credit card that pays you the most for how you actually spend."
)]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and card feed, and create the cache database.
    Init {
        /// Path for cardwise data (default: ~/.local/share/cardwise)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// URL or file path of the XML card feed
        #[arg(long = "feed-url")]
        feed_url: Option<String>,
        /// Reject unknown filter tags by default
        #[arg(long = "strict-filters")]
        strict_filters: Option<bool>,
    },
    /// List the card catalog.
    Cards {
        /// Ignore the cached snapshot and fetch the feed again
        #[arg(long)]
        refresh: bool,
    },
    /// Rank cards by value for a monthly spending profile.
    Rank {
        #[command(flatten)]
        spend: SpendArgs,
        #[command(flatten)]
        filter: FilterArgs,
        /// What to rank by
        #[arg(long, value_enum, default_value_t = SortKey::Value)]
        sort: SortKey,
        /// Lowest first
        #[arg(long)]
        asc: bool,
        /// Show at most this many cards
        #[arg(long)]
        limit: Option<usize>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show one card's details and reward breakdown.
    Show {
        /// Card id or exact name
        card: String,
        #[command(flatten)]
        spend: SpendArgs,
    },
    /// Compare up to three cards side by side.
    Compare {
        /// Card ids or exact names, at most three
        #[arg(required = true, num_args = 1..=3)]
        cards: Vec<String>,
        #[command(flatten)]
        spend: SpendArgs,
    },
    /// List the available filter tags.
    Filters,
    /// Print a shareable query string for a spending profile.
    Share {
        #[command(flatten)]
        spend: SpendArgs,
        /// Card ids to include, comma-separated
        #[arg(long, value_delimiter = ',')]
        cards: Vec<String>,
        /// Prefix the query with this URL
        #[arg(long = "base-url")]
        base_url: Option<String>,
    },
    /// Inspect or clear the card cache.
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Show cached entries and snapshot age.
    Status,
    /// Drop the cached card snapshot so the next command refetches.
    Clear {
        /// Delete every entry, not just the card snapshot
        #[arg(long)]
        all: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

/// Monthly spend flags shared by every command that values cards.
/// Amounts accept `$` and thousands separators; anything unparseable or
/// negative counts as zero.
#[derive(Args, Debug, Clone, Default)]
pub struct SpendArgs {
    /// Monthly dining spend
    #[arg(long)]
    pub dining: Option<String>,
    /// Monthly grocery spend
    #[arg(long)]
    pub groceries: Option<String>,
    /// Monthly gas spend
    #[arg(long)]
    pub gas: Option<String>,
    /// Monthly travel spend
    #[arg(long)]
    pub travel: Option<String>,
    /// Monthly streaming spend
    #[arg(long)]
    pub streaming: Option<String>,
    /// Monthly spend on everything else
    #[arg(long)]
    pub other: Option<String>,
    /// Start from a shared query string (spend_dining=...&spend_gas=...)
    #[arg(long)]
    pub query: Option<String>,
}

impl SpendArgs {
    fn flag(&self, category: SpendCategory) -> Option<&str> {
        match category {
            SpendCategory::Dining => self.dining.as_deref(),
            SpendCategory::Groceries => self.groceries.as_deref(),
            SpendCategory::Gas => self.gas.as_deref(),
            SpendCategory::Travel => self.travel.as_deref(),
            SpendCategory::Streaming => self.streaming.as_deref(),
            SpendCategory::Other => self.other.as_deref(),
        }
    }

    /// The query string first, then explicit flags on top.
    pub fn profile(&self) -> SpendingProfile {
        let mut profile = self
            .query
            .as_deref()
            .map(parse_spend_query)
            .unwrap_or_default();
        for category in SpendCategory::ALL {
            if let Some(raw) = self.flag(category) {
                profile.set(category, spend_amount(raw));
            }
        }
        profile
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Filter tag; repeat or comma-separate for several, naming a tag twice
    /// turns it off again (see `cardwise filters`)
    #[arg(long = "filter", short = 'f', value_delimiter = ',')]
    pub tags: Vec<String>,
    /// Fail on unknown filter tags instead of ignoring them
    #[arg(long)]
    pub strict: bool,
}

impl FilterArgs {
    pub fn filter_set(&self, settings: &Settings) -> Result<FilterSet> {
        let mut filters = FilterSet::new();
        for tag in self.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            filters.toggle(tag);
        }
        let policy = if self.strict {
            FilterPolicy::Strict
        } else {
            settings.filter_policy()
        };
        filters.validate(policy)?;
        Ok(filters)
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn open_store(settings: &Settings) -> Box<dyn KvStore> {
    match SqliteStore::open(&settings.db_path()) {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!("Card cache unavailable, continuing without it: {e}");
            Box::new(MemoryStore::new())
        }
    }
}

/// Load the catalog through the configured cache and feed.
pub(crate) fn load_catalog(settings: &Settings, refresh: bool) -> CatalogLoad {
    let mut store = open_store(settings);
    let source = feed_source(&settings.feed_location(), settings.fetch_timeout());
    let mut loader =
        CatalogLoader::new(&mut *store, source.as_ref()).with_ttl_ms(settings.cache_ttl_ms());
    if refresh {
        loader.refresh()
    } else {
        loader.load()
    }
}

/// Find a card by id, falling back to a case-insensitive name match.
pub(crate) fn find_card<'c>(cards: &'c [CardRecord], key: &str) -> Result<&'c CardRecord> {
    let key = key.trim();
    cards
        .iter()
        .find(|c| c.id == key)
        .or_else(|| cards.iter().find(|c| c.name.eq_ignore_ascii_case(key)))
        .ok_or_else(|| CardwiseError::UnknownCard(key.to_string()))
}

/// Footer line naming where the catalog came from.
pub(crate) fn origin_note(load: &CatalogLoad) -> String {
    match &load.warning {
        Some(reason) => format!(
            "{} cards from {} ({reason})",
            load.cards.len(),
            load.origin.label()
        ),
        None => format!("{} cards from {}", load.cards.len(), load.origin.label()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fallback_cards;

    #[test]
    fn test_compare_takes_at_most_three_cards() {
        assert!(Cli::try_parse_from(["cardwise", "compare", "a", "b", "c"]).is_ok());
        assert!(Cli::try_parse_from(["cardwise", "compare", "a", "b", "c", "d"]).is_err());
        assert!(Cli::try_parse_from(["cardwise", "compare"]).is_err());
    }

    #[test]
    fn test_spend_flags_override_query() {
        let args = SpendArgs {
            dining: Some("$1,200".to_string()),
            gas: Some("-5".to_string()),
            query: Some("?spend_dining=10&spend_travel=300".to_string()),
            ..Default::default()
        };
        let profile = args.profile();
        assert_eq!(profile.dining, 1200.0);
        assert_eq!(profile.travel, 300.0);
        assert_eq!(profile.gas, 0.0);
        assert_eq!(profile.other, 0.0);
    }

    #[test]
    fn test_filter_args_toggle_and_policy() {
        let settings = Settings::default();
        let args = FilterArgs {
            tags: vec!["visa".into(), "cashback".into(), "visa".into(), " ".into()],
            strict: false,
        };
        let filters = args.filter_set(&settings).unwrap();
        assert_eq!(filters.iter().collect::<Vec<_>>(), vec!["cashback"]);

        let args = FilterArgs {
            tags: vec!["luxury".into()],
            strict: true,
        };
        assert!(matches!(
            args.filter_set(&settings),
            Err(CardwiseError::UnknownFilter(t)) if t == "luxury"
        ));

        let strict_settings = Settings {
            strict_filters: true,
            ..Default::default()
        };
        let args = FilterArgs {
            tags: vec!["luxury".into()],
            strict: false,
        };
        assert!(args.filter_set(&strict_settings).is_err());
    }

    #[test]
    fn test_find_card() {
        let cards = fallback_cards();
        assert_eq!(find_card(&cards, "citi-double-cash-card").unwrap().name, "Citi Double Cash Card");
        assert_eq!(find_card(&cards, "chase freedom unlimited").unwrap().id, "chase-freedom-unlimited");
        assert!(matches!(
            find_card(&cards, "nope"),
            Err(CardwiseError::UnknownCard(k)) if k == "nope"
        ));
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
