use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;

use quick_xml::events::Event;
use quick_xml::Reader as XmlReader;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CardwiseError, Result};
use crate::models::{CardRecord, CardType, Network, RewardType};
use crate::store::KvStore;

pub const STORAGE_KEY: &str = "credit_cards_data";
pub const CACHE_TTL_MS: i64 = 24 * 60 * 60 * 1000;
pub const MAX_BULLETS: usize = 12;

// ---------------------------------------------------------------------------
// Feed sources
// ---------------------------------------------------------------------------

/// Where the raw card feed comes from. One attempt per call, no retries.
pub trait FeedSource {
    fn fetch(&self) -> Result<String>;
    fn describe(&self) -> String;
}

pub struct HttpFeed {
    pub url: String,
    pub timeout: Duration,
}

impl FeedSource for HttpFeed {
    fn fetch(&self) -> Result<String> {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(self.timeout)
            .timeout_read(self.timeout)
            .timeout(self.timeout)
            .build();
        match agent.get(&self.url).call() {
            Ok(resp) => resp
                .into_string()
                .map_err(|e| CardwiseError::Http(format!("failed to read body: {e}"))),
            Err(ureq::Error::Status(code, _)) => {
                Err(CardwiseError::Http(format!("HTTP error! status: {code}")))
            }
            Err(e) => Err(CardwiseError::Http(e.to_string())),
        }
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

pub struct FileFeed {
    pub path: PathBuf,
}

impl FeedSource for FileFeed {
    fn fetch(&self) -> Result<String> {
        Ok(std::fs::read_to_string(&self.path)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Pick a feed source for a configured location: URLs go over HTTP,
/// anything else is read from disk.
pub fn feed_source(location: &str, timeout: Duration) -> Box<dyn FeedSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpFeed {
            url: location.to_string(),
            timeout,
        })
    } else {
        let path = location.strip_prefix("file://").unwrap_or(location);
        Box::new(FileFeed {
            path: PathBuf::from(path),
        })
    }
}

// ---------------------------------------------------------------------------
// Feed parsing
// ---------------------------------------------------------------------------

/// Lowercase ASCII alphanumerics joined by single dashes.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn infer_card_type(name: &str) -> CardType {
    let name = name.to_lowercase();
    let mut card_type = CardType::Personal;
    if name.contains("business") {
        card_type = CardType::Business;
    }
    if name.contains("student") {
        card_type = CardType::Student;
    }
    if name.contains("secured") {
        card_type = CardType::Secured;
    }
    card_type
}

pub fn infer_network(name: &str) -> Option<Network> {
    let name = name.to_lowercase();
    let mut network = None;
    if name.contains("visa") {
        network = Some(Network::Visa);
    }
    if name.contains("mastercard") {
        network = Some(Network::Mastercard);
    }
    if name.contains("amex") || name.contains("american express") {
        network = Some(Network::Amex);
    }
    if name.contains("discover") {
        network = Some(Network::Discover);
    }
    network
}

/// `points` is checked first, so bullets naming both points and miles
/// earn points.
pub fn infer_reward_type(bullets: &[String]) -> RewardType {
    let text = bullets.join(" ").to_lowercase();
    if text.contains("points") || text.contains("thankyou") {
        RewardType::Points
    } else if text.contains("miles") {
        RewardType::Miles
    } else {
        RewardType::Cashback
    }
}

fn record_from_fields(fields: &HashMap<String, String>) -> CardRecord {
    let get = |tag: &str| fields.get(tag).cloned().unwrap_or_default();

    let bullets: Vec<String> = (1..=MAX_BULLETS)
        .map(|i| get(&format!("bullet{i}")))
        .filter(|b| !b.is_empty())
        .collect();

    let name = get("name");
    let id = match fields.get("id") {
        Some(id) if !id.is_empty() => id.clone(),
        _ => slugify(&name),
    };

    CardRecord {
        id,
        card_type: infer_card_type(&name),
        network: infer_network(&name),
        reward_type: infer_reward_type(&bullets),
        name,
        bank: get("bank"),
        link: get("link"),
        purchase_apr: get("purchaseAPR"),
        balance_transfer_apr: get("balanceTransferAPR"),
        annual_fee: get("annualFee"),
        credit_level: get("creditLevel"),
        bullets,
    }
}

/// Parse every `<card>` element of an XML feed. Child elements other than
/// the known fields are ignored; a repeated field keeps its first value.
/// Markup nested inside a field contributes its text, like `textContent`.
pub fn parse_feed(xml: &str) -> Result<Vec<CardRecord>> {
    let mut reader = XmlReader::from_str(xml);
    let mut buf = Vec::new();

    let mut cards = Vec::new();
    let mut fields: Option<HashMap<String, String>> = None;
    // Open field, its text so far and how many nested elements are open in it.
    let mut current: Option<(String, String, usize)> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                if let Some((_, _, depth)) = current.as_mut() {
                    *depth += 1;
                } else {
                    let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                    if tag == "card" {
                        fields = Some(HashMap::new());
                    } else if fields.is_some() {
                        current = Some((tag, String::new(), 0));
                    }
                }
            }
            Event::Text(t) => {
                if let Some((_, text, _)) = current.as_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::CData(t) => {
                if let Some((_, text, _)) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::End(e) => match current.take() {
                Some((name, text, depth)) if depth > 0 => current = Some((name, text, depth - 1)),
                Some((name, text, _)) => {
                    if let Some(map) = fields.as_mut() {
                        map.entry(name).or_insert_with(|| text.trim().to_string());
                    }
                }
                None => {
                    if e.local_name().as_ref() == b"card" {
                        if let Some(done) = fields.take() {
                            cards.push(record_from_fields(&done));
                        }
                    }
                }
            },
            Event::Eof => break,
            _ => (),
        }
        buf.clear();
    }

    dedupe_ids(&mut cards);
    Ok(cards)
}

fn dedupe_ids(cards: &mut [CardRecord]) {
    let mut seen = HashSet::new();
    for card in cards.iter_mut() {
        if !seen.insert(card.id.clone()) {
            let mut n = 2;
            while !seen.insert(format!("{}-{n}", card.id)) {
                n += 1;
            }
            card.id = format!("{}-{n}", card.id);
        }
    }
}

// ---------------------------------------------------------------------------
// Fallback list
// ---------------------------------------------------------------------------

pub fn fallback_cards() -> Vec<CardRecord> {
    let freedom_bullets = vec![
        "Earn unlimited 1.5% cash back on all purchases".to_string(),
        "Earn 3% cash back at restaurants and drugstores".to_string(),
        "Earn 5% cash back on travel purchased through Chase Ultimate Rewards®".to_string(),
        "No minimum to redeem for cash back".to_string(),
        "No annual fee".to_string(),
    ];
    let double_cash_bullets = vec![
        "Earn 2% on every purchase - 1% when you buy and 1% when you pay".to_string(),
        "No categories to track".to_string(),
        "No annual fee".to_string(),
        "Flexible redemption options".to_string(),
    ];
    vec![
        CardRecord {
            id: "chase-freedom-unlimited".to_string(),
            name: "Chase Freedom Unlimited".to_string(),
            bank: "Chase".to_string(),
            link: "https://creditcards.chase.com/cash-back-credit-cards/freedom/unlimited"
                .to_string(),
            purchase_apr: "19.74% - 28.49% Variable".to_string(),
            balance_transfer_apr: "19.74% - 28.49% Variable".to_string(),
            annual_fee: "$0".to_string(),
            credit_level: "Good to Excellent".to_string(),
            bullets: freedom_bullets,
            card_type: CardType::Personal,
            network: Some(Network::Visa),
            reward_type: RewardType::Cashback,
        },
        CardRecord {
            id: "citi-double-cash-card".to_string(),
            name: "Citi Double Cash Card".to_string(),
            bank: "Citi".to_string(),
            link: "https://www.citi.com/credit-cards/citi-double-cash-credit-card".to_string(),
            purchase_apr: "18.74% - 28.74% Variable".to_string(),
            balance_transfer_apr: "18.74% - 28.74% Variable".to_string(),
            annual_fee: "$0".to_string(),
            credit_level: "Good to Excellent".to_string(),
            bullets: double_cash_bullets,
            card_type: CardType::Personal,
            network: Some(Network::Mastercard),
            reward_type: RewardType::Cashback,
        },
    ]
}

// ---------------------------------------------------------------------------
// Cache snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub cards: Vec<CardRecord>,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl CacheSnapshot {
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.timestamp
    }

    pub fn is_fresh(&self, now_ms: i64, ttl_ms: i64) -> bool {
        self.age_ms(now_ms) < ttl_ms
    }
}

pub fn read_snapshot(store: &dyn KvStore) -> Result<Option<CacheSnapshot>> {
    match store.get(STORAGE_KEY)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn write_snapshot(store: &mut dyn KvStore, snapshot: &CacheSnapshot) -> Result<()> {
    let json = serde_json::to_string(snapshot)?;
    store.set(STORAGE_KEY, &json)
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrigin {
    Cache,
    Feed,
    Fallback,
}

impl CatalogOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Feed => "feed",
            Self::Fallback => "built-in fallback",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogLoad {
    pub cards: Vec<CardRecord>,
    pub origin: CatalogOrigin,
    /// Why the fallback list was served, if it was.
    pub warning: Option<String>,
}

pub struct CatalogLoader<'a> {
    store: &'a mut dyn KvStore,
    source: &'a dyn FeedSource,
    ttl_ms: i64,
}

impl<'a> CatalogLoader<'a> {
    pub fn new(store: &'a mut dyn KvStore, source: &'a dyn FeedSource) -> Self {
        Self {
            store,
            source,
            ttl_ms: CACHE_TTL_MS,
        }
    }

    pub fn with_ttl_ms(mut self, ttl_ms: i64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    pub fn load(&mut self) -> CatalogLoad {
        self.load_at(chrono::Utc::now().timestamp_millis(), false)
    }

    /// Ignore any cached snapshot and go straight to the feed.
    pub fn refresh(&mut self) -> CatalogLoad {
        self.load_at(chrono::Utc::now().timestamp_millis(), true)
    }

    pub fn load_at(&mut self, now_ms: i64, skip_cache: bool) -> CatalogLoad {
        if !skip_cache {
            match read_snapshot(&*self.store) {
                Ok(Some(snapshot)) if snapshot.is_fresh(now_ms, self.ttl_ms) => {
                    info!(
                        cards = snapshot.cards.len(),
                        age_ms = snapshot.age_ms(now_ms),
                        "Using cached card data"
                    );
                    return CatalogLoad {
                        cards: snapshot.cards,
                        origin: CatalogOrigin::Cache,
                        warning: None,
                    };
                }
                Ok(Some(snapshot)) => {
                    debug!(age_ms = snapshot.age_ms(now_ms), "cached card data is stale");
                }
                Ok(None) => debug!("no cached card data"),
                Err(e) => warn!("Failed to read cached cards: {e}"),
            }
        }

        match self.fetch_cards() {
            Ok(cards) => {
                let snapshot = CacheSnapshot {
                    cards,
                    timestamp: now_ms,
                };
                if let Err(e) = write_snapshot(&mut *self.store, &snapshot) {
                    warn!("Failed to store cards in cache: {e}");
                }
                info!(cards = snapshot.cards.len(), source = %self.source.describe(), "Loaded card feed");
                CatalogLoad {
                    cards: snapshot.cards,
                    origin: CatalogOrigin::Feed,
                    warning: None,
                }
            }
            Err(e) => {
                warn!("Failed to fetch or parse cards, using fallback data: {e}");
                CatalogLoad {
                    cards: fallback_cards(),
                    origin: CatalogOrigin::Fallback,
                    warning: Some(e.to_string()),
                }
            }
        }
    }

    fn fetch_cards(&self) -> Result<Vec<CardRecord>> {
        let xml = self.source.fetch()?;
        let cards = parse_feed(&xml)?;
        if cards.is_empty() {
            return Err(CardwiseError::Feed("No cards found in feed".to_string()));
        }
        Ok(cards)
    }
}
