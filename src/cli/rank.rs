use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{load_catalog, origin_note, FilterArgs, OutputFormat, SpendArgs};
use crate::error::Result;
use crate::fmt::money;
use crate::models::EnrichedCard;
use crate::query::parse_card_ids;
use crate::ranking::{evaluate, SortKey, SortOrder};
use crate::settings::load_settings;

pub fn run(
    spend: &SpendArgs,
    filter: &FilterArgs,
    sort: SortKey,
    asc: bool,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let settings = load_settings();
    let filters = filter.filter_set(&settings)?;
    let profile = spend.profile();
    let load = load_catalog(&settings, false);

    // A shared link may pin the selection to specific cards.
    let pinned = spend.query.as_deref().map(parse_card_ids).unwrap_or_default();
    let catalog: Vec<_> = if pinned.is_empty() {
        load.cards.clone()
    } else {
        load.cards
            .iter()
            .filter(|c| pinned.contains(&c.id))
            .cloned()
            .collect()
    };

    let order = if asc { SortOrder::Asc } else { SortOrder::Desc };
    let mut ranked = evaluate(&catalog, &profile, &filters, sort, order);
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ranked)?),
        OutputFormat::Csv => write_csv(&ranked)?,
        OutputFormat::Table => {
            print_table(&ranked, profile.total());
            println!("{}", origin_note(&load));
        }
    }
    Ok(())
}

fn write_csv(ranked: &[EnrichedCard]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    wtr.write_record([
        "rank",
        "id",
        "name",
        "bank",
        "reward_type",
        "annual_rewards",
        "welcome_bonus",
        "annual_fee",
        "net_value",
    ])?;
    for (i, card) in ranked.iter().enumerate() {
        wtr.write_record([
            (i + 1).to_string(),
            card.card.id.clone(),
            card.card.name.clone(),
            card.card.bank.clone(),
            card.earned_as.to_string(),
            format!("{:.2}", card.annual_rewards),
            format!("{:.2}", card.welcome_bonus),
            format!("{:.2}", card.annual_fee_amount),
            format!("{:.2}", card.net_value),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn print_table(ranked: &[EnrichedCard], monthly_total: f64) {
    if ranked.is_empty() {
        println!("No cards match the selected filters.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "#",
        "Card",
        "Bank",
        "Rewards/yr",
        "Welcome Bonus",
        "Annual Fee",
        "Net Value",
    ]);
    for (i, card) in ranked.iter().enumerate() {
        let net = money(card.net_value);
        let net = if card.net_value >= 0.0 { net.green() } else { net.red() };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&card.card.name),
            Cell::new(&card.card.bank),
            Cell::new(money(card.annual_rewards)),
            Cell::new(money(card.welcome_bonus)),
            Cell::new(money(card.annual_fee_amount)),
            Cell::new(net),
        ]);
    }
    println!("Ranked for {}/month in spending\n{table}", money(monthly_total));
}
