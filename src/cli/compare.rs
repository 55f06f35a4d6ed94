use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::calculator::compute;
use crate::cli::{find_card, load_catalog, SpendArgs};
use crate::error::Result;
use crate::fmt::money;
use crate::models::EnrichedCard;
use crate::ranking::{best_by, SortKey};
use crate::settings::load_settings;

pub fn run(keys: &[String], spend: &SpendArgs) -> Result<()> {
    let settings = load_settings();
    let load = load_catalog(&settings, false);
    let profile = spend.profile();

    let cards = keys
        .iter()
        .map(|key| find_card(&load.cards, key).map(|card| compute(card, &profile)))
        .collect::<Result<Vec<_>>>()?;
    let best = best_by(&cards, SortKey::Value);

    let mut header = vec![Cell::new("")];
    for (i, card) in cards.iter().enumerate() {
        if Some(i) == best {
            header.push(Cell::new(card.card.name.as_str().green().bold()));
        } else {
            header.push(Cell::new(&card.card.name));
        }
    }

    let rows: [(&str, fn(&EnrichedCard) -> String); 7] = [
        ("Bank", |c: &EnrichedCard| c.card.bank.clone()),
        ("Earns", |c: &EnrichedCard| c.earned_as.to_string()),
        ("Annual fee", |c: &EnrichedCard| money(c.annual_fee_amount)),
        ("Purchase APR", |c: &EnrichedCard| c.card.purchase_apr.clone()),
        ("Rewards/yr", |c: &EnrichedCard| money(c.annual_rewards)),
        ("Welcome bonus", |c: &EnrichedCard| money(c.welcome_bonus)),
        ("Net value", |c: &EnrichedCard| money(c.net_value)),
    ];

    let mut table = Table::new();
    table.set_header(header);
    for (label, value) in rows {
        let mut row = vec![Cell::new(label)];
        row.extend(cards.iter().map(|c| Cell::new(value(c))));
        table.add_row(row);
    }
    println!("Comparison\n{table}");

    if let Some(i) = best {
        println!(
            "Best value for this spending: {} ({})",
            cards[i].card.name,
            money(cards[i].net_value)
        );
    }
    Ok(())
}
