use comfy_table::{Cell, Table};

use crate::cli::{load_catalog, origin_note};
use crate::error::Result;
use crate::settings::load_settings;

pub fn run(refresh: bool) -> Result<()> {
    let settings = load_settings();
    let load = load_catalog(&settings, refresh);

    let mut table = Table::new();
    table.set_header(vec!["ID", "Card", "Bank", "Type", "Network", "Rewards", "Annual Fee"]);
    for card in &load.cards {
        table.add_row(vec![
            Cell::new(&card.id),
            Cell::new(&card.name),
            Cell::new(&card.bank),
            Cell::new(card.card_type.key()),
            Cell::new(card.network.map(|n| n.key()).unwrap_or("")),
            Cell::new(card.reward_type),
            Cell::new(&card.annual_fee),
        ]);
    }
    println!("Cards\n{table}");
    println!("{}", origin_note(&load));
    Ok(())
}
