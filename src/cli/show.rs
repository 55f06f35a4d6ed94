use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::calculator::compute;
use crate::cli::{find_card, load_catalog, SpendArgs};
use crate::error::Result;
use crate::fmt::{money, points, rate};
use crate::rules;
use crate::settings::load_settings;

const WRAP_WIDTH: usize = 78;

pub fn run(key: &str, spend: &SpendArgs) -> Result<()> {
    let settings = load_settings();
    let load = load_catalog(&settings, false);
    let card = find_card(&load.cards, key)?;
    let enriched = compute(card, &spend.profile());

    println!("{}", card.name.bold());
    println!("Bank:          {}", card.bank);
    println!("Annual fee:    {}", card.annual_fee);
    println!("Purchase APR:  {}", card.purchase_apr);
    println!("Transfer APR:  {}", card.balance_transfer_apr);
    println!("Credit:        {}", card.credit_level);
    println!(
        "Type:          {} / {}",
        card.card_type.key(),
        card.network.map(|n| n.key()).unwrap_or("unknown network")
    );
    match rules::lookup(&card.id) {
        Some(known) => {
            println!("Earns:         {}", known.currency.name());
            println!("Rates:         {} schedule", known.name);
        }
        None => println!("Earns:         {} (flat rate)", enriched.earned_as),
    }
    if !card.link.is_empty() {
        println!("Apply:         {}", card.link);
    }

    if !card.bullets.is_empty() {
        println!();
        let options = textwrap::Options::new(WRAP_WIDTH)
            .initial_indent("  - ")
            .subsequent_indent("    ");
        for bullet in &card.bullets {
            println!("{}", textwrap::fill(bullet, &options));
        }
    }

    let mut table = Table::new();
    table.set_header(vec!["Category", "Rate", "Monthly Spend", "Earned/yr", "Value/yr"]);
    for row in &enriched.breakdown {
        table.add_row(vec![
            Cell::new(&row.category),
            Cell::new(rate(row.rate, enriched.earned_as)),
            Cell::new(money(row.monthly_spend)),
            Cell::new(row.points_earned.map(points).unwrap_or_default()),
            Cell::new(money(row.annual_value)),
        ]);
    }
    println!("\nRewards breakdown\n{table}");

    let bonus = match enriched.bonus_points {
        Some(p) if p > 0.0 => format!("{} ({} {})", money(enriched.welcome_bonus), points(p), enriched.earned_as),
        _ => money(enriched.welcome_bonus),
    };
    let net = money(enriched.net_value);
    let net = if enriched.net_value >= 0.0 { net.green().bold() } else { net.red().bold() };

    if let Some(total) = enriched.points_earned {
        println!("Earned per year:     {} {}", points(total), enriched.earned_as);
    }
    println!("Annual rewards:      {}", money(enriched.annual_rewards));
    println!("Welcome bonus:       {bonus}");
    println!("Annual fee:          {}", money(enriched.annual_fee_amount));
    println!("Net first-year value: {net}");
    Ok(())
}
