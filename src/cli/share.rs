use crate::cli::SpendArgs;
use crate::error::Result;
use crate::query::share_query;

pub fn run(spend: &SpendArgs, cards: &[String], base_url: Option<&str>) -> Result<()> {
    let cards: Vec<String> = cards
        .iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    let query = share_query(&spend.profile(), &cards);
    match base_url {
        Some(base) => println!("{}?{query}", base.trim_end_matches('?')),
        None => println!("?{query}"),
    }
    Ok(())
}
