use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::filters::GROUPS;

pub fn run() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Group", "Tag", "Label"]);
    for group in GROUPS {
        for (i, option) in group.options.iter().enumerate() {
            let title = if i == 0 { group.title } else { "" };
            table.add_row(vec![
                Cell::new(title.bold()),
                Cell::new(option.id),
                Cell::new(option.label),
            ]);
        }
    }
    println!("Filter tags\n{table}");
    println!("Tags combine with AND. Pass them to `cardwise rank --filter <tag>`.");
    Ok(())
}
