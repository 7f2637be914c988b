use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Select};

mod bullet_points;
mod table;

pub use bullet_points::BulletPointPrinter;
pub use table::print_table;

pub fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

/// Presents `options` and returns the chosen entry.
pub fn select<'a>(prompt: &str, options: &'a [String]) -> Result<&'a str> {
    let chosen = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(options)
        .default(0)
        .interact()?;
    Ok(&options[chosen])
}
