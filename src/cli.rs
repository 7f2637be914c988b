use anyhow::{Context as _, Result};
use console::{pad_str, style, Alignment, StyledObject};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::path::Path;

use crate::args::{Args, Command};
use crate::dashboard::{self, Filter};
use crate::ingest::{self, SalesTable, REQUIRED_COLUMNS};
use crate::store::{SalesRecord, SalesStore};
use crate::terminal::{self, BulletPointPrinter};

// TODO Configurable store location
const STORE_PATH: &str = "sales.db";

pub fn main(args: Args) -> Result<()> {
    let mut cli = match args.command {
        Command::Init => Cli::new_init_store()?,
        _ => Cli::new_open_store()?,
    };
    match args.command {
        Command::Init => cli.main_init()?,
        Command::Upload { file } => cli.main_upload(&file)?,
        Command::View => cli.main_view()?,
        Command::Dashboard => cli.main_dashboard()?,
    }
    Ok(())
}

pub struct Cli {
    store: SalesStore,
}

impl Cli {
    pub fn new_init_store() -> Result<Self> {
        let store = SalesStore::create(Path::new(STORE_PATH))
            .context("Failed to create the sales store")?;
        Ok(Self { store })
    }

    pub fn new_open_store() -> Result<Self> {
        let store =
            SalesStore::open(Path::new(STORE_PATH)).context("Failed to open the sales store")?;
        Ok(Self { store })
    }

    pub fn main_init(&self) -> Result<()> {
        println!("Created an empty sales store at {STORE_PATH}");
        Ok(())
    }

    pub fn main_upload(&mut self, file: &Path) -> Result<()> {
        let bytes = std::fs::read(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let table = ingest::parse(&bytes).context("Failed to read the uploaded file")?;

        println!("{}", style_header("Preview of uploaded data:"));
        print_sales_table(&table);
        println!();
        if !terminal::confirm("Save to the sales store?")? {
            println!("Discarded, nothing was saved.");
            return Ok(());
        }

        let batch = ingest::coerce(&table).context("Failed to coerce the uploaded data")?;
        let num_rows = batch.len();
        self.store
            .append(&batch)
            .context("Failed to save the batch")?;
        println!("Saved {num_rows} rows to the sales store.");
        Ok(())
    }

    pub fn main_view(&self) -> Result<()> {
        let records = self
            .store
            .load_all()
            .context("Failed to load sales records")?;
        if records.is_empty() {
            println!("No data found. Please upload some CSVs first.");
            return Ok(());
        }
        println!("{}", style_header("Stored sales records:"));
        print_records(&records);
        Ok(())
    }

    pub fn main_dashboard(&self) -> Result<()> {
        let records = self
            .store
            .load_all()
            .context("Failed to load sales records")?;
        if records.is_empty() {
            println!("No data found. Please upload some CSVs first.");
            return Ok(());
        }

        let region = select_filter("Region", dashboard::distinct_regions(&records))?;
        let product = select_filter("Product", dashboard::distinct_products(&records))?;
        let filtered = dashboard::filter_records(&records, &region, &product);
        let printer = BulletPointPrinter::new();

        println!();
        println!("{}", style_header("Key performance indicators"));
        let totals = dashboard::totals(&filtered);
        printer.print_item(format!("Total revenue: {}", style_revenue(&totals.revenue)));
        printer.print_item(format!(
            "Total units sold: {}",
            style(format_units(totals.units_sold)).bold()
        ));

        println!();
        println!("{}", style_header("Revenue and units over time"));
        let series = dashboard::time_series(&filtered);
        if series.is_empty() {
            println!("{}", style("(none)").italic());
        } else {
            for (date, day) in &series {
                printer.print_item(format!(
                    "{} {} {}",
                    style_date(date),
                    pad_str(
                        &style_revenue(&day.revenue).to_string(),
                        15,
                        Alignment::Right,
                        None
                    ),
                    pad_str(&format_units(day.units_sold), 10, Alignment::Right, None),
                ));
            }
        }

        println!();
        println!("{}", style_header("Top selling products"));
        let ranking = dashboard::top_products(&filtered);
        if ranking.is_empty() {
            println!("{}", style("(none)").italic());
        } else {
            for (product, revenue) in &ranking {
                printer.print_item(format!(
                    "{} {}",
                    pad_str(product, 20, Alignment::Left, None),
                    style_revenue(revenue),
                ));
            }
        }
        Ok(())
    }
}

fn select_filter(label: &str, values: Vec<String>) -> Result<Filter> {
    let mut options = vec!["All".to_string()];
    options.extend(values);
    let chosen = terminal::select(label, &options)?;
    Ok(if chosen == "All" {
        Filter::All
    } else {
        Filter::Only(chosen.to_string())
    })
}

fn print_sales_table(table: &SalesTable) {
    terminal::print_table(table.columns(), table.rows());
}

fn print_records(records: &[SalesRecord]) {
    let extra_columns: BTreeSet<&str> = records
        .iter()
        .flat_map(|record| record.extra.keys().map(String::as_str))
        .collect();
    let columns: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .chain(extra_columns.iter().copied())
        .map(str::to_string)
        .collect();

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            let mut row = vec![
                record.date.format("%Y-%m-%d").to_string(),
                record.product.clone(),
                record.region.clone(),
                record.units_sold.to_string(),
                record.revenue.to_string(),
            ];
            row.extend(
                extra_columns
                    .iter()
                    .map(|column| record.extra.get(*column).cloned().unwrap_or_default()),
            );
            row
        })
        .collect();

    terminal::print_table(&columns, &rows);
}

fn style_header(header: &str) -> StyledObject<&str> {
    style(header).bold().underlined()
}

fn style_date(date: &chrono::NaiveDate) -> StyledObject<String> {
    style(date.format("%Y-%m-%d").to_string())
}

fn style_revenue(revenue: &Decimal) -> StyledObject<String> {
    let result = style(format_revenue(revenue)).bold();
    if revenue < &Decimal::ZERO {
        result.red()
    } else {
        result.green()
    }
}

fn format_revenue(revenue: &Decimal) -> String {
    let rounded = format!("{:.2}", revenue.round_dp(2));
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", int_part),
    };
    format!("{sign}${}.{frac_part}", group_thousands(digits))
}

fn format_units(units: i64) -> String {
    let formatted = units.to_string();
    match formatted.strip_prefix('-') {
        Some(digits) => format!("-{}", group_thousands(digits)),
        None => group_thousands(&formatted),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::new();
    for (index, digit) in digits.chars().enumerate() {
        if index != 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
