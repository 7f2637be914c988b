use std::collections::{hash_map::Entry, BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::store::SalesRecord;

/// An equality filter over one of the label columns.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum Filter {
    All,
    Only(String),
}

impl Filter {
    pub fn matches(&self, label: &str) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(value) => label == value,
        }
    }
}

/// Summed revenue and units over a set of records. An empty set sums to
/// zero.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct Totals {
    pub revenue: Decimal,
    pub units_sold: i64,
}

impl Totals {
    fn add(&mut self, record: &SalesRecord) {
        self.revenue += record.revenue;
        self.units_sold += record.units_sold;
    }
}

pub fn filter_records<'a>(
    records: &'a [SalesRecord],
    region: &Filter,
    product: &Filter,
) -> Vec<&'a SalesRecord> {
    records
        .iter()
        .filter(|record| region.matches(&record.region) && product.matches(&record.product))
        .collect()
}

pub fn totals(records: &[&SalesRecord]) -> Totals {
    let mut totals = Totals::default();
    for record in records {
        totals.add(record);
    }
    totals
}

/// Groups records by date, summing revenue and units per date. Ordered
/// ascending by date.
pub fn time_series(records: &[&SalesRecord]) -> Vec<(NaiveDate, Totals)> {
    let mut by_date: BTreeMap<NaiveDate, Totals> = BTreeMap::new();
    for record in records {
        by_date.entry(record.date).or_default().add(record);
    }
    by_date.into_iter().collect()
}

/// Groups records by product, summing revenue, sorted descending by summed
/// revenue. Ties keep the first-appearance order of the product within
/// `records`; that order carries no meaning.
pub fn top_products(records: &[&SalesRecord]) -> Vec<(String, Decimal)> {
    let mut ranking: Vec<(String, Decimal)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for record in records {
        match index.entry(record.product.clone()) {
            Entry::Occupied(entry) => ranking[*entry.get()].1 += record.revenue,
            Entry::Vacant(entry) => {
                entry.insert(ranking.len());
                ranking.push((record.product.clone(), record.revenue));
            }
        }
    }
    ranking.sort_by(|a, b| b.1.cmp(&a.1));
    ranking
}

/// Sorted unique region labels, used to populate the region filter control.
pub fn distinct_regions(records: &[SalesRecord]) -> Vec<String> {
    distinct(records.iter().map(|record| record.region.as_str()))
}

/// Sorted unique product labels, used to populate the product filter
/// control.
pub fn distinct_products(records: &[SalesRecord]) -> Vec<String> {
    distinct(records.iter().map(|record| record.product.as_str()))
}

fn distinct<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut labels: Vec<String> = labels.map(str::to_string).collect();
    labels.sort();
    labels.dedup();
    labels
}
