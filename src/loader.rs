use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use itertools::Itertools;

use crate::{
    error::Result,
    model::{Price, PricePoint, PriceSeries},
    selector::{list_subdirectories, parse_date_folder},
    utils::Average,
};

const PRICE_COLUMN: usize = 3;
const PRICE_UNIT: &str = "万円";

pub trait SeriesLoader {
    fn load(&self, model_dir: &Path) -> Result<PriceSeries>;
}

/// Reads one CSV per date folder straight from disk.
#[derive(Default, Debug, Clone, Copy)]
pub struct CsvSeriesLoader {}

impl SeriesLoader for CsvSeriesLoader {
    fn load(&self, model_dir: &Path) -> Result<PriceSeries> {
        build_series(model_dir)
    }
}

pub fn build_series(model_dir: impl AsRef<Path>) -> Result<PriceSeries> {
    let model_dir = model_dir.as_ref();
    let mut averages: BTreeMap<NaiveDate, Price> = BTreeMap::new();

    for name in list_subdirectories(model_dir)? {
        let Some(date) = parse_date_folder(&name) else {
            log::debug!("skip {name}: not a date folder");
            continue;
        };

        let date_dir = model_dir.join(&name);
        let Some(csv) = first_csv(&date_dir)? else {
            log::debug!("skip {name}: no csv file");
            continue;
        };

        let mut average = Average::default();
        average.extend(load_prices(&csv)?);

        match average.avg() {
            Some(avg) => {
                averages.insert(date, avg);
            }
            None => log::debug!("skip {name}: no valid price rows in {}", csv.display()),
        }
    }

    let points = averages
        .into_iter()
        .map(|(date, average_price)| PricePoint {
            date,
            average_price,
        })
        .collect_vec();

    log::info!("built {} price points from {}", points.len(), model_dir.display());

    Ok(points.into())
}

/// First `*.csv` file in directory-listing order.
pub fn first_csv(dir: &Path) -> Result<Option<PathBuf>> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("csv"));

        if is_csv && path.is_file() {
            return Ok(Some(path));
        }
    }

    Ok(None)
}

/// Column-3 prices of every data row; rows that do not parse are dropped.
pub fn load_prices(path: impl AsRef<Path>) -> Result<Vec<Price>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut prices = vec![];

    for (ix, line) in reader.split(b'\n').enumerate().skip(1) {
        // mis-encoded rows only lose their price, like any other bad row
        let line = String::from_utf8_lossy(&line?).into_owned();
        let line = line.trim_end_matches('\r');
        let splits = line.split(',').collect_vec();

        if splits.len() <= PRICE_COLUMN {
            log::trace!("line {}: {} columns", ix + 1, splits.len());
            continue;
        }

        match parse_price(splits[PRICE_COLUMN]) {
            Some(price) => prices.push(price),
            None => log::trace!("line {}: bad price {:?}", ix + 1, splits[PRICE_COLUMN]),
        }
    }

    Ok(prices)
}

/// Parses `150万円`, ` 1,200 ` and the like.
pub fn parse_price(raw: &str) -> Option<Price> {
    let cleaned = raw.replace(PRICE_UNIT, "").replace(',', "");
    cleaned
        .trim()
        .parse::<Price>()
        .ok()
        .filter(|price| price.is_finite())
}
