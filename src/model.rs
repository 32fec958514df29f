use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use derive_more::{Deref, From};
use serde::Serialize;

pub type Price = f64;

/// Result of inspecting a user-picked root directory.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RootSelection {
    pub root_path: PathBuf,
    pub is_single_model: bool,
    /// Immediate subdirectory names, sorted.
    pub subdirectories: Vec<String>,
}

impl RootSelection {
    pub fn models(&self) -> Vec<CarModel> {
        if self.is_single_model {
            return vec![CarModel {
                name: display_name(&self.root_path),
                path: self.root_path.clone(),
            }];
        }

        self.subdirectories
            .iter()
            .map(|name| CarModel {
                name: name.clone(),
                path: self.root_path.join(name),
            })
            .collect()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct CarModel {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub average_price: Price,
}

/// Price points in ascending date order.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deref, From)]
pub struct PriceSeries(Vec<PricePoint>);
