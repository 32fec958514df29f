use std::{fs, path::Path};

use chrono::NaiveDate;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    error::{Result, TrendError},
    model::{CarModel, RootSelection},
};

pub const DATE_FOLDER_FORMAT: &str = "%Y年%m月%d日";

// chrono accepts unpadded fields, so the shape is checked first.
static DATE_FOLDER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}年[0-9]{2}月[0-9]{2}日$").unwrap());

/// Parses a folder name of the exact form `YYYY年MM月DD日`.
pub fn parse_date_folder(name: &str) -> Option<NaiveDate> {
    if !DATE_FOLDER_PATTERN.is_match(name) {
        return None;
    }
    NaiveDate::parse_from_str(name, DATE_FOLDER_FORMAT).ok()
}

pub fn is_date_folder(name: &str) -> bool {
    parse_date_folder(name).is_some()
}

/// Classifies a root from its immediate subdirectory names without touching the filesystem.
pub fn classify_names<I, S>(root_path: &Path, names: I) -> RootSelection
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let subdirectories = names.into_iter().map(Into::into).sorted().collect_vec();
    let is_single_model = subdirectories.iter().any(|name| is_date_folder(name));

    RootSelection {
        root_path: root_path.to_path_buf(),
        is_single_model,
        subdirectories,
    }
}

pub fn classify(root_path: impl AsRef<Path>) -> Result<RootSelection> {
    let root_path = root_path.as_ref();
    if !root_path.is_dir() {
        return Err(TrendError::InvalidInput(root_path.to_path_buf()));
    }

    let names = list_subdirectories(root_path)?;
    let selection = classify_names(root_path, names);

    log::info!(
        "classified {} as {} ({} subdirectories)",
        root_path.display(),
        if selection.is_single_model { "single model" } else { "model collection" },
        selection.subdirectories.len()
    );

    Ok(selection)
}

pub(crate) fn list_subdirectories(dir: &Path) -> Result<Vec<String>> {
    let mut names = vec![];

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.path().is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    Ok(names)
}

/// Selectable car models; one entry is active whenever the list is non-empty.
#[derive(Default, Debug, Clone)]
pub struct ModelList {
    models: Vec<CarModel>,
    selected: Option<usize>,
}

impl ModelList {
    pub fn new(models: Vec<CarModel>) -> Self {
        let selected = if models.is_empty() { None } else { Some(0) };
        Self { models, selected }
    }

    pub fn from_selection(selection: &RootSelection) -> Self {
        Self::new(selection.models())
    }

    pub fn models(&self) -> &[CarModel] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&CarModel> {
        self.selected.and_then(|ix| self.models.get(ix))
    }

    /// Returns `false` when `index` is out of range; the selection is kept.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.models.len() {
            return false;
        }
        self.selected = Some(index);
        true
    }

    pub fn select_by_name(&mut self, name: &str) -> bool {
        match self.models.iter().position(|m| m.name == name) {
            Some(ix) => self.select(ix),
            None => false,
        }
    }
}
