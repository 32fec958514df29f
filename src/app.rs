use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::{
    error::TrendError,
    loader::SeriesLoader,
    model::{PriceSeries, RootSelection},
    selector::{classify, ModelList},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Browse,
    PathInput,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub model: String,
    pub series: PriceSeries,
}

pub struct App<L: SeriesLoader> {
    loader: L,
    pub selection: Option<RootSelection>,
    pub models: ModelList,
    pub chart: Option<Chart>,
    // blocks input until dismissed
    pub message: Option<String>,
    pub mode: Mode,
    pub input: String,
    pub should_quit: bool,
}

impl<L: SeriesLoader> App<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            selection: None,
            models: ModelList::default(),
            chart: None,
            message: None,
            mode: Mode::default(),
            input: String::new(),
            should_quit: false,
        }
    }

    pub fn open_root(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let selection = match classify(path) {
            Ok(selection) => selection,
            Err(e) => return self.report(e),
        };

        self.models = ModelList::from_selection(&selection);
        self.selection = Some(selection);

        if self.models.is_empty() {
            self.chart = None;
            return;
        }
        self.load_selected();
    }

    /// Drag-and-drop; anything but an existing directory is refused silently.
    pub fn drop_path(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        if !path.is_dir() {
            log::debug!("ignored drop of {}", path.display());
            return false;
        }
        self.open_root(path);
        true
    }

    pub fn select_model(&mut self, index: usize) {
        if self.models.selected_index() == Some(index) {
            return;
        }
        if self.models.select(index) {
            self.load_selected();
        }
    }

    pub fn select_model_by_name(&mut self, name: &str) -> bool {
        match self.models.models().iter().position(|m| m.name == name) {
            Some(ix) => {
                self.select_model(ix);
                true
            }
            None => false,
        }
    }

    pub fn select_next(&mut self) {
        if let Some(ix) = self.models.selected_index() {
            if ix + 1 < self.models.len() {
                self.select_model(ix + 1);
            }
        }
    }

    pub fn select_previous(&mut self) {
        if let Some(ix) = self.models.selected_index() {
            if ix > 0 {
                self.select_model(ix - 1);
            }
        }
    }

    pub fn show_model_list(&self) -> bool {
        self.models.len() > 1
    }

    fn load_selected(&mut self) {
        let Some(model) = self.models.selected().cloned() else {
            return;
        };

        match self.loader.load(&model.path) {
            Ok(series) => {
                self.chart = Some(Chart {
                    model: model.name,
                    series,
                })
            }
            Err(e) => self.report(e),
        }
    }

    fn report(&mut self, error: TrendError) {
        log::warn!("{error}");
        self.message = Some(format!("読み込み中にエラーが発生しました: {error}"));
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.message.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.message = None;
            }
            return;
        }

        match self.mode {
            Mode::Browse => self.handle_browse_key(key),
            Mode::PathInput => self.handle_input_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char('o') => {
                self.mode = Mode::PathInput;
                self.input.clear();
            }
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Browse;
                self.input.clear();
            }
            KeyCode::Enter => {
                self.mode = Mode::Browse;
                let path = PathBuf::from(clean_path(&std::mem::take(&mut self.input)));
                self.open_root(path);
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        if self.message.is_some() {
            return;
        }

        match self.mode {
            Mode::PathInput => self.input.push_str(text.trim_end_matches(['\r', '\n'])),
            Mode::Browse => {
                self.drop_path(clean_path(text));
            }
        }
    }
}

/// Strips the whitespace and quoting terminals wrap around dropped paths.
pub fn clean_path(text: &str) -> String {
    let text = text.trim();
    let unquoted = ['\'', '"']
        .iter()
        .find_map(|q| text.strip_prefix(*q).and_then(|t| t.strip_suffix(*q)))
        .unwrap_or(text);
    unquoted.to_owned()
}

#[cfg(test)]
mod tests {
    use std::{
        cell::RefCell,
        collections::HashMap,
        fs,
        path::{Path, PathBuf},
    };

    use chrono::NaiveDate;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::{clean_path, App, Mode};
    use crate::{
        error::{Result, TrendError},
        loader::{CsvSeriesLoader, SeriesLoader},
        model::{PricePoint, PriceSeries},
    };

    /// Serves canned series per model directory and records every load.
    #[derive(Default)]
    struct StubLoader {
        series: HashMap<PathBuf, PriceSeries>,
        loads: RefCell<Vec<PathBuf>>,
    }

    impl SeriesLoader for StubLoader {
        fn load(&self, model_dir: &Path) -> Result<PriceSeries> {
            self.loads.borrow_mut().push(model_dir.to_path_buf());
            self.series.get(model_dir).cloned().ok_or_else(|| {
                TrendError::DataRead(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "access denied",
                ))
            })
        }
    }

    fn point(day: u32, average_price: f64) -> PricePoint {
        PricePoint {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            average_price,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn model_root() -> eyre::Result<tempfile::TempDir> {
        let root = tempfile::tempdir()?;
        fs::create_dir(root.path().join("Aqua"))?;
        fs::create_dir(root.path().join("Prius"))?;
        Ok(root)
    }

    #[test]
    fn unittest_open_root_selects_first_model() -> eyre::Result<()> {
        let root = model_root()?;
        let mut loader = StubLoader::default();
        loader
            .series
            .insert(root.path().join("Aqua"), vec![point(15, 155.0)].into());
        loader
            .series
            .insert(root.path().join("Prius"), PriceSeries::default());

        let mut app = App::new(loader);
        app.open_root(root.path());

        assert!(app.show_model_list());
        let chart = app.chart.as_ref().unwrap();
        assert_eq!(chart.model, "Aqua");
        assert_eq!(chart.series[0].average_price, 155.0);
        assert!(app.message.is_none());

        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.chart.as_ref().unwrap().model, "Prius");
        assert_eq!(app.loader.loads.borrow().len(), 2);

        // already at the end
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.loader.loads.borrow().len(), 2);

        Ok(())
    }

    #[test]
    fn unittest_failed_scan_keeps_previous_chart() -> eyre::Result<()> {
        let root = model_root()?;
        let mut loader = StubLoader::default();
        loader
            .series
            .insert(root.path().join("Aqua"), vec![point(15, 155.0)].into());

        let mut app = App::new(loader);
        app.open_root(root.path());
        app.select_model(1);

        assert_eq!(app.chart.as_ref().unwrap().model, "Aqua");
        assert!(app.message.as_deref().unwrap().contains("access denied"));

        // modal swallows navigation until dismissed
        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        app.handle_key(key(KeyCode::Enter));
        assert!(app.message.is_none());

        Ok(())
    }

    #[test]
    fn unittest_invalid_root_reports_without_chart_change() -> eyre::Result<()> {
        let root = model_root()?;
        let mut app = App::new(StubLoader::default());
        app.open_root(root.path().join("missing"));

        assert!(app.chart.is_none());
        assert!(app.selection.is_none());
        assert!(app.message.is_some());

        Ok(())
    }

    #[test]
    fn unittest_single_model_root_hides_list() -> eyre::Result<()> {
        let root = tempfile::tempdir()?;
        let dir = root.path().join("2024年01月15日");
        fs::create_dir(&dir)?;
        fs::write(dir.join("a.csv"), "id,name,year,price\n1,x,2019,150万円\n")?;

        let mut app = App::new(CsvSeriesLoader::default());
        app.open_root(root.path());

        assert!(app.selection.as_ref().unwrap().is_single_model);
        assert!(!app.show_model_list());
        assert_eq!(app.chart.as_ref().unwrap().series[0].average_price, 150.0);

        Ok(())
    }

    #[test]
    fn unittest_empty_root_clears_chart() -> eyre::Result<()> {
        let root = model_root()?;
        let empty = tempfile::tempdir()?;
        let mut loader = StubLoader::default();
        loader
            .series
            .insert(root.path().join("Aqua"), vec![point(15, 155.0)].into());

        let mut app = App::new(loader);
        app.open_root(root.path());
        app.open_root(empty.path());

        assert!(app.models.is_empty());
        assert!(app.models.selected().is_none());
        assert!(app.chart.is_none());

        Ok(())
    }

    #[test]
    fn unittest_paste_acts_as_drop() -> eyre::Result<()> {
        let root = model_root()?;
        let mut loader = StubLoader::default();
        loader
            .series
            .insert(root.path().join("Aqua"), vec![point(15, 155.0)].into());

        let mut app = App::new(loader);
        app.handle_paste("/no/such/folder");
        assert!(app.selection.is_none());
        assert!(app.message.is_none());

        app.handle_paste(&format!("'{}'\n", root.path().display()));
        assert_eq!(app.chart.as_ref().unwrap().model, "Aqua");

        Ok(())
    }

    #[test]
    fn unittest_path_prompt_opens_root() -> eyre::Result<()> {
        let root = model_root()?;
        let mut loader = StubLoader::default();
        loader
            .series
            .insert(root.path().join("Aqua"), vec![point(15, 155.0)].into());

        let mut app = App::new(loader);
        app.handle_key(key(KeyCode::Char('o')));
        assert_eq!(app.mode, Mode::PathInput);

        app.handle_paste(&root.path().display().to_string());
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Backspace));
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.mode, Mode::Browse);
        assert!(app.input.is_empty());
        assert_eq!(app.chart.as_ref().unwrap().model, "Aqua");

        Ok(())
    }

    #[test]
    fn unittest_clean_path() {
        assert_eq!(clean_path("  /data/cars \n"), "/data/cars");
        assert_eq!(clean_path("'/data/my cars'"), "/data/my cars");
        assert_eq!(clean_path("\"C:\\data\""), "C:\\data");
        assert_eq!(clean_path("'"), "'");
    }
}
