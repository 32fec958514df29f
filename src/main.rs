use std::io;

use car_price_trend::{
    app::App,
    classify,
    cli::{self, Args},
    ui::{self, TerminalGuard},
    CsvSeriesLoader, ModelList, PriceSeries, SeriesLoader,
};
use clap::Parser;
use crossterm::event::{self, Event};
use eyre::eyre;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use serde::Serialize;

#[derive(Serialize)]
struct SeriesOutput {
    model: String,
    points: PriceSeries,
}

fn main() -> eyre::Result<()> {
    let args = Args::parse();
    cli::init_logger(&args)?;

    if args.json {
        return print_json(&args);
    }

    let mut app = App::new(CsvSeriesLoader::default());
    if let Some(root) = &args.root {
        app.open_root(root);
        if let Some(name) = &args.model {
            if app.message.is_none() && !app.select_model_by_name(name) {
                app.message = Some(format!("車種が見つかりません: {name}"));
            }
        }
    }

    let _guard = TerminalGuard::enter(io::stdout(), true)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    run(&mut terminal, &mut app)
}

fn run<B: Backend, L: SeriesLoader>(
    terminal: &mut Terminal<B>,
    app: &mut App<L>,
) -> eyre::Result<()> {
    while !app.should_quit {
        terminal.draw(|f| ui::draw(f, app))?;

        match event::read()? {
            Event::Key(key) => app.handle_key(key),
            Event::Paste(text) => app.handle_paste(&text),
            _ => {}
        }
    }
    Ok(())
}

fn print_json(args: &Args) -> eyre::Result<()> {
    let root = args.root.as_ref().ok_or_else(|| eyre!("--json needs a root folder"))?;
    let selection = classify(root)?;
    let mut models = ModelList::from_selection(&selection);

    if let Some(name) = &args.model {
        if !models.select_by_name(name) {
            return Err(eyre!("unknown car model: {name}"));
        }
    }

    let model = models
        .selected()
        .ok_or_else(|| eyre!("no car model under {}", root.display()))?;
    let points = CsvSeriesLoader::default().load(&model.path)?;

    let output = SeriesOutput {
        model: model.name.clone(),
        points,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
