use std::{fs::File, path::PathBuf};

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "car-price-trend",
    version,
    about = "Chart the average used-car listing price per scrape date"
)]
pub struct Args {
    #[arg(help = "Car model folder, or a folder of car model folders")]
    pub root: Option<PathBuf>,

    #[arg(short = 'm', long, help = "Car model to select instead of the first one")]
    pub model: Option<String>,

    #[arg(
        long,
        requires = "root",
        help = "Print the price series as JSON instead of opening the chart"
    )]
    pub json: bool,

    #[arg(long, help = "Append log records to this file")]
    pub log_file: Option<PathBuf>,
}

/// `RUST_LOG` filters, `info` by default. Without a log file the terminal
/// UI gets no logger at all so records never land on the alternate screen.
pub fn init_logger(args: &Args) -> eyre::Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    match &args.log_file {
        Some(path) => {
            let file = File::options().create(true).append(true).open(path)?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None if !args.json => return Ok(()),
        None => {
            builder.target(env_logger::Target::Stderr);
        }
    }

    builder.try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Args;

    #[test]
    fn unittest_parse_json_mode() -> eyre::Result<()> {
        let args = Args::try_parse_from(["car-price-trend", "/data", "--json", "-m", "Aqua"])?;

        assert!(args.json);
        assert_eq!(args.model.as_deref(), Some("Aqua"));
        assert_eq!(args.root.as_deref(), Some(std::path::Path::new("/data")));
        Ok(())
    }

    #[test]
    fn unittest_json_requires_root() {
        assert!(Args::try_parse_from(["car-price-trend", "--json"]).is_err());
    }
}
