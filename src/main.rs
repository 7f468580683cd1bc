use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use waste_tracker::{
  Config, Dataset, aggregate,
  dashboard::{self, Dashboard, TIPS, Tab},
};

/// Food waste dashboard for catered events
#[derive(Parser, Debug)]
#[command(name = "waste-tracker")]
#[command(about = "Analyze food wastage by food type, guest count and event type")]
struct Args {
  /// TOML configuration file
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// CSV file to load, overrides `data_path` from the config
  #[arg(short, long)]
  data: Option<PathBuf>,

  /// Verbose output (-v debug, -vv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,

  /// Only print errors
  #[arg(short, long)]
  quiet: bool,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Open the dashboard in a window (default)
  Show,

  /// Write every tab and chart as PNG, plus the filtered CSV
  Export {
    /// Output directory, created if missing
    #[arg(short, long)]
    out: PathBuf,

    /// Event type to filter by (defaults to the first one in the data)
    #[arg(short, long)]
    event_type: Option<String>,
  },

  /// Print the tables behind each tab
  Summary {
    /// Event type to filter by (defaults to the first one in the data)
    #[arg(short, long)]
    event_type: Option<String>,
  },
}

fn main() -> Result<()> {
  let args = Args::parse();
  init_logging(args.verbose, args.quiet);

  let mut config = match &args.config {
    Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
    None => Config::default(),
  };
  if let Some(data) = args.data {
    config.data_path = data;
  }

  let dataset = Dataset::load(&config.data_path)
    .with_context(|| format!("loading dataset {}", config.data_path.display()))?;
  let dashboard = Dashboard::new(&dataset)?.with_overview_rows(config.overview_rows);

  match args.command.unwrap_or(Command::Show) {
    Command::Show => waste_tracker::render::show(&dashboard, &config)?,
    Command::Export { out, event_type } => {
      export(&dashboard, &config, &out, event_type.as_deref())?
    }
    Command::Summary { event_type } => summary(&dashboard, &config, event_type.as_deref())?,
  }

  Ok(())
}

fn export(
  dashboard: &Dashboard,
  config: &Config,
  out: &Path,
  event_type: Option<&str>,
) -> Result<()> {
  std::fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;
  let (width, height) = (config.export.width, config.export.height);

  for tab in Tab::ALL {
    let state = dashboard.state(tab, event_type)?;
    let page = dashboard.page(&state)?;

    let path = out.join(format!("{}.png", tab.file_stem()));
    let png = dashboard::render_png(&page, width, height)
      .with_context(|| format!("rendering {}", tab.title()))?;
    std::fs::write(&path, png).with_context(|| format!("writing {}", path.display()))?;
    log::info!("wrote {}", path.display());

    for chart in page.charts() {
      let path = out.join(format!("{}.png", chart.kind.file_stem()));
      chart.plot()?.save(&path, width, height)?;
    }

    if tab == Tab::AdditionalInsights {
      dashboard.download(&state)?.save(out)?;
    }
  }

  Ok(())
}

fn summary(dashboard: &Dashboard, config: &Config, event_type: Option<&str>) -> Result<()> {
  let dataset = dashboard.dataset();
  let state = dashboard.state(Tab::AdditionalInsights, event_type)?;

  println!("{}", dashboard::TITLE);
  println!("{}\n", dashboard::DESCRIPTION);

  println!("== {} ==", Tab::Overview.title());
  println!("{}\n", aggregate::overview(dataset, config.overview_rows));

  println!("== {} ==", Tab::WastageAnalysis.title());
  let by_food = aggregate::wastage_by_food(dataset)?;
  println!("{by_food}");
  let total: f64 = dataset.records()?.iter().map(|r| r.wastage).sum();
  println!("total wastage: {total}\n");

  println!("== {} ==", Tab::AdditionalInsights.title());
  println!("{}", aggregate::mean_wastage_by_guests(dataset)?);
  println!("Showing data for {}:", state.event_type);
  println!("{}", aggregate::select_event_type(dataset, &state.event_type)?);
  println!("download: {}\n", aggregate::download_file_name(&state.event_type));

  println!("Tips to Reduce Food Waste:");
  for (i, tip) in TIPS.iter().enumerate() {
    println!("{}. {tip}", i + 1);
  }

  println!("\n{}", dashboard::CAPTION);
  Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
  use std::io::Write;

  use env_logger::Builder;
  use log::LevelFilter;

  let level = if quiet {
    LevelFilter::Error
  } else {
    match verbose {
      0 => LevelFilter::Info,
      1 => LevelFilter::Debug,
      _ => LevelFilter::Trace,
    }
  };

  Builder::new()
    .filter_level(level)
    .format(|buf, record| {
      writeln!(buf, "[{} {}] {}", record.level(), record.target(), record.args())
    })
    .init();
}
