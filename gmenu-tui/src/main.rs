mod config;
mod entry;
mod logging;
mod picker;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use gmenu_core::{CandidateList, MatchMode, Matcher, MenuOptions, VisibleSet, DEFAULT_DEBOUNCE};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use crate::config::Settings;
use crate::picker::PickerConfig;

#[derive(Parser, Debug)]
#[command(
    name = "gmenu",
    version,
    about = "Pick one line from stdin with a filterable list; the choice is printed to stdout"
)]
struct Cli {
    /// Shell-style glob matching against the whole line
    #[arg(short = 'g', long, conflicts_with = "regex")]
    glob: bool,
    /// Regular-expression matching
    #[arg(short = 'r', long)]
    regex: bool,
    /// Matching strategy by name: substring, glob or regex
    #[arg(short = 'm', long, value_name = "MODE", conflicts_with_all = ["glob", "regex"])]
    mode: Option<MatchMode>,
    /// Use case when matching
    #[arg(short = 'i', long)]
    case_sensitive: bool,
    /// Quiet period after typing before the list is refiltered
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,
    /// Do not bold the matched part of each row
    #[arg(long)]
    no_highlight: bool,
    /// Dialog title
    #[arg(short = 't', long)]
    title: Option<String>,
    /// Print every line visible for QUERY and exit without a UI
    #[arg(short = 'f', long, value_name = "QUERY")]
    filter: Option<String>,
    /// Settings file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    if let Some(path) = logging::init()? {
        tracing::debug!(log = %path.display(), "logging enabled");
    }

    let settings = match &cli.config {
        Some(path) => config::load_settings_from(path),
        None => config::load_settings(),
    };
    let cfg = resolve(&cli, &settings);

    let candidates = CandidateList::from_reader(io::stdin().lock())
        .context("reading candidates from stdin")?;

    if let Some(query) = &cli.filter {
        return filter(&candidates, &cfg.menu, query);
    }

    let outcome = picker::run_picker_default(candidates, &cfg)?;
    if let Some(text) = outcome.text() {
        let mut out = io::stdout().lock();
        writeln!(out, "{text}").context("writing selection")?;
        out.flush()?;
    }
    Ok(ExitCode::from(outcome.exit_code()))
}

/// Command-line flags win over the settings file, which wins over defaults.
fn resolve(cli: &Cli, settings: &Settings) -> PickerConfig {
    let matching = settings.matching.clone().unwrap_or_default();
    let tui = settings.tui.clone().unwrap_or_default();
    let defaults = PickerConfig::default();

    let mode = if cli.glob {
        MatchMode::Glob
    } else if cli.regex {
        MatchMode::Regex
    } else {
        cli.mode.or(matching.mode).unwrap_or_default()
    };
    let debounce = cli
        .debounce_ms
        .or(tui.debounce_ms)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_DEBOUNCE);

    PickerConfig {
        menu: MenuOptions {
            mode,
            case_sensitive: cli.case_sensitive || matching.case_sensitive.unwrap_or(false),
            debounce,
        },
        title: cli.title.clone().or(tui.title).unwrap_or(defaults.title),
        width: tui.width.unwrap_or(defaults.width),
        height: tui.height.unwrap_or(defaults.height),
        highlight: !cli.no_highlight && tui.highlight.unwrap_or(true),
        theme: theme::load_tui_theme(),
    }
}

fn filter(candidates: &CandidateList, options: &MenuOptions, query: &str) -> Result<ExitCode> {
    let matcher = Matcher::new(options.mode, options.case_sensitive, query);
    let visible = VisibleSet::compute(candidates, &matcher);
    tracing::info!(query, visible = visible.len(), "filter");
    let mut out = BufWriter::new(io::stdout().lock());
    for i in visible.indices() {
        writeln!(out, "{}", candidates[i].text())?;
    }
    out.flush()?;
    Ok(if visible.is_empty() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
