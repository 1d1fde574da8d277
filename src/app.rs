use std::io;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{self, Config, ConfigError};
use crate::emissions::{ConsumptionReading, Tariff};
use crate::i18n::{self, Translator};
use crate::report::ReportError;
use crate::session::{CalculationError, Session};
use crate::ui_cli::{self, MenuChoice};

/// Errors surfaced by the terminal application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("report error: {0}")]
    Report(#[from] ReportError),
    #[error(transparent)]
    Calculation(#[from] CalculationError),
}

/// CO₂ emissions calculator (Dutch emission factors 2024).
#[derive(Debug, Parser)]
#[command(name = "co2_emission_calculator_cli", version, about)]
pub struct Cli {
    /// Language: auto, nl, en
    #[arg(short = 'L', long, default_value = "auto", global = true)]
    pub lang: String,
    /// Config file
    #[arg(long, global = true, default_value = config::CONFIG_FILE)]
    pub config: PathBuf,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calculate emissions and optionally write the PDF report
    Calculate(CalculateArgs),
    /// Print the emission factor table
    Factors,
}

#[derive(Debug, Args)]
pub struct CalculateArgs {
    /// Natural gas [m³]
    #[arg(long, default_value_t = 0.0, value_parser = ui_cli::parse_non_negative)]
    pub gas: f64,
    /// Electricity [kWh]
    #[arg(long, default_value_t = 0.0, value_parser = ui_cli::parse_non_negative)]
    pub electricity: f64,
    #[arg(long, value_enum, default_value_t = Tariff::Grey)]
    pub tariff: Tariff,
    /// Diesel [litre]
    #[arg(long, default_value_t = 0.0, value_parser = ui_cli::parse_non_negative)]
    pub diesel: f64,
    /// Write the report to this file
    #[arg(long, conflicts_with = "export")]
    pub pdf: Option<PathBuf>,
    /// Write the report to the configured report directory
    #[arg(long)]
    pub export: bool,
}

impl CalculateArgs {
    pub fn reading(&self) -> ConsumptionReading {
        ConsumptionReading {
            gas_m3: self.gas,
            electricity_kwh: self.electricity,
            tariff: self.tariff,
            diesel_litre: self.diesel,
        }
    }
}

/// Everything one terminal session works with.
pub struct AppContext {
    pub config: Config,
    pub config_path: PathBuf,
    pub tr: Translator,
    pub session: Session,
}

impl AppContext {
    pub fn new(config: Config, config_path: PathBuf, cli_lang: &str) -> Self {
        let lang = i18n::resolve_language(cli_lang, Some(config.language.as_str()));
        let tr = Translator::new_with_pack(&lang, config.language_pack_dir.as_deref());
        Self {
            config,
            config_path,
            tr,
            session: Session::new(),
        }
    }

    /// Re-resolves the translator after the language setting changed.
    pub fn reload_language(&mut self) {
        let lang = i18n::resolve_language(&self.config.language, None);
        self.tr = Translator::new_with_pack(&lang, self.config.language_pack_dir.as_deref());
    }

    pub fn save_config(&self) -> Result<(), ConfigError> {
        self.config.save_to(&self.config_path)
    }
}

/// Runs a subcommand, or the interactive menu when none was given.
pub fn run(command: Option<&Command>, ctx: &mut AppContext) -> Result<(), AppError> {
    match command {
        Some(Command::Calculate(args)) => ui_cli::calculate_once(ctx, args),
        Some(Command::Factors) => {
            ui_cli::print_factors(&ctx.tr);
            Ok(())
        }
        None => run_menu(ctx),
    }
}

fn run_menu(ctx: &mut AppContext) -> Result<(), AppError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        match ui_cli::main_menu(&ctx.tr, &mut input)? {
            MenuChoice::Calculate => ui_cli::handle_calculate(ctx, &mut input)?,
            MenuChoice::Factors => ui_cli::print_factors(&ctx.tr),
            MenuChoice::Export => ui_cli::handle_export(ctx, &mut input)?,
            MenuChoice::Settings => {
                ui_cli::handle_settings(ctx, &mut input)?;
                ctx.save_config()?;
            }
            MenuChoice::Exit => {
                println!("{}", ctx.tr.t(i18n::keys::APP_EXIT));
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        let argv = std::iter::once("co2_emission_calculator_cli").chain(args.iter().copied());
        Cli::try_parse_from(argv)
    }

    fn calculate_args(cli: &Cli) -> &CalculateArgs {
        match &cli.command {
            Some(Command::Calculate(args)) => args,
            other => panic!("expected calculate, got {other:?}"),
        }
    }

    fn ctx(report_dir: &std::path::Path) -> AppContext {
        let cfg = Config {
            language: "en-us".into(),
            report_dir: report_dir.to_path_buf(),
            ..Config::default()
        };
        AppContext::new(cfg, report_dir.join("config.toml"), "auto")
    }

    #[test]
    fn calculate_parses_quantities_and_green_tariff() {
        let cli = parse(&[
            "-L",
            "nl",
            "calculate",
            "--gas",
            "100",
            "--electricity",
            "300,5",
            "--tariff",
            "green",
        ])
        .unwrap();
        assert_eq!(cli.lang, "nl");
        let args = calculate_args(&cli);
        let reading = args.reading();
        assert_eq!(reading.gas_m3, 100.0);
        assert_eq!(reading.electricity_kwh, 300.5);
        assert_eq!(reading.diesel_litre, 0.0);
        assert_eq!(reading.tariff, Tariff::Green);
        assert!(args.pdf.is_none() && !args.export);
    }

    #[test]
    fn calculate_rejects_negative_and_unknown_tariff() {
        let err = parse(&["calculate", "--gas=-1"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        let err = parse(&["calculate", "--tariff", "blue"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn pdf_and_export_conflict() {
        let err = parse(&["calculate", "--gas", "1", "--pdf", "out.pdf", "--export"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn calculate_with_export_writes_report_into_report_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ctx(dir.path());
        let cli =
            parse(&["calculate", "--gas", "100", "--electricity", "300", "--export"]).unwrap();
        run(cli.command.as_ref(), &mut ctx).unwrap();

        let calc = ctx.session.latest().unwrap();
        assert!((calc.total - 369.3).abs() < 1e-9);
        let reports: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("CO2_report_") && name.ends_with(".pdf"))
            .collect();
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn calculate_with_pdf_path_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out").join("report.pdf");
        let mut ctx = ctx(dir.path());
        let pdf = target.to_string_lossy().into_owned();
        let cli = parse(&["calculate", "--diesel", "10", "--pdf", &pdf]).unwrap();
        run(cli.command.as_ref(), &mut ctx).unwrap();
        assert!(std::fs::read(&target).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn all_zero_calculate_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ctx(dir.path());
        let cli = parse(&["calculate", "--export"]).unwrap();
        let err = run(cli.command.as_ref(), &mut ctx).unwrap_err();
        assert!(matches!(
            err,
            AppError::Calculation(CalculationError::NothingEntered)
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
