use std::process::ExitCode;

use clap::Parser;
use co2_emission_calculator::app::{self, AppContext, AppError, Cli};
use co2_emission_calculator::i18n::keys;
use co2_emission_calculator::{config, logging};

/// Terminal entry point: load settings, then run a subcommand or the menu.
fn main() -> ExitCode {
    let cli = Cli::parse();
    let cfg = match config::load_or_create(&cli.config) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(&cfg.log_level);

    let mut ctx = AppContext::new(cfg, cli.config.clone(), &cli.lang);
    match app::run(cli.command.as_ref(), &mut ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::Calculation(err)) => {
            eprintln!("{}", ctx.tr.t(err.message_key()));
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("{}: {err}", ctx.tr.t(keys::ERROR_PREFIX));
            ExitCode::FAILURE
        }
    }
}
