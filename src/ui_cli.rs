use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use chrono::Local;

use crate::app::{AppContext, AppError, CalculateArgs};
use crate::chart;
use crate::emissions::{ConsumptionReading, Tariff, EMISSION_FACTORS};
use crate::i18n::{keys, Translator};
use crate::report;
use crate::session::Calculation;

/// Main menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Calculate,
    Factors,
    Export,
    Settings,
    Exit,
}

/// Shows the main menu and returns the selection. End of input exits.
pub fn main_menu(tr: &Translator, input: &mut impl BufRead) -> Result<MenuChoice, AppError> {
    println!("{}", tr.t(keys::MAIN_MENU_TITLE));
    for key in [
        keys::MAIN_MENU_CALCULATE,
        keys::MAIN_MENU_FACTORS,
        keys::MAIN_MENU_EXPORT,
        keys::MAIN_MENU_SETTINGS,
        keys::MAIN_MENU_EXIT,
    ] {
        println!("{}", tr.t(key));
    }
    loop {
        let Some(sel) = read_line(input, &tr.t(keys::PROMPT_SELECT))? else {
            return Ok(MenuChoice::Exit);
        };
        match sel.trim() {
            "1" => return Ok(MenuChoice::Calculate),
            "2" => return Ok(MenuChoice::Factors),
            "3" => return Ok(MenuChoice::Export),
            "4" => return Ok(MenuChoice::Settings),
            "0" => return Ok(MenuChoice::Exit),
            _ => println!("{}", tr.t(keys::INVALID_SELECTION_RETRY)),
        }
    }
}

/// Parses a consumption figure: finite and not below zero.
pub fn parse_non_negative(s: &str) -> Result<f64, String> {
    let v: f64 = s
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| format!("not a number: {s}"))?;
    if !v.is_finite() {
        return Err(format!("not a finite number: {s}"));
    }
    if v < 0.0 {
        return Err(format!("must be 0 or greater: {s}"));
    }
    // -0.0 would otherwise print as "-0.00"
    Ok(v.abs())
}

/// Asks for the three quantities and the tariff, then calculates.
/// End of input abandons the form without calculating.
pub fn handle_calculate(ctx: &mut AppContext, input: &mut impl BufRead) -> Result<(), AppError> {
    println!("\n-- {} --", ctx.tr.t(keys::FORM_HEADING));
    let Some(gas_m3) = read_quantity(&ctx.tr, input, keys::FORM_GAS)? else {
        return Ok(());
    };
    let Some(electricity_kwh) = read_quantity(&ctx.tr, input, keys::FORM_ELECTRICITY)? else {
        return Ok(());
    };
    let Some(tariff) = read_tariff(&ctx.tr, input)? else {
        return Ok(());
    };
    let Some(diesel_litre) = read_quantity(&ctx.tr, input, keys::FORM_DIESEL)? else {
        return Ok(());
    };
    let reading = ConsumptionReading {
        gas_m3,
        electricity_kwh,
        tariff,
        diesel_litre,
    };
    match ctx.session.calculate(reading) {
        Ok(calc) => print_results(&ctx.tr, calc),
        Err(err) => println!("{}", ctx.tr.t(err.message_key())),
    }
    Ok(())
}

/// `calculate` subcommand: one calculation, optional report file.
pub fn calculate_once(ctx: &mut AppContext, args: &CalculateArgs) -> Result<(), AppError> {
    let calc = ctx.session.calculate(args.reading())?.clone();
    print_results(&ctx.tr, &calc);
    let target = match (&args.pdf, args.export) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(default_report_path(ctx)),
        (None, false) => None,
    };
    if let Some(path) = target {
        export(&ctx.tr, &calc, &path)?;
    }
    Ok(())
}

/// Writes the report of the last calculation to a path the user confirms.
pub fn handle_export(ctx: &mut AppContext, input: &mut impl BufRead) -> Result<(), AppError> {
    let Some(calc) = ctx.session.latest().cloned() else {
        println!("{}", ctx.tr.t(keys::REPORT_NO_CALCULATION));
        return Ok(());
    };
    let default = default_report_path(ctx);
    let Some(answer) = read_line(
        input,
        &ctx.tr.tf(
            keys::REPORT_PROMPT_PATH,
            &[("default", default.display().to_string())],
        ),
    )?
    else {
        return Ok(());
    };
    let path = match answer.trim() {
        "" => default,
        other => PathBuf::from(other),
    };
    export(&ctx.tr, &calc, &path)
}

fn default_report_path(ctx: &AppContext) -> PathBuf {
    let now = Local::now().naive_local();
    ctx.config
        .report_dir
        .join(report::report_file_name(&ctx.tr, now))
}

fn export(tr: &Translator, calc: &Calculation, path: &std::path::Path) -> Result<(), AppError> {
    let bytes = report::generate_pdf(calc, tr, Local::now().naive_local())?;
    report::save_report(path, &bytes)?;
    println!(
        "{}",
        tr.tf(keys::REPORT_SAVED, &[("path", path.display().to_string())])
    );
    Ok(())
}

/// Prints total, per-category table and a text bar chart.
pub fn print_results(tr: &Translator, calc: &Calculation) {
    println!("\n{}", tr.t(keys::RESULTS_HEADING));
    println!(
        "{}: {:.2} {}",
        tr.t(keys::RESULTS_TOTAL),
        calc.total,
        tr.t(keys::UNIT_KG_CO2E)
    );
    println!("\n{}", tr.t(keys::RESULTS_PER_CATEGORY));
    println!(
        "{:<16} {:>20} {:>12}",
        tr.t(keys::RESULTS_COL_CATEGORY),
        tr.t(keys::RESULTS_COL_EMISSIONS),
        tr.t(keys::RESULTS_COL_PERCENTAGE)
    );
    for (category, kg) in calc.emissions.iter() {
        println!(
            "{:<16} {:>20.2} {:>11.1}%",
            tr.t(category.label_key()),
            kg,
            calc.emissions.share_percent(kg)
        );
    }
    if let Some(spec) = chart::build_bar_chart(&calc.emissions, tr) {
        println!("\n{}", spec.render_text(40));
    }
}

/// Prints the reference factor table, petrol included.
pub fn print_factors(tr: &Translator) {
    println!("\n-- {} --", tr.t(keys::REPORT_FACTORS_HEADING));
    println!("{}", tr.t(keys::REPORT_FACTORS_SOURCE));
    let unit = tr.t(keys::UNIT_KG_CO2E);
    for f in EMISSION_FACTORS.iter() {
        println!(
            "{:<40} {:>8.3} {unit}",
            tr.t(f.carrier.label_key()),
            f.kg_co2e_per_unit
        );
    }
}

/// Language setting.
pub fn handle_settings(ctx: &mut AppContext, input: &mut impl BufRead) -> Result<(), AppError> {
    println!("\n-- {} --", ctx.tr.t(keys::SETTINGS_HEADING));
    println!("{}: {}", ctx.tr.t(keys::SETTINGS_LANGUAGE), ctx.config.language);
    println!("{}", ctx.tr.t(keys::SETTINGS_LANGUAGE_OPTIONS));
    let Some(sel) = read_line(input, &ctx.tr.t(keys::PROMPT_SELECT))? else {
        return Ok(());
    };
    let language = match sel.trim() {
        "" => return Ok(()),
        "1" => "auto",
        "2" => "nl-nl",
        "3" => "en-us",
        _ => {
            println!("{}", ctx.tr.t(keys::SETTINGS_INVALID));
            return Ok(());
        }
    };
    ctx.config.language = language.to_string();
    ctx.reload_language();
    tracing::info!(language, "language changed");
    println!("{}", ctx.tr.t(keys::SETTINGS_SAVED));
    Ok(())
}

/// Prompts and reads one line. `None` means end of input.
fn read_line(input: &mut impl BufRead, prompt: &str) -> Result<Option<String>, AppError> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf))
}

/// Reads a quantity; empty input means 0, negative input is asked again.
fn read_quantity(
    tr: &Translator,
    input: &mut impl BufRead,
    label_key: &str,
) -> Result<Option<f64>, AppError> {
    loop {
        let Some(s) = read_line(input, &format!("{}: ", tr.t(label_key)))? else {
            return Ok(None);
        };
        if s.trim().is_empty() {
            return Ok(Some(0.0));
        }
        match parse_non_negative(&s) {
            Ok(v) => return Ok(Some(v)),
            Err(_) if s.trim().starts_with('-') => println!("{}", tr.t(keys::ERROR_NEGATIVE_NUMBER)),
            Err(_) => println!("{}", tr.t(keys::ERROR_INVALID_NUMBER)),
        }
    }
}

fn read_tariff(tr: &Translator, input: &mut impl BufRead) -> Result<Option<Tariff>, AppError> {
    println!("{}", tr.t(keys::FORM_TARIFF_OPTIONS));
    let Some(sel) = read_line(input, &format!("{}: ", tr.t(keys::FORM_TARIFF)))? else {
        return Ok(None);
    };
    Ok(Some(match sel.trim() {
        "2" => Tariff::Green,
        _ => Tariff::Grey,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::io::Cursor;

    fn ctx() -> AppContext {
        let cfg = Config {
            language: "en-us".into(),
            ..Config::default()
        };
        AppContext::new(cfg, PathBuf::from("config.toml"), "en")
    }

    #[test]
    fn closed_input_exits_menu() {
        let tr = Translator::new("en-us");
        let choice = main_menu(&tr, &mut Cursor::new(Vec::new())).unwrap();
        assert_eq!(choice, MenuChoice::Exit);
    }

    #[test]
    fn menu_retries_until_valid_selection() {
        let tr = Translator::new("en-us");
        let mut input = Cursor::new("x\n\n2\n");
        assert_eq!(main_menu(&tr, &mut input).unwrap(), MenuChoice::Factors);
    }

    #[test]
    fn calculate_form_reads_all_fields() {
        let mut ctx = ctx();
        let mut input = Cursor::new("100\n300\n1\n\n");
        handle_calculate(&mut ctx, &mut input).unwrap();
        let calc = ctx.session.latest().unwrap();
        assert_eq!(calc.tariff(), Tariff::Grey);
        assert!((calc.total - 369.3).abs() < 1e-9);
    }

    #[test]
    fn calculate_form_abandoned_at_end_of_input() {
        let mut ctx = ctx();
        let mut input = Cursor::new("100\n");
        handle_calculate(&mut ctx, &mut input).unwrap();
        assert!(ctx.session.latest().is_none());
    }

    #[test]
    fn settings_unchanged_at_end_of_input() {
        let mut ctx = ctx();
        handle_settings(&mut ctx, &mut Cursor::new(Vec::new())).unwrap();
        assert_eq!(ctx.config.language, "en-us");
        handle_settings(&mut ctx, &mut Cursor::new("2\n")).unwrap();
        assert_eq!(ctx.config.language, "nl-nl");
        assert_eq!(ctx.tr.language(), crate::i18n::Language::Nl);
    }

    #[test]
    fn accepts_decimal_comma_and_zero() {
        assert_eq!(parse_non_negative("12,5"), Ok(12.5));
        assert_eq!(parse_non_negative(" 0 "), Ok(0.0));
        assert_eq!(parse_non_negative("-0"), Ok(0.0));
    }

    #[test]
    fn rejects_negative_and_non_finite() {
        assert!(parse_non_negative("-1").is_err());
        assert!(parse_non_negative("inf").is_err());
        assert!(parse_non_negative("NaN").is_err());
        assert!(parse_non_negative("abc").is_err());
    }
}
