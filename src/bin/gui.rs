#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! eframe/egui desktop GUI entry point.

use chrono::Local;
use co2_emission_calculator::{
    chart::{self, BarChartSpec},
    config,
    emissions::{ConsumptionReading, Tariff, EMISSION_FACTORS},
    i18n::{self, keys},
    logging, report,
    session::Session,
};
use eframe::{egui, App, Frame};
use egui_plot::{Bar, BarChart, Plot, PlotPoint, Text};
use image::GenericImageView;
use rfd::FileDialog;
use std::{env, fs, path::Path};

const TEAL: egui::Color32 = egui::Color32::from_rgb(0x21, 0x80, 0x8D);
const WARNING: egui::Color32 = egui::Color32::from_rgb(0xA8, 0x4B, 0x2F);

fn main() -> Result<(), eframe::Error> {
    // --lang xx | --lang=xx | -L xx (auto/nl/en)
    let mut cli_lang: Option<String> = None;
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        let a = &args[i];
        if let Some(val) = a.strip_prefix("--lang=") {
            cli_lang = Some(val.to_string());
        } else if (a == "--lang" || a == "-L") && i + 1 < args.len() {
            cli_lang = Some(args[i + 1].clone());
            i += 1;
        }
        i += 1;
    }

    let mut app_cfg = config::load_or_default().unwrap_or_default();
    logging::init(&app_cfg.log_level);
    if let Some(lang_cli) = cli_lang {
        app_cfg.language = i18n::resolve_language(&lang_cli, Some(app_cfg.language.as_str()));
    }

    let title_lang = i18n::resolve_language("auto", Some(app_cfg.language.as_str()));
    let title = i18n::Translator::new_with_pack(&title_lang, app_cfg.language_pack_dir.as_deref())
        .t(keys::APP_TITLE);
    let mut viewport = egui::ViewportBuilder::default()
        .with_title(title)
        .with_inner_size([960.0, 820.0])
        .with_transparent(true);
    if let Some(icon) = load_app_icon() {
        viewport = viewport.with_icon(icon);
    }
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "co2_emission_calculator",
        options,
        Box::new(move |cc| {
            let mut app = GuiApp::new(app_cfg.clone());
            if let Some(path) = app.config.font_path.clone() {
                if let Err(e) = load_custom_font(&cc.egui_ctx, &app.tr, &path) {
                    tracing::warn!(%path, error = %e, "custom font not loaded");
                    app.font_load_error = Some(e);
                }
            }
            Box::new(app)
        }),
    )
}

fn load_app_icon() -> Option<egui::IconData> {
    let search = ["icon.png", "assets/icon.png", "../assets/icon.png"];
    let path = search.iter().find(|p| Path::new(*p).exists())?;
    let bytes = fs::read(path).ok()?;
    let img = image::load_from_memory(&bytes).ok()?;
    let rgba = img.to_rgba8();
    let (w, h) = img.dimensions();
    Some(egui::IconData {
        rgba: rgba.into_raw(),
        width: w,
        height: h,
    })
}

/// Registers font bytes as the first proportional and monospace family.
fn apply_font_bytes(ctx: &egui::Context, bytes: Vec<u8>, name: &str) {
    let mut fonts = egui::FontDefinitions::default();
    let font_name = name.to_string();
    fonts
        .font_data
        .insert(font_name.clone(), egui::FontData::from_owned(bytes));
    fonts
        .families
        .entry(egui::FontFamily::Proportional)
        .or_default()
        .insert(0, font_name.clone());
    fonts
        .families
        .entry(egui::FontFamily::Monospace)
        .or_default()
        .insert(0, font_name);
    ctx.set_fonts(fonts);
}

/// Loads a user-selected .ttf/.otf, e.g. for glyphs like "₂" that the
/// default font lacks.
fn load_custom_font(
    ctx: &egui::Context,
    tr: &i18n::Translator,
    path: &str,
) -> Result<(), String> {
    let p = Path::new(path);
    if !p.exists() {
        return Err(tr.tf(keys::SETTINGS_FONT_NOT_FOUND, &[("path", path.to_string())]));
    }
    let bytes = fs::read(p)
        .map_err(|e| tr.tf(keys::SETTINGS_FONT_READ_FAILED, &[("error", e.to_string())]))?;
    apply_font_bytes(ctx, bytes, "user_font");
    Ok(())
}

fn color32(c: [u8; 3]) -> egui::Color32 {
    egui::Color32::from_rgb(c[0], c[1], c[2])
}

/// Paints a chart description with egui_plot. Category names sit under the
/// bars, value labels on top, no legend.
fn chart_ui(ui: &mut egui::Ui, spec: &BarChartSpec) {
    ui.label(egui::RichText::new(&spec.title).strong().size(16.0));
    let max = spec.bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);
    let headroom = if max > 0.0 { max * 0.15 } else { 1.0 };
    let bars: Vec<Bar> = spec
        .bars
        .iter()
        .enumerate()
        .map(|(i, b)| {
            Bar::new(i as f64, b.value)
                .name(&b.label)
                .fill(color32(b.color))
                .width(0.6)
        })
        .collect();
    Plot::new("emissions_chart")
        .height(spec.height_px)
        .show_axes([false, true])
        .x_axis_label(spec.x_axis_title.clone())
        .y_axis_label(spec.y_axis_title.clone())
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_x(-0.5)
        .include_x(spec.bars.len() as f64 - 0.5)
        .include_y(-headroom * 0.5)
        .include_y(max + headroom)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
            for (i, b) in spec.bars.iter().enumerate() {
                plot_ui.text(
                    Text::new(PlotPoint::new(i as f64, b.value), b.text.clone())
                        .anchor(egui::Align2::CENTER_BOTTOM),
                );
                plot_ui.text(
                    Text::new(PlotPoint::new(i as f64, 0.0), b.label.clone())
                        .anchor(egui::Align2::CENTER_TOP),
                );
            }
        });
}

struct GuiApp {
    config: config::Config,
    tr: i18n::Translator,
    session: Session,
    // form
    gas_m3: f64,
    electricity_kwh: f64,
    tariff: Tariff,
    diesel_litre: f64,
    warning: Option<String>,
    export_status: Option<String>,
    // settings
    lang_input: String,
    window_alpha: f32,
    custom_font_path: String,
    font_load_error: Option<String>,
    settings_status: Option<String>,
    show_settings_modal: bool,
    show_help_modal: bool,
}

impl GuiApp {
    fn new(config: config::Config) -> Self {
        let lang_code = i18n::resolve_language("auto", Some(config.language.as_str()));
        let tr = i18n::Translator::new_with_pack(&lang_code, config.language_pack_dir.as_deref());
        Self {
            lang_input: config.language.clone(),
            window_alpha: config.window_alpha,
            custom_font_path: config.font_path.clone().unwrap_or_default(),
            config,
            tr,
            session: Session::new(),
            gas_m3: 0.0,
            electricity_kwh: 0.0,
            tariff: Tariff::Grey,
            diesel_litre: 0.0,
            warning: None,
            export_status: None,
            font_load_error: None,
            settings_status: None,
            show_settings_modal: false,
            show_help_modal: false,
        }
    }

    fn reading(&self) -> ConsumptionReading {
        ConsumptionReading {
            gas_m3: self.gas_m3,
            electricity_kwh: self.electricity_kwh,
            tariff: self.tariff,
            diesel_litre: self.diesel_litre,
        }
    }

    /// Calculate button handler.
    fn on_calculate(&mut self) {
        match self.session.calculate(self.reading()) {
            Ok(_) => {
                self.warning = None;
                self.export_status = None;
            }
            Err(err) => {
                self.warning = Some(self.tr.t(err.message_key()));
            }
        }
    }

    /// Download button handler: render the report and ask where to save it.
    fn on_download(&mut self) {
        let Some(calc) = self.session.latest() else {
            return;
        };
        let now = Local::now().naive_local();
        let bytes = match report::generate_pdf(calc, &self.tr, now) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, "report generation failed");
                self.export_status = Some(format!("{}: {e}", self.tr.t(keys::ERROR_PREFIX)));
                return;
            }
        };
        let Some(path) = FileDialog::new()
            .set_file_name(report::report_file_name(&self.tr, now))
            .set_directory(&self.config.report_dir)
            .add_filter("PDF", &["pdf"])
            .save_file()
        else {
            return;
        };
        self.export_status = Some(match report::save_report(&path, &bytes) {
            Ok(()) => self
                .tr
                .tf(keys::REPORT_SAVED, &[("path", path.display().to_string())]),
            Err(e) => format!("{}: {e}", self.tr.t(keys::ERROR_PREFIX)),
        });
    }

    fn ui_sidebar(&self, ui: &mut egui::Ui) {
        let tr = &self.tr;
        ui.heading(tr.t(keys::SIDEBAR_HEADING));
        ui.add_space(6.0);
        ui.label(tr.t(keys::SIDEBAR_BODY));
        ui.add_space(6.0);
        ui.strong(tr.t(keys::SIDEBAR_FACTORS));
        let unit = tr.t(keys::UNIT_KG_CO2E);
        for f in EMISSION_FACTORS.iter() {
            ui.label(format!(
                "- {}: {:.3} {unit}",
                tr.t(f.carrier.label_key()),
                f.kg_co2e_per_unit
            ));
        }
    }

    fn ui_form(&mut self, ui: &mut egui::Ui) {
        let tr = self.tr.clone();
        ui.heading(tr.t(keys::FORM_HEADING));
        ui.add_space(6.0);
        egui::Grid::new("consumption_form")
            .num_columns(2)
            .spacing([16.0, 8.0])
            .show(ui, |ui| {
                for (label, help, value, step) in [
                    (keys::FORM_GAS, keys::FORM_GAS_HELP, &mut self.gas_m3, 10.0),
                    (
                        keys::FORM_ELECTRICITY,
                        keys::FORM_ELECTRICITY_HELP,
                        &mut self.electricity_kwh,
                        50.0,
                    ),
                    (keys::FORM_DIESEL, keys::FORM_DIESEL_HELP, &mut self.diesel_litre, 10.0),
                ] {
                    ui.label(tr.t(label)).on_hover_text(tr.t(help));
                    ui.add(
                        egui::DragValue::new(value)
                            .speed(step)
                            .clamp_range(0.0..=f64::MAX)
                            .fixed_decimals(2),
                    )
                    .on_hover_text(tr.t(help));
                    ui.end_row();
                }
                ui.label(tr.t(keys::FORM_TARIFF))
                    .on_hover_text(tr.t(keys::FORM_TARIFF_HELP));
                egui::ComboBox::from_id_source("tariff_choice")
                    .selected_text(tr.t(self.tariff.label_key()))
                    .show_ui(ui, |ui| {
                        for t in Tariff::ALL {
                            ui.selectable_value(&mut self.tariff, t, tr.t(t.label_key()));
                        }
                    });
                ui.end_row();
            });
        ui.separator();
        let button = egui::Button::new(
            egui::RichText::new(tr.t(keys::FORM_CALCULATE)).color(egui::Color32::WHITE),
        )
        .fill(TEAL)
        .min_size(egui::vec2(ui.available_width(), 32.0));
        if ui.add(button).clicked() {
            self.on_calculate();
        }
        if let Some(msg) = &self.warning {
            ui.colored_label(WARNING, msg.as_str());
        }
    }

    fn ui_results(&self, ui: &mut egui::Ui) {
        let Some(calc) = self.session.latest() else {
            return;
        };
        let tr = &self.tr;
        ui.separator();
        ui.heading(tr.t(keys::RESULTS_HEADING));
        ui.label(tr.t(keys::RESULTS_TOTAL));
        ui.label(
            egui::RichText::new(format!("{:.2} {}", calc.total, tr.t(keys::UNIT_KG_CO2E)))
                .size(28.0)
                .strong(),
        );
        ui.add_space(8.0);
        ui.strong(tr.t(keys::RESULTS_PER_CATEGORY));
        egui::Grid::new("emissions_table")
            .num_columns(3)
            .striped(true)
            .spacing([24.0, 4.0])
            .show(ui, |ui| {
                ui.strong(tr.t(keys::RESULTS_COL_CATEGORY));
                ui.strong(tr.t(keys::RESULTS_COL_EMISSIONS));
                ui.strong(tr.t(keys::RESULTS_COL_PERCENTAGE));
                ui.end_row();
                for (category, kg) in calc.emissions.iter() {
                    ui.label(tr.t(category.label_key()));
                    ui.label(format!("{kg:.2}"));
                    ui.label(format!("{:.1}%", calc.emissions.share_percent(kg)));
                    ui.end_row();
                }
            });
        ui.add_space(8.0);
        if let Some(spec) = chart::build_bar_chart(&calc.emissions, tr) {
            chart_ui(ui, &spec);
        }
    }

    fn ui_download(&mut self, ui: &mut egui::Ui) {
        ui.separator();
        ui.heading(self.tr.t(keys::REPORT_DOWNLOAD_HEADING));
        let button = egui::Button::new(self.tr.t(keys::REPORT_DOWNLOAD_BUTTON))
            .min_size(egui::vec2(ui.available_width(), 32.0));
        if ui.add_enabled(self.session.can_download(), button).clicked() {
            self.on_download();
        }
        match &self.export_status {
            Some(msg) => {
                ui.label(msg.as_str());
            }
            None if self.session.can_download() => {
                ui.label(self.tr.t(keys::REPORT_READY));
            }
            None => {}
        }
    }

    fn ui_settings(&mut self, ctx: &egui::Context) {
        let tr = self.tr.clone();
        let mut open = self.show_settings_modal;
        egui::Window::new(tr.t(keys::SETTINGS_HEADING))
            .collapsible(false)
            .resizable(true)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(tr.t(keys::SETTINGS_LANGUAGE));
                egui::ComboBox::from_id_source("lang_choice")
                    .selected_text(self.lang_input.as_str())
                    .show_ui(ui, |ui| {
                        ui.selectable_value(
                            &mut self.lang_input,
                            "auto".into(),
                            tr.t(keys::SETTINGS_LANGUAGE_AUTO),
                        );
                        ui.selectable_value(&mut self.lang_input, "nl-nl".into(), "Nederlands");
                        ui.selectable_value(&mut self.lang_input, "en-us".into(), "English");
                    });
                ui.separator();
                ui.label(tr.t(keys::SETTINGS_WINDOW_ALPHA));
                ui.add(egui::Slider::new(&mut self.window_alpha, 0.3..=1.0));
                ui.separator();
                ui.label(tr.t(keys::SETTINGS_REPORT_DIR));
                ui.horizontal(|ui| {
                    ui.label(self.config.report_dir.display().to_string());
                    if ui.button("…").clicked() {
                        if let Some(dir) = FileDialog::new()
                            .set_directory(&self.config.report_dir)
                            .pick_folder()
                        {
                            self.config.report_dir = dir;
                        }
                    }
                });
                ui.separator();
                ui.label(tr.t(keys::SETTINGS_FONT));
                ui.horizontal(|ui| {
                    ui.text_edit_singleline(&mut self.custom_font_path);
                    if ui.button("…").clicked() {
                        if let Some(p) = FileDialog::new()
                            .add_filter(tr.t(keys::SETTINGS_FONT_FILTER), &["ttf", "otf", "ttc"])
                            .pick_file()
                        {
                            self.custom_font_path = p.display().to_string();
                        }
                    }
                    if ui.button(tr.t(keys::SETTINGS_APPLY)).clicked() {
                        self.font_load_error =
                            load_custom_font(ctx, &tr, &self.custom_font_path).err();
                    }
                });
                if let Some(err) = &self.font_load_error {
                    ui.colored_label(WARNING, err.as_str());
                }
                ui.separator();
                if ui.button(tr.t(keys::SETTINGS_SAVE)).clicked() {
                    self.config.language = self.lang_input.clone();
                    self.config.window_alpha = self.window_alpha;
                    self.config.font_path = Some(self.custom_font_path.clone())
                        .filter(|p| !p.trim().is_empty() && self.font_load_error.is_none());
                    let resolved = i18n::resolve_language(&self.config.language, None);
                    self.tr = i18n::Translator::new_with_pack(
                        &resolved,
                        self.config.language_pack_dir.as_deref(),
                    );
                    self.settings_status = Some(match self.config.save() {
                        Ok(()) => self.tr.t(keys::SETTINGS_SAVED),
                        Err(e) => format!("{}: {e}", self.tr.t(keys::ERROR_PREFIX)),
                    });
                }
                if let Some(msg) = &self.settings_status {
                    ui.label(msg.as_str());
                }
            });
        self.show_settings_modal = open;
    }
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let mut style = (*ctx.style()).clone();
        style.interaction.selectable_labels = false;
        style.visuals.window_fill = style.visuals.window_fill.linear_multiply(self.window_alpha);
        style.visuals.panel_fill = style.visuals.panel_fill.linear_multiply(self.window_alpha);
        ctx.set_style(style);

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(self.tr.t(keys::APP_TITLE));
                ui.separator();
                if ui.button(self.tr.t(keys::SETTINGS_HEADING)).clicked() {
                    self.show_settings_modal = true;
                }
                if ui.button("?").clicked() {
                    self.show_help_modal = true;
                }
            });
            ui.label(egui::RichText::new(self.tr.t(keys::APP_SUBTITLE)).strong());
        });

        if self.show_settings_modal {
            self.ui_settings(ctx);
        }

        if self.show_help_modal {
            let body = self.tr.t(keys::SIDEBAR_BODY);
            egui::Window::new(self.tr.t(keys::APP_TITLE))
                .collapsible(false)
                .open(&mut self.show_help_modal)
                .show(ctx, |ui| {
                    ui.label(body);
                    ui.label(format!("v{}", env!("CARGO_PKG_VERSION")));
                });
        }

        egui::SidePanel::left("info")
            .resizable(true)
            .min_width(180.0)
            .default_width(260.0)
            .show(ctx, |ui| self.ui_sidebar(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    self.ui_form(ui);
                    self.ui_results(ui);
                    self.ui_download(ui);
                });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> GuiApp {
        let cfg = config::Config {
            language: "en-us".into(),
            ..config::Config::default()
        };
        GuiApp::new(cfg)
    }

    #[test]
    fn download_disabled_until_first_calculation() {
        let mut app = app();
        assert!(!app.session.can_download());
        app.on_calculate();
        assert!(!app.session.can_download());
        assert_eq!(
            app.warning.as_deref(),
            Some("⚠️ Enter at least one consumption value to calculate.")
        );
    }

    #[test]
    fn calculate_stores_result_and_clears_warning() {
        let mut app = app();
        app.on_calculate();
        app.gas_m3 = 100.0;
        app.electricity_kwh = 300.0;
        app.on_calculate();
        assert!(app.warning.is_none());
        let calc = app.session.latest().unwrap();
        assert!((calc.total - 369.3).abs() < 1e-9);
        assert!(app.session.can_download());
    }

    #[test]
    fn oversized_input_shows_range_warning() {
        let mut app = app();
        app.gas_m3 = 1e308;
        app.electricity_kwh = 1e308;
        app.on_calculate();
        assert!(!app.session.can_download());
        assert_eq!(
            app.warning.as_deref(),
            Some("⚠️ The consumption values are too large to calculate.")
        );
    }

    #[test]
    fn font_errors_are_translated() {
        let ctx = egui::Context::default();
        let tr = i18n::Translator::new("nl-nl");
        let err = load_custom_font(&ctx, &tr, "does/not/exist.ttf").unwrap_err();
        assert_eq!(err, "Lettertypebestand niet gevonden: does/not/exist.ttf");
    }

    #[test]
    fn switching_to_green_only_changes_electricity() {
        let mut app = app();
        app.gas_m3 = 100.0;
        app.electricity_kwh = 300.0;
        app.on_calculate();
        let grey = app.session.latest().unwrap().emissions.clone();
        app.tariff = Tariff::Green;
        app.on_calculate();
        let green = &app.session.latest().unwrap().emissions;
        use co2_emission_calculator::emissions::Category;
        assert_eq!(grey.get(Category::Gas), green.get(Category::Gas));
        assert_eq!(green.get(Category::Electricity), Some(0.0));
    }
}
