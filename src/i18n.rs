use std::collections::HashMap;
use std::fs;
use std::path::Path;
use sys_locale::get_locale;

/// String keys, grouped by screen.
pub mod keys {
    pub const ERROR_PREFIX: &str = "general.error_prefix";
    pub const APP_TITLE: &str = "general.app_title";
    pub const APP_SUBTITLE: &str = "general.app_subtitle";
    pub const APP_EXIT: &str = "general.app_exit";
    pub const WARNING_NOTHING_ENTERED: &str = "general.warning_nothing_entered";
    pub const WARNING_OUT_OF_RANGE: &str = "general.warning_out_of_range";
    pub const ERROR_INVALID_NUMBER: &str = "general.invalid_number";
    pub const ERROR_NEGATIVE_NUMBER: &str = "general.negative_number";
    pub const INVALID_SELECTION_RETRY: &str = "general.invalid_selection_retry";
    pub const PROMPT_SELECT: &str = "general.prompt_select";

    pub const MAIN_MENU_TITLE: &str = "main_menu.title";
    pub const MAIN_MENU_CALCULATE: &str = "main_menu.calculate";
    pub const MAIN_MENU_FACTORS: &str = "main_menu.factors";
    pub const MAIN_MENU_EXPORT: &str = "main_menu.export";
    pub const MAIN_MENU_SETTINGS: &str = "main_menu.settings";
    pub const MAIN_MENU_EXIT: &str = "main_menu.exit";

    pub const FORM_HEADING: &str = "form.heading";
    pub const FORM_GAS: &str = "form.gas";
    pub const FORM_GAS_HELP: &str = "form.gas_help";
    pub const FORM_ELECTRICITY: &str = "form.electricity";
    pub const FORM_ELECTRICITY_HELP: &str = "form.electricity_help";
    pub const FORM_TARIFF: &str = "form.tariff";
    pub const FORM_TARIFF_HELP: &str = "form.tariff_help";
    pub const FORM_TARIFF_OPTIONS: &str = "form.tariff_options";
    pub const FORM_DIESEL: &str = "form.diesel";
    pub const FORM_DIESEL_HELP: &str = "form.diesel_help";
    pub const FORM_CALCULATE: &str = "form.calculate";

    pub const TARIFF_GREY: &str = "tariff.grey";
    pub const TARIFF_GREEN: &str = "tariff.green";

    pub const CATEGORY_GAS: &str = "category.gas";
    pub const CATEGORY_ELECTRICITY: &str = "category.electricity";
    pub const CATEGORY_DIESEL: &str = "category.diesel";

    pub const CARRIER_NATURAL_GAS: &str = "carrier.natural_gas";
    pub const CARRIER_GREY_ELECTRICITY: &str = "carrier.grey_electricity";
    pub const CARRIER_GREEN_ELECTRICITY: &str = "carrier.green_electricity";
    pub const CARRIER_DIESEL: &str = "carrier.diesel";
    pub const CARRIER_PETROL: &str = "carrier.petrol";

    pub const UNIT_M3: &str = "unit.m3";
    pub const UNIT_KWH: &str = "unit.kwh";
    pub const UNIT_LITRE: &str = "unit.litre";
    pub const UNIT_KG_CO2E: &str = "unit.kg_co2e";

    pub const RESULTS_HEADING: &str = "results.heading";
    pub const RESULTS_TOTAL: &str = "results.total";
    pub const RESULTS_PER_CATEGORY: &str = "results.per_category";
    pub const RESULTS_COL_CATEGORY: &str = "results.col_category";
    pub const RESULTS_COL_EMISSIONS: &str = "results.col_emissions";
    pub const RESULTS_COL_PERCENTAGE: &str = "results.col_percentage";

    pub const CHART_TITLE: &str = "chart.title";
    pub const CHART_X_AXIS: &str = "chart.x_axis";
    pub const CHART_Y_AXIS: &str = "chart.y_axis";

    pub const REPORT_TITLE: &str = "report.title";
    pub const REPORT_GENERATED_ON: &str = "report.generated_on";
    pub const REPORT_CONSUMPTION_HEADING: &str = "report.consumption_heading";
    pub const REPORT_COL_CARRIER: &str = "report.col_carrier";
    pub const REPORT_COL_CONSUMPTION: &str = "report.col_consumption";
    pub const REPORT_COL_UNIT: &str = "report.col_unit";
    pub const REPORT_TARIFF_ROW: &str = "report.tariff_row";
    pub const REPORT_EMISSIONS_HEADING: &str = "report.emissions_heading";
    pub const REPORT_COL_EMISSIONS: &str = "report.col_emissions";
    pub const REPORT_TOTAL_ROW: &str = "report.total_row";
    pub const REPORT_FACTORS_HEADING: &str = "report.factors_heading";
    pub const REPORT_FACTORS_SOURCE: &str = "report.factors_source";
    pub const REPORT_COL_FACTOR: &str = "report.col_factor";
    pub const REPORT_FILE_PREFIX: &str = "report.file_prefix";
    pub const REPORT_DOWNLOAD_HEADING: &str = "report.download_heading";
    pub const REPORT_DOWNLOAD_BUTTON: &str = "report.download_button";
    pub const REPORT_SAVED: &str = "report.saved";
    pub const REPORT_READY: &str = "report.ready";
    pub const REPORT_NO_CALCULATION: &str = "report.no_calculation";
    pub const REPORT_PROMPT_PATH: &str = "report.prompt_path";

    pub const SIDEBAR_HEADING: &str = "sidebar.heading";
    pub const SIDEBAR_BODY: &str = "sidebar.body";
    pub const SIDEBAR_FACTORS: &str = "sidebar.factors";

    pub const SETTINGS_HEADING: &str = "settings.heading";
    pub const SETTINGS_LANGUAGE: &str = "settings.language";
    pub const SETTINGS_LANGUAGE_AUTO: &str = "settings.language_auto";
    pub const SETTINGS_LANGUAGE_OPTIONS: &str = "settings.language_options";
    pub const SETTINGS_REPORT_DIR: &str = "settings.report_dir";
    pub const SETTINGS_WINDOW_ALPHA: &str = "settings.window_alpha";
    pub const SETTINGS_FONT: &str = "settings.font";
    pub const SETTINGS_FONT_FILTER: &str = "settings.font_filter";
    pub const SETTINGS_FONT_NOT_FOUND: &str = "settings.font_not_found";
    pub const SETTINGS_FONT_READ_FAILED: &str = "settings.font_read_failed";
    pub const SETTINGS_APPLY: &str = "settings.apply";
    pub const SETTINGS_SAVE: &str = "settings.save";
    pub const SETTINGS_SAVED: &str = "settings.saved";
    pub const SETTINGS_INVALID: &str = "settings.invalid";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Nl,
    En,
}

impl Language {
    fn from_code(code: &str) -> Self {
        if code.to_lowercase().starts_with("nl") {
            Language::Nl
        } else {
            Language::En
        }
    }
}

/// Runtime language bundle.
#[derive(Debug, Clone)]
pub struct Translator {
    lang: Language,
    pack: HashMap<String, String>,
}

impl Translator {
    /// Builds a translator from the embedded pack of `lang_code` (nl/en).
    /// Unknown codes fall back to English.
    pub fn new(lang_code: &str) -> Self {
        Self::new_with_pack(lang_code, None)
    }

    /// Like [`Translator::new`], but a `<code>.toml` found in `pack_dir`
    /// (or `locales/`) takes precedence over the embedded strings.
    pub fn new_with_pack(lang_code: &str, pack_dir: Option<&str>) -> Self {
        let lang = Language::from_code(lang_code);
        let mut pack = built_in_pack(lang).unwrap_or_default();
        let overrides = pack_dir
            .and_then(|dir| load_overrides(dir, lang_code))
            .or_else(|| load_overrides("locales", lang_code));
        if let Some(overrides) = overrides {
            pack.extend(overrides);
        }
        Self { lang, pack }
    }

    pub fn language(&self) -> Language {
        self.lang
    }

    /// Translates a key. Missing keys fall back to English, then to the key.
    pub fn t(&self, key: &str) -> String {
        if let Some(v) = self.pack.get(key) {
            return v.clone();
        }
        built_in_pack(Language::En)
            .and_then(|mut en| en.remove(key))
            .unwrap_or_else(|| key.to_string())
    }

    /// Translates a key and substitutes `{name}` placeholders.
    pub fn tf(&self, key: &str, vars: &[(&str, String)]) -> String {
        fill_template(&self.t(key), vars)
    }
}

pub fn fill_template(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (k, v) in vars {
        out = out.replace(&format!("{{{k}}}"), v);
    }
    out
}

/// Picks the language from the CLI flag, then config, then the system locale.
pub fn resolve_language(cli_arg: &str, config_lang: Option<&str>) -> String {
    normalize_lang(cli_arg)
        .or_else(|| config_lang.and_then(normalize_lang))
        .or_else(detect_system_language)
        .unwrap_or_else(|| "en-us".to_string())
}

fn normalize_lang(code: &str) -> Option<String> {
    let c = code.trim().to_lowercase();
    match c.as_str() {
        "auto" | "" => None,
        other if other.starts_with("nl") => Some("nl-nl".into()),
        other if other.starts_with("en") => Some("en-us".into()),
        _ => None,
    }
}

fn normalize_locale_string(loc: &str) -> Option<String> {
    let lang = loc
        .split(['.', '_', '-'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    normalize_lang(&lang)
}

/// Guesses the language from the operating system locale.
pub fn detect_system_language() -> Option<String> {
    if let Some(lang) = get_locale().as_deref().and_then(normalize_locale_string) {
        return Some(lang);
    }
    ["LC_ALL", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|v| normalize_locale_string(&v))
}

/// Loads a flat `key = "value"` TOML pack (nested tables become dotted keys).
fn load_overrides(dir: &str, lang: &str) -> Option<HashMap<String, String>> {
    let try_load = |code: &str| -> Option<HashMap<String, String>> {
        let path = Path::new(dir).join(format!("{code}.toml"));
        let content = fs::read_to_string(path).ok()?;
        parse_toml_to_map(&content)
    };

    if let Some(map) = try_load(lang) {
        return Some(map);
    }
    if let Some((base, _)) = lang.split_once(['-', '_']) {
        if let Some(map) = try_load(base) {
            return Some(map);
        }
    }
    None
}

fn parse_toml_to_map(src: &str) -> Option<HashMap<String, String>> {
    let value: toml::Value = toml::from_str(src).ok()?;
    let table = value.as_table()?;
    let mut map = HashMap::new();

    fn walk(prefix: &str, val: &toml::Value, out: &mut HashMap<String, String>) {
        match val {
            toml::Value::String(s) => {
                out.insert(prefix.to_string(), s.to_string());
            }
            toml::Value::Table(t) => {
                for (k, v) in t {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    walk(&key, v, out);
                }
            }
            _ => {}
        }
    }

    for (k, v) in table {
        walk(k, v, &mut map);
    }

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

/// Packs compiled into the binary so it works without a locales/ directory.
fn built_in_pack(lang: Language) -> Option<HashMap<String, String>> {
    match lang {
        Language::En => parse_toml_to_map(include_str!("../locales/en-us.toml")),
        Language::Nl => parse_toml_to_map(include_str!("../locales/nl-nl.toml")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_language_codes() {
        assert_eq!(resolve_language("nl", None), "nl-nl");
        assert_eq!(resolve_language("EN-GB", None), "en-us");
        assert_eq!(resolve_language("auto", Some("nl_NL")), "nl-nl");
    }

    #[test]
    fn both_packs_define_every_english_key() {
        let en = built_in_pack(Language::En).unwrap();
        let nl = built_in_pack(Language::Nl).unwrap();
        let mut missing: Vec<_> = en.keys().filter(|k| !nl.contains_key(*k)).collect();
        missing.sort();
        assert!(missing.is_empty(), "missing in nl-nl: {missing:?}");
    }

    #[test]
    fn dutch_report_title() {
        let tr = Translator::new("nl-nl");
        assert_eq!(tr.language(), Language::Nl);
        assert_eq!(tr.t(keys::REPORT_TITLE), "CO₂-emissies Rapport");
    }

    #[test]
    fn unknown_key_falls_back_to_key() {
        let tr = Translator::new("en");
        assert_eq!(tr.t("no.such.key"), "no.such.key");
    }

    #[test]
    fn template_placeholders_are_filled() {
        let tr = Translator::new("en");
        let s = tr.tf(keys::REPORT_SAVED, &[("path", "out.pdf".into())]);
        assert!(s.contains("out.pdf"));
        assert!(!s.contains("{path}"));
    }
}
