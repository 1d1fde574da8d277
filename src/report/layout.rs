//! Document model of the PDF report: blocks of text and styled tables.
//!
//! Building the model is pure; [`super::pdf`] paints it.

use chrono::NaiveDateTime;

use crate::emissions::{Category, EMISSION_FACTORS};
use crate::i18n::{keys, Translator};
use crate::session::Calculation;

pub const TEAL: [u8; 3] = [0x21, 0x80, 0x8D];
pub const SLATE: [u8; 3] = [0x13, 0x42, 0x52];
pub const BEIGE: [u8; 3] = [0xF5, 0xF5, 0xDC];
pub const WHITESMOKE: [u8; 3] = [0xF5, 0xF5, 0xF5];
pub const GREY: [u8; 3] = [0x80, 0x80, 0x80];
pub const TOTAL_GREY: [u8; 3] = [0xA7, 0xA9, 0xA9];
pub const FACTOR_HEADER: [u8; 3] = [0x62, 0x6C, 0x71];
pub const FACTOR_BODY: [u8; 3] = [0xF5, 0xF5, 0xF5];
pub const BLACK: [u8; 3] = [0, 0, 0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

/// Background and text colour of the last row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TotalRowStyle {
    pub fill: [u8; 3],
    pub text: [u8; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    pub header_fill: [u8; 3],
    pub header_text: [u8; 3],
    pub header_font_size: f32,
    /// Extra space below header text [pt]
    pub header_bottom_padding: f32,
    pub body_fill: [u8; 3],
    pub body_font_size: f32,
    pub grid_color: [u8; 3],
    /// [pt]
    pub grid_width: f32,
    /// Columns from this index on are right-aligned.
    pub right_align_from: Option<usize>,
    pub total_row: Option<TotalRowStyle>,
}

impl TableStyle {
    /// Teal header band on beige body, used for consumption and emissions.
    pub fn teal() -> Self {
        Self {
            header_fill: TEAL,
            header_text: WHITESMOKE,
            header_font_size: 12.0,
            header_bottom_padding: 12.0,
            body_fill: BEIGE,
            body_font_size: 10.0,
            grid_color: GREY,
            grid_width: 1.0,
            right_align_from: None,
            total_row: None,
        }
    }

    fn factors() -> Self {
        Self {
            header_fill: FACTOR_HEADER,
            header_font_size: 11.0,
            body_fill: FACTOR_BODY,
            body_font_size: 9.0,
            right_align_from: Some(1),
            ..Self::teal()
        }
    }

    pub fn align(&self, column: usize) -> Align {
        match self.right_align_from {
            Some(from) if column >= from => Align::Right,
            _ => Align::Left,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub column_widths_cm: Vec<f32>,
    pub style: TableStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title {
        text: String,
        size: f32,
        color: [u8; 3],
        space_after: f32,
    },
    Heading {
        text: String,
        size: f32,
        color: [u8; 3],
        space_after: f32,
    },
    Paragraph {
        text: String,
        size: f32,
        style: FontStyle,
    },
    /// Vertical gap [cm]
    Spacer(f32),
    Table(Table),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl ReportLayout {
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }
}

fn heading(text: String) -> Block {
    Block::Heading {
        text,
        size: 16.0,
        color: SLATE,
        space_after: 12.0,
    }
}

/// Lays out title, consumption, emissions and reference factor sections.
pub fn build_layout(calc: &Calculation, tr: &Translator, generated_at: NaiveDateTime) -> ReportLayout {
    let title = tr.t(keys::REPORT_TITLE);
    let blocks = vec![
        Block::Title {
            text: title.clone(),
            size: 24.0,
            color: TEAL,
            space_after: 30.0,
        },
        Block::Paragraph {
            text: tr.tf(
                keys::REPORT_GENERATED_ON,
                &[("date", generated_at.format("%d-%m-%Y %H:%M").to_string())],
            ),
            size: 10.0,
            style: FontStyle::Regular,
        },
        Block::Spacer(1.0),
        heading(tr.t(keys::REPORT_CONSUMPTION_HEADING)),
        Block::Table(consumption_table(calc, tr)),
        Block::Spacer(1.0),
        heading(tr.t(keys::REPORT_EMISSIONS_HEADING)),
        Block::Table(emissions_table(calc, tr)),
        Block::Spacer(1.0),
        heading(tr.t(keys::REPORT_FACTORS_HEADING)),
        Block::Paragraph {
            text: tr.t(keys::REPORT_FACTORS_SOURCE),
            size: 10.0,
            style: FontStyle::Italic,
        },
        Block::Spacer(0.5),
        Block::Table(factors_table(tr)),
    ];
    ReportLayout { title, blocks }
}

fn consumption_table(calc: &Calculation, tr: &Translator) -> Table {
    let r = &calc.reading;
    let quantity_row = |category: Category| {
        vec![
            tr.t(category.label_key()),
            format!("{:.2}", r.quantity(category)),
            tr.t(category.unit().symbol_key()),
        ]
    };
    Table {
        header: vec![
            tr.t(keys::REPORT_COL_CARRIER),
            tr.t(keys::REPORT_COL_CONSUMPTION),
            tr.t(keys::REPORT_COL_UNIT),
        ],
        rows: vec![
            quantity_row(Category::Gas),
            quantity_row(Category::Electricity),
            vec![tr.t(keys::REPORT_TARIFF_ROW), tr.t(r.tariff.label_key()), String::new()],
            quantity_row(Category::Diesel),
        ],
        column_widths_cm: vec![6.0, 4.0, 3.0],
        style: TableStyle::teal(),
    }
}

fn emissions_table(calc: &Calculation, tr: &Translator) -> Table {
    let mut rows: Vec<Vec<String>> = calc
        .emissions
        .iter()
        .map(|(category, kg)| {
            vec![
                tr.t(category.label_key()),
                format!("{kg:.2}"),
                format!("{:.1}%", calc.emissions.share_percent(kg)),
            ]
        })
        .collect();
    rows.push(vec![
        tr.t(keys::REPORT_TOTAL_ROW),
        format!("{:.2}", calc.total),
        "100%".to_string(),
    ]);
    Table {
        header: vec![
            tr.t(keys::RESULTS_COL_CATEGORY),
            tr.t(keys::REPORT_COL_EMISSIONS),
            tr.t(keys::RESULTS_COL_PERCENTAGE),
        ],
        rows,
        column_widths_cm: vec![6.0, 5.0, 3.0],
        style: TableStyle {
            right_align_from: Some(1),
            total_row: Some(TotalRowStyle {
                fill: TOTAL_GREY,
                text: WHITESMOKE,
            }),
            ..TableStyle::teal()
        },
    }
}

fn factors_table(tr: &Translator) -> Table {
    let unit = tr.t(keys::UNIT_KG_CO2E);
    Table {
        header: vec![
            tr.t(keys::REPORT_COL_CARRIER),
            tr.t(keys::REPORT_COL_FACTOR),
            tr.t(keys::REPORT_COL_UNIT),
        ],
        rows: EMISSION_FACTORS
            .iter()
            .map(|f| {
                vec![
                    tr.t(f.carrier.label_key()),
                    format!("{:.3}", f.kg_co2e_per_unit),
                    unit.clone(),
                ]
            })
            .collect(),
        column_widths_cm: vec![8.0, 3.0, 3.0],
        style: TableStyle::factors(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emissions::{ConsumptionReading, Tariff};
    use crate::session::Session;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, 7, 0)
            .unwrap()
    }

    fn layout(reading: ConsumptionReading) -> ReportLayout {
        let mut session = Session::new();
        let calc = session.calculate(reading).unwrap().clone();
        build_layout(&calc, &Translator::new("en-us"), at())
    }

    #[test]
    fn sections_in_order() {
        let l = layout(ConsumptionReading {
            gas_m3: 100.0,
            electricity_kwh: 300.0,
            ..Default::default()
        });
        let headings: Vec<&str> = l
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            headings,
            vec![
                "Consumption overview",
                "CO₂ emissions per category",
                "Emission factors used (2024)"
            ]
        );
        assert!(matches!(&l.blocks[1], Block::Paragraph { text, .. } if text == "Generated on: 05-03-2024 09:07"));
        assert_eq!(l.tables().count(), 3);
    }

    #[test]
    fn consumption_table_lists_all_quantities_and_tariff() {
        let l = layout(ConsumptionReading {
            gas_m3: 12.346,
            tariff: Tariff::Green,
            ..Default::default()
        });
        let t = l.tables().next().unwrap();
        assert_eq!(t.rows.len(), 4);
        assert_eq!(t.rows[0], vec!["Natural gas", "12.35", "m³"]);
        assert_eq!(t.rows[1], vec!["Electricity", "0.00", "kWh"]);
        assert_eq!(t.rows[2], vec!["Electricity type", "Green electricity", ""]);
        assert_eq!(t.rows[3], vec!["Diesel", "0.00", "litre"]);
    }

    #[test]
    fn emissions_table_has_percentages_and_fixed_total() {
        let l = layout(ConsumptionReading {
            gas_m3: 100.0,
            electricity_kwh: 300.0,
            ..Default::default()
        });
        let t = l.tables().nth(1).unwrap();
        assert_eq!(t.rows[0], vec!["Natural gas", "208.50", "56.5%"]);
        assert_eq!(t.rows[1], vec!["Electricity", "160.80", "43.5%"]);
        assert_eq!(t.rows[2], vec!["TOTAL", "369.30", "100%"]);
        assert!(t.style.total_row.is_some());
        assert_eq!(t.style.align(0), Align::Left);
        assert_eq!(t.style.align(2), Align::Right);
    }

    #[test]
    fn green_only_electricity_reports_zero_percent() {
        let l = layout(ConsumptionReading {
            electricity_kwh: 10.0,
            tariff: Tariff::Green,
            ..Default::default()
        });
        let t = l.tables().nth(1).unwrap();
        assert_eq!(t.rows[0], vec!["Electricity", "0.00", "0.0%"]);
        assert_eq!(t.rows[1], vec!["TOTAL", "0.00", "100%"]);
    }

    #[test]
    fn factor_table_includes_petrol() {
        let l = layout(ConsumptionReading {
            diesel_litre: 1.0,
            ..Default::default()
        });
        let t = l.tables().nth(2).unwrap();
        assert_eq!(t.rows.len(), 5);
        assert_eq!(t.rows[4], vec!["Petrol (litre)", "2.821", "kg CO₂-eq"]);
        assert_eq!(t.rows[2][1], "0.000");
        assert_eq!(t.style.body_font_size, 9.0);
    }
}
