//! Bar-chart description of an emissions result.
//!
//! Presentation only: the GUI paints it with egui_plot, the terminal binary
//! with [`BarChartSpec::render_text`].

use crate::emissions::Emissions;
use crate::i18n::{keys, Translator};

/// Bar colours by position. Not tied to the category.
pub const PALETTE: [[u8; 3]; 3] = [[0x21, 0x80, 0x8D], [0xA8, 0x7B, 0x2F], [0xC0, 0x15, 0x2F]];

pub const CHART_HEIGHT_PX: f32 = 400.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BarSpec {
    pub label: String,
    /// kg CO₂-eq
    pub value: f64,
    /// Value label shown above the bar, e.g. "208.5 kg".
    pub text: String,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChartSpec {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub bars: Vec<BarSpec>,
    pub show_legend: bool,
    pub height_px: f32,
}

/// Builds one bar per category in result order. `None` when there is
/// nothing to draw.
pub fn build_bar_chart(emissions: &Emissions, tr: &Translator) -> Option<BarChartSpec> {
    if emissions.is_empty() {
        return None;
    }
    let bars = emissions
        .iter()
        .enumerate()
        .map(|(i, (category, value))| BarSpec {
            label: tr.t(category.label_key()),
            value,
            text: format!("{value:.1} kg"),
            color: PALETTE[i % PALETTE.len()],
        })
        .collect();
    Some(BarChartSpec {
        title: tr.t(keys::CHART_TITLE),
        x_axis_title: tr.t(keys::CHART_X_AXIS),
        y_axis_title: tr.t(keys::CHART_Y_AXIS),
        bars,
        show_legend: false,
        height_px: CHART_HEIGHT_PX,
    })
}

impl BarChartSpec {
    /// Horizontal text bars scaled so the largest value spans `width` cells.
    pub fn render_text(&self, width: usize) -> String {
        let max = self.bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);
        let label_w = self
            .bars
            .iter()
            .map(|b| b.label.chars().count())
            .max()
            .unwrap_or(0);
        let mut out = format!("{}\n", self.title);
        for bar in &self.bars {
            let cells = if max > 0.0 {
                ((bar.value / max) * width as f64).round() as usize
            } else {
                0
            };
            let pad = label_w - bar.label.chars().count();
            out.push_str(&format!(
                "{}{} | {} {}\n",
                bar.label,
                " ".repeat(pad),
                "█".repeat(cells),
                bar.text
            ));
        }
        out.push_str(&format!("({} / {})\n", self.x_axis_title, self.y_axis_title));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emissions::{calculate, ConsumptionReading, Tariff};

    fn chart_for(reading: ConsumptionReading) -> Option<BarChartSpec> {
        let tr = Translator::new("en-us");
        build_bar_chart(&calculate(&reading), &tr)
    }

    #[test]
    fn empty_result_has_no_chart() {
        assert!(chart_for(ConsumptionReading::default()).is_none());
    }

    #[test]
    fn colours_follow_position_not_category() {
        let chart = chart_for(ConsumptionReading {
            electricity_kwh: 300.0,
            diesel_litre: 5.0,
            tariff: Tariff::Grey,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(chart.bars.len(), 2);
        assert_eq!(chart.bars[0].label, "Electricity");
        assert_eq!(chart.bars[0].color, PALETTE[0]);
        assert_eq!(chart.bars[1].label, "Diesel");
        assert_eq!(chart.bars[1].color, PALETTE[1]);
        assert!(!chart.show_legend);
    }

    #[test]
    fn bar_text_has_one_decimal_and_kg_suffix() {
        let chart = chart_for(ConsumptionReading {
            gas_m3: 100.0,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(chart.bars[0].text, "208.5 kg");
        assert!((chart.bars[0].value - 208.5).abs() < 1e-9);
        assert_eq!(chart.x_axis_title, "Energy carrier");
    }

    #[test]
    fn text_rendering_scales_to_largest_bar() {
        let chart = chart_for(ConsumptionReading {
            gas_m3: 100.0,
            electricity_kwh: 300.0,
            ..Default::default()
        })
        .unwrap();
        let text = chart.render_text(20);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1].matches('█').count(), 20);
        assert!(lines[2].matches('█').count() < 20);
        assert!(lines[2].ends_with("160.8 kg"));
    }
}
