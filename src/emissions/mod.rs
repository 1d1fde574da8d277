//! Emission calculator: consumption in, kg CO₂-eq per category out.

pub mod factors;

use crate::quantity::{ConsumptionUnit, EnergyCarrier};

pub use factors::{electricity_factor, factor, EmissionFactor, EMISSION_FACTORS};

/// Grey or green electricity contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Tariff {
    #[default]
    Grey,
    Green,
}

impl Tariff {
    pub const ALL: [Tariff; 2] = [Tariff::Grey, Tariff::Green];

    /// Factor-table row that applies to this tariff.
    pub fn carrier(&self) -> EnergyCarrier {
        match self {
            Tariff::Grey => EnergyCarrier::GreyElectricity,
            Tariff::Green => EnergyCarrier::GreenElectricity,
        }
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            Tariff::Grey => crate::i18n::keys::TARIFF_GREY,
            Tariff::Green => crate::i18n::keys::TARIFF_GREEN,
        }
    }
}

/// Measured energy carriers that can show up in a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Gas,
    Electricity,
    Diesel,
}

impl Category {
    pub fn label_key(&self) -> &'static str {
        match self {
            Category::Gas => crate::i18n::keys::CATEGORY_GAS,
            Category::Electricity => crate::i18n::keys::CATEGORY_ELECTRICITY,
            Category::Diesel => crate::i18n::keys::CATEGORY_DIESEL,
        }
    }

    pub fn unit(&self) -> ConsumptionUnit {
        match self {
            Category::Gas => ConsumptionUnit::CubicMeter,
            Category::Electricity => ConsumptionUnit::KilowattHour,
            Category::Diesel => ConsumptionUnit::Litre,
        }
    }
}

/// One calculation's worth of user input.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConsumptionReading {
    /// Natural gas [m³]
    pub gas_m3: f64,
    /// Electricity [kWh]
    pub electricity_kwh: f64,
    pub tariff: Tariff,
    /// Diesel [litre]
    pub diesel_litre: f64,
}

impl ConsumptionReading {
    /// True when there is nothing to calculate.
    pub fn is_all_zero(&self) -> bool {
        self.gas_m3 == 0.0 && self.electricity_kwh == 0.0 && self.diesel_litre == 0.0
    }

    pub fn quantity(&self, category: Category) -> f64 {
        match category {
            Category::Gas => self.gas_m3,
            Category::Electricity => self.electricity_kwh,
            Category::Diesel => self.diesel_litre,
        }
    }
}

/// Emissions per category in insertion order (gas, electricity, diesel).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Emissions {
    entries: Vec<(Category, f64)>,
}

impl Emissions {
    fn insert(&mut self, category: Category, kg_co2e: f64) {
        self.entries.push((category, kg_co2e));
    }

    pub fn get(&self, category: Category) -> Option<f64> {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Sum of all categories [kg CO₂-eq].
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }

    /// Share of `value` in the total, in percent. Zero when the total is
    /// zero or not finite.
    pub fn share_percent(&self, value: f64) -> f64 {
        let total = self.total();
        if total.is_finite() && total > 0.0 {
            value / total * 100.0
        } else {
            0.0
        }
    }
}

/// Multiplies each positive quantity by its factor.
///
/// Inputs are expected to be non-negative; the form layer guarantees that.
/// Categories with zero consumption are left out, so an all-zero reading
/// gives an empty result.
pub fn calculate(reading: &ConsumptionReading) -> Emissions {
    let mut out = Emissions::default();
    if reading.gas_m3 > 0.0 {
        out.insert(
            Category::Gas,
            reading.gas_m3 * factor(EnergyCarrier::NaturalGas),
        );
    }
    if reading.electricity_kwh > 0.0 {
        out.insert(
            Category::Electricity,
            reading.electricity_kwh * electricity_factor(reading.tariff),
        );
    }
    if reading.diesel_litre > 0.0 {
        out.insert(
            Category::Diesel,
            reading.diesel_litre * factor(EnergyCarrier::Diesel),
        );
    }
    tracing::debug!(
        categories = out.len(),
        total_kg = out.total(),
        "emissions calculated"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(gas: f64, elec: f64, tariff: Tariff, diesel: f64) -> ConsumptionReading {
        ConsumptionReading {
            gas_m3: gas,
            electricity_kwh: elec,
            tariff,
            diesel_litre: diesel,
        }
    }

    #[test]
    fn gas_and_grey_electricity_example() {
        let e = calculate(&reading(100.0, 300.0, Tariff::Grey, 0.0));
        assert_eq!(e.len(), 2);
        assert!((e.get(Category::Gas).unwrap() - 208.5).abs() < 1e-9);
        assert!((e.get(Category::Electricity).unwrap() - 160.8).abs() < 1e-9);
        assert!(e.get(Category::Diesel).is_none());
        assert!((e.total() - 369.3).abs() < 1e-9);
    }

    #[test]
    fn insertion_order_is_gas_electricity_diesel() {
        let e = calculate(&reading(1.0, 1.0, Tariff::Grey, 1.0));
        let order: Vec<Category> = e.iter().map(|(c, _)| c).collect();
        assert_eq!(
            order,
            vec![Category::Gas, Category::Electricity, Category::Diesel]
        );
    }

    #[test]
    fn all_zero_gives_empty_result() {
        let r = reading(0.0, 0.0, Tariff::Green, 0.0);
        assert!(r.is_all_zero());
        let e = calculate(&r);
        assert!(e.is_empty());
        assert_eq!(e.total(), 0.0);
    }

    #[test]
    fn green_electricity_is_present_with_zero_value() {
        let e = calculate(&reading(0.0, 500.0, Tariff::Green, 0.0));
        assert_eq!(e.get(Category::Electricity), Some(0.0));
        assert_eq!(e.share_percent(0.0), 0.0);
    }

    #[test]
    fn share_percent_of_infinite_total_is_zero() {
        let e = calculate(&reading(1e308, 1e308, Tariff::Grey, 0.0));
        assert!(e.total().is_infinite());
        for (_, v) in e.iter() {
            assert_eq!(e.share_percent(v), 0.0);
        }
    }

    #[test]
    fn share_percent_of_single_category_is_hundred() {
        let e = calculate(&reading(0.0, 0.0, Tariff::Grey, 10.0));
        let v = e.get(Category::Diesel).unwrap();
        assert!((e.share_percent(v) - 100.0).abs() < 1e-9);
    }
}
