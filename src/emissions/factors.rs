//! Dutch CO₂ emission factors 2024 (source: CO2emissiefactoren.nl).

use crate::emissions::Tariff;
use crate::quantity::EnergyCarrier;

/// One row of the published factor table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionFactor {
    pub carrier: EnergyCarrier,
    /// kg CO₂-eq per unit of consumption
    pub kg_co2e_per_unit: f64,
}

/// The full reference table, in publication order.
///
/// Petrol is listed for reference only; the calculator never asks for it.
pub const EMISSION_FACTORS: [EmissionFactor; 5] = [
    EmissionFactor {
        carrier: EnergyCarrier::NaturalGas,
        kg_co2e_per_unit: 2.085,
    },
    EmissionFactor {
        carrier: EnergyCarrier::GreyElectricity,
        kg_co2e_per_unit: 0.536,
    },
    EmissionFactor {
        carrier: EnergyCarrier::GreenElectricity,
        kg_co2e_per_unit: 0.000,
    },
    EmissionFactor {
        carrier: EnergyCarrier::Diesel,
        kg_co2e_per_unit: 3.256,
    },
    EmissionFactor {
        carrier: EnergyCarrier::Petrol,
        kg_co2e_per_unit: 2.821,
    },
];

/// Returns the factor for a carrier.
pub fn factor(carrier: EnergyCarrier) -> f64 {
    EMISSION_FACTORS
        .iter()
        .find(|f| f.carrier == carrier)
        .map(|f| f.kg_co2e_per_unit)
        .unwrap_or(0.0)
}

/// Electricity factor selected by the tariff.
pub fn electricity_factor(tariff: Tariff) -> f64 {
    factor(tariff.carrier())
}
