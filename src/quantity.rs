/// Energy carriers that appear in the emission factor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnergyCarrier {
    NaturalGas,
    GreyElectricity,
    GreenElectricity,
    Diesel,
    Petrol,
}

/// Measurement unit of a consumption figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumptionUnit {
    CubicMeter,
    KilowattHour,
    Litre,
}

impl ConsumptionUnit {
    /// Symbol used on screen and in the report (`m³`, `kWh`, `liter`/`litre`).
    pub fn symbol_key(&self) -> &'static str {
        match self {
            ConsumptionUnit::CubicMeter => crate::i18n::keys::UNIT_M3,
            ConsumptionUnit::KilowattHour => crate::i18n::keys::UNIT_KWH,
            ConsumptionUnit::Litre => crate::i18n::keys::UNIT_LITRE,
        }
    }
}

impl EnergyCarrier {
    /// Translation key of the factor-table label, e.g. "Aardgas (m³)".
    pub fn label_key(&self) -> &'static str {
        use crate::i18n::keys::*;
        match self {
            EnergyCarrier::NaturalGas => CARRIER_NATURAL_GAS,
            EnergyCarrier::GreyElectricity => CARRIER_GREY_ELECTRICITY,
            EnergyCarrier::GreenElectricity => CARRIER_GREEN_ELECTRICITY,
            EnergyCarrier::Diesel => CARRIER_DIESEL,
            EnergyCarrier::Petrol => CARRIER_PETROL,
        }
    }
}
