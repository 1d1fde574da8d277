use crate::emissions::{self, ConsumptionReading, Emissions, Tariff};

/// Result of the last successful calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    pub reading: ConsumptionReading,
    pub emissions: Emissions,
    /// kg CO₂-eq
    pub total: f64,
}

impl Calculation {
    pub fn tariff(&self) -> Tariff {
        self.reading.tariff
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CalculationError {
    /// Gas, electricity and diesel are all zero.
    #[error("enter at least one consumption value to calculate")]
    NothingEntered,
    /// The quantities are too large for the total to be represented.
    #[error("consumption values are too large to calculate")]
    OutOfRange,
}

impl CalculationError {
    /// Translation key of the warning shown instead of a result.
    pub fn message_key(&self) -> &'static str {
        match self {
            CalculationError::NothingEntered => crate::i18n::keys::WARNING_NOTHING_ENTERED,
            CalculationError::OutOfRange => crate::i18n::keys::WARNING_OUT_OF_RANGE,
        }
    }
}

/// Per-user state shared between the form, the chart and the report.
///
/// The stored calculation is replaced as a whole and is only read between
/// calculations.
#[derive(Debug, Default)]
pub struct Session {
    latest: Option<Calculation>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the calculator and stores the outcome.
    ///
    /// An all-zero reading is refused and the previous result is kept.
    pub fn calculate(
        &mut self,
        reading: ConsumptionReading,
    ) -> Result<&Calculation, CalculationError> {
        if reading.is_all_zero() {
            tracing::warn!("calculation refused: no consumption entered");
            return Err(CalculationError::NothingEntered);
        }
        let emissions = emissions::calculate(&reading);
        let total = emissions.total();
        if !total.is_finite() {
            tracing::warn!(total_kg = total, "calculation refused: total out of range");
            return Err(CalculationError::OutOfRange);
        }
        tracing::info!(
            gas_m3 = reading.gas_m3,
            electricity_kwh = reading.electricity_kwh,
            diesel_litre = reading.diesel_litre,
            tariff = ?reading.tariff,
            total_kg = total,
            "calculation stored"
        );
        Ok(self.latest.insert(Calculation {
            reading,
            emissions,
            total,
        }))
    }

    pub fn latest(&self) -> Option<&Calculation> {
        self.latest.as_ref()
    }

    /// The report can only be downloaded once something was calculated.
    pub fn can_download(&self) -> bool {
        self.latest.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_calculation_keeps_previous_record() {
        let mut s = Session::new();
        assert!(!s.can_download());
        let first = ConsumptionReading {
            gas_m3: 10.0,
            ..Default::default()
        };
        s.calculate(first).unwrap();
        let err = s.calculate(ConsumptionReading::default()).unwrap_err();
        assert_eq!(err, CalculationError::NothingEntered);
        assert_eq!(s.latest().unwrap().reading, first);
        assert!(s.can_download());
    }

    #[test]
    fn overflowing_total_is_refused() {
        let mut s = Session::new();
        let err = s
            .calculate(ConsumptionReading {
                gas_m3: 1e308,
                electricity_kwh: 1e308,
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err, CalculationError::OutOfRange);
        assert!(!s.can_download());
    }

    #[test]
    fn new_calculation_replaces_record() {
        let mut s = Session::new();
        s.calculate(ConsumptionReading {
            gas_m3: 10.0,
            ..Default::default()
        })
        .unwrap();
        let calc = s
            .calculate(ConsumptionReading {
                diesel_litre: 2.0,
                tariff: Tariff::Green,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(calc.emissions.len(), 1);
        assert_eq!(calc.tariff(), Tariff::Green);
        assert!((calc.total - 6.512).abs() < 1e-9);
    }
}
