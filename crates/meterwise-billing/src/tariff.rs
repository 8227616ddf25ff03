// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Progressive tariff tables and cost estimation.
//!
//! Built-in residential schedules (MXN per kWh, before tax):
//!
//! 01:   first 150 kWh @ 1.08, up to 280 @ 1.32, rest @ 3.85
//! 01A:  first 150 kWh @ 1.08, up to 300 @ 1.32, rest @ 3.85
//! PDBT: flat 5.60
//! DAC:  flat 7.80
//!
//! Tax multiplier defaults to 1.16.

use std::collections::HashMap;

use meterwise_config::model::TariffConfig;
use tracing::warn;

/// One price step. `upto_kwh` is the cumulative upper bound; `None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TariffBracket {
    pub upto_kwh: Option<f64>,
    pub unit_price: f64,
}

impl TariffBracket {
    const fn new(upto_kwh: Option<f64>, unit_price: f64) -> Self {
        Self {
            upto_kwh,
            unit_price,
        }
    }
}

/// Tariff code to ordered brackets, plus the tax multiplier applied on top.
#[derive(Debug, Clone)]
pub struct TariffTable {
    schedules: HashMap<String, Vec<TariffBracket>>,
    tax_multiplier: f64,
}

impl Default for TariffTable {
    fn default() -> Self {
        Self::builtin(1.16)
    }
}

impl TariffTable {
    /// The built-in residential schedules with the given tax multiplier.
    pub fn builtin(tax_multiplier: f64) -> Self {
        let schedules = [
            (
                "01",
                vec![
                    TariffBracket::new(Some(150.0), 1.08),
                    TariffBracket::new(Some(280.0), 1.32),
                    TariffBracket::new(None, 3.85),
                ],
            ),
            (
                "01A",
                vec![
                    TariffBracket::new(Some(150.0), 1.08),
                    TariffBracket::new(Some(300.0), 1.32),
                    TariffBracket::new(None, 3.85),
                ],
            ),
            ("PDBT", vec![TariffBracket::new(None, 5.60)]),
            ("DAC", vec![TariffBracket::new(None, 7.80)]),
        ]
        .into_iter()
        .map(|(code, brackets)| (code.to_string(), brackets))
        .collect();

        Self {
            schedules,
            tax_multiplier,
        }
    }

    /// Builds the table from configuration; no schedules means the built-in set.
    ///
    /// Assumes the config already passed validation (ascending bounds, only the
    /// last bracket unbounded).
    pub fn from_config(config: &TariffConfig) -> Self {
        if config.schedules.is_empty() {
            return Self::builtin(config.tax_multiplier);
        }
        let schedules = config
            .schedules
            .iter()
            .map(|schedule| {
                let brackets = schedule
                    .brackets
                    .iter()
                    .map(|b| TariffBracket::new(b.upto_kwh, b.unit_price))
                    .collect();
                (schedule.code.clone(), brackets)
            })
            .collect();
        Self {
            schedules,
            tax_multiplier: config.tax_multiplier,
        }
    }

    pub fn tax_multiplier(&self) -> f64 {
        self.tax_multiplier
    }

    pub fn brackets(&self, tariff_code: &str) -> Option<&[TariffBracket]> {
        self.schedules.get(tariff_code).map(Vec::as_slice)
    }

    /// Tax-inclusive cost of `kwh` under `tariff_code`.
    ///
    /// Each bracket contributes `min(remaining, width) * unit_price`. An
    /// unknown code yields `0.0` and a warning; estimates are advisory.
    pub fn estimate_cost(&self, kwh: f64, tariff_code: &str) -> f64 {
        let Some(brackets) = self.brackets(tariff_code) else {
            warn!(tariff_code, kwh, "unknown tariff code, estimating zero cost");
            return 0.0;
        };

        let mut remaining = kwh;
        let mut lower = 0.0;
        let mut subtotal = 0.0;
        for bracket in brackets {
            let width = bracket.upto_kwh.map_or(f64::INFINITY, |upto| upto - lower);
            let consumed = remaining.min(width);
            subtotal += consumed * bracket.unit_price;
            remaining -= consumed;
            if remaining <= 0.0 {
                break;
            }
            if let Some(upto) = bracket.upto_kwh {
                lower = upto;
            }
        }
        subtotal * self.tax_multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meterwise_config::model::{TariffBracketConfig, TariffScheduleConfig};
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn zero_kwh_costs_nothing() {
        let table = TariffTable::default();
        for code in ["01", "01A", "PDBT", "DAC"] {
            assert!(close(table.estimate_cost(0.0, code), 0.0), "{code}");
        }
    }

    #[test]
    fn first_bracket_only() {
        let table = TariffTable::default();
        let cost = table.estimate_cost(100.0, "01");
        assert!(close(cost, 100.0 * 1.08 * 1.16), "got {cost}");
    }

    #[test]
    fn spans_all_three_brackets() {
        let table = TariffTable::default();
        // 150 @ 1.08 + 130 @ 1.32 + 20 @ 3.85
        let expected = (150.0 * 1.08 + 130.0 * 1.32 + 20.0 * 3.85) * 1.16;
        let cost = table.estimate_cost(300.0, "01");
        assert!(close(cost, expected), "expected {expected}, got {cost}");
    }

    #[test]
    fn flat_tariff() {
        let table = TariffTable::default();
        assert!(close(table.estimate_cost(10.0, "DAC"), 10.0 * 7.80 * 1.16));
    }

    #[tracing_test::traced_test]
    #[test]
    fn unknown_code_degrades_to_zero_with_warning() {
        let table = TariffTable::default();
        assert!(close(table.estimate_cost(500.0, "9Z"), 0.0));
        assert!(logs_contain("unknown tariff code"));
    }

    #[test]
    fn negative_kwh_is_priced_in_first_bracket() {
        let table = TariffTable::default();
        let cost = table.estimate_cost(-20.0, "01");
        assert!(close(cost, -20.0 * 1.08 * 1.16), "got {cost}");
    }

    #[test]
    fn configured_schedules_replace_builtin() {
        let config = TariffConfig {
            tax_multiplier: 1.0,
            schedules: vec![TariffScheduleConfig {
                code: "T1".into(),
                brackets: vec![
                    TariffBracketConfig {
                        upto_kwh: Some(10.0),
                        unit_price: 1.0,
                    },
                    TariffBracketConfig {
                        upto_kwh: None,
                        unit_price: 2.0,
                    },
                ],
            }],
        };
        let table = TariffTable::from_config(&config);
        assert!(close(table.estimate_cost(15.0, "T1"), 20.0));
        assert!(table.brackets("01").is_none());
    }

    #[test]
    fn empty_config_uses_builtin_with_configured_tax() {
        let config = TariffConfig {
            tax_multiplier: 1.0,
            schedules: Vec::new(),
        };
        let table = TariffTable::from_config(&config);
        assert!(close(table.estimate_cost(100.0, "01"), 108.0));
    }

    proptest! {
        #[test]
        fn cost_is_non_decreasing_in_kwh(
            a in 0.0f64..5000.0,
            b in 0.0f64..5000.0,
            code_idx in 0usize..4,
        ) {
            let code = ["01", "01A", "PDBT", "DAC"][code_idx];
            let table = TariffTable::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(table.estimate_cost(lo, code) <= table.estimate_cost(hi, code) + 1e-9);
        }
    }
}
