// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The closed set of intents the external classifier may return.

use std::str::FromStr;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Intent labels understood by the assistant.
///
/// The string form is the wire label exchanged with the classifier. Any
/// label outside this set is folded into [`Intent::Unknown`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
pub enum Intent {
    #[strum(serialize = "soporte_humano")]
    HumanSupport,
    #[strum(serialize = "pedir_proyeccion_pago")]
    BillProjection,
    #[strum(serialize = "pedir_diagnostico_fuga_tierra")]
    LeakDiagnosis,
    #[strum(serialize = "pedir_diagnostico_fantasma")]
    PhantomLoadDiagnosis,
    #[strum(serialize = "pedir_diagnostico_voltaje")]
    VoltageDiagnosis,
    #[strum(serialize = "pedir_hora_pico")]
    PeakHour,
    #[strum(serialize = "pedir_fecha_corte_cfe")]
    CutoffDate,
    #[strum(serialize = "pedir_pago_cuentatron")]
    RenewalDate,
    #[strum(serialize = "faq_servicios_empresa")]
    CompanyFaq,
    #[strum(serialize = "pedir_consumo_hoy")]
    ConsumptionToday,
    #[strum(serialize = "pedir_consumo_ayer")]
    ConsumptionYesterday,
    #[strum(serialize = "pedir_voltaje")]
    LatestVoltage,
    #[strum(serialize = "pedir_watts")]
    LatestPower,
    #[strum(serialize = "pedir_grafica_ayer")]
    DailyChart,
    #[strum(serialize = "pedir_grafica_semanal")]
    WeeklyChart,
    #[strum(serialize = "desconocido")]
    Unknown,
}

impl Intent {
    /// Parses a classifier label, folding anything unrecognised into `Unknown`.
    pub fn from_label(label: &str) -> Intent {
        Intent::from_str(label.trim()).unwrap_or(Intent::Unknown)
    }

    /// The wire label for this intent.
    pub fn label(self) -> &'static str {
        self.into()
    }
}
