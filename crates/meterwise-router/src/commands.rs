// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exact-match command table.

use strum::{Display, EnumIter, IntoEnumIterator};

/// Commands recognised without calling the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Command {
    Voltage,
    Power,
    ConsumptionToday,
    ConsumptionYesterday,
    DailyChart,
    WeeklyChart,
    UseTelegram,
    UseWhatsapp,
}

impl Command {
    /// Spellings accepted for this command, after normalisation.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Command::Voltage => &["voltaje"],
            Command::Power => &["watts", "potencia"],
            Command::ConsumptionToday => &["consumo_hoy", "consumo_de_hoy", "hoy"],
            Command::ConsumptionYesterday => &["consumo_ayer", "consumo_de_ayer", "ayer"],
            Command::DailyChart => &["grafica_ayer", "grafica"],
            Command::WeeklyChart => &["grafica_semanal", "semanal"],
            Command::UseTelegram => &["usar_telegram"],
            Command::UseWhatsapp => &["usar_whatsapp"],
        }
    }
}

/// Matches `text` against the command table.
///
/// Matching is case-insensitive on the trimmed text with one leading `/`
/// and any Telegram `@botname` suffix removed. Anything else, including a
/// command followed by extra words, is not a command.
pub fn parse_command(text: &str) -> Option<Command> {
    let lowered = text.trim().to_lowercase();
    let stripped = lowered.strip_prefix('/').unwrap_or(&lowered);
    let name = match stripped.split_once('@') {
        Some((name, _bot)) => name,
        None => stripped,
    };

    Command::iter().find(|command| command.aliases().contains(&name))
}
