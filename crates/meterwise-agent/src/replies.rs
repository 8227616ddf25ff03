// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing reply texts (Spanish, Mexican locale).

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use meterwise_billing::BillProjection;
use meterwise_metering::{BaseLoad, BaseLoadLevel, PeakHour};

pub const WELCOME: &str = "¡Hola! 👋 Bienvenido a las alertas de Cuentatrón.\n\nPara vincular tu cuenta, por favor escribe el correo electrónico que registraste.";
pub const EMAIL_NOT_FOUND: &str = "❌ Lo siento, no encontré ese correo. Verifica que esté escrito correctamente o intenta con otro.";
pub const CODE_SENT: &str = "✅ ¡Perfecto! Te acabo de enviar un código de 6 dígitos a tu correo. Por favor, escríbelo en este chat para confirmar.";
pub const CODE_REJECTED: &str = "❌ Código incorrecto o expirado. Por favor, envía tu email de nuevo para generar otro código.";
pub const NOT_LINKED: &str = "No entendí ese comando. Si quieres vincular tu cuenta, envía tu correo electrónico.";
pub const NO_ACTIVE_DEVICE: &str = "Tu cuenta está vinculada, pero no encontramos un dispositivo activo. Contacta a soporte.";
pub const SERVER_ERROR: &str = "Ocurrió un error en el servidor. Por favor, intenta más tarde.";
pub const CONSULTING: &str = "Consultando al experto... 🧠";
pub const TRANSFERRING: &str = "Entendido, tu mensaje requiere atención especial. Estoy transfiriendo tu chat, un momento por favor... 🧑‍💻";
pub const BOT_RESUMED: &str = "✅ ¡Chat finalizado! Tu conversación con nuestro agente ha terminado. El asistente de IA (yo) vuelve a tomar el control.\n\nSi tienes otra duda o problema, solo escribe de nuevo.";
pub const PREFER_TELEGRAM: &str = "✅ ¡Listo! A partir de ahora, tus reportes diarios y alertas llegarán *solo* por Telegram.";
pub const PREFER_WHATSAPP: &str = "✅ ¡Entendido! Tus reportes diarios y alertas volverán a enviarse por WhatsApp.";

pub const NO_VOLTAGE_DATA: &str = "No pude encontrar ningún dato de voltaje para tu dispositivo. ¿Está tu dispositivo conectado y enviando datos?";
pub const NO_POWER_DATA: &str = "No pude encontrar ningún dato de potencia (Watts) para tu dispositivo.";
pub const NO_DATA_TODAY: &str = "Aún no se registran datos de consumo para el día de hoy.";
pub const NO_DATA_YESTERDAY: &str = "No se encontraron datos de consumo para el día de ayer.";
pub const NO_DAILY_CHART_DATA: &str = "No encontré suficientes datos de ayer para generar una gráfica.";
pub const NO_WEEKLY_CHART_DATA: &str = "No encontré suficientes datos de los últimos 7 días para generar una gráfica.";
pub const PROJECTION_FAILED: &str = "Tuve problemas para calcular tu proyección. Intenta más tarde.";
pub const NO_BASE_LOAD_DATA: &str = "No tengo suficientes datos de las últimas madrugadas para calcular tu consumo fantasma.";
pub const NO_PEAK_DATA: &str = "No tengo suficientes datos de la semana para encontrar tu 'hora pico'.";
pub const NO_CUTOFF: &str = "No pude determinar tu próxima fecha de corte. Verifica tu configuración en el panel web.";
pub const NO_RENEWAL: &str = "No encontré una fecha de renovación para tu suscripción. Contacta a soporte.";

pub const LEAK_DETECTED: &str = "⚠️ **¡Alerta!** Mi sistema de vigilancia (que corre cada hora) **sí ha detectado una fuga de corriente a tierra** en tu instalación.\n\nEsto es un riesgo de seguridad y puede aumentar tu recibo. Te recomendamos contactar a un electricista certificado lo antes posible.";
pub const NO_LEAK: &str = "✅ **¡Buenas noticias!** Mi sistema de vigilancia **no detecta una fuga a tierra** activa en este momento.\n\n¿Te gustaría que revise si tienes 'consumo fantasma' (aparatos gastando sin uso)?";
pub const VOLTAGE_HIGH: &str = "⚡ **¡Cuidado!** Mi sistema de vigilancia (que corre cada hora) ha detectado **picos de voltaje ALTO** (arriba de 132V) recientemente en tu instalación.\n\nEsto puede dañar electrónicos sensibles. Te recomendamos usar reguladores.";
pub const VOLTAGE_LOW: &str = "📉 **¡Atención!** Mi sistema de vigilancia ha detectado **caídas de voltaje BAJO** (debajo de 108V) recientemente.\n\nEl voltaje bajo puede forzar y dañar motores (refrigerador, bombas). Sería bueno que un electricista revise.";
pub const VOLTAGE_NORMAL: &str = "Revisé el estado de tu voltaje y mi sistema de vigilancia reporta que está **normal y estable**.";

pub const HELP: &str = "¡Hola, soy tu asistente de energía! Puedes pedirme cosas como:\n\n\
📊 *Diagnósticos y Proyecciones*\n\
- _'¿Cuánto voy a pagar de luz?'_\n\
- _'¿Mi voltaje es normal?'_\n\
- _'¿Tengo una fuga de corriente?'_\n\
- _'¿Tengo consumo fantasma?'_\n\
- _'¿A qué hora del día gasto más?'_\n\n\
🗓️ *Fechas y Datos Rápidos*\n\
- _'¿Cuánto gasté ayer?'_\n\
- _'Muéstrame la gráfica semanal.'_\n\
- _'¿Cuándo es mi corte de CFE?'_\n\
- _'¿Cuándo pago mi suscripción?'_\n\n\
Si tienes un problema o una pregunta diferente (como '¿qué es un volt?' o '¿ustedes instalan focos?'), solo escríbelo y te ayudaré.";

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// `10 de abril de 2024`
pub fn long_date(date: NaiveDate) -> String {
    let month = MONTHS[date.month0() as usize];
    format!("{} de {} de {}", date.day(), month, date.year())
}

/// `10/04/2024, 18:05`
fn timestamp(local: DateTime<FixedOffset>) -> String {
    local.format("%d/%m/%Y, %H:%M").to_string()
}

/// `5 p.m.`, `12 a.m.`
pub fn hour_12(hour: u32) -> String {
    let suffix = if hour % 24 < 12 { "a.m." } else { "p.m." };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display} {suffix}")
}

pub fn already_linked(name: &str) -> String {
    format!("✅ Este chat ya está vinculado a tu cuenta ({name}).")
}

pub fn linked(name: &str) -> String {
    format!("✅ ¡Cuenta vinculada! A partir de ahora recibirás tus alertas aquí, {name}.")
}

pub fn latest_voltage(volts: f64, at: DateTime<FixedOffset>) -> String {
    format!(
        "⚡ El último voltaje reportado fue: *{volts:.2} V* (registrado el {})",
        timestamp(at)
    )
}

pub fn latest_power(watts: f64, at: DateTime<FixedOffset>) -> String {
    format!(
        "💡 El último consumo instantáneo fue: *{watts:.2} W* (registrado el {})",
        timestamp(at)
    )
}

pub fn consumption_today(kwh: f64) -> String {
    format!("📊 Tu consumo acumulado de *hoy* es: *{kwh:.3} kWh*")
}

pub fn consumption_yesterday(kwh: f64) -> String {
    format!("🗓️ Tu consumo total de *ayer* fue: *{kwh:.3} kWh*")
}

/// Paragraph appended to the day-consumption replies.
pub fn period_summary(kwh: f64, cost: f64) -> String {
    format!(
        "\n\nLlevas un total de *{kwh:.3} kWh* acumulados en tu periodo actual, con un costo estimado de *${cost:.2}*."
    )
}

pub fn projection(name: &str, p: &BillProjection) -> String {
    format!(
        "¡Hola {name}! Basado en tu consumo hasta hoy, aquí tienes tu proyección para este bimestre:\n\n\
         Llevas *{:.2} kWh* consumidos en {} días.\n\
         Tu promedio es de *{:.2} kWh* por día.\n\n\
         Si continúas a este ritmo, tu proyección de pago de CFE será de aprox.:\n\
         **${:.2} MXN** (IVA incluido).",
        p.kwh_to_date, p.days_elapsed, p.daily_average_kwh, p.projected_cost
    )
}

pub fn base_load(load: &BaseLoad) -> String {
    let verdict = match load.level {
        BaseLoadLevel::Low => {
            "¡Felicidades! Ese es un consumo base muy bajo, probablemente solo tu refrigerador y módems."
        }
        BaseLoadLevel::Normal => {
            "Esto es normal si incluye tu refri, módems y algún decodificador de TV. Si te parece alto, prueba desconectando cargadores o TVs que no estés usando."
        }
        BaseLoadLevel::Elevated => {
            "¡Es un consumo base algo alto! Es muy probable que tengas aparatos como computadoras, consolas o TVs en 'standby' gastando energía sin necesidad. ¡Desconéctalos por la noche y ahorra!"
        }
    };
    format!(
        "Analicé tu consumo de las últimas madrugadas (3-5 AM) para buscar \"consumo fantasma\":\n\n\
         Tu consumo base constante es de **{:.1} Watts**.\n\n{verdict}",
        load.watts
    )
}

pub fn voltage_normal(latest: Option<(f64, DateTime<FixedOffset>)>) -> String {
    match latest {
        Some((volts, at)) => format!("{VOLTAGE_NORMAL}\n\n{}", latest_voltage(volts, at)),
        None => VOLTAGE_NORMAL.to_string(),
    }
}

pub fn peak_hour(peak: &PeakHour) -> String {
    format!(
        "Analizando tu última semana, tu \"hora pico\" de consumo (la hora en que *en promedio* gastas más) es entre las **{} y las {}**, con un consumo promedio de **{:.0} Watts**.",
        hour_12(peak.hour),
        hour_12((peak.hour + 1) % 24),
        peak.mean_watts
    )
}

pub fn next_cutoff(date: NaiveDate) -> String {
    format!(
        "🗓️ Según tu configuración, tu próxima fecha de corte de CFE es el **{}**.",
        long_date(date)
    )
}

pub fn renewal(date: NaiveDate) -> String {
    format!(
        "💳 Tu suscripción a Cuentatrón se renueva el **{}**.",
        long_date(date)
    )
}
