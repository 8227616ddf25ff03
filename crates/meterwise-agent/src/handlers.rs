// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One handler per routed action.
//!
//! Handlers compute a reply from the subscriber record, the time-series
//! source and the billing rules. Escalation is not handled here; the
//! assistant owns that transition.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use meterwise_billing::{BillingCycle, TariffTable, project_bill};
use meterwise_core::{
    ChannelIdentity, Device, FaqResponder, MeasurementField, MessageSender, MeterwiseError,
    Subscriber, SubscriberStore, TimeSeriesSource,
};
use meterwise_metering::{ConsumptionAggregator, Diagnostician, LocalCalendar, VoltageReport};
use meterwise_router::Action;
use tracing::{debug, warn};

use crate::charts::ChartLinks;
use crate::delivery::deliver;
use crate::replies;

/// Days covered by the weekly chart, today included.
const WEEKLY_CHART_DAYS: i64 = 7;

/// What the assistant should do after a handler ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Send these texts in order.
    Reply(Vec<String>),
    /// Hand the conversation to a human agent.
    Escalate,
}

impl HandlerOutcome {
    fn one(text: impl Into<String>) -> Self {
        HandlerOutcome::Reply(vec![text.into()])
    }
}

/// Everything a handler may need about the message being processed.
#[derive(Debug, Clone, Copy)]
pub struct Turn<'a> {
    pub identity: &'a ChannelIdentity,
    pub subscriber: &'a Subscriber,
    pub device: &'a Device,
    pub text: &'a str,
    pub now: DateTime<Utc>,
}

pub struct Handlers {
    store: Arc<dyn SubscriberStore>,
    source: Arc<dyn TimeSeriesSource>,
    sender: Arc<dyn MessageSender>,
    faq: Arc<dyn FaqResponder>,
    aggregator: ConsumptionAggregator,
    diagnostician: Diagnostician,
    tariffs: TariffTable,
    charts: ChartLinks,
}

impl Handlers {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn SubscriberStore>,
        source: Arc<dyn TimeSeriesSource>,
        sender: Arc<dyn MessageSender>,
        faq: Arc<dyn FaqResponder>,
        aggregator: ConsumptionAggregator,
        diagnostician: Diagnostician,
        tariffs: TariffTable,
        charts: ChartLinks,
    ) -> Self {
        Self {
            store,
            source,
            sender,
            faq,
            aggregator,
            diagnostician,
            tariffs,
            charts,
        }
    }

    fn calendar(&self) -> &LocalCalendar {
        self.aggregator.calendar()
    }

    pub async fn run(
        &self,
        action: Action,
        turn: &Turn<'_>,
    ) -> Result<HandlerOutcome, MeterwiseError> {
        debug!(%action, subscriber_id = %turn.subscriber.id, "running handler");
        match action {
            Action::LatestVoltage => self.latest_voltage(turn).await,
            Action::LatestPower => self.latest_power(turn).await,
            Action::ConsumptionToday => self.consumption_today(turn).await,
            Action::ConsumptionYesterday => self.consumption_yesterday(turn).await,
            Action::DailyChart => self.daily_chart(turn).await,
            Action::WeeklyChart => self.weekly_chart(turn).await,
            Action::SetChannelPreference { prefers_telegram } => {
                self.store
                    .set_channel_preference(&turn.subscriber.id, prefers_telegram)
                    .await?;
                Ok(HandlerOutcome::one(if prefers_telegram {
                    replies::PREFER_TELEGRAM
                } else {
                    replies::PREFER_WHATSAPP
                }))
            }
            Action::BillProjection => {
                self.consulting(turn).await;
                self.bill_projection(turn).await
            }
            Action::LeakDiagnosis => {
                self.consulting(turn).await;
                Ok(HandlerOutcome::one(if turn.subscriber.leak_active {
                    replies::LEAK_DETECTED
                } else {
                    replies::NO_LEAK
                }))
            }
            Action::PhantomLoadDiagnosis => {
                self.consulting(turn).await;
                let load = self
                    .diagnostician
                    .base_load(&turn.device.id, turn.now)
                    .await?;
                Ok(HandlerOutcome::one(match load {
                    Some(load) => replies::base_load(&load),
                    None => replies::NO_BASE_LOAD_DATA.to_string(),
                }))
            }
            Action::VoltageDiagnosis => {
                self.consulting(turn).await;
                self.voltage_diagnosis(turn).await
            }
            Action::PeakHour => {
                self.consulting(turn).await;
                let peak = self
                    .diagnostician
                    .peak_hour(&turn.device.id, turn.now)
                    .await?;
                Ok(HandlerOutcome::one(match peak {
                    Some(peak) => replies::peak_hour(&peak),
                    None => replies::NO_PEAK_DATA.to_string(),
                }))
            }
            Action::CutoffDate => {
                let today = self.calendar().date_of(turn.now);
                let sub = turn.subscriber;
                Ok(HandlerOutcome::one(
                    match BillingCycle::for_date(today, sub.cutoff_day, sub.parity) {
                        Ok(cycle) => replies::next_cutoff(cycle.next_cutoff),
                        Err(e) => {
                            warn!(subscriber_id = %sub.id, error = %e, "cutoff date unavailable");
                            replies::NO_CUTOFF.to_string()
                        }
                    },
                ))
            }
            Action::RenewalDate => Ok(HandlerOutcome::one(
                match turn.subscriber.next_payment_date {
                    Some(date) => replies::renewal(date),
                    None => replies::NO_RENEWAL.to_string(),
                },
            )),
            Action::CompanyFaq => {
                self.consulting(turn).await;
                Ok(HandlerOutcome::one(self.faq.answer(turn.text).await?))
            }
            Action::Escalate => Ok(HandlerOutcome::Escalate),
            Action::Help => Ok(HandlerOutcome::one(replies::HELP)),
        }
    }

    async fn consulting(&self, turn: &Turn<'_>) {
        deliver(self.sender.as_ref(), turn.identity, replies::CONSULTING).await;
    }

    async fn latest_voltage(&self, turn: &Turn<'_>) -> Result<HandlerOutcome, MeterwiseError> {
        let sample = self
            .source
            .last_sample(&turn.device.id, MeasurementField::Voltage)
            .await?;
        Ok(HandlerOutcome::one(match sample {
            Some(s) => replies::latest_voltage(s.value, self.calendar().to_local(s.time)),
            None => replies::NO_VOLTAGE_DATA.to_string(),
        }))
    }

    async fn latest_power(&self, turn: &Turn<'_>) -> Result<HandlerOutcome, MeterwiseError> {
        let sample = self
            .source
            .last_sample(&turn.device.id, MeasurementField::Power)
            .await?;
        Ok(HandlerOutcome::one(match sample {
            Some(s) => replies::latest_power(s.value, self.calendar().to_local(s.time)),
            None => replies::NO_POWER_DATA.to_string(),
        }))
    }

    async fn consumption_today(&self, turn: &Turn<'_>) -> Result<HandlerOutcome, MeterwiseError> {
        let today = self.calendar().date_of(turn.now);
        let kwh = self.aggregator.consumption_on(&turn.device.id, today).await?;
        let mut text = match kwh {
            Some(kwh) => replies::consumption_today(kwh),
            None => replies::NO_DATA_TODAY.to_string(),
        };
        text.push_str(&self.period_paragraph(turn).await);
        Ok(HandlerOutcome::Reply(vec![text]))
    }

    async fn consumption_yesterday(
        &self,
        turn: &Turn<'_>,
    ) -> Result<HandlerOutcome, MeterwiseError> {
        let yesterday = self.yesterday(turn.now)?;
        let kwh = self
            .aggregator
            .consumption_on(&turn.device.id, yesterday)
            .await?;
        let mut text = match kwh {
            Some(kwh) => replies::consumption_yesterday(kwh),
            None => replies::NO_DATA_YESTERDAY.to_string(),
        };
        text.push_str(&self.period_paragraph(turn).await);
        Ok(HandlerOutcome::Reply(vec![text]))
    }

    /// Period-to-date summary, or an empty string when it cannot be computed.
    async fn period_paragraph(&self, turn: &Turn<'_>) -> String {
        match self
            .aggregator
            .period_consumption(turn.subscriber, &turn.device.id, turn.now)
            .await
        {
            Ok(period) => {
                let cost = self
                    .tariffs
                    .estimate_cost(period.kwh, &turn.subscriber.tariff_code);
                replies::period_summary(period.kwh, cost)
            }
            Err(e) => {
                warn!(
                    subscriber_id = %turn.subscriber.id,
                    error = %e,
                    "period consumption unavailable"
                );
                String::new()
            }
        }
    }

    async fn daily_chart(&self, turn: &Turn<'_>) -> Result<HandlerOutcome, MeterwiseError> {
        let yesterday = self.yesterday(turn.now)?;
        let samples = self
            .source
            .hourly_means(
                &turn.device.id,
                MeasurementField::Power,
                self.calendar().day_range(yesterday),
            )
            .await?;
        if samples.is_empty() {
            return Ok(HandlerOutcome::one(replies::NO_DAILY_CHART_DATA));
        }
        let url = self.charts.hourly_power(&samples, self.calendar())?;
        Ok(HandlerOutcome::one(url.to_string()))
    }

    async fn weekly_chart(&self, turn: &Turn<'_>) -> Result<HandlerOutcome, MeterwiseError> {
        let today = self.calendar().date_of(turn.now);
        let dates: Vec<NaiveDate> = (0..WEEKLY_CHART_DAYS)
            .rev()
            .filter_map(|back| today.checked_sub_signed(TimeDelta::days(back)))
            .collect();
        let days = self
            .aggregator
            .daily_consumption(&turn.device.id, &dates)
            .await?;
        if days.is_empty() {
            return Ok(HandlerOutcome::one(replies::NO_WEEKLY_CHART_DATA));
        }
        let url = self.charts.daily_energy(&days)?;
        Ok(HandlerOutcome::one(url.to_string()))
    }

    async fn bill_projection(&self, turn: &Turn<'_>) -> Result<HandlerOutcome, MeterwiseError> {
        let sub = turn.subscriber;
        let period = match self
            .aggregator
            .period_consumption(sub, &turn.device.id, turn.now)
            .await
        {
            Ok(period) => period,
            Err(e) => {
                warn!(subscriber_id = %sub.id, error = %e, "bill projection failed");
                return Ok(HandlerOutcome::one(replies::PROJECTION_FAILED));
            }
        };
        let today = self.calendar().date_of(turn.now);
        let projection = project_bill(
            &period.cycle,
            today,
            period.kwh,
            &sub.tariff_code,
            &self.tariffs,
        );
        Ok(HandlerOutcome::one(replies::projection(&sub.name, &projection)))
    }

    async fn voltage_diagnosis(&self, turn: &Turn<'_>) -> Result<HandlerOutcome, MeterwiseError> {
        let report = self
            .diagnostician
            .voltage(turn.subscriber, &turn.device.id)
            .await?;
        Ok(HandlerOutcome::one(match report {
            VoltageReport::High => replies::VOLTAGE_HIGH.to_string(),
            VoltageReport::Low => replies::VOLTAGE_LOW.to_string(),
            VoltageReport::Normal { latest } => replies::voltage_normal(
                latest.map(|s| (s.value, self.calendar().to_local(s.time))),
            ),
        }))
    }

    fn yesterday(&self, now: DateTime<Utc>) -> Result<NaiveDate, MeterwiseError> {
        self.calendar()
            .date_of(now)
            .pred_opt()
            .ok_or_else(|| MeterwiseError::Internal("date out of range".into()))
    }
}
