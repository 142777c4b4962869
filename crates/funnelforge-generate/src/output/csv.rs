use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDateTime;

use funnelforge_core::{Event, Subscription, User};

use crate::errors::GenerationError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Write the users table with a fixed column order.
pub fn write_users_csv(path: &Path, users: &[User]) -> Result<u64, GenerationError> {
    let mut writer = open_writer(path)?;
    writer.write_record(["user_id", "signup_timestamp", "acquisition_channel", "country"])?;
    for user in users {
        writer.write_record([
            user.user_id.to_string(),
            format_instant(user.signup_at),
            user.acquisition_channel.as_str().to_string(),
            user.country.as_str().to_string(),
        ])?;
    }
    finish(writer)
}

/// Write the events table. `event_properties` is embedded as a JSON blob in a
/// single column; absent optionals become empty cells.
pub fn write_events_csv(path: &Path, events: &[Event]) -> Result<u64, GenerationError> {
    let mut writer = open_writer(path)?;
    writer.write_record([
        "event_id",
        "user_id",
        "event_name",
        "event_timestamp",
        "device_type",
        "plan_type",
        "experiment_variant",
        "event_properties",
    ])?;
    for event in events {
        writer.write_record([
            event.event_id.to_string(),
            event.user_id.to_string(),
            event.name.as_str().to_string(),
            format_instant(event.occurred_at),
            event.device_type.as_str().to_string(),
            event
                .plan_type
                .map(|plan| plan.as_str().to_string())
                .unwrap_or_default(),
            event
                .experiment_variant
                .map(|variant| variant.as_str().to_string())
                .unwrap_or_default(),
            serde_json::to_string(&event.properties)?,
        ])?;
    }
    finish(writer)
}

/// Write the subscriptions table. A missing end date is an empty cell.
pub fn write_subscriptions_csv(
    path: &Path,
    subscriptions: &[Subscription],
) -> Result<u64, GenerationError> {
    let mut writer = open_writer(path)?;
    writer.write_record([
        "subscription_id",
        "user_id",
        "plan",
        "start_date",
        "end_date",
        "monthly_revenue",
        "status",
    ])?;
    for subscription in subscriptions {
        writer.write_record([
            subscription.subscription_id.to_string(),
            subscription.user_id.to_string(),
            subscription.plan.as_str().to_string(),
            format_instant(subscription.started_at),
            subscription
                .ended_at
                .map(format_instant)
                .unwrap_or_default(),
            format!("{:.2}", subscription.monthly_revenue),
            subscription.status.as_str().to_string(),
        ])?;
    }
    finish(writer)
}

fn format_instant(instant: NaiveDateTime) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

fn open_writer(path: &Path) -> Result<csv::Writer<CountingWriter<BufWriter<File>>>, GenerationError> {
    let writer = BufWriter::new(File::create(path)?);
    Ok(csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(CountingWriter::new(writer)))
}

fn finish(mut writer: csv::Writer<CountingWriter<BufWriter<File>>>) -> Result<u64, GenerationError> {
    writer.flush()?;
    let counting = writer
        .into_inner()
        .map_err(|err| GenerationError::Io(err.into_error()))?;
    Ok(counting.bytes_written())
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
