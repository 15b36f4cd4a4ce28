use crate::{Error, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use std::time::Duration;

/// Next resource version after `current`; an unset version starts at "1".
pub fn increment_resource_version(current: &str) -> Result<String> {
    if current.is_empty() {
        return Ok("1".to_string());
    }
    let version: u64 = current
        .parse()
        .map_err(|_| Error::Internal(format!("Invalid resource version: {}", current)))?;
    version
        .checked_add(1)
        .map(|next| next.to_string())
        .ok_or_else(|| Error::Internal(format!("Resource version overflow: {}", current)))
}

pub fn should_be_deleted(meta: &ObjectMeta) -> bool {
    meta.deletion_timestamp.is_some() && meta.finalizers.as_ref().is_none_or(Vec::is_empty)
}

pub fn ensure_metadata(meta: &mut ObjectMeta, namespace: &str) {
    if namespace.is_empty() {
        meta.namespace = None;
    } else if meta.namespace.is_none() {
        meta.namespace = Some(namespace.to_string());
    }
    if meta.creation_timestamp.is_none() {
        meta.creation_timestamp = Some(now());
    }
    if meta.uid.is_none() {
        meta.uid = Some(uuid::Uuid::new_v4().to_string());
    }
}

pub fn deletion_timestamp_equal(a: &Option<Time>, b: &Option<Time>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.0 == b.0,
        (None, None) => true,
        _ => false,
    }
}

pub fn now() -> Time {
    Time(chrono::Utc::now())
}

/// Render a duration the way Go's `time.Duration` prints, e.g. `1h30m0s` or `250ms`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let nanos = d.subsec_nanos();

    if secs == 0 {
        return match nanos {
            0 => "0s".to_string(),
            n if n < 1_000 => format!("{}ns", n),
            n if n < 1_000_000 => format!("{}µs", with_fraction(n as u64 / 1_000, n % 1_000, 3)),
            n => format!("{}ms", with_fraction(n as u64 / 1_000_000, n % 1_000_000, 6)),
        };
    }

    let seconds = with_fraction(secs % 60, nanos, 9);
    let (hours, minutes) = (secs / 3600, (secs % 3600) / 60);
    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

fn with_fraction(whole: u64, fraction: u32, digits: usize) -> String {
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0width$}", fraction, width = digits);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}
