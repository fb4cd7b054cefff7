//! Maps raw dyno states onto what operators see in chat.
//!
//! Raw states reported by the platform: start-failure, stopping, stopped,
//! waiting, pending, starting, probe-failure, running, app-crashed.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Utc};

use crate::types::{DisplayDyno, DynoRecord};

/// A failing readiness probe is only surfaced once the dyno is older than this.
pub const PROBE_GRACE_SECS: i64 = 90;

const NAME_COLUMN: usize = 26;

pub fn normalize(dyno: &DynoRecord, now: DateTime<Utc>, tz: &FixedOffset) -> DisplayDyno {
    let raw = dyno.state.to_lowercase();

    let (display_state, warning) = match raw.as_str() {
        "start-failure" | "app-crashed" => ("crashed".to_string(), true),
        "waiting" => ("starting".to_string(), false),
        "probe-failure" => {
            let past_grace = dyno
                .created_at
                .is_some_and(|created| now - created > Duration::seconds(PROBE_GRACE_SECS));
            if past_grace {
                ("unhealthy".to_string(), true)
            } else {
                ("starting".to_string(), false)
            }
        }
        _ => (raw, false),
    };

    DisplayDyno {
        dyno_name: format!("{}.{}", dyno.process_type, dyno.name),
        display_state,
        warning,
        updated_at_local: format_local(dyno.updated_at, tz),
    }
}

/// Renders a platform timestamp in the requester's offset. The platform
/// reports "never" as `0001-01-01T00:00:00Z`.
pub fn format_local(at: Option<DateTime<Utc>>, tz: &FixedOffset) -> String {
    match at {
        Some(at) if at.year() > 1 => at
            .with_timezone(tz)
            .format("%-m/%-d/%Y, %-I:%M:%S %p")
            .to_string(),
        _ => "unknown".to_string(),
    }
}

/// Spaces placed between the dyno name and its state so states line up.
pub fn column_padding(dyno_name: &str) -> String {
    let len = dyno_name.chars().count();
    " ".repeat(NAME_COLUMN.saturating_sub(len).max(2))
}
