//! Local date range to remote query window conversion.

use chrono::{DateTime, Days, Duration, Local, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::constants::DEFAULT_SYNC_DAYS;
use crate::error::{CalSyncError, CalSyncResult};

/// Inclusive range of local dates in a time zone.
#[derive(Debug, Clone, PartialEq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub tz: Tz,
}

/// Half-open window of instants `[from, to)` used to query the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate, tz: Tz) -> CalSyncResult<Self> {
        if start > end {
            return Err(CalSyncError::InvalidDate(format!(
                "Range starts ({start}) after it ends ({end})"
            )));
        }
        Ok(DateRange { start, end, tz })
    }

    /// Parse `YYYY-MM-DD` bounds.
    /// - `from` defaults to today in `tz`
    /// - `to` defaults to `from + DEFAULT_SYNC_DAYS`
    pub fn from_args(from: Option<&str>, to: Option<&str>, tz: Tz) -> CalSyncResult<Self> {
        let start = match from {
            Some(s) => parse_date(s)?,
            None => Local::now().with_timezone(&tz).date_naive(),
        };

        let end = match to {
            Some(s) => parse_date(s)?,
            None => start
                .checked_add_days(Days::new(DEFAULT_SYNC_DAYS))
                .ok_or_else(|| CalSyncError::InvalidDate(format!("{start} is out of range")))?,
        };

        Self::new(start, end, tz)
    }

    /// Remote window: local midnight of the first day up to local midnight of
    /// the day after the last one.
    pub fn window(&self) -> CalSyncResult<TimeWindow> {
        let after_end = self
            .end
            .checked_add_days(Days::new(1))
            .ok_or_else(|| CalSyncError::InvalidDate(format!("{} is out of range", self.end)))?;

        Ok(TimeWindow {
            from: start_of_day(self.start, self.tz)?,
            to: start_of_day(after_end, self.tz)?,
        })
    }
}

impl TimeWindow {
    pub fn from_rfc3339(&self) -> String {
        self.from.to_rfc3339()
    }

    pub fn to_rfc3339(&self) -> String {
        self.to.to_rfc3339()
    }
}

/// First instant of `date` in `tz`.
///
/// Ambiguous midnights resolve to the earlier instant. When midnight falls
/// in a DST gap the first valid instant after it is used.
fn start_of_day(date: NaiveDate, tz: Tz) -> CalSyncResult<DateTime<Utc>> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| CalSyncError::InvalidDate(date.to_string()))?;

    // DST transitions shift by at most a few hours
    for minutes in (0..=240).step_by(15) {
        let candidate = midnight + Duration::minutes(minutes);
        if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    Err(CalSyncError::InvalidDate(format!(
        "No valid start of day for {date} in {}",
        tz.name()
    )))
}

fn parse_date(s: &str) -> CalSyncResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| CalSyncError::InvalidDate(format!("'{s}'. Expected YYYY-MM-DD")))
}

/// Parse an IANA zone name such as `Australia/Melbourne`.
pub fn parse_tz(name: &str) -> CalSyncResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| CalSyncError::UnknownTimeZone(name.to_string()))
}
