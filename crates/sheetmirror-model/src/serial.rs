//! Serial date/time conversion.
//!
//! The values API returns date/time cells as a floating-point number of days
//! since 1899-12-30T00:00:00 (the "serial" encoding). The spreadsheet always
//! renders those values in a fixed authoring offset that never observes daylight
//! saving, while the application usually wants them in an IANA zone that does.
//! [`SerialClock`] converts between the two so that the wall-clock reading shown
//! in the sheet is the wall-clock reading returned to callers.

use chrono::{
    DateTime, Datelike, Days, Duration, DurationRound, FixedOffset, NaiveDate, NaiveDateTime,
    TimeZone, Utc,
};
use chrono_tz::Tz;

/// Offset of the default authoring zone (UTC-08:00, standard time only).
pub const DEFAULT_AUTHORING_OFFSET_SECS: i32 = -8 * 60 * 60;

const SECONDS_PER_DAY: f64 = 86_400.0;
const MINUTES_PER_DAY: f64 = 1_440.0;
const SERIAL_TEXT_LEN: usize = 19;
const SERIAL_TEXT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Pair of zones used to interpret serial values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialClock {
    authoring: FixedOffset,
    zone: Tz,
}

impl Default for SerialClock {
    /// UTC-08:00 authoring offset displayed in `America/Vancouver`.
    fn default() -> Self {
        let authoring = FixedOffset::east_opt(DEFAULT_AUTHORING_OFFSET_SECS)
            .expect("default authoring offset is in range");
        Self::new(authoring, chrono_tz::America::Vancouver)
    }
}

impl SerialClock {
    pub fn new(authoring: FixedOffset, zone: Tz) -> Self {
        Self { authoring, zone }
    }

    /// The fixed offset the spreadsheet renders times in.
    pub fn authoring(&self) -> FixedOffset {
        self.authoring
    }

    /// The zone results are expressed in.
    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Serial zero: 1899-12-30T00:00:00 in the authoring zone.
    pub fn epoch(&self) -> DateTime<FixedOffset> {
        self.authoring.from_utc_datetime(&(serial_epoch() - self.authoring_delta()))
    }

    /// Convert a serial date-time into calendar time in [`SerialClock::zone`].
    ///
    /// The value is rounded to the nearest minute before the daylight-saving
    /// adjustment. Negative and non-finite serials are not date-times.
    pub fn serial_to_datetime(&self, serial: f64) -> Option<DateTime<Tz>> {
        let minutes = serial_minutes(serial)?;
        let fixed = self
            .epoch()
            .checked_add_signed(Duration::try_minutes(minutes)?)?;
        Some(dst_adjust(fixed, &self.zone))
    }

    /// Shift an authoring-zone instant so its wall clock survives the move into
    /// [`SerialClock::zone`].
    pub fn dst_adjust(&self, fixed: DateTime<FixedOffset>) -> DateTime<Tz> {
        dst_adjust(fixed, &self.zone)
    }

    /// Parse a formatted date-time (`YYYY-MM-DDTHH:MM:SS`, trailing text ignored)
    /// rendered in the authoring zone.
    pub fn datetime_from_str(&self, text: &str) -> Option<DateTime<Tz>> {
        let naive = parse_serial_text(text)?;
        let fixed = self.authoring.from_local_datetime(&naive).single()?;
        let rounded = fixed.duration_round(Duration::minutes(1)).ok()?;
        Some(dst_adjust(rounded, &self.zone))
    }

    /// Parse a formatted standalone time.
    ///
    /// Standalone times are rendered relative to the serial epoch in UTC
    /// regardless of the spreadsheet's zone; the result is the offset from
    /// midnight once re-expressed in the authoring zone.
    pub fn time_of_day_from_str(&self, text: &str) -> Option<Duration> {
        let naive = parse_serial_text(text)?;
        let local = Utc
            .from_utc_datetime(&naive)
            .with_timezone(&self.authoring)
            .naive_local();
        let midnight = local.date().and_hms_opt(0, 0, 0)?;
        Some(local - midnight)
    }

    fn authoring_delta(&self) -> Duration {
        Duration::seconds(i64::from(self.authoring.local_minus_utc()))
    }
}

/// 1899-12-30T00:00:00 as a wall-clock reading.
pub fn serial_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("serial epoch is a valid date")
}

/// Convert a fractional-day serial into an offset from midnight.
///
/// Only `0 <= serial < 1` is a time of day. The result is rounded to the
/// nearest minute, so values within 30 seconds of 1.0 round up to 24:00.
pub fn serial_to_time_of_day(serial: f64) -> Option<Duration> {
    if !(0.0..1.0).contains(&serial) {
        return None;
    }
    Duration::try_minutes((serial * MINUTES_PER_DAY).round() as i64)
}

/// Serial value of a calendar time, read from its wall clock.
pub fn datetime_to_serial<Z: TimeZone>(dt: &DateTime<Z>) -> f64 {
    let delta = dt.naive_local() - serial_epoch();
    delta.num_milliseconds() as f64 / (SECONDS_PER_DAY * 1_000.0)
}

/// Move `fixed` into `zone`, keeping its wall clock.
///
/// The difference between the wall clock in the fixed zone and in `zone` is
/// applied to the instant before re-expressing it in `zone`. For whole-hour
/// zones this is a shift by whole hours; half-hour zones and historical local
/// mean time offsets are shifted exactly. The difference is computed on full
/// date-times, so an instant near midnight does not wrap into a 23 hour shift.
pub fn dst_adjust(fixed: DateTime<FixedOffset>, zone: &Tz) -> DateTime<Tz> {
    let shown = fixed.with_timezone(zone);
    let drift = fixed.naive_local() - shown.naive_local();
    match fixed.checked_add_signed(drift) {
        Some(shifted) => shifted.with_timezone(zone),
        None => shown,
    }
}

/// Local midnight of the day containing `dt`.
///
/// `None` when midnight does not exist in the zone (a DST gap at 00:00).
pub fn midnight<Z: TimeZone>(dt: &DateTime<Z>) -> Option<DateTime<Z>> {
    let naive = dt.date_naive().and_hms_opt(0, 0, 0)?;
    dt.timezone().from_local_datetime(&naive).earliest()
}

/// Same wall-clock time on the Monday that starts `dt`'s week.
pub fn monday<Z: TimeZone>(dt: &DateTime<Z>) -> Option<DateTime<Z>> {
    let back = u64::from(dt.weekday().num_days_from_monday());
    let date = dt.date_naive().checked_sub_days(Days::new(back))?;
    dt.timezone()
        .from_local_datetime(&date.and_time(dt.time()))
        .earliest()
}

fn serial_minutes(serial: f64) -> Option<i64> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let minutes = (serial * MINUTES_PER_DAY).round();
    // Far beyond any representable calendar date.
    if minutes > 1e15 {
        return None;
    }
    Some(minutes as i64)
}

fn parse_serial_text(text: &str) -> Option<NaiveDateTime> {
    let head = text.get(..SERIAL_TEXT_LEN)?;
    NaiveDateTime::parse_from_str(head, SERIAL_TEXT_FORMAT).ok()
}
