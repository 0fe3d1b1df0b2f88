use crate::error::{CoreError, CoreResult};
use std::cell::Cell;
use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, Month, OffsetDateTime, UtcOffset};

/// Source of "now" for record timestamps. Evaluation reads time only through
/// this trait so runs can be replayed with a pinned clock.
pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> OffsetDateTime {
        (**self).now()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl FixedClock {
    pub fn from_rfc3339(ts: &str) -> CoreResult<Self> {
        Ok(Self(parse_timestamp(ts)?))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Advances by `step` on every read. Used where start/end ordering matters.
#[derive(Debug)]
pub struct SteppingClock {
    next: Cell<OffsetDateTime>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(start: OffsetDateTime, step: Duration) -> Self {
        Self {
            next: Cell::new(start),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> OffsetDateTime {
        let now = self.next.get();
        self.next.set(now + self.step);
        now
    }
}

// Record timestamps are UTC with whole seconds.
pub fn normalize(ts: OffsetDateTime) -> OffsetDateTime {
    let utc = ts.to_offset(UtcOffset::UTC);
    utc.replace_nanosecond(0).unwrap_or(utc)
}

pub fn format_timestamp(ts: OffsetDateTime) -> CoreResult<String> {
    let ts = normalize(ts);
    ts.format(&Rfc3339).map_err(|e| {
        CoreError::InvalidInput(format!("timestamp {} is not representable as RFC3339: {}", ts, e))
    })
}

pub fn parse_timestamp(s: &str) -> CoreResult<OffsetDateTime> {
    OffsetDateTime::parse(s, &Rfc3339)
        .map_err(|e| CoreError::InvalidInput(format!("invalid RFC3339 timestamp {}: {}", s, e)))
}

/// One calendar month later, clamping the day to the length of the target
/// month (Jan 31 -> Feb 28/29).
pub fn add_one_month(ts: OffsetDateTime) -> OffsetDateTime {
    let date = ts.date();
    let (year, month) = match date.month() {
        Month::December => (date.year() + 1, Month::January),
        m => (date.year(), m.next()),
    };
    let day = date.day().min(time::util::days_in_year_month(year, month));
    match Date::from_calendar_date(year, month, day) {
        Ok(d) => ts.replace_date(d),
        Err(_) => ts,
    }
}
