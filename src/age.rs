//! Account age, rendered as "X years, Y months, Z days".
//!
//! The span is counted in whole calendar months first and the remainder in
//! days, so month lengths and leap years fall out of chrono's own month
//! arithmetic.

use chrono::{DateTime, Datelike, Months, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarSpan {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl CalendarSpan {
    /// `None` when `end` precedes `start`.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        if end < start {
            return None;
        }

        let mut total_months = (end.year() - start.year()) * 12 + end.month() as i32
            - start.month() as i32;
        if end.day() < start.day() {
            total_months -= 1;
        }

        // Clamps to the last day of the month, e.g. Jan 31 + 1 month = Feb 28/29.
        let mut anchor = start.checked_add_months(Months::new(total_months as u32))?;
        if anchor > end {
            total_months -= 1;
            anchor = start.checked_add_months(Months::new(total_months as u32))?;
        }

        let days = (end - anchor).num_days();

        Some(Self {
            years: total_months as u32 / 12,
            months: total_months as u32 % 12,
            days: days as u32,
        })
    }
}

impl std::fmt::Display for CalendarSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} year{}, {} month{}, {} day{}",
            self.years,
            plural(self.years),
            self.months,
            plural(self.months),
            self.days,
            plural(self.days)
        )
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// How long an account created at `created_at` (RFC 3339) has existed on `today`.
pub fn member_for(created_at: &str, today: NaiveDate) -> Option<String> {
    let created = DateTime::parse_from_rfc3339(created_at).ok()?.date_naive();
    CalendarSpan::between(created, today).map(|span| span.to_string())
}
