use chrono::{DateTime, Duration, NaiveDate, NaiveTime, SubsecRound, Utc};

use crate::shared::AppError;

/// Time window used to filter expenses by timestamp
#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseRange {
    AllTime,
    LastWeek,
    LastMonth,
    LastThreeMonths,
    Custom {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Concrete inclusive bounds; `None` means unbounded on that side
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| *timestamp >= start)
            && self.end.map_or(true, |end| *timestamp <= end)
    }
}

impl ExpenseRange {
    fn look_back_days(&self) -> Option<i64> {
        match self {
            ExpenseRange::LastWeek => Some(7),
            ExpenseRange::LastMonth => Some(30),
            ExpenseRange::LastThreeMonths => Some(90),
            _ => None,
        }
    }

    /// Resolves the range against `now`. Look-back windows are `[now - N days, now]`.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<TimeWindow, AppError> {
        if let Some(days) = self.look_back_days() {
            return Ok(TimeWindow {
                start: Some(now - Duration::days(days)),
                end: Some(now),
            });
        }

        match self {
            ExpenseRange::Custom { start, end } if start > end => Err(AppError::InvalidRange(
                format!("start {} is after end {}", start, end),
            )),
            ExpenseRange::Custom { start, end } => Ok(TimeWindow {
                start: Some(*start),
                end: Some(*end),
            }),
            _ => Ok(TimeWindow::default()),
        }
    }

    /// Builds a range from query-string parts. A missing name means all time.
    pub fn parse(
        name: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Self, AppError> {
        let name = name.map(str::trim).unwrap_or("all_time");

        let range = match name {
            "all_time" | "" => ExpenseRange::AllTime,
            "last_week" => ExpenseRange::LastWeek,
            "last_month" => ExpenseRange::LastMonth,
            "last_three_months" | "last_3_months" => ExpenseRange::LastThreeMonths,
            "custom" => {
                let start = start
                    .ok_or_else(|| AppError::InvalidRange("custom range needs a start".into()))?;
                let end =
                    end.ok_or_else(|| AppError::InvalidRange("custom range needs an end".into()))?;

                ExpenseRange::Custom {
                    start: parse_bound(start, Bound::Start)?,
                    end: parse_bound(end, Bound::End)?,
                }
            }
            other => {
                return Err(AppError::InvalidRange(format!(
                    "unknown range '{}'",
                    other
                )))
            }
        };

        Ok(range)
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

/// Accepts RFC 3339 or a bare `YYYY-MM-DD`. A bare date covers the whole UTC day.
fn parse_bound(value: &str, bound: Bound) -> Result<DateTime<Utc>, AppError> {
    let value = value.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc).trunc_subsecs(6));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidRange(format!("cannot parse date '{}'", value)))?;

    let start_of_day = date.and_time(NaiveTime::MIN).and_utc();
    match bound {
        Bound::Start => Ok(start_of_day),
        Bound::End => start_of_day
            .checked_add_signed(Duration::days(1))
            .map(|next_day| next_day - Duration::microseconds(1))
            .ok_or_else(|| AppError::InvalidRange(format!("date '{}' is out of range", value))),
    }
}
