use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime};

use crate::ValidationError;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Calendar day used as the snapshot key, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(Date);

impl DateKey {
    /// Current UTC calendar day.
    pub fn today() -> Self {
        Self(OffsetDateTime::now_utc().date())
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        Date::parse(input.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate {
                value: input.to_owned(),
            })
    }

    /// Parse `input`, falling back to today when it is absent or blank.
    pub fn parse_or_today(input: Option<&str>) -> Result<Self, ValidationError> {
        match input.map(str::trim) {
            Some(value) if !value.is_empty() => Self::parse(value),
            _ => Ok(Self::today()),
        }
    }

    pub fn next_day(self) -> Option<Self> {
        self.0.next_day().map(Self)
    }

    pub fn days_before(self, days: u32) -> Option<Self> {
        self.0.checked_sub(Duration::days(i64::from(days))).map(Self)
    }

    /// Every day in `[from, to]`, in order, spanning at most `max_days`.
    pub fn range_inclusive(
        from: Self,
        to: Self,
        max_days: u32,
    ) -> Result<Vec<Self>, ValidationError> {
        if from > to {
            return Err(ValidationError::InvalidDateRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let span = (to.0 - from.0).whole_days() + 1;
        if span > i64::from(max_days) {
            return Err(ValidationError::DateRangeTooLong {
                days: span,
                max: max_days,
            });
        }

        let mut days = Vec::new();
        let mut current = Some(from);
        while let Some(day) = current.filter(|day| *day <= to) {
            days.push(day);
            current = day.next_day();
        }
        Ok(days)
    }

    pub fn format_key(self) -> String {
        // The format has no components that can fail for a valid Date.
        self.0
            .format(DATE_FORMAT)
            .unwrap_or_else(|_| String::from("<unformattable>"))
    }
}

impl Display for DateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_key())
    }
}

impl Serialize for DateKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_key())
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}
