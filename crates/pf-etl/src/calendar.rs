//! Conformed calendar dimensions.
//!
//! Year, month and day surrogate keys are sequential from 1 in chronological
//! order of the distinct dates seen in one run. The time key is the date
//! itself as a `YYYYMMDD` integer.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use pf_core::Locale;

use crate::star::{DimDay, DimMonth, DimTime, DimYear};

const WEEKDAYS_ES: [&str; 7] = [
    "lunes",
    "martes",
    "miércoles",
    "jueves",
    "viernes",
    "sábado",
    "domingo",
];

const WEEKDAYS_EN: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Deterministic time key: `2024-03-15` is `20240315`.
pub fn time_id(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

/// Localized weekday name, Monday first.
pub fn weekday_name(date: NaiveDate, locale: Locale) -> &'static str {
    let idx = date.weekday().num_days_from_monday() as usize;
    match locale {
        Locale::Es => WEEKDAYS_ES[idx],
        Locale::En => WEEKDAYS_EN[idx],
    }
}

/// Localized month name for a month number in `1..=12`.
pub fn month_name(month: u32, locale: Locale) -> &'static str {
    let idx = (month.clamp(1, 12) - 1) as usize;
    match locale {
        Locale::Es => MONTHS_ES[idx],
        Locale::En => MONTHS_EN[idx],
    }
}

/// Calendar quarter (1-4) of a month number.
pub fn quarter(month: u32) -> u32 {
    (month.clamp(1, 12) - 1) / 3 + 1
}

/// The four calendar dimensions built from one set of dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Calendar {
    pub years: Vec<DimYear>,
    pub months: Vec<DimMonth>,
    pub days: Vec<DimDay>,
    pub times: Vec<DimTime>,
}

impl Calendar {
    /// Build the calendar from every date referenced in the run.
    ///
    /// Duplicates are collapsed and the input order does not matter.
    pub fn build(dates: impl IntoIterator<Item = NaiveDate>, locale: Locale) -> Self {
        let dates: BTreeSet<NaiveDate> = dates.into_iter().collect();

        let mut calendar = Calendar::default();
        let mut year_ids: BTreeMap<i32, i64> = BTreeMap::new();
        let mut month_ids: BTreeMap<(i32, u32), i64> = BTreeMap::new();

        // Sorted input means each new year/month/day is seen in chronological
        // order, so ids can be handed out on first sight.
        for date in dates {
            let (year, month) = (date.year(), date.month());

            let year_id = *year_ids.entry(year).or_insert_with(|| {
                let id = calendar.years.len() as i64 + 1;
                calendar.years.push(DimYear { year_id: id, year });
                id
            });

            let month_id = *month_ids.entry((year, month)).or_insert_with(|| {
                let id = calendar.months.len() as i64 + 1;
                calendar.months.push(DimMonth {
                    month_id: id,
                    month_name: month_name(month, locale).to_string(),
                    month_number: month,
                    quarter: quarter(month),
                    year_id,
                });
                id
            });

            // Dates are distinct, so every date is a new day.
            let day_id = calendar.days.len() as i64 + 1;
            calendar.days.push(DimDay {
                day_id,
                day_name: weekday_name(date, locale).to_string(),
                day_number: date.day(),
                month_id,
            });

            calendar.times.push(DimTime {
                time_id: time_id(date),
                date,
                day_id,
            });
        }

        calendar
    }
}

#[cfg(test)]
#[path = "calendar_test.rs"]
mod tests;
