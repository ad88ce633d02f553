//! Quote of the day.

use chrono::{Datelike, NaiveDate};

pub const QUOTES: [&str; 3] = [
    "The only way to do great work is to love what you do.",
    "Success is not final, failure is not fatal: it is the courage to continue that counts.",
    "Discipline is choosing between what you want now and what you want most.",
];

/// Deterministic pick: the same quote all day, rotating by day of month
pub fn quote_for(date: NaiveDate) -> &'static str {
    QUOTES[date.day() as usize % QUOTES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_rotates_by_day_of_month() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
        assert_eq!(quote_for(day(3)), QUOTES[0]);
        assert_eq!(quote_for(day(1)), QUOTES[1]);
        assert_eq!(quote_for(day(2)), QUOTES[2]);
        assert_eq!(quote_for(day(4)), quote_for(NaiveDate::from_ymd_opt(2023, 1, 4).unwrap()));
    }
}
