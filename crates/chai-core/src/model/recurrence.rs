use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The units a recurrence rule can advance by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Day,
    Week,
    Weekday,
    Month,
}

impl Unit {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Weekday => "weekday",
            Self::Month => "month",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recurrence rule of the form "every N units".
///
/// The next occurrence is always computed from the previous due date,
/// never from the completion time, so the cadence does not drift when a
/// task is finished late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub interval: u32,
    pub unit: Unit,
}

impl Recurrence {
    /// Due date of the next occurrence, advanced from `from`.
    ///
    /// `Weekday` advances one working day at a time, skipping Saturday and
    /// Sunday. `Month` uses calendar-month addition with end-of-month
    /// clamping (Jan 31 + 1 month = Feb 28/29).
    #[must_use]
    pub fn next_due(&self, from: NaiveDate) -> NaiveDate {
        match self.unit {
            Unit::Day => from
                .checked_add_days(Days::new(u64::from(self.interval)))
                .unwrap_or(from),
            Unit::Week => from
                .checked_add_days(Days::new(u64::from(self.interval) * 7))
                .unwrap_or(from),
            Unit::Weekday => advance_weekdays(from, self.interval),
            Unit::Month => from
                .checked_add_months(Months::new(self.interval))
                .unwrap_or(from),
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.interval == 1 {
            write!(f, "every {}", self.unit)
        } else {
            write!(f, "every {} {}s", self.interval, self.unit)
        }
    }
}

impl FromStr for Recurrence {
    type Err = ParseRecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let err = || ParseRecurrenceError { got: s.to_string() };

        match normalized.as_str() {
            "daily" => {
                return Ok(Self {
                    interval: 1,
                    unit: Unit::Day,
                });
            }
            "weekly" => {
                return Ok(Self {
                    interval: 1,
                    unit: Unit::Week,
                });
            }
            "monthly" => {
                return Ok(Self {
                    interval: 1,
                    unit: Unit::Month,
                });
            }
            _ => {}
        }

        // The "every" prefix is optional so `--every "3 days"` reads
        // naturally on the command line.
        let rest = normalized.strip_prefix("every").unwrap_or(&normalized);
        let mut parts = rest.split_whitespace();
        let first = parts.next().ok_or_else(err)?;

        let (interval, unit_token) = match first.parse::<u32>() {
            Ok(n) => (n, parts.next().ok_or_else(err)?),
            Err(_) => (1, first),
        };

        if interval == 0 || parts.next().is_some() {
            return Err(err());
        }

        let unit = match unit_token {
            "day" | "days" => Unit::Day,
            "week" | "weeks" => Unit::Week,
            "weekday" | "weekdays" => Unit::Weekday,
            "month" | "months" => Unit::Month,
            _ => return Err(err()),
        };

        Ok(Self { interval, unit })
    }
}

fn advance_weekdays(mut date: NaiveDate, steps: u32) -> NaiveDate {
    for _ in 0..steps {
        date = next_weekday(date);
    }
    date
}

fn next_weekday(date: NaiveDate) -> NaiveDate {
    let mut next = date;
    loop {
        let Some(candidate) = next.succ_opt() else {
            // Calendar end; nothing sensible to advance to.
            return next;
        };
        next = candidate;
        if !matches!(next.weekday(), Weekday::Sat | Weekday::Sun) {
            return next;
        }
    }
}

/// Error returned when parsing a recurrence rule from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRecurrenceError {
    pub got: String,
}

impl fmt::Display for ParseRecurrenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid recurrence rule: '{}' (expected \"every [N] day|week|weekday|month\")",
            self.got
        )
    }
}

impl std::error::Error for ParseRecurrenceError {}

#[cfg(test)]
mod tests {
    use super::{Recurrence, Unit};
    use chrono::{Datelike, NaiveDate, Weekday};
    use proptest::prelude::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_accepts_rule_grammar() {
        assert_eq!(
            Recurrence::from_str("every 3 days").unwrap(),
            Recurrence {
                interval: 3,
                unit: Unit::Day
            }
        );
        assert_eq!(
            Recurrence::from_str("every week").unwrap(),
            Recurrence {
                interval: 1,
                unit: Unit::Week
            }
        );
        assert_eq!(
            Recurrence::from_str("Every Weekday").unwrap(),
            Recurrence {
                interval: 1,
                unit: Unit::Weekday
            }
        );
        assert_eq!(
            Recurrence::from_str("every 2 months").unwrap(),
            Recurrence {
                interval: 2,
                unit: Unit::Month
            }
        );
    }

    #[test]
    fn parse_accepts_shorthands() {
        assert_eq!(
            Recurrence::from_str("daily").unwrap(),
            Recurrence {
                interval: 1,
                unit: Unit::Day
            }
        );
        assert_eq!(
            Recurrence::from_str("weekly").unwrap(),
            Recurrence {
                interval: 1,
                unit: Unit::Week
            }
        );
        assert_eq!(
            Recurrence::from_str("monthly").unwrap(),
            Recurrence {
                interval: 1,
                unit: Unit::Month
            }
        );
    }

    #[test]
    fn parse_accepts_bare_rules_without_every() {
        assert_eq!(
            Recurrence::from_str("3 days").unwrap(),
            Recurrence {
                interval: 3,
                unit: Unit::Day
            }
        );
        assert_eq!(
            Recurrence::from_str("weekday").unwrap(),
            Recurrence {
                interval: 1,
                unit: Unit::Weekday
            }
        );
    }

    #[test]
    fn parse_rejects_invalid_rules() {
        assert!(Recurrence::from_str("sometimes").is_err());
        assert!(Recurrence::from_str("every").is_err());
        assert!(Recurrence::from_str("every 0 days").is_err());
        assert!(Recurrence::from_str("every 3 fortnights").is_err());
        assert!(Recurrence::from_str("every 3 days extra").is_err());
    }

    #[test]
    fn display_parse_roundtrips() {
        for rule in [
            Recurrence {
                interval: 1,
                unit: Unit::Day,
            },
            Recurrence {
                interval: 7,
                unit: Unit::Day,
            },
            Recurrence {
                interval: 2,
                unit: Unit::Week,
            },
            Recurrence {
                interval: 1,
                unit: Unit::Weekday,
            },
            Recurrence {
                interval: 3,
                unit: Unit::Month,
            },
        ] {
            let rendered = rule.to_string();
            let reparsed = Recurrence::from_str(&rendered).unwrap();
            assert_eq!(rule, reparsed, "rendered as '{rendered}'");
        }
    }

    #[test]
    fn next_due_advances_days_and_weeks() {
        let rule = Recurrence {
            interval: 7,
            unit: Unit::Day,
        };
        assert_eq!(rule.next_due(date(2024, 1, 1)), date(2024, 1, 8));

        let rule = Recurrence {
            interval: 2,
            unit: Unit::Week,
        };
        assert_eq!(rule.next_due(date(2024, 1, 1)), date(2024, 1, 15));
    }

    #[test]
    fn next_due_weekday_skips_weekends() {
        let rule = Recurrence {
            interval: 1,
            unit: Unit::Weekday,
        };
        // 2024-01-05 is a Friday; the next weekday is Monday the 8th.
        assert_eq!(rule.next_due(date(2024, 1, 5)), date(2024, 1, 8));
        // From a Saturday the next weekday is also Monday.
        assert_eq!(rule.next_due(date(2024, 1, 6)), date(2024, 1, 8));

        let rule = Recurrence {
            interval: 5,
            unit: Unit::Weekday,
        };
        // A full working week from Monday lands on the next Monday.
        assert_eq!(rule.next_due(date(2024, 1, 8)), date(2024, 1, 15));
    }

    #[test]
    fn next_due_month_clamps_to_month_end() {
        let rule = Recurrence {
            interval: 1,
            unit: Unit::Month,
        };
        assert_eq!(rule.next_due(date(2024, 1, 31)), date(2024, 2, 29));
        assert_eq!(rule.next_due(date(2023, 1, 31)), date(2023, 2, 28));
        assert_eq!(rule.next_due(date(2024, 3, 15)), date(2024, 4, 15));
    }

    proptest! {
        #[test]
        fn next_due_is_strictly_later(
            days in 0i32..20_000,
            interval in 1u32..24,
            unit_idx in 0usize..4,
        ) {
            let unit = [Unit::Day, Unit::Week, Unit::Weekday, Unit::Month][unit_idx];
            let from = date(2000, 1, 1) + chrono::Days::new(u64::try_from(days).unwrap());
            let rule = Recurrence { interval, unit };
            prop_assert!(rule.next_due(from) > from);
        }

        #[test]
        fn weekday_rule_never_lands_on_weekend(
            days in 0i32..20_000,
            interval in 1u32..24,
        ) {
            let from = date(2000, 1, 1) + chrono::Days::new(u64::try_from(days).unwrap());
            let rule = Recurrence { interval, unit: Unit::Weekday };
            let next = rule.next_due(from);
            prop_assert!(!matches!(next.weekday(), Weekday::Sat | Weekday::Sun));
        }
    }
}
