use crate::config::SqlDialect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Hour,
    Day,
    Week,
    Month,
}

impl TimeUnit {
    #[must_use]
    pub fn parse(word: &str) -> Option<Self> {
        match word {
            "hour" => Some(Self::Hour),
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    const fn base(self) -> (WindowUnit, u32) {
        match self {
            Self::Hour => (WindowUnit::Hours, 1),
            Self::Day => (WindowUnit::Days, 1),
            Self::Week => (WindowUnit::Days, 7),
            Self::Month => (WindowUnit::Days, 30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowUnit {
    Hours,
    Days,
}

impl WindowUnit {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hours => "hours",
            Self::Days => "days",
        }
    }
}

/// Look-back window relative to the moment the query runs, in hours or days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub amount: u32,
    pub unit: WindowUnit,
}

impl TimeWindow {
    /// `None` when the normalized amount overflows.
    #[must_use]
    pub fn normalize(value: u32, unit: TimeUnit) -> Option<Self> {
        let (unit, multiplier) = unit.base();
        value
            .checked_mul(multiplier)
            .map(|amount| Self { amount, unit })
    }

    /// Lower-bound expression evaluated by the database at execution time.
    #[must_use]
    pub fn lower_bound_sql(self, dialect: SqlDialect) -> String {
        let amount = self.amount;
        let unit = self.unit.as_str();
        match dialect {
            SqlDialect::Sqlite => format!("datetime('now', '-{amount} {unit}')"),
            SqlDialect::Postgres => format!("NOW() - INTERVAL '{amount} {unit}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TimeUnit, TimeWindow, WindowUnit};
    use crate::config::SqlDialect;

    #[test]
    fn weeks_and_months_normalize_to_days() {
        assert_eq!(
            TimeWindow::normalize(2, TimeUnit::Week),
            Some(TimeWindow {
                amount: 14,
                unit: WindowUnit::Days
            })
        );
        assert_eq!(
            TimeWindow::normalize(1, TimeUnit::Month),
            Some(TimeWindow {
                amount: 30,
                unit: WindowUnit::Days
            })
        );
        assert_eq!(
            TimeWindow::normalize(24, TimeUnit::Hour),
            Some(TimeWindow {
                amount: 24,
                unit: WindowUnit::Hours
            })
        );
    }

    #[test]
    fn overflowing_windows_are_rejected() {
        assert_eq!(TimeWindow::normalize(u32::MAX, TimeUnit::Month), None);
        assert!(TimeWindow::normalize(u32::MAX, TimeUnit::Day).is_some());
    }

    #[test]
    fn renders_relative_bounds_per_dialect() {
        let window = TimeWindow::normalize(3, TimeUnit::Week).expect("window should normalize");

        assert_eq!(
            window.lower_bound_sql(SqlDialect::Sqlite),
            "datetime('now', '-21 days')"
        );
        assert_eq!(
            window.lower_bound_sql(SqlDialect::Postgres),
            "NOW() - INTERVAL '21 days'"
        );
    }

    #[test]
    fn unit_words_parse_in_singular_form_only() {
        assert_eq!(TimeUnit::parse("month"), Some(TimeUnit::Month));
        assert_eq!(TimeUnit::parse("months"), None);
        assert_eq!(TimeUnit::Week.as_str(), "week");
    }
}
