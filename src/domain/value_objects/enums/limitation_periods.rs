use std::fmt::Display;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LimitationPeriod {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl LimitationPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitationPeriod::Daily => "daily",
            LimitationPeriod::Weekly => "weekly",
            LimitationPeriod::Monthly => "monthly",
            LimitationPeriod::Yearly => "yearly",
        }
    }

    /// Start of the next period strictly after `now`, at 00:00 UTC.
    ///
    /// Weeks start on Monday, months on the 1st, years on January 1st.
    pub fn next_reset_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();

        let next_start = match self {
            LimitationPeriod::Daily => today.succ_opt(),
            LimitationPeriod::Weekly => {
                let days_until_monday = 7 - i64::from(today.weekday().num_days_from_monday());
                today.checked_add_signed(Duration::days(days_until_monday))
            }
            LimitationPeriod::Monthly => {
                if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
                }
            }
            LimitationPeriod::Yearly => NaiveDate::from_ymd_opt(today.year() + 1, 1, 1),
        };

        next_start
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|datetime| datetime.and_utc())
            .unwrap_or_else(|| now + Duration::days(30))
    }
}

impl Display for LimitationPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
