//! Month-by-month activity of the interaction log

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use statrs::statistics::Statistics;

use crate::data::Interaction;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Calendar month used to bucket interactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Month of a timestamp in any of the layouts the exports use
    /// (RFC 3339, `YYYY-MM-DD HH:MM:SS`, bare date). The month is taken in the
    /// timestamp's own offset.
    pub fn parse(timestamp: &str) -> Option<Self> {
        let timestamp = timestamp.trim();
        if timestamp.is_empty() {
            return None;
        }

        let date = DateTime::parse_from_rfc3339(timestamp)
            .map(|dt| dt.date_naive())
            .ok()
            .or_else(|| {
                DATETIME_FORMATS
                    .iter()
                    .find_map(|format| NaiveDateTime::parse_from_str(timestamp, format).ok())
                    .map(|dt| dt.date())
            })
            .or_else(|| NaiveDate::parse_from_str(timestamp, "%Y-%m-%d").ok())?;

        Some(Self {
            year: date.year(),
            month: date.month(),
        })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Activity within one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyActivity {
    pub month: YearMonth,
    pub interactions: usize,
    /// Distinct developers appearing as source or target
    pub active_developers: usize,
}

/// Shape of the monthly interaction series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalStatistics {
    pub start: YearMonth,
    pub end: YearMonth,
    /// Months with at least one interaction
    pub month_count: usize,
    pub mean_per_month: f64,
    /// Sample standard deviation; None with a single month
    pub std_per_month: Option<f64>,
    pub peak_month: YearMonth,
    pub peak_count: usize,
    pub valley_month: YearMonth,
    pub valley_count: usize,
    /// Last month against first month, in percent
    pub growth_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalReport {
    pub monthly: Vec<MonthlyActivity>,
    /// None when no timestamp could be parsed
    pub statistics: Option<TemporalStatistics>,
    pub unparsed_timestamps: usize,
}

/// Bucket interactions by month, oldest first. Interactions whose timestamp
/// does not parse are skipped; their count is returned alongside.
pub fn monthly_activity(interactions: &[Interaction]) -> (Vec<MonthlyActivity>, usize) {
    let mut months: BTreeMap<YearMonth, (usize, HashSet<&str>)> = BTreeMap::new();
    let mut unparsed = 0;

    for interaction in interactions {
        let Some(month) = YearMonth::parse(&interaction.timestamp) else {
            unparsed += 1;
            continue;
        };
        let (count, developers) = months.entry(month).or_default();
        *count += 1;
        developers.insert(interaction.source.as_str());
        developers.insert(interaction.target.as_str());
    }

    let monthly = months
        .into_iter()
        .map(|(month, (interactions, developers))| MonthlyActivity {
            month,
            interactions,
            active_developers: developers.len(),
        })
        .collect();

    (monthly, unparsed)
}

/// Summary of a month series ordered oldest first. Peak and valley ties go
/// to the earliest month.
pub fn temporal_statistics(monthly: &[MonthlyActivity]) -> Option<TemporalStatistics> {
    let first = monthly.first()?;
    let last = monthly.last()?;

    let mut peak = first;
    let mut valley = first;
    for month in monthly {
        if month.interactions > peak.interactions {
            peak = month;
        }
        if month.interactions < valley.interactions {
            valley = month;
        }
    }

    let counts: Vec<f64> = monthly.iter().map(|m| m.interactions as f64).collect();
    let std_per_month = (counts.len() > 1).then(|| counts.iter().std_dev());

    Some(TemporalStatistics {
        start: first.month,
        end: last.month,
        month_count: monthly.len(),
        mean_per_month: counts.iter().mean(),
        std_per_month,
        peak_month: peak.month,
        peak_count: peak.interactions,
        valley_month: valley.month,
        valley_count: valley.interactions,
        growth_pct: (last.interactions as f64 / first.interactions as f64 - 1.0) * 100.0,
    })
}

pub fn analyze_temporal(interactions: &[Interaction]) -> TemporalReport {
    let (monthly, unparsed_timestamps) = monthly_activity(interactions);

    if unparsed_timestamps > 0 {
        log::debug!(
            "{} interactions have no parseable timestamp and were left out of the monthly series",
            unparsed_timestamps
        );
    }

    let statistics = temporal_statistics(&monthly);
    match &statistics {
        Some(stats) => log::info!(
            "Interaction log spans {} to {} ({} active months)",
            stats.start,
            stats.end,
            stats.month_count
        ),
        None => log::warn!("No interaction timestamp could be parsed, skipping temporal statistics"),
    }

    TemporalReport {
        monthly,
        statistics,
        unparsed_timestamps,
    }
}
