//! Calendar bucketing of transactions for the statistics view.
//!
//! Buckets are UTC calendar periods ending with the one containing "now".
//! Weeks start on Monday. Membership is half-open: `start <= ts < end`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::transactions::{Transaction, TransactionStatus, TransactionType};


/// Upper bound for an explicit period count
pub const MAX_PERIODS: u32 = 1_000;
/// Upper bound for "all history"; roughly a century of days
pub const MAX_HISTORY_PERIODS: u32 = 36_600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Day,
    Week,
    Month,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Day => "day",
            Timeframe::Week => "week",
            Timeframe::Month => "month",
        }
    }

    /// Period length used to size "all history" windows; months count as 30 days
    pub fn approximate_length(&self) -> Duration {
        match self {
            Timeframe::Day => Duration::days(1),
            Timeframe::Week => Duration::days(7),
            Timeframe::Month => Duration::days(30),
        }
    }

    /// First day of the period containing `date`
    fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Timeframe::Day => date,
            Timeframe::Week => {
                let offset = date.weekday().num_days_from_monday();
                date - Duration::days(i64::from(offset))
            }
            Timeframe::Month => date.with_day(1).unwrap_or(date),
        }
    }

    fn shift(&self, start: NaiveDate, periods: i64) -> Option<NaiveDate> {
        match self {
            Timeframe::Day => start.checked_add_signed(Duration::days(periods)),
            Timeframe::Week => start.checked_add_signed(Duration::days(periods.checked_mul(7)?)),
            Timeframe::Month => {
                let months = Months::new(u32::try_from(periods.unsigned_abs()).ok()?);
                if periods >= 0 {
                    start.checked_add_months(months)
                } else {
                    start.checked_sub_months(months)
                }
            }
        }
    }

    /// Whole calendar periods from the one containing `from` to the one containing `to`
    fn periods_between(&self, from: NaiveDate, to: NaiveDate) -> i64 {
        let (from, to) = (self.period_start(from), self.period_start(to));
        match self {
            Timeframe::Day => (to - from).num_days(),
            Timeframe::Week => (to - from).num_days() / 7,
            Timeframe::Month => {
                let index =
                    |date: NaiveDate| i64::from(date.year()) * 12 + i64::from(date.month0());
                index(to) - index(from)
            }
        }
    }

    fn label(&self, start: NaiveDate) -> String {
        match self {
            Timeframe::Day => start.format("%Y-%m-%d").to_string(),
            Timeframe::Week => start.format("Week of %Y-%m-%d").to_string(),
            Timeframe::Month => start.format("%B %Y").to_string(),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Timeframe::Day),
            "week" | "weekly" => Ok(Timeframe::Week),
            "month" | "monthly" => Ok(Timeframe::Month),
            other => Err(anyhow::anyhow!(
                "Invalid timeframe '{}': expected day, week or month",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Periods {
    Count(u32),
    /// Enough periods to reach back to the earliest transaction
    All,
}

impl FromStr for Periods {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Periods::All);
        }

        match s.parse::<u32>() {
            Ok(count) if (1..=MAX_PERIODS).contains(&count) => Ok(Periods::Count(count)),
            _ => Err(anyhow::anyhow!(
                "Invalid periods '{}': expected 'all' or a number between 1 and {}",
                s,
                MAX_PERIODS
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatBucket {
    pub period_label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub total_count: usize,
    /// Completed transactions only
    pub total_volume_msat: u64,
    pub per_type_counts: BTreeMap<TransactionType, usize>,
    pub per_status_counts: BTreeMap<TransactionStatus, usize>,
}

impl StatBucket {
    fn empty(timeframe: Timeframe, start: NaiveDate, end: NaiveDate) -> Option<Self> {
        Some(Self {
            period_label: timeframe.label(start),
            start: midnight(start)?,
            end: midnight(end)?,
            total_count: 0,
            total_volume_msat: 0,
            per_type_counts: TransactionType::ALL.iter().map(|t| (*t, 0)).collect(),
            per_status_counts: TransactionStatus::ALL.iter().map(|s| (*s, 0)).collect(),
        })
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        self.start <= *timestamp && *timestamp < self.end
    }

    fn add(&mut self, transaction: &Transaction) {
        self.total_count += 1;
        self.total_volume_msat = self
            .total_volume_msat
            .saturating_add(transaction.settled_amount_msat());
        *self.per_type_counts.entry(transaction.tx_type).or_default() += 1;
        *self.per_status_counts.entry(transaction.status).or_default() += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_transactions: usize,
    pub total_volume_msat: u64,
    pub avg_volume_per_period: f64,
    /// Percentage of settled transactions that completed
    pub success_rate: f64,
    pub most_active_type: Option<TransactionType>,
    pub period_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub timeframe: Timeframe,
    pub buckets: Vec<StatBucket>,
    pub summary: StatsSummary,
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Number of buckets `periods` resolves to for `transactions`
pub fn effective_period_count(
    transactions: &[Transaction],
    timeframe: Timeframe,
    periods: Periods,
    now: DateTime<Utc>,
) -> u32 {
    match periods {
        Periods::Count(count) => count,
        Periods::All => {
            let Some(earliest) = transactions.iter().map(|tx| tx.timestamp).min() else {
                return 1;
            };

            let elapsed_ms = (now - earliest).num_milliseconds().max(0);
            let period_ms = timeframe.approximate_length().num_milliseconds();
            let approximate = (elapsed_ms + period_ms - 1) / period_ms;
            // 30-day months can fall one short of the calendar month holding `earliest`
            let calendar = timeframe.periods_between(earliest.date_naive(), now.date_naive());

            u32::try_from(approximate.max(calendar))
                .unwrap_or(u32::MAX)
                .saturating_add(1)
                .min(MAX_HISTORY_PERIODS)
        }
    }
}

/// Bucket `transactions` into consecutive periods ending with the current one, oldest first
pub fn bucketize(
    transactions: &[Transaction],
    timeframe: Timeframe,
    periods: Periods,
    now: DateTime<Utc>,
) -> Vec<StatBucket> {
    let count = effective_period_count(transactions, timeframe, periods, now);
    let current = timeframe.period_start(now.date_naive());

    let mut buckets: Vec<StatBucket> = (0..i64::from(count))
        .rev()
        .filter_map(|back| {
            let start = timeframe.shift(current, -back)?;
            let end = timeframe.shift(start, 1)?;
            StatBucket::empty(timeframe, start, end)
        })
        .collect();

    for transaction in transactions {
        let after = buckets.partition_point(|bucket| bucket.start <= transaction.timestamp);
        if let Some(bucket) = after.checked_sub(1).and_then(|index| buckets.get_mut(index)) {
            if bucket.contains(&transaction.timestamp) {
                bucket.add(transaction);
            }
        }
    }

    buckets
}

/// Totals over `buckets`; `period_count` is the divisor for the per-period average
pub fn summarize(buckets: &[StatBucket], period_count: usize) -> StatsSummary {
    let total_transactions = buckets.iter().map(|bucket| bucket.total_count).sum();
    let total_volume_msat = buckets
        .iter()
        .fold(0u64, |total, bucket| total.saturating_add(bucket.total_volume_msat));

    let status_total = |status: TransactionStatus| -> usize {
        buckets
            .iter()
            .map(|bucket| bucket.per_status_counts.get(&status).copied().unwrap_or(0))
            .sum()
    };
    let completed = status_total(TransactionStatus::Completed);
    let failed = status_total(TransactionStatus::Failed);

    let success_rate = if completed + failed == 0 {
        0.0
    } else {
        completed as f64 / (completed + failed) as f64 * 100.0
    };

    let avg_volume_per_period = if period_count == 0 {
        0.0
    } else {
        total_volume_msat as f64 / period_count as f64
    };

    let type_total = |tx_type: &TransactionType| -> usize {
        buckets
            .iter()
            .map(|bucket| bucket.per_type_counts.get(tx_type).copied().unwrap_or(0))
            .sum()
    };
    // Ties go to the lexically smallest type name
    let most_active_type = TransactionType::ALL
        .iter()
        .map(|tx_type| (*tx_type, type_total(tx_type)))
        .filter(|(_, count)| *count > 0)
        .max_by(|(a, a_count), (b, b_count)| {
            a_count
                .cmp(b_count)
                .then_with(|| b.as_str().cmp(a.as_str()))
        })
        .map(|(tx_type, _)| tx_type);

    StatsSummary {
        total_transactions,
        total_volume_msat,
        avg_volume_per_period,
        success_rate,
        most_active_type,
        period_count,
    }
}

pub fn build_report(
    transactions: &[Transaction],
    timeframe: Timeframe,
    periods: Periods,
    now: DateTime<Utc>,
) -> StatsReport {
    let buckets = bucketize(transactions, timeframe, periods, now);
    let period_count = match periods {
        Periods::Count(count) => count as usize,
        Periods::All => buckets.len(),
    };
    let summary = summarize(&buckets, period_count);

    StatsReport {
        timeframe,
        buckets,
        summary,
    }
}
