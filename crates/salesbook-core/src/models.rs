//! Domain models for Salesbook

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// A branch code (e.g. "SILOM")
///
/// Codes are stored trimmed and upper-cased so that `silom` and `SILOM`
/// address the same branch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BranchCode(String);

impl<'de> Deserialize<'de> for BranchCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl BranchCode {
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BranchCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Branch restriction for period queries
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BranchFilter {
    /// No branch restriction
    #[default]
    All,
    Branch(BranchCode),
}

impl BranchFilter {
    pub fn matches(&self, branch: &BranchCode) -> bool {
        match self {
            Self::All => true,
            Self::Branch(b) => b == branch,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Branch(b) => b.as_str(),
        }
    }
}

impl std::str::FromStr for BranchFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Branch filter cannot be empty".to_string());
        }
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Branch(BranchCode::new(s)))
        }
    }
}

impl std::fmt::Display for BranchFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for BranchFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BranchFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Sales origination channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    InStore,
    Takeaway,
    Grab,
    LineMan,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InStore => "in_store",
            Self::Takeaway => "takeaway",
            Self::Grab => "grab",
            Self::LineMan => "line_man",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::InStore => "In-store",
            Self::Takeaway => "Takeaway",
            Self::Grab => "Grab",
            Self::LineMan => "LINE MAN",
        }
    }

    pub fn all() -> &'static [Channel] {
        &[Self::InStore, Self::Takeaway, Self::Grab, Self::LineMan]
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coerce an operator-supplied value to a number
///
/// Blank, non-numeric and non-finite input becomes `0.0`. Negative values
/// are kept as-is.
pub fn coerce_number(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let number = match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => coerce_number(&s),
        _ => 0.0,
    };
    Ok(if number.is_finite() { number } else { 0.0 })
}

/// Raw daily inputs as entered by an operator
///
/// Every field defaults to zero when missing or unparseable.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawSalesInput {
    #[serde(default, deserialize_with = "lenient_f64", alias = "targetSales")]
    pub target_sales: f64,
    #[serde(default, deserialize_with = "lenient_f64", alias = "inStoreSales")]
    pub in_store_sales: f64,
    #[serde(default, deserialize_with = "lenient_f64", alias = "taSales")]
    pub ta_sales: f64,
    #[serde(default, deserialize_with = "lenient_f64", alias = "grabSales")]
    pub grab_sales: f64,
    #[serde(default, deserialize_with = "lenient_f64", alias = "lineManSales")]
    pub line_man_sales: f64,
    #[serde(default, deserialize_with = "lenient_f64", alias = "numBills")]
    pub num_bills: f64,
    #[serde(default, deserialize_with = "lenient_f64", alias = "numCustomers")]
    pub num_customers: f64,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        alias = "targetEverestPerBill"
    )]
    pub target_everest_per_bill: f64,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        alias = "targetEverestPerHead"
    )]
    pub target_everest_per_head: f64,
}

impl RawSalesInput {
    /// Field names accepted by `from_fields`, in CSV column order
    pub const FIELDS: [&'static str; 9] = [
        "target_sales",
        "in_store_sales",
        "ta_sales",
        "grab_sales",
        "line_man_sales",
        "num_bills",
        "num_customers",
        "target_everest_per_bill",
        "target_everest_per_head",
    ];

    /// Build from loosely-typed form fields
    ///
    /// Keys may be snake_case or camelCase. Unknown keys are ignored and
    /// values go through [`coerce_number`].
    pub fn from_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut raw = Self::default();
        for (key, value) in fields {
            let value = coerce_number(value);
            match key.trim() {
                "target_sales" | "targetSales" => raw.target_sales = value,
                "in_store_sales" | "inStoreSales" => raw.in_store_sales = value,
                "ta_sales" | "taSales" => raw.ta_sales = value,
                "grab_sales" | "grabSales" => raw.grab_sales = value,
                "line_man_sales" | "lineManSales" => raw.line_man_sales = value,
                "num_bills" | "numBills" => raw.num_bills = value,
                "num_customers" | "numCustomers" => raw.num_customers = value,
                "target_everest_per_bill" | "targetEverestPerBill" => {
                    raw.target_everest_per_bill = value
                }
                "target_everest_per_head" | "targetEverestPerHead" => {
                    raw.target_everest_per_head = value
                }
                _ => {}
            }
        }
        raw
    }

    /// Replace any non-finite value with zero
    pub fn sanitized(mut self) -> Self {
        for field in [
            &mut self.target_sales,
            &mut self.in_store_sales,
            &mut self.ta_sales,
            &mut self.grab_sales,
            &mut self.line_man_sales,
            &mut self.num_bills,
            &mut self.num_customers,
            &mut self.target_everest_per_bill,
            &mut self.target_everest_per_head,
        ] {
            if !field.is_finite() {
                *field = 0.0;
            }
        }
        self
    }

    /// Amount contributed by a single channel
    pub fn channel_amount(&self, channel: Channel) -> f64 {
        match channel {
            Channel::InStore => self.in_store_sales,
            Channel::Takeaway => self.ta_sales,
            Channel::Grab => self.grab_sales,
            Channel::LineMan => self.line_man_sales,
        }
    }
}

/// Figures derived from a [`RawSalesInput`]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SalesMetrics {
    pub total_sales: f64,
    pub sales_difference: f64,
    pub sales_percentage: f64,
    pub everest_per_bill: f64,
    pub everest_per_bill_difference: f64,
    pub everest_per_bill_percentage: f64,
    pub everest_per_head: f64,
    pub everest_per_head_difference: f64,
    pub everest_per_head_percentage: f64,
}

/// Composite store key for a branch/day pair: `BRANCH-YYYY-MM-DD`
pub fn record_key(branch: &BranchCode, date: NaiveDate) -> String {
    format!("{}-{}", branch, date.format("%Y-%m-%d"))
}

/// One branch's sales for one day
///
/// Records are built by [`crate::metrics::compute`], so the derived block
/// always matches the raw inputs. Deserializing a record recomputes the
/// derived block from the raw fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredSalesRecord")]
pub struct SalesRecord {
    branch: BranchCode,
    date: NaiveDate,
    #[serde(flatten)]
    raw: RawSalesInput,
    #[serde(flatten)]
    metrics: SalesMetrics,
    last_updated: DateTime<Utc>,
}

impl SalesRecord {
    pub(crate) fn from_parts(
        branch: BranchCode,
        date: NaiveDate,
        raw: RawSalesInput,
        metrics: SalesMetrics,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            branch,
            date,
            raw,
            metrics,
            last_updated,
        }
    }

    pub fn branch(&self) -> &BranchCode {
        &self.branch
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn raw(&self) -> &RawSalesInput {
        &self.raw
    }

    pub fn metrics(&self) -> &SalesMetrics {
        &self.metrics
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn key(&self) -> String {
        record_key(&self.branch, self.date)
    }

    pub fn total_sales(&self) -> f64 {
        self.metrics.total_sales
    }

    pub fn target_sales(&self) -> f64 {
        self.raw.target_sales
    }
}

/// Wire shape used when reading records back in: raw fields only
#[derive(Deserialize)]
struct StoredSalesRecord {
    branch: BranchCode,
    date: NaiveDate,
    #[serde(flatten)]
    raw: RawSalesInput,
    last_updated: DateTime<Utc>,
}

impl From<StoredSalesRecord> for SalesRecord {
    fn from(stored: StoredSalesRecord) -> Self {
        crate::metrics::compute(stored.branch, stored.date, &stored.raw, stored.last_updated)
    }
}

/// Period and branch selection for aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodQuery {
    pub month: u32,
    pub year: i32,
    #[serde(default)]
    pub branch: BranchFilter,
}

impl PeriodQuery {
    /// Create a query, rejecting months outside 1-12
    pub fn new(month: u32, year: i32, branch: BranchFilter) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidPeriod(format!(
                "month must be between 1 and 12, got {}",
                month
            )));
        }
        Ok(Self {
            month,
            year,
            branch,
        })
    }

    /// Period label, e.g. "2024-03"
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Per-channel sums over a period
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ChannelBreakdown {
    pub in_store: f64,
    pub takeaway: f64,
    pub grab: f64,
    pub line_man: f64,
}

impl ChannelBreakdown {
    pub fn amount(&self, channel: Channel) -> f64 {
        match channel {
            Channel::InStore => self.in_store,
            Channel::Takeaway => self.takeaway,
            Channel::Grab => self.grab,
            Channel::LineMan => self.line_man,
        }
    }

    /// Grab plus LINE MAN
    pub fn delivery(&self) -> f64 {
        self.grab + self.line_man
    }
}

/// A channel's slice of period sales (zero-sum channels are never emitted)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelShare {
    pub channel: Channel,
    pub label: &'static str,
    pub amount: f64,
    pub percentage: f64,
}

/// Per-branch totals within a period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchTotal {
    pub branch: BranchCode,
    pub days: usize,
    pub total_sales: f64,
    pub target_sales: f64,
    pub sales_percentage: f64,
}

/// One chart point per record, in ascending date order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub branch: BranchCode,
    pub total_sales: f64,
    pub target_sales: f64,
    pub sales_percentage: f64,
    pub everest_per_bill: f64,
    pub everest_per_head: f64,
}

/// Aggregated view of a month for a branch filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub month: u32,
    pub year: i32,
    pub branch: BranchFilter,
    /// True when no record matched the filter; all figures are then zero
    pub no_data: bool,
    pub record_count: usize,
    pub monthly_total_sales: f64,
    pub monthly_target_sales: f64,
    pub monthly_sales_difference: f64,
    pub monthly_sales_percentage: f64,
    pub monthly_bills: f64,
    pub monthly_customers: f64,
    pub everest_per_bill: f64,
    pub everest_per_head: f64,
    pub channels: ChannelBreakdown,
    pub channel_shares: Vec<ChannelShare>,
    pub branch_totals: Vec<BranchTotal>,
    pub series: Vec<SeriesPoint>,
}

impl PeriodSummary {
    /// Summary for a filter with no matching records
    pub fn empty(query: &PeriodQuery) -> Self {
        Self {
            month: query.month,
            year: query.year,
            branch: query.branch.clone(),
            no_data: true,
            record_count: 0,
            monthly_total_sales: 0.0,
            monthly_target_sales: 0.0,
            monthly_sales_difference: 0.0,
            monthly_sales_percentage: 0.0,
            monthly_bills: 0.0,
            monthly_customers: 0.0,
            everest_per_bill: 0.0,
            everest_per_head: 0.0,
            channels: ChannelBreakdown::default(),
            channel_shares: vec![],
            branch_totals: vec![],
            series: vec![],
        }
    }
}
