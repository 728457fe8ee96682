//! Search query construction

use chrono::NaiveDate;

/// Field the API sorts results by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortCriterion {
    Relevance,
    LastUpdatedDate,
    #[default]
    SubmittedDate,
}

impl SortCriterion {
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::LastUpdatedDate => "lastUpdatedDate",
            Self::SubmittedDate => "submittedDate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }
}

/// Inclusive range of submission days.
///
/// Rendered with fixed day boundaries: `START0000 TO END2359`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Returns `None` when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// The local calendar day before `today`.
    pub fn day_before(today: NaiveDate) -> Self {
        Self::day(today.pred_opt().unwrap_or(today))
    }

    /// Yesterday in local time.
    pub fn yesterday() -> Self {
        Self::day_before(chrono::Local::now().date_naive())
    }

    /// Everything submitted up to and including `end`.
    ///
    /// Starts at 1999-01-01, before the earliest arXiv submission.
    pub fn until(end: NaiveDate) -> Self {
        let start = NaiveDate::from_ymd_opt(1999, 1, 1).map_or(end, |first| first.min(end));
        Self { start, end }
    }

    /// `submittedDate:[YYYYMMDD0000 TO YYYYMMDD2359]`
    pub fn filter(&self) -> String {
        format!(
            "submittedDate:[{}0000 TO {}2359]",
            self.start.format("%Y%m%d"),
            self.end.format("%Y%m%d")
        )
    }
}

/// A search against the export API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Search {
    pub query: String,
    pub max_results: usize,
    pub sort_by: SortCriterion,
    pub sort_order: SortOrder,
    pub date_range: Option<DateRange>,
}

impl Search {
    /// Newest-first keyword search, 10 results.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: 10,
            sort_by: SortCriterion::default(),
            sort_order: SortOrder::default(),
            date_range: None,
        }
    }

    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn sort_by(mut self, sort_by: SortCriterion) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Value of the `search_query` parameter.
    pub fn search_query(&self) -> String {
        match &self.date_range {
            Some(range) => format!("{} AND {}", self.query.trim(), range.filter()),
            None => self.query.trim().to_string(),
        }
    }
}
