//! Paginated, searchable data sources.
//!
//! Every list or table surface in the application renders through a
//! `PageSource`: a row set presented a fixed-size page at a time, optionally
//! filtered by a free-text search term. The grouped variant `BalanceSource`
//! additionally buckets transaction amounts by a `DateGrouping` before
//! pagination.

use crate::model::{Amount, DateGrouping, PeriodBalance};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

/// A row that can be matched against a free-text search term.
pub trait SearchableRow {
    /// The composite text the search filter runs over.
    fn search_text(&self) -> String;
}

impl SearchableRow for String {
    fn search_text(&self) -> String {
        self.clone()
    }
}

/// Presents a row set as a sequence of fixed-size pages with a free-text
/// filter.
///
/// Rows keep their source-defined order; the filter only changes membership.
/// The page index is clamped internally, so a caller can never observe a
/// page that no longer exists after a filter change.
#[derive(Debug, Clone)]
pub struct PageSource<R> {
    rows: Vec<R>,
    /// Indexes into `rows` that pass the active filter, in row order.
    visible: Vec<usize>,
    page_size: usize,
    page_index: usize,
    search_text: String,
}

impl<R: SearchableRow> PageSource<R> {
    /// Creates a source over `rows` in their given order. A zero `page_size`
    /// is treated as 1.
    pub fn new(rows: Vec<R>, page_size: usize) -> Self {
        let mut source = Self {
            visible: Vec::with_capacity(rows.len()),
            rows,
            page_size: page_size.max(1),
            page_index: 0,
            search_text: String::new(),
        };
        source.refilter();
        source
    }

    /// Updates the active filter and resets to the first page. An empty
    /// string means no filter.
    pub fn set_search_text(&mut self, text: &str) {
        self.search_text = text.to_string();
        self.page_index = 0;
        self.refilter();
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// The rows of the current page, at most `page_size` of them.
    pub fn current_page(&self) -> Vec<&R> {
        let start = self.page_index * self.page_size;
        self.visible
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|&ix| &self.rows[ix])
            .collect()
    }

    /// Advances one page. No state changes when already on the last page.
    pub fn next_page(&mut self) {
        if self.has_next_page() {
            self.page_index += 1;
        }
    }

    /// Retreats one page. No state changes when already on page 0.
    pub fn previous_page(&mut self) {
        if self.has_previous_page() {
            self.page_index -= 1;
        }
    }

    pub fn has_next_page(&self) -> bool {
        (self.page_index + 1) * self.page_size < self.visible.len()
    }

    pub fn has_previous_page(&self) -> bool {
        self.page_index > 0
    }

    /// Number of rows passing the active filter.
    pub fn total_row_count(&self) -> usize {
        self.visible.len()
    }

    /// Inclusive (first, last) row indexes of the current page within the
    /// filtered set. `(0, 0)` when the set is empty.
    pub fn page_bounds(&self) -> (usize, usize) {
        if self.visible.is_empty() {
            return (0, 0);
        }
        let min = self.page_index * self.page_size;
        let max = (min + self.page_size - 1).min(self.visible.len() - 1);
        (min, max)
    }

    /// A "showing X-Y of Z items" label for pagination controls.
    pub fn page_label(&self) -> String {
        let total = self.total_row_count();
        if total == 0 {
            return "0 items".to_string();
        }
        let (min, max) = self.page_bounds();
        format!("showing {}-{} of {} items", min + 1, max + 1, total)
    }

    fn refilter(&mut self) {
        self.visible.clear();
        for (ix, row) in self.rows.iter().enumerate() {
            if matches_search(&row.search_text(), &self.search_text) {
                self.visible.push(ix);
            }
        }
    }
}

/// True when every whitespace-separated token of `search` appears as a
/// case-insensitive substring of `text`. An empty search matches everything.
/// This is an AND-of-substrings membership test, not a ranked search.
pub fn matches_search(text: &str, search: &str) -> bool {
    let haystack = text.to_lowercase();
    search
        .split_whitespace()
        .all(|token| haystack.contains(&token.to_lowercase()))
}

/// The time-bucketed variant used by the balance statistics table.
///
/// Holds the raw per-transaction amounts and re-aggregates them whenever the
/// grouping granularity changes, which also resets pagination to page 0.
/// Buckets are ordered most recent first; the running total accumulates
/// chronologically from the oldest bucket.
#[derive(Debug, Clone)]
pub struct BalanceSource {
    amounts: Vec<(NaiveDate, i64)>,
    grouping: DateGrouping,
    inner: PageSource<PeriodBalance>,
}

impl BalanceSource {
    pub fn new(amounts: Vec<(NaiveDate, i64)>, grouping: DateGrouping, page_size: usize) -> Self {
        let rows = aggregate(&amounts, grouping);
        Self {
            amounts,
            grouping,
            inner: PageSource::new(rows, page_size),
        }
    }

    pub fn grouping(&self) -> DateGrouping {
        self.grouping
    }

    /// Consumes the source, leaving just the paginated bucket rows.
    pub fn into_pages(self) -> PageSource<PeriodBalance> {
        self.inner
    }

    /// Changes the bucketing granularity, re-aggregates and resets to the
    /// first page.
    pub fn set_date_grouping(&mut self, grouping: DateGrouping) {
        self.grouping = grouping;
        let rows = aggregate(&self.amounts, grouping);
        self.inner = PageSource::new(rows, self.inner.page_size());
    }
}

impl Deref for BalanceSource {
    type Target = PageSource<PeriodBalance>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for BalanceSource {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

/// Buckets signed amounts by the grouping's date format. Purchases sum the
/// positive amounts, reductions the negative ones. Returns buckets most
/// recent first, each carrying the running total accumulated from the oldest.
fn aggregate(amounts: &[(NaiveDate, i64)], grouping: DateGrouping) -> Vec<PeriodBalance> {
    let mut buckets: BTreeMap<String, (i64, i64)> = BTreeMap::new();
    for (date, cents) in amounts {
        let key = date.format(grouping.bucket_format()).to_string();
        let entry = buckets.entry(key).or_default();
        if *cents > 0 {
            entry.0 += cents;
        } else {
            entry.1 += cents;
        }
    }

    // BTreeMap iteration is chronological because the bucket keys are
    // zero-padded year-first strings.
    let mut running_total = 0i64;
    let mut rows: Vec<PeriodBalance> = buckets
        .into_iter()
        .map(|(period, (purchases, reductions))| {
            let net = purchases + reductions;
            running_total += net;
            PeriodBalance {
                period,
                purchases: Amount::from_cents(purchases),
                reductions: Amount::from_cents(reductions),
                net: Amount::from_cents(net),
                running_total: Amount::from_cents(running_total),
            }
        })
        .collect();
    rows.reverse();
    rows
}
