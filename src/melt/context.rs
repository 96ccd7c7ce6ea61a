//! Run-wide and per-file row accumulators.
//!
//! Rows are identified by their fully formatted line. Two rows are the same
//! row only when they format to the same text.

use crate::melt::types::{format_line, BidRow, Row, Table};
use std::collections::HashSet;

/// Insertion-ordered set of formatted lines
#[derive(Debug, Clone, Default)]
pub struct LineSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl LineSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a line, returning false if it was already present
    pub fn insert(&mut self, line: String) -> bool {
        if self.seen.contains(&line) {
            return false;
        }
        self.seen.insert(line.clone());
        self.order.push(line);
        true
    }

    pub fn contains(&self, line: &str) -> bool {
        self.seen.contains(line)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

/// State that lives for one whole run: the lines already written to each
/// table and the next bid identifier.
#[derive(Debug, Default)]
pub struct MeltContext {
    written: [LineSet; 6],
    next_bid_id: u64,
}

impl MeltContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier the next novel bid will receive
    pub fn peek_bid_id(&self) -> u64 {
        self.next_bid_id
    }

    /// Consume the current bid identifier
    pub fn advance_bid_id(&mut self) -> u64 {
        let id = self.next_bid_id;
        self.next_bid_id += 1;
        id
    }

    pub fn written(&self, table: Table) -> &LineSet {
        &self.written[table.index()]
    }

    /// Record a line as written, returning false if it was written before
    pub(crate) fn record(&mut self, table: Table, line: &str) -> bool {
        let set = &mut self.written[table.index()];
        if set.contains(line) {
            return false;
        }
        set.insert(line.to_string())
    }
}

/// Rows derived from a single input file, already formatted and
/// deduplicated within the file.
#[derive(Debug, Clone)]
pub struct TableBatch {
    tables: [LineSet; 6],
    /// `bidTime|amount|itemID` of every bid already given an identifier
    bid_keys: HashSet<String>,
    separator: String,
}

impl TableBatch {
    pub fn new(separator: impl Into<String>) -> Self {
        TableBatch {
            tables: Default::default(),
            bid_keys: HashSet::new(),
            separator: separator.into(),
        }
    }

    /// Format a row, returning the line it would occupy
    pub fn format<R: Row>(&self, row: &R) -> String {
        format_line(&row.fields(), &self.separator)
    }

    /// Add a row, returning false if an identical line is already present
    pub fn push<R: Row>(&mut self, row: &R) -> bool {
        let line = self.format(row);
        self.tables[R::TABLE.index()].insert(line)
    }

    pub fn lines(&self, table: Table) -> &LineSet {
        &self.tables[table.index()]
    }

    /// Claim a bid by its line without the identifier column. Returns false
    /// when an identical bid was already claimed in this batch.
    pub fn claim_bid(&mut self, row: &BidRow) -> bool {
        let key = format_line(&row.fields()[1..], &self.separator);
        self.bid_keys.insert(key)
    }
}
