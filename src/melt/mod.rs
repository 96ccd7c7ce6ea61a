//! Auction melting - extract nested auction items into relational tables
//!
//! Items are turned into typed rows for six tables, formatted into
//! pipe-delimited lines, deduplicated by line text and appended to one
//! `.dat` file per table.

pub mod context;
pub mod extractor;
pub mod types;
pub mod writer;

pub use context::{LineSet, MeltContext, TableBatch};
pub use extractor::AuctionMelter;
pub use types::{
    AuctionFile, BidRow, BidderRow, CategoryRow, Field, ItemCategoryRow, ItemRecord, ItemRow,
    MeltConfig, Row, Table, UserRow,
};
pub use writer::TableWriter;
