use crate::normalize::Timestamp;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;

/// One of the six output tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Item,
    Bid,
    Category,
    User,
    Bidder,
    ItemCategory,
}

impl Table {
    /// Tables in the order they are written for each input file
    pub const ALL: [Table; 6] = [
        Table::Item,
        Table::Bid,
        Table::Category,
        Table::User,
        Table::Bidder,
        Table::ItemCategory,
    ];

    /// Base name of the output file, without extension
    pub fn file_stem(self) -> &'static str {
        match self {
            Table::Item => "itemTable",
            Table::Bid => "bids",
            Table::Category => "category",
            Table::User => "user",
            Table::Bidder => "bidder",
            Table::ItemCategory => "catItems",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// A single column value, formatted at the output boundary
#[derive(Debug, Clone, PartialEq)]
pub enum Field<'a> {
    /// Free text: trimmed, quotes doubled, wrapped in quotes
    Text(&'a str),
    /// Identifiers, numbers and timestamps, written verbatim
    Plain(Cow<'a, str>),
    /// An absent optional value
    Null,
}

impl<'a> Field<'a> {
    pub fn plain(value: &'a str) -> Self {
        Field::Plain(Cow::Borrowed(value))
    }

    pub fn int(value: i64) -> Self {
        Field::Plain(Cow::Owned(value.to_string()))
    }

    pub fn money(value: f64) -> Self {
        Field::Plain(Cow::Owned(format!("{:.2}", value)))
    }

    pub fn opt_plain(value: Option<&'a str>) -> Self {
        value.map_or(Field::Null, Field::plain)
    }

    pub fn opt_text(value: Option<&'a str>) -> Self {
        value.map_or(Field::Null, Field::Text)
    }

    fn write_to(&self, out: &mut String) {
        match self {
            Field::Text(s) => {
                out.push('"');
                out.push_str(&s.trim().replace('"', "\"\""));
                out.push('"');
            }
            Field::Plain(s) => out.push_str(s),
            Field::Null => out.push_str("null"),
        }
    }
}

/// Join fields into one output line (no trailing separator)
pub fn format_line(fields: &[Field<'_>], separator: &str) -> String {
    let mut line = String::new();
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            line.push_str(separator);
        }
        field.write_to(&mut line);
    }
    line
}

/// A typed row of one of the output tables
pub trait Row {
    const TABLE: Table;

    /// Column values in declared column order
    fn fields(&self) -> Vec<Field<'_>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemRow {
    pub item_id: i64,
    pub first_bid: f64,
    pub current_bid: f64,
    pub num_bids: i64,
    pub description: String,
    pub name: String,
    pub location: String,
    pub country: String,
    pub started: Timestamp,
    pub ends: Timestamp,
    pub seller_id: String,
}

impl Row for ItemRow {
    const TABLE: Table = Table::Item;

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::int(self.item_id),
            Field::money(self.first_bid),
            Field::money(self.current_bid),
            Field::int(self.num_bids),
            Field::Text(&self.description),
            Field::Text(&self.name),
            Field::Text(&self.location),
            Field::Text(&self.country),
            Field::plain(&self.started.value),
            Field::plain(&self.ends.value),
            Field::plain(&self.seller_id),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BidRow {
    pub bid_id: u64,
    pub time: Timestamp,
    pub amount: f64,
    pub item_id: i64,
}

impl Row for BidRow {
    const TABLE: Table = Table::Bid;

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Plain(Cow::Owned(self.bid_id.to_string())),
            Field::plain(&self.time.value),
            Field::money(self.amount),
            Field::int(self.item_id),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRow {
    pub name: String,
}

impl Row for CategoryRow {
    const TABLE: Table = Table::Category;

    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field::Text(&self.name)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCategoryRow {
    pub item_id: i64,
    pub category: String,
}

impl Row for ItemCategoryRow {
    const TABLE: Table = Table::ItemCategory;

    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field::int(self.item_id), Field::Text(&self.category)]
    }
}

/// A seller or bidder with the rating seen on this record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub user_id: String,
    pub rating: i64,
}

impl Row for UserRow {
    const TABLE: Table = Table::User;

    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field::plain(&self.user_id), Field::int(self.rating)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidderRow {
    pub user_id: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
}

impl Row for BidderRow {
    const TABLE: Table = Table::Bidder;

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::opt_plain(self.user_id.as_deref()),
            Field::opt_text(self.location.as_deref()),
            Field::opt_text(self.country.as_deref()),
        ]
    }
}

/// Configuration for melting and writing
#[derive(Debug, Clone)]
pub struct MeltConfig {
    /// Directory that receives the table files
    pub output_dir: PathBuf,

    /// Extension appended to each table's file stem
    pub extension: String,

    /// Column separator
    pub separator: String,
}

impl Default for MeltConfig {
    fn default() -> Self {
        MeltConfig {
            output_dir: PathBuf::from("."),
            extension: String::from("dat"),
            separator: String::from("|"),
        }
    }
}

// ---------------------------------------------------------------------------
// Input records

/// Top-level document of one export file
#[derive(Debug, Clone, Deserialize)]
pub struct AuctionFile {
    #[serde(rename = "Items")]
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemRecord {
    #[serde(rename = "ItemID", deserialize_with = "int_or_string")]
    pub item_id: i64,
    #[serde(rename = "First_Bid")]
    pub first_bid: String,
    #[serde(rename = "Currently")]
    pub currently: String,
    #[serde(rename = "Number_of_Bids", deserialize_with = "int_or_string")]
    pub number_of_bids: i64,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Started")]
    pub started: String,
    #[serde(rename = "Ends")]
    pub ends: String,
    #[serde(rename = "Seller")]
    pub seller: SellerRecord,
    #[serde(rename = "Category")]
    pub categories: Vec<String>,
    #[serde(rename = "Bids", default)]
    pub bids: Option<Vec<BidEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SellerRecord {
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "Rating", deserialize_with = "int_or_string")]
    pub rating: i64,
}

/// The `{"Bid": {...}}` wrapper around each bid
#[derive(Debug, Clone, Deserialize)]
pub struct BidEntry {
    #[serde(rename = "Bid")]
    pub bid: BidRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BidRecord {
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "Bidder")]
    pub bidder: BidderRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BidderRecord {
    #[serde(rename = "UserID", default)]
    pub user_id: Option<String>,
    #[serde(rename = "Location", default)]
    pub location: Option<String>,
    #[serde(rename = "Country", default)]
    pub country: Option<String>,
    #[serde(rename = "Rating", deserialize_with = "int_or_string")]
    pub rating: i64,
}

/// Accept integers encoded either as JSON numbers or numeric strings
fn int_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct IntVisitor;

    impl<'de> Visitor<'de> for IntVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an integer or a string containing an integer")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::custom(format!("integer out of range: {}", v)))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
            v.trim()
                .parse()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }

    deserializer.deserialize_any(IntVisitor)
}
