use crate::error::Result;
use crate::melt::context::{MeltContext, TableBatch};
use crate::melt::types::{
    BidRecord, BidRow, BidderRow, CategoryRow, ItemCategoryRow, ItemRecord, ItemRow,
    MeltConfig, UserRow,
};
use crate::normalize::{normalize_timestamp, parse_dollar, Timestamp};
use tracing::warn;

/// Turns auction items into rows for the six output tables
pub struct AuctionMelter {
    config: MeltConfig,
}

impl AuctionMelter {
    pub fn new(config: MeltConfig) -> Self {
        AuctionMelter { config }
    }

    /// Melt every item of one input file into a fresh batch.
    ///
    /// Bid identifiers are drawn from `ctx`, so they keep increasing across
    /// files of the same run.
    pub fn melt(&self, ctx: &mut MeltContext, items: &[ItemRecord]) -> Result<TableBatch> {
        let mut batch = TableBatch::new(self.config.separator.clone());
        for item in items {
            self.melt_item(ctx, item, &mut batch)?;
        }
        Ok(batch)
    }

    fn melt_item(
        &self,
        ctx: &mut MeltContext,
        item: &ItemRecord,
        batch: &mut TableBatch,
    ) -> Result<()> {
        let row = ItemRow {
            item_id: item.item_id,
            first_bid: parse_dollar(&item.first_bid)?,
            current_bid: parse_dollar(&item.currently)?,
            num_bids: item.number_of_bids,
            description: item.description.clone(),
            name: item.name.clone(),
            location: item.location.clone(),
            country: item.country.clone(),
            started: timestamp(&item.started, item.item_id)?,
            ends: timestamp(&item.ends, item.item_id)?,
            seller_id: item.seller.user_id.clone(),
        };
        batch.push(&row);

        for category in &item.categories {
            batch.push(&ItemCategoryRow {
                item_id: item.item_id,
                category: category.clone(),
            });
            batch.push(&CategoryRow {
                name: category.clone(),
            });
        }

        batch.push(&UserRow {
            user_id: item.seller.user_id.clone(),
            rating: item.seller.rating,
        });

        let Some(bids) = &item.bids else {
            return Ok(());
        };

        for entry in bids {
            self.melt_bid(ctx, item.item_id, &entry.bid, batch)?;
        }

        Ok(())
    }

    fn melt_bid(
        &self,
        ctx: &mut MeltContext,
        item_id: i64,
        bid: &BidRecord,
        batch: &mut TableBatch,
    ) -> Result<()> {
        let mut row = BidRow {
            bid_id: ctx.peek_bid_id(),
            time: timestamp(&bid.time, item_id)?,
            amount: parse_dollar(&bid.amount)?,
            item_id,
        };

        let bidder = &bid.bidder;
        batch.push(&BidderRow {
            user_id: bidder.user_id.clone(),
            location: bidder.location.clone(),
            country: bidder.country.clone(),
        });

        match &bidder.user_id {
            Some(user_id) => {
                batch.push(&UserRow {
                    user_id: user_id.clone(),
                    rating: bidder.rating,
                });
            }
            None => warn!(item_id, "bidder without UserID, no user row emitted"),
        }

        // Only a bid that is new to this batch consumes an identifier
        if batch.claim_bid(&row) {
            row.bid_id = ctx.advance_bid_id();
            batch.push(&row);
        }

        Ok(())
    }
}

fn timestamp(raw: &str, item_id: i64) -> Result<Timestamp> {
    let ts = normalize_timestamp(raw)?;
    if !ts.month_recognized {
        warn!(item_id, raw, "unrecognized month abbreviation, kept verbatim");
    }
    Ok(ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::melt::types::{AuctionFile, Table};
    use serde_json::json;

    fn lines(batch: &TableBatch, table: Table) -> Vec<String> {
        batch.lines(table).iter().map(str::to_string).collect()
    }

    fn widget(bids: serde_json::Value) -> serde_json::Value {
        json!({
            "ItemID": "1000",
            "First_Bid": "$1.00",
            "Currently": "$5.50",
            "Number_of_Bids": "2",
            "Description": "x",
            "Name": "Widget",
            "Location": "NY",
            "Country": "USA",
            "Started": "Dec-10-01 10:00:00",
            "Ends": "Dec-17-01 10:00:00",
            "Seller": {"UserID": "s1", "Rating": 10},
            "Category": ["Toys"],
            "Bids": bids
        })
    }

    fn items(value: serde_json::Value) -> Vec<ItemRecord> {
        let file: AuctionFile = serde_json::from_value(json!({ "Items": [value] })).unwrap();
        file.items
    }

    #[test]
    fn test_item_without_bids() {
        let melter = AuctionMelter::new(MeltConfig::default());
        let mut ctx = MeltContext::new();
        let batch = melter.melt(&mut ctx, &items(widget(json!(null)))).unwrap();

        assert_eq!(
            lines(&batch, Table::Item),
            vec![
                "1000|1.00|5.50|2|\"x\"|\"Widget\"|\"NY\"|\"USA\"|2001-12-10 10:00:00|2001-12-17 10:00:00|s1"
            ]
        );
        assert_eq!(lines(&batch, Table::Category), vec!["\"Toys\""]);
        assert_eq!(lines(&batch, Table::ItemCategory), vec!["1000|\"Toys\""]);
        assert_eq!(lines(&batch, Table::User), vec!["s1|10"]);
        assert!(batch.lines(Table::Bid).is_empty());
        assert!(batch.lines(Table::Bidder).is_empty());
        assert_eq!(ctx.peek_bid_id(), 0);
    }

    #[test]
    fn test_bids_produce_bid_bidder_and_user_rows() {
        let melter = AuctionMelter::new(MeltConfig::default());
        let mut ctx = MeltContext::new();
        let bids = json!([
            {"Bid": {
                "Time": "Dec-11-01 09:30:00",
                "Amount": "$2.00",
                "Bidder": {"UserID": "b1", "Location": "Boston", "Country": "USA", "Rating": "5"}
            }},
            {"Bid": {
                "Time": "Dec-12-01 09:30:00",
                "Amount": "$1,005.50",
                "Bidder": {"UserID": "b2", "Rating": 0}
            }}
        ]);
        let batch = melter.melt(&mut ctx, &items(widget(bids))).unwrap();

        assert_eq!(
            lines(&batch, Table::Bid),
            vec![
                "0|2001-12-11 09:30:00|2.00|1000",
                "1|2001-12-12 09:30:00|1005.50|1000"
            ]
        );
        assert_eq!(
            lines(&batch, Table::Bidder),
            vec!["b1|\"Boston\"|\"USA\"", "b2|null|null"]
        );
        assert_eq!(lines(&batch, Table::User), vec!["s1|10", "b1|5", "b2|0"]);
        assert_eq!(ctx.peek_bid_id(), 2);
    }

    #[test]
    fn test_repeated_bid_does_not_consume_an_id() {
        let melter = AuctionMelter::new(MeltConfig::default());
        let mut ctx = MeltContext::new();
        let bid = json!({"Bid": {
            "Time": "Dec-11-01 09:30:00",
            "Amount": "$2.00",
            "Bidder": {"UserID": "b1", "Rating": 5}
        }});
        let batch = melter
            .melt(&mut ctx, &items(widget(json!([bid.clone(), bid]))))
            .unwrap();

        assert_eq!(lines(&batch, Table::Bid), vec!["0|2001-12-11 09:30:00|2.00|1000"]);
        assert_eq!(ctx.peek_bid_id(), 1);
    }

    #[test]
    fn test_bidder_without_user_id() {
        let melter = AuctionMelter::new(MeltConfig::default());
        let mut ctx = MeltContext::new();
        let bids = json!([{"Bid": {
            "Time": "Dec-11-01 09:30:00",
            "Amount": "$2.00",
            "Bidder": {"Rating": 5}
        }}]);
        let batch = melter.melt(&mut ctx, &items(widget(bids))).unwrap();

        assert_eq!(lines(&batch, Table::Bidder), vec!["null|null|null"]);
        assert_eq!(lines(&batch, Table::User), vec!["s1|10"]);
        assert_eq!(lines(&batch, Table::Bid), vec!["0|2001-12-11 09:30:00|2.00|1000"]);
    }

    #[test]
    fn test_bid_ids_continue_across_files() {
        let melter = AuctionMelter::new(MeltConfig::default());
        let mut ctx = MeltContext::new();
        let bids = json!([{"Bid": {
            "Time": "Dec-11-01 09:30:00",
            "Amount": "$2.00",
            "Bidder": {"UserID": "b1", "Rating": 5}
        }}]);
        melter.melt(&mut ctx, &items(widget(bids.clone()))).unwrap();
        let second = melter.melt(&mut ctx, &items(widget(bids))).unwrap();

        assert_eq!(
            lines(&second, Table::Bid),
            vec!["1|2001-12-11 09:30:00|2.00|1000"]
        );
    }

    #[test]
    fn test_repeated_category_is_kept_once_per_batch() {
        let melter = AuctionMelter::new(MeltConfig::default());
        let mut ctx = MeltContext::new();
        let mut item = widget(json!(null));
        item["Category"] = json!(["Toys", "Games", "Toys"]);
        let batch = melter.melt(&mut ctx, &items(item)).unwrap();

        assert_eq!(
            lines(&batch, Table::ItemCategory),
            vec!["1000|\"Toys\"", "1000|\"Games\""]
        );
        assert_eq!(lines(&batch, Table::Category), vec!["\"Toys\"", "\"Games\""]);
    }

    #[test]
    fn test_bad_currency_aborts() {
        let melter = AuctionMelter::new(MeltConfig::default());
        let mut ctx = MeltContext::new();
        let mut item = widget(json!(null));
        item["First_Bid"] = json!("");
        assert!(melter.melt(&mut ctx, &items(item)).is_err());
    }
}
