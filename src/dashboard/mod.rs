use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::database::models::{Contact, StakeAccount, Transaction};

/// Net incoming vs outgoing volume
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetFlow {
    #[schema(value_type = String, example = "12.5")]
    pub incoming: Decimal,
    #[schema(value_type = String, example = "8.25")]
    pub outgoing: Decimal,
}

/// Stake position as shown on the dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StakeSummary {
    pub stake_account_pubkey: String,
    #[schema(value_type = String, example = "5")]
    pub amount: Decimal,
}

/// Transfer volume rolled up per recipient
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactTransferSummary {
    /// Contact name when the recipient is in the address book, else the raw address
    pub contact_name: String,
    pub wallet_address: String,
    #[schema(value_type = String, example = "3.5")]
    pub total_amount: Decimal,
    pub count: usize,
}

/// Daily transfer volume point
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimelinePoint {
    /// Day in YYYY-MM-DD form
    pub date: String,
    #[schema(value_type = String, example = "1.2")]
    pub volume: Decimal,
}

/// One row of the recent-activity feed
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub tx_type: String,
    #[schema(value_type = String, example = "0.1")]
    pub amount: Decimal,
    pub signature: String,
    pub date: String,
    /// Resolved contact name or raw address, when the transaction had a recipient
    pub recipient: Option<String>,
}

/// Aggregated dashboard payload
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_transfers: usize,
    #[schema(value_type = String, example = "8.25")]
    pub total_transfer_volume: Decimal,
    pub net_flow: NetFlow,
    pub stakes: Vec<StakeSummary>,
    pub transfers_per_contact: Vec<ContactTransferSummary>,
    pub transfer_timeline: Vec<TimelinePoint>,
    pub recent_activity: Vec<ActivityItem>,
}

/// Number of rows shown in the recent-activity feed
const RECENT_ACTIVITY_LIMIT: usize = 10;

/// Reduce a user's already-fetched rows into the dashboard payload
///
/// Pure and in-memory: all I/O happens in the handler before this runs.
/// "transfer" rows are treated as outgoing and "receive" rows as incoming;
/// other types (swaps, stakes) only appear in the activity feed.
/// `transactions` is expected newest-first, as the repository returns it.
pub fn aggregate(
    transactions: &[Transaction],
    stakes: &[StakeAccount],
    contacts: &[Contact],
) -> DashboardSummary {
    let contact_lookup: HashMap<&str, &str> = contacts
        .iter()
        .map(|c| (c.wallet_address.as_str(), c.name.as_str()))
        .collect();

    let mut total_transfers = 0;
    let mut total_transfer_volume = Decimal::ZERO;
    let mut incoming = Decimal::ZERO;
    let mut outgoing = Decimal::ZERO;
    let mut per_contact: HashMap<String, ContactTransferSummary> = HashMap::new();
    let mut timeline: HashMap<String, Decimal> = HashMap::new();

    for tx in transactions {
        match tx.tx_type.as_str() {
            "transfer" => {
                total_transfers += 1;
                total_transfer_volume += tx.amount;
                outgoing += tx.amount;

                let recipient = tx.recipient.as_deref().unwrap_or("Unknown");
                let contact_name = contact_lookup
                    .get(recipient)
                    .copied()
                    .unwrap_or(recipient)
                    .to_string();

                let entry = per_contact
                    .entry(recipient.to_string())
                    .or_insert_with(|| ContactTransferSummary {
                        contact_name,
                        wallet_address: recipient.to_string(),
                        total_amount: Decimal::ZERO,
                        count: 0,
                    });
                entry.total_amount += tx.amount;
                entry.count += 1;

                let day = tx.created_at.format("%Y-%m-%d").to_string();
                *timeline.entry(day).or_insert(Decimal::ZERO) += tx.amount;
            }
            "receive" => {
                incoming += tx.amount;
            }
            _ => {}
        }
    }

    let mut transfers_per_contact: Vec<ContactTransferSummary> = per_contact.into_values().collect();
    transfers_per_contact.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));

    let mut transfer_timeline: Vec<TimelinePoint> = timeline
        .into_iter()
        .map(|(date, volume)| TimelinePoint { date, volume })
        .collect();
    transfer_timeline.sort_by(|a, b| a.date.cmp(&b.date));

    let recent_activity = transactions
        .iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|tx| ActivityItem {
            id: tx.id,
            tx_type: tx.tx_type.clone(),
            amount: tx.amount,
            signature: tx.signature.clone(),
            date: tx.created_at.to_rfc3339(),
            recipient: tx.recipient.as_deref().map(|r| {
                contact_lookup.get(r).copied().unwrap_or(r).to_string()
            }),
        })
        .collect();

    DashboardSummary {
        total_transfers,
        total_transfer_volume,
        net_flow: NetFlow { incoming, outgoing },
        stakes: stakes
            .iter()
            .map(|s| StakeSummary {
                stake_account_pubkey: s.stake_account_pubkey.clone(),
                amount: s.amount,
            })
            .collect(),
        transfers_per_contact,
        transfer_timeline,
        recent_activity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn tx(tx_type: &str, amount: Decimal, recipient: Option<&str>, day: u32) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            signature: format!("sig-{}", Uuid::new_v4()),
            tx_type: tx_type.to_string(),
            amount,
            token: Some("SOL".to_string()),
            recipient: recipient.map(|r| r.to_string()),
            created_at: Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap(),
        }
    }

    fn contact(name: &str, wallet: &str) -> Contact {
        Contact {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            wallet_address: wallet.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_totals_and_net_flow() {
        let txs = vec![
            tx("transfer", dec!(1.5), Some("addr-a"), 3),
            tx("transfer", dec!(0.5), Some("addr-b"), 2),
            tx("receive", dec!(4), None, 1),
            tx("swap", dec!(10), None, 1),
        ];

        let summary = aggregate(&txs, &[], &[]);

        assert_eq!(summary.total_transfers, 2);
        assert_eq!(summary.total_transfer_volume, dec!(2));
        assert_eq!(summary.net_flow.outgoing, dec!(2));
        assert_eq!(summary.net_flow.incoming, dec!(4));
    }

    #[test]
    fn test_transfers_per_contact_named_and_sorted() {
        let txs = vec![
            tx("transfer", dec!(1), Some("addr-a"), 1),
            tx("transfer", dec!(2), Some("addr-a"), 2),
            tx("transfer", dec!(5), Some("addr-b"), 3),
        ];
        let contacts = vec![contact("Alice", "addr-a")];

        let summary = aggregate(&txs, &[], &contacts);

        assert_eq!(summary.transfers_per_contact.len(), 2);
        // Sorted by volume, largest first
        assert_eq!(summary.transfers_per_contact[0].wallet_address, "addr-b");
        assert_eq!(summary.transfers_per_contact[0].contact_name, "addr-b");
        assert_eq!(summary.transfers_per_contact[1].contact_name, "Alice");
        assert_eq!(summary.transfers_per_contact[1].total_amount, dec!(3));
        assert_eq!(summary.transfers_per_contact[1].count, 2);
    }

    #[test]
    fn test_timeline_is_daily_and_sorted() {
        let txs = vec![
            tx("transfer", dec!(1), Some("a"), 5),
            tx("transfer", dec!(2), Some("a"), 5),
            tx("transfer", dec!(3), Some("a"), 2),
        ];

        let summary = aggregate(&txs, &[], &[]);

        assert_eq!(summary.transfer_timeline.len(), 2);
        assert_eq!(summary.transfer_timeline[0].date, "2026-03-02");
        assert_eq!(summary.transfer_timeline[0].volume, dec!(3));
        assert_eq!(summary.transfer_timeline[1].date, "2026-03-05");
        assert_eq!(summary.transfer_timeline[1].volume, dec!(3));
    }

    #[test]
    fn test_recent_activity_caps_at_ten_and_resolves_names() {
        let mut txs: Vec<Transaction> = (1..=12)
            .map(|i| tx("transfer", dec!(1), Some("addr-a"), (i % 28) + 1))
            .collect();
        txs.push(tx("receive", dec!(2), None, 1));
        let contacts = vec![contact("Alice", "addr-a")];

        let summary = aggregate(&txs, &[], &contacts);

        assert_eq!(summary.recent_activity.len(), 10);
        assert_eq!(summary.recent_activity[0].recipient.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_empty_inputs_produce_empty_summary() {
        let summary = aggregate(&[], &[], &[]);

        assert_eq!(summary.total_transfers, 0);
        assert_eq!(summary.total_transfer_volume, Decimal::ZERO);
        assert!(summary.stakes.is_empty());
        assert!(summary.recent_activity.is_empty());
    }
}
