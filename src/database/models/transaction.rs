use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Transaction entity - a record of a client-signed chain transaction
///
/// The server only logs what the client reports after signing; it never
/// constructs or broadcasts transactions itself.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[diesel(table_name = crate::database::schema::transactions)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,

    /// On-chain signature of the confirmed transaction
    pub signature: String,

    /// Transaction category: "transfer", "receive", "swap", "stake", ...
    pub tx_type: String,

    #[schema(value_type = String, example = "1.5")]
    pub amount: Decimal,

    /// Token symbol (optional, native token assumed when absent)
    pub token: Option<String>,

    /// Recipient wallet address for transfers (optional)
    pub recipient: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// New transaction for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::transactions)]
pub struct NewTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub signature: String,
    pub tx_type: String,
    pub amount: Decimal,
    pub token: Option<String>,
    pub recipient: Option<String>,
}

impl NewTransaction {
    pub fn new(user_id: Uuid, signature: String, tx_type: String, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            signature,
            tx_type,
            amount,
            token: None,
            recipient: None,
        }
    }

    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_recipient(mut self, recipient: String) -> Self {
        self.recipient = Some(recipient);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_transaction_builder() {
        let tx = NewTransaction::new(
            Uuid::new_v4(),
            "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnbJLgp8uirBgmQpjKhoR4tjF3ZpRzrFmBV6UjKdiSZkQUW".to_string(),
            "transfer".to_string(),
            dec!(0.25),
        )
        .with_token("SOL".to_string())
        .with_recipient("7Zbk3kx2dqLL3NdMDpbp4xxe1MNAMGGkzCEtywxTnLC".to_string());

        assert_eq!(tx.tx_type, "transfer");
        assert_eq!(tx.amount, dec!(0.25));
        assert_eq!(tx.token.as_deref(), Some("SOL"));
        assert!(tx.recipient.is_some());
    }
}
