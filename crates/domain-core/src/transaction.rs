//! 交易记录

use std::str::FromStr;

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use tmii_errors::{ApiError, AppResult};

use crate::{EntityKind, Resource, SortKey, SortValue};

/// 交易状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    #[display("pending")]
    Pending,
    #[display("processing")]
    Processing,
    #[display("completed")]
    Completed,
    #[display("cancelled")]
    Cancelled,
    #[display("failed")]
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "failed" => Ok(Self::Failed),
            other => Err(ApiError::validation(format!(
                "Unknown transaction status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub transaction_id: String,
    pub merchant_id: String,
    pub merchant_name: String,
    pub product: String,
    pub price: i64,
    pub quantity: u32,
    /// 创建时固定为 price × quantity
    pub total: i64,
    pub date: DateTime<Utc>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub transaction_id: String,
    pub merchant_id: String,
    pub merchant_name: String,
    pub product: String,
    pub price: i64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
}

impl CreateTransactionRequest {
    pub fn total(&self) -> AppResult<i64> {
        self.price
            .checked_mul(self.quantity as i64)
            .ok_or_else(|| ApiError::validation("Transaction total overflows"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    pub status: TransactionStatus,
}

static TRANSACTION_SORT_KEYS: &[SortKey<Transaction>] = &[
    SortKey {
        name: "transactionId",
        accessor: |t| Some(SortValue::Text(&t.transaction_id)),
    },
    SortKey {
        name: "merchantId",
        accessor: |t| Some(SortValue::Text(&t.merchant_id)),
    },
    SortKey {
        name: "merchantName",
        accessor: |t| Some(SortValue::Text(&t.merchant_name)),
    },
    SortKey {
        name: "product",
        accessor: |t| Some(SortValue::Text(&t.product)),
    },
    SortKey {
        name: "price",
        accessor: |t| Some(SortValue::Number(t.price)),
    },
    SortKey {
        name: "quantity",
        accessor: |t| Some(SortValue::Number(t.quantity as i64)),
    },
    SortKey {
        name: "total",
        accessor: |t| Some(SortValue::Number(t.total)),
    },
    SortKey {
        name: "status",
        accessor: |t| Some(SortValue::Text(t.status.as_str())),
    },
    SortKey {
        name: "date",
        accessor: |t| Some(SortValue::Timestamp(t.date)),
    },
    SortKey {
        name: "createdAt",
        accessor: |t| Some(SortValue::Timestamp(t.created_at)),
    },
    SortKey {
        name: "updatedAt",
        accessor: |t| Some(SortValue::Timestamp(t.updated_at)),
    },
];

impl Resource for Transaction {
    type Create = CreateTransactionRequest;
    type Update = UpdateTransactionRequest;

    const KIND: EntityKind = EntityKind::Transaction;

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_keys() -> &'static [SortKey<Self>] {
        TRANSACTION_SORT_KEYS
    }

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            Some(&self.transaction_id),
            Some(&self.merchant_id),
            Some(&self.merchant_name),
            Some(&self.product),
            Some(self.status.as_str()),
        ]
    }
}
