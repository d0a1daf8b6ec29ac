//! 内存记录的构造与更新规则

use chrono::{DateTime, Utc};
use tmii_domain_core::{
    CreateMemberRequest, CreateTransactionRequest, CreateUserRequest, Member, Resource,
    Transaction, UpdateMemberRequest, UpdateTransactionRequest, UpdateUserRequest, User,
};
use tmii_errors::AppResult;

/// 可由内存存储创建、更新的资源
pub trait MockRecord: Resource {
    /// 生成 id 的前缀
    const ID_PREFIX: &'static str;
    /// 提示信息中的单数名称
    const LABEL: &'static str;

    fn build(id: String, payload: &Self::Create, now: DateTime<Utc>) -> AppResult<Self>;

    fn apply(&mut self, payload: &Self::Update, now: DateTime<Utc>);

    /// 与已有记录冲突时返回错误信息
    fn conflicts_with(&self, payload: &Self::Create) -> Option<&'static str>;
}

impl MockRecord for Member {
    const ID_PREFIX: &'static str = "usr_";
    const LABEL: &'static str = "Member";

    fn build(id: String, payload: &CreateMemberRequest, now: DateTime<Utc>) -> AppResult<Self> {
        Ok(Self {
            id,
            name: payload.name.clone(),
            email: payload.email.clone(),
            created_at: now,
            updated_at: now,
            last_login_at: None,
        })
    }

    fn apply(&mut self, payload: &UpdateMemberRequest, now: DateTime<Utc>) {
        self.name = payload.name.clone();
        self.updated_at = now;
    }

    fn conflicts_with(&self, payload: &CreateMemberRequest) -> Option<&'static str> {
        (self.email == payload.email).then_some("Email is already in use")
    }
}

impl MockRecord for User {
    const ID_PREFIX: &'static str = "usr_";
    const LABEL: &'static str = "User";

    fn build(id: String, payload: &CreateUserRequest, now: DateTime<Utc>) -> AppResult<Self> {
        Ok(Self {
            id,
            name: payload.name.clone(),
            email: payload.email.clone(),
            created_at: now,
            updated_at: now,
            last_login_at: None,
        })
    }

    fn apply(&mut self, payload: &UpdateUserRequest, now: DateTime<Utc>) {
        self.name = payload.name.clone();
        self.updated_at = now;
    }

    fn conflicts_with(&self, payload: &CreateUserRequest) -> Option<&'static str> {
        (self.email == payload.email).then_some("Email is already in use")
    }
}

impl MockRecord for Transaction {
    const ID_PREFIX: &'static str = "trx_";
    const LABEL: &'static str = "Transaction";

    fn build(
        id: String,
        payload: &CreateTransactionRequest,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            transaction_id: payload.transaction_id.clone(),
            merchant_id: payload.merchant_id.clone(),
            merchant_name: payload.merchant_name.clone(),
            product: payload.product.clone(),
            price: payload.price,
            quantity: payload.quantity,
            total: payload.total()?,
            date: now,
            status: payload.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, payload: &UpdateTransactionRequest, now: DateTime<Utc>) {
        self.status = payload.status;
        self.updated_at = now;
    }

    fn conflicts_with(&self, payload: &CreateTransactionRequest) -> Option<&'static str> {
        (self.transaction_id == payload.transaction_id).then_some("Transaction ID already exists")
    }
}
