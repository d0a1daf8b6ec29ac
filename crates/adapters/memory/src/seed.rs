//! 演示数据

use chrono::{DateTime, TimeDelta, Utc};
use tmii_domain_core::{Member, Transaction, TransactionStatus, User};

/// 2024-01-01T00:00:00Z
const BASE_EPOCH_SECS: i64 = 1_704_067_200;

fn at(day: i64, hour: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(BASE_EPOCH_SECS + day * 86_400 + hour * 3_600)
}

const MEMBER_NAMES: &[(&str, &str)] = &[
    ("Budi Santoso", "budi.santoso@tmii.id"),
    ("Siti Rahayu", "siti.rahayu@tmii.id"),
    ("Agus Wijaya", "agus.wijaya@tmii.id"),
    ("Dewi Lestari", "dewi.lestari@tmii.id"),
    ("Rizky Pratama", "rizky.pratama@tmii.id"),
    ("Intan Permata", "intan.permata@tmii.id"),
    ("Hendra Gunawan", "hendra.gunawan@tmii.id"),
    ("Maya Sari", "maya.sari@tmii.id"),
    ("Fajar Nugroho", "fajar.nugroho@tmii.id"),
    ("Putri Anggraini", "putri.anggraini@tmii.id"),
    ("Yusuf Hidayat", "yusuf.hidayat@tmii.id"),
    ("Ratna Kusuma", "ratna.kusuma@tmii.id"),
];

const USER_NAMES: &[(&str, &str)] = &[
    ("Admin TMII", "admin@tmii.id"),
    ("Operator Loket", "loket@tmii.id"),
    ("Keuangan", "finance@tmii.id"),
    ("Pengelola Tenant", "tenant@tmii.id"),
    ("Auditor", "audit@tmii.id"),
    ("Helpdesk", "helpdesk@tmii.id"),
    ("Marketing", "marketing@tmii.id"),
    ("Teknisi", "teknisi@tmii.id"),
];

/// (merchantId, merchantName, product, price)
const CATALOG: &[(&str, &str, &str, i64)] = &[
    ("M1", "Toko A", "Widget", 25_000),
    ("M2", "Kedai Kopi Nusantara", "Kopi Tubruk", 18_000),
    ("M3", "Souvenir Taman Mini", "Miniatur Monas", 75_000),
    ("M4", "Kereta Gantung", "Tiket Skylift", 50_000),
    ("M5", "Teater Keong Emas", "Tiket Film", 40_000),
];

const STATUSES: &[TransactionStatus] = &[
    TransactionStatus::Completed,
    TransactionStatus::Pending,
    TransactionStatus::Processing,
    TransactionStatus::Completed,
    TransactionStatus::Cancelled,
    TransactionStatus::Failed,
];

pub fn seed_members() -> Vec<Member> {
    MEMBER_NAMES
        .iter()
        .enumerate()
        .map(|(i, (name, email))| {
            let i = i as i64;
            Member {
                id: format!("usr_m{:08}", i + 1),
                name: name.to_string(),
                email: email.to_string(),
                created_at: at(i * 3, 9),
                updated_at: at(i * 3 + 1, 9),
                // 每三位会员有一位从未登录
                last_login_at: (i % 3 != 2).then(|| at(40 + i, 14)),
            }
        })
        .collect()
}

pub fn seed_users() -> Vec<User> {
    USER_NAMES
        .iter()
        .enumerate()
        .map(|(i, (name, email))| {
            let i = i as i64;
            User {
                id: format!("usr_u{:08}", i + 1),
                name: name.to_string(),
                email: email.to_string(),
                created_at: at(i * 5, 8),
                updated_at: at(i * 5, 8),
                last_login_at: (i % 4 != 3).then(|| at(60 + i, 10)),
            }
        })
        .collect()
}

pub fn seed_transactions() -> Vec<Transaction> {
    (0..15i64)
        .map(|i| {
            let (merchant_id, merchant_name, product, price) = CATALOG[i as usize % CATALOG.len()];
            let quantity = (i % 4 + 1) as u32;
            let date = at(i * 2, 10 + i % 8);
            Transaction {
                id: format!("trx_s{:08}", i + 1),
                transaction_id: format!("TRX-{:03}", i + 1),
                merchant_id: merchant_id.to_string(),
                merchant_name: merchant_name.to_string(),
                product: product.to_string(),
                price,
                quantity,
                total: price * quantity as i64,
                date,
                status: STATUSES[i as usize % STATUSES.len()],
                created_at: date,
                updated_at: date,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_ids_are_unique() {
        let ids: HashSet<_> = seed_members().into_iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), MEMBER_NAMES.len());
        let ids: HashSet<_> = seed_transactions().into_iter().map(|t| t.transaction_id).collect();
        assert_eq!(ids.len(), 15);
    }

    #[test]
    fn test_seed_totals_are_consistent() {
        assert!(seed_transactions().iter().all(|t| t.total == t.price * t.quantity as i64));
    }

    #[test]
    fn test_base_epoch() {
        assert_eq!(at(0, 0).to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }
}
