//! SQLite wallet store
//!
//! Persistent backend. Every composite operation runs inside a
//! database transaction, so the sufficiency check and the debit commit
//! or roll back together. The connection is serialized behind a Mutex.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use tracing::info;

use gruha_core::{SpendingCategory, TokenAmount, TokenType};

use crate::allocation::TokenAllocation;
use crate::balance::WalletBalance;
use crate::error::LedgerError;
use crate::store::WalletStore;
use crate::transaction::{TransactionStatus, WalletTransaction};

/// SQLite-backed wallet store
pub struct SqliteWalletStore {
    conn: Mutex<Connection>,
}

impl SqliteWalletStore {
    /// Open (or create) a store at the given database path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self, LedgerError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), LedgerError> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS wallets (
                msme_id TEXT PRIMARY KEY,
                wallet_address TEXT,
                resilience_credits TEXT NOT NULL,
                relief_tokens TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS allocations (
                id TEXT PRIMARY KEY,
                msme_id TEXT NOT NULL,
                disaster_id TEXT NOT NULL,
                token_type INTEGER NOT NULL,
                amount TEXT NOT NULL,
                remaining_amount TEXT NOT NULL,
                valid_until TEXT NOT NULL,
                categories TEXT NOT NULL,
                allocated_by TEXT NOT NULL,
                allocated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY,
                msme_id TEXT NOT NULL,
                vendor_id TEXT NOT NULL,
                token_type INTEGER NOT NULL,
                category INTEGER NOT NULL,
                amount TEXT NOT NULL,
                booking_id TEXT,
                chain_tx_hash TEXT,
                fraud_score INTEGER NOT NULL,
                fraud_flags TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                completed_at TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_allocations_msme ON allocations(msme_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_allocations_disaster ON allocations(disaster_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_transactions_msme ON transactions(msme_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_transactions_status ON transactions(status)",
            [],
        )?;

        Ok(())
    }
}

// === Row conversion helpers ===

fn parse_amount(s: &str) -> Result<TokenAmount, LedgerError> {
    let value: Decimal = s
        .parse()
        .map_err(|_| LedgerError::Storage(format!("invalid amount: {s}")))?;
    TokenAmount::new(value).map_err(|e| LedgerError::Storage(e.to_string()))
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, LedgerError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| LedgerError::Storage(format!("invalid timestamp: {s}")))
}

fn parse_token_type(code: u8) -> Result<TokenType, LedgerError> {
    TokenType::from_code(code)
        .ok_or_else(|| LedgerError::Storage(format!("unknown token type code: {code}")))
}

fn parse_category(code: u8) -> Result<SpendingCategory, LedgerError> {
    SpendingCategory::from_code(code)
        .ok_or_else(|| LedgerError::Storage(format!("unknown category code: {code}")))
}

fn wallet_from_row(row: &Row<'_>) -> rusqlite::Result<(String, Option<String>, String, String, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn build_wallet(
    raw: (String, Option<String>, String, String, String),
) -> Result<WalletBalance, LedgerError> {
    let resilience = parse_amount(&raw.2)?;
    let relief = parse_amount(&raw.3)?;
    let total = resilience
        .checked_add(&relief)
        .ok_or_else(|| LedgerError::BalanceOverflow(raw.0.clone()))?;
    Ok(WalletBalance {
        msme_id: raw.0,
        wallet_address: raw.1,
        resilience_credits: resilience,
        relief_tokens: relief,
        total_balance: total,
        updated_at: parse_time(&raw.4)?,
    })
}

fn load_wallet(conn: &Connection, msme_id: &str) -> Result<Option<WalletBalance>, LedgerError> {
    let raw = conn
        .query_row(
            "SELECT msme_id, wallet_address, resilience_credits, relief_tokens, updated_at
             FROM wallets WHERE msme_id = ?1",
            params![msme_id],
            wallet_from_row,
        )
        .optional()?;
    raw.map(build_wallet).transpose()
}

fn save_wallet(conn: &Connection, wallet: &WalletBalance) -> Result<(), LedgerError> {
    conn.execute(
        "INSERT OR REPLACE INTO wallets
         (msme_id, wallet_address, resilience_credits, relief_tokens, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            wallet.msme_id,
            wallet.wallet_address,
            wallet.resilience_credits.to_string(),
            wallet.relief_tokens.to_string(),
            wallet.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

#[allow(clippy::type_complexity)]
fn allocation_from_row(
    row: &Row<'_>,
) -> rusqlite::Result<(
    String,
    String,
    String,
    u8,
    String,
    String,
    String,
    String,
    String,
    String,
)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
    ))
}

#[allow(clippy::type_complexity)]
fn build_allocation(
    raw: (
        String,
        String,
        String,
        u8,
        String,
        String,
        String,
        String,
        String,
        String,
    ),
) -> Result<TokenAllocation, LedgerError> {
    let codes: Vec<u8> = serde_json::from_str(&raw.7)
        .map_err(|e| LedgerError::Storage(format!("invalid category list: {e}")))?;
    let categories = codes
        .into_iter()
        .map(parse_category)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TokenAllocation {
        id: raw.0,
        msme_id: raw.1,
        disaster_id: raw.2,
        token_type: parse_token_type(raw.3)?,
        amount: parse_amount(&raw.4)?,
        remaining_amount: parse_amount(&raw.5)?,
        valid_until: parse_time(&raw.6)?,
        categories,
        allocated_by: raw.8,
        allocated_at: parse_time(&raw.9)?,
    })
}

const ALLOCATION_COLUMNS: &str = "id, msme_id, disaster_id, token_type, amount, remaining_amount,
     valid_until, categories, allocated_by, allocated_at";

#[allow(clippy::type_complexity)]
fn transaction_from_row(
    row: &Row<'_>,
) -> rusqlite::Result<(
    String,
    String,
    String,
    u8,
    u8,
    String,
    Option<String>,
    Option<String>,
    u32,
    String,
    String,
    String,
    Option<String>,
)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
        row.get(11)?,
        row.get(12)?,
    ))
}

#[allow(clippy::type_complexity)]
fn build_transaction(
    raw: (
        String,
        String,
        String,
        u8,
        u8,
        String,
        Option<String>,
        Option<String>,
        u32,
        String,
        String,
        String,
        Option<String>,
    ),
) -> Result<WalletTransaction, LedgerError> {
    let fraud_flags: Vec<String> = serde_json::from_str(&raw.9)
        .map_err(|e| LedgerError::Storage(format!("invalid flag list: {e}")))?;
    let status = TransactionStatus::from_str(&raw.10)
        .ok_or_else(|| LedgerError::Storage(format!("unknown status: {}", raw.10)))?;

    Ok(WalletTransaction {
        id: raw.0,
        msme_id: raw.1,
        vendor_id: raw.2,
        token_type: parse_token_type(raw.3)?,
        category: parse_category(raw.4)?,
        amount: parse_amount(&raw.5)?,
        booking_id: raw.6,
        chain_tx_hash: raw.7,
        fraud_score: raw.8,
        fraud_flags,
        status,
        created_at: parse_time(&raw.11)?,
        completed_at: raw.12.as_deref().map(parse_time).transpose()?,
    })
}

const TRANSACTION_COLUMNS: &str = "id, msme_id, vendor_id, token_type, category, amount,
     booking_id, chain_tx_hash, fraud_score, fraud_flags, status, created_at, completed_at";

fn insert_transaction(conn: &Connection, txn: &WalletTransaction) -> Result<(), LedgerError> {
    let fraud_flags = serde_json::to_string(&txn.fraud_flags)
        .map_err(|e| LedgerError::Storage(e.to_string()))?;

    conn.execute(
        "INSERT INTO transactions
         (id, msme_id, vendor_id, token_type, category, amount, booking_id,
          chain_tx_hash, fraud_score, fraud_flags, status, created_at, completed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            txn.id,
            txn.msme_id,
            txn.vendor_id,
            txn.token_type.code(),
            txn.category.code(),
            txn.amount.to_string(),
            txn.booking_id,
            txn.chain_tx_hash,
            txn.fraud_score,
            fraud_flags,
            txn.status.as_str(),
            txn.created_at.to_rfc3339(),
            txn.completed_at.map(|t| t.to_rfc3339()),
        ],
    )?;
    Ok(())
}

fn find_transaction_in(
    conn: &Connection,
    txn_id: &str,
) -> Result<Option<WalletTransaction>, LedgerError> {
    let raw = conn
        .query_row(
            &format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1"),
            params![txn_id],
            transaction_from_row,
        )
        .optional()?;
    raw.map(build_transaction).transpose()
}

impl WalletStore for SqliteWalletStore {
    fn get_or_create_balance(&self, msme_id: &str) -> Result<WalletBalance, LedgerError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let wallet = match load_wallet(&tx, msme_id)? {
            Some(wallet) => wallet,
            None => {
                let wallet = WalletBalance::new(msme_id);
                save_wallet(&tx, &wallet)?;
                wallet
            }
        };

        tx.commit()?;
        Ok(wallet)
    }

    fn get_balance(&self, msme_id: &str) -> Result<Option<WalletBalance>, LedgerError> {
        let conn = self.conn.lock().unwrap();
        load_wallet(&conn, msme_id)
    }

    fn set_wallet_address(
        &self,
        msme_id: &str,
        address: &str,
    ) -> Result<WalletBalance, LedgerError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let mut wallet = load_wallet(&tx, msme_id)?.unwrap_or_else(|| WalletBalance::new(msme_id));
        wallet.wallet_address = Some(address.to_string());
        wallet.updated_at = Utc::now();
        save_wallet(&tx, &wallet)?;

        tx.commit()?;
        Ok(wallet)
    }

    fn credit_tokens(
        &self,
        msme_id: &str,
        token_type: TokenType,
        amount: TokenAmount,
    ) -> Result<WalletBalance, LedgerError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let mut wallet = load_wallet(&tx, msme_id)?.unwrap_or_else(|| WalletBalance::new(msme_id));
        wallet.credit(token_type, amount)?;
        save_wallet(&tx, &wallet)?;

        tx.commit()?;
        info!(msme_id, %token_type, %amount, "credited tokens");
        Ok(wallet)
    }

    fn create_allocation(
        &self,
        allocation: TokenAllocation,
    ) -> Result<TokenAllocation, LedgerError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let mut wallet = load_wallet(&tx, &allocation.msme_id)?
            .unwrap_or_else(|| WalletBalance::new(&allocation.msme_id));
        wallet.credit(allocation.token_type, allocation.amount)?;
        save_wallet(&tx, &wallet)?;

        let categories: Vec<u8> = allocation.categories.iter().map(|c| c.code()).collect();
        let categories = serde_json::to_string(&categories)
            .map_err(|e| LedgerError::Storage(e.to_string()))?;

        tx.execute(
            "INSERT INTO allocations
             (id, msme_id, disaster_id, token_type, amount, remaining_amount,
              valid_until, categories, allocated_by, allocated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                allocation.id,
                allocation.msme_id,
                allocation.disaster_id,
                allocation.token_type.code(),
                allocation.amount.to_string(),
                allocation.remaining_amount.to_string(),
                allocation.valid_until.to_rfc3339(),
                categories,
                allocation.allocated_by,
                allocation.allocated_at.to_rfc3339(),
            ],
        )?;

        tx.commit()?;
        info!(
            allocation_id = %allocation.id,
            msme_id = %allocation.msme_id,
            "allocation created"
        );
        Ok(allocation)
    }

    fn find_active_allocations(
        &self,
        msme_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<TokenAllocation>, LedgerError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ALLOCATION_COLUMNS} FROM allocations
             WHERE msme_id = ?1 ORDER BY allocated_at ASC, rowid ASC"
        ))?;

        let rows = stmt
            .query_map(params![msme_id], allocation_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut active = Vec::new();
        for raw in rows {
            let allocation = build_allocation(raw)?;
            if allocation.is_active(now) {
                active.push(allocation);
            }
        }
        Ok(active)
    }

    fn find_allocations_by_disaster(
        &self,
        disaster_id: &str,
    ) -> Result<Vec<TokenAllocation>, LedgerError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ALLOCATION_COLUMNS} FROM allocations
             WHERE disaster_id = ?1 ORDER BY allocated_at ASC, rowid ASC"
        ))?;

        let rows = stmt
            .query_map(params![disaster_id], allocation_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(build_allocation).collect()
    }

    fn record_flagged(&self, txn: WalletTransaction) -> Result<WalletTransaction, LedgerError> {
        let conn = self.conn.lock().unwrap();
        let mut txn = txn;
        txn.status = TransactionStatus::Flagged;
        insert_transaction(&conn, &txn)?;
        info!(txn_id = %txn.id, msme_id = %txn.msme_id, "transaction flagged for review");
        Ok(txn)
    }

    fn commit_spend(&self, txn: WalletTransaction) -> Result<WalletTransaction, LedgerError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        // Re-validate under the transaction; the caller's earlier check
        // may be stale.
        let mut wallet = load_wallet(&tx, &txn.msme_id)?
            .ok_or_else(|| LedgerError::WalletNotFound(txn.msme_id.clone()))?;
        wallet.debit(txn.token_type, txn.amount)?;
        save_wallet(&tx, &wallet)?;

        let mut txn = txn;
        txn.status = TransactionStatus::Completed;
        txn.completed_at = Some(Utc::now());
        insert_transaction(&tx, &txn)?;

        tx.commit()?;
        info!(txn_id = %txn.id, msme_id = %txn.msme_id, amount = %txn.amount, "spend committed");
        Ok(txn)
    }

    fn resolve_flagged(
        &self,
        txn_id: &str,
        approve: bool,
    ) -> Result<WalletTransaction, LedgerError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let mut txn = find_transaction_in(&tx, txn_id)?
            .ok_or_else(|| LedgerError::TransactionNotFound(txn_id.to_string()))?;

        if txn.status != TransactionStatus::Flagged {
            return Err(LedgerError::NotFlagged {
                id: txn_id.to_string(),
                status: txn.status,
            });
        }

        if approve {
            let mut wallet = load_wallet(&tx, &txn.msme_id)?
                .ok_or_else(|| LedgerError::WalletNotFound(txn.msme_id.clone()))?;
            // On insufficient balance the transaction stays flagged.
            wallet.debit(txn.token_type, txn.amount)?;
            save_wallet(&tx, &wallet)?;
        }

        txn.status = if approve {
            TransactionStatus::Completed
        } else {
            TransactionStatus::Failed
        };
        txn.completed_at = Some(Utc::now());

        tx.execute(
            "UPDATE transactions SET status = ?1, completed_at = ?2 WHERE id = ?3",
            params![
                txn.status.as_str(),
                txn.completed_at.map(|t| t.to_rfc3339()),
                txn.id,
            ],
        )?;

        tx.commit()?;
        info!(txn_id, approve, "flagged transaction resolved");
        Ok(txn)
    }

    fn find_transaction(&self, txn_id: &str) -> Result<Option<WalletTransaction>, LedgerError> {
        let conn = self.conn.lock().unwrap();
        find_transaction_in(&conn, txn_id)
    }

    fn recent_transactions(
        &self,
        msme_id: &str,
        limit: usize,
    ) -> Result<Vec<WalletTransaction>, LedgerError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions
             WHERE msme_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT ?2"
        ))?;

        let rows = stmt
            .query_map(params![msme_id, limit as i64], transaction_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(build_transaction).collect()
    }

    fn find_flagged(&self) -> Result<Vec<WalletTransaction>, LedgerError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions
             WHERE status = 'flagged' ORDER BY created_at ASC, rowid ASC"
        ))?;

        let rows = stmt
            .query_map([], transaction_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(build_transaction).collect()
    }

    fn attach_chain_hash(
        &self,
        txn_id: &str,
        hash: &str,
    ) -> Result<WalletTransaction, LedgerError> {
        let conn = self.conn.lock().unwrap();

        let rows = conn.execute(
            "UPDATE transactions SET chain_tx_hash = ?1 WHERE id = ?2",
            params![hash, txn_id],
        )?;
        if rows == 0 {
            return Err(LedgerError::TransactionNotFound(txn_id.to_string()));
        }

        find_transaction_in(&conn, txn_id)?
            .ok_or_else(|| LedgerError::TransactionNotFound(txn_id.to_string()))
    }
}
