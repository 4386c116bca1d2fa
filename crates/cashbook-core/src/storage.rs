use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use cashbook_domain::Ledger;

use crate::CoreError;

/// Abstraction over persistence backends capable of storing named ledgers.
pub trait LedgerStorage: Send + Sync {
    fn save_ledger(&self, name: &str, ledger: &Ledger) -> Result<(), CoreError>;
    fn load_ledger(&self, name: &str) -> Result<Ledger, CoreError>;
    fn list_ledgers(&self) -> Result<Vec<String>, CoreError>;
    fn delete_ledger(&self, name: &str) -> Result<(), CoreError>;

    fn contains_ledger(&self, name: &str) -> Result<bool, CoreError> {
        Ok(self.list_ledgers()?.iter().any(|stored| stored == name))
    }
}

impl<T: LedgerStorage + ?Sized> LedgerStorage for Arc<T> {
    fn save_ledger(&self, name: &str, ledger: &Ledger) -> Result<(), CoreError> {
        (**self).save_ledger(name, ledger)
    }

    fn load_ledger(&self, name: &str) -> Result<Ledger, CoreError> {
        (**self).load_ledger(name)
    }

    fn list_ledgers(&self) -> Result<Vec<String>, CoreError> {
        (**self).list_ledgers()
    }

    fn delete_ledger(&self, name: &str) -> Result<(), CoreError> {
        (**self).delete_ledger(name)
    }

    fn contains_ledger(&self, name: &str) -> Result<bool, CoreError> {
        (**self).contains_ledger(name)
    }
}

/// In-process store. `fail_writes` makes every save fail, simulating a remote
/// store that rejected the write.
#[derive(Debug, Default)]
pub struct MemoryLedgerStorage {
    ledgers: Mutex<BTreeMap<String, Ledger>>,
    fail_writes: AtomicBool,
}

impl MemoryLedgerStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Ledger>>, CoreError> {
        self.ledgers
            .lock()
            .map_err(|_| CoreError::Storage("memory store lock poisoned".into()))
    }
}

impl LedgerStorage for MemoryLedgerStorage {
    fn save_ledger(&self, name: &str, ledger: &Ledger) -> Result<(), CoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CoreError::Storage(format!("write of `{name}` rejected")));
        }
        self.lock()?.insert(name.to_string(), ledger.clone());
        Ok(())
    }

    fn load_ledger(&self, name: &str) -> Result<Ledger, CoreError> {
        self.lock()?
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::Storage(format!("ledger `{name}` not found")))
    }

    fn list_ledgers(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    fn delete_ledger(&self, name: &str) -> Result<(), CoreError> {
        self.lock()?
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| CoreError::Storage(format!("ledger `{name}` not found")))
    }
}
