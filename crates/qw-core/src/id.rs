//! Operation and link identifiers.
//!
//! Ids are interned strings such as `cnot_4` or `link_9`. They are minted
//! once, when an operation or link is created, and never change after:
//! dragging keeps the id, re-parsing mints fresh ones.

use crate::model::GateKind;
use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Shared by every minted id, so `h_3` and `link_3` never coexist.
static NEXT_SERIAL: AtomicU64 = AtomicU64::new(0);

/// Interned id of an operation or link. 4 bytes, `Copy`, O(1) `Eq` and `Hash`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct OpId(Spur);

impl OpId {
    /// Intern `s` as an id, or return the existing one.
    pub fn intern(s: &str) -> Self {
        OpId(INTERNER.get_or_intern(s))
    }

    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Fresh id for a new operation, named after its kind (`cz_12`).
    pub fn for_operation(kind: GateKind) -> Self {
        Self::mint(kind.name())
    }

    /// Fresh id for a new control link (`link_13`).
    pub fn for_link() -> Self {
        Self::mint("link")
    }

    fn mint(prefix: &str) -> Self {
        let serial = NEXT_SERIAL.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{serial}"))
    }
}

impl fmt::Debug for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpId({})", self.as_str())
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for OpId {
    fn from(s: String) -> Self {
        OpId::intern(&s)
    }
}

impl From<OpId> for String {
    fn from(id: OpId) -> Self {
        id.as_str().to_string()
    }
}
