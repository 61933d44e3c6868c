//! Distribution primitives.
//!
//! A [`Distribution`] maps every friend to a [`SpenderLedger`], which in turn
//! lists, per spender, the [`Payment`]s that spender made for the friend.
//! Both maps keep insertion order: it is the order reports are written in.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents, ResultEngine};

/// Spender name -> payments made by that spender, in insertion order.
pub type SpenderLedger = IndexMap<String, Vec<Payment>>;

/// Friend name -> that friend's ledger.
pub type Distribution = IndexMap<String, SpenderLedger>;

/// A payment a spender made on behalf of a friend.
///
/// The amount is never negative; it is checked once at construction and the
/// payment cannot be changed afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PaymentRepr", into = "PaymentRepr")]
pub struct Payment {
    description: String,
    amount: MoneyCents,
    paid: bool,
}

impl Payment {
    pub fn new(description: impl Into<String>, amount: MoneyCents, paid: bool) -> ResultEngine<Self> {
        if amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "payment amount must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            description: description.into(),
            amount,
            paid,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> MoneyCents {
        self.amount
    }

    pub fn paid(&self) -> bool {
        self.paid
    }

    /// Amount still owed for this payment: zero once it has been paid.
    pub fn due(&self) -> MoneyCents {
        if self.paid {
            MoneyCents::ZERO
        } else {
            self.amount
        }
    }
}

/// Storage shape of a [`Payment`].
#[derive(Serialize, Deserialize)]
struct PaymentRepr {
    description: String,
    amount_minor: i64,
    paid: bool,
}

impl TryFrom<PaymentRepr> for Payment {
    type Error = EngineError;

    fn try_from(value: PaymentRepr) -> Result<Self, Self::Error> {
        Payment::new(
            value.description,
            MoneyCents::new(value.amount_minor),
            value.paid,
        )
    }
}

impl From<Payment> for PaymentRepr {
    fn from(value: Payment) -> Self {
        Self {
            description: value.description,
            amount_minor: value.amount.cents(),
            paid: value.paid,
        }
    }
}
