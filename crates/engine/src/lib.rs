//! Domain model and persistence for splitmail.
//!
//! The engine owns the two stores the HTTP layer talks to:
//!
//! - the credential store (`users` table): registration and password checks;
//! - the record store (`distributions` table): saved expense splits.
//!
//! It also defines the in-memory [`Distribution`] consumed by the mailer.

pub use distribution::{Distribution, Payment, SpenderLedger};
pub use distributions::{DistributionNew, DistributionRecord};
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder};
pub use users::User;

mod distribution;
mod distributions;
mod error;
mod money;
mod ops;
mod password;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
