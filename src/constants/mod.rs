//! This module contains all the constant values used in the system
mod logging;
pub use logging::*;

mod transaction;
pub use transaction::*;

mod ledger;
pub use ledger::*;
