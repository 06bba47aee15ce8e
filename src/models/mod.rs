mod address;
pub use address::*;

mod error;
pub use error::*;

mod network;
pub use network::*;

mod transaction;
pub use transaction::*;
