mod amount;
pub use amount::*;

mod options;
pub use options::*;

mod request;
pub use request::*;

mod response;
pub use response::*;

mod tx_json;
pub use tx_json::*;
