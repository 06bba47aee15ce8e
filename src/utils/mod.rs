mod canonical;
pub use canonical::*;
