pub mod provider;
pub mod signer;
