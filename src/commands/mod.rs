pub mod fetch;
pub mod import;
pub mod serve;

// Re-export command functions for convenience
pub use fetch::{fetch, normalize};
pub use import::{import, media};
pub use serve::{serve, ServeParams};
