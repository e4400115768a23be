//! Configuration utility types.
//!
//! | Module   | Purpose                                      |
//! |----------|----------------------------------------------|
//! | `error`  | Configuration error and diagnostic types     |

mod error;

pub use error::{ConfigDiagnostic, ConfigDiagnostics, ConfigError};
