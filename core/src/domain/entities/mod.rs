//! Domain entities carried inside a token.

pub mod token;

// Re-export commonly used types
pub use token::{Header, Payload, UserInfo, ALGORITHM, TOKEN_TYPE};

#[cfg(test)]
mod tests;
