//! `AuthVerifier` implementations.

pub mod jwt;
pub mod static_token;

pub use jwt::{JwtAuthVerifier, JwtClaims};
pub use static_token::{StaticToken, StaticTokenVerifier};
