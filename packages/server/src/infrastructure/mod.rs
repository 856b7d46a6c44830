//! Infrastructure layer
//!
//! ドメイン層が定義する trait の具体的な実装と、外部とのデータ変換（DTO）を提供します。

pub mod auth;
pub mod dto;
pub mod repository;
