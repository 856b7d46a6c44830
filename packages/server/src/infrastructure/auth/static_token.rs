//! Fixed token table for local development and tests.

use std::{collections::HashMap, str::FromStr};

use async_trait::async_trait;

use crate::domain::{AuthError, AuthVerifier, Identity, UserId, Username};

/// Verifier backed by a `token -> identity` table.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }
}

impl FromIterator<StaticToken> for StaticTokenVerifier {
    fn from_iter<I: IntoIterator<Item = StaticToken>>(iter: I) -> Self {
        Self {
            tokens: iter
                .into_iter()
                .map(|entry| (entry.token, entry.identity))
                .collect(),
        }
    }
}

#[async_trait]
impl AuthVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::InvalidToken("unknown token".to_string()))
    }
}

/// One `token:user_id:username` entry, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticToken {
    pub token: String,
    pub identity: Identity,
}

impl FromStr for StaticToken {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(token), Some(user_id), Some(username)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(format!("expected token:user_id:username, got '{s}'"));
        };
        if token.is_empty() {
            return Err("token cannot be empty".to_string());
        }
        let user_id = user_id
            .parse::<i64>()
            .map_err(|e| format!("invalid user_id '{user_id}': {e}"))?;
        let username = Username::new(username.to_string()).map_err(|e| e.to_string())?;
        Ok(Self {
            token: token.to_string(),
            identity: Identity::new(UserId::new(user_id), username),
        })
    }
}
