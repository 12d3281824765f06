//! The caller a request is attributed to.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Caller identity: a bearer token plus free-form claims.
///
/// There is no authentication step yet. Every audited request is attributed
/// to [`Identity::anonymous`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Identity {
    token: String,
    claims: BTreeMap<String, Value>,
}

impl Identity {
    pub const ANONYMOUS_TOKEN: &'static str = "tanonymous";
    pub const ANONYMOUS_ID: &'static str = "uanonymous";
    pub const ANONYMOUS_NAME: &'static str = "User Anonymous";

    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into(), claims: BTreeMap::new() }
    }

    /// The fixed placeholder identity.
    pub fn anonymous() -> Self {
        Self::new(Self::ANONYMOUS_TOKEN)
            .with_claim("ID", Self::ANONYMOUS_ID)
            .with_claim("Name", Self::ANONYMOUS_NAME)
    }

    #[must_use]
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.claims.insert(name.into(), value.into());
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn claims(&self) -> &BTreeMap<String, Value> {
        &self.claims
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_is_fixed() {
        let id = Identity::anonymous();
        assert_eq!(id.token(), "tanonymous");
        assert_eq!(id.claim("ID"), Some(&Value::from("uanonymous")));
        assert_eq!(id.claim("Name"), Some(&Value::from("User Anonymous")));
        assert_eq!(id, Identity::anonymous());
    }

    #[test]
    fn serializes_token_and_claims() {
        let json = serde_json::to_value(Identity::anonymous()).unwrap();
        assert_eq!(json["token"], "tanonymous");
        assert_eq!(json["claims"]["ID"], "uanonymous");
    }
}
