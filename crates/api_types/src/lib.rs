use serde::{Deserialize, Serialize};

/// Plain acknowledgement returned by endpoints with no payload of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub mod user {
    use super::*;
    use uuid::Uuid;

    /// Body of both `/register` and `/login`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Credentials {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub auth: bool,
        pub token: String,
        /// Id to use in `/distributions/{user_id}`.
        pub user_id: Uuid,
    }
}

pub mod distribution {
    use super::*;
    use chrono::{DateTime, Utc};
    use indexmap::IndexMap;
    use uuid::Uuid;

    /// A single payment made by a spender on behalf of a friend.
    ///
    /// `amount` travels as a JSON number in major units (e.g. `10.5`).
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Payment {
        pub description: String,
        pub amount: f64,
        #[serde(default)]
        pub paid: bool,
    }

    /// Spender name -> payments, in the order the keys appear in the JSON object.
    pub type SpenderLedger = IndexMap<String, Vec<Payment>>;

    /// Friend name -> that friend's ledger.
    pub type Distribution = IndexMap<String, SpenderLedger>;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DistributionNew {
        /// Owner of the record. Defaults to the authenticated user.
        pub user_id: Option<Uuid>,
        pub amount: f64,
        #[serde(default)]
        pub friends: String,
        #[serde(default)]
        pub spender: String,
        #[serde(default)]
        pub description: String,
        #[serde(default)]
        pub distribution: Distribution,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DistributionRecord {
        pub id: Uuid,
        pub user_id: Uuid,
        pub amount: f64,
        pub friends: String,
        pub spender: String,
        pub description: String,
        pub distribution: Distribution,
        pub created_at: DateTime<Utc>,
    }

    /// Body of `/send-distribution-email`.
    ///
    /// Every field is optional on the wire so that a missing field is
    /// reported as "missing required data" rather than as a JSON error.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SendDistributionEmail {
        pub friends: Option<Vec<String>>,
        #[serde(rename = "friendEmails")]
        pub friend_emails: Option<Vec<String>>,
        pub distribution: Option<Distribution>,
    }
}

#[cfg(test)]
mod tests {
    use super::distribution::*;

    #[test]
    fn ledger_keeps_json_key_order() {
        let json = r#"{
            "Alice": {
                "Zoe": [{"description": "taxi", "amount": 4, "paid": true}],
                "Bob": [{"description": "lunch", "amount": 10.5}]
            }
        }"#;
        let distribution: Distribution = serde_json::from_str(json).unwrap();
        let spenders: Vec<_> = distribution["Alice"].keys().cloned().collect();

        assert_eq!(spenders, vec!["Zoe".to_string(), "Bob".to_string()]);
        assert!(!distribution["Alice"]["Bob"][0].paid);
    }

    #[test]
    fn send_email_body_uses_camel_case_emails() {
        let json = r#"{"friends": ["Alice"], "friendEmails": ["a@x.com"]}"#;
        let body: SendDistributionEmail = serde_json::from_str(json).unwrap();

        assert_eq!(body.friend_emails, Some(vec!["a@x.com".to_string()]));
        assert!(body.distribution.is_none());
    }
}
