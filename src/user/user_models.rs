use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Role classification of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Admin,
    Nurse,
    Caregiver,
    Doctor,
    Family,
    Resident,
}

impl UserType {
    pub const ALL: [UserType; 6] = [
        UserType::Admin,
        UserType::Nurse,
        UserType::Caregiver,
        UserType::Doctor,
        UserType::Family,
        UserType::Resident,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Admin => "admin",
            UserType::Nurse => "nurse",
            UserType::Caregiver => "caregiver",
            UserType::Doctor => "doctor",
            UserType::Family => "family",
            UserType::Resident => "resident",
        }
    }

    /// Staff roles can be listed as instant-messaging contacts.
    pub fn is_messaging_eligible(&self) -> bool {
        matches!(
            self,
            UserType::Admin | UserType::Nurse | UserType::Caregiver | UserType::Doctor
        )
    }

    pub fn messaging_eligible() -> Vec<UserType> {
        Self::ALL
            .into_iter()
            .filter(UserType::is_messaging_eligible)
            .collect()
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown user type: {}", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub user_type: String,
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Option<UserType> {
        self.user_type.parse().ok()
    }
}

/// Counterpart details embedded in a conversation summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub full_name: String,
    pub user_type: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            user_type: user.user_type,
        }
    }
}
