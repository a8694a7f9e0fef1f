use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Church {
    pub id: Uuid,
    pub name: String,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Display subset served on the public invitation-validation path.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChurchSummary {
    pub id: Uuid,
    pub name: String,
    pub logo_url: Option<String>,
}

/// Role a user holds inside one church. A user has at most one role row per
/// church; the landing route after invitation acceptance is derived from the
/// full set a user holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChurchRole {
    Admin,
    Pastor,
    Treasurer,
    Secretary,
    CellLeader,
    MinistryLeader,
    Consolidation,
    Member,
}

impl sqlx::Type<sqlx::Postgres> for ChurchRole {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for ChurchRole {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        let s = self.as_str();
        <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&s, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ChurchRole {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        s.parse::<ChurchRole>().map_err(Into::into)
    }
}

impl ChurchRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChurchRole::Admin => "admin",
            ChurchRole::Pastor => "pastor",
            ChurchRole::Treasurer => "treasurer",
            ChurchRole::Secretary => "secretary",
            ChurchRole::CellLeader => "cell_leader",
            ChurchRole::MinistryLeader => "ministry_leader",
            ChurchRole::Consolidation => "consolidation",
            ChurchRole::Member => "member",
        }
    }

    /// Roles allowed to issue, list and revoke invitations for their church.
    pub fn can_manage_invitations(&self) -> bool {
        matches!(
            self,
            ChurchRole::Admin | ChurchRole::Pastor | ChurchRole::Secretary
        )
    }
}

impl Default for ChurchRole {
    fn default() -> Self {
        ChurchRole::Member
    }
}

impl std::fmt::Display for ChurchRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ChurchRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(ChurchRole::Admin),
            "pastor" => Ok(ChurchRole::Pastor),
            "treasurer" => Ok(ChurchRole::Treasurer),
            "secretary" => Ok(ChurchRole::Secretary),
            "cell_leader" => Ok(ChurchRole::CellLeader),
            "ministry_leader" => Ok(ChurchRole::MinistryLeader),
            "consolidation" => Ok(ChurchRole::Consolidation),
            "member" => Ok(ChurchRole::Member),
            _ => Err(format!("Invalid ChurchRole: {}", s)),
        }
    }
}

/// Row in `user_roles`, the role-assignment table written only by invitation
/// acceptance.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserChurchRole {
    pub id: Uuid,
    pub user_id: Uuid,
    pub church_id: Uuid,
    pub role: ChurchRole,
    pub created_at: DateTime<Utc>,
}
