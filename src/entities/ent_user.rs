// EntUser - application profile for an external identity

use serde::{Deserialize, Serialize};

use crate::core::DocId;
use crate::framework::{Entity, Record};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntUser {
    /// Subject id at the identity provider; unique
    pub external_id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_image: String,
    pub bio: String,
    pub location: String,
    pub website: String,
    pub social_links: SocialLinks,
    pub followers: Vec<DocId>,
    pub following: Vec<DocId>,
}

impl Entity for EntUser {
    const COLLECTION: &'static str = "users";
    const ENTITY_NAME: &'static str = "User";
}

impl EntUser {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Public fields embedded wherever another document references a user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: DocId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_image: String,
}

impl From<&Record<EntUser>> for UserSummary {
    fn from(record: &Record<EntUser>) -> Self {
        UserSummary {
            id: record.id,
            username: record.data.username.clone(),
            first_name: record.data.first_name.clone(),
            last_name: record.data.last_name.clone(),
            profile_image: record.data.profile_image.clone(),
        }
    }
}
