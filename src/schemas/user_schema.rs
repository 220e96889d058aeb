// User Schemas - explicit profile creation and profile edits

use serde::Deserialize;

use crate::entities::{EntUser, SocialLinks};
use crate::error::AppResult;
use crate::infrastructure::identity::Identity;
use crate::schemas::validation::{
    non_blank, FieldValidator, Validator, EMAIL_PATTERN, URL_PATTERN, USERNAME_PATTERN,
};

fn username_rules() -> [FieldValidator; 3] {
    [
        FieldValidator::MinLength(3),
        FieldValidator::MaxLength(30),
        FieldValidator::Pattern(USERNAME_PATTERN),
    ]
}

fn validate_social_links(v: &mut Validator, links: &SocialLinks) -> AppResult<()> {
    for (field, value) in [
        ("socialLinks.twitter", &links.twitter),
        ("socialLinks.instagram", &links.instagram),
        ("socialLinks.linkedin", &links.linkedin),
    ] {
        v.optional_str(field, value.as_deref(), &[FieldValidator::MaxLength(200)])?;
    }
    Ok(())
}

/// GET /users query
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub external_id: Option<String>,
    pub username: Option<String>,
}

/// POST /users
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub social_links: Option<SocialLinks>,
}

impl CreateUserRequest {
    pub fn into_user(self, identity: &Identity) -> AppResult<EntUser> {
        let mut v = Validator::new();
        v.required_str("email", self.email.as_deref(), &[FieldValidator::Pattern(EMAIL_PATTERN)])?;
        v.required_str("username", self.username.as_deref(), &username_rules())?;
        v.required_str("firstName", self.first_name.as_deref(), &[FieldValidator::MaxLength(100)])?;
        v.required_str("lastName", self.last_name.as_deref(), &[FieldValidator::MaxLength(100)])?;
        v.optional_str("bio", self.bio.as_deref(), &[FieldValidator::MaxLength(500)])?;
        v.optional_str("location", self.location.as_deref(), &[FieldValidator::MaxLength(100)])?;
        v.optional_str("website", self.website.as_deref(), &[FieldValidator::Pattern(URL_PATTERN)])?;
        if let Some(links) = &self.social_links {
            validate_social_links(&mut v, links)?;
        }
        v.finish("Invalid user")?;

        Ok(EntUser {
            external_id: identity.external_id.clone(),
            email: non_blank(self.email).unwrap_or_default().to_lowercase(),
            username: non_blank(self.username).unwrap_or_default(),
            first_name: non_blank(self.first_name).unwrap_or_default(),
            last_name: non_blank(self.last_name).unwrap_or_default(),
            profile_image: non_blank(self.profile_image).unwrap_or_default(),
            bio: self.bio.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            website: self.website.unwrap_or_default(),
            social_links: self.social_links.unwrap_or_default(),
            followers: Vec::new(),
            following: Vec::new(),
        })
    }
}

/// PUT /users/me; identity-managed fields (email, username) are not editable here
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub social_links: Option<SocialLinks>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut v = Validator::new();
        v.optional_str(
            "firstName",
            self.first_name.as_deref(),
            &[FieldValidator::NotBlank, FieldValidator::MaxLength(100)],
        )?;
        v.optional_str(
            "lastName",
            self.last_name.as_deref(),
            &[FieldValidator::NotBlank, FieldValidator::MaxLength(100)],
        )?;
        v.optional_str("bio", self.bio.as_deref(), &[FieldValidator::MaxLength(500)])?;
        v.optional_str("location", self.location.as_deref(), &[FieldValidator::MaxLength(100)])?;
        v.optional_str("website", self.website.as_deref(), &[FieldValidator::Pattern(URL_PATTERN)])?;
        if let Some(links) = &self.social_links {
            validate_social_links(&mut v, links)?;
        }
        v.finish("Invalid profile update")
    }

    pub fn apply_to(&self, user: &mut EntUser) {
        if let Some(first_name) = non_blank(self.first_name.clone()) {
            user.first_name = first_name;
        }
        if let Some(last_name) = non_blank(self.last_name.clone()) {
            user.last_name = last_name;
        }
        if let Some(profile_image) = &self.profile_image {
            user.profile_image = profile_image.trim().to_string();
        }
        if let Some(bio) = &self.bio {
            user.bio = bio.clone();
        }
        if let Some(location) = &self.location {
            user.location = location.clone();
        }
        if let Some(website) = &self.website {
            user.website = website.trim().to_string();
        }
        if let Some(links) = &self.social_links {
            user.social_links = links.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;

    #[test]
    fn test_create_user_binds_identity() {
        let request: CreateUserRequest = serde_json::from_value(json!({
            "email": "Ada@Campus.edu",
            "username": "ada_l",
            "firstName": "Ada",
            "lastName": "Lovelace"
        }))
        .unwrap();

        let user = request.into_user(&Identity::new("user_2abc")).unwrap();
        assert_eq!(user.external_id, "user_2abc");
        assert_eq!(user.email, "ada@campus.edu");
        assert!(user.followers.is_empty());
    }

    #[test]
    fn test_create_user_rejects_bad_username() {
        let request: CreateUserRequest = serde_json::from_value(json!({
            "email": "ada@campus.edu",
            "username": "a!",
            "firstName": "Ada",
            "lastName": "Lovelace"
        }))
        .unwrap();

        match request.into_user(&Identity::new("user_2abc")) {
            Err(AppError::Validation { details, .. }) => {
                assert_eq!(
                    details,
                    vec![
                        "username must be at least 3 characters",
                        "username format is invalid"
                    ]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_profile_patch_cannot_touch_identity_fields() {
        assert!(serde_json::from_value::<UpdateProfileRequest>(json!({"email": "x@y.z"})).is_err());
        assert!(serde_json::from_value::<UpdateProfileRequest>(json!({"followers": []})).is_err());

        let patch: UpdateProfileRequest = serde_json::from_value(json!({
            "bio": "Physics major",
            "socialLinks": {"twitter": "@ada"}
        }))
        .unwrap();
        patch.validate().unwrap();

        let mut user = EntUser::default();
        patch.apply_to(&mut user);
        assert_eq!(user.bio, "Physics major");
        assert_eq!(user.social_links.twitter.as_deref(), Some("@ada"));
    }
}
