// Donated Item Schemas - donation submission and borrow requests

use serde::de::IgnoredAny;
use serde::Deserialize;

use crate::entities::{DonatedItemCategory, EntDonatedItem, ItemCondition};
use crate::error::AppResult;
use crate::schemas::validation::{non_blank, FieldValidator, Validator, EMAIL_PATTERN};

/// POST /donated-items
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateDonatedItemRequest {
    pub donor_name: Option<String>,
    pub donor_email: Option<String>,
    pub donor_phone: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<DonatedItemCategory>,
    pub condition: Option<ItemCondition>,
    pub images: Option<Vec<String>>,
    /// Accepted and ignored; new items are always available
    pub available: Option<IgnoredAny>,
}

impl CreateDonatedItemRequest {
    pub fn into_item(self) -> AppResult<EntDonatedItem> {
        let mut v = Validator::new();
        v.required_str("title", self.title.as_deref(), &[FieldValidator::MaxLength(200)])?;
        v.required_str(
            "description",
            self.description.as_deref(),
            &[FieldValidator::MaxLength(1000)],
        )?;
        v.required("category", &self.category);
        v.required("condition", &self.condition);
        v.required_str("donorName", self.donor_name.as_deref(), &[FieldValidator::MaxLength(100)])?;
        v.optional_str(
            "donorEmail",
            self.donor_email.as_deref(),
            &[FieldValidator::MaxLength(100), FieldValidator::Pattern(EMAIL_PATTERN)],
        )?;
        v.optional_str("donorPhone", self.donor_phone.as_deref(), &[FieldValidator::MaxLength(20)])?;
        v.finish("Invalid donated item")?;

        Ok(EntDonatedItem {
            donor_name: non_blank(self.donor_name).unwrap_or_default(),
            donor_email: non_blank(self.donor_email),
            donor_phone: non_blank(self.donor_phone),
            title: non_blank(self.title).unwrap_or_default(),
            description: non_blank(self.description).unwrap_or_default(),
            category: self.category.unwrap_or(DonatedItemCategory::Other),
            condition: self.condition.unwrap_or(ItemCondition::Good),
            images: self.images.unwrap_or_default(),
            available: true,
            borrowed_by: None,
            borrowed_at: None,
        })
    }
}

/// POST /donated-items/{id}/borrow
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BorrowRequest {
    pub borrower_name: Option<String>,
    pub borrower_email: Option<String>,
    pub borrower_phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BorrowerInfo {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl BorrowRequest {
    pub fn into_borrower(self) -> AppResult<BorrowerInfo> {
        let mut v = Validator::new();
        v.required_str(
            "borrowerName",
            self.borrower_name.as_deref(),
            &[FieldValidator::MaxLength(100)],
        )?;
        v.optional_str(
            "borrowerEmail",
            self.borrower_email.as_deref(),
            &[FieldValidator::Pattern(EMAIL_PATTERN)],
        )?;
        v.optional_str(
            "borrowerPhone",
            self.borrower_phone.as_deref(),
            &[FieldValidator::MaxLength(20)],
        )?;
        v.finish("Borrower name is required")?;

        Ok(BorrowerInfo {
            name: non_blank(self.borrower_name).unwrap_or_default(),
            email: non_blank(self.borrower_email),
            phone: non_blank(self.borrower_phone),
        })
    }
}
