// Listing Schemas - request bodies for the listing catalog

use chrono::Utc;
use serde::de::IgnoredAny;
use serde::Deserialize;

use crate::core::DocId;
use crate::entities::{
    ContactInfo, Dimensions, EntListing, ListingCondition, ListingDetails, ListingStatus, Review,
    Weight,
};
use crate::error::{AppError, AppResult};
use crate::schemas::validation::{non_blank, FieldValidator, Validator, EMAIL_PATTERN};

const PRICE_RANGE: FieldValidator = FieldValidator::Range(0.0, f64::MAX);
const MAX_COMMENT_LENGTH: usize = 500;

/// Optional descriptive attributes shared by create and update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListingAttributes {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub edition: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub author: Option<String>,
    pub pages: Option<u32>,
    pub language: Option<String>,
    pub dimensions: Option<Dimensions>,
    pub weight: Option<Weight>,
    pub warranty: Option<String>,
    pub return_policy: Option<String>,
    pub shipping_info: Option<String>,
    pub contact_info: Option<ContactInfo>,
}

impl ListingAttributes {
    fn validate(&self, v: &mut Validator) -> AppResult<()> {
        if let Some(contact) = &self.contact_info {
            v.optional_str(
                "contactInfo.email",
                contact.email.as_deref(),
                &[FieldValidator::Pattern(EMAIL_PATTERN)],
            )?;
        }
        if let Some(weight) = &self.weight {
            v.check_number("weight.value", weight.value, &[PRICE_RANGE]);
        }
        Ok(())
    }

    /// Overlay the attributes that are present onto `details`
    fn merge_into(&self, details: &mut ListingDetails) {
        fn overlay<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                target.clone_from(value);
            }
        }

        overlay(&mut details.brand, &self.brand);
        overlay(&mut details.model, &self.model);
        overlay(&mut details.year, &self.year);
        overlay(&mut details.edition, &self.edition);
        overlay(&mut details.isbn, &self.isbn);
        overlay(&mut details.publisher, &self.publisher);
        overlay(&mut details.author, &self.author);
        overlay(&mut details.pages, &self.pages);
        overlay(&mut details.language, &self.language);
        overlay(&mut details.dimensions, &self.dimensions);
        overlay(&mut details.weight, &self.weight);
        overlay(&mut details.warranty, &self.warranty);
        overlay(&mut details.return_policy, &self.return_policy);
        overlay(&mut details.shipping_info, &self.shipping_info);
        overlay(&mut details.contact_info, &self.contact_info);
    }
}

/// POST /listings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateListingRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub condition: Option<ListingCondition>,
    pub location: Option<String>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    /// Accepted and ignored; new listings are always active
    pub status: Option<IgnoredAny>,
    #[serde(flatten)]
    pub attributes: ListingAttributes,
}

impl CreateListingRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut v = Validator::new();
        v.required_str("title", self.title.as_deref(), &[FieldValidator::MaxLength(200)])?;
        v.required_str("description", self.description.as_deref(), &[])?;
        v.required_str("category", self.category.as_deref(), &[])?;
        v.required("condition", &self.condition);
        v.required_str("location", self.location.as_deref(), &[])?;
        match self.price {
            Some(price) => {
                v.check_number("price", price, &[PRICE_RANGE]);
            }
            None => {
                v.push("price is required");
            }
        }
        self.attributes.validate(&mut v)?;
        v.finish("Invalid listing")
    }

    pub fn into_listing(self, seller_id: DocId) -> AppResult<EntListing> {
        self.validate()?;

        let mut details = ListingDetails::default();
        self.attributes.merge_into(&mut details);

        Ok(EntListing {
            seller_id,
            title: non_blank(self.title).unwrap_or_default(),
            description: non_blank(self.description).unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            category: non_blank(self.category).unwrap_or_default(),
            condition: self.condition.unwrap_or(ListingCondition::Good),
            images: self.images.unwrap_or_default(),
            location: non_blank(self.location).unwrap_or_default(),
            tags: clean_tags(self.tags.unwrap_or_default()),
            status: ListingStatus::Active,
            views: 0,
            likes: Vec::new(),
            details,
            average_rating: 0.0,
            total_ratings: 0,
            reviews: Vec::new(),
        })
    }
}

/// PUT /listings/{id}
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateListingRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub condition: Option<ListingCondition>,
    pub location: Option<String>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub status: Option<ListingStatus>,
    #[serde(flatten)]
    pub attributes: ListingAttributes,
}

impl UpdateListingRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut v = Validator::new();
        v.optional_str(
            "title",
            self.title.as_deref(),
            &[FieldValidator::NotBlank, FieldValidator::MaxLength(200)],
        )?;
        v.optional_str("description", self.description.as_deref(), &[FieldValidator::NotBlank])?;
        v.optional_str("category", self.category.as_deref(), &[FieldValidator::NotBlank])?;
        v.optional_str("location", self.location.as_deref(), &[FieldValidator::NotBlank])?;
        if let Some(price) = self.price {
            v.check_number("price", price, &[PRICE_RANGE]);
        }
        if self.status == Some(ListingStatus::Sold) {
            v.push("status can only be set to active or inactive; use purchase to sell");
        }
        self.attributes.validate(&mut v)?;
        v.finish("Invalid listing update")
    }

    pub fn apply_to(&self, listing: &mut EntListing) {
        if let Some(title) = non_blank(self.title.clone()) {
            listing.title = title;
        }
        if let Some(description) = non_blank(self.description.clone()) {
            listing.description = description;
        }
        if let Some(price) = self.price {
            listing.price = price;
        }
        if let Some(category) = non_blank(self.category.clone()) {
            listing.category = category;
        }
        if let Some(condition) = self.condition {
            listing.condition = condition;
        }
        if let Some(location) = non_blank(self.location.clone()) {
            listing.location = location;
        }
        if let Some(images) = &self.images {
            listing.images = images.clone();
        }
        if let Some(tags) = &self.tags {
            listing.tags = clean_tags(tags.clone());
        }
        if let Some(status) = self.status {
            listing.status = status;
        }
        self.attributes.merge_into(&mut listing.details);
    }
}

/// POST /listings/{id}/reviews
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateReviewRequest {
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

impl CreateReviewRequest {
    pub fn into_review(self, user_id: DocId) -> AppResult<Review> {
        let mut v = Validator::new();
        match self.rating {
            Some(rating) => {
                v.check_number("rating", rating as f64, &[FieldValidator::Range(1.0, 5.0)]);
            }
            None => {
                v.push("rating is required");
            }
        }
        v.optional_str(
            "comment",
            self.comment.as_deref(),
            &[FieldValidator::MaxLength(MAX_COMMENT_LENGTH)],
        )?;
        v.finish("Invalid review")?;

        let rating = self
            .rating
            .and_then(|r| u8::try_from(r).ok())
            .ok_or_else(|| AppError::validation("Rating must be between 1 and 5"))?;

        Ok(Review {
            user_id,
            rating,
            comment: self.comment.map(|c| c.trim().to_string()).unwrap_or_default(),
            created_at: Utc::now(),
        })
    }
}

/// POST /listings/{id}/purchase
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PurchaseRequest {
    pub buyer_name: Option<String>,
    pub buyer_email: Option<String>,
    pub buyer_phone: Option<String>,
}

/// Validated buyer details
#[derive(Debug, Clone, PartialEq)]
pub struct BuyerInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl PurchaseRequest {
    pub fn into_buyer(self) -> AppResult<BuyerInfo> {
        let mut v = Validator::new();
        v.required_str("buyerName", self.buyer_name.as_deref(), &[FieldValidator::MaxLength(100)])?;
        v.required_str(
            "buyerEmail",
            self.buyer_email.as_deref(),
            &[FieldValidator::Pattern(EMAIL_PATTERN)],
        )?;
        v.optional_str("buyerPhone", self.buyer_phone.as_deref(), &[FieldValidator::MaxLength(20)])?;
        v.finish("Buyer name and email are required")?;

        Ok(BuyerInfo {
            name: non_blank(self.buyer_name).unwrap_or_default(),
            email: non_blank(self.buyer_email).unwrap_or_default(),
            phone: non_blank(self.buyer_phone),
        })
    }
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !cleaned.contains(&tag) {
            cleaned.push(tag);
        }
    }
    cleaned
}
