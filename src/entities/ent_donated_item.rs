// EntDonatedItem - a freely given item that one person may borrow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::framework::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DonatedItemCategory {
    Books,
    Electronics,
    Clothing,
    Furniture,
    Sports,
    Stationery,
    LabEquipment,
    Tools,
    Other,
}

impl DonatedItemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonatedItemCategory::Books => "books",
            DonatedItemCategory::Electronics => "electronics",
            DonatedItemCategory::Clothing => "clothing",
            DonatedItemCategory::Furniture => "furniture",
            DonatedItemCategory::Sports => "sports",
            DonatedItemCategory::Stationery => "stationery",
            DonatedItemCategory::LabEquipment => "lab-equipment",
            DonatedItemCategory::Tools => "tools",
            DonatedItemCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCondition {
    Excellent,
    Good,
    Fair,
    Poor,
}

/// `borrowed_by` and `borrowed_at` are present exactly when `available` is false
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntDonatedItem {
    pub donor_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donor_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donor_phone: Option<String>,
    pub title: String,
    pub description: String,
    pub category: DonatedItemCategory,
    pub condition: ItemCondition,
    #[serde(default)]
    pub images: Vec<String>,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrowed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrowed_at: Option<DateTime<Utc>>,
}

impl Entity for EntDonatedItem {
    const COLLECTION: &'static str = "donated_items";
    const ENTITY_NAME: &'static str = "Donated item";
}

#[cfg(test)]
impl EntDonatedItem {
    pub fn borrow_state_is_consistent(&self) -> bool {
        let borrowed = self.borrowed_by.is_some() && self.borrowed_at.is_some();
        let clear = self.borrowed_by.is_none() && self.borrowed_at.is_none();
        if self.available {
            clear
        } else {
            borrowed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_wire_names() {
        let category: DonatedItemCategory = serde_json::from_value(json!("lab-equipment")).unwrap();
        assert_eq!(category, DonatedItemCategory::LabEquipment);
        assert_eq!(category.as_str(), "lab-equipment");
        assert!(serde_json::from_value::<DonatedItemCategory>(json!("Books")).is_err());
    }

    #[test]
    fn test_borrow_state_consistency() {
        let mut item: EntDonatedItem = serde_json::from_value(json!({
            "donorName": "Sam",
            "title": "Bunsen burner",
            "description": "Barely used",
            "category": "lab-equipment",
            "condition": "good",
            "available": true
        }))
        .unwrap();
        assert!(item.borrow_state_is_consistent());

        item.available = false;
        assert!(!item.borrow_state_is_consistent());

        item.borrowed_by = Some("Kim".to_string());
        item.borrowed_at = Some(Utc::now());
        assert!(item.borrow_state_is_consistent());
    }
}
