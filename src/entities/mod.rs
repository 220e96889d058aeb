// Entities - plain data stored as documents, one collection per type

pub mod ent_donated_item;
pub mod ent_donation;
pub mod ent_event;
pub mod ent_listing;
pub mod ent_user;

pub use ent_donated_item::{DonatedItemCategory, EntDonatedItem, ItemCondition};
pub use ent_donation::{DonationStatus, EntDonation};
pub use ent_event::{EntEvent, EventStatus};
pub use ent_listing::{
    recompute_rating, ContactInfo, Dimensions, DimensionUnit, EntListing, ListingCondition,
    ListingDetails, ListingStatus, PreferredContact, Review, Weight, WeightUnit,
};
pub use ent_user::{EntUser, SocialLinks, UserSummary};
