// Services - domain operations over the document store and external collaborators

pub mod donated_item_service;
pub mod donation_service;
pub mod event_service;
pub mod listing_service;
pub mod media_service;
pub mod notification_service;
pub mod user_service;

pub use donated_item_service::DonatedItemService;
pub use donation_service::{DonationService, DonationView};
pub use event_service::EventService;
pub use listing_service::{
    LikeOutcome, ListingService, ListingView, PurchaseOutcome, ReviewView, ReviewsView, ViewCount,
};
pub use media_service::{ImageFile, MediaService, MAX_IMAGE_BYTES};
pub use notification_service::NotificationService;
pub use user_service::UserDirectory;
