// Request schemas - explicit, validated request bodies and list queries

pub mod donated_item_schema;
pub mod donation_schema;
pub mod event_schema;
pub mod listing_schema;
pub mod query;
pub mod user_schema;
pub mod validation;

pub use donated_item_schema::{BorrowRequest, BorrowerInfo, CreateDonatedItemRequest};
pub use donation_schema::CreateDonationRequest;
pub use event_schema::{parse_event_date, CreateEventRequest};
pub use listing_schema::{
    BuyerInfo, CreateListingRequest, CreateReviewRequest, PurchaseRequest, UpdateListingRequest,
};
pub use query::{
    DonatedItemQuery, DonationQuery, EventQuery, ListingQuery, Page, PageRequest, Pagination,
};
pub use user_schema::{CreateUserRequest, UpdateProfileRequest, UserQuery};
pub use validation::{FieldValidator, Validator};
