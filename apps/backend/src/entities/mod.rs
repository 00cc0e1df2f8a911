pub mod application_events;
pub mod applications;
pub mod breeds;
pub mod listings;
pub mod notifications;
pub mod payouts;
pub mod transactions;
pub mod user_credentials;
pub mod users;

pub use application_events::Entity as ApplicationEvents;
pub use applications::Entity as Applications;
pub use breeds::Entity as Breeds;
pub use listings::Entity as Listings;
pub use notifications::Entity as Notifications;
pub use payouts::Entity as Payouts;
pub use transactions::Entity as Transactions;
pub use user_credentials::Entity as UserCredentials;
pub use users::Entity as Users;
