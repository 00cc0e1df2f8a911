pub mod current_user;
pub mod jwt;
pub mod validated_json;

pub use current_user::{AdminUser, BreederUser, CurrentUser};
pub use jwt::BearerClaims;
pub use validated_json::{OptionalJson, ValidatedJson};
