pub use super::collection::Entity as Collection;
pub use super::request::Entity as Request;
