pub mod collection;
pub mod request;

pub use collection::{CollectionService, ExportOutcome, ImportOutcome};
pub use request::RequestService;
