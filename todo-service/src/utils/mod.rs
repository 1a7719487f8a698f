pub mod validation;

pub use validation::{parse_object_id, QueryParams, ValidatedJson};
