mod document;
mod error;
mod http_mapping;
mod object_id;
mod traits;

pub use document::{
    apply_set, decode, encode, is_zero, nonzero_fields, Condition, Document, Filter, Patch, Query,
    CREATED_AT_FIELD, DELETED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
};
pub use error::{RepositoryError, Result};
pub use http_mapping::repository_error_to_status_code;
pub use object_id::ObjectId;
pub use traits::{DocumentStore, Repository, UpdateOutcome};
