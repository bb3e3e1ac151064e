mod bson;
mod collection;
pub mod errors;

pub use bson::{serde_string_map, Id};
pub use collection::{ensure_indexes_exist, Coll, MongoCollection};
