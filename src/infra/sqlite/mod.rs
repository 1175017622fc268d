pub mod collection;
pub mod schema;
