pub mod collection;
pub mod row;
