pub mod datatable;
pub mod import_service;
pub mod render;
