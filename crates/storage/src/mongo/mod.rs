// Private module - not exposed in public API
mod index_admin;

pub(crate) use index_admin::MongoIndexAdmin;
