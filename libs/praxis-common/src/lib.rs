pub mod io;
pub mod store;
pub mod types;
