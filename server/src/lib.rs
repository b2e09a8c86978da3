pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod moods;
pub mod pipeline;
pub mod routes;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;
