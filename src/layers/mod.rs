pub mod crime;
pub mod crime_store;
pub mod error;
pub mod geo_util;
