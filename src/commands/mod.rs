pub mod branch;
pub mod campaign;
pub mod capture;
pub mod dashboard;
pub mod discount;
pub mod encash;
pub mod lead;
pub mod place;
pub mod source;
pub mod utility;
pub mod utils;
