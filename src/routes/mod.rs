pub mod campaign;
pub mod capture;
pub mod catalog;
pub mod dashboard;
pub mod lead;
