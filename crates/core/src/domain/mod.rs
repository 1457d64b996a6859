pub mod contract;
pub mod currency;
pub mod product;
