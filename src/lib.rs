pub mod bspline;
pub mod constants;
pub mod fill;
pub mod repair;
pub mod retrack_errors;
pub mod rigid;
pub mod store;
pub mod trajectory;
