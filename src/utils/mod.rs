pub mod errors;
pub mod ratelimit;
