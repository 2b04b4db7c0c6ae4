pub mod rank;
pub mod authority;
pub mod readability;
