pub mod config;
pub mod ctx;
pub mod ops;

use ctx::LogCtx;

pub fn rank() -> LogCtx<ops::rank::Rank> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn authority() -> LogCtx<ops::authority::Authority> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn readability() -> LogCtx<ops::readability::Readability> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
