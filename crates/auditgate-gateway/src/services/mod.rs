//! Built-in business services.

mod biz;

pub use biz::BizService;
