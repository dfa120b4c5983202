pub mod dispatch;
pub mod input;
pub mod model;
pub mod notify;
pub mod observability;
pub mod pool;
pub mod session;
pub mod validate;
