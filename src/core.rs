pub mod metrics;
pub mod poller;
pub mod reading;
pub mod session;
pub mod sink;
