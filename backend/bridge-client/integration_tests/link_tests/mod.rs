mod connection;
mod dispatch;
pub mod helpers;
