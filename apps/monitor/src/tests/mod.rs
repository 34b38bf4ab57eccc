mod dashboard;
mod error;
mod logger;
