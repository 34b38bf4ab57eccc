// Library exports for testing
// The binary (main.rs) imports these as well

pub mod console;
pub mod dashboard;
pub mod error;
pub mod logger;

#[cfg(test)]
mod tests;
