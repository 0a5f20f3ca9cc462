pub mod executor;
pub mod launcher;

pub use executor::run;
