pub mod cbr_provider;

pub use cbr_provider::CbrRateSource;
