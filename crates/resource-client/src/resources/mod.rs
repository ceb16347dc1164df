//! Built-in resources.

mod app_configuration;
mod statistics;

pub use app_configuration::AppConfigurationResource;
pub use statistics::StatisticsResource;
