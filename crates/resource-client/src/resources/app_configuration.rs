//! Application configuration resource.

use std::time::Duration;

use resource_cache::CachePolicy;
use resource_codec::messages::ApplicationConfiguration;
use resource_codec::{EmptySendResource, ProtobufReceiveResource};
use resource_core::Locator;

use crate::resource::{Resource, ServiceType};

/// How long a downloaded configuration is served without asking the server.
pub const APP_CONFIGURATION_MAX_AGE: Duration = Duration::from_secs(300);

pub type AppConfigurationResource =
    Resource<EmptySendResource, ProtobufReceiveResource<ApplicationConfiguration>>;

impl AppConfigurationResource {
    /// The app configuration: protobuf, fresh for five minutes, then
    /// revalidated by ETag.
    pub fn app_configuration() -> Self {
        Resource::new(
            Locator::app_configuration(),
            ServiceType::Caching(CachePolicy::max_age(APP_CONFIGURATION_MAX_AGE)),
            EmptySendResource,
            ProtobufReceiveResource::new(),
        )
    }
}
