//! Key figure statistics resource.

use resource_cache::CachePolicy;
use resource_codec::messages::Statistics;
use resource_codec::{EmptySendResource, ProtobufReceiveResource};
use resource_core::Locator;

use crate::resource::{Resource, ServiceType};

pub type StatisticsResource = Resource<EmptySendResource, ProtobufReceiveResource<Statistics>>;

impl StatisticsResource {
    /// Published statistics: refreshed once per UTC day, revalidated by
    /// ETag after that.
    pub fn statistics() -> Self {
        Resource::new(
            Locator::statistics(),
            ServiceType::Caching(CachePolicy::once_a_day()),
            EmptySendResource,
            ProtobufReceiveResource::new(),
        )
    }
}
