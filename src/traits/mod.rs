pub mod metadata_source;
pub mod routing;
pub mod unit_client;

pub use metadata_source::MetadataSource;
pub use routing::RoutingStrategy;
pub use unit_client::UnitClient;
