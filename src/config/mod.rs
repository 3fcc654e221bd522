//! Configuration module

mod site;

pub use site::ArchiveConfig;
pub use site::CmsConfig;
pub use site::CmsProvider;
pub use site::HighlightConfig;
pub use site::HomeConfig;
pub use site::ServerConfig;
pub use site::SiteConfig;
pub use site::StorageConfig;
