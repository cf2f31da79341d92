pub mod health;
pub mod maintenance;
pub mod routing_config;

pub use health::health_handler;
pub use maintenance::maintenance_page_handler;
pub use routing_config::get_routing_config_handler;
