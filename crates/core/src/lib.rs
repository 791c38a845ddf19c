pub mod config;
pub mod metrics;
pub mod testing;
pub mod ticket;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LogFormat,
    LoggingConfig, SpaceConfig, SweeperConfig,
};
pub use ticket::{
    spawn_expiration_task, SequenceState, SweepReport, TicketError, TicketId, TicketSpace,
};
