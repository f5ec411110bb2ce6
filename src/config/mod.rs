mod settings;

pub use settings::{
    default_data_dir, Config, ConfigError, RetryConfig, TomlConfig, TomlRetryConfig, CONFIG_FILE,
    ENV_BASE_URL, ENV_CUSTOMER_ID, EXAMPLE_CONFIG,
};
