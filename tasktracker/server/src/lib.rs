pub mod config {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Config {
        #[serde(default = "default_db_url")]
        pub db_url: String,
        #[serde(default = "default_port")]
        pub port: u16,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            let settings = config::Config::builder()
                .add_source(config::Environment::default())
                .build()?;

            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }
    }

    fn default_db_url() -> String {
        "sqlite://tasks.db?mode=rwc".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn can_fall_back_to_defaults() {
            let config: Config = config::Config::builder()
                .build()
                .unwrap()
                .try_deserialize()
                .unwrap();
            assert_eq!(config.db_url, "sqlite://tasks.db?mode=rwc");
            assert_eq!(config.port, 8080);
        }

        #[test]
        fn can_override_settings() {
            let config: Config = config::Config::builder()
                .set_override("db_url", "postgres://localhost/tasks")
                .unwrap()
                .set_override("port", 9000)
                .unwrap()
                .build()
                .unwrap()
                .try_deserialize()
                .unwrap();
            assert_eq!(config.db_url, "postgres://localhost/tasks");
            assert_eq!(config.port, 9000);
        }
    }
}
pub mod entities;
pub mod task;
pub mod web;
