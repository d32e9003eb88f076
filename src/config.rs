use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use config::{Config as ConfigLoader, Environment};
use is_terminal::IsTerminal;
use once_cell::sync::Lazy;
use serde::Deserialize;

const PREFIX: &str = "IPTRACKER";

pub static CONFIG: Lazy<Config> = Lazy::new(init_config);

#[derive(Debug, Default)]
pub enum LogStyle {
    #[default]
    Auto,
    Always,
    Never,
}

impl LogStyle {
    pub fn is_color(&self) -> bool {
        match self {
            LogStyle::Auto => std::io::stdout().is_terminal(),
            LogStyle::Always => true,
            LogStyle::Never => false,
        }
    }
}

impl<'de> Deserialize<'de> for LogStyle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?.to_lowercase();
        match s.as_str() {
            "auto" => Ok(LogStyle::Auto),
            "always" => Ok(LogStyle::Always),
            "never" => Ok(LogStyle::Never),
            _ => Err(serde::de::Error::unknown_variant(
                &s,
                &["auto", "always", "never"],
            )),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Log {
    pub level: String,
    pub style: LogStyle,
}

impl Default for Log {
    fn default() -> Self {
        Log {
            level: Self::level(),
            style: LogStyle::default(),
        }
    }
}

impl Log {
    fn level() -> String {
        String::from("iptracker=info")
    }
}

/// Settings for the hosted geolocation service.
#[derive(Deserialize)]
#[serde(default)]
pub struct Lookup {
    pub endpoint: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for Lookup {
    fn default() -> Self {
        Self {
            endpoint: String::from("https://api.freeiplookupapi.com/v1/info"),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

impl Lookup {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("lookup endpoint must be set".into());
        }
        if self.api_key.trim().is_empty() {
            return Err("lookup api key must be set".into());
        }
        if self.timeout_secs == 0 {
            return Err("lookup timeout must be greater than zero".into());
        }
        Ok(())
    }
}

impl fmt::Debug for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lookup")
            .field("endpoint", &self.endpoint)
            .field("api_key_set", &!self.api_key.is_empty())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Config {
    pub log: Log,
    pub addr: SocketAddr,
    pub web_dir: String,
    pub debug: bool,
    pub lookup: Lookup,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log: Log::default(),
            addr: Self::addr(),
            web_dir: Self::web_dir(),
            debug: true,
            lookup: Lookup::default(),
        }
    }
}

impl Config {
    fn addr() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 3030)
    }

    fn web_dir() -> String {
        String::from("dist")
    }
}

pub fn init_config() -> Config {
    let config = ConfigLoader::builder()
        .add_source(
            Environment::with_prefix(PREFIX)
                .separator("_")
                .try_parsing(true),
        )
        .add_source(
            Environment::with_prefix(PREFIX)
                .separator("__")
                .prefix_separator("_")
                .try_parsing(true),
        )
        .build()
        .and_then(|cfg| cfg.try_deserialize::<Config>());

    match config {
        Ok(config) => {
            if let Err(err) = config.lookup.validate() {
                panic!("{}", err);
            }
            println!("{:#?}", config);
            config
        }
        Err(err) => {
            panic!("{:?}", err);
        }
    }
}
