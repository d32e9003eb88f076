use std::str::FromStr;

use chrono::{Local, SecondsFormat};
use tracing_subscriber::{
    filter::Targets,
    fmt::{self, time},
    prelude::*,
};
use yansi::Paint;

use crate::config::Log;

pub fn init(log: &Log) {
    let is_color = log.style.is_color();
    if !is_color {
        yansi::disable();
    }
    let format = fmt::layer().with_timer(LocalTime).with_ansi(is_color);
    let filter = match targets(&log.level) {
        Ok(f) => f,
        Err(e) => {
            let err = format!("string {} did not parse successfully: {}", log.level, e);
            panic!("{}", err.red().bold());
        }
    };

    tracing_subscriber::registry()
        .with(format)
        .with(filter)
        .init();
}

fn targets(level: &str) -> Result<Targets, <Targets as FromStr>::Err> {
    Targets::from_str(level)
}

struct LocalTime;

impl time::FormatTime for LocalTime {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            Local::now().to_rfc3339_opts(SecondsFormat::Millis, false)
        )
    }
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::targets;

    #[test]
    fn default_level_enables_crate_info() {
        let filter = targets("iptracker=info").unwrap();
        assert!(filter.would_enable("iptracker::controller", &Level::INFO));
        assert!(!filter.would_enable("iptracker::controller", &Level::DEBUG));
        assert!(!filter.would_enable("isahc", &Level::INFO));
    }

    #[test]
    fn garbage_level_is_rejected() {
        assert!(targets("iptracker=loud").is_err());
    }
}
