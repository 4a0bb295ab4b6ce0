
#[macro_use]
extern crate tracing;

use az_assets::AzDir;
use crate::ms_uptime::MsUptime;
use std::{
    env,
    panic,
};
use reqwest::Client;
use anyhow::Result;
use tracing_subscriber::{
    prelude::*,
    Registry,
    EnvFilter,
    fmt,
};


/// Default logging environment filter. Our crates are debug, everything else is warn.
const DEFAULT_FILTER: &'static str = "warn,az_assets=debug,get_az_assets=debug";


mod ms_uptime {
    use std::{
        fmt::Result,
        time::Instant,
    };
    use tracing_subscriber::fmt::{
        format::Writer,
        time::FormatTime,
    };

    #[derive(Debug, Clone)]
    pub struct MsUptime(Instant);

    impl MsUptime {
        pub fn new() -> Self {
            MsUptime(Instant::now())
        }
    }

    impl FormatTime for MsUptime {
        fn format_time(&self, w: &mut Writer) -> Result {
            let elapsed = self.0.elapsed();
            write!(w, "{:.3}s", elapsed.as_millis() as f32 / 1000.0)
        }
    }
}

/// Install a stdout `tracing` subscriber. `RUST_LOG` directives are appended to
/// the default filter.
fn init_logging() {
    let format = fmt::format()
        .compact()
        .with_timer(MsUptime::new())
        .with_line_number(true);
    let stdout_log = fmt::layer()
        .event_format(format);

    let mut filter = DEFAULT_FILTER.to_owned();
    if let Ok(env_filter) = env::var(EnvFilter::DEFAULT_ENV) {
        filter.push(',');
        filter.push_str(&env_filter);
    }

    let subscriber = Registry::default()
        .with(EnvFilter::new(filter))
        .with(stdout_log);
    tracing::subscriber::set_global_default(subscriber)
        .expect("unable to install log subscriber");

    // make panic messages go through logging system
    panic::set_hook(Box::new(|info| {
        error!("{}", info);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let base = AzDir::new();
    let mut http = Client::new();
    let report = base.setup_assets(&mut http).await?;
    info!(
        items = ?report.items,
        ctm = ?report.ctm,
        fonts = ?report.fonts,
        "finished setting up assets in {}",
        base.0.display(),
    );

    for path in base.missing_assets().await? {
        warn!("expected asset still missing: {}", path.display());
    }
    Ok(())
}
