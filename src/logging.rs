//! Tracing setup for the engine.
//!
//! In the browser events go to the devtools console through `tracing-wasm`;
//! native builds (tests, tooling) use the `tracing-subscriber` fmt output.

use tracing::Level;

/// Install the global subscriber. Only the first call takes effect.
#[cfg(target_arch = "wasm32")]
pub fn init(level: Level) {
    use tracing_subscriber::layer::SubscriberExt;

    let config = tracing_wasm::WASMLayerConfigBuilder::new()
        .set_max_level(level)
        .build();
    let subscriber = tracing_subscriber::registry().with(tracing_wasm::WASMLayer::new(config));
    // Err means a subscriber is already installed
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Install the global subscriber. Only the first call takes effect.
#[cfg(not(target_arch = "wasm32"))]
pub fn init(level: Level) {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    // Err means a subscriber is already installed
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Level used by the wasm start hook
pub fn default_level() -> Level {
    if cfg!(feature = "debug") {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    // Single test: the subscriber is process-global.
    #[test]
    fn test_first_init_wins() {
        init(Level::INFO);
        init(Level::TRACE);
        assert_eq!(LevelFilter::current(), LevelFilter::INFO);
        tracing::info!("subscriber reachable after repeated init");
    }

    #[test]
    fn test_default_level_follows_debug_feature() {
        let expected = if cfg!(feature = "debug") { Level::DEBUG } else { Level::INFO };
        assert_eq!(default_level(), expected);
    }
}
