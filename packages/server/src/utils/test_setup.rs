use dotenvy::dotenv;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn setup_test_env() {
    INIT.call_once(|| {
        dotenv().ok();
        // a short tick keeps ticker-driven tests fast
        if std::env::var("WEREWOLF_TICK_INTERVAL_MS").is_err() {
            std::env::set_var("WEREWOLF_TICK_INTERVAL_MS", "20");
        }
        let _ = env_logger::builder().is_test(true).try_init();
    });
}
