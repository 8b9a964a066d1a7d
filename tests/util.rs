#![allow(dead_code)]

use std::sync::Once;

use texmath_render::TypesetContext;

static LOGGING: Once = Once::new();

pub fn init_logging() {
    LOGGING.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub fn context() -> TypesetContext {
    init_logging();
    TypesetContext::load().expect("built-in resources failed to load")
}
