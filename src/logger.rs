//! ログ初期化
//!
//! `RUST_LOG` が設定されていればそれを優先する。

use tracing_subscriber::EnvFilter;

pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    // 依存クレートは warn 以上のみ
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,photo_feed={}", level)));

    // テストなどで二重に初期化された場合は無視する
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
