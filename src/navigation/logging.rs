use env_logger::{Builder, Env};
use std::io::Write;

pub const DEFAULT_LEVEL: &str = "info";

/// Installs the env_logger backend once; `RUST_LOG` still wins over `level`.
pub fn init(level: Option<&str>) {
    let _ = builder(level).try_init();
}

fn builder(level: Option<&str>) -> Builder {
    let mut builder = Builder::from_env(Env::default().default_filter_or(level.unwrap_or(DEFAULT_LEVEL)));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} {:<5} [{}] {}",
            buf.timestamp_millis(),
            record.level(),
            short_target(record.target()),
            record.args()
        )
    });
    builder
}

/// `hpa_navigator::navigation::navigator` -> `navigator`
fn short_target(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortens_module_paths() {
        assert_eq!(short_target("hpa_navigator::navigation::navigator"), "navigator");
        assert_eq!(short_target("hpa_navigator"), "hpa_navigator");
    }

    #[test]
    fn init_twice_is_harmless() {
        init(Some("debug"));
        init(None);
        log::debug!("logging initialised");
    }
}
