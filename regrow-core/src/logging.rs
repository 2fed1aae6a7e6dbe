use log::LevelFilter;

/// Level to force on top of `RUST_LOG`, if any.
fn forced_level(verbose: bool, rust_log_set: bool) -> Option<LevelFilter> {
    if verbose {
        Some(LevelFilter::Debug)
    } else if rust_log_set {
        None
    } else {
        Some(LevelFilter::Info)
    }
}

pub fn init(verbose: bool) {
    use env_logger::Target;

    let mut builder = env_logger::Builder::from_default_env();
    builder.target(Target::Stderr);
    if let Some(level) = forced_level(verbose, std::env::var_os("RUST_LOG").is_some()) {
        builder.filter_level(level);
    }
    // A logger may already be installed when embedded or under test.
    if let Err(err) = builder.try_init() {
        log::debug!("logger already initialised: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_wins_over_env() {
        assert_eq!(forced_level(true, true), Some(LevelFilter::Debug));
        assert_eq!(forced_level(false, true), None);
        assert_eq!(forced_level(false, false), Some(LevelFilter::Info));
    }
}
