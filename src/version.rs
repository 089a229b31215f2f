use std::sync::LazyLock;

include!(concat!(env!("OUT_DIR"), "/built.rs"));

/// Version string reported on startup and recorded in each run's
/// provenance block: package version plus git commit, with a dirty marker
/// when the working tree had uncommitted changes.
pub static VERSION: LazyLock<String> = LazyLock::new(|| {
    let prefix = match GIT_COMMIT_HASH {
        Some(commit) => format!("{PKG_VERSION}-{commit}"),
        None => PKG_VERSION.to_string(),
    };
    let suffix = match GIT_DIRTY {
        Some(true) => "-dirty",
        _ => "",
    };
    format!("{prefix}{suffix}")
});
