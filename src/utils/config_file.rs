//! Load `.cksumdb.toml` from the working directory (CLI only). Library callers
//! build an [`Opts`] themselves.

use clap::ValueEnum;
use serde::Deserialize;
use std::path::Path;

use crate::Opts;
use crate::db::BackendKind;
use crate::engine::digest::Algorithm;
use crate::engine::scheduler::Parallelism;
use crate::utils::config::PackagePaths;

#[derive(Debug, Deserialize)]
pub(crate) struct CksumdbToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    backend: Option<String>,
    db_prefix: Option<String>,
    algorithm: Option<String>,
    keep_going: Option<bool>,
    jobs: Option<String>,
    follow_links: Option<bool>,
    verbose: Option<bool>,
}

/// Load the config file from `dir` if present. Returns None if the file is
/// missing or unreadable.
pub(crate) fn load_config_toml(dir: &Path) -> Option<CksumdbToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    toml::from_str(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $opts_field:ident) => {
        if let Some(v) = $sec.$sec_field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before
/// applying CLI flags so explicit flags win.
pub(crate) fn apply_file_to_opts(file: &CksumdbToml, opts: &mut Opts) {
    let s = &file.settings;
    if let Some(ref v) = s.backend {
        match BackendKind::from_str(v, true) {
            Ok(kind) => opts.backend = kind,
            Err(e) => log::warn!("config backend {v:?}: {e}"),
        }
    }
    if let Some(ref v) = s.db_prefix {
        opts.db_prefix = v.clone();
    }
    if let Some(ref v) = s.algorithm {
        match Algorithm::from_str(v, true) {
            Ok(a) => opts.algorithm = a,
            Err(e) => log::warn!("config algorithm {v:?}: {e}"),
        }
    }
    apply_file_opt!(s, opts, keep_going => keep_going);
    if let Some(ref v) = s.jobs {
        match v.parse::<Parallelism>() {
            Ok(p) => opts.parallelism = p,
            Err(e) => log::warn!("config jobs {v:?}: {e}"),
        }
    }
    apply_file_opt!(s, opts, follow_links => follow_links);
    apply_file_opt!(s, opts, verbose => verbose);
}
