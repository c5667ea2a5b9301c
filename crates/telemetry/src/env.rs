const FLEXFN_LOG: &str = "FLEXFN_LOG";
const RUST_LOG: &str = "RUST_LOG";
const FLEXFN_LOG_FORMAT: &str = "FLEXFN_LOG_FORMAT";

/// The filter directives to log with, if any were given.
///
/// `FLEXFN_LOG` wins over `RUST_LOG`; variables that are set but empty are
/// ignored.
pub(crate) fn log_directives() -> Option<String> {
    first_var_set(&[FLEXFN_LOG, RUST_LOG])
}

/// Returns a boolean indicating if log lines should be emitted as JSON.
///
/// It is considered enabled if `FLEXFN_LOG_FORMAT` is set to `json`.
pub(crate) fn json_format() -> bool {
    first_var_set(&[FLEXFN_LOG_FORMAT]).is_some_and(|format| format.eq_ignore_ascii_case("json"))
}

fn first_var_set(vars: &[&str]) -> Option<String> {
    vars.iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|val| !val.trim().is_empty())
}
