//! Terminal detection for color and progress output

use is_terminal::IsTerminal;
use std::env;
use std::io::{stderr, stdout};

const CI_VARS: &[&str] = &[
    "CI",
    "CONTINUOUS_INTEGRATION",
    "JENKINS_URL",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "TRAVIS",
    "CIRCLECI",
    "BUILDKITE",
    "TEAMCITY_VERSION",
    "TF_BUILD",
];

/// Stdout is a terminal and nothing says we run unattended
pub fn is_interactive() -> bool {
    if !stdout().is_terminal() || is_ci_environment() {
        return false;
    }

    env::var("DEBIAN_FRONTEND").unwrap_or_default() != "noninteractive"
}

/// Whether escape codes for color can be written to stdout
pub fn supports_ansi() -> bool {
    if env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty()) {
        return false;
    }
    if !is_interactive() {
        return false;
    }

    let term = env::var("TERM").unwrap_or_default();
    if cfg!(windows) {
        term != "dumb"
    } else {
        !term.is_empty() && term != "dumb"
    }
}

/// Progress bars are drawn on stderr
pub fn stderr_is_terminal() -> bool {
    stderr().is_terminal()
}

pub fn is_ci_environment() -> bool {
    CI_VARS.iter().any(|var| env::var_os(var).is_some())
}

/// Show progress bars only when stderr is an interactive ANSI terminal
pub fn should_show_progress_by_default() -> bool {
    stderr_is_terminal() && !is_ci_environment() && {
        let term = env::var("TERM").unwrap_or_default();
        term != "dumb"
    }
}
