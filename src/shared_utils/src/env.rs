use thiserror::Error;

/// An environment variable required by the application is not set.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// Reads an environment variable, returning a structured error if it's missing.
///
/// A variable that is set but blank (`KEY=` in a `.env` file) counts as missing.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    get_env_var_opt(name).ok_or_else(|| MissingEnvVarError(name.to_string()))
}

/// Reads an optional environment variable. Unset and blank both yield `None`.
pub fn get_env_var_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Returns `explicit` unchanged when it holds a non-blank value, otherwise
/// falls back to the environment variable `name`.
///
/// Command-line flags take precedence over the environment this way.
pub fn explicit_or_env(explicit: Option<String>, name: &str) -> Result<String, MissingEnvVarError> {
    match explicit.filter(|v| !v.trim().is_empty()) {
        Some(v) => Ok(v),
        None => get_env_var(name),
    }
}
