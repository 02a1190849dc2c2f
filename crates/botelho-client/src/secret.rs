//! Secret reference resolver.
//!
//! Secret values in `config.toml` can point outside the file:
//!
//! - `pass::path/in/store` runs `pass show path/in/store` and keeps the first line
//! - `env::VAR_NAME` reads `$VAR_NAME`
//! - anything else is used as-is

use crate::error::{ClientError, ClientResult};

/// Resolves a value that may contain a secret reference prefix.
pub fn resolve(value: &str) -> ClientResult<String> {
    if let Some(path) = value.strip_prefix("pass::") {
        from_pass(path)
    } else if let Some(var) = value.strip_prefix("env::") {
        std::env::var(var)
            .map_err(|_| ClientError::Secret(format!("environment variable `{}` is not set", var)))
    } else {
        Ok(value.to_string())
    }
}

fn from_pass(path: &str) -> ClientResult<String> {
    let output = std::process::Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|e| ClientError::Secret(format!("failed to run `pass show {}`: {}", path, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ClientError::Secret(format!(
            "`pass show {}` failed ({}): {}",
            path,
            output.status,
            stderr.trim()
        )));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| ClientError::Secret(format!("`pass show {}` printed nothing", path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values_pass_through() {
        assert_eq!(resolve("123456:ABC-DEF").unwrap(), "123456:ABC-DEF");
        assert_eq!(resolve("").unwrap(), "");
    }

    #[test]
    fn env_reference() {
        unsafe {
            std::env::set_var("_BOTELHO_SECRET_PROBE", "s3cr3t");
        }
        assert_eq!(resolve("env::_BOTELHO_SECRET_PROBE").unwrap(), "s3cr3t");
        unsafe {
            std::env::remove_var("_BOTELHO_SECRET_PROBE");
        }
    }

    #[test]
    fn missing_env_reference() {
        let err = resolve("env::_BOTELHO_DEFINITELY_UNSET").unwrap_err();
        assert!(err.to_string().contains("is not set"));
    }

    #[test]
    fn missing_pass_entry() {
        assert!(resolve("pass::botelho/does/not/exist/42").is_err());
    }
}
