use std::sync::{LazyLock, Mutex};

/// Held by every test that touches process environment variables.
pub(super) static ENV_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Overrides one variable and puts the old value back on drop.
pub(super) struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

fn write_var(key: &str, value: Option<&str>) {
    // SAFETY: only called from tests holding ENV_LOCK, so no other thread
    // reads or writes the environment concurrently.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

impl EnvVarGuard {
    fn replace(key: &'static str, value: Option<&str>) -> Self {
        let previous = std::env::var(key).ok();
        write_var(key, value);
        Self { key, previous }
    }

    pub(super) fn set(key: &'static str, value: &str) -> Self {
        Self::replace(key, Some(value))
    }

    pub(super) fn unset(key: &'static str) -> Self {
        Self::replace(key, None)
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        write_var(self.key, self.previous.as_deref());
    }
}
