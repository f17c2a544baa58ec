use std::fs::OpenOptions;

/// Mode applied to files the extractor creates.
///
/// Only newly created files receive the mode; truncating an existing file
/// keeps whatever permissions it already had.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PermissionMode {
    /// Use the process umask.
    #[default]
    Inherit,

    /// Raw Unix mode bits, e.g. `0o640`.
    Custom(u32),
}

impl PermissionMode {
    pub fn custom(unix_mode: u32) -> Self {
        Self::Custom(unix_mode & 0o7777)
    }

    /// Get the Unix mode bits, `None` for `Inherit`.
    pub fn to_unix_mode(self) -> Option<u32> {
        match self {
            Self::Inherit => None,
            Self::Custom(mode) => Some(mode),
        }
    }

    /// Set the creation mode on `options`. No-op off Unix.
    pub(crate) fn apply_to_options(self, options: &mut OpenOptions) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            if let Some(mode) = self.to_unix_mode() {
                options.mode(mode);
            }
        }
        #[cfg(not(unix))]
        {
            let _ = options;
        }
    }
}
