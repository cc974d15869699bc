// ABOUTME: Request types for image metadata lookups.
// ABOUTME: One request shape carries optional credentials and TLS overrides.

use std::fmt;
use thiserror::Error;

/// Rejected call arguments. Always reported synchronously, before any work is scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("image reference cannot be empty")]
    EmptyImageRef,

    #[error("wrong number of arguments: expected {expected}, got {got}")]
    WrongArity { expected: usize, got: usize },

    #[error("argument {index} ({name}) must be a string")]
    NotAString { index: usize, name: &'static str },

    #[error("argument {index} must be a function")]
    NotAFunction { index: usize },
}

/// Registry credentials.
///
/// Present whenever the caller used the authenticated call shape, even if the
/// fields are empty. Whether empty values mean "anonymous" is up to the resolver;
/// [`Credentials::is_usable`] captures the usual policy.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Both username and password are non-empty.
    pub fn is_usable(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// TLS overrides for the registry connection.
///
/// `None` means "use the resolver's default". Values are never interpreted here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsOverride {
    hostname: Option<String>,
    state: Option<String>,
}

impl TlsOverride {
    pub fn new(hostname: Option<String>, state: Option<String>) -> Self {
        Self { hostname, state }
    }

    /// Build from the host convention where an empty string means "not set".
    ///
    /// Only the empty string is treated as unset; whitespace and any other
    /// value are kept as-is.
    pub fn from_sentinels(hostname: &str, state: &str) -> Self {
        Self {
            hostname: non_empty(hostname),
            state: non_empty(state),
        }
    }

    /// Hostname used for certificate validation.
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    /// Trust mode, e.g. "insecure" or "disabled".
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.hostname.is_none() && self.state.is_none()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// A single image metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfoRequest {
    image_ref: String,
    credentials: Option<Credentials>,
    tls: TlsOverride,
}

impl ImageInfoRequest {
    /// Create an anonymous request with no overrides.
    ///
    /// The reference is passed to the resolver untouched; the only check is
    /// that it is not empty.
    pub fn new(image_ref: impl Into<String>) -> Result<Self, ArgumentError> {
        let image_ref = image_ref.into();
        if image_ref.is_empty() {
            return Err(ArgumentError::EmptyImageRef);
        }

        Ok(Self {
            image_ref,
            credentials: None,
            tls: TlsOverride::default(),
        })
    }

    /// Anonymous call shape, overrides given as empty-string sentinels.
    pub fn anonymous(
        image_ref: &str,
        tls_hostname: &str,
        tls_state: &str,
    ) -> Result<Self, ArgumentError> {
        Ok(Self::new(image_ref)?.with_tls(TlsOverride::from_sentinels(tls_hostname, tls_state)))
    }

    /// Authenticated call shape, overrides given as empty-string sentinels.
    pub fn authenticated(
        image_ref: &str,
        username: &str,
        password: &str,
        tls_hostname: &str,
        tls_state: &str,
    ) -> Result<Self, ArgumentError> {
        Ok(Self::anonymous(image_ref, tls_hostname, tls_state)?
            .with_credentials(Credentials::new(username, password)))
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_tls(mut self, tls: TlsOverride) -> Self {
        self.tls = tls;
        self
    }

    pub fn image_ref(&self) -> &str {
        &self.image_ref
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn tls(&self) -> &TlsOverride {
        &self.tls
    }
}
