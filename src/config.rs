//! Connection target parsing
//!
//! Supports the generic DSN form handed down by callers of the abstraction
//! layer:
//! - `dbname=<descriptor>` with an optional `;charset=<name>` suffix
//!
//! where `<descriptor>` is either an EZConnect address
//! (`host[:port]/service_name`, `host:port:sid`) that is decomposed into its
//! components, or a full TNS descriptor (`(DESCRIPTION=...)`) that passes
//! through opaque for the native driver to resolve. A bare descriptor without
//! the `dbname=` key is accepted as well.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Default Oracle listener port
pub const DEFAULT_PORT: u16 = 1521;

/// Service identification method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceMethod {
    /// Connect using service name
    ServiceName(String),
    /// Connect using SID (legacy)
    Sid(String),
}

/// Parsed connection target descriptor.
///
/// Created from the DSN handed to [`Connection::connect`](crate::Connection::connect).
/// For EZConnect input the host, port and service are decomposed; for TNS
/// descriptors only `descriptor` and `charset` are populated and the native
/// driver resolves the rest.
///
/// # Examples
///
/// ```rust
/// use oracle_dbal::ConnectTarget;
///
/// let target: ConnectTarget = "dbname=//db1:1522/ORCL;charset=AL32UTF8".parse().unwrap();
/// assert_eq!(target.host.as_deref(), Some("db1"));
/// assert_eq!(target.port, 1522);
/// assert_eq!(target.charset.as_deref(), Some("AL32UTF8"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectTarget {
    /// The raw descriptor, exactly as the native driver expects it
    pub descriptor: String,
    /// Host, when the descriptor was EZConnect
    pub host: Option<String>,
    /// Port (defaults to 1521 for EZConnect descriptors)
    pub port: u16,
    /// Service name or SID, when the descriptor was EZConnect
    pub service: Option<ServiceMethod>,
    /// Session character set requested by the caller
    pub charset: Option<String>,
}

impl ConnectTarget {
    /// Create a target from a raw descriptor without decomposing it
    pub fn opaque(descriptor: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.into(),
            host: None,
            port: DEFAULT_PORT,
            service: None,
            charset: None,
        }
    }

    /// Set the session character set
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Whether the descriptor is a TNS descriptor rather than EZConnect
    pub fn is_tns_descriptor(&self) -> bool {
        self.descriptor.starts_with('(')
    }
}

impl FromStr for ConnectTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidDsn("empty connection string".to_string()));
        }

        // Split `key=value` pairs off the descriptor. Only `dbname` and
        // `charset` are recognized; anything else is rejected rather than
        // silently ignored.
        let mut descriptor: Option<&str> = None;
        let mut charset: Option<String> = None;

        if s.contains('=') && !s.starts_with('(') {
            for pair in s.split(';') {
                let pair = pair.trim();
                if pair.is_empty() {
                    continue;
                }
                let (key, value) = pair
                    .split_once('=')
                    .ok_or_else(|| Error::InvalidDsn(format!("expected key=value, got `{pair}`")))?;
                match key.trim() {
                    "dbname" => descriptor = Some(value.trim()),
                    "charset" => charset = Some(value.trim().to_string()),
                    other => {
                        return Err(Error::InvalidDsn(format!("unknown DSN key `{other}`")));
                    }
                }
            }
        } else {
            descriptor = Some(s);
        }

        let descriptor = descriptor
            .filter(|d| !d.is_empty())
            .ok_or_else(|| Error::InvalidDsn("missing dbname".to_string()))?;

        // TNS descriptors pass through opaque.
        if descriptor.starts_with('(') {
            let mut target = ConnectTarget::opaque(descriptor);
            target.charset = charset;
            return Ok(target);
        }

        // EZConnect: [//]host[:port][/service_name] or host:port:sid
        let ez = descriptor.trim_start_matches('/');
        if ez.is_empty() {
            return Err(Error::InvalidDsn("missing host".to_string()));
        }

        let mut host = ez;
        let mut port = DEFAULT_PORT;
        let mut service = None;

        if let Some((host_port, service_name)) = ez.split_once('/') {
            if service_name.is_empty() {
                return Err(Error::InvalidDsn("missing service name after /".to_string()));
            }
            service = Some(ServiceMethod::ServiceName(service_name.to_string()));
            host = host_port;
            if let Some((h, p)) = host_port.split_once(':') {
                host = h;
                port = p
                    .parse()
                    .map_err(|_| Error::InvalidDsn("invalid port number".to_string()))?;
            }
        } else {
            let parts: Vec<&str> = ez.split(':').collect();
            match parts.len() {
                1 => host = parts[0],
                2 => {
                    host = parts[0];
                    port = parts[1]
                        .parse()
                        .map_err(|_| Error::InvalidDsn("invalid port number".to_string()))?;
                }
                3 => {
                    host = parts[0];
                    port = parts[1]
                        .parse()
                        .map_err(|_| Error::InvalidDsn("invalid port number".to_string()))?;
                    service = Some(ServiceMethod::Sid(parts[2].to_string()));
                }
                _ => {
                    return Err(Error::InvalidDsn(
                        "too many colons in connection string".to_string(),
                    ));
                }
            }
        }

        if host.is_empty() {
            return Err(Error::InvalidDsn("missing host".to_string()));
        }

        Ok(ConnectTarget {
            descriptor: descriptor.to_string(),
            host: Some(host.to_string()),
            port,
            service,
            charset,
        })
    }
}

impl fmt::Display for ConnectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptor)
    }
}

/// Session credentials.
///
/// The password never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username for authentication
    pub username: String,
    password: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The password, for the native driver's connect call
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
