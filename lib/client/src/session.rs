//! Authenticated HTTP session against the VIVO web interface.
//!
//! The session logs in through the `authenticate` form, captures the
//! cookies the instance hands back, and attaches them to every later
//! request. Cookies are managed explicitly instead of through a cookie
//! jar: the SPARQL query path needs them as a literal `Cookie` header
//! (see [`crate::sparql`]), and the login response's `Set-Cookie` headers
//! would be consumed by redirect following, so the client never follows
//! redirects.

use crate::error::ClientError;
use reqwest::blocking::{multipart, Client, Response};
use reqwest::header;
use reqwest::redirect::Policy;
use std::env;

/// Environment variable holding the base URL of the VIVO instance.
pub const ENV_BASE_URL: &str = "VIVO_URL";
/// Environment variable holding the login name.
pub const ENV_USERNAME: &str = "VIVO_USER";
/// Environment variable holding the login password.
pub const ENV_PASSWORD: &str = "VIVO_PASS";

/// Connection settings for a VIVO instance.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the instance, normalized to end with a slash.
    pub base_url: String,
    /// Login name for the web interface.
    pub username: String,
    /// Login password for the web interface.
    pub password: String,
    /// Skip TLS certificate verification. Off by default; some
    /// institutional installations run with self-signed certificates.
    pub accept_invalid_certs: bool,
}

impl ClientConfig {
    /// Builds a configuration from explicit values.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            username: username.into(),
            password: password.into(),
            accept_invalid_certs: false,
        }
    }

    /// Reads `VIVO_URL`, `VIVO_USER` and `VIVO_PASS` from the environment.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = env::var(ENV_BASE_URL).map_err(|_| ClientError::Config(ENV_BASE_URL))?;
        let username = env::var(ENV_USERNAME).map_err(|_| ClientError::Config(ENV_USERNAME))?;
        let password = env::var(ENV_PASSWORD).map_err(|_| ClientError::Config(ENV_PASSWORD))?;
        Ok(Self::new(base_url, username, password))
    }
}

/// Makes sure the trailing slash is present so paths join cleanly.
fn normalize_base_url(url: &str) -> String {
    format!("{}/", url.trim_end_matches('/'))
}

fn parse_set_cookie(raw: &str) -> Option<(String, String)> {
    let pair = raw.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    Some((name.trim().to_owned(), value.trim().to_owned()))
}

/// A login session with a VIVO web interface.
///
/// Owns the authentication cookies for its lifetime; they are dropped on
/// [`Session::logout`]. One session supports one caller; for concurrent
/// work, create independent sessions, each with its own login.
pub struct Session {
    config: ClientConfig,
    client: Client,
    cookies: Vec<(String, String)>,
    logged_in: bool,
}

impl Session {
    /// Builds a session from `config`. No request is made until
    /// [`Session::login`].
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        Ok(Self {
            config,
            client,
            cookies: Vec::new(),
            logged_in: false,
        })
    }

    /// Convenience for [`ClientConfig::from_env`] plus [`Session::new`].
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// The normalized base URL of the instance.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Joins `path` onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    /// Whether a login has succeeded and not yet been logged out.
    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// The captured cookies as a `Cookie` header value.
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Logs in to the web interface, capturing the session cookies.
    ///
    /// Fails with [`ClientError::Authentication`] when the instance
    /// answers with anything other than a success or redirect status.
    pub fn login(&mut self) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.url("authenticate"))
            .form(&[
                ("loginName", self.config.username.as_str()),
                ("loginPassword", self.config.password.as_str()),
                ("loginForm", "Log in"),
            ])
            .send()?;
        self.absorb_cookies(&response);
        let status = response.status();
        if !status.is_success() && !status.is_redirection() {
            return Err(ClientError::Authentication);
        }
        self.logged_in = true;
        Ok(())
    }

    /// Ends the web session and drops the captured cookies.
    ///
    /// Safe to call when not logged in; it does nothing then.
    pub fn logout(&mut self) -> Result<(), ClientError> {
        if !self.logged_in {
            return Ok(());
        }
        let response = self.get("logout", &[])?;
        self.cookies.clear();
        self.logged_in = false;
        let status = response.status();
        if status.is_success() || status.is_redirection() {
            Ok(())
        } else {
            Err(ClientError::Remote {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            })
        }
    }

    /// POSTs a URL-encoded form to `path` with the session cookies attached.
    pub fn post_form(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> Result<Response, ClientError> {
        let mut request = self.client.post(self.url(path)).form(fields);
        if !self.cookies.is_empty() {
            request = request.header(header::COOKIE, self.cookie_header());
        }
        Ok(request.send()?)
    }

    /// POSTs a multipart form (typically a form plus an RDF file payload)
    /// to `path` with the session cookies attached.
    pub fn post_multipart(
        &self,
        path: &str,
        form: multipart::Form,
    ) -> Result<Response, ClientError> {
        let mut request = self.client.post(self.url(path)).multipart(form);
        if !self.cookies.is_empty() {
            request = request.header(header::COOKIE, self.cookie_header());
        }
        Ok(request.send()?)
    }

    /// GETs `path` with query parameters and the session cookies attached.
    pub fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Response, ClientError> {
        let mut request = self.client.get(self.url(path)).query(params);
        if !self.cookies.is_empty() {
            request = request.header(header::COOKIE, self.cookie_header());
        }
        Ok(request.send()?)
    }

    fn absorb_cookies(&mut self, response: &Response) {
        for value in response.headers().get_all(header::SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            let Some((name, value)) = parse_set_cookie(raw) else {
                continue;
            };
            match self.cookies.iter_mut().find(|(n, _)| *n == name) {
                Some(entry) => entry.1 = value,
                None => self.cookies.push((name, value)),
            }
        }
    }
}
