// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Parsing of upstream `Set-Cookie` directives.
//!
//! A directive looks like `name=value; Attr1=val1; Attr2; ...`. The first
//! segment is split on its first `=`; each further segment is split on its
//! first `=` and its key mapped onto [`AttributeKey`]. Anything unrecognised
//! or malformed is dropped without affecting the rest of the directive.
//!
//! `Domain` is recognised but never carried over: relayed cookies are always
//! host-only on the relay's own origin.

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Date formats seen in `Expires`, after RFC 2822 (`Wed, 21 Oct 2015 07:28:00 GMT`).
const FALLBACK_DATE_FORMATS: &[&str] = &[
    // Netscape style: Wed, 21-Oct-2015 07:28:00 GMT
    "%a, %d-%b-%Y %H:%M:%S GMT",
    // RFC 850: Wednesday, 21-Oct-15 07:28:00 GMT
    "%A, %d-%b-%y %H:%M:%S GMT",
    // asctime: Wed Oct 21 07:28:00 2015
    "%a %b %e %H:%M:%S %Y",
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("cookie directive has no name=value pair")]
    MissingPair,

    #[error("cookie directive has an empty name")]
    EmptyName,
}

/// Attribute names understood in a directive (matched case-insensitively).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKey {
    MaxAge,
    Expires,
    Domain,
    Path,
    Secure,
    HttpOnly,
    SameSite,
    Unknown,
}

impl AttributeKey {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "max-age" => AttributeKey::MaxAge,
            "expires" => AttributeKey::Expires,
            "domain" => AttributeKey::Domain,
            "path" => AttributeKey::Path,
            "secure" => AttributeKey::Secure,
            "httponly" => AttributeKey::HttpOnly,
            "samesite" => AttributeKey::SameSite,
            _ => AttributeKey::Unknown,
        }
    }
}

/// Attributes carried over to the outgoing cookie.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieAttributes {
    pub max_age: Option<time::Duration>,
    pub expires: Option<DateTime<Utc>>,
    pub path: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

/// One directive, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCookie {
    pub name: String,
    pub value: String,
    pub attributes: CookieAttributes,
}

impl ParsedCookie {
    /// Build the first-party cookie to set on the client response.
    pub fn to_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::new(self.name.clone(), self.value.clone());
        let attrs = &self.attributes;

        if let Some(max_age) = attrs.max_age {
            cookie.set_max_age(max_age);
        }
        if let Some(expires) = attrs
            .expires
            .and_then(|at| time::OffsetDateTime::from_unix_timestamp(at.timestamp()).ok())
        {
            cookie.set_expires(expires);
        }
        if let Some(path) = &attrs.path {
            cookie.set_path(path.clone());
        }
        if attrs.secure {
            cookie.set_secure(true);
        }
        if attrs.http_only {
            cookie.set_http_only(true);
        }
        if let Some(same_site) = attrs.same_site {
            cookie.set_same_site(same_site);
        }

        cookie
    }
}

/// Parse one raw `Set-Cookie` directive.
pub fn parse_directive(raw: &str) -> Result<ParsedCookie, DirectiveError> {
    let mut segments = raw.split(';').map(str::trim);

    let pair = segments.next().unwrap_or_default();
    let (name, value) = pair.split_once('=').ok_or(DirectiveError::MissingPair)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(DirectiveError::EmptyName);
    }

    let mut attributes = CookieAttributes::default();
    for segment in segments.filter(|s| !s.is_empty()) {
        if !apply_attribute(&mut attributes, segment) {
            tracing::debug!(cookie = name, segment, "Dropped cookie attribute");
        }
    }

    Ok(ParsedCookie {
        name: name.to_string(),
        value: value.trim().to_string(),
        attributes,
    })
}

/// Apply one attribute segment. Returns `false` when it was ignored.
fn apply_attribute(attributes: &mut CookieAttributes, segment: &str) -> bool {
    let (key, value) = match segment.split_once('=') {
        Some((key, value)) => (key, Some(value.trim())),
        None => (segment, None),
    };

    match AttributeKey::from_name(key) {
        AttributeKey::MaxAge => match value.and_then(|v| v.parse::<i64>().ok()) {
            Some(secs) => {
                attributes.max_age = Some(time::Duration::seconds(secs));
                true
            }
            None => false,
        },
        AttributeKey::Expires => match value.and_then(parse_http_date) {
            Some(at) => {
                attributes.expires = Some(at);
                true
            }
            None => false,
        },
        AttributeKey::Path => match value.filter(|v| v.starts_with('/')) {
            Some(path) => {
                attributes.path = Some(path.to_string());
                true
            }
            None => false,
        },
        AttributeKey::Secure => {
            attributes.secure = true;
            true
        }
        AttributeKey::HttpOnly => {
            attributes.http_only = true;
            true
        }
        AttributeKey::SameSite => match value.and_then(parse_same_site) {
            Some(same_site) => {
                attributes.same_site = Some(same_site);
                true
            }
            None => false,
        },
        AttributeKey::Domain | AttributeKey::Unknown => false,
    }
}

fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.to_ascii_lowercase().as_str() {
        "strict" => Some(SameSite::Strict),
        "lax" => Some(SameSite::Lax),
        "none" => Some(SameSite::None),
        _ => None,
    }
}

/// Parse an HTTP date as used by `Expires`.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(at) = DateTime::parse_from_rfc2822(value) {
        return Some(at.with_timezone(&Utc));
    }
    FALLBACK_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}
