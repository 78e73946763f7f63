//! Request classification.
//!
//! `classify` is a pure function from a request to the caching discipline
//! that applies to it, so it can be exercised without any network.

use std::collections::HashSet;

use axum::http::{uri::InvalidUri, Method, Uri};

use crate::config::CacheConfig;

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "avif", "bmp",
];

/// Which kind of resource a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    Static,
    Image,
    Demo,
    Dynamic,
}

/// Whether the cache layer handles a request at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Not ours: hand the request to the network untouched.
    PassThrough,
    Handle(ResourceClass),
}

/// Origin and path rules the classifier works against.
#[derive(Debug, Clone)]
pub struct Scope {
    scheme: String,
    authority: String,
    static_assets: HashSet<String>,
    allowed_origins: HashSet<String>,
    demos_prefix: String,
}

impl Scope {
    pub fn new(origin: &str, config: &CacheConfig) -> Result<Self, InvalidUri> {
        let origin: Uri = origin.parse()?;
        Ok(Self {
            scheme: origin.scheme_str().unwrap_or("http").to_string(),
            authority: origin
                .authority()
                .map(|a| a.as_str().to_ascii_lowercase())
                .unwrap_or_default(),
            static_assets: config.static_assets.iter().cloned().collect(),
            allowed_origins: config
                .allowed_origins
                .iter()
                .map(|o| o.to_ascii_lowercase())
                .collect(),
            demos_prefix: config.demos_prefix.clone(),
        })
    }

    /// Absolute URL for a site path, used as the cache key.
    pub fn url(&self, path: &str) -> String {
        format!("{}://{}{}", self.scheme, self.authority, path)
    }

    /// Cache key for a request URI; relative URIs resolve against the origin.
    pub fn key_for(&self, uri: &Uri) -> String {
        match uri.authority() {
            Some(_) => uri.to_string(),
            None => self.url(uri.path_and_query().map(|p| p.as_str()).unwrap_or("/")),
        }
    }

    pub fn is_static_asset(&self, path: &str) -> bool {
        self.static_assets.contains(path)
    }

    fn is_same_origin(&self, uri: &Uri) -> bool {
        match uri.authority() {
            None => true,
            Some(authority) => authority.as_str().eq_ignore_ascii_case(&self.authority),
        }
    }

    fn is_allowed_origin(&self, uri: &Uri) -> bool {
        uri.host()
            .map(|host| self.allowed_origins.contains(&host.to_ascii_lowercase()))
            .unwrap_or(false)
    }
}

/// Decide how a request is served. Rules apply in order: only GET is
/// handled, foreign origins pass through unless allow-listed, then the path
/// picks image, static shell, demo or dynamic.
pub fn classify(method: &Method, uri: &Uri, scope: &Scope) -> Disposition {
    if method != Method::GET {
        return Disposition::PassThrough;
    }

    let path = uri.path();
    if !scope.is_same_origin(uri) {
        if !scope.is_allowed_origin(uri) {
            return Disposition::PassThrough;
        }
        // Font and CDN assets are immutable per URL.
        return Disposition::Handle(if is_image(path) {
            ResourceClass::Image
        } else {
            ResourceClass::Static
        });
    }

    let class = if is_image(path) {
        ResourceClass::Image
    } else if path == "/" || scope.is_static_asset(path) {
        ResourceClass::Static
    } else if path.starts_with(&scope.demos_prefix) {
        ResourceClass::Demo
    } else {
        ResourceClass::Dynamic
    };
    Disposition::Handle(class)
}

fn is_image(path: &str) -> bool {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rsplit_once('.') {
        Some((_, ext)) => IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}
