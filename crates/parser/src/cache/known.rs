//! Process-wide tables of well-known HTTP tokens.
//!
//! The tables are built once on first use and are read-only afterwards, so every
//! parser instance shares them without synchronization beyond the one-time init.
//! They only ever speed parsing up: each lookahead result equals what the
//! byte-at-a-time path would have accumulated from the same bytes.

use http::{Method, Version};
use once_cell::sync::Lazy;

use crate::cache::field_cache::CachedField;
use crate::cache::trie::Trie;

macro_rules! known_headers {
    ($($variant:ident => $name:literal,)+) => {
        /// Header names the parser knows about.
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        pub enum KnownHeader {
            $($variant,)+
        }

        impl KnownHeader {
            /// Every known header, in declaration order
            pub const ALL: &'static [KnownHeader] = &[$(KnownHeader::$variant,)+];

            /// The canonical spelling of the header name
            pub fn as_str(self) -> &'static str {
                match self {
                    $(KnownHeader::$variant => $name,)+
                }
            }
        }
    };
}

known_headers! {
    Connection => "Connection",
    CacheControl => "Cache-Control",
    Date => "Date",
    Pragma => "Pragma",
    ProxyConnection => "Proxy-Connection",
    Trailer => "Trailer",
    TransferEncoding => "Transfer-Encoding",
    Upgrade => "Upgrade",
    Via => "Via",
    Warning => "Warning",
    KeepAlive => "Keep-Alive",
    Allow => "Allow",
    ContentEncoding => "Content-Encoding",
    ContentLanguage => "Content-Language",
    ContentLength => "Content-Length",
    ContentLocation => "Content-Location",
    ContentRange => "Content-Range",
    ContentType => "Content-Type",
    ContentDisposition => "Content-Disposition",
    Expires => "Expires",
    LastModified => "Last-Modified",
    Accept => "Accept",
    AcceptCharset => "Accept-Charset",
    AcceptEncoding => "Accept-Encoding",
    AcceptLanguage => "Accept-Language",
    Authorization => "Authorization",
    Expect => "Expect",
    Forwarded => "Forwarded",
    From => "From",
    Host => "Host",
    IfMatch => "If-Match",
    IfModifiedSince => "If-Modified-Since",
    IfNoneMatch => "If-None-Match",
    IfRange => "If-Range",
    IfUnmodifiedSince => "If-Unmodified-Since",
    MaxForwards => "Max-Forwards",
    ProxyAuthorization => "Proxy-Authorization",
    Range => "Range",
    RequestRange => "Request-Range",
    Referer => "Referer",
    Te => "TE",
    UserAgent => "User-Agent",
    Origin => "Origin",
    Cookie => "Cookie",
    SetCookie => "Set-Cookie",
    UpgradeInsecureRequests => "Upgrade-Insecure-Requests",
    XForwardedFor => "X-Forwarded-For",
    XForwardedProto => "X-Forwarded-Proto",
    XForwardedHost => "X-Forwarded-Host",
    XForwardedServer => "X-Forwarded-Server",
    AcceptRanges => "Accept-Ranges",
    Age => "Age",
    ETag => "ETag",
    Location => "Location",
    ProxyAuthenticate => "Proxy-Authenticate",
    RetryAfter => "Retry-After",
    Server => "Server",
    Vary => "Vary",
    WwwAuthenticate => "WWW-Authenticate",
    SecWebSocketKey => "Sec-WebSocket-Key",
    SecWebSocketVersion => "Sec-WebSocket-Version",
    SecWebSocketAccept => "Sec-WebSocket-Accept",
}

impl KnownHeader {
    /// Case-insensitive lookup of a complete header name.
    pub fn from_name(name: &str) -> Option<KnownHeader> {
        HEADER_NAMES_IGNORE_CASE.get(name.as_bytes()).copied()
    }

    /// Fields of these headers may be remembered in the per-connection cache.
    pub fn is_connection_cacheable(self) -> bool {
        matches!(
            self,
            KnownHeader::Host
                | KnownHeader::Authorization
                | KnownHeader::Accept
                | KnownHeader::AcceptCharset
                | KnownHeader::AcceptEncoding
                | KnownHeader::AcceptLanguage
                | KnownHeader::Cookie
                | KnownHeader::CacheControl
                | KnownHeader::UserAgent
        )
    }
}

/// Well-known header value tokens.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum KnownValue {
    Close,
    Chunked,
    Gzip,
    Deflate,
    Identity,
    KeepAlive,
    Continue,
    Processing,
    Te,
    Bytes,
    NoCache,
    Upgrade,
}

impl KnownValue {
    pub fn as_str(self) -> &'static str {
        match self {
            KnownValue::Close => "close",
            KnownValue::Chunked => "chunked",
            KnownValue::Gzip => "gzip",
            KnownValue::Deflate => "deflate",
            KnownValue::Identity => "identity",
            KnownValue::KeepAlive => "keep-alive",
            KnownValue::Continue => "100-continue",
            KnownValue::Processing => "102-processing",
            KnownValue::Te => "TE",
            KnownValue::Bytes => "bytes",
            KnownValue::NoCache => "no-cache",
            KnownValue::Upgrade => "Upgrade",
        }
    }

    /// Case-insensitive lookup of a complete, trimmed value token.
    pub fn from_token(token: &str) -> Option<KnownValue> {
        VALUES.get(token.as_bytes()).copied()
    }
}

const VALUE_TOKENS: &[KnownValue] = &[
    KnownValue::Close,
    KnownValue::Chunked,
    KnownValue::Gzip,
    KnownValue::Deflate,
    KnownValue::Identity,
    KnownValue::KeepAlive,
    KnownValue::Continue,
    KnownValue::Processing,
    KnownValue::Te,
    KnownValue::Bytes,
    KnownValue::NoCache,
    KnownValue::Upgrade,
];

const WELL_KNOWN_FIELDS: &[(KnownHeader, &str)] = &[
    (KnownHeader::Connection, "close"),
    (KnownHeader::Connection, "keep-alive"),
    (KnownHeader::Connection, "Upgrade"),
    (KnownHeader::Accept, "*/*"),
    (KnownHeader::AcceptEncoding, "gzip"),
    (KnownHeader::AcceptEncoding, "gzip, deflate"),
    (KnownHeader::AcceptEncoding, "gzip, deflate, br"),
    (KnownHeader::AcceptEncoding, "gzip,deflate,sdch"),
    (KnownHeader::AcceptLanguage, "en-US,en;q=0.5"),
    (KnownHeader::AcceptLanguage, "en-GB,en-US;q=0.8,en;q=0.6"),
    (KnownHeader::AcceptCharset, "ISO-8859-1,utf-8;q=0.7,*;q=0.3"),
    (KnownHeader::CacheControl, "no-cache"),
    (KnownHeader::CacheControl, "max-age=0"),
    (KnownHeader::Pragma, "no-cache"),
    (KnownHeader::TransferEncoding, "chunked"),
    (KnownHeader::ContentLength, "0"),
    (KnownHeader::ContentEncoding, "gzip"),
    (KnownHeader::ContentEncoding, "deflate"),
    (KnownHeader::ContentType, "application/x-www-form-urlencoded"),
    (KnownHeader::ContentType, "application/json"),
    (KnownHeader::Expect, "100-continue"),
    (KnownHeader::Upgrade, "websocket"),
    (KnownHeader::AcceptRanges, "bytes"),
    (KnownHeader::UpgradeInsecureRequests, "1"),
];

/// Methods followed by the single space that ends them.
static METHODS: Lazy<Trie<Method>> = Lazy::new(|| {
    let mut trie = Trie::new();
    for method in [
        Method::GET,
        Method::POST,
        Method::HEAD,
        Method::PUT,
        Method::OPTIONS,
        Method::DELETE,
        Method::TRACE,
        Method::CONNECT,
        Method::PATCH,
    ] {
        let key = format!("{} ", method.as_str());
        trie.insert(key.as_bytes(), method);
    }
    trie
});

static VERSIONS: Lazy<Trie<Version>> = Lazy::new(|| {
    let mut trie = Trie::case_insensitive();
    trie.insert(b"HTTP/0.9", Version::HTTP_09);
    trie.insert(b"HTTP/1.0", Version::HTTP_10);
    trie.insert(b"HTTP/1.1", Version::HTTP_11);
    trie.insert(b"HTTP/2.0", Version::HTTP_2);
    trie
});

/// Canonical names matched byte for byte, used for lookahead.
static HEADER_NAMES: Lazy<Trie<KnownHeader>> = Lazy::new(|| {
    let mut trie = Trie::new();
    for header in KnownHeader::ALL {
        trie.insert(header.as_str().as_bytes(), *header);
    }
    trie
});

static HEADER_NAMES_IGNORE_CASE: Lazy<Trie<KnownHeader>> = Lazy::new(|| {
    let mut trie = Trie::case_insensitive();
    for header in KnownHeader::ALL {
        trie.insert(header.as_str().as_bytes(), *header);
    }
    trie
});

static VALUES: Lazy<Trie<KnownValue>> = Lazy::new(|| {
    let mut trie = Trie::case_insensitive();
    for value in VALUE_TOKENS {
        trie.insert(value.as_str().as_bytes(), *value);
    }
    trie
});

static FIELDS: Lazy<Trie<CachedField>> = Lazy::new(|| {
    let mut trie = Trie::new();
    for (header, value) in WELL_KNOWN_FIELDS {
        let field = CachedField::new(*header, header.as_str(), value);
        trie.insert(&field.key(), field);
    }
    trie
});

/// Chains an already consumed byte in front of the rest of the active chunk.
#[inline]
pub(crate) fn lookahead_input(first: u8, rest: &[u8]) -> impl Iterator<Item = u8> + '_ {
    std::iter::once(first).chain(rest.iter().copied())
}

/// Longest known method plus its trailing space at the start of `input`.
pub(crate) fn lookahead_method<I: IntoIterator<Item = u8>>(input: I) -> Option<(usize, &'static Method)> {
    METHODS.best(input)
}

/// Longest known version token at the start of `input`, without any delimiter.
pub(crate) fn lookahead_version<I: IntoIterator<Item = u8>>(input: I) -> Option<(usize, Version)> {
    VERSIONS.best(input).map(|(len, version)| (len, *version))
}

/// Case-insensitive lookup of a complete version token.
pub(crate) fn version(token: &str) -> Option<Version> {
    VERSIONS.get(token.as_bytes()).copied()
}

/// Longest well-known `Name: value` pair at the start of `input`.
pub(crate) fn lookahead_field<I: IntoIterator<Item = u8>>(input: I) -> Option<(usize, &'static CachedField)> {
    FIELDS.best(input)
}

/// Longest known header name at the start of `input`, matched byte for byte.
pub(crate) fn lookahead_header<I: IntoIterator<Item = u8>>(input: I) -> Option<(usize, KnownHeader)> {
    HEADER_NAMES.best(input).map(|(len, header)| (len, *header))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_lookahead_needs_the_space() {
        assert_eq!(lookahead_method(b"GET / HTTP/1.1".iter().copied()), Some((4, &Method::GET)));
        assert_eq!(lookahead_method(b"GETX / HTTP/1.1".iter().copied()), None);
        assert_eq!(lookahead_method(b"get / HTTP/1.1".iter().copied()), None);
        assert_eq!(lookahead_method(lookahead_input(b'P', b"ATCH /")), Some((6, &Method::PATCH)));
    }

    #[test]
    fn versions_ignore_case() {
        assert_eq!(version("HTTP/1.1"), Some(Version::HTTP_11));
        assert_eq!(version("http/1.0"), Some(Version::HTTP_10));
        assert_eq!(version("HTTP/1.2"), None);
        assert_eq!(lookahead_version(b"HTTP/2.0 200".iter().copied()), Some((8, Version::HTTP_2)));
    }

    #[test]
    fn header_names() {
        assert_eq!(KnownHeader::from_name("content-length"), Some(KnownHeader::ContentLength));
        assert_eq!(KnownHeader::from_name("X-Custom"), None);
        assert_eq!(lookahead_header(b"Accept-Encoding: br".iter().copied()), Some((15, KnownHeader::AcceptEncoding)));
        assert_eq!(lookahead_header(b"accept: */*".iter().copied()), None);
        for header in KnownHeader::ALL {
            assert_eq!(KnownHeader::from_name(header.as_str()), Some(*header));
        }
    }

    #[test]
    fn well_known_fields() {
        let (len, field) = lookahead_field(b"Connection: close\r\n".iter().copied()).unwrap();
        assert_eq!(len, "Connection: close".len());
        assert_eq!(field.header(), KnownHeader::Connection);
        assert_eq!(field.value(), "close");

        let (len, field) = lookahead_field(b"Accept-Encoding: gzip, deflate, br\r\n".iter().copied()).unwrap();
        assert_eq!(len, "Accept-Encoding: gzip, deflate, br".len());
        assert_eq!(field.value(), "gzip, deflate, br");
    }

    #[test]
    fn value_tokens() {
        assert_eq!(KnownValue::from_token("Chunked"), Some(KnownValue::Chunked));
        assert_eq!(KnownValue::from_token("CLOSE"), Some(KnownValue::Close));
        assert_eq!(KnownValue::from_token("chunky"), None);
    }
}
