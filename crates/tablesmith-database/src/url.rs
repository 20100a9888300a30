//! Effective connection URL resolution

use tablesmith_core::ConnectionInfo;

pub const HOST_PLACEHOLDER: &str = "${host}";
pub const PORT_PLACEHOLDER: &str = "${port}";
pub const DATABASE_PLACEHOLDER: &str = "${db}";

/// Resolve the URL used to connect to `info`.
///
/// A non-blank explicit URL is returned untouched. Otherwise the driver's
/// URL template is expanded with the host, port and database fields. No
/// validation happens here; a bad URL fails at connect time.
pub fn resolve(info: &ConnectionInfo) -> String {
    match info.explicit_url() {
        Some(url) => url.to_string(),
        None => expand_pattern(info.driver_type.url_pattern(), info),
    }
}

/// Substitute the placeholders of `pattern` with the fields of `info`
pub fn expand_pattern(pattern: &str, info: &ConnectionInfo) -> String {
    pattern
        .replace(HOST_PLACEHOLDER, &info.host)
        .replace(PORT_PLACEHOLDER, &info.port.to_string())
        .replace(DATABASE_PLACEHOLDER, &info.database)
}
