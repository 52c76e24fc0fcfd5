//! Query string assembly for the export endpoint

use crate::options::ExportOptions;

/// Builds the query string for an export request.
///
/// One `key=value&` fragment per toggle, appended only when the option is
/// set; an unset toggle is omitted entirely, not sent as `false`. The asset
/// mode is the one always-present fragment, and since the resolved
/// [`AssetMode`](crate::options::AssetMode) is already coerced, an invalid
/// mode shows up here as `assets=auto`.
pub fn build_query(options: &ExportOptions) -> String {
    let mut query = String::new();
    if options.no_index {
        query.push_str("removeIndexHtml=1&");
    }
    if options.hide_made_with_cables {
        query.push_str("hideMadeWithCables=true&");
    }
    if options.combine_js {
        query.push_str("combineJS=true&");
    }
    if options.skip_backups {
        query.push_str("skipBackups=true&");
    }
    if options.no_subdirs {
        query.push_str("flat=true&");
    }
    if options.no_minify {
        query.push_str("minify=false&");
    }
    if options.sourcemaps {
        query.push_str("sourcemaps=true&");
    }
    if options.minify_glsl {
        query.push_str("minifyGlsl=true&");
    }
    query.push_str("assets=");
    query.push_str(options.assets.as_str());
    query.push('&');
    if let Some(name) = &options.json_filename {
        if !name.is_empty() {
            query.push_str("jsonName=");
            query.push_str(strip_extension(name));
            query.push('&');
        }
    }
    query
}

/// Removes the file extension from a name, e.g. `"foo.json"` becomes `"foo"`.
///
/// Only a `.` that is neither absent nor the final character counts as an
/// extension separator; names without a `.` and names ending in `.` come
/// back unchanged.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => &name[..idx],
        _ => name,
    }
}
