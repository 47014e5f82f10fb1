use crate::openapi_builder::DocumentOptions;
use crate::route::Route;
use heck::ToUpperCamelCase;
use regex::Regex;
use std::sync::OnceLock;

/// Converts framework route paths into OpenAPI path templates.
pub struct PathTemplater;

impl PathTemplater {
    /// Builds the OpenAPI path template for a route.
    ///
    /// The format suffix is dropped and `:name` segments become `{name}`.
    /// With `add_version` and a route version, the literal version replaces
    /// the `{version}` placeholder; otherwise a leading `/{version}` segment is
    /// removed. The base path is prefixed when `add_base_path` is set, and the
    /// result always starts with `/`.
    pub fn path(route: &Route, options: &DocumentOptions) -> String {
        let mut path = Self::format_path(&route.path);

        let version = route.version.as_ref().and_then(|v| v.resolve());
        match version {
            Some(version) if options.add_version => {
                path = path.replacen("{version}", version, 1);
            }
            _ => {
                path = path.replacen("/{version}", "", 1);
            }
        }

        if options.add_base_path {
            if let Some(base_path) = options.base_path.as_deref() {
                path = format!("{}{}", base_path, path);
            }
        }

        if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        }
    }

    /// Naming token from the last static path segment, singularized and in
    /// UpperCamelCase; `"Item"` when no static segment remains.
    pub fn item(route: &Route) -> String {
        static PARAM_SEGMENT_RE: OnceLock<Regex> = OnceLock::new();
        let param_segment_re =
            PARAM_SEGMENT_RE.get_or_init(|| Regex::new(r"/\{(.+?)\}").expect("Invalid regex"));

        let path = Self::format_path(&route.path);
        let stripped = param_segment_re.replace_all(&path, "");

        match stripped.split('/').filter(|segment| !segment.is_empty()).last() {
            Some(segment) => singularize(segment).to_upper_camel_case(),
            None => "Item".to_string(),
        }
    }

    fn format_path(raw: &str) -> String {
        static FORMAT_SUFFIX_RE: OnceLock<Regex> = OnceLock::new();
        let format_suffix_re =
            FORMAT_SUFFIX_RE.get_or_init(|| Regex::new(r"\(\.\w+?\)$").expect("Invalid regex"));

        static DYNAMIC_SEGMENT_RE: OnceLock<Regex> = OnceLock::new();
        let dynamic_segment_re =
            DYNAMIC_SEGMENT_RE.get_or_init(|| Regex::new(r":(\w+)").expect("Invalid regex"));

        let path = format_suffix_re.replace(raw, "");
        let path = path.replacen("(.:format)", "", 1);

        dynamic_segment_re.replace_all(&path, "{$1}").into_owned()
    }
}

fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        format!("{}y", stem)
    } else if ["sses", "ches", "shes", "xes", "zes"].iter().any(|suffix| word.ends_with(suffix)) {
        word[..word.len() - 2].to_string()
    } else if word.ends_with('s') && !word.ends_with("ss") && word.len() > 1 {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{HttpMethod, RouteVersion};

    fn route(path: &str, version: Option<&str>) -> Route {
        let mut route = Route::new(HttpMethod::Get, path);
        route.version = version.map(|v| RouteVersion::Single(v.to_string()));
        route
    }

    fn with_version() -> DocumentOptions {
        DocumentOptions {
            add_version: true,
            ..Default::default()
        }
    }

    const CASES: [(&str, &str, &str, &str); 6] = [
        ("/{version}/thing(.json)", "/v1/thing", "/thing", "Thing"),
        ("/{version}/thing/foo(.json)", "/v1/thing/foo", "/thing/foo", "Foo"),
        ("/{version}/thing(.:format)", "/v1/thing", "/thing", "Thing"),
        ("/{version}/thing/foo(.:format)", "/v1/thing/foo", "/thing/foo", "Foo"),
        ("/{version}/thing/:id", "/v1/thing/{id}", "/thing/{id}", "Thing"),
        ("/{version}/thing/foo/:id", "/v1/thing/foo/{id}", "/thing/foo/{id}", "Foo"),
    ];

    #[test]
    fn test_path_includes_version_when_requested() {
        for (raw, versioned, _, item) in CASES {
            let route = route(raw, Some("v1"));
            assert_eq!(PathTemplater::path(&route, &with_version()), versioned, "{}", raw);
            assert_eq!(PathTemplater::item(&route), item, "{}", raw);
        }
    }

    #[test]
    fn test_path_drops_version_when_not_requested() {
        for (raw, _, unversioned, item) in CASES {
            let route = route(raw, Some("v1"));
            assert_eq!(PathTemplater::path(&route, &DocumentOptions::default()), unversioned);
            assert_eq!(PathTemplater::item(&route), item);
        }
    }

    #[test]
    fn test_path_drops_version_when_route_has_none() {
        for (raw, _, unversioned, item) in CASES {
            let route = route(raw, None);
            assert_eq!(PathTemplater::path(&route, &with_version()), unversioned);
            assert_eq!(PathTemplater::item(&route), item);
        }
    }

    #[test]
    fn test_nested_version_list_uses_first_element() {
        let mut route = route("/{version}/thing/:id", None);
        route.version = Some(RouteVersion::Many(vec![RouteVersion::Many(vec![
            RouteVersion::Single("v2".to_string()),
            RouteVersion::Single("v1".to_string()),
        ])]));

        assert_eq!(PathTemplater::path(&route, &with_version()), "/v2/thing/{id}");
    }

    #[test]
    fn test_input_route_path_is_not_mutated() {
        let route = route("/foo/:dynamic/bar", None);
        PathTemplater::path(&route, &with_version());
        assert_eq!(route.path, "/foo/:dynamic/bar");
    }

    #[test]
    fn test_base_path_prefix() {
        let options = DocumentOptions {
            add_base_path: true,
            base_path: Some("/api".to_string()),
            ..Default::default()
        };
        let route = route("/users/:id", None);
        assert_eq!(PathTemplater::path(&route, &options), "/api/users/{id}");
    }

    #[test]
    fn test_leading_slash_is_guaranteed() {
        let route = route("users", None);
        assert_eq!(PathTemplater::path(&route, &DocumentOptions::default()), "/users");
    }

    #[test]
    fn test_item_singularizes_and_camelizes() {
        assert_eq!(PathTemplater::item(&route("/categories", None)), "Category");
        assert_eq!(PathTemplater::item(&route("/user_groups/:id", None)), "UserGroup");
        assert_eq!(PathTemplater::item(&route("/boxes", None)), "Box");
        assert_eq!(PathTemplater::item(&route("/address", None)), "Address");
    }

    #[test]
    fn test_item_fallback() {
        assert_eq!(PathTemplater::item(&route("/:id", None)), "Item");
        assert_eq!(PathTemplater::item(&route("/", None)), "Item");
    }
}
