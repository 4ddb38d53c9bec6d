//! URL template normalization.
//!
//! Hosts describe routes in several dialects. Everything downstream
//! (matching and documentation) works on one canonical form:
//! `/segment/{name}/*rest`.

use std::sync::OnceLock;

use regex::Regex;

fn converter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `<name>` or `<converter:name>`
    RE.get_or_init(|| Regex::new(r"<(?:(?P<conv>\w+):)?(?P<name>\w+)>").expect("valid regex"))
}

fn named_group_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `(?P<name>...)` with no nested groups
    RE.get_or_init(|| Regex::new(r"\(\?P<(?P<name>\w+)>[^)]*\)").expect("valid regex"))
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{(\w+)\}|\*(\w+)").expect("valid regex"))
}

/// Rewrites a route pattern into a canonical `{name}` template.
///
/// Converter-style placeholders (`<int:id>`, `<slug>`) become `{id}` /
/// `{slug}`; the `path` converter becomes a trailing `*name` wildcard.
/// Named regex groups (`(?P<id>\d+)`) become `{id}` and `^`/`$` anchors
/// are dropped. The result always starts with `/`.
///
/// ```rust
/// use signet_router::normalize_template;
///
/// assert_eq!(normalize_template("item/<int:id>"), "/item/{id}");
/// assert_eq!(normalize_template(r"^users/(?P<pk>\d+)/$"), "/users/{pk}/");
/// assert_eq!(normalize_template("/files/<path:rest>"), "/files/*rest");
/// assert_eq!(normalize_template("/plain/{id}"), "/plain/{id}");
/// ```
#[must_use]
pub fn normalize_template(pattern: &str) -> String {
    let trimmed = pattern.trim_start_matches('^').trim_end_matches('$');

    let grouped = named_group_regex().replace_all(trimmed, "{$name}");
    let converted = converter_regex().replace_all(&grouped, |caps: &regex::Captures<'_>| {
        let name = &caps["name"];
        match caps.name("conv").map(|m| m.as_str()) {
            Some("path") => format!("*{name}"),
            _ => format!("{{{name}}}"),
        }
    });

    if converted.starts_with('/') {
        converted.into_owned()
    } else {
        format!("/{converted}")
    }
}

/// Nests `template` under `prefix`, normalizing both.
///
/// ```rust
/// use signet_router::join_prefix;
///
/// assert_eq!(join_prefix("/api/", "/items/{id}"), "/api/items/{id}");
/// assert_eq!(join_prefix("v1", "<int:id>"), "/v1/{id}");
/// assert_eq!(join_prefix("/", "/health"), "/health");
/// ```
#[must_use]
pub fn join_prefix(prefix: &str, template: &str) -> String {
    let prefix = normalize_template(prefix);
    let template = normalize_template(template);
    let head = prefix.trim_end_matches('/');
    format!("{head}{template}")
}

/// Names of the `{name}` and `*name` placeholders in a template, in order.
#[must_use]
pub fn template_params(template: &str) -> Vec<String> {
    placeholder_regex()
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_converters() {
        assert_eq!(normalize_template("/item/<id>"), "/item/{id}");
        assert_eq!(
            normalize_template("/org/<slug:org>/user/<int:uid>"),
            "/org/{org}/user/{uid}"
        );
    }

    #[test]
    fn test_normalize_regex_groups() {
        assert_eq!(
            normalize_template(r"^api/(?P<version>v\d)/items$"),
            "/api/{version}/items"
        );
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_template(""), "/");
    }

    #[test]
    fn test_join_prefix_nested() {
        let inner = join_prefix("/items", "<int:id>");
        assert_eq!(join_prefix("/api", &inner), "/api/items/{id}");
    }

    #[test]
    fn test_template_params() {
        assert_eq!(
            template_params("/orgs/{org}/files/*path"),
            vec!["org".to_string(), "path".to_string()]
        );
        assert!(template_params("/health").is_empty());
    }
}
