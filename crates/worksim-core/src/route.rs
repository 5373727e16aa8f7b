//! Participant routes such as `/participant/documents/doc-1?from=email`.
//!
//! Query parameters are breadcrumbs for the views; nothing here is an API.

/// Query parameters the participant views understand
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteQuery {
    pub from: Option<String>,
    pub company_id: Option<String>,
    pub draft: Option<String>,
    pub template: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    path: String,
    segments: Vec<String>,
    pub query: RouteQuery,
}

impl Route {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let (path, query) = input.split_once('?').unwrap_or((input, ""));

        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let mut parsed = RouteQuery::default();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = Some(value.to_string());
            match key {
                "from" => parsed.from = value,
                "companyId" => parsed.company_id = value,
                "draft" => parsed.draft = value,
                "template" => parsed.template = value,
                "id" => parsed.id = value,
                _ => {}
            }
        }

        Self {
            path: format!("/{}", segments.join("/")),
            segments,
            query: parsed,
        }
    }

    /// Normalized path without the query string
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Id segment following `collection`, e.g. `documents/{id}`
    pub fn resource_id(&self, collection: &str) -> Option<&str> {
        self.segments
            .windows(2)
            .find(|w| w[0] == collection)
            .map(|w| w[1].as_str())
    }

    pub fn document_id(&self) -> Option<&str> {
        self.resource_id("documents")
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        let prefix = Route::parse(prefix);
        self.segments.starts_with(&prefix.segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_route_with_query() {
        let route = Route::parse("/participant/documents/doc-42?from=email&draft=draft-1&x=1");
        assert_eq!(route.path(), "/participant/documents/doc-42");
        assert_eq!(route.document_id(), Some("doc-42"));
        assert_eq!(route.query.from.as_deref(), Some("email"));
        assert_eq!(route.query.draft.as_deref(), Some("draft-1"));
        assert_eq!(route.query.template, None);
    }

    #[test]
    fn test_all_known_query_keys() {
        let route = Route::parse("/admin/employees/e-1?companyId=c-9&template=t-2&id=7&from=list");
        assert_eq!(route.resource_id("employees"), Some("e-1"));
        assert_eq!(
            route.query,
            RouteQuery {
                from: Some("list".into()),
                company_id: Some("c-9".into()),
                draft: None,
                template: Some("t-2".into()),
                id: Some("7".into()),
            }
        );
    }

    #[test]
    fn test_document_list_has_no_id() {
        assert_eq!(Route::parse("/participant/documents").document_id(), None);
        assert_eq!(Route::parse("/participant/documents/").document_id(), None);
    }

    #[test]
    fn test_prefix_matches_whole_segments() {
        let route = Route::parse("participant/email/inbox/");
        assert_eq!(route.path(), "/participant/email/inbox");
        assert!(route.starts_with("/participant/email"));
        assert!(route.starts_with("/"));
        assert!(!route.starts_with("/participant/em"));
    }
}
