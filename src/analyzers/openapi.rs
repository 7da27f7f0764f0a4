//! OpenAPI documents as a contract surface.
//!
//! Endpoints come from the HTTP-method keys under `paths`; schemas from
//! `components.schemas`, compared by deep equality. Unlike migration scripts,
//! a configured document that fails to parse aborts the run.

use super::web_routes::RouteKey;
use super::SurfaceAnalyzer;
use crate::config::BumpscopeConfig;
use crate::core::{Error, Impact, Result};
use crate::vcs::SourceReader;
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};

const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiDocument {
    pub endpoints: BTreeSet<RouteKey>,
    pub schemas: BTreeMap<String, Value>,
}

impl ApiDocument {
    fn merge(&mut self, other: ApiDocument) {
        self.endpoints.extend(other.endpoints);
        self.schemas.extend(other.schemas);
    }
}

pub struct OpenApiAnalyzer {
    documents: Vec<String>,
}

impl OpenApiAnalyzer {
    pub fn new(config: &BumpscopeConfig) -> Self {
        Self {
            documents: config.openapi.paths.clone(),
        }
    }
}

impl SurfaceAnalyzer for OpenApiAnalyzer {
    type State = ApiDocument;

    fn name(&self) -> &str {
        "openapi"
    }

    fn collect(&self, reader: &dyn SourceReader, rev: &str) -> Result<ApiDocument> {
        let mut merged = ApiDocument::default();
        for path in &self.documents {
            let path = path.trim_start_matches("./");
            match reader.read_file_at(rev, path)? {
                Some(content) => merged.merge(parse_document(&content, path)?),
                None => tracing::debug!(rev, path, "openapi document absent"),
            }
        }
        Ok(merged)
    }

    fn compare(&self, old: &ApiDocument, new: &ApiDocument) -> Vec<Impact> {
        diff_documents(old, new)
    }
}

/// Parse a YAML or JSON document. `path` is used to pick the format and
/// to name the file in errors.
pub fn parse_document(content: &str, path: &str) -> Result<ApiDocument> {
    let root: Value = if path.ends_with(".json") {
        serde_json::from_str::<serde_json::Value>(content)
            .map_err(|e| Error::document(path, e.to_string()))
            .and_then(|json| {
                serde_yaml::to_value(json).map_err(|e| Error::document(path, e.to_string()))
            })?
    } else {
        serde_yaml::from_str(content).map_err(|e| Error::document(path, e.to_string()))?
    };

    let mut document = ApiDocument::default();

    if let Some(paths) = root.get("paths").and_then(Value::as_mapping) {
        for (route, item) in paths {
            let (Some(route), Some(item)) = (route.as_str(), item.as_mapping()) else {
                continue;
            };
            for method in item.keys().filter_map(Value::as_str) {
                if HTTP_METHODS.contains(&method.to_ascii_lowercase().as_str()) {
                    document
                        .endpoints
                        .insert(RouteKey::new(route, method.to_ascii_uppercase()));
                }
            }
        }
    }

    if let Some(schemas) = root
        .get("components")
        .and_then(|c| c.get("schemas"))
        .and_then(Value::as_mapping)
    {
        for (name, schema) in schemas {
            if let Some(name) = name.as_str() {
                document.schemas.insert(name.to_string(), schema.clone());
            }
        }
    }

    Ok(document)
}

pub fn diff_documents(old: &ApiDocument, new: &ApiDocument) -> Vec<Impact> {
    let removed_endpoints = old
        .endpoints
        .difference(&new.endpoints)
        .map(|ep| Impact::major(ep.to_string(), "Removed endpoint"));
    let added_endpoints = new
        .endpoints
        .difference(&old.endpoints)
        .map(|ep| Impact::minor(ep.to_string(), "Added endpoint"));
    let removed_schemas = old
        .schemas
        .keys()
        .filter(|name| !new.schemas.contains_key(*name))
        .map(|name| Impact::major(name.as_str(), "Removed schema"));
    let added_schemas = new
        .schemas
        .keys()
        .filter(|name| !old.schemas.contains_key(*name))
        .map(|name| Impact::minor(name.as_str(), "Added schema"));
    let changed_schemas = old
        .schemas
        .iter()
        .filter(|(name, schema)| new.schemas.get(*name).is_some_and(|s| s != *schema))
        .map(|(name, _)| Impact::major(name.as_str(), "Changed schema"));

    removed_endpoints
        .chain(added_endpoints)
        .chain(removed_schemas)
        .chain(added_schemas)
        .chain(changed_schemas)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcs::MemorySource;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const BASE: &str = indoc! {r#"
        openapi: 3.0.0
        paths:
          /pets:
            parameters: []
            get:
              summary: list
            post:
              summary: create
        components:
          schemas:
            Pet:
              type: object
              properties:
                name: {type: string}
            Error:
              type: object
    "#};

    #[test]
    fn test_parse_endpoints_and_schemas() {
        let doc = parse_document(BASE, "openapi.yaml").unwrap();
        let endpoints: Vec<String> = doc.endpoints.iter().map(|e| e.to_string()).collect();
        assert_eq!(endpoints, vec!["GET /pets", "POST /pets"]);
        assert_eq!(doc.schemas.keys().collect::<Vec<_>>(), vec!["Error", "Pet"]);
    }

    #[test]
    fn test_json_document() {
        let doc = parse_document(
            r#"{"paths": {"/a": {"delete": {}}}, "components": {"schemas": {"A": {}}}}"#,
            "api.json",
        )
        .unwrap();
        assert!(doc.endpoints.contains(&RouteKey::new("/a", "DELETE")));
        assert!(doc.schemas.contains_key("A"));
    }

    #[test]
    fn test_invalid_document_is_hard_error() {
        let err = parse_document("paths: [unclosed", "openapi.yaml").unwrap_err();
        assert!(matches!(err, Error::Document { ref path, .. } if path == "openapi.yaml"));
    }

    #[test]
    fn test_diff_documents() {
        let old = parse_document(BASE, "openapi.yaml").unwrap();
        let head = indoc! {r#"
            paths:
              /pets:
                get:
                  summary: list
              /owners:
                get: {}
            components:
              schemas:
                Pet:
                  type: object
                  properties:
                    name: {type: integer}
                Owner:
                  type: object
        "#};
        let new = parse_document(head, "openapi.yaml").unwrap();
        assert_eq!(
            diff_documents(&old, &new),
            vec![
                Impact::major("POST /pets", "Removed endpoint"),
                Impact::minor("GET /owners", "Added endpoint"),
                Impact::major("Error", "Removed schema"),
                Impact::minor("Owner", "Added schema"),
                Impact::major("Pet", "Changed schema"),
            ]
        );
    }

    #[test]
    fn test_missing_document_is_empty_state() {
        let mut config = BumpscopeConfig::default();
        config.openapi.paths = vec!["openapi.yaml".into()];
        let analyzer = OpenApiAnalyzer::new(&config);
        let source = MemorySource::new().with_revision("HEAD");
        let state = analyzer.collect(&source, "HEAD").unwrap();
        assert_eq!(state, ApiDocument::default());
    }
}
