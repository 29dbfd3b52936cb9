//! Documentation Service
//!
//! The operation surface called by the presentation layer. Operations that
//! answer with an envelope (`success` + `message`) never return `Err`; the
//! error's message is put in the envelope and logged instead.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{error, info};

use crate::artifact::{write_artifact, ExportedArtifact};
use crate::config::{ExplorerConfig, OutputFormat};
use crate::doctype::FieldKind;
use crate::document::assemble;
use crate::error::Result;
use crate::explore::{DocTypeNode, Explorer, MaxLevel};
use crate::html;
use crate::resolver;
use crate::store::{MetadataAccessor, SchemaStore};

/// Response envelope of `generate_doctype_documentation`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub message: String,
}

impl ApiResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            file_path: None,
            url: None,
            message: message.into(),
        }
    }
}

/// Outcome for one DocType of a bulk run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkEntry {
    pub doctype: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of `bulk_generate_documentation`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub results: Vec<BulkEntry>,
    pub total: usize,
    pub successful: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

/// A field whose type differs between two DocTypes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldTypeDifference {
    pub fieldname: String,
    pub type_in_dt1: String,
    pub type_in_dt2: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonSummary {
    pub total_fields_dt1: usize,
    pub total_fields_dt2: usize,
    pub common_fields_count: usize,
}

/// Field-level comparison of two DocTypes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocTypeComparison {
    pub doctype1: String,
    pub doctype2: String,
    pub fields_only_in_dt1: Vec<String>,
    pub fields_only_in_dt2: Vec<String>,
    pub common_fields: Vec<String>,
    pub field_type_differences: Vec<FieldTypeDifference>,
    pub summary: ComparisonSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkDependency {
    pub field: String,
    pub linked_to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDependency {
    pub field: String,
    pub child_doctype: String,
}

/// Direct (and optionally nested) dependencies of a DocType
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyReport {
    pub doctype: String,
    pub direct_links: Vec<LinkDependency>,
    pub child_tables: Vec<TableDependency>,
    pub total_dependencies: usize,
    /// Reports for each distinct linked DocType, when depth > 1
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested_dependencies: Vec<DependencyReport>,
    /// Linked DocTypes already on the current path
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub circular: Vec<String>,
    /// Linked DocTypes missing from the store
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}

/// Documentation operations over a schema store
pub struct DocumentationService<S: SchemaStore> {
    store: S,
    config: ExplorerConfig,
}

impl<S: SchemaStore> DocumentationService<S> {
    pub fn new(store: S, config: ExplorerConfig) -> Self {
        Self { store, config }
    }

    /// Explore a DocType's reference tree
    pub fn tree(&self, doctype_name: &str, level: i64) -> Result<DocTypeNode> {
        Explorer::new(&self.store, MaxLevel::from_level(level)).explore(doctype_name)
    }

    /// Generate documentation for a DocType.
    ///
    /// With `return_json` the document is returned in `data`; otherwise it
    /// is written as a JSON artifact and its location returned. A `level` of
    /// zero or less means unbounded depth.
    pub fn generate_doctype_documentation(&self, doctype_name: &str, return_json: bool, level: i64) -> ApiResponse {
        match self.generate(doctype_name, return_json, level) {
            Ok(response) => response,
            Err(err) => {
                error!(doctype = doctype_name, error = %err, "error generating documentation");
                ApiResponse::failure(err.to_string())
            }
        }
    }

    fn generate(&self, doctype_name: &str, return_json: bool, level: i64) -> Result<ApiResponse> {
        let tree = self.tree(doctype_name, level)?;
        let data = assemble(&tree);
        let message = format!("Documentation generated for {}", tree.name);

        if return_json {
            return Ok(ApiResponse {
                success: true,
                data: Some(data),
                file_path: None,
                url: None,
                message,
            });
        }

        let artifact = self.write_json(&tree.name, &data)?;
        Ok(ApiResponse {
            success: true,
            data: None,
            file_path: Some(artifact.path.display().to_string()),
            url: Some(artifact.url),
            message,
        })
    }

    fn write_json(&self, doctype_name: &str, data: &Value) -> Result<ExportedArtifact> {
        let mut content = match self.config.export.output_format {
            OutputFormat::Pretty => serde_json::to_string_pretty(data)?,
            OutputFormat::Compact => serde_json::to_string(data)?,
        };
        content.push('\n');
        write_artifact(&self.config.export, doctype_name, "json", &content)
    }

    /// Export the HTML report of a DocType and return the written artifact
    pub fn export_html(&self, doctype_name: &str) -> Result<ExportedArtifact> {
        html::export(&self.store, &self.config, doctype_name)
    }

    /// Export the HTML report of a DocType and return its public URL
    pub fn export_to_html(&self, doctype_name: &str) -> Result<String> {
        self.export_html(doctype_name).map(|artifact| artifact.url)
    }

    /// Write JSON documentation for several DocTypes, or for every DocType
    /// in `module` when given
    pub fn bulk_generate_documentation(&self, doctypes: &[String], module: Option<&str>) -> BulkReport {
        let names = match module {
            Some(module) => self.store.names_in_module(module),
            None => doctypes.to_vec(),
        };

        if names.is_empty() {
            return BulkReport {
                success: false,
                message: Some("No DocTypes specified".to_string()),
                results: Vec::new(),
                total: 0,
                successful: 0,
                generated_at: None,
            };
        }

        let level = self.config.traversal.default_level;
        let results: Vec<BulkEntry> = names
            .iter()
            .map(|name| {
                let response = self.generate_doctype_documentation(name, false, level);
                BulkEntry {
                    doctype: name.clone(),
                    success: response.success,
                    file_path: response.file_path,
                    error: (!response.success).then_some(response.message),
                }
            })
            .collect();

        let successful = results.iter().filter(|r| r.success).count();
        info!(total = names.len(), successful, "bulk documentation run finished");

        BulkReport {
            success: true,
            message: None,
            total: names.len(),
            successful,
            results,
            generated_at: Some(Utc::now()),
        }
    }

    /// Compare the fields of two DocTypes
    pub fn compare_doctypes(&self, doctype1: &str, doctype2: &str) -> Result<DocTypeComparison> {
        let accessor = MetadataAccessor::new(&self.store);
        let first = accessor.fetch(doctype1)?;
        let second = accessor.fetch(doctype2)?;

        let fields1: BTreeMap<&str, &FieldKind> = first
            .fields
            .iter()
            .filter(|f| !f.fieldname.is_empty())
            .map(|f| (f.fieldname.as_str(), &f.fieldtype))
            .collect();
        let fields2: BTreeMap<&str, &FieldKind> = second
            .fields
            .iter()
            .filter(|f| !f.fieldname.is_empty())
            .map(|f| (f.fieldname.as_str(), &f.fieldtype))
            .collect();

        let only_in = |a: &BTreeMap<&str, &FieldKind>, b: &BTreeMap<&str, &FieldKind>| -> Vec<String> {
            a.keys().filter(|k| !b.contains_key(*k)).map(|k| k.to_string()).collect()
        };

        let common_fields: Vec<String> = fields1
            .keys()
            .filter(|k| fields2.contains_key(*k))
            .map(|k| k.to_string())
            .collect();

        let field_type_differences = common_fields
            .iter()
            .filter_map(|name| {
                let (type1, type2) = (fields1[name.as_str()], fields2[name.as_str()]);
                (type1 != type2).then(|| FieldTypeDifference {
                    fieldname: name.clone(),
                    type_in_dt1: type1.to_string(),
                    type_in_dt2: type2.to_string(),
                })
            })
            .collect();

        Ok(DocTypeComparison {
            doctype1: first.name.clone(),
            doctype2: second.name.clone(),
            fields_only_in_dt1: only_in(&fields1, &fields2),
            fields_only_in_dt2: only_in(&fields2, &fields1),
            summary: ComparisonSummary {
                total_fields_dt1: fields1.len(),
                total_fields_dt2: fields2.len(),
                common_fields_count: common_fields.len(),
            },
            common_fields,
            field_type_differences,
        })
    }

    /// Direct dependencies of a DocType, nested `depth - 1` more levels
    /// through its links
    pub fn get_doctype_dependencies(&self, doctype_name: &str, depth: usize) -> Result<DependencyReport> {
        let mut path = Vec::new();
        self.dependencies(doctype_name, depth, &mut path)
    }

    fn dependencies(&self, doctype_name: &str, depth: usize, path: &mut Vec<String>) -> Result<DependencyReport> {
        let doctype = MetadataAccessor::new(&self.store).fetch(doctype_name)?;

        let mut direct_links = Vec::new();
        let mut child_tables = Vec::new();
        for field in &doctype.fields {
            let Some(target) = resolver::resolve(field) else {
                continue;
            };
            match field.fieldtype {
                FieldKind::Link => direct_links.push(LinkDependency {
                    field: field.fieldname.clone(),
                    linked_to: target.to_string(),
                }),
                FieldKind::Table => child_tables.push(TableDependency {
                    field: field.fieldname.clone(),
                    child_doctype: target.to_string(),
                }),
                FieldKind::Other(_) => {}
            }
        }

        let mut report = DependencyReport {
            doctype: doctype.name.clone(),
            total_dependencies: direct_links.len() + child_tables.len(),
            direct_links,
            child_tables,
            nested_dependencies: Vec::new(),
            circular: Vec::new(),
            unresolved: Vec::new(),
        };

        if depth > 1 {
            path.push(doctype.name.clone());

            let mut seen: Vec<&str> = Vec::new();
            for link in &report.direct_links {
                let target = link.linked_to.as_str();
                if seen.contains(&target) {
                    continue;
                }
                seen.push(target);

                if path.iter().any(|p| p == target) {
                    report.circular.push(target.to_string());
                    continue;
                }
                match self.dependencies(target, depth - 1, path) {
                    Ok(nested) => report.nested_dependencies.push(nested),
                    Err(_) => report.unresolved.push(target.to_string()),
                }
            }

            path.pop();
        }

        Ok(report)
    }
}
