//! MiniJinja-backed prompt catalog

use crate::{PromptError, Result};
use minijinja::Environment;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info, warn};

/// A named prompt template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Template identifier
    pub name: String,
    /// Jinja2 source
    pub template: String,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
        }
    }

    /// Render with the given variables
    pub fn render(&self, vars: &serde_json::Value) -> Result<String> {
        // A fresh environment per render keeps the template free of lifetimes
        let mut env = Environment::new();
        env.add_filter("capitalize", |s: String| {
            let mut chars = s.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        });

        let value = minijinja::value::Value::from_serialize(vars);
        env.render_str(&self.template, value)
            .map_err(|e| PromptError::RenderError {
                name: self.name.clone(),
                detail: e.to_string(),
            })
    }

    fn compiles(&self) -> bool {
        Environment::new().template_from_str(&self.template).is_ok()
    }
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    templates: Vec<PromptTemplate>,
}

/// Ordered, immutable set of prompt templates
#[derive(Debug, Clone, Default)]
pub struct PromptCatalog {
    templates: Vec<PromptTemplate>,
}

impl PromptCatalog {
    /// Build a catalog from templates; later duplicates of a name are dropped
    pub fn from_templates(templates: Vec<PromptTemplate>) -> Self {
        let mut unique: Vec<PromptTemplate> = Vec::with_capacity(templates.len());
        for template in templates {
            if unique.iter().any(|t| t.name == template.name) {
                warn!(name = %template.name, "Duplicate prompt template ignored");
                continue;
            }
            unique.push(template);
        }
        Self { templates: unique }
    }

    /// Parse a catalog from JSON text
    ///
    /// Templates with syntax errors are skipped with a warning.
    pub fn from_json(source: &str, origin: &str) -> Result<Self> {
        let document: CatalogDocument =
            serde_json::from_str(source).map_err(|e| PromptError::Malformed {
                path: origin.to_string(),
                detail: e.to_string(),
            })?;

        let templates = document
            .templates
            .into_iter()
            .filter(|template| {
                let ok = template.compiles();
                if !ok {
                    warn!(
                        name = %template.name,
                        origin,
                        "Skipping prompt template with invalid syntax"
                    );
                }
                ok
            })
            .collect();

        Ok(Self::from_templates(templates))
    }

    /// Load a catalog from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| PromptError::FileLoadError {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        Self::from_json(&source, &path.display().to_string())
    }

    /// Load a catalog, degrading to an empty one when the file is missing or malformed
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(catalog) => {
                info!(
                    path = %path.as_ref().display(),
                    count = catalog.len(),
                    "Loaded prompt templates"
                );
                catalog
            }
            Err(e) => {
                error!(error = %e, "Failed to load prompt templates, continuing without them");
                Self::default()
            }
        }
    }

    /// Look up a template by name
    pub fn get(&self, name: &str) -> Option<&PromptTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Render a registered template
    pub fn render(&self, name: &str, vars: &serde_json::Value) -> Result<String> {
        self.get(name)
            .ok_or_else(|| PromptError::TemplateNotRegistered(name.to_string()))?
            .render(vars)
    }

    /// Templates whose name starts with `prefix`, in load order
    pub fn with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a PromptTemplate> + 'a {
        self.templates.iter().filter(move |t| t.name.starts_with(prefix))
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
