use serde::{Deserialize, Serialize};

/// A showcased demo application.
///
/// Descriptors are built once from static configuration and never mutated.
/// Everything else in the crate refers to a project by its `key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    /// Unique slug, e.g. `acai-dany`.
    pub key: String,
    pub name: String,
    pub description: String,
    /// Where the project's source lives relative to the site root.
    pub source_path: String,
    /// Base directory of the built demo, relative to the site root.
    pub demo_path: String,
    /// Entry document, relative to `demo_path`.
    pub entry_point: String,
    #[serde(default)]
    pub technologies: Vec<String>,
}

impl ProjectDescriptor {
    /// The demo's entry document: `demo_path + entry_point`.
    pub fn entry_url(&self) -> String {
        format!("{}{}", self.demo_path, self.entry_point)
    }

    /// Entry document as an absolute site path (leading `/`).
    pub fn site_path(&self) -> String {
        let url = self.entry_url();
        if url.starts_with('/') {
            url
        } else {
            format!("/{}", url)
        }
    }
}

/// Input for declaring a project in the config file. Missing paths are
/// derived from the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub source_path: Option<String>,
    pub demo_path: Option<String>,
    pub entry_point: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
}

impl From<ProjectInput> for ProjectDescriptor {
    fn from(input: ProjectInput) -> Self {
        let source_path = input
            .source_path
            .unwrap_or_else(|| format!("projects/{}/", input.key));
        let demo_path = input
            .demo_path
            .unwrap_or_else(|| format!("demos/{}/", input.key));
        Self {
            key: input.key,
            name: input.name,
            description: input.description,
            source_path,
            demo_path,
            entry_point: input.entry_point.unwrap_or_else(|| "index.html".to_string()),
            technologies: input.technologies,
        }
    }
}
