//! Static project registry.
//!
//! Projects are kept in display order; that order drives menu rendering and
//! keyboard browsing (previous/next/first/last).

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::models::{ProjectDescriptor, ProjectInput};

#[derive(Debug, Clone)]
pub struct Registry {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    projects: Vec<ProjectDescriptor>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new(projects: Vec<ProjectDescriptor>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(projects.len());
        for (position, project) in projects.iter().enumerate() {
            if project.key.trim().is_empty() {
                return Err(RegistryError::EmptyKey);
            }
            if index.insert(project.key.clone(), position).is_some() {
                return Err(RegistryError::DuplicateKey(project.key.clone()));
            }
        }
        Ok(Self {
            inner: Arc::new(Inner { projects, index }),
        })
    }

    pub fn from_inputs(inputs: Vec<ProjectInput>) -> Result<Self, RegistryError> {
        Self::new(inputs.into_iter().map(ProjectDescriptor::from).collect())
    }

    /// The five demos shipped with the portfolio.
    pub fn builtin() -> Self {
        let projects = vec![
            builtin_project(
                "acai-dany",
                "Açaí da Dany",
                "Menu and ordering page for a neighbourhood açaí shop",
                &["HTML5", "CSS3", "JavaScript"],
            ),
            builtin_project(
                "barbearia-raimundos",
                "Barbearia Raimundos",
                "Booking site for a barbershop with service catalogue",
                &["HTML5", "CSS3", "JavaScript", "LocalStorage"],
            ),
            builtin_project(
                "clinica-sorriso",
                "Clínica Sorriso",
                "Dental clinic landing page with appointment form",
                &["HTML5", "Sass", "JavaScript"],
            ),
            builtin_project(
                "studio-fit",
                "Studio Fit",
                "Gym class schedule and membership plans",
                &["HTML5", "CSS Grid", "JavaScript"],
            ),
            builtin_project(
                "pet-amigo",
                "Pet Amigo",
                "Pet shop catalogue with grooming appointments",
                &["HTML5", "CSS3", "JavaScript", "Service Worker"],
            ),
        ];
        Self::new(projects).expect("builtin registry has unique keys")
    }

    pub fn get(&self, key: &str) -> Option<&ProjectDescriptor> {
        self.inner
            .index
            .get(key)
            .map(|&position| &self.inner.projects[position])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.index.contains_key(key)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.inner.index.get(key).copied()
    }

    pub fn at(&self, position: usize) -> Option<&ProjectDescriptor> {
        self.inner.projects.get(position)
    }

    pub fn all(&self) -> &[ProjectDescriptor] {
        &self.inner.projects
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.projects.iter().map(|p| p.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.inner.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.projects.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_project(key: &str, name: &str, description: &str, tech: &[&str]) -> ProjectDescriptor {
    ProjectDescriptor {
        key: key.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        source_path: format!("projects/{}/", key),
        demo_path: format!("demos/{}/", key),
        entry_point: "index.html".to_string(),
        technologies: tech.iter().map(|t| t.to_string()).collect(),
    }
}
