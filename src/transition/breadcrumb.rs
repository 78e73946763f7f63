use serde::Serialize;

use crate::registry::Registry;

const HOME_LABEL: &str = "Portfolio";
const HOME_HREF: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crumb {
    pub label: String,
    /// `None` for the current (last) crumb.
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub key: String,
    pub name: String,
    pub url: String,
    pub active: bool,
}

/// Breadcrumb trail plus demo-switch menu for the active project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreadcrumbView {
    pub trail: Vec<Crumb>,
    pub current: Option<String>,
    pub menu: Vec<MenuEntry>,
}

impl BreadcrumbView {
    /// Rebuilt from the registry every time, never patched in place.
    pub fn compute(registry: &Registry, current_key: Option<&str>) -> Self {
        let current = current_key.and_then(|key| registry.get(key));

        let mut trail = vec![Crumb {
            label: HOME_LABEL.to_string(),
            href: current.map(|_| HOME_HREF.to_string()),
        }];
        if let Some(project) = current {
            trail.push(Crumb {
                label: project.name.clone(),
                href: None,
            });
        }

        let menu = registry
            .all()
            .iter()
            .map(|project| MenuEntry {
                key: project.key.clone(),
                name: project.name.clone(),
                url: project.site_path(),
                active: current.map(|c| c.key == project.key).unwrap_or(false),
            })
            .collect();

        Self {
            trail,
            current: current.map(|p| p.name.clone()),
            menu,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_exactly_the_active_project() {
        let registry = Registry::builtin();
        let view = BreadcrumbView::compute(&registry, Some("barbearia-raimundos"));

        assert_eq!(view.menu.len(), registry.len());
        let active: Vec<_> = view.menu.iter().filter(|e| e.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].key, "barbearia-raimundos");
        assert_eq!(view.current.as_deref(), Some("Barbearia Raimundos"));
        assert_eq!(view.trail[0].href.as_deref(), Some("/"));
    }

    #[test]
    fn portfolio_only_when_nothing_is_open() {
        let view = BreadcrumbView::compute(&Registry::builtin(), None);
        assert_eq!(view.trail.len(), 1);
        assert!(view.trail[0].href.is_none());
        assert!(view.menu.iter().all(|e| !e.active));
    }
}
