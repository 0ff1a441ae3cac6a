use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{is_truthy, lenient};

/// Menu configuration entry. `id_main` points at the parent entry; empty or
/// "0" marks a top-level entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub nama: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub link: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub urut: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub active: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub id_main: String,
}

impl MenuItem {
    pub fn is_active(&self) -> bool {
        is_truthy(&self.active)
    }

    pub fn is_top_level(&self) -> bool {
        let parent = self.id_main.trim();
        parent.is_empty() || parent == "0"
    }

    /// Sort position; unparsable values sort last
    pub fn order(&self) -> i64 {
        self.urut.trim().parse().unwrap_or(i64::MAX)
    }
}

/// `GET /settings/menu` and `GET /base/menu` payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuList {
    #[serde(default)]
    pub menu: Vec<MenuItem>,
}

/// `GET /settings/menu/{id}` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuDetail {
    pub menu: MenuItem,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavEntry {
    pub item: MenuItem,
    pub children: Vec<NavEntry>,
}

/// Sidebar navigation for the signed-in role.
///
/// The backend already filters `/base/menu` by role; this keeps active
/// entries, orders siblings by `urut` and nests them under `id_main`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationMenu {
    pub entries: Vec<NavEntry>,
}

impl NavigationMenu {
    pub fn build(items: Vec<MenuItem>) -> Self {
        let mut by_parent: HashMap<String, Vec<MenuItem>> = HashMap::new();
        let mut roots = Vec::new();

        for item in items.into_iter().filter(MenuItem::is_active) {
            if item.is_top_level() {
                roots.push(item);
            } else {
                by_parent
                    .entry(item.id_main.trim().to_string())
                    .or_default()
                    .push(item);
            }
        }

        // Children whose parent is missing or inactive are dropped
        let entries = Self::attach(roots, &mut by_parent, 0);
        Self { entries }
    }

    fn attach(
        mut items: Vec<MenuItem>,
        by_parent: &mut HashMap<String, Vec<MenuItem>>,
        depth: usize,
    ) -> Vec<NavEntry> {
        items.sort_by_key(MenuItem::order);
        items
            .into_iter()
            .map(|item| {
                let children = match item.id.as_deref() {
                    // Guard against id_main cycles
                    Some(id) if depth < 8 => match by_parent.remove(id.trim()) {
                        Some(kids) => Self::attach(kids, by_parent, depth + 1),
                        None => Vec::new(),
                    },
                    _ => Vec::new(),
                };
                NavEntry { item, children }
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `link` is reachable from this navigation
    pub fn allows(&self, link: &str) -> bool {
        fn walk(entries: &[NavEntry], link: &str) -> bool {
            entries
                .iter()
                .any(|e| e.item.link == link || walk(&e.children, link))
        }
        walk(&self.entries, link)
    }
}
