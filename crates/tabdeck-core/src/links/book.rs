use chrono::Utc;
use uuid::Uuid;

use super::normalize::{display_host, normalize_url};
use super::{LinkPatch, NewLink, QuickLink};
use crate::{Error, Result};

/// Most launches remembered per link
const ACCESS_LOG_LIMIT: usize = 20;

/// In-memory link collection with CRUD helpers
///
/// Persist the result of [`LinkBook::links`] through the storage layer after mutating.
#[derive(Debug, Clone, Default)]
pub struct LinkBook {
    links: Vec<QuickLink>,
}

impl LinkBook {
    pub fn new(mut links: Vec<QuickLink>) -> Self {
        links.sort_by_key(|l| l.order);
        Self { links }
    }

    pub fn links(&self) -> &[QuickLink] {
        &self.links
    }

    pub fn into_links(self) -> Vec<QuickLink> {
        self.links
    }

    pub fn get(&self, id: &str) -> Option<&QuickLink> {
        self.links.iter().find(|l| l.id == id)
    }

    /// Find by id, then by case-insensitive name
    pub fn find(&self, id_or_name: &str) -> Option<&QuickLink> {
        self.get(id_or_name).or_else(|| {
            self.links
                .iter()
                .find(|l| l.name.eq_ignore_ascii_case(id_or_name))
        })
    }

    pub fn add(&mut self, new_link: NewLink) -> Result<&QuickLink> {
        let url = normalize_url(&new_link.url)?;
        let name = new_link
            .name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| display_host(&url))
            .unwrap_or_else(|| url.clone());
        let order = self.links.iter().map(|l| l.order + 1).max().unwrap_or(0);

        self.links.push(QuickLink {
            id: Uuid::new_v4().to_string(),
            name,
            url,
            icon: Default::default(),
            tags: new_link.tags,
            order,
            access_log: Vec::new(),
        });
        let added = self.links.len() - 1;
        Ok(&self.links[added])
    }

    pub fn update(&mut self, id: &str, patch: LinkPatch) -> Result<&QuickLink> {
        let url = patch.url.as_deref().map(normalize_url).transpose()?;
        let link = self
            .links
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| Error::LinkNotFound(id.to_string()))?;

        if let Some(name) = patch.name {
            link.name = name;
        }
        if let Some(url) = url {
            link.url = url;
        }
        if let Some(icon) = patch.icon {
            link.icon = icon;
        }
        if let Some(tags) = patch.tags {
            link.tags = tags;
        }
        Ok(link)
    }

    pub fn remove(&mut self, id: &str) -> Result<QuickLink> {
        let index = self
            .links
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| Error::LinkNotFound(id.to_string()))?;
        Ok(self.links.remove(index))
    }

    /// Record a launch of the link
    pub fn record_access(&mut self, id: &str) -> Result<()> {
        let link = self
            .links
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| Error::LinkNotFound(id.to_string()))?;
        link.access_log.push(Utc::now());
        if link.access_log.len() > ACCESS_LOG_LIMIT {
            let excess = link.access_log.len() - ACCESS_LOG_LIMIT;
            link.access_log.drain(..excess);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_order_and_name() {
        let mut book = LinkBook::default();
        book.add(NewLink {
            url: "www.rust-lang.org".into(),
            ..Default::default()
        })
        .unwrap();
        let second = book
            .add(NewLink {
                name: Some("Docs".into()),
                url: "https://docs.rs".into(),
                tags: vec!["rust".into()],
            })
            .unwrap()
            .clone();

        assert_eq!(book.links()[0].name, "rust-lang.org");
        assert_eq!(book.links()[0].order, 0);
        assert_eq!(second.order, 1);
        assert_eq!(second.url, "https://docs.rs/");
    }

    #[test]
    fn test_update_and_remove() {
        let mut book = LinkBook::default();
        let id = book
            .add(NewLink {
                url: "a.com".into(),
                ..Default::default()
            })
            .unwrap()
            .id
            .clone();

        book.update(
            &id,
            LinkPatch {
                url: Some("b.com".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(book.get(&id).unwrap().url, "https://b.com/");
        assert!(book.find("A.COM").is_some());

        book.remove(&id).unwrap();
        assert!(matches!(book.remove(&id), Err(Error::LinkNotFound(_))));
    }

    #[test]
    fn test_access_log_is_bounded() {
        let mut book = LinkBook::default();
        let id = book
            .add(NewLink {
                url: "a.com".into(),
                ..Default::default()
            })
            .unwrap()
            .id
            .clone();
        for _ in 0..30 {
            book.record_access(&id).unwrap();
        }
        assert_eq!(book.get(&id).unwrap().access_log.len(), ACCESS_LOG_LIMIT);
    }
}
