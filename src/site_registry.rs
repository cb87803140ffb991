/// Bookmarked sites and their visit statistics
use std::collections::HashMap;

use crate::category_store::CategoryStore;
use crate::domain::{extract_hostname, is_web_url, normalize_url, parse_site_url};
use crate::error::{DashTabError, Field, Reason, Result, ValidationError};
use crate::icon::generate_icon;
use crate::site_data::{
    ALL_CATEGORIES, Site, SiteData, SiteDraft, SitePatch, VisitStat, generate_site_id,
};
use crate::view::filtered_sites;

pub const MAX_SITE_NAME_LEN: usize = 16;

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::new(Field::Name, Reason::Missing));
    }
    if name.chars().count() > MAX_SITE_NAME_LEN {
        return Err(ValidationError::new(
            Field::Name,
            Reason::TooLong { max: MAX_SITE_NAME_LEN },
        ));
    }
    Ok(name.to_string())
}

/// Returns the normalized URL
fn validate_url(url: &str) -> Result<String, ValidationError> {
    if url.trim().is_empty() {
        return Err(ValidationError::new(Field::Url, Reason::Missing));
    }
    let normalized = normalize_url(url);
    match parse_site_url(&normalized) {
        Some(_) => Ok(normalized),
        None => Err(ValidationError::new(Field::Url, Reason::Malformed)),
    }
}

fn validate_category(
    category: &str,
    categories: &CategoryStore,
) -> Result<String, ValidationError> {
    let category = category.trim();
    if category.is_empty() {
        return Err(ValidationError::new(Field::Category, Reason::Missing));
    }
    if category != ALL_CATEGORIES && !categories.contains(category) {
        return Err(ValidationError::new(Field::Category, Reason::Unknown));
    }
    Ok(category.to_string())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteRegistry {
    sites: Vec<Site>,
    visit_stats: HashMap<String, VisitStat>,
}

impl SiteRegistry {
    pub fn new(data: SiteData) -> Self {
        SiteRegistry {
            sites: data.sites,
            visit_stats: data.visit_stats,
        }
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn visit_stats(&self) -> &HashMap<String, VisitStat> {
        &self.visit_stats
    }

    pub fn get(&self, id: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.id == id)
    }

    /// Persistable copy
    pub fn to_site_data(&self) -> SiteData {
        SiteData {
            sites: self.sites.clone(),
            visit_stats: self.visit_stats.clone(),
        }
    }

    /// Validate a form submission and append it with a zeroed visit stat
    pub fn add(&mut self, draft: &SiteDraft, categories: &CategoryStore, now: f64) -> Result<Site> {
        let name = validate_name(&draft.name)?;
        let url = validate_url(&draft.url)?;
        let category = validate_category(&draft.category, categories)?;

        let site = Site {
            id: generate_site_id(now),
            icon: generate_icon(&name),
            name,
            url,
            color: draft.color.clone(),
            category,
            order: self.sites.len() as i64,
            created_at: now,
        };

        self.visit_stats.insert(site.id.clone(), VisitStat::default());
        self.sites.push(site.clone());
        Ok(site)
    }

    /// Remove a site together with its visit stat; no-op when absent
    pub fn remove(&mut self, id: &str) -> Option<Site> {
        let position = self.sites.iter().position(|s| s.id == id)?;
        self.visit_stats.remove(id);
        Some(self.sites.remove(position))
    }

    /// Apply an edit. Every provided field is validated before any is written.
    pub fn update(
        &mut self,
        id: &str,
        patch: &SitePatch,
        categories: &CategoryStore,
    ) -> Result<Site> {
        let position = self
            .sites
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| DashTabError::NotFound(format!("site \"{}\"", id)))?;

        let name = patch.name.as_deref().map(validate_name).transpose()?;
        let url = patch.url.as_deref().map(validate_url).transpose()?;
        let category = patch
            .category
            .as_deref()
            .map(|c| validate_category(c, categories))
            .transpose()?;

        let site = &mut self.sites[position];
        if let Some(name) = name {
            site.icon = generate_icon(&name);
            site.name = name;
        }
        if let Some(url) = url {
            site.url = url;
        }
        if let Some(color) = &patch.color {
            site.color = color.clone();
        }
        if let Some(category) = category {
            site.category = category;
        }
        Ok(site.clone())
    }

    /// Count one visit; a site missing its stat gets a fresh one
    pub fn record_visit(&mut self, id: &str, now: f64) -> Result<VisitStat> {
        if self.get(id).is_none() {
            return Err(DashTabError::NotFound(format!("site \"{}\"", id)));
        }

        let stat = self.visit_stats.entry(id.to_string()).or_default();
        stat.count += 1;
        stat.last_visit = Some(now);
        Ok(stat.clone())
    }

    /// Record a visit for the first site on the same host as `url`;
    /// returns the matched site id
    pub fn record_visit_by_url(&mut self, url: &str, now: f64) -> Option<String> {
        if !is_web_url(url) {
            return None;
        }
        let host = extract_hostname(url)?;

        let id = self
            .sites
            .iter()
            .find(|s| extract_hostname(&s.url).as_deref() == Some(host.as_str()))
            .map(|s| s.id.clone())?;

        self.record_visit(&id, now).ok()?;
        Some(id)
    }

    /// Point every site in `from` at `to`; returns how many moved
    pub fn reassign_category(&mut self, from: &str, to: &str) -> usize {
        let mut moved = 0;
        for site in self.sites.iter_mut().filter(|s| s.category == from) {
            site.category = to.to_string();
            moved += 1;
        }
        moved
    }

    /// Move one site within the filtered, ordered view and renumber the
    /// view. Sites outside the filter keep their `order`. Returns whether
    /// anything changed.
    pub fn reorder_within(&mut self, filter: &str, from: usize, to: usize) -> bool {
        let mut ids: Vec<String> = filtered_sites(&self.sites, filter)
            .into_iter()
            .map(|s| s.id.clone())
            .collect();

        if from >= ids.len() {
            return false;
        }
        let to = to.min(ids.len() - 1);
        if from == to {
            return false;
        }

        let moved = ids.remove(from);
        ids.insert(to, moved);

        let positions: HashMap<&str, i64> = ids
            .iter()
            .enumerate()
            .map(|(index, id)| (id.as_str(), index as i64))
            .collect();

        for site in self.sites.iter_mut() {
            if let Some(order) = positions.get(site.id.as_str()) {
                site.order = *order;
            }
        }
        true
    }
}
