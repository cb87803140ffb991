/// The set of categories and their display order
use std::collections::HashSet;

use crate::error::{DashTabError, Field, Reason, Result, ValidationError};
use crate::site_data::{ALL_CATEGORIES, Category, DEFAULT_CATEGORY};

pub const MAX_CATEGORY_NAME_LEN: usize = 10;

/// Trim a proposed category name and check it is usable
pub fn validate_category_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::new(Field::Name, Reason::Missing));
    }
    if name.chars().count() > MAX_CATEGORY_NAME_LEN {
        return Err(ValidationError::new(
            Field::Name,
            Reason::TooLong { max: MAX_CATEGORY_NAME_LEN },
        ));
    }
    if name == ALL_CATEGORIES {
        return Err(ValidationError::new(Field::Name, Reason::Reserved));
    }
    Ok(name.to_string())
}

/// Align an order list with a category set
///
/// Every entry of `order` is kept as is, including names that no longer
/// exist. Categories missing from `order` are appended in the set's own
/// iteration order.
pub fn reconcile(order: &[String], categories: &[Category]) -> Vec<String> {
    let known: HashSet<&str> = order.iter().map(String::as_str).collect();
    let missing = categories
        .iter()
        .filter(|c| !known.contains(c.name.as_str()))
        .map(|c| c.name.clone());

    order.iter().cloned().chain(missing).collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryStore {
    categories: Vec<Category>,
    order: Vec<String>,
}

impl CategoryStore {
    pub fn new(categories: Vec<Category>, order: Vec<String>) -> Self {
        CategoryStore { categories, order }
    }

    /// Fresh-install contents: just the built-in bucket
    pub fn with_defaults() -> Self {
        CategoryStore {
            categories: vec![Category::builtin(DEFAULT_CATEGORY)],
            order: vec![DEFAULT_CATEGORY.to_string()],
        }
    }

    /// Categories in store (creation) order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Raw order list, possibly holding names of removed categories
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Append categories missing from the order list; returns whether the
    /// list changed and needs persisting
    pub fn reconcile(&mut self) -> bool {
        let reconciled = reconcile(&self.order, &self.categories);
        if reconciled == self.order {
            return false;
        }
        self.order = reconciled;
        true
    }

    /// Categories in display order, skipping stale order entries
    pub fn ordered(&self) -> Vec<Category> {
        let mut seen = HashSet::new();
        reconcile(&self.order, &self.categories)
            .iter()
            .filter(|name| seen.insert(name.as_str().to_owned()))
            .filter_map(|name| self.get(name).cloned())
            .collect()
    }

    pub fn add(&mut self, name: &str, removable: bool) -> Result<Category> {
        let name = validate_category_name(name)?;
        if self.contains(&name) {
            return Err(DashTabError::DuplicateName(name));
        }

        let category = Category { name, removable };
        self.categories.push(category.clone());
        self.order.push(category.name.clone());
        Ok(category)
    }

    /// Rename in the set and in the order list; returns the stored new name
    ///
    /// Sites are not touched here, see `operations::rename_category`.
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> Result<String> {
        let new_name = validate_category_name(new_name)?;
        let position = self
            .categories
            .iter()
            .position(|c| c.name == old_name)
            .ok_or_else(|| DashTabError::NotFound(format!("category \"{}\"", old_name)))?;

        if new_name == old_name {
            return Ok(new_name);
        }
        if self.contains(&new_name) {
            return Err(DashTabError::DuplicateName(new_name));
        }

        self.categories[position].name = new_name.clone();
        for entry in self.order.iter_mut().filter(|entry| entry.as_str() == old_name) {
            *entry = new_name.clone();
        }
        Ok(new_name)
    }

    /// Drop from the set and the order list
    ///
    /// Sites are not touched here, see `operations::remove_category`.
    pub fn remove(&mut self, name: &str) -> Result<Category> {
        let position = self
            .categories
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| DashTabError::NotFound(format!("category \"{}\"", name)))?;

        if !self.categories[position].removable {
            return Err(DashTabError::NotRemovable(name.to_string()));
        }

        let removed = self.categories.remove(position);
        self.order.retain(|entry| entry != name);
        Ok(removed)
    }

    /// Replace the order list with a dragged sequence. Unknown and repeated
    /// names are dropped; categories the sequence leaves out keep their
    /// previous relative order at the end.
    pub fn reorder(&mut self, names: &[String]) {
        let mut placed = HashSet::new();
        let mut order: Vec<String> = names
            .iter()
            .filter(|name| self.contains(name))
            .filter(|name| placed.insert(name.as_str().to_owned()))
            .cloned()
            .collect();

        let rest: Vec<String> = self
            .ordered()
            .into_iter()
            .map(|c| c.name)
            .filter(|name| !placed.contains(name))
            .collect();

        order.extend(rest);
        self.order = order;
    }
}
