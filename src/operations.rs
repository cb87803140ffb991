/// Category mutations that must keep sites consistent with the category set
use crate::category_store::CategoryStore;
use crate::error::Result;
use crate::site_data::ALL_CATEGORIES;
use crate::site_registry::SiteRegistry;

/// Rename a category and move its sites along with it.
/// Returns the stored new name.
pub fn rename_category(
    categories: &mut CategoryStore,
    registry: &mut SiteRegistry,
    old_name: &str,
    new_name: &str,
) -> Result<String> {
    let new_name = categories.rename(old_name, new_name)?;
    if new_name != old_name {
        let moved = registry.reassign_category(old_name, &new_name);
        log::debug!("Renamed category {} to {} ({} sites)", old_name, new_name, moved);
    }
    Ok(new_name)
}

/// Delete a category; its sites fall back to "all".
/// Returns how many sites were reassigned.
pub fn remove_category(
    categories: &mut CategoryStore,
    registry: &mut SiteRegistry,
    name: &str,
) -> Result<usize> {
    categories.remove(name)?;
    let moved = registry.reassign_category(name, ALL_CATEGORIES);
    log::debug!("Removed category {} ({} sites moved to all)", name, moved);
    Ok(moved)
}
