/// Read-side projections over the site list: filtering, ordering, paging
use std::collections::HashMap;

use crate::site_data::{ALL_CATEGORIES, Site, VisitStat};

/// Sites shown per page of the main grid
pub const PAGE_SIZE: usize = 30;

/// Sites shown in the "frequently visited" strip
pub const FREQUENT_LIMIT: usize = 5;

/// Sites in `filter` (every site for `"all"`), ascending by `order`.
/// Ties keep their list order. An unknown filter yields nothing.
pub fn filtered_sites<'a>(sites: &'a [Site], filter: &str) -> Vec<&'a Site> {
    let mut filtered: Vec<&Site> = sites
        .iter()
        .filter(|s| filter == ALL_CATEGORIES || s.category == filter)
        .collect();

    filtered.sort_by_key(|s| s.order);
    filtered
}

/// One 1-based page of `items`; pages past the end (and page 0) are empty
pub fn page_slice<T>(items: &[T], page: usize) -> &[T] {
    if page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(PAGE_SIZE).min(items.len());
    let end = page.saturating_mul(PAGE_SIZE).min(items.len());
    &items[start..end]
}

/// Number of pages for `count` items; an empty list still has one page
pub fn total_pages(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE).max(1)
}

/// Most visited sites first, only those visited at least once
pub fn frequent_sites<'a>(
    sites: &'a [Site],
    visit_stats: &HashMap<String, VisitStat>,
    limit: usize,
) -> Vec<&'a Site> {
    let count_of = |site: &Site| visit_stats.get(&site.id).map_or(0, |s| s.count);

    let mut visited: Vec<&Site> = sites.iter().filter(|s| count_of(*s) > 0).collect();
    visited.sort_by(|a, b| count_of(*b).cmp(&count_of(*a)));
    visited.truncate(limit);
    visited
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_site(id: &str, category: &str, order: i64) -> Site {
        Site {
            id: id.to_string(),
            name: id.to_uppercase(),
            url: format!("https://{}.example.com", id),
            color: String::new(),
            category: category.to_string(),
            icon: String::new(),
            order,
            created_at: 0.0,
        }
    }

    fn ids(sites: &[&Site]) -> Vec<String> {
        sites.iter().map(|s| s.id.clone()).collect()
    }

    #[test]
    fn test_filtered_sites_all() {
        let sites = vec![
            create_test_site("a", "Work", 1),
            create_test_site("b", "Dev", 0),
            create_test_site("c", "all", 2),
        ];

        assert_eq!(ids(&filtered_sites(&sites, ALL_CATEGORIES)), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_filtered_sites_by_category() {
        let sites = vec![
            create_test_site("a", "Work", 5),
            create_test_site("b", "Dev", 0),
            create_test_site("c", "Work", 2),
        ];

        assert_eq!(ids(&filtered_sites(&sites, "Work")), vec!["c", "a"]);
        assert!(filtered_sites(&sites, "nonexistent").is_empty());
    }

    #[test]
    fn test_filtered_sites_stable_on_ties() {
        let sites = vec![
            create_test_site("a", "Work", 0),
            create_test_site("b", "Work", 0),
            create_test_site("c", "Work", 0),
        ];

        assert_eq!(ids(&filtered_sites(&sites, "Work")), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_pagination() {
        let sites: Vec<Site> = (0..35)
            .map(|i| create_test_site(&format!("s{}", i), "Work", i))
            .collect();
        let view = filtered_sites(&sites, "Work");

        assert_eq!(page_slice(&view, 1).len(), 30);
        assert_eq!(page_slice(&view, 2).len(), 5);
        assert_eq!(page_slice(&view, 2)[0].id, "s30");
        assert!(page_slice(&view, 3).is_empty());
        assert!(page_slice(&view, 0).is_empty());
        assert_eq!(total_pages(view.len()), 2);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0), 1);
        assert_eq!(total_pages(30), 1);
        assert_eq!(total_pages(31), 2);
    }

    #[test]
    fn test_frequent_sites() {
        let sites: Vec<Site> = (0..6)
            .map(|i| create_test_site(&format!("s{}", i), "Work", i))
            .collect();
        let counts = [0, 5, 3, 0, 9, 1];
        let visit_stats: HashMap<String, VisitStat> = counts
            .iter()
            .enumerate()
            .map(|(i, count)| {
                (
                    format!("s{}", i),
                    VisitStat {
                        count: *count,
                        last_visit: None,
                    },
                )
            })
            .collect();

        let frequent = frequent_sites(&sites, &visit_stats, FREQUENT_LIMIT);

        assert_eq!(ids(&frequent), vec!["s4", "s1", "s2", "s5"]);
    }

    #[test]
    fn test_frequent_sites_ties_and_limit() {
        let sites: Vec<Site> = (0..4)
            .map(|i| create_test_site(&format!("s{}", i), "Work", i))
            .collect();
        let visit_stats: HashMap<String, VisitStat> = (0..4)
            .map(|i| (format!("s{}", i), VisitStat { count: 2, last_visit: None }))
            .collect();

        let frequent = frequent_sites(&sites, &visit_stats, 3);

        assert_eq!(ids(&frequent), vec!["s0", "s1", "s2"]);
    }
}
