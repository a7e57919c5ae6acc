//! Pure projection of the catalog onto the current filter state.

use crate::core::catalog::{Catalog, Category, Favorites, OperatorTemplate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category predicate; `All` bypasses the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    #[serde(untagged)]
    Only(Category),
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        value.parse::<Category>().map(CategoryFilter::Only)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(category) => write!(f, "{}", category),
        }
    }
}

/// Ordering applied after filtering. Sorting is stable with catalog order as tiebreaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    Catalog,
    PopularFirst,
    Name,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "catalog" => Ok(SortOrder::Catalog),
            "popular" | "popular-first" => Ok(SortOrder::PopularFirst),
            "name" => Ok(SortOrder::Name),
            _ => Err(format!(
                "invalid sort order '{}'; supported values are catalog, popular, name",
                value
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub search_term: String,
    pub category: CategoryFilter,
    pub favorites_only: bool,
    #[serde(default)]
    pub sort: SortOrder,
}

impl FilterState {
    pub fn matches_search(&self, template: &OperatorTemplate) -> bool {
        template.matches_search(&self.search_term)
    }

    pub fn matches_category(&self, template: &OperatorTemplate) -> bool {
        match self.category {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => template.category == category,
        }
    }

    pub fn matches_favorites(&self, template: &OperatorTemplate, favorites: &Favorites) -> bool {
        !self.favorites_only || favorites.contains(&template.id)
    }

    pub fn matches(&self, template: &OperatorTemplate, favorites: &Favorites) -> bool {
        let search = self.matches_search(template);
        let category = self.matches_category(template);
        let favorite = self.matches_favorites(template, favorites);
        search && category && favorite
    }
}

/// Templates visible under `state`, recomputed on every call.
pub fn filter<'a>(
    catalog: &'a Catalog,
    state: &FilterState,
    favorites: &Favorites,
) -> Vec<&'a OperatorTemplate> {
    let mut visible: Vec<&OperatorTemplate> = catalog
        .iter()
        .filter(|template| state.matches(template, favorites))
        .collect();
    match state.sort {
        SortOrder::Catalog => {}
        SortOrder::PopularFirst => visible.sort_by_key(|t| !t.is_popular),
        SortOrder::Name => visible.sort_by_cached_key(|t| t.name.to_lowercase()),
    }
    visible
}

/// Partition by category, groups in first-appearance order, members in input order.
pub fn group_by_category<'a>(
    templates: &[&'a OperatorTemplate],
) -> IndexMap<Category, Vec<&'a OperatorTemplate>> {
    let mut groups: IndexMap<Category, Vec<&'a OperatorTemplate>> = IndexMap::new();
    for &template in templates {
        groups.entry(template.category).or_default().push(template);
    }
    groups
}
