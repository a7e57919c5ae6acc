use datamate_console::core::catalog::{
    builtin_catalog, filter, group_by_category, Catalog, CatalogError, Category, CategoryFilter,
    Favorites, FilterState, OperatorTemplate, ParamSpec, SortOrder,
};
use tempfile::TempDir;

fn sample_catalog() -> Catalog {
    Catalog::from_templates(vec![
        OperatorTemplate::new("html-clean", "HTML Cleaner", Category::DataCleaning)
            .describe("Strips markup")
            .tagged(&["html"])
            .popular(),
        OperatorTemplate::new("dedup", "Deduplicator", Category::DataCleaning)
            .describe("Removes duplicate documents"),
        OperatorTemplate::new("resize", "Resize", Category::Vision)
            .tagged(&["Image"])
            .popular()
            .param("width", ParamSpec::range("Width", 16.0, 4096.0, 16.0, 512.0)),
        OperatorTemplate::new("tokenizer", "Tokenizer", Category::Nlp),
        OperatorTemplate::new("alpha-norm", "Alpha Normalizer", Category::Math),
    ])
    .unwrap()
}

fn ids(templates: &[&OperatorTemplate]) -> Vec<String> {
    templates.iter().map(|t| t.id.clone()).collect()
}

#[test]
fn test_default_state_shows_catalog_order() {
    let catalog = sample_catalog();
    let visible = filter(&catalog, &FilterState::default(), &Favorites::new());
    assert_eq!(
        ids(&visible),
        vec!["html-clean", "dedup", "resize", "tokenizer", "alpha-norm"]
    );
}

#[test]
fn test_filter_is_deterministic_conjunction() {
    let catalog = sample_catalog();
    let favorites: Favorites = ["dedup", "resize"].into_iter().collect();
    let state = FilterState {
        search_term: "e".into(),
        category: CategoryFilter::Only(Category::DataCleaning),
        favorites_only: true,
        sort: SortOrder::Catalog,
    };

    let first = filter(&catalog, &state, &favorites);
    let second = filter(&catalog, &state, &favorites);
    assert_eq!(first, second);

    let expected: Vec<&OperatorTemplate> = catalog
        .iter()
        .filter(|t| {
            t.matches_search(&state.search_term)
                && t.category == Category::DataCleaning
                && favorites.contains(&t.id)
        })
        .collect();
    assert_eq!(first, expected);
    assert_eq!(ids(&first), vec!["dedup"]);
}

#[test]
fn test_search_is_case_insensitive_over_tags_and_description() {
    let catalog = sample_catalog();
    let by_tag = FilterState {
        search_term: "IMAGE".into(),
        ..FilterState::default()
    };
    assert_eq!(
        ids(&filter(&catalog, &by_tag, &Favorites::new())),
        vec!["resize"]
    );

    let by_description = FilterState {
        search_term: "  duplicate ".into(),
        ..FilterState::default()
    };
    assert_eq!(
        ids(&filter(&catalog, &by_description, &Favorites::new())),
        vec!["dedup"]
    );
}

#[test]
fn test_favorites_only_with_empty_favorites_is_empty() {
    let catalog = sample_catalog();
    let state = FilterState {
        favorites_only: true,
        ..FilterState::default()
    };
    assert!(filter(&catalog, &state, &Favorites::new()).is_empty());
}

#[test]
fn test_popular_first_keeps_catalog_order_as_tiebreaker() {
    let catalog = sample_catalog();
    let state = FilterState {
        sort: SortOrder::PopularFirst,
        ..FilterState::default()
    };
    assert_eq!(
        ids(&filter(&catalog, &state, &Favorites::new())),
        vec!["html-clean", "resize", "dedup", "tokenizer", "alpha-norm"]
    );
}

#[test]
fn test_name_sort() {
    let catalog = sample_catalog();
    let state = FilterState {
        sort: SortOrder::Name,
        ..FilterState::default()
    };
    assert_eq!(
        ids(&filter(&catalog, &state, &Favorites::new())),
        vec!["alpha-norm", "dedup", "html-clean", "resize", "tokenizer"]
    );
}

#[test]
fn test_grouping_follows_first_appearance() {
    let catalog = sample_catalog();
    let state = FilterState {
        sort: SortOrder::PopularFirst,
        ..FilterState::default()
    };
    let visible = filter(&catalog, &state, &Favorites::new());
    let groups = group_by_category(&visible);

    let order: Vec<Category> = groups.keys().copied().collect();
    assert_eq!(
        order,
        vec![
            Category::DataCleaning,
            Category::Vision,
            Category::Nlp,
            Category::Math
        ]
    );
    assert_eq!(ids(&groups[&Category::DataCleaning]), vec!["html-clean", "dedup"]);
    let total: usize = groups.values().map(Vec::len).sum();
    assert_eq!(total, visible.len());
}

#[test]
fn test_builtin_catalog_filters_by_every_category() {
    let catalog = builtin_catalog();
    for category in Category::ALL {
        let state = FilterState {
            category: CategoryFilter::Only(category),
            ..FilterState::default()
        };
        let visible = filter(&catalog, &state, &Favorites::new());
        assert!(!visible.is_empty(), "no operators in {}", category);
        assert!(visible.iter().all(|t| t.category == category));
    }
}

#[test]
fn test_yaml_catalog_rejects_duplicates() {
    let yaml = r#"
operators:
  - id: a
    name: A
    category: nlp
  - id: a
    name: Again
    category: vision
"#;
    match Catalog::from_yaml_str(yaml) {
        Err(CatalogError::Duplicate(id)) => assert_eq!(id, "a"),
        other => panic!("expected duplicate error, got {:?}", other.map(|c| c.len())),
    }
}

#[test]
fn test_yaml_catalog_accepts_camel_case_schema() {
    let yaml = r#"
operators:
  - id: lang
    name: Language Filter
    category: nlp
    isPopular: true
    paramSchema:
      languages:
        kind: checkbox
        label: Languages
        defaultValue: [en]
        options: [en, zh, { label: German, value: de }]
"#;
    let catalog = Catalog::from_yaml_str(yaml).unwrap();
    let template = catalog.get("lang").unwrap();
    assert!(template.is_popular);
    assert!(template.params["languages"].has_option("de"));
}

#[test]
fn test_favorites_persist_across_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("favorites.json");

    let mut favorites = Favorites::load(&path).unwrap();
    assert!(favorites.is_empty());
    favorites.add("resize");
    favorites.add("dedup");
    assert!(!favorites.toggle("resize"));
    favorites.save(&path).unwrap();

    let reloaded = Favorites::load(&path).unwrap();
    assert_eq!(reloaded.iter().collect::<Vec<_>>(), vec!["dedup"]);
}
