// 🏷️ Category Entity - feed category tree
//
// Identity: feed id. Hierarchy: parent_id (raw) + parent (resolved id of a
// category in the same list). Level is the depth from the root (root = 0).

use crate::collection::{Entity, IndexedCollection};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::graph::CategoryGraph;
use crate::record::RawRecord;
use crate::validation::{FieldValue, Validate, ValidationRule};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Parent id that feeds use for "no parent"
pub const ROOT_PARENT_ID: &str = "0";

// ============================================================================
// CATEGORY ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Option<String>,

    pub name: Option<String>,

    /// Parent id as given by the feed (sentinel already normalized away)
    pub parent_id: Option<String>,

    /// Resolved parent. Set only when `parent_id` exists in the same list.
    pub parent: Option<String>,

    /// Depth from the root (root = 0)
    pub level: usize,
}

impl Category {
    pub fn new(id: &str, name: &str, parent_id: Option<&str>) -> Self {
        Category {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            parent_id: parent_id.map(str::to_string),
            parent: None,
            level: 0,
        }
    }

    /// Build from an extracted record, mapping `root_parent_id` to no parent
    pub fn from_record(record: &RawRecord, root_parent_id: &str) -> Self {
        let parent_id = record
            .get("parent_id")
            .filter(|id| !id.is_empty() && *id != root_parent_id)
            .map(str::to_string);

        Category {
            id: record.text("id"),
            name: record.text("name"),
            parent_id,
            parent: None,
            level: 0,
        }
    }

    /// Root category (no parent declared)
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl From<&RawRecord> for Category {
    fn from(record: &RawRecord) -> Self {
        Category::from_record(record, ROOT_PARENT_ID)
    }
}

impl From<RawRecord> for Category {
    fn from(record: RawRecord) -> Self {
        Category::from(&record)
    }
}

impl Validate for Category {
    const KIND: &'static str = "category";
    const RULES: &'static [(&'static str, ValidationRule)] = &[
        ("id", ValidationRule::Required),
        ("name", ValidationRule::Required),
        ("parent_id", ValidationRule::ResolvedWhenPresent),
    ];

    fn field_value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "id" => FieldValue::Text(self.id.as_deref()),
            "name" => FieldValue::Text(self.name.as_deref()),
            "parent_id" => FieldValue::Reference {
                id: self.parent_id.as_deref(),
                resolved: self.parent.is_some(),
            },
            _ => FieldValue::Undeclared,
        }
    }
}

impl Entity for Category {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

// ============================================================================
// CATEGORY LIST
// ============================================================================

/// Categories of one catalog, parents admitted before children
#[derive(Debug, Clone, Default)]
pub struct CategoryList {
    items: IndexedCollection<Category>,
}

impl CategoryList {
    pub fn new() -> Self {
        CategoryList {
            items: IndexedCollection::new(),
        }
    }

    /// Build from extracted records: normalize, order the tree, admit
    ///
    /// Fails on a cycle or a parent id that names no category.
    pub fn from_records(records: &[RawRecord], config: &CatalogConfig) -> Result<Self> {
        let categories = records
            .iter()
            .map(|record| Category::from_record(record, &config.root_parent_id));

        let list = CategoryList::from_categories(categories)?;

        info!(count = list.len(), "category list built");
        Ok(list)
    }

    /// Build from typed categories in any order; same checks as `from_records`
    pub fn from_categories<I>(categories: I) -> Result<Self>
    where
        I: IntoIterator<Item = Category>,
    {
        let mut list = CategoryList::new();
        for category in CategoryGraph::new(categories)?.topsorted()? {
            list.add(category);
        }
        Ok(list)
    }

    /// Admit a category and link it to its parent if the parent is present
    ///
    /// Callers must admit parents first; only the graph-sorted builders do.
    pub(crate) fn add<C: Into<Category>>(&mut self, item: C) -> &Category {
        let mut category = item.into();

        match category.parent_id.as_deref().and_then(|id| self.items.find(id)) {
            Some(parent) => {
                category.parent = parent.id.clone();
                category.level = parent.level + 1;
            }
            None => category.parent = None,
        }

        self.items.add(category)
    }

    pub fn find(&self, id: &str) -> Option<&Category> {
        self.items.find(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Category> {
        self.items.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.ids()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn parent(&self, category: &Category) -> Option<&Category> {
        category.parent.as_deref().and_then(|id| self.find(id))
    }

    pub fn roots(&self) -> impl Iterator<Item = &Category> + '_ {
        self.iter().filter(|category| category.is_root())
    }

    pub fn children<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Category> + 'a {
        self.iter()
            .filter(move |category| category.parent.as_deref() == Some(id))
    }

    /// Walk up from `id` until reaching `level` or above
    ///
    /// Example: with Books(0) → Fiction(1) → Sci-Fi(2), `ancestor_at("sci-fi", 1)`
    /// is Fiction.
    pub fn ancestor_at(&self, id: &str, level: usize) -> Option<&Category> {
        let mut current = self.find(id)?;

        while current.level > level {
            current = self.parent(current)?;
        }

        Some(current)
    }

    /// Root → ... → category
    pub fn path(&self, id: &str) -> Vec<&Category> {
        let mut path = Vec::new();
        let mut current = self.find(id);

        while let Some(category) = current {
            path.insert(0, category);
            current = self.parent(category);
        }

        path
    }

    /// Drop every category deeper than `level`; returns how many went
    pub fn prune(&mut self, level: i64) -> Result<usize> {
        if level < 0 {
            return Err(CatalogError::InvalidLevel(level));
        }

        let threshold = level as usize;
        let removed = self.items.delete_if(|category| category.level > threshold);

        info!(level, removed, remaining = self.len(), "categories pruned");
        Ok(removed)
    }
}

impl<'a> IntoIterator for &'a CategoryList {
    type Item = &'a Category;
    type IntoIter = std::slice::Iter<'a, Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str, parent_id: Option<&str>) -> RawRecord {
        let record = RawRecord::new().with("id", id).with("name", name);
        match parent_id {
            Some(parent_id) => record.with("parent_id", parent_id),
            None => record,
        }
    }

    fn create_test_list() -> CategoryList {
        CategoryList::from_records(
            &[
                record("1", "Books", None),
                record("2", "Fiction", Some("1")),
                record("3", "Sci-Fi", Some("2")),
                record("4", "Music", Some("0")),
            ],
            &CatalogConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_category_from_record() {
        let category = Category::from(&record("2", "Fiction", Some("1")));

        assert_eq!(category.id.as_deref(), Some("2"));
        assert_eq!(category.name.as_deref(), Some("Fiction"));
        assert_eq!(category.parent_id.as_deref(), Some("1"));
        assert!(category.parent.is_none());
        assert!(!category.is_root());
    }

    #[test]
    fn test_root_sentinel_normalized() {
        let category = Category::from(&record("4", "Music", Some("0")));
        assert!(category.is_root());

        let custom = Category::from_record(&record("4", "Music", Some("-1")), "-1");
        assert!(custom.is_root());
    }

    #[test]
    fn test_levels_and_parent_links() {
        let list = create_test_list();

        assert_eq!(list.len(), 4);
        assert_eq!(list.find("1").map(|c| c.level), Some(0));
        assert_eq!(list.find("2").map(|c| c.level), Some(1));
        assert_eq!(list.find("3").map(|c| c.level), Some(2));
        assert_eq!(list.find("4").map(|c| c.level), Some(0));

        let sci_fi = list.find("3").unwrap();
        assert_eq!(sci_fi.parent.as_deref(), Some("2"));
        assert_eq!(list.parent(sci_fi).and_then(|c| c.name.as_deref()), Some("Fiction"));
        assert!(list.iter().all(|c| c.is_valid()));
    }

    #[test]
    fn test_children_before_parents_in_feed() {
        let list = CategoryList::from_records(
            &[record("3", "Sci-Fi", Some("2")), record("2", "Fiction", Some("1")), record("1", "Books", None)],
            &CatalogConfig::default(),
        )
        .unwrap();

        assert_eq!(list.find("3").and_then(|c| c.parent.as_deref()), Some("2"));
        assert_eq!(list.find("3").map(|c| c.level), Some(2));
    }

    #[test]
    fn test_cycle_rejected() {
        let result = CategoryList::from_records(
            &[record("A", "A", Some("B")), record("B", "B", Some("A"))],
            &CatalogConfig::default(),
        );

        assert!(result.err().is_some_and(|e| e.is_structural()));
    }

    #[test]
    fn test_from_categories_rejects_cycle() {
        let result = CategoryList::from_categories(vec![
            Category::new("1", "Books", None),
            Category::new("2", "Fiction", Some("1")),
            Category::new("1", "Books", Some("2")),
        ]);

        assert!(matches!(result, Err(CatalogError::CategoryCycle { .. })));
    }

    #[test]
    fn test_from_categories_child_first_levels() {
        let mut list = CategoryList::from_categories(vec![
            Category::new("2", "Fiction", Some("1")),
            Category::new("1", "Books", None),
        ])
        .unwrap();

        assert_eq!(list.find("2").map(|c| c.level), Some(1));
        assert_eq!(list.find("2").and_then(|c| c.parent.as_deref()), Some("1"));

        list.prune(0).unwrap();
        assert_eq!(list.ids().collect::<Vec<_>>(), vec!["1"]);
    }

    #[test]
    fn test_unresolved_parent_is_data_error_on_direct_add() {
        let mut list = CategoryList::new();
        let orphan = list.add(Category::new("5", "Orphan", Some("404")));

        assert!(orphan.parent.is_none());
        assert_eq!(
            orphan.errors().get("parent_id"),
            Some("references unknown entity '404'")
        );
    }

    #[test]
    fn test_queries() {
        let list = create_test_list();

        let roots: Vec<&str> = list.roots().map(|c| c.key()).collect();
        assert_eq!(roots.len(), 2);
        assert!(roots.contains(&"1") && roots.contains(&"4"));

        let children: Vec<&str> = list.children("1").map(|c| c.key()).collect();
        assert_eq!(children, vec!["2"]);

        let path: Vec<&str> = list.path("3").iter().map(|c| c.key()).collect();
        assert_eq!(path, vec!["1", "2", "3"]);

        assert_eq!(list.ancestor_at("3", 1).map(|c| c.key()), Some("2"));
        assert_eq!(list.ancestor_at("3", 0).map(|c| c.key()), Some("1"));
        assert_eq!(list.ancestor_at("2", 5).map(|c| c.key()), Some("2"));
        assert!(list.ancestor_at("missing", 0).is_none());
    }

    #[test]
    fn test_prune() {
        let mut list = create_test_list();
        let removed = list.prune(1).unwrap();

        assert_eq!(removed, 1);
        let mut ids: Vec<&str> = list.ids().collect();
        ids.sort();
        assert_eq!(ids, vec!["1", "2", "4"]);
        assert!(list.iter().all(|c| c.level <= 1));

        // Surviving parent links still resolve
        let fiction = list.find("2").unwrap();
        assert!(list.parent(fiction).is_some());
    }

    #[test]
    fn test_prune_negative_level_fails_without_mutation() {
        let mut list = create_test_list();

        assert_eq!(list.prune(-1), Err(CatalogError::InvalidLevel(-1)));
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_duplicate_category_last_wins() {
        let list = CategoryList::from_records(
            &[record("1", "Books", None), record("1", "Audio Books", None)],
            &CatalogConfig::default(),
        )
        .unwrap();

        assert_eq!(list.len(), 1);
        assert_eq!(list.find("1").and_then(|c| c.name.as_deref()), Some("Audio Books"));
    }
}
