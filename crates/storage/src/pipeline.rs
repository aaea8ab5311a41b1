//! Product search as a sequence of store-agnostic stages.
//!
//! The shape is fixed: join the category, keep live products, apply the
//! requested filters, then (for the page only) join review aggregates,
//! sort and paginate. Building is pure so the stage list can be checked
//! without a database.

use domain::commands::product_commands::ProductFilter;

use crate::document::{Filter, JoinFold, SortKey, SortOrder, Stage, CATEGORIES, REVIEWS};
use crate::pagination::Page;

pub const TOTAL_ALIAS: &str = "total";
pub const RATING_ALIAS: &str = "rating";
pub const COMMENT_COUNT_ALIAS: &str = "comment_count";

#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuery {
    filters: Vec<Stage>,
    joins: Vec<Stage>,
    sort: Vec<SortKey>,
}

impl ProductQuery {
    pub fn from_filter(filter: &ProductFilter) -> Self {
        let mut filters = vec![
            Stage::Join {
                from: CATEGORIES.to_string(),
                local_field: "category_id".to_string(),
                foreign_field: "_id".to_string(),
                alias: "category".to_string(),
                fold: JoinFold::First,
                only_live: true,
            },
            Stage::Match(Filter::live()),
        ];

        if let Some(name) = non_empty(&filter.name) {
            filters.push(Stage::Match(Filter::contains("name", name)));
        }
        if let Some(category) = non_empty(&filter.category) {
            filters.push(Stage::Match(Filter::eq("category.name", category)));
        }
        if filter.discount_only {
            filters.push(Stage::Match(Filter::eq("discount.status", true)));
        }

        let mut joins = Vec::new();
        let mut sort = Vec::new();

        if filter.newest_first {
            sort.push(("created_at".to_string(), SortOrder::Descending));
        }
        if let Some(order) = SortOrder::from_direction(filter.price_order) {
            sort.push(("price".to_string(), order));
        }
        if let Some(order) = SortOrder::from_direction(filter.rating_order) {
            joins.push(review_join(
                RATING_ALIAS,
                JoinFold::Average {
                    field: "rating".to_string(),
                },
            ));
            sort.push((RATING_ALIAS.to_string(), order));
        }
        if let Some(order) = SortOrder::from_direction(filter.comment_order) {
            joins.push(review_join(COMMENT_COUNT_ALIAS, JoinFold::Count));
            sort.push((COMMENT_COUNT_ALIAS.to_string(), order));
        }
        sort.push(("_id".to_string(), SortOrder::Ascending));

        Self {
            filters,
            joins,
            sort,
        }
    }

    /// Filter stages followed by a single-document count
    pub fn count_pipeline(&self) -> Vec<Stage> {
        let mut stages = self.filters.clone();
        stages.push(Stage::Count {
            alias: TOTAL_ALIAS.to_string(),
        });
        stages
    }

    /// Filter, join, sort and paginate stages for one page of results
    pub fn page_pipeline(&self, page: &Page) -> Vec<Stage> {
        let mut stages = self.filters.clone();
        stages.extend(self.joins.iter().cloned());
        stages.push(Stage::Sort(self.sort.clone()));
        stages.push(Stage::Skip(page.skip()));
        stages.push(Stage::Limit(page.limit as u64));
        stages
    }
}

fn review_join(alias: &str, fold: JoinFold) -> Stage {
    Stage::Join {
        from: REVIEWS.to_string(),
        local_field: "_id".to_string(),
        foreign_field: "product_id".to_string(),
        alias: alias.to_string(),
        fold,
        only_live: true,
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
