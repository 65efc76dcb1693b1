use sea_orm::{
    ColumnTrait, Condition, QueryFilter, Select,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};
use serde::Deserialize;
use std::str::FromStr;

use crate::filter::{related_column, resolve_column, where_has};
use crate::traits::SelectResource;

// Basic safety limits
const MAX_SEARCH_QUERY_LENGTH: usize = 255;

/// How each search word is matched against an attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchMode {
    /// `%word%`
    #[default]
    Full,
    /// `word%`
    StartsWith,
    /// `%word`
    EndsWith,
    /// `word`
    ExactMatch,
    /// No attribute contains `word`
    DoesntContain,
}

impl SearchMode {
    fn pattern(self, word: &str) -> String {
        let word = escape_like_wildcards(word);
        match self {
            Self::Full | Self::DoesntContain => format!("%{word}%"),
            Self::StartsWith => format!("{word}%"),
            Self::EndsWith => format!("%{word}"),
            Self::ExactMatch => word,
        }
    }
}

/// SQL comparison used for matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum ComparisonOperator {
    #[default]
    #[serde(rename = "LIKE", alias = "like")]
    Like,
    /// Case-insensitive; rendered as `UPPER(col) LIKE UPPER(pattern)` so it
    /// works on every backend.
    #[serde(rename = "ILIKE", alias = "ilike")]
    ILike,
}

impl FromStr for ComparisonOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LIKE" => Ok(Self::Like),
            "ILIKE" => Ok(Self::ILike),
            other => Err(format!("unknown comparison operator '{other}'")),
        }
    }
}

/// Escape `%`, `_` and the escape character itself so user input matches literally.
fn escape_like_wildcards(input: &str) -> String {
    // Backslash first so the escapes added below stay intact
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Free-text search over direct and nested attributes.
///
/// Every whitespace-separated word of the term must match; a word matches when
/// any attribute matches it (or, for [`SearchMode::DoesntContain`], when no
/// attribute does).
#[derive(Debug, Clone)]
pub struct Search {
    attributes: Vec<String>,
    relations: Vec<String>,
    term: String,
    search_mode: SearchMode,
    comparison_operator: ComparisonOperator,
}

impl Search {
    pub fn new(attributes: impl IntoIterator<Item = impl Into<String>>, term: &str) -> Self {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
            relations: Vec::new(),
            term: term.to_string(),
            search_mode: SearchMode::default(),
            comparison_operator: ComparisonOperator::default(),
        }
    }

    /// Nested attributes in `relation.attribute` form.
    #[must_use]
    pub fn relations(mut self, relations: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.relations = relations.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn search_mode(mut self, search_mode: SearchMode) -> Self {
        self.search_mode = search_mode;
        self
    }

    #[must_use]
    pub fn comparison_operator(mut self, comparison_operator: ComparisonOperator) -> Self {
        self.comparison_operator = comparison_operator;
        self
    }

    fn words(&self) -> Vec<&str> {
        let end = self
            .term
            .char_indices()
            .nth(MAX_SEARCH_QUERY_LENGTH)
            .map_or(self.term.len(), |(index, _)| index);
        self.term[..end].split_whitespace().collect()
    }

    /// The search as a condition on `E`, or `None` when the term has no words.
    #[must_use]
    pub fn condition<E>(&self) -> Option<Condition>
    where
        E: SelectResource,
        E::Column: FromStr,
    {
        let words = self.words();
        if words.is_empty() {
            return None;
        }

        let mut condition = Condition::all();
        for word in words {
            condition = condition.add(self.word_condition::<E>(word));
        }
        Some(condition)
    }

    /// Narrow `query` to the rows matching the search.
    #[must_use]
    pub fn handle<E>(&self, query: Select<E>) -> Select<E>
    where
        E: SelectResource,
        E::Column: FromStr,
    {
        match self.condition::<E>() {
            Some(condition) => query.filter(condition),
            None => query,
        }
    }

    fn word_condition<E>(&self, word: &str) -> Condition
    where
        E: SelectResource,
        E::Column: FromStr,
    {
        let negate = self.search_mode == SearchMode::DoesntContain;
        let pattern = self.search_mode.pattern(word);
        let mut condition = if negate {
            Condition::all()
        } else {
            Condition::any()
        };

        for attribute in &self.attributes {
            if let Some(column) = resolve_column::<E>(attribute) {
                let matches = self.matches(Expr::col(column.as_column_ref()), &pattern);
                condition = condition.add(if negate { matches.not() } else { matches });
            }
        }

        for nested in &self.relations {
            let Some((relation, attribute)) = nested.rsplit_once('.') else {
                continue;
            };
            let Some(path) = E::relation_path(relation) else {
                tracing::warn!(relation, "Unknown search relation, ignoring");
                continue;
            };

            let Some(column) = related_column(&path, attribute) else {
                continue;
            };
            let related = Condition::all().add(self.matches(column, &pattern));
            if let Some(exists) = where_has(&path, related) {
                condition = condition.add(if negate { exists.not() } else { exists });
            }
        }

        condition
    }

    fn matches(&self, column: Expr, pattern: &str) -> SimpleExpr {
        match self.comparison_operator {
            ComparisonOperator::Like => column.like(LikeExpr::new(pattern).escape('\\')),
            ComparisonOperator::ILike => Expr::expr(Func::upper(column))
                .like(LikeExpr::new(pattern.to_uppercase()).escape('\\')),
        }
    }
}
