use sea_orm::{EntityTrait, Related, RelationDef};
use serde_json::Value;

/// Per-entity hooks used by [`Options`](crate::options::Options).
///
/// Implement this on a Sea-ORM `Entity`. The defaults describe an entity with no
/// filterable relations and no computed attributes.
///
/// ```rust,ignore
/// impl SelectResource for product::Entity {
///     fn relation_path(name: &str) -> Option<Vec<RelationDef>> {
///         match name {
///             "category" => Some(relation_path_of::<Self, category::Entity>()),
///             "tags" => Some(relation_path_of::<Self, tag::Entity>()),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait SelectResource: EntityTrait {
    /// Relation chain reached by `name` (for example `"tags"` or `"category.parent"`),
    /// starting from this entity.
    ///
    /// Used by both `pivotParams` filters and nested search attributes.
    #[must_use]
    fn relation_path(name: &str) -> Option<Vec<RelationDef>> {
        let _ = name;
        None
    }

    /// Value of an appended attribute for `model`. `None` serializes as `null`.
    #[must_use]
    fn computed_attribute(model: &Self::Model, attribute: &str) -> Option<Value> {
        let _ = (model, attribute);
        None
    }
}

/// Relation chain from `E` to `R`: the pivot hop first when the relation
/// goes through one, then the hop onto `R`.
#[must_use]
pub fn relation_path_of<E, R>() -> Vec<RelationDef>
where
    E: EntityTrait + Related<R>,
    R: EntityTrait,
{
    let mut path: Vec<RelationDef> = <E as Related<R>>::via().into_iter().collect();
    path.push(<E as Related<R>>::to());
    path
}
