use chrono::{DateTime, Utc};
use sea_orm::Condition;
use sea_orm::entity::prelude::*;

/// One entry request and its lifecycle: requested (`confirm_in = false`),
/// confirmed with `enter_time`, closed with `out_time`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "in_outs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub customer_id: i64,
    pub gym_id: i64,
    /// membership that authorised the entry
    pub subscription_id: i64,
    pub closet: Option<String>,
    pub enter_time: Option<DateTime<Utc>>,
    pub out_time: Option<DateTime<Utc>>,
    pub confirm_in: bool,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// Mirrors the predicate of the `idx_in_outs_one_open_per_customer_gym` index.
    pub fn is_open(&self) -> bool {
        !self.confirm_in || (self.enter_time.is_some() && self.out_time.is_none())
    }
}

pub fn open_condition() -> Condition {
    Condition::any().add(Column::ConfirmIn.eq(false)).add(
        Condition::all()
            .add(Column::EnterTime.is_not_null())
            .add(Column::OutTime.is_null()),
    )
}

/// Entered rows by enter_time descending, pending requests after them.
pub fn sort_newest_entry_first(rows: &mut [Model]) {
    rows.sort_by(|a, b| match (a.enter_time, b.enter_time) {
        (Some(x), Some(y)) => y.cmp(&x).then(b.id.cmp(&a.id)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => b.id.cmp(&a.id),
    });
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
