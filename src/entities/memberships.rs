use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{Condition, QuerySelect};
use sea_orm::entity::prelude::*;

/// A customer's subscription to one of a gym's membership types.
///
/// `price` and `days` are snapshots of the type at purchase time. `is_active`
/// only records that payment completed; whether the membership can be used
/// right now is always derived through [`is_membership_usable`].
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "memberships")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub customer_id: i64,
    pub gym_id: i64,
    pub type_id: i64,
    pub transaction_id: Option<i64>,
    pub start_date: NaiveDate,
    pub validity_date: Option<NaiveDate>,
    pub session_left: i32,
    pub price: i64,
    pub days: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Sessions remain and the validity date (if any) has not passed.
pub fn is_membership_usable(
    session_left: i32,
    validity_date: Option<NaiveDate>,
    today: NaiveDate,
) -> bool {
    session_left > 0 && validity_date.is_none_or(|d| d >= today)
}

/// SQL form of [`is_membership_usable`].
pub fn usable_condition(today: NaiveDate) -> Condition {
    Condition::all().add(Column::SessionLeft.gt(0)).add(
        Condition::any()
            .add(Column::ValidityDate.is_null())
            .add(Column::ValidityDate.gte(today)),
    )
}

/// Usable memberships first, then by validity date ascending with open-ended
/// memberships last in each group.
pub fn sort_for_display(memberships: &mut [Model], today: NaiveDate) {
    memberships.sort_by_key(|m| {
        (
            !m.is_usable_on(today),
            m.validity_date.is_none(),
            m.validity_date,
            m.id,
        )
    });
}

/// Gyms where the customer currently holds a usable membership.
pub async fn usable_gym_ids<C: ConnectionTrait>(
    db: &C,
    customer_id: i64,
    today: NaiveDate,
) -> Result<Vec<i64>, DbErr> {
    Entity::find()
        .select_only()
        .column(Column::GymId)
        .distinct()
        .filter(Column::CustomerId.eq(customer_id))
        .filter(usable_condition(today))
        .into_tuple()
        .all(db)
        .await
}

impl Model {
    pub fn is_usable_on(&self, today: NaiveDate) -> bool {
        is_membership_usable(self.session_left, self.validity_date, today)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn membership(id: i64, session_left: i32, validity_date: Option<NaiveDate>) -> Model {
        Model {
            id,
            customer_id: 1,
            gym_id: 1,
            type_id: 1,
            transaction_id: None,
            start_date: today() - Duration::days(30),
            validity_date,
            session_left,
            price: 100_000,
            days: 30,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_usable_requires_sessions() {
        assert!(is_membership_usable(1, None, today()));
        assert!(!is_membership_usable(0, None, today()));
        assert!(!is_membership_usable(-1, Some(today()), today()));
    }

    #[test]
    fn test_usable_respects_validity_date() {
        let t = today();
        assert!(is_membership_usable(5, Some(t), t));
        assert!(is_membership_usable(5, Some(t + Duration::days(3)), t));
        assert!(!is_membership_usable(5, Some(t - Duration::days(1)), t));
    }

    #[test]
    fn test_model_uses_same_predicate() {
        let t = today();
        let m = membership(1, 5, Some(t + Duration::days(3)));
        assert_eq!(
            m.is_usable_on(t),
            is_membership_usable(m.session_left, m.validity_date, t)
        );
        assert!(!membership(2, 0, Some(t)).is_usable_on(t));
    }

    #[test]
    fn test_sort_puts_usable_first_then_by_validity() {
        let t = today();
        let mut list = vec![
            membership(1, 0, Some(t + Duration::days(1))),
            membership(2, 4, None),
            membership(3, 4, Some(t + Duration::days(20))),
            membership(4, 2, Some(t - Duration::days(5))),
            membership(5, 9, Some(t + Duration::days(2))),
            membership(6, 0, None),
        ];
        sort_for_display(&mut list, t);
        let ids: Vec<i64> = list.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![5, 3, 2, 4, 1, 6]);

        let first_inactive = list.iter().position(|m| !m.is_usable_on(t)).unwrap();
        assert!(list[..first_inactive].iter().all(|m| m.is_usable_on(t)));
        assert!(list[first_inactive..].iter().all(|m| !m.is_usable_on(t)));
    }
}
