use crate::entities::{
    customer_entity as customers, gym_banner_entity as banners, gym_entity as gyms,
    gym_image_entity as images, membership_entity as memberships,
    membership_type_entity as membership_types,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::IdentityService;
use chrono::{NaiveDate, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

/// Gym listings as seen from the customer panel.
#[derive(Clone)]
pub struct GymCatalogService {
    pool: DatabaseConnection,
    identity_service: IdentityService,
}

impl GymCatalogService {
    pub fn new(pool: DatabaseConnection, identity_service: IdentityService) -> Self {
        Self {
            pool,
            identity_service,
        }
    }

    async fn current_customer(&self, user_id: i64) -> AppResult<Option<customers::Model>> {
        Ok(self
            .identity_service
            .resolve_optional(user_id)
            .await?
            .and_then(|identity| identity.customer().cloned()))
    }

    async fn usable_gyms(&self, customer: Option<&customers::Model>, today: NaiveDate) -> AppResult<Vec<i64>> {
        match customer {
            Some(c) => Ok(memberships::usable_gym_ids(&self.pool, c.id, today).await?),
            None => Ok(Vec::new()),
        }
    }

    async fn detail(&self, gym: gyms::Model, status: String) -> AppResult<GymDetailResponse> {
        let membership_types = membership_types::Entity::find()
            .filter(membership_types::Column::GymId.eq(gym.id))
            .order_by_asc(membership_types::Column::Price)
            .all(&self.pool)
            .await?;
        let gym_images = images::Entity::find()
            .filter(images::Column::GymId.eq(gym.id))
            .order_by_desc(images::Column::Id)
            .all(&self.pool)
            .await?;
        let gym_banners = banners::Entity::find()
            .filter(banners::Column::GymId.eq(gym.id))
            .order_by_desc(banners::Column::Id)
            .all(&self.pool)
            .await?;

        Ok(GymDetailResponse {
            gym: GymResponse::from(gym),
            status,
            membership_types: membership_types
                .into_iter()
                .map(MembershipTypeResponse::from)
                .collect(),
            images: gym_images.into_iter().map(GymMediaResponse::from).collect(),
            banners: gym_banners.into_iter().map(GymMediaResponse::from).collect(),
        })
    }

    /// Active gyms that admit the customer's gender. Callers that are not
    /// customers, or that have not set a gender, get an empty list.
    pub async fn browse(&self, user_id: i64) -> AppResult<Vec<CustomerGymResponse>> {
        let Some(customer) = self.current_customer(user_id).await? else {
            return Ok(Vec::new());
        };
        let Some(gender) = customer.gender.clone() else {
            return Ok(Vec::new());
        };

        let today = Utc::now().date_naive();
        let usable = self.usable_gyms(Some(&customer), today).await?;

        let gyms = gyms::Entity::find()
            .filter(gyms::Column::IsActive.eq(true))
            .order_by_asc(gyms::Column::Id)
            .all(&self.pool)
            .await?;

        Ok(gyms
            .into_iter()
            .filter(|gym| gym.gender.admits(&gender))
            .map(|gym| {
                let status = status_label(usable.contains(&gym.id));
                CustomerGymResponse {
                    gym: GymResponse::from(gym),
                    status,
                }
            })
            .collect())
    }

    pub async fn gym_detail(&self, user_id: i64, gym_id: i64) -> AppResult<GymDetailResponse> {
        let gym = gyms::Entity::find_by_id(gym_id)
            .filter(gyms::Column::IsActive.eq(true))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Gym not found".to_string()))?;

        let customer = self.current_customer(user_id).await?;
        let usable = self
            .usable_gyms(customer.as_ref(), Utc::now().date_naive())
            .await?;
        let status = status_label(usable.contains(&gym.id));
        self.detail(gym, status).await
    }

    async fn signed_gym_ids(&self, user_id: i64) -> AppResult<(customers::Model, Vec<i64>)> {
        let customer = self
            .current_customer(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer profile not found".to_string()))?;

        let gym_ids: Vec<i64> = memberships::Entity::find()
            .select_only()
            .column(memberships::Column::GymId)
            .distinct()
            .filter(memberships::Column::CustomerId.eq(customer.id))
            .into_tuple()
            .all(&self.pool)
            .await?;
        Ok((customer, gym_ids))
    }

    /// Gyms where the customer holds any membership, usable or not.
    pub async fn signed_gyms(&self, user_id: i64) -> AppResult<Vec<CustomerGymResponse>> {
        let (customer, gym_ids) = self.signed_gym_ids(user_id).await?;
        if gym_ids.is_empty() {
            return Err(AppError::NotFound(
                "You have not signed up at any gym".to_string(),
            ));
        }

        let usable = self
            .usable_gyms(Some(&customer), Utc::now().date_naive())
            .await?;
        let gyms = gyms::Entity::find()
            .filter(gyms::Column::Id.is_in(gym_ids))
            .order_by_asc(gyms::Column::Id)
            .all(&self.pool)
            .await?;

        Ok(gyms
            .into_iter()
            .map(|gym| {
                let status = status_label(usable.contains(&gym.id));
                CustomerGymResponse {
                    gym: GymResponse::from(gym),
                    status,
                }
            })
            .collect())
    }

    pub async fn signed_gym_detail(
        &self,
        user_id: i64,
        gym_id: i64,
    ) -> AppResult<GymDetailResponse> {
        let (customer, gym_ids) = self.signed_gym_ids(user_id).await?;
        if !gym_ids.contains(&gym_id) {
            return Err(AppError::NotFound("Gym not found".to_string()));
        }

        let gym = gyms::Entity::find_by_id(gym_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Gym not found".to_string()))?;
        let usable = self
            .usable_gyms(Some(&customer), Utc::now().date_naive())
            .await?;
        let status = status_label(usable.contains(&gym.id));
        self.detail(gym, status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Gender, GymGender};
    use crate::models::{STATUS_ACTIVE, STATUS_INACTIVE};
    use crate::test_support::*;
    use chrono::Duration;

    struct Fixture {
        service: GymCatalogService,
        member: i64,
        customer_id: i64,
        male_gym: i64,
        female_gym: i64,
        mixed_gym: i64,
    }

    async fn fixture(db: &DatabaseConnection) -> Fixture {
        let owner = seed_user(db, "09126000001", "Owner").await;
        let manager = seed_manager(db, owner.id).await;
        let male = seed_gym(db, manager.id, "Men", true, GymGender::Male).await;
        let female = seed_gym(db, manager.id, "Women", true, GymGender::Female).await;
        let mixed = seed_gym(db, manager.id, "Mixed", true, GymGender::Both).await;
        seed_gym(db, manager.id, "Pending", false, GymGender::Both).await;

        let member = seed_user(db, "09126000002", "Member").await;
        let customer = seed_customer(db, member.id, Some(Gender::Female)).await;

        Fixture {
            service: GymCatalogService::new(db.clone(), IdentityService::new(db.clone())),
            member: member.id,
            customer_id: customer.id,
            male_gym: male.id,
            female_gym: female.id,
            mixed_gym: mixed.id,
        }
    }

    #[tokio::test]
    async fn test_browse_filters_by_gender_and_activation() {
        let db = setup_db().await;
        let f = fixture(&db).await;
        let plan = seed_membership_type(&db, f.mixed_gym, 30, 200).await;
        seed_membership(&db, f.customer_id, &plan, 3, Some(today() + Duration::days(10))).await;

        let listed = f.service.browse(f.member).await.unwrap();
        let ids: Vec<i64> = listed.iter().map(|g| g.gym.id).collect();
        assert_eq!(ids, vec![f.female_gym, f.mixed_gym]);
        assert!(!ids.contains(&f.male_gym));
        assert_eq!(listed[0].status, STATUS_INACTIVE);
        assert_eq!(listed[1].status, STATUS_ACTIVE);
    }

    #[tokio::test]
    async fn test_browse_without_customer_or_gender_is_empty() {
        let db = setup_db().await;
        let f = fixture(&db).await;
        assert!(f.service.browse(0).await.unwrap().is_empty());

        let other = seed_user(&db, "09126000003", "No Gender").await;
        seed_customer(&db, other.id, None).await;
        assert!(f.service.browse(other.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_gym_detail_only_for_active_gyms() {
        let db = setup_db().await;
        let f = fixture(&db).await;
        let plan = seed_membership_type(&db, f.female_gym, 30, 200).await;

        let detail = f.service.gym_detail(f.member, f.female_gym).await.unwrap();
        assert_eq!(detail.membership_types.len(), 1);
        assert_eq!(detail.membership_types[0].id, plan.id);
        assert_eq!(detail.status, STATUS_INACTIVE);

        assert!(matches!(
            f.service.gym_detail(f.member, 9999).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_signed_gyms() {
        let db = setup_db().await;
        let f = fixture(&db).await;
        assert!(matches!(
            f.service.signed_gyms(f.member).await,
            Err(AppError::NotFound(_))
        ));

        let plan = seed_membership_type(&db, f.female_gym, 30, 200).await;
        // an exhausted membership still counts as signed
        seed_membership(&db, f.customer_id, &plan, 0, None).await;

        let signed = f.service.signed_gyms(f.member).await.unwrap();
        assert_eq!(signed.len(), 1);
        assert_eq!(signed[0].status, STATUS_INACTIVE);

        assert!(f.service.signed_gym_detail(f.member, f.female_gym).await.is_ok());
        assert!(matches!(
            f.service.signed_gym_detail(f.member, f.mixed_gym).await,
            Err(AppError::NotFound(_))
        ));
    }
}
