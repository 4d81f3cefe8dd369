use crate::entities::{
    customer_entity as customers, gym_banner_entity as banners, gym_entity as gyms,
    gym_image_entity as images, in_out_entity as in_outs, membership_entity as memberships,
    membership_type_entity as membership_types, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{GymScope, Identity, IdentityService};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::{BTreeMap, HashMap};

/// Gym-panel reads and writes. Reads see every gym in the caller's scope,
/// writes need the manager that owns the gym.
#[derive(Clone)]
pub struct GymPanelService {
    pool: DatabaseConnection,
    identity_service: IdentityService,
}

impl GymPanelService {
    pub fn new(pool: DatabaseConnection, identity_service: IdentityService) -> Self {
        Self {
            pool,
            identity_service,
        }
    }

    async fn owned_gym(&self, identity: &Identity, gym_id: i64) -> AppResult<gyms::Model> {
        let manager = identity.require_gym_manager()?;
        let gym = gyms::Entity::find_by_id(gym_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Gym not found".to_string()))?;
        if gym.manager_id != manager.id {
            return Err(AppError::PermissionDenied);
        }
        Ok(gym)
    }

    fn not_found(what: &str) -> AppError {
        AppError::NotFound(format!("{what} not found"))
    }

    pub async fn gyms(&self, user_id: i64) -> AppResult<Vec<GymResponse>> {
        let (_, scope) = self.identity_service.resolve_gym_staff(user_id).await?;
        let rows = gyms::Entity::find()
            .filter(gyms::Column::Id.is_in(scope.gym_ids()))
            .order_by_asc(gyms::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(GymResponse::from).collect())
    }

    pub async fn gym(&self, user_id: i64, gym_id: i64) -> AppResult<GymResponse> {
        let (_, scope) = self.identity_service.resolve_gym_staff(user_id).await?;
        if !scope.contains(gym_id) {
            return Err(Self::not_found("Gym"));
        }
        gyms::Entity::find_by_id(gym_id)
            .one(&self.pool)
            .await?
            .map(GymResponse::from)
            .ok_or_else(|| Self::not_found("Gym"))
    }

    pub async fn membership_types(&self, user_id: i64) -> AppResult<Vec<MembershipTypeResponse>> {
        let (_, scope) = self.identity_service.resolve_gym_staff(user_id).await?;
        let rows = membership_types::Entity::find()
            .filter(membership_types::Column::GymId.is_in(scope.gym_ids()))
            .order_by_asc(membership_types::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(MembershipTypeResponse::from).collect())
    }

    pub async fn membership_type(
        &self,
        user_id: i64,
        type_id: i64,
    ) -> AppResult<MembershipTypeResponse> {
        let (_, scope) = self.identity_service.resolve_gym_staff(user_id).await?;
        membership_types::Entity::find_by_id(type_id)
            .one(&self.pool)
            .await?
            .filter(|t| scope.contains(t.gym_id))
            .map(MembershipTypeResponse::from)
            .ok_or_else(|| Self::not_found("Membership type"))
    }

    pub async fn create_membership_type(
        &self,
        user_id: i64,
        request: CreateMembershipTypeRequest,
    ) -> AppResult<MembershipTypeResponse> {
        let identity = self.identity_service.resolve(user_id).await?;
        let gym = self.owned_gym(&identity, request.gym_id).await?;

        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::ValidationError("Title is required".to_string()));
        }
        if request.days <= 0 {
            return Err(AppError::ValidationError(
                "Days must be greater than zero".to_string(),
            ));
        }
        if request.price < 0 {
            return Err(AppError::ValidationError(
                "Price must not be negative".to_string(),
            ));
        }

        let row = membership_types::ActiveModel {
            gym_id: Set(gym.id),
            title: Set(title),
            days: Set(request.days),
            price: Set(request.price),
            description: Set(request.description),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Membership type {} added to gym {}", row.id, gym.id);
        Ok(MembershipTypeResponse::from(row))
    }

    fn check_media(request: &CreateGymMediaRequest) -> AppResult<String> {
        let url = request.image_url.trim();
        if url.is_empty() {
            return Err(AppError::ValidationError(
                "image_url is required".to_string(),
            ));
        }
        Ok(url.to_string())
    }

    pub async fn banners(&self, user_id: i64) -> AppResult<Vec<GymMediaResponse>> {
        let (_, scope) = self.identity_service.resolve_gym_staff(user_id).await?;
        let rows = banners::Entity::find()
            .filter(banners::Column::GymId.is_in(scope.gym_ids()))
            .order_by_desc(banners::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(GymMediaResponse::from).collect())
    }

    pub async fn banner(&self, user_id: i64, banner_id: i64) -> AppResult<GymMediaResponse> {
        let (_, scope) = self.identity_service.resolve_gym_staff(user_id).await?;
        banners::Entity::find_by_id(banner_id)
            .one(&self.pool)
            .await?
            .filter(|b| scope.contains(b.gym_id))
            .map(GymMediaResponse::from)
            .ok_or_else(|| Self::not_found("Banner"))
    }

    pub async fn create_banner(
        &self,
        user_id: i64,
        request: CreateGymMediaRequest,
    ) -> AppResult<GymMediaResponse> {
        let identity = self.identity_service.resolve(user_id).await?;
        let gym = self.owned_gym(&identity, request.gym_id).await?;
        let image_url = Self::check_media(&request)?;

        let row = banners::ActiveModel {
            gym_id: Set(gym.id),
            image_url: Set(image_url),
            title: Set(request.title),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(GymMediaResponse::from(row))
    }

    pub async fn images(&self, user_id: i64) -> AppResult<Vec<GymMediaResponse>> {
        let (_, scope) = self.identity_service.resolve_gym_staff(user_id).await?;
        let rows = images::Entity::find()
            .filter(images::Column::GymId.is_in(scope.gym_ids()))
            .order_by_desc(images::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(GymMediaResponse::from).collect())
    }

    pub async fn image(&self, user_id: i64, image_id: i64) -> AppResult<GymMediaResponse> {
        let (_, scope) = self.identity_service.resolve_gym_staff(user_id).await?;
        images::Entity::find_by_id(image_id)
            .one(&self.pool)
            .await?
            .filter(|i| scope.contains(i.gym_id))
            .map(GymMediaResponse::from)
            .ok_or_else(|| Self::not_found("Image"))
    }

    pub async fn create_image(
        &self,
        user_id: i64,
        request: CreateGymMediaRequest,
    ) -> AppResult<GymMediaResponse> {
        let identity = self.identity_service.resolve(user_id).await?;
        let gym = self.owned_gym(&identity, request.gym_id).await?;
        let image_url = Self::check_media(&request)?;

        let row = images::ActiveModel {
            gym_id: Set(gym.id),
            image_url: Set(image_url),
            title: Set(request.title),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(GymMediaResponse::from(row))
    }

    async fn scoped_memberships(&self, scope: &GymScope) -> AppResult<Vec<memberships::Model>> {
        Ok(memberships::Entity::find()
            .filter(memberships::Column::GymId.is_in(scope.gym_ids()))
            .all(&self.pool)
            .await?)
    }

    async fn profiles(
        &self,
        customer_ids: Vec<i64>,
    ) -> AppResult<Vec<(customers::Model, users::Model)>> {
        let rows = customers::Entity::find()
            .filter(customers::Column::Id.is_in(customer_ids))
            .filter(customers::Column::IsDeleted.eq(false))
            .order_by_asc(customers::Column::Id)
            .all(&self.pool)
            .await?;
        let user_ids: Vec<i64> = rows.iter().map(|c| c.user_id).collect();
        let mut owners: HashMap<i64, users::Model> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|c| owners.remove(&c.user_id).map(|u| (c, u)))
            .collect())
    }

    /// Customers holding any membership at a gym in scope. `is_active`
    /// ignores memberships at other gyms.
    pub async fn customers(&self, user_id: i64) -> AppResult<Vec<GymPanelCustomerResponse>> {
        let (_, scope) = self.identity_service.resolve_gym_staff(user_id).await?;
        let today = Utc::now().date_naive();

        let mut usable_by_customer: BTreeMap<i64, bool> = BTreeMap::new();
        for m in self.scoped_memberships(&scope).await? {
            *usable_by_customer.entry(m.customer_id).or_default() |= m.is_usable_on(today);
        }

        let profiles = self
            .profiles(usable_by_customer.keys().copied().collect())
            .await?;
        Ok(profiles
            .into_iter()
            .map(|(customer, user)| {
                let is_active = usable_by_customer
                    .get(&customer.id)
                    .copied()
                    .unwrap_or(false);
                GymPanelCustomerResponse {
                    customer: CustomerProfileResponse::new(customer, &user),
                    is_active,
                }
            })
            .collect())
    }

    pub async fn customer_detail(
        &self,
        user_id: i64,
        customer_id: i64,
    ) -> AppResult<GymPanelCustomerDetailResponse> {
        let (_, scope) = self.identity_service.resolve_gym_staff(user_id).await?;
        let today = Utc::now().date_naive();

        let mut scoped: Vec<memberships::Model> = memberships::Entity::find()
            .filter(memberships::Column::CustomerId.eq(customer_id))
            .filter(memberships::Column::GymId.is_in(scope.gym_ids()))
            .all(&self.pool)
            .await?;
        if scoped.is_empty() {
            return Err(Self::not_found("Customer"));
        }

        let (customer, user) = self
            .profiles(vec![customer_id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Self::not_found("Customer"))?;

        let mut visits = in_outs::Entity::find()
            .filter(in_outs::Column::CustomerId.eq(customer_id))
            .filter(in_outs::Column::GymId.is_in(scope.gym_ids()))
            .all(&self.pool)
            .await?;
        in_outs::sort_newest_entry_first(&mut visits);

        Ok(detail_response(customer, &user, &mut scoped, visits, today))
    }
}

fn detail_response(
    customer: customers::Model,
    user: &users::Model,
    scoped: &mut [memberships::Model],
    visits: Vec<in_outs::Model>,
    today: NaiveDate,
) -> GymPanelCustomerDetailResponse {
    let is_active = scoped.iter().any(|m| m.is_usable_on(today));
    memberships::sort_for_display(scoped, today);
    GymPanelCustomerDetailResponse {
        customer: CustomerProfileResponse::new(customer, user),
        is_active,
        memberships: scoped
            .iter()
            .cloned()
            .map(|m| MembershipResponse::new(m, today))
            .collect(),
        in_outs: visits.into_iter().map(InOutResponse::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Gender, GymGender};
    use crate::test_support::*;
    use chrono::Duration;

    struct Fixture {
        service: GymPanelService,
        owner: i64,
        secretary: i64,
        gym_a: i64,
        gym_b: i64,
        at_a: i64,
        at_b: i64,
        at_both: i64,
    }

    /// Manager owns gyms A and B, the secretary works at A only.
    async fn fixture(db: &DatabaseConnection) -> Fixture {
        let owner = seed_user(db, "09129000001", "Manager").await;
        let manager = seed_manager(db, owner.id).await;
        let gym_a = seed_gym(db, manager.id, "A", true, GymGender::Both).await;
        let gym_b = seed_gym(db, manager.id, "B", true, GymGender::Both).await;
        let plan_a = seed_membership_type(db, gym_a.id, 30, 100).await;
        let plan_b = seed_membership_type(db, gym_b.id, 30, 100).await;

        let secretary = seed_user(db, "09129000002", "Secretary").await;
        seed_secretary(db, secretary.id, gym_a.id).await;

        let u1 = seed_user(db, "09129000003", "At A").await;
        let at_a = seed_customer(db, u1.id, Some(Gender::Male)).await;
        seed_membership(db, at_a.id, &plan_a, 3, None).await;

        let u2 = seed_user(db, "09129000004", "At B").await;
        let at_b = seed_customer(db, u2.id, Some(Gender::Male)).await;
        seed_membership(db, at_b.id, &plan_b, 3, None).await;

        // expired at A, usable at B
        let u3 = seed_user(db, "09129000005", "At Both").await;
        let at_both = seed_customer(db, u3.id, Some(Gender::Female)).await;
        seed_membership(db, at_both.id, &plan_a, 0, None).await;
        seed_membership(db, at_both.id, &plan_b, 8, Some(today() + Duration::days(9))).await;

        Fixture {
            service: GymPanelService::new(db.clone(), IdentityService::new(db.clone())),
            owner: owner.id,
            secretary: secretary.id,
            gym_a: gym_a.id,
            gym_b: gym_b.id,
            at_a: at_a.id,
            at_b: at_b.id,
            at_both: at_both.id,
        }
    }

    fn ids(list: &[GymPanelCustomerResponse]) -> Vec<i64> {
        list.iter().map(|c| c.customer.id).collect()
    }

    #[tokio::test]
    async fn test_customers_follow_scope() {
        let db = setup_db().await;
        let f = fixture(&db).await;

        let as_secretary = f.service.customers(f.secretary).await.unwrap();
        assert_eq!(ids(&as_secretary), vec![f.at_a, f.at_both]);
        let both = as_secretary.iter().find(|c| c.customer.id == f.at_both).unwrap();
        // the usable membership at B is outside the secretary's scope
        assert!(!both.is_active);

        let as_manager = f.service.customers(f.owner).await.unwrap();
        assert_eq!(ids(&as_manager), vec![f.at_a, f.at_b, f.at_both]);
        let both = as_manager.iter().find(|c| c.customer.id == f.at_both).unwrap();
        assert!(both.is_active);
    }

    #[tokio::test]
    async fn test_customer_detail_is_scoped() {
        let db = setup_db().await;
        let f = fixture(&db).await;

        assert!(matches!(
            f.service.customer_detail(f.secretary, f.at_b).await,
            Err(AppError::NotFound(_))
        ));

        let detail = f.service.customer_detail(f.secretary, f.at_both).await.unwrap();
        assert_eq!(detail.memberships.len(), 1);
        assert!(detail.memberships.iter().all(|m| m.gym_id == f.gym_a));

        let detail = f.service.customer_detail(f.owner, f.at_both).await.unwrap();
        assert_eq!(detail.memberships.len(), 2);
        assert!(detail.memberships[0].gym_id == f.gym_b);
    }

    #[tokio::test]
    async fn test_reads_are_scoped_and_empty_is_ok() {
        let db = setup_db().await;
        let f = fixture(&db).await;

        let gyms = f.service.gyms(f.secretary).await.unwrap();
        assert_eq!(gyms.len(), 1);
        assert_eq!(gyms[0].id, f.gym_a);
        assert!(matches!(
            f.service.gym(f.secretary, f.gym_b).await,
            Err(AppError::NotFound(_))
        ));

        assert_eq!(f.service.membership_types(f.owner).await.unwrap().len(), 2);
        assert!(f.service.banners(f.owner).await.unwrap().is_empty());
        assert!(f.service.images(f.secretary).await.unwrap().is_empty());

        let outsider = seed_user(&db, "09129000006", "Outsider").await;
        assert!(matches!(
            f.service.gyms(outsider.id).await,
            Err(AppError::PermissionDenied)
        ));
    }

    #[tokio::test]
    async fn test_writes_require_owning_manager() {
        let db = setup_db().await;
        let f = fixture(&db).await;
        let banner = || CreateGymMediaRequest {
            gym_id: f.gym_a,
            image_url: "https://cdn.example.com/a.png".to_string(),
            title: Some("Summer".to_string()),
        };

        assert!(matches!(
            f.service.create_banner(f.secretary, banner()).await,
            Err(AppError::PermissionDenied)
        ));

        let rival = seed_user(&db, "09129000007", "Rival").await;
        seed_manager(&db, rival.id).await;
        assert!(matches!(
            f.service.create_image(rival.id, banner()).await,
            Err(AppError::PermissionDenied)
        ));

        let created = f.service.create_banner(f.owner, banner()).await.unwrap();
        assert_eq!(f.service.banner(f.secretary, created.id).await.unwrap().id, created.id);

        let plan = f
            .service
            .create_membership_type(
                f.owner,
                CreateMembershipTypeRequest {
                    gym_id: f.gym_b,
                    title: "Quarter".to_string(),
                    days: 90,
                    price: 900,
                    description: None,
                },
            )
            .await
            .unwrap();
        assert!(matches!(
            f.service.membership_type(f.secretary, plan.id).await,
            Err(AppError::NotFound(_))
        ));

        let invalid = f
            .service
            .create_membership_type(
                f.owner,
                CreateMembershipTypeRequest {
                    gym_id: f.gym_b,
                    title: "Broken".to_string(),
                    days: 0,
                    price: 900,
                    description: None,
                },
            )
            .await;
        assert!(matches!(invalid, Err(AppError::ValidationError(_))));
    }
}
