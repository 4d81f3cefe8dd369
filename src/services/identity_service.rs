use crate::entities::{
    customer_entity as customers, gym_entity as gyms, gym_manager_entity as managers,
    gym_secretary_entity as secretaries, platform_manager_entity as admins, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::RoleStatus;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

/// A role attached to a user. Capabilities come from which profile rows
/// exist, a user may hold several at once.
#[derive(Debug, Clone, PartialEq)]
pub enum Profile {
    Customer(customers::Model),
    GymManager(managers::Model),
    GymSecretary(secretaries::Model),
    PlatformAdmin(admins::Model),
}

#[derive(Debug, Clone)]
pub struct Identity {
    pub user: users::Model,
    pub profiles: Vec<Profile>,
}

impl Identity {
    pub fn customer(&self) -> Option<&customers::Model> {
        self.profiles.iter().find_map(|p| match p {
            Profile::Customer(c) => Some(c),
            _ => None,
        })
    }

    pub fn gym_manager(&self) -> Option<&managers::Model> {
        self.profiles.iter().find_map(|p| match p {
            Profile::GymManager(m) => Some(m),
            _ => None,
        })
    }

    pub fn gym_secretary(&self) -> Option<&secretaries::Model> {
        self.profiles.iter().find_map(|p| match p {
            Profile::GymSecretary(s) => Some(s),
            _ => None,
        })
    }

    pub fn platform_admin(&self) -> Option<&admins::Model> {
        self.profiles.iter().find_map(|p| match p {
            Profile::PlatformAdmin(a) => Some(a),
            _ => None,
        })
    }

    pub fn is_customer(&self) -> bool {
        self.customer().is_some()
    }

    pub fn is_gym_manager(&self) -> bool {
        self.gym_manager().is_some()
    }

    pub fn is_gym_secretary(&self) -> bool {
        self.gym_secretary().is_some()
    }

    pub fn is_platform_admin(&self) -> bool {
        self.platform_admin().is_some()
    }

    pub fn require_customer(&self) -> AppResult<&customers::Model> {
        self.customer().ok_or(AppError::PermissionDenied)
    }

    pub fn require_gym_manager(&self) -> AppResult<&managers::Model> {
        self.gym_manager().ok_or(AppError::PermissionDenied)
    }

    pub fn require_platform_admin(&self) -> AppResult<&admins::Model> {
        self.platform_admin().ok_or(AppError::PermissionDenied)
    }

    /// Gym panel is open to managers and secretaries.
    pub fn require_gym_staff(&self) -> AppResult<()> {
        if self.is_gym_manager() || self.is_gym_secretary() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }

    pub fn role_status(&self) -> RoleStatus {
        RoleStatus {
            is_authenticated: true,
            name: Some(self.user.full_name.clone()),
            is_customer: self.is_customer(),
            is_gym_manager: self.is_gym_manager(),
            is_gym_secretary: self.is_gym_secretary(),
            is_platform_manager: self.is_platform_admin(),
        }
    }
}

/// Which gyms a gym-panel caller may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GymScope {
    Secretary { gym_id: i64 },
    Manager { manager_id: i64, gym_ids: Vec<i64> },
    Empty,
}

impl GymScope {
    pub fn gym_ids(&self) -> Vec<i64> {
        match self {
            GymScope::Secretary { gym_id } => vec![*gym_id],
            GymScope::Manager { gym_ids, .. } => gym_ids.clone(),
            GymScope::Empty => Vec::new(),
        }
    }

    pub fn contains(&self, gym_id: i64) -> bool {
        match self {
            GymScope::Secretary { gym_id: own } => *own == gym_id,
            GymScope::Manager { gym_ids, .. } => gym_ids.contains(&gym_id),
            GymScope::Empty => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gym_ids().is_empty()
    }
}

#[derive(Clone)]
pub struct IdentityService {
    pool: DatabaseConnection,
}

impl IdentityService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Loads the user behind a session together with every profile.
    /// `user_id == 0` is the anonymous caller.
    pub async fn resolve(&self, user_id: i64) -> AppResult<Identity> {
        self.resolve_optional(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }

    pub async fn resolve_optional(&self, user_id: i64) -> AppResult<Option<Identity>> {
        if user_id <= 0 {
            return Ok(None);
        }

        let Some(user) = users::Entity::find_by_id(user_id).one(&self.pool).await? else {
            return Ok(None);
        };
        if user.is_deleted {
            return Ok(None);
        }

        let mut profiles = Vec::new();

        if let Some(c) = customers::Entity::find()
            .filter(customers::Column::UserId.eq(user_id))
            .filter(customers::Column::IsDeleted.eq(false))
            .one(&self.pool)
            .await?
        {
            profiles.push(Profile::Customer(c));
        }
        if let Some(m) = managers::Entity::find()
            .filter(managers::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?
        {
            profiles.push(Profile::GymManager(m));
        }
        if let Some(s) = secretaries::Entity::find()
            .filter(secretaries::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?
        {
            profiles.push(Profile::GymSecretary(s));
        }
        if let Some(a) = admins::Entity::find()
            .filter(admins::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?
        {
            profiles.push(Profile::PlatformAdmin(a));
        }

        Ok(Some(Identity { user, profiles }))
    }

    pub async fn role_status(&self, user_id: i64) -> AppResult<RoleStatus> {
        Ok(self
            .resolve_optional(user_id)
            .await?
            .map(|identity| identity.role_status())
            .unwrap_or_default())
    }

    /// Secretary first: a secretary sees only the gym it is assigned to, a
    /// manager sees every gym it owns, anyone else sees nothing.
    pub async fn gym_scope(&self, identity: &Identity) -> AppResult<GymScope> {
        if let Some(secretary) = identity.gym_secretary() {
            return Ok(GymScope::Secretary {
                gym_id: secretary.gym_id,
            });
        }

        if let Some(manager) = identity.gym_manager() {
            let gym_ids: Vec<i64> = gyms::Entity::find()
                .select_only()
                .column(gyms::Column::Id)
                .filter(gyms::Column::ManagerId.eq(manager.id))
                .order_by_asc(gyms::Column::Id)
                .into_tuple()
                .all(&self.pool)
                .await?;
            return Ok(GymScope::Manager {
                manager_id: manager.id,
                gym_ids,
            });
        }

        Ok(GymScope::Empty)
    }

    /// Resolves the caller and its scope, rejecting callers without any gym-panel role.
    pub async fn resolve_gym_staff(&self, user_id: i64) -> AppResult<(Identity, GymScope)> {
        let identity = self.resolve(user_id).await?;
        identity.require_gym_staff()?;
        let scope = self.gym_scope(&identity).await?;
        Ok((identity, scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Gender, GymGender};
    use crate::test_support::*;

    #[tokio::test]
    async fn test_user_without_profiles() {
        let db = setup_db().await;
        let user = seed_user(&db, "09120000001", "Nobody").await;
        let service = IdentityService::new(db.clone());

        let identity = service.resolve(user.id).await.unwrap();
        assert!(identity.profiles.is_empty());
        assert!(!identity.is_customer());
        assert!(matches!(
            identity.require_customer(),
            Err(AppError::PermissionDenied)
        ));
        assert!(identity.require_gym_staff().is_err());
        assert_eq!(service.gym_scope(&identity).await.unwrap(), GymScope::Empty);

        let status = identity.role_status();
        assert!(status.is_authenticated);
        assert!(!status.is_customer && !status.is_gym_manager);
    }

    #[tokio::test]
    async fn test_single_profile() {
        let db = setup_db().await;
        let user = seed_user(&db, "09120000002", "Cyrus").await;
        seed_customer(&db, user.id, Some(Gender::Male)).await;
        let service = IdentityService::new(db.clone());

        let identity = service.resolve(user.id).await.unwrap();
        assert_eq!(identity.profiles.len(), 1);
        assert!(identity.is_customer());
        assert!(!identity.is_gym_manager());
        assert!(identity.require_platform_admin().is_err());
    }

    #[tokio::test]
    async fn test_multiple_profiles() {
        let db = setup_db().await;
        let user = seed_user(&db, "09120000003", "Dara").await;
        seed_customer(&db, user.id, None).await;
        let manager = seed_manager(&db, user.id).await;
        seed_admin(&db, user.id).await;
        let gym = seed_gym(&db, manager.id, "A", true, GymGender::Both).await;
        let service = IdentityService::new(db.clone());

        let identity = service.resolve(user.id).await.unwrap();
        assert_eq!(identity.profiles.len(), 3);
        assert!(identity.is_customer());
        assert!(identity.is_gym_manager());
        assert!(identity.is_platform_admin());
        assert!(!identity.is_gym_secretary());

        let scope = service.gym_scope(&identity).await.unwrap();
        assert_eq!(
            scope,
            GymScope::Manager {
                manager_id: manager.id,
                gym_ids: vec![gym.id]
            }
        );
    }

    #[tokio::test]
    async fn test_secretary_scope_wins_over_manager() {
        let db = setup_db().await;
        let owner_user = seed_user(&db, "09120000004", "Owner").await;
        let owner = seed_manager(&db, owner_user.id).await;
        let gym_a = seed_gym(&db, owner.id, "A", true, GymGender::Both).await;
        let gym_b = seed_gym(&db, owner.id, "B", true, GymGender::Both).await;

        let user = seed_user(&db, "09120000005", "Both").await;
        let own = seed_manager(&db, user.id).await;
        seed_gym(&db, own.id, "C", true, GymGender::Both).await;
        seed_secretary(&db, user.id, gym_a.id).await;
        let service = IdentityService::new(db.clone());

        let identity = service.resolve(user.id).await.unwrap();
        let scope = service.gym_scope(&identity).await.unwrap();
        assert_eq!(scope, GymScope::Secretary { gym_id: gym_a.id });
        assert!(scope.contains(gym_a.id));
        assert!(!scope.contains(gym_b.id));
    }

    #[tokio::test]
    async fn test_anonymous_and_deleted_users() {
        let db = setup_db().await;
        let service = IdentityService::new(db.clone());
        assert!(matches!(
            service.resolve(0).await,
            Err(AppError::Unauthorized(_))
        ));
        assert_eq!(service.role_status(0).await.unwrap(), RoleStatus::default());

        let user = seed_user(&db, "09120000006", "Gone").await;
        let mut active: users::ActiveModel = user.into();
        active.is_deleted = sea_orm::Set(true);
        let user = sea_orm::ActiveModelTrait::update(active, &db).await.unwrap();
        assert!(service.resolve(user.id).await.is_err());
    }
}
