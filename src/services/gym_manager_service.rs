use crate::entities::{CommissionType, GymGender, gym_entity as gyms, gym_manager_entity as managers};
use crate::error::{AppError, AppResult, is_unique_violation};
use crate::models::*;
use crate::services::IdentityService;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

#[derive(Clone)]
pub struct GymManagerService {
    pool: DatabaseConnection,
    identity_service: IdentityService,
}

impl GymManagerService {
    pub fn new(pool: DatabaseConnection, identity_service: IdentityService) -> Self {
        Self {
            pool,
            identity_service,
        }
    }

    /// Attaches a gym-manager profile to the current user.
    pub async fn upgrade(
        &self,
        user_id: i64,
        request: UpgradeToManagerRequest,
    ) -> AppResult<GymManagerResponse> {
        let identity = self.identity_service.resolve(user_id).await?;
        if identity.is_gym_manager() {
            return Err(AppError::ValidationError(
                "You are already a gym manager".to_string(),
            ));
        }

        let manager = managers::ActiveModel {
            user_id: Set(identity.user.id),
            national_code: Set(request.national_code),
            verification_code: Set(None),
            city: Set(request.city),
            invitation_code: Set(request.invitation_code),
            balance: Set(0),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::ValidationError("You are already a gym manager".to_string())
            } else {
                AppError::from(e)
            }
        })?;

        log::info!("User {} upgraded to gym manager {}", identity.user.id, manager.id);
        Ok(GymManagerResponse::from(manager))
    }

    /// New gyms stay inactive until a platform admin approves them.
    pub async fn add_gym(&self, user_id: i64, request: CreateGymRequest) -> AppResult<GymResponse> {
        let identity = self.identity_service.resolve(user_id).await?;
        let manager = identity.require_gym_manager()?;

        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::ValidationError("Gym title is required".to_string()));
        }
        for value in [request.work_hours_per_day, request.work_days_per_week]
            .into_iter()
            .flatten()
        {
            if value < 0 {
                return Err(AppError::ValidationError(
                    "Working hours and days must not be negative".to_string(),
                ));
            }
        }

        let gym = gyms::ActiveModel {
            manager_id: Set(manager.id),
            title: Set(title),
            location: Set(request.location),
            address: Set(request.address),
            main_img: Set(request.main_img),
            phone: Set(request.phone),
            headline_phone: Set(request.headline_phone),
            gender: Set(request.gender.unwrap_or(GymGender::Both)),
            commission_type: Set(request.commission_type.unwrap_or(CommissionType::Monthly)),
            facilities: Set(request.facilities),
            description: Set(request.description),
            work_hours_per_day: Set(request.work_hours_per_day),
            work_days_per_week: Set(request.work_days_per_week),
            is_active: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Gym {} created by manager {}", gym.id, manager.id);
        Ok(GymResponse::from(gym))
    }
}
