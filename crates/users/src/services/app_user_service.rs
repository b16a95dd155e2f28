//! Account and social-graph operations.

use tracing::{debug, info, warn};
use twitter_config::AppConfig;
use twitter_database::{AppUser, Include, Predicate, RowId, SqlValue, UnitOfWork};
use twitter_identity::{
    new_stamp, normalize, Session, SignInManager, SignInOutcome, UserManager,
};

use super::follow_service::{FollowGraph, FollowService};
use crate::storage::{AvatarStore, DiskAvatarStore};
use crate::types::{
    EditProfileDto, FollowListVm, LoginDto, ProfileSummaryDto, RegisterDto, UserError, UserResult,
};

/// Service for account and profile operations
#[derive(Clone)]
pub struct AppUserService<F = FollowService, A = DiskAvatarStore> {
    uow: UnitOfWork,
    sign_in: SignInManager,
    follows: F,
    avatars: A,
    lockout_on_failure: bool,
}

impl AppUserService {
    /// Wire the service with its default collaborators
    pub fn new(uow: UnitOfWork, config: &AppConfig) -> Self {
        let users = UserManager::new(uow.clone(), &config.identity);
        let sign_in = SignInManager::new(users, &config.identity);

        Self::with_collaborators(
            uow.clone(),
            sign_in,
            FollowService::new(uow),
            DiskAvatarStore::new(&config.storage),
            config.identity.lockout_on_failure,
        )
    }
}

impl<F, A> AppUserService<F, A>
where
    F: FollowGraph,
    A: AvatarStore,
{
    pub fn with_collaborators(
        uow: UnitOfWork,
        sign_in: SignInManager,
        follows: F,
        avatars: A,
        lockout_on_failure: bool,
    ) -> Self {
        Self {
            uow,
            sign_in,
            follows,
            avatars,
            lockout_on_failure,
        }
    }

    pub fn follow_graph(&self) -> &F {
        &self.follows
    }

    pub fn sign_in_manager(&self) -> &SignInManager {
        &self.sign_in
    }

    fn users(&self) -> &UserManager {
        self.sign_in.user_manager()
    }

    /// Create an account and sign it in with a non-persistent session.
    ///
    /// Identity rejections come back as `UserError::Validation` with the
    /// failure list untouched; `session` is not modified in that case. When
    /// the account is stored but the session cannot be issued, the stored
    /// user comes back in `UserError::RegisteredWithoutSession` so the caller
    /// can sign in later instead of registering again.
    pub async fn register(&self, session: &mut Session, dto: RegisterDto) -> UserResult<AppUser> {
        let password = dto.password.clone();
        let user = self.users().create(AppUser::from(dto), &password).await?;

        if let Err(source) = self.sign_in.sign_in(session, &user, false).await {
            warn!(user_id = user.id, error = %source, "registered user could not be signed in");
            return Err(UserError::RegisteredWithoutSession {
                user: Box::new(user),
                source,
            });
        }
        Ok(user)
    }

    pub async fn log_in(&self, session: &mut Session, dto: LoginDto) -> UserResult<SignInOutcome> {
        let outcome = self
            .sign_in
            .password_sign_in(
                session,
                &dto.user_name,
                &dto.password,
                false,
                self.lockout_on_failure,
            )
            .await?;
        Ok(outcome)
    }

    pub async fn log_out(&self, session: &mut Session) -> UserResult<()> {
        self.sign_in.sign_out(session).await?;
        Ok(())
    }

    /// Apply the fields present in `dto` to the stored user.
    ///
    /// A missing user is a no-op. Each field is applied on its own: a user
    /// name or email that is malformed or already owned by another account is
    /// skipped and the rest of the patch still goes through. Nothing is written
    /// when no field actually changes. The avatar is stored only once every
    /// other field has been checked.
    pub async fn edit_user(&self, dto: EditProfileDto) -> UserResult<()> {
        let users = self.users();
        let Some(mut user) = users.find_by_id(dto.id).await? else {
            warn!(user_id = dto.id, "edit requested for missing user");
            return Ok(());
        };

        if let Some(password) = dto.password.as_deref() {
            let failures = users.validate_password(password);
            if !failures.is_empty() {
                return Err(UserError::Validation(failures));
            }
        }

        let mut changed = false;

        if let Some(user_name) = dto.user_name.as_deref() {
            if user_name != user.user_name {
                match users.check_user_name(user.id, user_name).await? {
                    Some(failure) => {
                        info!(user_id = user.id, user_name, code = %failure.code, "user name rejected, keeping current");
                    }
                    None => {
                        users.set_user_name(&mut user, user_name);
                        changed = true;
                    }
                }
            }
        }

        if let Some(email) = dto.email.as_deref() {
            if user.email.as_deref() != Some(email) {
                match users.check_email(user.id, email).await? {
                    Some(failure) => {
                        info!(user_id = user.id, email, code = %failure.code, "email rejected, keeping current");
                    }
                    None => {
                        users.set_email(&mut user, email);
                        changed = true;
                    }
                }
            }
        }

        if let Some(name) = dto.name {
            if name != user.name {
                user.name = name;
                changed = true;
            }
        }

        if let Some(password) = dto.password.as_deref() {
            user.password_hash = Some(users.hash_password(password)?);
            user.security_stamp = new_stamp();
            changed = true;
        }

        if let Some(image) = dto.image {
            user.image_path = Some(self.avatars.save(image).await?);
            changed = true;
        }

        if !changed {
            debug!(user_id = user.id, "edit carried no changes");
            return Ok(());
        }

        users.update(&mut user).await?;
        info!(user_id = user.id, "profile updated");
        Ok(())
    }

    /// Current profile values for an edit form.
    pub async fn get_by_id(&self, id: i64) -> UserResult<Option<EditProfileDto>> {
        let user = self.uow.app_users().get_by_id(id).await?;
        Ok(user.map(EditProfileDto::from))
    }

    /// Public profile with tweet, follower and following counts.
    pub async fn get_by_user_name(&self, user_name: &str) -> UserResult<Option<ProfileSummaryDto>> {
        let summary = self
            .uow
            .app_users()
            .get_filtered_first_or_default::<ProfileSummaryDto>(&Predicate::eq(
                "normalized_user_name",
                normalize(user_name),
            ))
            .await?;
        Ok(summary)
    }

    /// Id of the first user whose display name is exactly `name`.
    pub async fn get_user_id_from_name(&self, name: &str) -> UserResult<Option<i64>> {
        let row = self
            .uow
            .app_users()
            .get_filtered_first_or_default::<RowId>(&Predicate::eq("name", name))
            .await?;
        Ok(row.map(|row| row.id))
    }

    pub async fn users_followers(&self, id: i64, page_index: u32) -> UserResult<Vec<FollowListVm>> {
        let followers = self.follows.followers(id).await?;
        self.follow_list(followers, page_index).await
    }

    pub async fn users_followings(
        &self,
        id: i64,
        page_index: u32,
    ) -> UserResult<Vec<FollowListVm>> {
        let followings = self.follows.followings(id).await?;
        self.follow_list(followings, page_index).await
    }

    async fn follow_list(&self, ids: Vec<i64>, page_index: u32) -> UserResult<Vec<FollowListVm>> {
        let page = self
            .uow
            .app_users()
            .get_filtered_list::<FollowListVm>(
                &Predicate::id_in(ids),
                Some(Include::Followers),
                page_index,
            )
            .await?;
        Ok(page)
    }

    /// Bulk delete users by id. Parameters are bound as given; follows,
    /// tweets, likes, mentions and sessions of the deleted users cascade.
    pub async fn delete_user(&self, parameters: &[SqlValue]) -> UserResult<u64> {
        if parameters.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; parameters.len()].join(", ");
        let statement = format!("DELETE FROM users WHERE id IN ({placeholders})");
        let deleted = self.uow.execute_sql_raw(&statement, parameters).await?;

        warn!(requested = parameters.len(), deleted, "deleted users");
        Ok(deleted)
    }
}
