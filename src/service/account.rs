use std::sync::Arc;

use crate::auth::{AuthError, SessionIdentityPolicy, SessionManager};
use crate::context::{RequestContext, SessionToken};
use crate::database::{StoreError, UserStore};
use crate::error::AppError;
use crate::models::{Gender, NewUser, User};
use crate::service::model::{
    LoginRequest, LogoutRequest, RegisterRequest, UpdateNickNameRequest, UserProfile,
};

/// 账户服务
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn UserStore>,
    sessions: SessionManager,
    identity_policy: SessionIdentityPolicy,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn UserStore>,
        sessions: SessionManager,
        identity_policy: SessionIdentityPolicy,
    ) -> Self {
        Self {
            store,
            sessions,
            identity_policy,
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// 注册新用户
    pub async fn register(&self, ctx: &RequestContext, req: RegisterRequest) -> Result<(), AppError> {
        tracing::info!(
            request_id = %ctx.request_id,
            "Register access from user_name={}",
            req.username
        );

        let new_user = validate_register(&req).inspect_err(|e| {
            tracing::error!(request_id = %ctx.request_id, "register param invalid: {}", e);
        })?;

        match self.store.find_by_name(&new_user.name).await {
            Ok(Some(_)) => {
                tracing::error!(
                    request_id = %ctx.request_id,
                    "user is existed, user_name={}",
                    new_user.name
                );
                return Err(AppError::AlreadyRegistered);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(request_id = %ctx.request_id, "Register|{}", e);
                return Err(AppError::Persistence(e.to_string()));
            }
        }

        match self.store.create(&new_user).await {
            Ok(user) => {
                tracing::info!(request_id = %ctx.request_id, "Register success, user_name={}", user.name);
                Ok(())
            }
            Err(StoreError::Duplicate(name)) => {
                tracing::error!(request_id = %ctx.request_id, "user is existed, user_name={}", name);
                Err(AppError::AlreadyRegistered)
            }
            Err(e) => {
                tracing::error!(request_id = %ctx.request_id, "Register|{}", e);
                Err(AppError::Persistence(e.to_string()))
            }
        }
    }

    /// 用户登录，成功后返回会话令牌
    pub async fn login(
        &self,
        ctx: &RequestContext,
        req: LoginRequest,
    ) -> Result<SessionToken, AppError> {
        tracing::info!(request_id = %ctx.request_id, "Login access from user_name={}", req.username);

        let user = self.sessions.resolve_profile(&req.username).await.map_err(|e| {
            tracing::error!(request_id = %ctx.request_id, "Login|{}", e);
            AppError::from(e)
        })?;

        // 明文比对
        if req.password != user.password {
            tracing::error!(
                request_id = %ctx.request_id,
                "Login|password not correct, user_name={}",
                user.name
            );
            return Err(AppError::InvalidCredentials);
        }

        let token = self.sessions.issue_session(&user).await.map_err(|e| {
            tracing::error!(
                request_id = %ctx.request_id,
                "Login|Failed to set session info, user_name={} err={}",
                user.name,
                e
            );
            AppError::SessionIssuance(e.to_string())
        })?;

        tracing::info!(
            request_id = %ctx.request_id,
            "Login successfully, user_name={} session={}",
            user.name,
            token
        );
        Ok(token)
    }

    /// 退出登录，必须处于登录态
    pub async fn logout(&self, ctx: &RequestContext, req: LogoutRequest) -> Result<(), AppError> {
        tracing::info!(
            request_id = %ctx.request_id,
            "Logout access from user_name={} session={}",
            req.username,
            ctx.session_hint()
        );

        let token = ctx.session.as_ref().ok_or(AppError::NotAuthenticated)?;
        self.resolve_session(ctx, token).await?;

        self.sessions.revoke_session(token).await.map_err(|e| {
            tracing::error!(
                request_id = %ctx.request_id,
                "Failed to delete session {}: {}",
                token,
                e
            );
            AppError::from(e)
        })?;

        tracing::info!(request_id = %ctx.request_id, "Success to delete session {}", token);
        Ok(())
    }

    /// 查询用户资料，只返回会话中保存的快照
    pub async fn get_user_info(
        &self,
        ctx: &RequestContext,
        username: &str,
    ) -> Result<UserProfile, AppError> {
        tracing::info!(
            request_id = %ctx.request_id,
            "GetUserInfo access from user_name={} session={}",
            username,
            ctx.session_hint()
        );

        let token = require_params(ctx, username, "GetUserInfo")?;
        let session_user = self.resolve_session(ctx, token).await?;
        self.identity_policy
            .check(&ctx.request_id, &session_user, username)?;

        tracing::info!(
            request_id = %ctx.request_id,
            "Succ to GetUserInfo, user_name={} session={}",
            username,
            token
        );
        Ok(session_user.into())
    }

    /// 修改昵称，返回受影响的行数
    ///
    /// 更新按请求中的用户名进行。恰好更新一行时刷新资料缓存和当前会话，
    /// 会话刷新失败则直接撤销会话。影响 0 行同样返回成功。
    pub async fn update_nickname(
        &self,
        ctx: &RequestContext,
        req: UpdateNickNameRequest,
    ) -> Result<u64, AppError> {
        tracing::info!(
            request_id = %ctx.request_id,
            "UpdateUserNickName access from user_name={} session={}",
            req.username,
            ctx.session_hint()
        );

        let token = require_params(ctx, &req.username, "UpdateUserNickName")?;
        let session_user = self.resolve_session(ctx, token).await?;
        self.identity_policy
            .check(&ctx.request_id, &session_user, &req.username)?;

        let affected = self
            .store
            .update_nickname(&req.username, &req.new_nickname, &session_user.name)
            .await
            .map_err(|e| {
                tracing::error!(request_id = %ctx.request_id, "UpdateUserNickName|{}", e);
                AppError::Persistence(e.to_string())
            })?;

        if affected == 1 {
            self.refresh_after_update(ctx, &req.username, token).await;
        } else {
            tracing::warn!(
                request_id = %ctx.request_id,
                "UpdateUserNickName affected {} rows, user_name={}",
                affected,
                req.username
            );
        }
        Ok(affected)
    }

    async fn resolve_session(
        &self,
        ctx: &RequestContext,
        token: &SessionToken,
    ) -> Result<User, AppError> {
        self.sessions.resolve_session(token).await.map_err(|e| {
            tracing::error!(
                request_id = %ctx.request_id,
                "Failed to get with session={} err={}",
                token,
                e
            );
            AppError::from(e)
        })
    }

    async fn refresh_after_update(&self, ctx: &RequestContext, username: &str, token: &SessionToken) {
        let user = match self.store.find_by_name(username).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::error!(
                    request_id = %ctx.request_id,
                    "updated user {} vanished before cache refresh",
                    username
                );
                return;
            }
            Err(e) => {
                tracing::error!(
                    request_id = %ctx.request_id,
                    "Failed to get db user info for cache, user_name={} err={}",
                    username,
                    e
                );
                return;
            }
        };

        if let Err(e) = self.sessions.refresh_profile(&user).await {
            tracing::error!(request_id = %ctx.request_id, "refresh cached user failed: {}", e);
        }

        if let Err(e) = self.sessions.refresh_session(token, &user).await {
            tracing::error!(request_id = %ctx.request_id, "update session failed: {}", e);
            match self.sessions.revoke_session(token).await {
                Ok(()) | Err(AuthError::SessionNotFound) => {}
                Err(e) => tracing::error!(
                    request_id = %ctx.request_id,
                    "revoke stale session {} failed: {}",
                    token,
                    e
                ),
            }
        }
    }
}

fn validate_register(req: &RegisterRequest) -> Result<NewUser, AppError> {
    if req.username.is_empty() {
        return Err(AppError::InvalidParams("user_name is empty".into()));
    }
    if req.password.is_empty() {
        return Err(AppError::InvalidParams("pass_word is empty".into()));
    }
    if req.age <= 0 {
        return Err(AppError::InvalidParams(format!("age {} is not positive", req.age)));
    }
    let gender: Gender = req
        .gender
        .parse()
        .map_err(|e| AppError::InvalidParams(format!("{}", e)))?;

    Ok(NewUser {
        name: req.username.clone(),
        password: req.password.clone(),
        age: req.age,
        gender,
        nickname: req.nickname.clone(),
    })
}

fn require_params<'a>(
    ctx: &'a RequestContext,
    username: &str,
    operation: &str,
) -> Result<&'a SessionToken, AppError> {
    match &ctx.session {
        Some(token) if !username.is_empty() => Ok(token),
        _ => {
            tracing::error!(request_id = %ctx.request_id, "{}|request params invalid", operation);
            Err(AppError::InvalidParams(format!("{} request params invalid", operation)))
        }
    }
}
