use std::sync::Arc;
use std::time::Duration;

use crate::auth::AuthError;
use crate::cache::{CacheBackend, SessionCacheOperations, UserCacheOperations};
use crate::context::SessionToken;
use crate::database::UserStore;
use crate::models::User;
use crate::utils::generate_session_token;

/// 会话管理器
///
/// 会话只存在于缓存中，过期或丢失后必须重新登录；用户资料以数据库为准，
/// 缓存未命中时回源并回填。会话过期时间在签发时固定，访问不会续期。
#[derive(Clone)]
pub struct SessionManager {
    cache: Arc<dyn CacheBackend>,
    store: Arc<dyn UserStore>,
    session_ttl: Duration,
    profile_ttl: Duration,
}

impl SessionManager {
    pub fn new(
        cache: Arc<dyn CacheBackend>,
        store: Arc<dyn UserStore>,
        session_ttl: Duration,
        profile_ttl: Duration,
    ) -> Self {
        Self {
            cache,
            store,
            session_ttl,
            profile_ttl,
        }
    }

    /// 为用户签发会话，缓存写入失败则不返回令牌
    pub async fn issue_session(&self, user: &User) -> Result<SessionToken, AuthError> {
        let token = SessionToken::new(generate_session_token(&user.name));
        SessionCacheOperations::cache_session(
            self.cache.as_ref(),
            token.as_str(),
            user,
            self.session_ttl,
        )
        .await?;
        Ok(token)
    }

    /// 根据令牌取会话中的用户快照
    pub async fn resolve_session(&self, token: &SessionToken) -> Result<User, AuthError> {
        SessionCacheOperations::get_session(self.cache.as_ref(), token.as_str())
            .await?
            .ok_or(AuthError::SessionNotFound)
    }

    /// 撤销会话，会话不存在时返回 `SessionNotFound`
    pub async fn revoke_session(&self, token: &SessionToken) -> Result<(), AuthError> {
        if SessionCacheOperations::remove_session(self.cache.as_ref(), token.as_str()).await? {
            Ok(())
        } else {
            Err(AuthError::SessionNotFound)
        }
    }

    /// 用新的用户快照覆盖会话，过期时间重新计算
    pub async fn refresh_session(&self, token: &SessionToken, user: &User) -> Result<(), AuthError> {
        SessionCacheOperations::cache_session(
            self.cache.as_ref(),
            token.as_str(),
            user,
            self.session_ttl,
        )
        .await?;
        Ok(())
    }

    /// 读取用户资料：先查缓存，未命中或用户名不符时查库并回填缓存
    ///
    /// 缓存读写失败只记日志，不影响本次读取。
    pub async fn resolve_profile(&self, username: &str) -> Result<User, AuthError> {
        match UserCacheOperations::get_cached_user(self.cache.as_ref(), username).await {
            Ok(Some(user)) if user.name == username => {
                tracing::debug!("profile cache hit for {}", username);
                return Ok(user);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Failed to read cached user {}: {}", username, e),
        }

        let user = self
            .store
            .find_by_name(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if let Err(e) =
            UserCacheOperations::cache_user(self.cache.as_ref(), &user, self.profile_ttl).await
        {
            tracing::warn!("cache userinfo failed for user {}: {}", user.name, e);
        }
        Ok(user)
    }

    /// 资料变更后刷新缓存，写入失败时删除缓存条目
    pub async fn refresh_profile(&self, user: &User) -> Result<(), AuthError> {
        UserCacheOperations::refresh_user(self.cache.as_ref(), user, self.profile_ttl).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::database::MemoryUserStore;
    use crate::models::{Gender, NewUser};

    struct Fixture {
        cache: Arc<MemoryCache>,
        store: Arc<MemoryUserStore>,
        manager: SessionManager,
    }

    async fn fixture() -> Fixture {
        let cache = Arc::new(MemoryCache::new());
        let store = Arc::new(MemoryUserStore::new());
        store
            .create(&NewUser {
                name: "alice".into(),
                password: "p1".into(),
                age: 30,
                gender: Gender::Female,
                nickname: "A".into(),
            })
            .await
            .unwrap();
        let manager = SessionManager::new(
            cache.clone(),
            store.clone(),
            Duration::from_secs(60),
            Duration::from_secs(120),
        );
        Fixture {
            cache,
            store,
            manager,
        }
    }

    #[tokio::test]
    async fn issued_session_resolves_to_the_user() {
        let f = fixture().await;
        let alice = f.manager.resolve_profile("alice").await.unwrap();

        let token = f.manager.issue_session(&alice).await.unwrap();
        let snapshot = f.manager.resolve_session(&token).await.unwrap();
        assert_eq!(snapshot.name, "alice");
    }

    #[tokio::test]
    async fn issue_fails_when_cache_write_fails() {
        let f = fixture().await;
        let alice = f.manager.resolve_profile("alice").await.unwrap();

        f.cache.set_fail_writes(true);
        let err = f.manager.issue_session(&alice).await.unwrap_err();
        assert!(matches!(err, AuthError::Cache(_)));
    }

    #[tokio::test]
    async fn revoke_is_an_error_for_unknown_sessions() {
        let f = fixture().await;
        let alice = f.manager.resolve_profile("alice").await.unwrap();
        let token = f.manager.issue_session(&alice).await.unwrap();

        f.manager.revoke_session(&token).await.unwrap();
        assert!(matches!(
            f.manager.resolve_session(&token).await,
            Err(AuthError::SessionNotFound)
        ));
        assert!(matches!(
            f.manager.revoke_session(&token).await,
            Err(AuthError::SessionNotFound)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn session_expires_without_renewal_on_access() {
        let f = fixture().await;
        let alice = f.manager.resolve_profile("alice").await.unwrap();
        let token = f.manager.issue_session(&alice).await.unwrap();

        tokio::time::advance(Duration::from_secs(40)).await;
        f.manager.resolve_session(&token).await.unwrap();

        tokio::time::advance(Duration::from_secs(25)).await;
        assert!(matches!(
            f.manager.resolve_session(&token).await,
            Err(AuthError::SessionNotFound)
        ));
    }

    #[tokio::test]
    async fn profile_is_read_from_store_once_then_cached() {
        let f = fixture().await;

        f.manager.resolve_profile("alice").await.unwrap();
        f.manager.resolve_profile("alice").await.unwrap();
        assert_eq!(f.store.read_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cached_profile_expires_and_is_reloaded_from_store() {
        let f = fixture().await;

        f.manager.resolve_profile("alice").await.unwrap();
        tokio::time::advance(Duration::from_secs(119)).await;
        f.manager.resolve_profile("alice").await.unwrap();
        assert_eq!(f.store.read_count(), 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        f.manager.resolve_profile("alice").await.unwrap();
        assert_eq!(f.store.read_count(), 2);

        f.manager.resolve_profile("alice").await.unwrap();
        assert_eq!(f.store.read_count(), 2);
    }

    #[tokio::test]
    async fn profile_read_survives_cache_outage() {
        let f = fixture().await;
        f.cache.set_fail_reads(true);
        f.cache.set_fail_writes(true);

        let alice = f.manager.resolve_profile("alice").await.unwrap();
        assert_eq!(alice.nickname, "A");
        assert_eq!(f.store.read_count(), 1);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let f = fixture().await;
        assert!(matches!(
            f.manager.resolve_profile("bob").await,
            Err(AuthError::UserNotFound)
        ));
    }
}
