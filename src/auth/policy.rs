use crate::auth::AuthError;
use crate::context::RequestId;
use crate::models::User;

/// 会话快照中的用户名与请求用户名不一致时的处理策略
///
/// `Lenient` 只记录日志并以会话身份为准；`Strict` 直接拒绝请求。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionIdentityPolicy {
    #[default]
    Lenient,
    Strict,
}

impl SessionIdentityPolicy {
    pub fn check(
        &self,
        request_id: &RequestId,
        session_user: &User,
        requested: &str,
    ) -> Result<(), AuthError> {
        if session_user.name == requested {
            return Ok(());
        }

        tracing::error!(
            request_id = %request_id,
            "session info not match, session_user={} requested={}",
            session_user.name,
            requested
        );

        match self {
            SessionIdentityPolicy::Lenient => Ok(()),
            SessionIdentityPolicy::Strict => Err(AuthError::IdentityMismatch {
                session_user: session_user.name.clone(),
                requested: requested.to_string(),
            }),
        }
    }
}
