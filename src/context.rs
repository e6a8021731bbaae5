use std::convert::Infallible;
use std::fmt;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::utils::SESSION_COOKIE;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// 单次请求的追踪 ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 日志中保留的令牌前缀长度
const TOKEN_LOG_PREFIX: usize = 8;

/// 会话令牌，对客户端不透明
///
/// `Display` 和 `Debug` 只输出前缀，令牌本身是凭据，不能完整写进日志。
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.get(..TOKEN_LOG_PREFIX) {
            Some(prefix) if prefix.len() < self.0.len() => write!(f, "{}...", prefix),
            _ => f.write_str("***"),
        }
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken({})", self)
    }
}

/// 请求级上下文：请求 ID 和 Cookie 中的会话令牌（空值视为没有）
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub session: Option<SessionToken>,
}

impl RequestContext {
    pub fn new(session: Option<SessionToken>) -> Self {
        Self {
            request_id: RequestId::new(),
            session: session.filter(|token| !token.as_str().is_empty()),
        }
    }

    /// 截断后的会话令牌，没有时为空串，仅用于日志
    pub fn session_hint(&self) -> String {
        self.session
            .as_ref()
            .map(SessionToken::to_string)
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state).await?;
        let session = jar
            .get(SESSION_COOKIE)
            .map(|cookie| SessionToken::new(cookie.value()));

        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(RequestId::from)
            .unwrap_or_default();

        Ok(Self {
            request_id,
            ..Self::new(session)
        })
    }
}
