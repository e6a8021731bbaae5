use axum::{Json, extract::State};
use axum_extra::extract::CookieJar;
use cookie::Cookie;
use time::Duration;

use crate::{
    AppState,
    common::{ApiResponse, EmptyResponse},
    context::RequestContext,
    error::AppError,
    routes::{AppJson, AppQuery},
    service::{
        GetUserInfoQuery, LoginRequest, LoginResponse, LogoutRequest, RegisterRequest,
        UpdateNickNameRequest, UpdateNickNameResponse, UserProfile,
    },
    utils::{SESSION_COOKIE, success_to_api_response},
};

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    ctx: RequestContext,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<Json<ApiResponse<EmptyResponse>>, AppError> {
    state.service.register(&ctx, req).await?;
    Ok(success_to_api_response(EmptyResponse {}))
}

/// 登录成功后把会话令牌写入 Cookie
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ctx: RequestContext,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResponse>>), AppError> {
    let username = req.username.clone();
    let token = state.service.login(&ctx, req).await?;

    let cookie = Cookie::build((SESSION_COOKIE, token.into_inner()))
        .path("/")
        .http_only(true)
        .secure(false)
        .max_age(Duration::seconds(state.config.cookie_expire_secs))
        .build();

    Ok((
        jar.add(cookie),
        success_to_api_response(LoginResponse { username }),
    ))
}

#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    ctx: RequestContext,
    AppJson(req): AppJson<LogoutRequest>,
) -> Result<(CookieJar, Json<ApiResponse<EmptyResponse>>), AppError> {
    state.service.logout(&ctx, req).await?;

    let removal = Cookie::build(SESSION_COOKIE).path("/").build();
    Ok((jar.remove(removal), success_to_api_response(EmptyResponse {})))
}

#[axum::debug_handler]
pub async fn get_user_info(
    State(state): State<AppState>,
    ctx: RequestContext,
    AppQuery(query): AppQuery<GetUserInfoQuery>,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let profile = state.service.get_user_info(&ctx, &query.username).await?;
    Ok(success_to_api_response(profile))
}

#[axum::debug_handler]
pub async fn update_nick_name(
    State(state): State<AppState>,
    ctx: RequestContext,
    AppJson(req): AppJson<UpdateNickNameRequest>,
) -> Result<Json<ApiResponse<UpdateNickNameResponse>>, AppError> {
    let affected_rows = state.service.update_nickname(&ctx, req).await?;
    Ok(success_to_api_response(UpdateNickNameResponse { affected_rows }))
}
