//! Member registration, login, and profile handlers.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use beanhouse_core::{Email, MemberId, PostalCode};

use crate::db::members::{MemberChanges, NewMember};
use crate::error::{AppError, Result};
use crate::middleware::RequireApiKey;
use crate::models::Member;
use crate::services::MemberService;
use crate::state::AppState;

/// Request body for `POST /members/join`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinBody {
    pub email: String,
    pub password: String,
    pub nickname: String,
    pub address: String,
    pub postal_code: String,
}

/// Request body for `POST /members/login`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// Request body for `PUT /members/me`. Absent fields stay unchanged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
    pub password: Option<String>,
    pub nickname: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
}

/// Member profile as served to clients. The password never leaves the
/// server; the API key does, since it is the member's credential.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub id: MemberId,
    pub email: String,
    pub nickname: String,
    pub address: String,
    pub postal_code: String,
    pub api_key: String,
    pub created_at: NaiveDateTime,
}

impl From<Member> for MemberProfile {
    fn from(m: Member) -> Self {
        Self {
            id: m.id,
            email: m.email.to_string(),
            nickname: m.nickname,
            address: m.address,
            postal_code: m.postal_code.to_string(),
            api_key: m.api_key.as_str().to_owned(),
            created_at: m.created_at,
        }
    }
}

fn parse_email(raw: &str) -> Result<Email> {
    Email::parse(raw).map_err(|e| AppError::Validation(format!("email: {e}")))
}

fn parse_postal(raw: &str) -> Result<PostalCode> {
    PostalCode::parse(raw).map_err(|e| AppError::Validation(format!("postalCode: {e}")))
}

fn require_filled(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// `POST /members/join`
pub async fn join(
    State(state): State<AppState>,
    Json(body): Json<JoinBody>,
) -> Result<(StatusCode, Json<MemberProfile>)> {
    let email = parse_email(&body.email)?;
    let postal_code = parse_postal(&body.postal_code)?;
    require_filled(&body.password, "password")?;
    require_filled(&body.nickname, "nickname")?;
    require_filled(&body.address, "address")?;

    let now = Local::now().naive_local();
    let member = MemberService::new(state.pool())
        .join(
            &NewMember {
                email: &email,
                password: &body.password,
                nickname: &body.nickname,
                address: &body.address,
                postal_code: &postal_code,
            },
            now,
        )
        .await?;
    tracing::info!(member_id = %member.id, "member joined");
    Ok((StatusCode::CREATED, Json(member.into())))
}

/// `POST /members/login`
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<MemberProfile>> {
    let email = parse_email(&body.email)?;
    let member = MemberService::new(state.pool())
        .login(&email, &body.password)
        .await?;
    Ok(Json(member.into()))
}

/// `GET /members/me`
pub async fn me(
    State(state): State<AppState>,
    RequireApiKey(api_key): RequireApiKey,
) -> Result<Json<MemberProfile>> {
    let member = MemberService::new(state.pool()).resolve(&api_key).await?;
    Ok(Json(member.into()))
}

/// `PUT /members/me`
pub async fn update_me(
    State(state): State<AppState>,
    RequireApiKey(api_key): RequireApiKey,
    Json(body): Json<UpdateBody>,
) -> Result<Json<MemberProfile>> {
    let postal_code = body.postal_code.as_deref().map(parse_postal).transpose()?;
    if let Some(password) = &body.password {
        require_filled(password, "password")?;
    }
    if let Some(nickname) = &body.nickname {
        require_filled(nickname, "nickname")?;
    }
    if let Some(address) = &body.address {
        require_filled(address, "address")?;
    }

    let changes = MemberChanges {
        password: body.password,
        nickname: body.nickname,
        address: body.address,
        postal_code,
    };
    let now = Local::now().naive_local();
    let member = MemberService::new(state.pool())
        .update_profile(&api_key, &changes, now)
        .await?;
    Ok(Json(member.into()))
}
