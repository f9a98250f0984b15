//! User endpoints

use crate::client::ApiClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Password login route
pub const LOGIN_PATH: &str = "/auth/login";

/// WeChat login route
pub const WECHAT_LOGIN_PATH: &str = "/user/wechat-login";

/// Profile route
pub const USER_INFO_PATH: &str = "/user/info";

/// User API interface
#[derive(Clone)]
pub struct UserApi {
    client: ApiClient,
}

impl UserApi {
    /// Create a new user API interface
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Log in with username and password
    ///
    /// POST /auth/login
    pub async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        self.client.post(LOGIN_PATH, request).await
    }

    /// Log in with a WeChat authorization code
    ///
    /// POST /user/wechat-login
    pub async fn wechat_login(&self, request: &WechatLoginRequest) -> ApiResult<LoginResponse> {
        self.client.post(WECHAT_LOGIN_PATH, request).await
    }

    /// Fetch the current user's profile
    ///
    /// GET /user/info
    pub async fn get_user_info(&self) -> ApiResult<UserInfo> {
        self.client.get(USER_INFO_PATH).await
    }
}

/// Password login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account name
    pub username: String,
    /// Plain password, sent over TLS
    pub password: String,
}

/// WeChat login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WechatLoginRequest {
    /// Code from the WeChat login flow
    pub code: String,
    /// Optional profile returned by WeChat
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<Value>,
}

/// Session issued by either login route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token
    pub token: String,
    /// Profile of the logged-in user
    pub user: Option<UserInfo>,
    /// Fields this client does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// User profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInfo {
    /// Server-side identifier, numeric or string
    #[serde(default)]
    pub id: Value,
    /// Display name
    #[serde(default, alias = "nickName")]
    pub nickname: Option<String>,
    /// Account name
    #[serde(default)]
    pub username: Option<String>,
    /// Avatar URL
    #[serde(default, alias = "avatarUrl")]
    pub avatar: Option<String>,
    /// Fields this client does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
