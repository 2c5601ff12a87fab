//! Route paths. Shared with the CLI client.

pub const GET_API_HEALTH: &str = "/api/health";

pub const POST_USER_REGISTER: &str = "/api/user/register";
pub const POST_USER_LOGIN: &str = "/api/user/login";
pub const POST_USER_REFRESH: &str = "/api/user/refresh";
pub const POST_USER_LOGOUT: &str = "/api/user/logout";
pub const GET_USER_ME: &str = "/api/user/me";

pub const DATA: &str = "/api/data";
pub const DATA_ID: &str = "/api/data/{id}";

/// Concrete path for one record.
pub fn data_path(id: u64) -> String {
    DATA_ID.replace("{id}", &id.to_string())
}
