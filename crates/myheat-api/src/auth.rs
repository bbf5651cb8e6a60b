use secrecy::SecretString;

/// Static credentials for one configured MyHeat device.
///
/// The vendor API has no sessions: `login` and `key` travel in every
/// request body. `device_id` is the default target when a call does not
/// name a device explicitly.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub api_key: SecretString,
    pub device_id: i64,
}

impl Credentials {
    pub fn new(username: impl Into<String>, api_key: SecretString, device_id: i64) -> Self {
        Self {
            username: username.into(),
            api_key,
            device_id,
        }
    }
}
