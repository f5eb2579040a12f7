pub mod env {
    pub const DATABASE_URL_ENV_VAR: &str = "DATABASE_URL";
    pub const ALLOWED_ORIGINS_ENV_VAR: &str = "WARDEN_ALLOWED_ORIGINS";
    pub const TOTP_ISSUER_ENV_VAR: &str = "WARDEN_TOTP_ISSUER";
}

pub mod prod {
    pub const APP_ADDRESS: &str = "0.0.0.0:3000";
    pub const TOTP_ISSUER: &str = "Warden";
}

pub mod test {
    pub const APP_ADDRESS: &str = "127.0.0.1:0";
    pub const TOTP_ISSUER: &str = "Warden-Test";
}
