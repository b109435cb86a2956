use url::Url;

/// Pick the database URL: the explicit value first, then one composed from
/// the `DB_*` variables.
pub fn resolve_database_url(explicit: Option<String>) -> Option<String> {
    explicit
        .filter(|value| !value.trim().is_empty())
        .or_else(|| compose_database_url(|key| std::env::var(key).ok()))
}

/// Compose a MySQL URL from `DB_USER`, `DB_PASSWORD`, `DB_HOST`, `DB_PORT`
/// and `DB_NAME`. Host and database are required.
pub fn compose_database_url(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

    let host = var("DB_HOST")?;
    let database = var("DB_NAME")?;

    let mut url = Url::parse(&format!("mysql://{host}")).ok()?;
    if let Some(user) = var("DB_USER") {
        url.set_username(&user).ok()?;
        if let Some(password) = var("DB_PASSWORD") {
            url.set_password(Some(&password)).ok()?;
        }
    }
    if let Some(port) = var("DB_PORT") {
        url.set_port(Some(port.parse().ok()?)).ok()?;
    }
    url.set_path(&format!("/{database}"));
    Some(url.to_string())
}
