use crate::{Res, cli, management::CredentialStore, success, youtube};

/// Makes sure usable YouTube Music credentials are stored.
pub async fn auth(force: bool) -> Res<()> {
    let (client_id, client_secret) = cli::youtube_credentials()?;
    let store = CredentialStore::from_config();
    let path = store.path().display().to_string();

    youtube::auth::connect(store, &client_id, &client_secret, force)
        .await
        .map_err(|e| e.user_message())?;

    success!("YouTube Music credentials stored at {}", path);
    Ok(())
}
