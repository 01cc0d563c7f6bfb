//! Credential and profile management commands: setup, auth, logout,
//! profiles, config

use anyhow::{Result, bail};
use common::Secret;
use dialoguer::{Input, Password, Select};
use gads_profiles::{
    AuthorizeOptions, CredentialService, Credentials, DEFAULT_PROFILE, ProfileStore,
};

use crate::validation::{
    is_valid_client_id, is_valid_customer_id, is_valid_developer_token, normalize_customer_id,
};

/// Interactive credential setup for a new profile.
pub async fn setup(store: &ProfileStore, service: &CredentialService) -> Result<()> {
    println!("\nGoogle Ads CLI setup\n");
    println!("Prerequisites:");
    println!("  1. Google Cloud project with the Google Ads API enabled");
    println!("  2. OAuth 2.0 desktop credentials (client ID & secret)");
    println!("  3. Developer token from the Google Ads API Center");
    println!("  4. Google Ads customer ID (10 digits, no dashes)\n");

    let existing = store.list().await;

    let mut name_prompt = Input::<String>::new().with_prompt("Profile name");
    if existing.is_empty() {
        name_prompt = name_prompt.default(DEFAULT_PROFILE.to_string());
    }
    let name: String = name_prompt
        .validate_with(|value: &String| -> Result<(), String> {
            let value = value.trim();
            if value.is_empty() {
                return Err("profile name cannot be empty".into());
            }
            if existing.iter().any(|p| p == value) {
                return Err(format!("profile \"{value}\" already exists"));
            }
            Ok(())
        })
        .interact_text()?;
    let name = name.trim().to_string();

    let client_id: String = Input::new()
        .with_prompt("OAuth client ID")
        .validate_with(|value: &String| -> Result<(), &str> {
            if is_valid_client_id(value.trim()) {
                Ok(())
            } else {
                Err("invalid client ID — should end with .apps.googleusercontent.com")
            }
        })
        .interact_text()?;

    let client_secret = Password::new()
        .with_prompt("OAuth client secret")
        .validate_with(|value: &String| -> Result<(), &str> {
            if value.trim().is_empty() {
                Err("client secret cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact()?;

    let developer_token = Password::new()
        .with_prompt("Developer token")
        .validate_with(|value: &String| -> Result<(), &str> {
            if is_valid_developer_token(value.trim()) {
                Ok(())
            } else {
                Err("invalid developer token format")
            }
        })
        .interact()?;

    let customer_id: String = Input::new()
        .with_prompt("Customer ID (10 digits)")
        .validate_with(|value: &String| -> Result<(), &str> {
            if is_valid_customer_id(&normalize_customer_id(value)) {
                Ok(())
            } else {
                Err("invalid customer ID — must be 10 digits")
            }
        })
        .interact_text()?;

    let login_customer_id: String = Input::new()
        .with_prompt("Login customer ID (optional, for MCC accounts)")
        .allow_empty(true)
        .validate_with(|value: &String| -> Result<(), &str> {
            if value.trim().is_empty() || is_valid_customer_id(&normalize_customer_id(value)) {
                Ok(())
            } else {
                Err("invalid login customer ID — must be 10 digits")
            }
        })
        .interact_text()?;

    let credentials = Credentials {
        client_id: client_id.trim().to_string(),
        client_secret: Secret::new(client_secret.trim().to_string()),
        developer_token: Secret::new(developer_token.trim().to_string()),
        customer_id: normalize_customer_id(&customer_id),
        login_customer_id: if login_customer_id.trim().is_empty() {
            None
        } else {
            Some(normalize_customer_id(&login_customer_id))
        },
    };
    service.save_credentials(&name, credentials).await?;

    println!("\nProfile \"{name}\" configured successfully.");
    println!("Next step: run `gads auth` to authenticate\n");
    Ok(())
}

/// Run the browser consent flow for a profile.
pub async fn auth(
    store: &ProfileStore,
    service: &CredentialService,
    profile: Option<String>,
    port: u16,
    no_browser: bool,
) -> Result<()> {
    let name = select_profile(store, profile.as_deref()).await?;

    if !service.has_credentials(Some(&name)).await {
        bail!("profile \"{name}\" has no API credentials — run `gads setup` first");
    }

    service
        .authorize(
            Some(&name),
            AuthorizeOptions {
                port,
                open_browser: !no_browser,
            },
        )
        .await?;

    println!("\nSuccessfully authenticated profile \"{name}\"");
    Ok(())
}

/// Delete a profile's stored credentials and tokens.
pub async fn logout(service: &CredentialService, profile: Option<String>) -> Result<()> {
    let name = service.clear_credentials(profile.as_deref()).await?;
    println!("Credentials cleared for profile \"{name}\"");
    Ok(())
}

/// List all profiles, marking the active one.
pub async fn profiles_list(store: &ProfileStore) -> Result<()> {
    let mut profiles = store.list().await;
    if profiles.is_empty() {
        println!("No profiles found. Run `gads setup` to create one.");
        return Ok(());
    }
    profiles.sort();

    let active = store.active().await;
    println!("Available profiles:");
    for profile in profiles {
        let marker = if profile == active { "*" } else { " " };
        println!("{marker} {profile}");
    }
    Ok(())
}

/// Switch the active profile.
pub async fn profiles_use(store: &ProfileStore, name: &str) -> Result<()> {
    let current = store.active().await;
    if current == name && store.has(name).await {
        println!("Already using profile \"{name}\"");
        return Ok(());
    }
    store.set_active(name).await?;
    println!("Switched to profile \"{name}\"");
    Ok(())
}

/// Show the stored (non-secret) configuration for a profile.
pub async fn config(store: &ProfileStore, profile: Option<String>) -> Result<()> {
    let resolved = store.resolve(profile.as_deref()).await;
    let Some(profile) = store.get(Some(&resolved)).await else {
        bail!("profile \"{resolved}\" not found");
    };

    println!("\nConfiguration for profile \"{resolved}\":\n");
    println!("Client ID:         {}", profile.client_id);
    println!("Customer ID:       {}", profile.customer_id);
    if let Some(login) = &profile.login_customer_id {
        println!("Login customer ID: {login}");
    }
    println!(
        "Authenticated:     {}",
        if profile.is_authenticated() {
            "yes"
        } else {
            "no"
        }
    );
    println!("Profile file:      {}\n", store.path().display());
    Ok(())
}

/// Resolve the profile to operate on: an explicit name must exist; with no
/// name, a single existing profile is used directly and multiple profiles
/// prompt an interactive selection defaulting to the active one.
pub(crate) async fn select_profile(store: &ProfileStore, explicit: Option<&str>) -> Result<String> {
    if let Some(name) = explicit {
        if !store.has(name).await {
            bail!("profile \"{name}\" not found");
        }
        return Ok(name.to_string());
    }

    let mut profiles = store.list().await;
    profiles.sort();
    match profiles.len() {
        0 => bail!("no profiles found — run `gads setup` first"),
        1 => Ok(profiles.remove(0)),
        _ => {
            let active = store.active().await;
            let default_index = profiles.iter().position(|p| *p == active).unwrap_or(0);
            let selection = Select::new()
                .with_prompt("Select a profile")
                .items(&profiles)
                .default(default_index)
                .interact()?;
            Ok(profiles.swap_remove(selection))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gads_profiles::Profile;

    fn test_profile(suffix: &str) -> Profile {
        Profile {
            client_id: format!("client-{suffix}.apps.googleusercontent.com"),
            client_secret: Secret::new(format!("secret-{suffix}")),
            developer_token: Secret::new(format!("devtoken-{suffix}")),
            customer_id: "1234567890".into(),
            login_customer_id: None,
            access_token: None,
            refresh_token: None,
            token_expiry: None,
        }
    }

    #[tokio::test]
    async fn select_profile_requires_existing_explicit_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::load(dir.path().join("profiles.json"))
            .await
            .unwrap();

        assert!(select_profile(&store, Some("ghost")).await.is_err());

        store.set("acme", test_profile("acme")).await.unwrap();
        assert_eq!(select_profile(&store, Some("acme")).await.unwrap(), "acme");
    }

    #[tokio::test]
    async fn select_profile_uses_single_profile_without_prompting() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::load(dir.path().join("profiles.json"))
            .await
            .unwrap();

        assert!(select_profile(&store, None).await.is_err());

        store.set("only", test_profile("only")).await.unwrap();
        assert_eq!(select_profile(&store, None).await.unwrap(), "only");
    }
}
