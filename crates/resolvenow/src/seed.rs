// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `resolvenow seed` command.

use resolvenow_config::ResolveNowConfig;
use resolvenow_core::{ResolveError, StorageAdapter};
use resolvenow_gateway::TokenSigner;
use resolvenow_ledger::seed_demo_users;
use resolvenow_storage::SqliteStorage;

/// Upserts the demo users and prints a bearer token for each when a
/// signing key is configured.
pub async fn run_seed(config: ResolveNowConfig) -> Result<(), ResolveError> {
    crate::serve::init_tracing(&config.server.log_level);

    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let users = seed_demo_users(&storage).await?;
    storage.close().await?;

    let signer = config
        .auth
        .signing_key
        .as_deref()
        .map(TokenSigner::new)
        .transpose()?;

    for user in &users {
        match &signer {
            Some(signer) => println!(
                "{:<6} {:<24} {}",
                user.role,
                user.email,
                signer.issue(&user.identity())
            ),
            None => println!("{:<6} {:<24} (set auth.signing_key to mint tokens)", user.role, user.email),
        }
    }
    Ok(())
}
