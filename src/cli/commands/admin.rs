use anyhow::{bail, Context};
use clap::Subcommand;
use std::sync::Arc;
use uuid::Uuid;

use crate::config;
use crate::database::{DatabaseManager, SqlAuditSink, SqlRoleStore};
use crate::gate::{AccessGate, AuditSink, GatePolicy, ProvisionTrigger, RoleStore};

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "List admin role records")]
    List,

    #[command(about = "Provision an active ADMIN role for a whitelisted user")]
    Provision {
        #[arg(help = "User email")]
        email: String,
    },

    #[command(about = "Deactivate a user's role record")]
    Demote {
        #[arg(help = "User email")]
        email: String,
    },
}

pub async fn handle(cmd: AdminCommands) -> anyhow::Result<()> {
    let pool = DatabaseManager::pool()
        .await
        .context("failed to connect to database")?;
    let roles: Arc<dyn RoleStore> = Arc::new(SqlRoleStore::new(pool.clone()));
    let audit: Arc<dyn AuditSink> = Arc::new(SqlAuditSink::new(pool.clone()));

    let admin_cfg = &config::config().admin;
    let gate = AccessGate::new(
        GatePolicy::from_config(admin_cfg),
        &admin_cfg.admin_emails,
        roles.clone(),
        audit,
    );

    let actor = format!("cli:{}", std::env::var("USER").unwrap_or_else(|_| "unknown".to_string()));

    match cmd {
        AdminCommands::List => {
            let admins = roles.list_admins().await?;
            if admins.is_empty() {
                println!("No admin role records.");
                return Ok(());
            }
            for record in admins {
                println!(
                    "{}  {}  {}  active={}",
                    record.user_id, record.email, record.role, record.is_active
                );
            }
            Ok(())
        }
        AdminCommands::Provision { email } => {
            let email = email.trim().to_ascii_lowercase();
            if !gate.is_whitelisted(&email) {
                bail!("{} is not in the admin whitelist; update ADMIN_EMAILS first", email);
            }

            let user_id = lookup_user(&pool, &email)
                .await?
                .with_context(|| format!("no user with email {}", email))?;

            gate.provision_admin(user_id, &email, ProvisionTrigger::Operator { actor })
                .await?;
            println!("Provisioned ADMIN role for {} ({})", email, user_id);
            Ok(())
        }
        AdminCommands::Demote { email } => {
            let email = email.trim().to_ascii_lowercase();
            let user_id = lookup_user(&pool, &email)
                .await?
                .with_context(|| format!("no user with email {}", email))?;

            if gate.demote_admin(user_id, &actor).await? {
                println!("Deactivated role record for {} ({})", email, user_id);
            } else {
                println!("No role record for {} ({})", email, user_id);
            }
            Ok(())
        }
    }
}

async fn lookup_user(pool: &sqlx::PgPool, email: &str) -> anyhow::Result<Option<Uuid>> {
    let id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(id)
}
