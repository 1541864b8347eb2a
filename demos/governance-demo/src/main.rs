//! Walkthrough of role-based tool exposure governance.
//!
//! Builds a small two-bundle catalog, then grants, previews, widens, and
//! revokes permissions for one role while logging every step. Pass
//! `--ledger <path>` to persist grants across runs instead of keeping them
//! in memory.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use exposure_catalog::{Bundle, CatalogSnapshot, Tool};
use exposure_governance::{ExposureService, GovernanceError};
use exposure_primitives::RoleName;
use exposure_store::{GrantLedger, GrantStore, MemoryGrantStore};
use tracing::{info, warn};

/// Command line options for the walkthrough.
#[derive(Parser)]
#[command(
    name = "governance-demo",
    about = "Grants, previews, and revokes tool exposure for a role"
)]
struct Args {
    /// Role whose exposure is governed
    #[arg(long, default_value = "operator")]
    role: String,

    /// Append-only ledger file for persistent grants (in-memory when omitted)
    #[arg(long)]
    ledger: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let args = Args::parse();
    let role = RoleName::new(args.role)?;

    info!("=== Tool Exposure Walkthrough ===\n");

    let store: Arc<dyn GrantStore> = match args.ledger {
        Some(path) => {
            info!("persisting grants to {}", path.display());
            Arc::new(GrantLedger::open(path).await?)
        }
        None => Arc::new(MemoryGrantStore::new()),
    };

    let service = ExposureService::builder()
        .with_catalog(Arc::new(demo_catalog()?))
        .with_store(store)
        .build()?;

    grant_and_preview(&service, &role).await?;
    show_validation(&service, &role).await?;
    widen_and_revoke(&service, &role).await?;

    info!("\n=== Walkthrough complete ===");
    Ok(())
}

/// Builds the catalog the walkthrough governs: two bundles, three tools.
fn demo_catalog() -> Result<CatalogSnapshot> {
    let booking = Bundle::builder("Service Booking")
        .description("Appointment scheduling for front-desk roles")
        .add_tool(
            Tool::new("book_appointment", "Service Booking")?
                .with_display_name("Book Appointment")
                .with_category("scheduling"),
        )?
        .add_tool(
            Tool::new("cancel_appointment", "Service Booking")?
                .with_display_name("Cancel Appointment")
                .with_category("scheduling"),
        )?
        .build()?;

    let analytics = Bundle::builder("Analytics")
        .description("Read-only usage reporting")
        .add_tool(
            Tool::new("usage_report", "Analytics")?
                .with_display_name("Usage Report")
                .with_category("reporting"),
        )?
        .build()?;

    Ok(CatalogSnapshot::new(vec![booking, analytics])?)
}

/// Stage 1: grant a bundle and inspect the resulting exposure.
async fn grant_and_preview(service: &ExposureService, role: &RoleName) -> Result<()> {
    info!("--- Stage 1: Grant and Preview ---");

    grant(service, role, "expose:bundle:Service Booking").await?;

    let preview = service.exposure_preview(role).await?;
    info!(
        role = preview.role_name(),
        bundles = ?preview.exposed_bundles(),
        total = preview.total_exposed_tools(),
        "current exposure"
    );
    for tool in preview.exposed_tools() {
        info!(
            "  {} ({}) from {}",
            tool.name(),
            tool.display_name(),
            tool.bundle_name()
        );
    }

    let grants = service.list_permissions(role).await?;
    info!(?grants, "direct grants");
    Ok(())
}

/// Stage 2: show how invalid requests are answered.
async fn show_validation(service: &ExposureService, role: &RoleName) -> Result<()> {
    info!("--- Stage 2: Validation ---");

    for request in [
        "expose:tool:book_appointment",
        "expose:bundle:Imaginary",
        "expose:gibberish",
    ] {
        match service.add_permission(role, request).await {
            Ok(outcome) => info!(version = outcome.version(), "granted `{request}`"),
            Err(err) => warn!(%err, "rejected `{request}`"),
        }
    }
    Ok(())
}

/// Stage 3: widen with a direct tool grant, then revoke the bundle.
async fn widen_and_revoke(service: &ExposureService, role: &RoleName) -> Result<()> {
    info!("--- Stage 3: Widen and Revoke ---");

    grant(service, role, "expose:tool:usage_report").await?;

    let outcome = service
        .remove_permission(role, "expose:bundle:Service Booking")
        .await?;
    info!(
        version = outcome.version(),
        "revoked `expose:bundle:Service Booking`"
    );

    let preview = service.exposure_preview(role).await?;
    info!(
        bundles = ?preview.exposed_bundles(),
        total = preview.total_exposed_tools(),
        "exposure after revocation"
    );

    let still_exposed = service.is_tool_exposed(role, "book_appointment").await?;
    info!(still_exposed, "book_appointment exposed");
    Ok(())
}

/// Grants one permission, tolerating re-runs against a persisted ledger.
async fn grant(service: &ExposureService, role: &RoleName, permission: &str) -> Result<()> {
    match service.add_permission(role, permission).await {
        Ok(outcome) => {
            if let Some(warning) = outcome.audit_warning() {
                warn!(warning, "audit delivery failed");
            }
            info!(version = outcome.version(), "granted `{permission}`");
        }
        Err(GovernanceError::DuplicatePermission { .. }) => {
            info!("`{permission}` is already granted");
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
