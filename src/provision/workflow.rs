//! The provisioning run: one linear pass over the tracker API.
//!
//! Each step feeds the next and the first failure aborts the run. Nothing created
//! on the tracker is rolled back; the ids created so far are logged instead so the
//! operator can reconcile by hand.

use super::checks::{ensure_campaign_is_new, select_default_domain, select_traffic_source};
use super::keyword::derive_keyword;
use super::page::PageFetcher;
use super::payload::{build_campaign, build_landing, LANDING_FILE_MIME, LANDING_FILE_NAME};
use super::permissions::{plan_grant, GrantPlan};
use crate::config::ProvisionerConfig;
use crate::error::{ProvisionError, Result};
use crate::telemetry::{create_provision_span, generate_run_id};
use crate::tracker::types::PermissionsPayload;
use crate::tracker::{EntityId, TrackerApi};
use std::io::Write;
use std::sync::Arc;
use tracing::{info, warn, Instrument};

#[derive(Debug, Clone)]
pub struct ProvisionOptions {
    /// Traffic source every new campaign is attached to
    pub traffic_source_name: String,
    /// User granted modify access on the new campaign and landing
    pub grant_user_id: Option<u64>,
}

impl ProvisionOptions {
    pub fn from_config(config: &ProvisionerConfig) -> Self {
        Self {
            traffic_source_name: config.selection.traffic_source_name.clone(),
            grant_user_id: config.grant_user_id(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccessOutcome {
    /// No user configured
    Skipped,
    AlreadyGranted {
        user_id: u64,
    },
    Granted {
        user_id: u64,
        campaign_added: bool,
        landing_added: bool,
    },
}

/// Everything a successful run created or resolved
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub domain: String,
    pub keyword: String,
    pub traffic_source_id: EntityId,
    pub tracker_domain_id: EntityId,
    pub landing_file: String,
    pub landing_id: EntityId,
    pub campaign_id: EntityId,
    pub access: AccessOutcome,
}

/// Remote entities created so far in the current run
#[derive(Debug, Default)]
struct Progress {
    landing_file: Option<String>,
    landing_id: Option<EntityId>,
    campaign_id: Option<EntityId>,
}

impl Progress {
    fn wrote_anything(&self) -> bool {
        self.landing_file.is_some() || self.landing_id.is_some() || self.campaign_id.is_some()
    }
}

pub struct Provisioner {
    tracker: Arc<dyn TrackerApi>,
    fetcher: Arc<dyn PageFetcher>,
    options: ProvisionOptions,
}

impl Provisioner {
    pub fn new(
        tracker: Arc<dyn TrackerApi>,
        fetcher: Arc<dyn PageFetcher>,
        options: ProvisionOptions,
    ) -> Self {
        Self {
            tracker,
            fetcher,
            options,
        }
    }

    /// Provision a campaign for `domain`
    pub async fn run(&self, domain: &str) -> Result<ProvisionReport> {
        let domain = domain.trim();
        if domain.is_empty() {
            return Err(ProvisionError::Usage("domain must not be empty".into()));
        }

        let span = create_provision_span(domain, &generate_run_id());
        let mut progress = Progress::default();
        let result = self
            .execute(domain, &mut progress)
            .instrument(span.clone())
            .await;

        if let Err(err) = &result {
            if progress.wrote_anything() {
                span.in_scope(|| {
                    warn!(
                        landing_file = ?progress.landing_file,
                        landing_id = ?progress.landing_id,
                        campaign_id = ?progress.campaign_id,
                        error = %err,
                        "Run aborted after creating tracker entities, they were not rolled back"
                    )
                });
            }
        }

        result
    }

    async fn execute(&self, domain: &str, progress: &mut Progress) -> Result<ProvisionReport> {
        let keyword = derive_keyword(domain);

        info!(keyword = %keyword, "Checking existing campaigns");
        let campaigns = self.tracker.list_campaigns().await?;
        ensure_campaign_is_new(&campaigns, domain, &keyword)?;

        let sources = self.tracker.list_traffic_sources().await?;
        let traffic_source_id =
            select_traffic_source(&sources, &self.options.traffic_source_name)?
                .id
                .clone();

        let domains = self.tracker.list_domains().await?;
        let tracker_domain_id = select_default_domain(&domains)?.id.clone();
        info!(%traffic_source_id, %tracker_domain_id, "Resolved traffic source and default domain");

        let content = self.fetcher.fetch(domain).await?;
        info!(bytes = content.len(), "Downloaded landing content");

        let landing_file = self.upload_landing(&content).await?;
        progress.landing_file = Some(landing_file.clone());
        info!(landing_file = %landing_file, "Uploaded landing file");

        let landing = self
            .tracker
            .create_landing(&build_landing(domain, &landing_file))
            .await?;
        progress.landing_id = Some(landing.id.clone());
        info!(landing_id = %landing.id, "Created landing");

        let draft = build_campaign(domain, &traffic_source_id, &tracker_domain_id, &landing.id);
        let campaign = self.tracker.create_campaign(&draft).await?;
        progress.campaign_id = Some(campaign.id.clone());
        info!(campaign_id = %campaign.id, "Created campaign");

        let access = match self.options.grant_user_id {
            Some(user_id) => self.grant_access(user_id, &campaign.id, &landing.id).await?,
            None => AccessOutcome::Skipped,
        };

        Ok(ProvisionReport {
            domain: domain.to_string(),
            keyword,
            traffic_source_id,
            tracker_domain_id,
            landing_file,
            landing_id: landing.id,
            campaign_id: campaign.id,
            access,
        })
    }

    /// Stage the content in a temporary file for the multipart upload.
    /// The file is removed when this returns, whatever the outcome.
    async fn upload_landing(&self, content: &[u8]) -> Result<String> {
        let mut staged = tempfile::Builder::new()
            .prefix("POST")
            .tempfile()
            .map_err(io_error("creating temporary landing file"))?;
        staged
            .write_all(content)
            .and_then(|_| staged.flush())
            .map_err(io_error("writing temporary landing file"))?;

        let uploaded = self
            .tracker
            .upload_landing_file(staged.path(), LANDING_FILE_NAME, LANDING_FILE_MIME)
            .await?;

        Ok(uploaded.landing_file)
    }

    async fn grant_access(
        &self,
        user_id: u64,
        campaign_id: &EntityId,
        landing_id: &EntityId,
    ) -> Result<AccessOutcome> {
        let identity = self.tracker.get_identity(user_id).await?;

        match plan_grant(&identity.permissions, campaign_id, landing_id)? {
            GrantPlan::AlreadyGranted => {
                info!(user_id, "User already has modify access");
                Ok(AccessOutcome::AlreadyGranted { user_id })
            }
            GrantPlan::Update {
                permissions,
                campaign_added,
                landing_added,
            } => {
                self.tracker
                    .set_permissions(user_id, &PermissionsPayload { permissions })
                    .await?;
                info!(user_id, campaign_added, landing_added, "Granted modify access");
                Ok(AccessOutcome::Granted {
                    user_id,
                    campaign_added,
                    landing_added,
                })
            }
        }
    }
}

fn io_error(context: &'static str) -> impl FnOnce(std::io::Error) -> ProvisionError {
    move |source| ProvisionError::Io {
        context: context.to_string(),
        source,
    }
}
