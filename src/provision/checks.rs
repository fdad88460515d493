//! Lookups over tracker listings performed before anything is written.

use crate::error::{DuplicateField, ProvisionError, Result};
use crate::tracker::types::{CampaignSummary, DomainRecord, TrafficSource};

/// Fail if any campaign already uses `domain` as its name or `keyword` as its key.
/// Campaigns are checked in listing order and the first collision is reported.
pub fn ensure_campaign_is_new(
    campaigns: &[CampaignSummary],
    domain: &str,
    keyword: &str,
) -> Result<()> {
    for campaign in campaigns {
        if campaign.name.as_deref() == Some(domain) {
            return Err(ProvisionError::DuplicateCampaign {
                field: DuplicateField::Name,
                value: domain.to_string(),
            });
        }
        if campaign.key.as_deref() == Some(keyword) {
            return Err(ProvisionError::DuplicateCampaign {
                field: DuplicateField::Keyword,
                value: keyword.to_string(),
            });
        }
    }
    Ok(())
}

pub fn select_traffic_source<'a>(
    sources: &'a [TrafficSource],
    name: &str,
) -> Result<&'a TrafficSource> {
    sources
        .iter()
        .find(|source| source.name.as_deref() == Some(name))
        .ok_or_else(|| ProvisionError::not_found(format!("traffic source named \"{name}\"")))
}

pub fn select_default_domain(domains: &[DomainRecord]) -> Result<&DomainRecord> {
    domains
        .iter()
        .find(|domain| domain.is_default)
        .ok_or_else(|| ProvisionError::not_found("default tracker domain"))
}
