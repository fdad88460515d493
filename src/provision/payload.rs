//! Landing and campaign payloads sent to the tracker.

use crate::tracker::types::{
    CampaignDraft, CampaignSettings, CustomRotation, NewLanding, RotationPath, WeightedLanding,
    WeightedOffer,
};
use crate::tracker::EntityId;

/// Name the downloaded page is uploaded under
pub const LANDING_FILE_NAME: &str = "index.php";
pub const LANDING_FILE_MIME: &str = "application/x-php";

pub const DEFAULT_PATH_NAME: &str = "White";
const FULL_WEIGHT: u32 = 100;

pub fn landing_name(domain: &str) -> String {
    format!("{domain} white")
}

/// Public address of the domain, used as the fallback offer
pub fn direct_url(domain: &str) -> String {
    format!("https://{domain}")
}

pub fn build_landing(domain: &str, landing_file: &str) -> NewLanding {
    NewLanding {
        name: landing_name(domain),
        path: landing_file.to_string(),
    }
}

/// CPC/USD campaign with a single "White" path: the uploaded landing first,
/// the live domain as a direct offer behind it.
pub fn build_campaign(
    domain: &str,
    traffic_source_id: &EntityId,
    tracker_domain_id: &EntityId,
    landing_id: &EntityId,
) -> CampaignDraft {
    CampaignDraft {
        name: domain.to_string(),
        traffic_source_id: traffic_source_id.clone(),
        cost_model: "CPC".to_string(),
        currency: "USD".to_string(),
        is_auto: true,
        hide_referrer_type: "NONE".to_string(),
        domain_uuid: tracker_domain_id.clone(),
        distribution_type: "NORMAL".to_string(),
        custom_rotation: CustomRotation {
            default_paths: vec![RotationPath {
                name: DEFAULT_PATH_NAME.to_string(),
                enabled: true,
                weight: FULL_WEIGHT,
                landings: vec![WeightedLanding {
                    id: landing_id.clone(),
                    enabled: true,
                    weight: FULL_WEIGHT,
                }],
                offers: vec![WeightedOffer {
                    offer_id: 0,
                    campaign_id: 0,
                    direct_url: direct_url(domain),
                    enabled: true,
                    weight: FULL_WEIGHT,
                }],
            }],
            rules: Vec::new(),
        },
        campaign_settings: CampaignSettings {
            s2s_postback: None,
            postback_percent: 100,
            traffic_loss_percent: 0,
            payout_percent: 100,
            ea: 100,
            lp_pixel: None,
        },
    }
}
