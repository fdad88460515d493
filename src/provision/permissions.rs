//! Granting a user modify access on the freshly created campaign and landing.
//!
//! The tracker only accepts a full replacement of a user's permissions, so the
//! whole set is rewritten in the update shape with the new ids appended.

use crate::error::{ProvisionError, Result};
use crate::tracker::types::{PermissionBlock, PermissionUpdate};
use crate::tracker::EntityId;

pub const CAMPAIGN_SUBJECT: &str = "CAMPAIGN";
pub const LANDING_SUBJECT: &str = "LANDING";

#[derive(Debug, Clone, PartialEq)]
pub enum GrantPlan {
    /// Both ids are already in the modify sets, nothing to write
    AlreadyGranted,
    Update {
        permissions: Vec<PermissionUpdate>,
        campaign_added: bool,
        landing_added: bool,
    },
}

pub fn plan_grant(
    blocks: &[PermissionBlock],
    campaign_id: &EntityId,
    landing_id: &EntityId,
) -> Result<GrantPlan> {
    let campaign_block = subject_position(blocks, CAMPAIGN_SUBJECT)?;
    let landing_block = subject_position(blocks, LANDING_SUBJECT)?;

    let campaign_missing = !can_modify(&blocks[campaign_block], campaign_id);
    let landing_missing = !can_modify(&blocks[landing_block], landing_id);

    if !campaign_missing && !landing_missing {
        return Ok(GrantPlan::AlreadyGranted);
    }

    let mut permissions: Vec<PermissionUpdate> = blocks.iter().map(PermissionUpdate::from).collect();
    if campaign_missing {
        permissions[campaign_block].modify_uuids.push(campaign_id.clone());
    }
    if landing_missing {
        permissions[landing_block].modify_uuids.push(landing_id.clone());
    }

    Ok(GrantPlan::Update {
        permissions,
        campaign_added: campaign_missing,
        landing_added: landing_missing,
    })
}

fn subject_position(blocks: &[PermissionBlock], subject: &str) -> Result<usize> {
    blocks
        .iter()
        .position(|block| block.subject == subject)
        .ok_or_else(|| ProvisionError::not_found(format!("permission subject {subject}")))
}

fn can_modify(block: &PermissionBlock, id: &EntityId) -> bool {
    block.modify.iter().any(|entry| entry.id.matches(id))
}
