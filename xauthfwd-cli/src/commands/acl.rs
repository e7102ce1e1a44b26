//! Allow-list inspection.

use anyhow::Result;
use xauthfwd_core::{AclDecision, Direction};
use xauthfwd_session::{AclEvaluator, PasswdResolver};

/// Print the decision `subject`'s `direction` list makes about `object`.
pub fn check_acl(
    direction: Direction,
    subject: &str,
    object: &str,
    default: AclDecision,
    json: bool,
) -> Result<()> {
    let acl = AclEvaluator::new(&PasswdResolver, true);
    let decision = acl.decide(direction, subject, object, default)?;

    if json {
        let out = serde_json::json!({
            "direction": direction,
            "subject": subject,
            "object": object,
            "decision": decision,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{subject} {direction} {object}: {decision}");
    }
    Ok(())
}
