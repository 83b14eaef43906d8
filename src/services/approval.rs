//! Multi-level approval state machine.
//!
//! One transition function shared by cashbooks (single level), indents and
//! purchase orders (two levels plus completion). The machine is pure: it
//! sees a snapshot of the document's approval columns and the acting user's
//! capability facts, and returns the new status plus which stamp fields to
//! set. Persistence stays with the document services.

use rust_decimal::Decimal;
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::auth::{consts, roles, Actor};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum ApprovalStatus {
    #[strum(serialize = "DRAFT")]
    Draft,
    #[strum(serialize = "APPROVED_LEVEL_1")]
    ApprovedLevel1,
    #[strum(serialize = "APPROVED_LEVEL_2")]
    ApprovedLevel2,
    #[strum(serialize = "COMPLETED")]
    Completed,
    #[strum(serialize = "SUSPENDED")]
    Suspended,
}

impl ApprovalStatus {
    /// Recomputes the non-suspended status from the stored approval flags.
    /// Used when lifting a suspension.
    pub fn from_flags(is_completed: bool, is_approved2: bool, is_approved1: bool) -> Self {
        if is_completed {
            ApprovalStatus::Completed
        } else if is_approved2 {
            ApprovalStatus::ApprovedLevel2
        } else if is_approved1 {
            ApprovalStatus::ApprovedLevel1
        } else {
            ApprovalStatus::Draft
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum ApprovalAction {
    #[strum(serialize = "approve1")]
    Approve1,
    #[strum(serialize = "approve2")]
    Approve2,
    #[strum(serialize = "complete")]
    Complete,
    #[strum(serialize = "suspend")]
    Suspend,
    #[strum(serialize = "unsuspend")]
    Unsuspend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Cashbook,
    Indent,
    PurchaseOrder,
}

impl DocumentKind {
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Cashbook => "cashbook",
            DocumentKind::Indent => "indent",
            DocumentKind::PurchaseOrder => "purchase order",
        }
    }

    /// Capability required for an action on this document type; `None` when
    /// the action does not exist for the type (cashbooks stop at level 1).
    pub fn capability(self, action: ApprovalAction) -> Option<&'static str> {
        match (self, action) {
            (DocumentKind::Cashbook, ApprovalAction::Approve1) => Some(consts::CASHBOOKS_APPROVE1),
            (DocumentKind::Cashbook, ApprovalAction::Suspend)
            | (DocumentKind::Cashbook, ApprovalAction::Unsuspend) => {
                Some(consts::CASHBOOKS_SUSPEND)
            }
            (DocumentKind::Cashbook, _) => None,
            (DocumentKind::Indent, ApprovalAction::Approve1) => Some(consts::INDENTS_APPROVE1),
            (DocumentKind::Indent, ApprovalAction::Approve2) => Some(consts::INDENTS_APPROVE2),
            (DocumentKind::Indent, ApprovalAction::Complete) => Some(consts::INDENTS_COMPLETE),
            (DocumentKind::Indent, ApprovalAction::Suspend)
            | (DocumentKind::Indent, ApprovalAction::Unsuspend) => Some(consts::INDENTS_SUSPEND),
            (DocumentKind::PurchaseOrder, ApprovalAction::Approve1) => {
                Some(consts::PURCHASE_ORDERS_APPROVE1)
            }
            (DocumentKind::PurchaseOrder, ApprovalAction::Approve2) => {
                Some(consts::PURCHASE_ORDERS_APPROVE2)
            }
            (DocumentKind::PurchaseOrder, ApprovalAction::Complete) => {
                Some(consts::PURCHASE_ORDERS_COMPLETE)
            }
            (DocumentKind::PurchaseOrder, ApprovalAction::Suspend)
            | (DocumentKind::PurchaseOrder, ApprovalAction::Unsuspend) => {
                Some(consts::PURCHASE_ORDERS_SUSPEND)
            }
        }
    }
}

/// Snapshot of a document's approval columns, as the state machine sees it.
#[derive(Debug, Clone)]
pub struct ApprovalSnapshot {
    pub status: ApprovalStatus,
    pub created_by: Uuid,
    pub approved1_by: Option<Uuid>,
    pub is_approved1: bool,
    pub is_approved2: bool,
    pub is_completed: bool,
}

/// Which stamp columns the document service must set with the new status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampKind {
    Approved1,
    Approved2,
    Completed,
    Suspended,
    Unsuspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub new_status: ApprovalStatus,
    pub stamp: StampKind,
}

/// Applies `action` to the document snapshot, enforcing every guard.
/// All guards must hold or the action is rejected with the specific rule
/// that failed; nothing is mutated here.
pub fn transition(
    kind: DocumentKind,
    doc: &ApprovalSnapshot,
    action: ApprovalAction,
    actor: &Actor,
) -> Result<Transition, ServiceError> {
    let capability = kind.capability(action).ok_or_else(|| {
        ServiceError::InvalidOperation(format!("{} has no {} action", kind.label(), action))
    })?;
    if !actor.has_capability(capability) {
        return Err(ServiceError::Forbidden(format!(
            "actor lacks the {} capability",
            capability
        )));
    }

    match action {
        ApprovalAction::Approve1 => {
            require_status(kind, doc, action, ApprovalStatus::Draft)?;
            if actor.id == doc.created_by {
                return Err(ServiceError::Forbidden(format!(
                    "creator cannot approve their own {}",
                    kind.label()
                )));
            }
            Ok(Transition {
                new_status: ApprovalStatus::ApprovedLevel1,
                stamp: StampKind::Approved1,
            })
        }
        ApprovalAction::Approve2 => {
            require_status(kind, doc, action, ApprovalStatus::ApprovedLevel1)?;
            if actor.id == doc.created_by {
                return Err(ServiceError::Forbidden(format!(
                    "creator cannot approve their own {}",
                    kind.label()
                )));
            }
            if doc.approved1_by == Some(actor.id) {
                return Err(ServiceError::Forbidden(
                    "level-1 approver cannot also approve level 2".to_string(),
                ));
            }
            Ok(Transition {
                new_status: ApprovalStatus::ApprovedLevel2,
                stamp: StampKind::Approved2,
            })
        }
        ApprovalAction::Complete => {
            require_status(kind, doc, action, ApprovalStatus::ApprovedLevel2)?;
            Ok(Transition {
                new_status: ApprovalStatus::Completed,
                stamp: StampKind::Completed,
            })
        }
        ApprovalAction::Suspend => {
            if doc.status == ApprovalStatus::Completed || doc.status == ApprovalStatus::Suspended {
                return Err(ServiceError::InvalidStatus(format!(
                    "cannot suspend {} in status {}",
                    kind.label(),
                    doc.status
                )));
            }
            Ok(Transition {
                new_status: ApprovalStatus::Suspended,
                stamp: StampKind::Suspended,
            })
        }
        ApprovalAction::Unsuspend => {
            require_status(kind, doc, action, ApprovalStatus::Suspended)?;
            Ok(Transition {
                new_status: ApprovalStatus::from_flags(
                    doc.is_completed,
                    doc.is_approved2,
                    doc.is_approved1,
                ),
                stamp: StampKind::Unsuspended,
            })
        }
    }
}

fn require_status(
    kind: DocumentKind,
    doc: &ApprovalSnapshot,
    action: ApprovalAction,
    expected: ApprovalStatus,
) -> Result<(), ServiceError> {
    if doc.status != expected {
        return Err(ServiceError::InvalidStatus(format!(
            "cannot {} {} in status {}",
            action,
            kind.label(),
            doc.status
        )));
    }
    Ok(())
}

/// Purchase-order auto-escalation: a successful level-1 approval is promoted
/// straight to level 2 when the order total is below the configured
/// threshold, or when the approver is head office holding the level-2
/// capability. The same actor is stamped as both approvers.
pub fn should_auto_escalate(total_amount: Decimal, threshold: Decimal, actor: &Actor) -> bool {
    total_amount < threshold
        || (actor.has_role(roles::HEAD_OFFICE)
            && actor.has_capability(consts::PURCHASE_ORDERS_APPROVE2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    fn actor_with(capabilities: &[&str]) -> Actor {
        Actor::new(
            Uuid::new_v4(),
            capabilities.iter().map(|s| s.to_string()),
            Vec::new(),
        )
    }

    fn draft(created_by: Uuid) -> ApprovalSnapshot {
        ApprovalSnapshot {
            status: ApprovalStatus::Draft,
            created_by,
            approved1_by: None,
            is_approved1: false,
            is_approved2: false,
            is_completed: false,
        }
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            ApprovalStatus::Draft,
            ApprovalStatus::ApprovedLevel1,
            ApprovalStatus::ApprovedLevel2,
            ApprovalStatus::Completed,
            ApprovalStatus::Suspended,
        ] {
            assert_eq!(
                ApprovalStatus::from_str(&status.to_string()).unwrap(),
                status
            );
        }
        assert_eq!(
            ApprovalStatus::ApprovedLevel1.to_string(),
            "APPROVED_LEVEL_1"
        );
    }

    #[test]
    fn approve1_advances_a_draft() {
        let approver = actor_with(&[consts::INDENTS_APPROVE1]);
        let doc = draft(Uuid::new_v4());

        let t = transition(DocumentKind::Indent, &doc, ApprovalAction::Approve1, &approver)
            .expect("approve1 should succeed");
        assert_eq!(t.new_status, ApprovalStatus::ApprovedLevel1);
        assert_eq!(t.stamp, StampKind::Approved1);
    }

    #[test]
    fn creator_cannot_approve_own_document() {
        let creator = actor_with(&[consts::INDENTS_APPROVE1]);
        let doc = draft(creator.id);

        let err = transition(DocumentKind::Indent, &doc, ApprovalAction::Approve1, &creator)
            .unwrap_err();
        assert_matches!(err, ServiceError::Forbidden(msg) if msg.contains("creator"));
    }

    #[test]
    fn level1_approver_cannot_approve_level2() {
        let approver = actor_with(&[consts::INDENTS_APPROVE1, consts::INDENTS_APPROVE2]);
        let doc = ApprovalSnapshot {
            status: ApprovalStatus::ApprovedLevel1,
            created_by: Uuid::new_v4(),
            approved1_by: Some(approver.id),
            is_approved1: true,
            is_approved2: false,
            is_completed: false,
        };

        let err = transition(DocumentKind::Indent, &doc, ApprovalAction::Approve2, &approver)
            .unwrap_err();
        assert_matches!(err, ServiceError::Forbidden(msg) if msg.contains("level-1 approver"));

        // A different qualified actor succeeds.
        let other = actor_with(&[consts::INDENTS_APPROVE2]);
        let t = transition(DocumentKind::Indent, &doc, ApprovalAction::Approve2, &other)
            .expect("approve2 by a different actor");
        assert_eq!(t.new_status, ApprovalStatus::ApprovedLevel2);
    }

    #[test]
    fn missing_capability_is_rejected_with_its_name() {
        let actor = actor_with(&[]);
        let doc = draft(Uuid::new_v4());

        let err = transition(
            DocumentKind::PurchaseOrder,
            &doc,
            ApprovalAction::Approve1,
            &actor,
        )
        .unwrap_err();
        assert_matches!(
            err,
            ServiceError::Forbidden(msg) if msg.contains(consts::PURCHASE_ORDERS_APPROVE1)
        );
    }

    #[rstest]
    #[case(ApprovalAction::Approve2)]
    #[case(ApprovalAction::Complete)]
    fn only_approve1_or_suspend_leave_draft(#[case] action: ApprovalAction) {
        let actor = actor_with(&[
            consts::INDENTS_APPROVE1,
            consts::INDENTS_APPROVE2,
            consts::INDENTS_COMPLETE,
            consts::INDENTS_SUSPEND,
        ]);
        let doc = draft(Uuid::new_v4());

        let err = transition(DocumentKind::Indent, &doc, action, &actor).unwrap_err();
        assert_matches!(err, ServiceError::InvalidStatus(_));
    }

    #[rstest]
    #[case(ApprovalAction::Approve1)]
    #[case(ApprovalAction::Approve2)]
    fn no_approval_succeeds_past_level2(#[case] action: ApprovalAction) {
        let actor = actor_with(&[consts::INDENTS_APPROVE1, consts::INDENTS_APPROVE2]);
        let doc = ApprovalSnapshot {
            status: ApprovalStatus::ApprovedLevel2,
            created_by: Uuid::new_v4(),
            approved1_by: Some(Uuid::new_v4()),
            is_approved1: true,
            is_approved2: true,
            is_completed: false,
        };

        let err = transition(DocumentKind::Indent, &doc, action, &actor).unwrap_err();
        assert_matches!(err, ServiceError::InvalidStatus(_));
    }

    #[test]
    fn cashbook_has_no_level2() {
        let actor = actor_with(&[consts::CASHBOOKS_APPROVE1]);
        let doc = ApprovalSnapshot {
            status: ApprovalStatus::ApprovedLevel1,
            created_by: Uuid::new_v4(),
            approved1_by: Some(Uuid::new_v4()),
            is_approved1: true,
            is_approved2: false,
            is_completed: false,
        };

        let err =
            transition(DocumentKind::Cashbook, &doc, ApprovalAction::Approve2, &actor).unwrap_err();
        assert_matches!(err, ServiceError::InvalidOperation(_));
    }

    #[test]
    fn completed_documents_cannot_be_suspended() {
        let actor = actor_with(&[consts::INDENTS_SUSPEND]);
        let doc = ApprovalSnapshot {
            status: ApprovalStatus::Completed,
            created_by: Uuid::new_v4(),
            approved1_by: Some(Uuid::new_v4()),
            is_approved1: true,
            is_approved2: true,
            is_completed: true,
        };

        let err =
            transition(DocumentKind::Indent, &doc, ApprovalAction::Suspend, &actor).unwrap_err();
        assert_matches!(err, ServiceError::InvalidStatus(_));
    }

    #[rstest]
    #[case(false, false, false, ApprovalStatus::Draft)]
    #[case(false, false, true, ApprovalStatus::ApprovedLevel1)]
    #[case(false, true, true, ApprovalStatus::ApprovedLevel2)]
    #[case(true, true, true, ApprovalStatus::Completed)]
    fn unsuspend_recomputes_status_from_flags(
        #[case] is_completed: bool,
        #[case] is_approved2: bool,
        #[case] is_approved1: bool,
        #[case] expected: ApprovalStatus,
    ) {
        let actor = actor_with(&[consts::INDENTS_SUSPEND]);
        let doc = ApprovalSnapshot {
            status: ApprovalStatus::Suspended,
            created_by: Uuid::new_v4(),
            approved1_by: None,
            is_approved1,
            is_approved2,
            is_completed,
        };

        let t = transition(DocumentKind::Indent, &doc, ApprovalAction::Unsuspend, &actor)
            .expect("unsuspend");
        assert_eq!(t.new_status, expected);
        assert_eq!(t.stamp, StampKind::Unsuspended);
    }

    #[test]
    fn auto_escalation_below_threshold() {
        let actor = actor_with(&[consts::PURCHASE_ORDERS_APPROVE1]);
        assert!(should_auto_escalate(dec!(49_999), dec!(50_000), &actor));
        assert!(!should_auto_escalate(dec!(50_000), dec!(50_000), &actor));
    }

    #[test]
    fn auto_escalation_for_head_office_with_level2() {
        let plain = actor_with(&[consts::PURCHASE_ORDERS_APPROVE2]);
        assert!(!should_auto_escalate(dec!(80_000), dec!(50_000), &plain));

        let head_office = Actor::new(
            Uuid::new_v4(),
            vec![
                consts::PURCHASE_ORDERS_APPROVE1.to_string(),
                consts::PURCHASE_ORDERS_APPROVE2.to_string(),
            ],
            vec![roles::HEAD_OFFICE.to_string()],
        );
        assert!(should_auto_escalate(dec!(80_000), dec!(50_000), &head_office));
    }
}
