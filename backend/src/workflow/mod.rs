//! Approval workflow for leave requests.
//!
//! The review chain is one ordered list of reviewer roles, configured at
//! startup instead of hardcoded at each call site. Requests walk the chain
//! strictly forward: each stage either hands the request to the next stage
//! or ends it. All transition logic here is pure; persistence happens in the
//! repository layer after a transition has been computed.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    leave_request::LeaveRequest,
    user::{User, UserRole},
};

/// Rejected chain configurations, reported at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("approval chain must contain at least one stage")]
    Empty,
    #[error("approval chain lists stage '{0}' more than once")]
    DuplicateStage(String),
    #[error("'{0}' is not a reviewer role and cannot be an approval stage")]
    NotAReviewer(String),
    #[error("unknown approval stage '{0}'")]
    UnknownStage(String),
}

/// Failed transition attempts. The request is left untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    /// The request already carries a terminal status.
    #[error("request has already been decided")]
    AlreadyDecided,
    /// The acting role does not own the request's current stage.
    #[error("request is waiting on {expected}, not {actual}")]
    StageMismatch {
        expected: &'static str,
        actual: &'static str,
    },
    /// The stored stage is not part of the configured chain. Happens when
    /// the chain is reconfigured while requests are in flight.
    #[error("request is parked at stage '{0}', which is not in the configured chain")]
    StageNotInChain(&'static str),
}

/// Ordered list of reviewer stages a request must clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalChain {
    stages: Vec<UserRole>,
}

impl ApprovalChain {
    /// Builds a chain from explicit stages.
    ///
    /// The chain must be non-empty, duplicate-free, and made of reviewer
    /// roles only.
    pub fn new(stages: Vec<UserRole>) -> Result<Self, ChainError> {
        if stages.is_empty() {
            return Err(ChainError::Empty);
        }
        for (i, stage) in stages.iter().enumerate() {
            if !stage.is_reviewer() {
                return Err(ChainError::NotAReviewer(stage.as_str().to_string()));
            }
            if stages[..i].contains(stage) {
                return Err(ChainError::DuplicateStage(stage.as_str().to_string()));
            }
        }
        Ok(Self { stages })
    }

    /// Parses a comma-separated stage list such as `department_head,hr_head`.
    pub fn parse(value: &str) -> Result<Self, ChainError> {
        let stages = value
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| match part {
                "department_head" => Ok(UserRole::DepartmentHead),
                "hr_head" => Ok(UserRole::HrHead),
                "employee" => Err(ChainError::NotAReviewer(part.to_string())),
                other => Err(ChainError::UnknownStage(other.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(stages)
    }

    pub fn stages(&self) -> &[UserRole] {
        &self.stages
    }

    /// Picks the stage a new request enters at.
    ///
    /// A requester who sits in the chain starts one stage above their own
    /// station; the final reviewer has nobody above them, so their requests
    /// land at the final stage. Requesters outside the chain start at the
    /// first stage.
    pub fn initial_stage(&self, requester_role: &UserRole) -> UserRole {
        let idx = match self.position(requester_role) {
            Some(i) => (i + 1).min(self.stages.len() - 1),
            None => 0,
        };
        self.stages[idx].clone()
    }

    /// Moves a pending request forward by one stage, or approves it when the
    /// acting reviewer owns the final stage. The stage value is frozen on
    /// approval. The optional comment is recorded only when this action
    /// decides the request.
    pub fn advance(
        &self,
        request: &mut LeaveRequest,
        actor: &User,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        let idx = self.authorize(request, actor)?;
        match self.stages.get(idx + 1) {
            Some(next) => request.move_to_stage(next.clone(), now),
            None => request.mark_approved(actor.id.clone(), comment, now),
        }
        Ok(())
    }

    /// Rejects a pending request at its current stage. Terminal; the stage
    /// keeps the value it had when the rejection happened.
    pub fn reject(
        &self,
        request: &mut LeaveRequest,
        actor: &User,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        self.authorize(request, actor)?;
        request.mark_rejected(actor.id.clone(), comment, now);
        Ok(())
    }

    /// Checks that the request is still pending and that the actor owns its
    /// current stage. Returns the stage's position in the chain.
    fn authorize(&self, request: &LeaveRequest, actor: &User) -> Result<usize, WorkflowError> {
        if !request.is_pending() {
            return Err(WorkflowError::AlreadyDecided);
        }
        let idx = self
            .position(&request.process_stage)
            .ok_or(WorkflowError::StageNotInChain(request.process_stage.as_str()))?;
        if actor.role != request.process_stage {
            return Err(WorkflowError::StageMismatch {
                expected: request.process_stage.as_str(),
                actual: actor.role.as_str(),
            });
        }
        Ok(idx)
    }

    fn position(&self, stage: &UserRole) -> Option<usize> {
        self.stages.iter().position(|s| s == stage)
    }
}

impl Default for ApprovalChain {
    /// Department review first, HR review last.
    fn default() -> Self {
        Self {
            stages: vec![UserRole::DepartmentHead, UserRole::HrHead],
        }
    }
}

impl std::fmt::Display for ApprovalChain {
    /// Renders the chain in the comma-separated form `parse` accepts.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut stages = self.stages.iter();
        if let Some(first) = stages.next() {
            write!(f, "{}", first.as_str())?;
            for stage in stages {
                write!(f, ",{}", stage.as_str())?;
            }
        }
        Ok(())
    }
}
