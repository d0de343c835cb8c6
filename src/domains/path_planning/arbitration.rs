//! Per-tick movement arbitration.
//!
//! Every agent submits the cell it wants to step into (or none). Decisions are
//! made for the whole fleet before anyone moves:
//!
//! 1. Several agents wanting the same cell: the lowest agent id wins, the
//!    others yield.
//! 2. Two agents wanting each other's cells (a head-on swap): the higher id
//!    yields.
//! 3. Any other agent whose target is some agent's current cell is blocked,
//!    even when that agent is leaving this tick. A follower enters the cell
//!    one tick after it has been cleared.
//!
//! Granted targets are pairwise distinct and empty at decision time, so no two
//! agents share a cell after the commit. In a swap the lower id is also held
//! by rule 3; the yielding side is expected to re-plan.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::types::{AgentId, Cell};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub agent_id: AgentId,
    pub origin: Cell,
    pub target: Option<Cell>,
}

impl MoveRequest {
    pub fn new(agent_id: AgentId, origin: Cell, target: Option<Cell>) -> Self {
        Self { agent_id, origin, target }
    }

    /// Target cell if the agent actually wants to change cells.
    fn step(&self) -> Option<Cell> {
        self.target.filter(|t| *t != self.origin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YieldReason {
    /// Lost a tie for the same target cell.
    Contention { winner: AgentId },
    /// Higher id in a head-on swap.
    Swap { with: AgentId },
    /// Target is another agent's current cell.
    Blocked { by: AgentId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDecision {
    /// No move requested (idle or waiting in place).
    Stay,
    Granted(Cell),
    Denied(YieldReason),
}

impl MoveDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, MoveDecision::Granted(_))
    }
}

pub fn arbitrate(requests: &[MoveRequest]) -> BTreeMap<AgentId, MoveDecision> {
    let mut decisions: BTreeMap<AgentId, MoveDecision> = BTreeMap::new();
    let occupants: HashMap<Cell, &MoveRequest> = requests.iter().map(|r| (r.origin, r)).collect();

    let mut claims: BTreeMap<Cell, Vec<AgentId>> = BTreeMap::new();
    for request in requests {
        match request.step() {
            Some(target) => claims.entry(target).or_default().push(request.agent_id),
            None => {
                decisions.insert(request.agent_id, MoveDecision::Stay);
            }
        }
    }

    for (target, mut claimants) in claims {
        claimants.sort_unstable();
        let winner = claimants[0];
        decisions.insert(winner, MoveDecision::Granted(target));
        for loser in claimants.into_iter().skip(1) {
            decisions.insert(loser, MoveDecision::Denied(YieldReason::Contention { winner }));
        }
    }

    for request in requests {
        let Some(MoveDecision::Granted(target)) = decisions.get(&request.agent_id).copied() else {
            continue;
        };
        let Some(occupant) = occupants.get(&target) else {
            continue;
        };
        let reason = if occupant.step() == Some(request.origin) && request.agent_id > occupant.agent_id {
            YieldReason::Swap { with: occupant.agent_id }
        } else {
            YieldReason::Blocked { by: occupant.agent_id }
        };
        decisions.insert(request.agent_id, MoveDecision::Denied(reason));
    }

    decisions
}
