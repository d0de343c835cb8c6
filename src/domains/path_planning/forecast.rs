use super::types::{AgentId, Cell};

/// Where an agent is now and the steps it intends to take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentForecast {
    pub agent_id: AgentId,
    pub position: Cell,
    pub path: Vec<Cell>,
}

impl AgentForecast {
    pub fn new(agent_id: AgentId, position: Cell, path: Vec<Cell>) -> Self {
        Self { agent_id, position, path }
    }

    /// Predicted cell `offset` ticks from now. An agent idles at the end of its path.
    pub fn position_at(&self, offset: usize) -> Cell {
        if offset == 0 {
            return self.position;
        }
        match self.path.get(offset - 1) {
            Some(cell) => *cell,
            None => self.path.last().copied().unwrap_or(self.position),
        }
    }
}

/// Predicted occupancy of the other agents, consulted by the time-expanded search.
#[derive(Debug, Clone, Default)]
pub struct OccupancyForecast {
    agents: Vec<AgentForecast>,
}

impl OccupancyForecast {
    pub fn new(agents: Vec<AgentForecast>) -> Self {
        Self { agents }
    }

    pub fn is_occupied(&self, cell: Cell, time: usize) -> bool {
        self.agents.iter().any(|a| a.position_at(time) == cell)
    }
}
