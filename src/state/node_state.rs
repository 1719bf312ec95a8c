use crate::cluster::node::Role;
use crate::state::history::{History, Sample};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Standby,
    Normal,
    High,
    Overloaded,
    Active,
}

impl Status {
    pub fn classify(load: f64, threshold: f64) -> Self {
        if load > threshold {
            Status::Overloaded
        } else if load > 0.7 * threshold {
            Status::High
        } else {
            Status::Normal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Standby => "standby",
            Status::Normal => "normal",
            Status::High => "high",
            Status::Overloaded => "overloaded",
            Status::Active => "active",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeState {
    /// cpu [0.0, 100.0]
    cpu: f64,
    /// memory [0.0, 100.0]
    memory: f64,
    /// temperature >= 0.0 in practice
    temperature: f64,
    load: f64,
    status: Status,
    history: History,
}

impl NodeState {
    pub fn initial(cpu: f64, memory: f64, status: Status) -> Self {
        Self {
            cpu,
            memory,
            temperature: 0.0,
            load: 0.0,
            status,
            history: History::new(),
        }
    }

    pub fn cpu(&self) -> f64 {
        self.cpu
    }

    pub fn memory(&self) -> f64 {
        self.memory
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn load(&self) -> f64 {
        self.load
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Commits one reading: recomputes the load score, rederives status and
    /// appends a history sample. Returns the new load score.
    ///
    /// Backups stay `Standby` until a transfer marks them `Active`; from then
    /// on they are classified like primaries.
    pub fn observe(
        &mut self,
        role: Role,
        at: f64,
        cpu: f64,
        memory: f64,
        temperature: f64,
        threshold: f64,
    ) -> f64 {
        let load = 0.6 * cpu + 0.3 * memory + 0.1 * temperature;
        self.cpu = cpu;
        self.memory = memory;
        self.temperature = temperature;
        self.load = load;
        self.status = if role == Role::Backup && self.status == Status::Standby {
            Status::Standby
        } else {
            Status::classify(load, threshold)
        };
        self.history
            .push(Sample::new(at, cpu, memory, temperature, load));
        load
    }

    /// Source leg of a transfer, floored at zero.
    pub fn shed(&mut self, excess: f64) {
        self.load = (self.load - 0.8 * excess).max(0.0);
        self.cpu = (self.cpu - 0.5 * excess).max(0.0);
        self.temperature = (self.temperature - 0.2 * excess).max(0.0);
    }

    /// Target leg of a transfer, capped at 100. The absorb coefficients are
    /// intentionally smaller than the shed ones, so total load is not
    /// conserved across a transfer.
    pub fn absorb(&mut self, excess: f64) {
        self.load = (self.load + 0.7 * excess).min(100.0);
        self.cpu = (self.cpu + 0.4 * excess).min(100.0);
        self.temperature = (self.temperature + 0.15 * excess).min(100.0);
        self.status = Status::Active;
    }

    #[cfg(test)]
    pub fn force_gauges(&mut self, cpu: f64, memory: f64, temperature: f64, load: f64) {
        self.cpu = cpu;
        self.memory = memory;
        self.temperature = temperature;
        self.load = load;
    }
}
