use std::collections::VecDeque;

pub const HISTORY_CAPACITY: usize = 60;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    time: f64,
    cpu: f64,
    memory: f64,
    temperature: f64,
    load: f64,
}

impl Sample {
    pub fn new(time: f64, cpu: f64, memory: f64, temperature: f64, load: f64) -> Self {
        Self {
            time,
            cpu,
            memory,
            temperature,
            load,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
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
}

/// Fixed-capacity ring of recent samples, oldest evicted on overflow.
#[derive(Clone, Debug, PartialEq)]
pub struct History {
    samples: VecDeque<Sample>,
}

impl History {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    pub fn push(&mut self, sample: Sample) {
        if self.samples.len() == HISTORY_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }
}
