#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLogEventKind {
    DealOpened,
    SweepCompleted,
    DealSettled,
    LedgerHeaderWritten,
    LedgerRowWritten,
    WebhookDelivered,
    WebhookFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLogEvent {
    pub tick: u64,
    pub kind: RunLogEventKind,
    pub deal_id: Option<String>,
}

impl RunLogEvent {
    pub fn new(tick: u64, kind: RunLogEventKind, deal_id: Option<String>) -> Self {
        Self {
            tick,
            kind,
            deal_id,
        }
    }
}

pub trait RunLogWriter {
    fn write(&mut self, event: RunLogEvent);
}

#[derive(Debug, Default)]
pub struct InMemoryRunLogWriter {
    events: Vec<RunLogEvent>,
}

impl InMemoryRunLogWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[RunLogEvent] {
        &self.events
    }
}

impl RunLogWriter for InMemoryRunLogWriter {
    fn write(&mut self, event: RunLogEvent) {
        self.events.push(event);
    }
}
