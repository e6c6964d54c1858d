use common::TraceMessage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceAction {
    /// Connection is being (re)established; previous output is dropped.
    Reset,
    Started,
    Stopped,
    MessageReceived(TraceMessage),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TraceState {
    pub started: bool,
    pub messages: Vec<TraceMessage>,
}

impl TraceState {
    pub fn apply(&mut self, action: TraceAction) {
        match action {
            TraceAction::Reset => self.messages.clear(),
            TraceAction::Started => self.started = true,
            TraceAction::Stopped => self.started = false,
            TraceAction::MessageReceived(message) => self.messages.push(message),
        }
    }
}

/// Single line summary of a traced call.
pub fn trace_line(message: &TraceMessage) -> String {
    let target = if message.query.is_empty() {
        message.path.clone()
    } else {
        format!("{}?{}", message.path, message.query)
    };
    format!(
        "{} [{}] {} {} {} {} rx={} tx={}",
        message.time,
        message.status_code,
        message.api,
        message.host,
        target,
        message.call_stats.duration,
        crate::format::nice_bytes_int(message.call_stats.rx, false),
        crate::format::nice_bytes_int(message.call_stats.tx, false),
    )
}
