//! Background task identities for stack telemetry

use std::fmt;

/// Background task whose stack headroom is reported each cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskId {
    /// Wi-Fi channel switching loop
    WifiSwitch,

    /// Interrupt dispatch task
    IrqHandler,

    /// Positioning receiver loop
    Gps,

    /// Indicator LED loop
    Led,
}

impl TaskId {
    /// Get the task name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskId::WifiSwitch => "wifi-switch",
            TaskId::IrqHandler => "irq-handler",
            TaskId::Gps => "gps",
            TaskId::Led => "led",
        }
    }

    /// Parse a task from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wifi-switch" => Some(TaskId::WifiSwitch),
            "irq-handler" => Some(TaskId::IrqHandler),
            "gps" => Some(TaskId::Gps),
            "led" => Some(TaskId::Led),
            _ => None,
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid task: {}", s))
    }
}
