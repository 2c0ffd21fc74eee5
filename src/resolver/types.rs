/// A raw MX answer, as returned by the DNS in answer order.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

/// A mail exchanger the prober may connect to. Lower priority is preferred.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxCandidate {
    pub host: String,
    pub priority: u16,
}

impl MxCandidate {
    pub fn new(host: impl Into<String>, priority: u16) -> Self {
        Self {
            host: host.into(),
            priority,
        }
    }
}

impl From<MxRecord> for MxCandidate {
    fn from(record: MxRecord) -> Self {
        Self {
            host: record.exchange,
            priority: record.preference,
        }
    }
}
