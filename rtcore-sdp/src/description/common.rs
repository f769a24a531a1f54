use std::fmt;

/// Attribute describes the `a=<attribute>` or `a=<attribute>:<value>` line,
/// shared between the session and media levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: Option<String>,
}

impl Attribute {
    pub fn new(key: String, value: Option<String>) -> Self {
        Attribute { key, value }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) if !v.is_empty() => write!(f, "{}:{}", self.key, v),
            _ => write!(f, "{}", self.key),
        }
    }
}

/// Bandwidth describes an optional `b=<bwtype>:<bandwidth>` line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bandwidth {
    pub experimental: bool,
    pub bandwidth_type: String,
    pub bandwidth: u64,
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.experimental { "X-" } else { "" };
        write!(f, "{}{}:{}", prefix, self.bandwidth_type, self.bandwidth)
    }
}

/// EncryptionKey describes the (deprecated but still occasionally seen)
/// `k=<method>:<key>` line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptionKey {
    pub method: String,
    pub value: Option<String>,
}

impl fmt::Display for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "{}:{}", self.method, v),
            None => write!(f, "{}", self.method),
        }
    }
}
