use std::fmt;

use super::common::{Attribute, Bandwidth, EncryptionKey};
use super::session::ConnectionInformation;
use crate::extmap::ExtMap;

/// RangedPort describes the `<port>` or `<port>/<number of ports>` component
/// of an `m=` line (RFC8866 5.14).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangedPort {
    pub value: isize,
    pub range: Option<isize>,
}

impl fmt::Display for RangedPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        if let Some(range) = self.range {
            write!(f, "/{range}")?;
        }
        Ok(())
    }
}

/// MediaName describes the `m=<media> <port> <proto> <fmt> ...` line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaName {
    pub media: String,
    pub port: RangedPort,
    pub protos: Vec<String>,
    pub formats: Vec<String>,
}

impl fmt::Display for MediaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.media,
            self.port,
            self.protos.join("/"),
            self.formats.join(" ")
        )
    }
}

/// MediaDescription groups an `m=` line with the `i=`/`c=`/`b=`/`k=`/`a=`
/// lines that apply to it (RFC8866 5.14).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaDescription {
    pub media_name: MediaName,
    pub media_title: Option<String>,
    pub connection_information: Option<ConnectionInformation>,
    pub bandwidth: Vec<Bandwidth>,
    pub encryption_key: Option<EncryptionKey>,
    pub attributes: Vec<Attribute>,
}

impl MediaDescription {
    pub fn new(media: impl Into<String>, port: isize, proto: impl Into<String>) -> Self {
        MediaDescription {
            media_name: MediaName {
                media: media.into(),
                port: RangedPort { value: port, range: None },
                protos: proto.into().split('/').map(str::to_owned).collect(),
                formats: vec![],
            },
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.media_name.formats.push(format.into());
        self
    }

    pub fn with_property_attribute(mut self, key: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(key.into(), None));
        self
    }

    pub fn with_value_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .push(Attribute::new(key.into(), Some(value.into())));
        self
    }

    pub fn with_fingerprint(self, algorithm: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_value_attribute("fingerprint", format!("{} {}", algorithm.into(), value.into()))
    }

    pub fn with_ice_credentials(self, ufrag: impl Into<String>, pwd: impl Into<String>) -> Self {
        self.with_value_attribute("ice-ufrag", ufrag.into())
            .with_value_attribute("ice-pwd", pwd.into())
    }

    pub fn with_candidate(self, value: impl Into<String>) -> Self {
        self.with_value_attribute("candidate", value.into())
    }

    pub fn with_extmap(self, e: ExtMap) -> Self {
        self.with_value_attribute("extmap", e.to_string())
    }

    /// Returns the value of the first media-level attribute matching `key`.
    /// See [`SessionDescription::attribute`](super::session::SessionDescription::attribute)
    /// for the meaning of the nested `Option`.
    pub fn attribute(&self, key: &str) -> Option<Option<&str>> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_deref())
    }

    pub fn attributes(&self, key: &str) -> Vec<&Attribute> {
        self.attributes.iter().filter(|a| a.key == key).collect()
    }

    pub fn marshal(&self) -> String {
        let mut s = format!("m={}\r\n", self.media_name);
        if let Some(t) = &self.media_title {
            s += &format!("i={t}\r\n");
        }
        if let Some(c) = &self.connection_information {
            s += &format!("c={c}\r\n");
        }
        for b in &self.bandwidth {
            s += &format!("b={b}\r\n");
        }
        if let Some(k) = &self.encryption_key {
            s += &format!("k={k}\r\n");
        }
        for a in &self.attributes {
            s += &format!("a={a}\r\n");
        }
        s
    }
}
